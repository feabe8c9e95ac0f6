use std::time::Duration;

use reqwest::StatusCode;

use crate::{DEFAULT_CAP_KB, DEFAULT_CHUNK_KB, KB, MAX_CHUNK_KB};

#[derive(Debug, Clone, PartialEq)]
pub struct SamplerConfig {
    pub chunk_kb: u64,
    pub cap_kb: u64,
    /// Ignore `cap_kb` and read until the body ends.
    pub full_stream: bool,
    /// Deadline for a single chunk read. `None` waits forever.
    pub read_timeout: Option<Duration>,
    pub show_progress: bool,
}

impl SamplerConfig {
    /// Copy with `chunk_kb` pulled into `1..=MAX_CHUNK_KB`.
    pub fn bounded(&self) -> Self {
        Self {
            chunk_kb: self.chunk_kb.clamp(1, MAX_CHUNK_KB),
            ..self.clone()
        }
    }

    pub fn chunk_size_bytes(&self) -> usize {
        (self.chunk_kb.clamp(1, MAX_CHUNK_KB) * KB) as usize
    }

    /// True once `chunks_read` chunks satisfy the cap. Always false in full-stream mode.
    pub fn cap_reached(&self, chunks_read: u64) -> bool {
        !self.full_stream && chunks_read.saturating_mul(self.chunk_kb) >= self.cap_kb
    }
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            chunk_kb: DEFAULT_CHUNK_KB,
            cap_kb: DEFAULT_CAP_KB,
            full_stream: false,
            read_timeout: None,
            show_progress: true,
        }
    }
}

/// What the HTTP side knows once response headers are in.
#[derive(Debug, Clone)]
pub struct ConnectionInfo {
    /// Final URL after redirects.
    pub url: String,
    pub host: String,
    pub status: StatusCode,
    pub connect_time: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    EndOfStream,
    CapReached,
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct Summary {
    pub chunks_read: u64,
    /// `chunks_read * chunk_kb`; a short final chunk counts in full.
    pub total_kb: u64,
    /// Bytes actually delivered by the stream.
    pub bytes_received: u64,
    pub avg_kbs: f64,
    pub peak_kbs: f64,
    pub elapsed: Duration,
    pub stop: StopReason,
}
