use std::{
    io::{self, Write},
    time::{Duration, Instant},
};

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

use crate::{
    error::{Result, SpeedTestError},
    models::{SamplerConfig, StopReason, Summary},
    stats::SpeedStats,
    utils::{format_elapsed, kb_mb},
};

/// Reads a body in fixed-size chunks and reports how fast they arrive.
///
/// The sampler never shuts the reader down; dropping it is up to the caller.
pub struct Sampler<R, W> {
    reader: R,
    out: W,
    buf: Vec<u8>,
    config: SamplerConfig,
    stats: SpeedStats,
    bytes_received: u64,
    cancel: CancellationToken,
}

impl<R, W> Sampler<R, W>
where
    R: AsyncRead + Unpin,
    W: Write,
{
    pub fn new(reader: R, out: W, config: &SamplerConfig) -> Self {
        let config = config.bounded();
        Self {
            reader,
            out,
            buf: vec![0; config.chunk_size_bytes()],
            stats: SpeedStats::new(config.chunk_kb, Instant::now()),
            config,
            bytes_received: 0,
            cancel: CancellationToken::new(),
        }
    }

    /// Stops the session at the next chunk boundary, or mid-read, once `token` fires.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub async fn run(mut self) -> Result<Summary> {
        let chunk_len = self.buf.len();

        let stop = loop {
            let (filled, read) = self.next_chunk().await;
            self.bytes_received += filled as u64;
            let Some(read) = read else {
                info!("sampling cancelled after {} chunks", self.stats.chunks_read());
                break StopReason::Cancelled;
            };

            self.stats.record(Instant::now());
            trace!(
                chunk = self.stats.chunks_read(),
                avg_kbs = self.stats.avg_kbs(),
                peak_kbs = self.stats.peak_kbs(),
                "chunk sampled"
            );
            self.report_progress()?;

            match read {
                Ok(()) if filled < chunk_len => {
                    debug!("stream ended with a {} byte chunk", filled);
                    break StopReason::EndOfStream;
                }
                Ok(()) => {}
                Err(err) => {
                    debug!(
                        bytes_received = self.bytes_received,
                        "read failed after {} chunks: {}",
                        self.stats.chunks_read(),
                        err
                    );
                    return Err(err);
                }
            }

            if self.config.cap_reached(self.stats.chunks_read()) {
                debug!("cap of {} KB reached", self.config.cap_kb);
                break StopReason::CapReached;
            }
        };

        self.finish(stop)
    }

    /// Bytes that landed in the buffer, and how the read ended.
    /// `None` means the session was cancelled while waiting for data.
    async fn next_chunk(&mut self) -> (usize, Option<Result<()>>) {
        let limit = self.config.read_timeout;
        let cancel = &self.cancel;
        let mut filled = 0;

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            res = with_deadline(read_full(&mut self.reader, &mut self.buf, &mut filled), limit) => {
                Some(res)
            }
        };
        (filled, outcome)
    }

    fn speed_line(&self) -> String {
        format!(
            "Got {}, A: {}/s, M: {}/s",
            kb_mb(self.stats.total_kb() as f64),
            kb_mb(self.stats.avg_kbs()),
            kb_mb(self.stats.peak_kbs()),
        )
    }

    fn report_progress(&mut self) -> Result<()> {
        if !self.config.show_progress {
            return Ok(());
        }
        let line = self.speed_line();
        write!(self.out, "\r{}       ", line)
            .and_then(|_| self.out.flush())
            .map_err(SpeedTestError::Output)
    }

    fn finish(mut self, stop: StopReason) -> Result<Summary> {
        let elapsed = self.stats.elapsed(Instant::now());
        let line = self.speed_line();
        writeln!(self.out, "\r{} in {}", line, format_elapsed(elapsed))
            .and_then(|_| self.out.flush())
            .map_err(SpeedTestError::Output)?;

        let summary = Summary {
            chunks_read: self.stats.chunks_read(),
            total_kb: self.stats.total_kb(),
            bytes_received: self.bytes_received,
            avg_kbs: self.stats.avg_kbs(),
            peak_kbs: self.stats.peak_kbs(),
            elapsed,
            stop,
        };
        info!(
            chunks = summary.chunks_read,
            total_kb = summary.total_kb,
            bytes_received = summary.bytes_received,
            stop = ?summary.stop,
            "sampling finished"
        );
        Ok(summary)
    }
}

async fn with_deadline<F>(read: F, limit: Option<Duration>) -> Result<()>
where
    F: Future<Output = io::Result<()>>,
{
    match limit {
        Some(limit) => match tokio::time::timeout(limit, read).await {
            Ok(res) => res.map_err(SpeedTestError::Read),
            Err(_) => Err(SpeedTestError::ReadTimeout(limit)),
        },
        None => read.await.map_err(SpeedTestError::Read),
    }
}

/// Fills `buf` unless the stream ends first. `filled` tracks how many bytes
/// landed, and stays valid when the read fails or is dropped part way.
async fn read_full<R>(reader: &mut R, buf: &mut [u8], filled: &mut usize) -> io::Result<()>
where
    R: AsyncRead + Unpin,
{
    while *filled < buf.len() {
        match reader.read(&mut buf[*filled..]).await {
            Ok(0) => break,
            Ok(n) => *filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(())
}
