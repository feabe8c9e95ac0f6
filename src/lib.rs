use std::time::Duration;

pub mod cli;
pub mod error;
pub mod fetch;
pub mod models;
pub mod sampler;
pub mod stats;
pub mod utils;

pub const DEFAULT_URL: &str = "http://speedtest-blr1.digitalocean.com/10mb.test";
pub const DEFAULT_CHUNK_KB: u64 = 25;
pub const DEFAULT_CAP_KB: u64 = 200;
pub const MAX_CHUNK_KB: u64 = 64 * 1024; // 64 MB
pub const DEFAULT_USER_AGENT: &str = concat!("dlspeed/", env!("CARGO_PKG_VERSION"));
pub const CONNECTION_TIMEOUT: Duration = Duration::from_secs(30);
pub const KB: u64 = 1024;
