use std::time::Duration;

use clap::{ArgAction, Parser};

use crate::{DEFAULT_CAP_KB, DEFAULT_CHUNK_KB, DEFAULT_URL, MAX_CHUNK_KB, models::SamplerConfig};

#[derive(Parser, Debug)]
#[command(version, about = "Measure HTTP download speed", long_about = None)]
pub struct Cli {
    /// URL to download
    #[arg(short, long, value_name = "URL", default_value = DEFAULT_URL)]
    pub url: String,

    /// Maximum size in KB to download, not used if --full is set
    #[arg(short, long, value_name = "KB", default_value_t = DEFAULT_CAP_KB,
        value_parser = clap::value_parser!(u64).range(1..))]
    pub max_kb: u64,

    /// Download the URL completely instead of stopping at --max-kb
    #[arg(short, long, action = ArgAction::SetTrue)]
    pub full: bool,

    /// Size in KB of each read (at most 65536)
    #[arg(short, long, value_name = "KB", default_value_t = DEFAULT_CHUNK_KB,
        value_parser = clap::value_parser!(u64).range(1..=MAX_CHUNK_KB))]
    pub buffer_kb: u64,

    /// Fail if a single read takes longer than this many seconds
    #[arg(short = 't', long, value_name = "SECONDS",
        value_parser = clap::value_parser!(u64).range(1..))]
    pub read_timeout: Option<u64>,

    /// Custom User-Agent header
    #[arg(short = 'A', long, value_name = "STRING")]
    pub user_agent: Option<String>,

    /// Only print the final summary
    #[arg(short, long, action = ArgAction::SetTrue)]
    pub quiet: bool,

    /// Verbose output
    #[arg(short, long, action = ArgAction::SetTrue)]
    pub verbose: bool,
}

impl Cli {
    pub fn sampler_config(&self) -> SamplerConfig {
        SamplerConfig {
            chunk_kb: self.buffer_kb,
            cap_kb: self.max_kb,
            full_stream: self.full,
            read_timeout: self.read_timeout.map(Duration::from_secs),
            show_progress: !self.quiet,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_match_sampler_defaults() {
        let cli = Cli::try_parse_from(["dlspeed"]).unwrap();
        assert_eq!(cli.url, DEFAULT_URL);
        assert_eq!(cli.sampler_config(), SamplerConfig::default());
    }

    #[test]
    fn flags_map_onto_config() {
        let cli = Cli::try_parse_from([
            "dlspeed", "-u", "http://localhost/x", "-f", "-m", "400", "-b", "50", "-t", "5", "-q",
        ])
        .unwrap();
        let config = cli.sampler_config();
        assert_eq!(cli.url, "http://localhost/x");
        assert_eq!(config.chunk_kb, 50);
        assert_eq!(config.cap_kb, 400);
        assert!(config.full_stream);
        assert_eq!(config.read_timeout, Some(Duration::from_secs(5)));
        assert!(!config.show_progress);
    }

    #[test]
    fn zero_sizes_are_rejected() {
        assert!(Cli::try_parse_from(["dlspeed", "-b", "0"]).is_err());
        assert!(Cli::try_parse_from(["dlspeed", "--max-kb", "0"]).is_err());
    }

    #[test]
    fn oversized_buffer_is_rejected() {
        assert!(Cli::try_parse_from(["dlspeed", "-b", "18014398509481985"]).is_err());
        assert!(Cli::try_parse_from(["dlspeed", "-b", "65537"]).is_err());
        let cli = Cli::try_parse_from(["dlspeed", "-b", "65536"]).unwrap();
        assert_eq!(cli.sampler_config().chunk_kb, MAX_CHUNK_KB);
    }
}
