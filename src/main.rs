use clap::Parser;
use console::style;
use dlspeed::{
    CONNECTION_TIMEOUT, DEFAULT_USER_AGENT,
    cli::Cli,
    fetch::{build_client, connect},
    models::StopReason,
    sampler::Sampler,
    utils::{format_elapsed, kb_mb},
};
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = cli.sampler_config();
    let user_agent = cli.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);

    if cli.verbose {
        println!("{}", style("dlspeed").bold().cyan());
        println!("Chunk size: {}", kb_mb(config.chunk_kb as f64));
        if config.full_stream {
            println!("Cap: none (full download)");
        } else {
            println!("Cap: {}", kb_mb(config.cap_kb as f64));
        }
        if let Some(limit) = config.read_timeout {
            println!("Read timeout: {}", format_elapsed(limit));
        }
        println!("User-Agent: {}", user_agent);
        println!();
    }

    println!("Using url: {}", cli.url);

    let client = build_client(user_agent, CONNECTION_TIMEOUT)?;
    let connection = match connect(&client, &cli.url).await {
        Ok(connection) => connection,
        Err(e) => fail(e),
    };
    let info = connection.info();
    if cli.verbose && url::Url::parse(&cli.url).is_ok_and(|asked| asked.as_str() != info.url) {
        println!("Redirected to {}", info.url);
    }
    println!("Connected to {} in {}", info.host, format_elapsed(info.connect_time));

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let reader = connection.into_reader();
    let result = Sampler::new(reader, std::io::stdout(), &config)
        .with_cancellation(cancel)
        .run()
        .await;

    match result {
        Ok(summary) => {
            if summary.stop == StopReason::Cancelled {
                std::process::exit(130);
            }
        }
        Err(e) => {
            if e.is_mid_transfer() {
                // the progress line is still open
                println!();
            }
            fail(e)
        }
    }

    Ok(())
}

fn fail(e: impl std::fmt::Display) -> ! {
    debug!("aborting: {}", e);
    eprintln!("{} {}", style("Error:").red().bold(), e);
    std::process::exit(1);
}

fn init_logging(verbose: bool) {
    let default = if verbose { "dlspeed=debug" } else { "dlspeed=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}
