//! Product-Parser main entry point
//!
//! This is the command-line interface for the Product-Parser scraper.

use anyhow::Context;
use clap::Parser;
use product_parser::config::{load_config_with_hash, Config, SinkKind};
use product_parser::crawler::{ChannelListener, ParseEvent, RunController, StartOutcome};
use product_parser::links::FileLinkSource;
use product_parser::output::{open_sink, SinkListener};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Product-Parser: a batched product page scraper
///
/// Reads product page addresses (one per line), fetches them in concurrent
/// batches and extracts each product's identifier, name and price.
#[derive(Parser, Debug)]
#[command(name = "product-parser")]
#[command(version)]
#[command(about = "A batched product page scraper", long_about = None)]
struct Cli {
    /// Text file with one page address per line
    #[arg(value_name = "LINKS")]
    links: PathBuf,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Where to send parsed products (overrides the config file)
    #[arg(short, long, value_enum)]
    sink: Option<SinkArg>,

    /// Output file for the file and database sinks (overrides the config file)
    #[arg(short, long, value_name = "PATH")]
    output: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum SinkArg {
    File,
    Database,
    Display,
}

impl From<SinkArg> for SinkKind {
    fn from(arg: SinkArg) -> Self {
        match arg {
            SinkArg::File => SinkKind::File,
            SinkArg::Database => SinkKind::Database,
            SinkArg::Display => SinkKind::Display,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if let Some(sink) = cli.sink {
        config.output.sink = sink.into();
    }
    if let Some(output) = cli.output {
        config.output.path = output;
    }

    handle_parse(config, cli.links).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("product_parser=info,warn"),
            1 => EnvFilter::new("product_parser=debug,info"),
            2 => EnvFilter::new("product_parser=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Runs one parsing pass over the link file and waits for it to finish
async fn handle_parse(config: Config, links: PathBuf) -> anyhow::Result<()> {
    let sink = open_sink(&config.output).context("failed to open output")?;
    tracing::info!(
        "Writing products to {:?} sink{}",
        config.output.sink,
        if config.output.sink == SinkKind::Display {
            String::new()
        } else {
            format!(" at {}", config.output.path)
        }
    );

    let controller = RunController::new(&config)?;
    let (listener, mut events) = ChannelListener::new();
    controller.subscribe(Arc::new(SinkListener::new(sink)));
    controller.subscribe(Arc::new(listener));

    let started = Instant::now();
    let source = FileLinkSource::new(links);

    if let StartOutcome::Rejected = controller.start(&source) {
        anyhow::bail!("a parsing run is already in progress");
    }

    while let Some(event) = events.recv().await {
        if let ParseEvent::ParsingFinished = event {
            break;
        }
    }

    tracing::info!(
        "Parsed {} products in {:.1?}",
        controller.success_count(),
        started.elapsed()
    );

    Ok(())
}
