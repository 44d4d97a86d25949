use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::process;
use std::sync::Mutex;

use anyhow::Context;
use clap::{CommandFactory, Parser};

use pinselflut::net::{Connection, Endpoint, OutputBuffer, TcpConnector};
use pinselflut::{load_config, tui, Config, FlutClient, PinselError};

/// Paint on a pixelflut canvas from the terminal
#[derive(Parser, Debug)]
#[command(name = "pinselflut", version, about)]
struct Cli {
    /// Canvas server host name or address
    host: Option<String>,

    /// Canvas server port
    port: Option<u16>,

    /// Path to config.toml
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write logs to this file instead of the default location
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log connection events
    #[arg(short, long)]
    verbose: bool,

    /// Log everything, including flushes and keep-alives
    #[arg(long)]
    debug: bool,

    /// Skip the SIZE query and use the configured canvas size
    #[arg(long)]
    no_size_query: bool,
}

fn main() {
    let cli = Cli::parse();

    let (Some(host), Some(port)) = (cli.host.clone(), cli.port) else {
        eprintln!("{}", Cli::command().render_usage());
        process::exit(0);
    };

    init_logging(&cli);

    if let Err(e) = run(&cli, host, port) {
        tracing::error!("{:#}", e);
        eprintln!("pinselflut: {e:#}");
        let code = e.downcast_ref::<PinselError>().map_or(1, PinselError::exit_code);
        process::exit(code);
    }
}

fn run(cli: &Cli, host: String, port: u16) -> anyhow::Result<()> {
    let mut config = load_config(cli.config.as_deref()).context("loading configuration")?;
    if cli.no_size_query {
        config.query_size = false;
    }

    let mut connection =
        Connection::open_with(TcpConnector, Endpoint::new(host, port), config.retry_policy())?;
    let dims = if config.query_size {
        connection.query_size(config.fallback_dimensions(), config.size_query_timeout())?
    } else {
        config.fallback_dimensions()
    };

    let client = FlutClient::new(
        connection,
        dims,
        OutputBuffer::with_capacity(config.buffer_capacity),
    );
    tui::run(client, &config)?;
    Ok(())
}

/// Logs go to a file because the UI owns the terminal
fn init_logging(cli: &Cli) {
    let log_level = if cli.debug {
        tracing::Level::DEBUG
    } else if cli.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };
    let filter =
        tracing_subscriber::EnvFilter::from_default_env().add_directive(log_level.into());

    let path = cli
        .log_file
        .clone()
        .or_else(|| Config::data_dir().map(|dir| dir.join("pinselflut.log")));
    let file = path.and_then(|path| {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).ok()?;
        }
        OpenOptions::new().create(true).append(true).open(path).ok()
    });

    match file {
        Some(file) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .init(),
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_ansi(false)
            .init(),
    }

    tracing::info!("Starting pinselflut version {}", env!("CARGO_PKG_VERSION"));
}
