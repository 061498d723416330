// MIT License - Copyright (c) the tenmicronsync authors
// Rust translation of tenmicronsync.py

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::watch;
use tracing::{error, info};

use tenmicron_sync::config::{AppConfig, FileConfig, Overrides};
use tenmicron_sync::{MountSession, NinaWeather, SyncLoop};

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "tenmicron-sync")]
#[command(about = "Connect to NINA and TenMicron systems and optionally sync data")]
struct Cli {
    /// IP address for NINA system [default: 127.0.0.1]
    #[arg(long)]
    ninaip: Option<String>,

    /// IP address for TenMicron system [default: 1.1.1.1]
    #[arg(long)]
    tenmicronip: Option<String>,

    /// Do not sync data to the TenMicron system
    #[arg(long)]
    nosync: bool,

    /// Interval in seconds between updates [default: 1800]
    #[arg(long)]
    interval: Option<u64>,

    /// Read temperature and pressure back from the mount after writing
    #[arg(long)]
    verify: bool,

    /// Optional TOML configuration file; command-line flags take precedence
    #[arg(long)]
    config: Option<String>,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            weather_host: self.ninaip.clone(),
            mount_host: self.tenmicronip.clone(),
            nosync: self.nosync,
            interval_secs: self.interval,
            verify: self.verify,
        }
    }
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let file = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {path}"))?;
            FileConfig::from_toml(&text).context("Failed to parse config file")?
        }
        None => FileConfig::default(),
    };
    Ok(AppConfig::resolve(cli.overrides(), file))
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // RUST_LOG controls verbosity (e.g. RUST_LOG=debug or RUST_LOG=tenmicron_sync=trace).
    // Default: info.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    // systemd journal already adds timestamps, so omit them when running under systemd
    if std::env::var_os("JOURNAL_STREAM").is_some() {
        tracing_subscriber::fmt().without_time().with_env_filter(env_filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    info!(
        "NINA at {}, mount at {}, interval {}s, sync={}, verify={}",
        config.weather.url(),
        config.session.endpoint(),
        config.sync.interval.as_secs(),
        config.sync.sync,
        config.sync.verify
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut sigterm = signal(SignalKind::terminate())?;
    tokio::spawn(async move {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => info!("Received SIGINT, closing connection..."),
            _ = sigterm.recv() => info!("Received SIGTERM, closing connection..."),
        }
        let _ = shutdown_tx.send(true);
    });

    let weather = NinaWeather::new(&config.weather).context("Failed to create HTTP client")?;
    let session = MountSession::new(config.session.clone()).with_shutdown(shutdown_rx.clone());
    let mut sync = SyncLoop::new(weather, session, config.sync);

    if let Err(e) = sync.run(shutdown_rx).await {
        error!("Fatal mount error: {e}");
        return Err(e.into());
    }

    info!("Exiting...");
    Ok(())
}
