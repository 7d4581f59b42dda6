use anyhow::Context;
use browser::{ConsentSession, SessionConfig, TimeoutConfig};
use clap::Parser;
use consent_core::ConsentConfig;
use std::path::PathBuf;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

/// Opens a page in Chromium and runs the cookie consent banner on it.
#[derive(Debug, Parser)]
struct Args {
    /// Page to open
    url: String,
    /// Show the browser window
    #[arg(long)]
    headful: bool,
    /// JSON consent configuration
    #[arg(long)]
    config: Option<PathBuf>,
    /// Analytics measurement id, overrides the config file
    #[arg(long)]
    measurement_id: Option<String>,
    /// Use short timeouts
    #[arg(long)]
    fast: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let mut consent = match &args.config {
        Some(path) => ConsentConfig::from_json_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ConsentConfig::default(),
    };
    if let Some(id) = args.measurement_id {
        consent = consent.with_measurement_id(id);
    }

    let timeouts = if args.fast { TimeoutConfig::fast() } else { TimeoutConfig::default() };
    let config = SessionConfig::new(args.url)
        .with_headless(!args.headful)
        .with_viewport(1280, 720)
        .with_consent(consent)
        .with_timeouts(timeouts);

    let mut session = ConsentSession::launch(config).await.context("launching session")?;
    let state = session.bootstrap().await;
    println!("banner state after bootstrap: {:?}", state);
    println!("interact with the page; press Ctrl-C to quit");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_tx.send(true);
        }
    });

    session.run(shutdown_rx).await;
    Ok(())
}
