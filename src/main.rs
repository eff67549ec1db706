mod checker;
mod config;
mod notifier;
mod watcher;

use anyhow::Result;
use tokio::signal;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::NotifierConfig;
use crate::notifier::GmailNotifier;
use crate::watcher::AppointmentWatcher;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "acs_appt_notifier=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting USCIS ACS appointment availability notifier");

    // Load configuration
    dotenvy::dotenv().ok();
    let config = NotifierConfig::from_env()?;

    let notifier = GmailNotifier::new(&config).await?;
    let mut watcher = AppointmentWatcher::new(&config, notifier);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let watcher_handle = tokio::spawn(async move {
        watcher.run(shutdown_rx).await;
    });

    // Wait for shutdown signal
    tracing::info!("Notifier running. Press Ctrl+C to stop.");
    signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received, stopping...");

    // Graceful shutdown: the watcher finishes its in-flight cycle first
    shutdown_tx.send(true).ok();
    watcher_handle.await?;

    tracing::info!("Notifier stopped");
    Ok(())
}
