use anyhow::Result;
use tokio::sync::broadcast;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use waxwing_client::{ClientConfig, FeedPage};

#[tokio::main]
async fn main() -> Result<()> {
    match dotenvy::dotenv() {
        _ => (),
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "waxwing=info,waxwing_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting waxwing sync client");

    let config = ClientConfig::from_env()?;
    info!("Configuration: base {} ws {}", config.base_url, config.ws_url);

    let page = FeedPage::new(config)?;

    // Log every view change the controllers emit.
    let mut updates = page.updates();
    tokio::spawn(async move {
        loop {
            match updates.recv().await {
                Ok(event) => info!("View change: {:?}", event),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!("Dropped {} view events", n);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    // Run one push session to completion. Reconnect policy belongs to
    // whatever supervises this process.
    if let Err(e) = page.notifications().connect().await {
        error!("Notification channel ended with error: {}", e);
        return Err(e.into());
    }

    info!("Notification channel closed; exiting");
    Ok(())
}
