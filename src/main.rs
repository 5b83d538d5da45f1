mod bot;
mod catalog;
mod config;
mod database;
mod presence;
mod reports;
mod scheduler;
mod sheets;
mod utils;

use anyhow::Result;
use catalog::Catalog;
use config::{Backend, Config};
use database::SqliteStore;
use presence::Ledger;
use sheets::PresenceStore;
use sheets::google::GoogleSheetsClient;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "presence_bot=info,poise=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let catalog = Arc::new(Catalog::load(config.catalog_path.as_deref())?);
    let ledger = Arc::new(Ledger::restore(config.ledger_path.clone()).await);

    let store: Arc<dyn PresenceStore> = match &config.backend {
        Backend::Sqlite { database_url } => {
            let pool = database::create_connection(database_url).await?;
            Arc::new(SqliteStore::new(pool, catalog.sheet_targets()))
        }
        Backend::GoogleSheets {
            service_account_file,
            spreadsheet_id,
        } => Arc::new(GoogleSheetsClient::from_key_file(
            service_account_file,
            spreadsheet_id.clone(),
        )?),
    };

    let mut client = bot::create_bot(config, catalog, ledger.clone(), store).await?;

    tracing::info!("Starting Discord bot...");

    tokio::select! {
        result = client.start() => {
            if let Err(why) = result {
                tracing::error!("Client error: {:?}", why);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown requested");
        }
    }

    ledger.persist_logged().await;

    Ok(())
}
