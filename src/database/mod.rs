pub mod migrations;
pub mod models;
pub mod queries;

use crate::sheets::{PresenceRow, PresenceStore, StoreError};
use anyhow::Result;
use async_trait::async_trait;
use sqlx::{SqlitePool, sqlite::SqliteConnectOptions};
use std::collections::HashSet;
use std::str::FromStr;

pub async fn create_connection(database_url: &str) -> Result<SqlitePool> {
    let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

    let pool = SqlitePool::connect_with(connect_options).await?;

    // Run migrations
    migrations::run_migrations(&pool).await?;

    Ok(pool)
}

/// Local presence store. Each division's sheet target acts as a tab; writes to any other
/// target are refused the way a missing worksheet would be.
pub struct SqliteStore {
    pool: SqlitePool,
    targets: HashSet<String>,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool, targets: impl IntoIterator<Item = String>) -> Self {
        Self {
            pool,
            targets: targets.into_iter().collect(),
        }
    }

    fn check_target(&self, target: &str) -> Result<(), StoreError> {
        if self.targets.contains(target) {
            Ok(())
        } else {
            Err(StoreError::TargetNotFound(target.to_string()))
        }
    }
}

#[async_trait]
impl PresenceStore for SqliteStore {
    async fn append_record(&self, target: &str, row: &PresenceRow) -> Result<(), StoreError> {
        self.check_target(target)?;
        queries::insert_presence_record(&self.pool, target, row).await?;
        Ok(())
    }

    async fn fetch_records(&self, target: &str) -> Result<Vec<PresenceRow>, StoreError> {
        self.check_target(target)?;
        let records = queries::get_presence_records(&self.pool, target).await?;
        Ok(records.into_iter().map(PresenceRow::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store(dir: &tempfile::TempDir) -> SqliteStore {
        let url = format!("sqlite:{}", dir.path().join("presence.db").display());
        let pool = create_connection(&url).await.unwrap();
        SqliteStore::new(pool, ["EUROPE 43".to_string(), "EUROPE 14".to_string()])
    }

    fn row(event: &str, nickname: &str) -> PresenceRow {
        PresenceRow {
            day: "01/01/2025".to_string(),
            event: event.to_string(),
            time: "17:50:00".to_string(),
            nickname: nickname.to_string(),
        }
    }

    #[tokio::test]
    async fn appended_rows_come_back_per_target_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir).await;

        store.append_record("EUROPE 43", &row("Guerra de Vale", "Ana")).await.unwrap();
        store.append_record("EUROPE 14", &row("Pico", "Bruno")).await.unwrap();
        store.append_record("EUROPE 43", &row("Praça", "Carla")).await.unwrap();

        let rows = store.fetch_records("EUROPE 43").await.unwrap();
        assert_eq!(rows, vec![row("Guerra de Vale", "Ana"), row("Praça", "Carla")]);
        assert_eq!(store.fetch_records("EUROPE 14").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unknown_target_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir).await;

        let err = store.append_record("EUROPE 99", &row("Pico", "Ana")).await.unwrap_err();
        assert!(matches!(err, StoreError::TargetNotFound(t) if t == "EUROPE 99"));
    }

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite:{}", dir.path().join("presence.db").display());
        let pool = create_connection(&url).await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();
    }
}
