pub mod google;

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::utils::time::parse_sheet_day;

/// One attendance line as written to a division's sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceRow {
    /// `DD/MM/YYYY`
    pub day: String,
    pub event: String,
    /// `HH:MM:SS`
    pub time: String,
    pub nickname: String,
}

impl PresenceRow {
    pub fn date(&self) -> Option<NaiveDate> {
        parse_sheet_day(&self.day)
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    /// The sheet or tab does not exist. Needs an operator to fix configuration.
    #[error("target '{0}' not found")]
    TargetNotFound(String),
    #[error("transient store failure: {0}")]
    Transient(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Transient(e.to_string())
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        StoreError::Transient(e.to_string())
    }
}

/// Durable record of registrations, keyed by sheet target (one per division).
#[async_trait]
pub trait PresenceStore: Send + Sync {
    async fn append_record(&self, target: &str, row: &PresenceRow) -> Result<(), StoreError>;

    /// Every row stored for `target`, oldest first.
    async fn fetch_records(&self, target: &str) -> Result<Vec<PresenceRow>, StoreError>;
}
