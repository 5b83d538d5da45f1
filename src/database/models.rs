use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};
use sqlx::FromRow;

use crate::sheets::PresenceRow;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PresenceRecord {
    pub id: i64,
    pub sheet_target: String,
    pub day: String,
    pub event: String,
    pub time: String,
    pub nickname: String,
    pub created_at: DateTime<Utc>,
}

impl From<PresenceRecord> for PresenceRow {
    fn from(record: PresenceRecord) -> Self {
        PresenceRow {
            day: record.day,
            event: record.event,
            time: record.time,
            nickname: record.nickname,
        }
    }
}
