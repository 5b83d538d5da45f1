use crate::presence::Ledger;
use crate::reports::roster::RosterCache;
use crate::sheets::PresenceStore;
use crate::utils::time::next_daily_occurrence;
use chrono::{NaiveTime, Utc};
use chrono_tz::Tz;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::info;

/// Everything the daily reset touches.
#[derive(Clone)]
pub struct Housekeeping {
    pub ledger: Arc<Ledger>,
    pub roster: Arc<RosterCache>,
    pub store: Arc<dyn PresenceStore>,
    pub targets: Vec<String>,
}

impl Housekeeping {
    /// Clears the ledger, persists the empty state and reloads the roster.
    pub async fn daily_reset(&self) {
        info!("Daily reset reached, clearing {} ledger entries", self.ledger.len());
        self.ledger.clear();
        self.ledger.persist_logged().await;

        self.roster.clear();
        self.roster.populate(self.store.as_ref(), &self.targets).await;
    }

    pub async fn snapshot(&self) {
        info!("Saving presence ledger ({} entries)", self.ledger.len());
        self.ledger.persist_logged().await;
    }
}

pub fn spawn_daily_reset(housekeeping: Housekeeping, tz: Tz, at: NaiveTime) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let now = Utc::now();
            let next = next_daily_occurrence(now, tz, at);
            let wait = (next - now).to_std().unwrap_or(Duration::from_secs(1));
            info!("Next daily reset at {}", next.with_timezone(&tz).format("%Y-%m-%d %H:%M:%S %Z"));

            tokio::time::sleep(wait).await;
            housekeeping.daily_reset().await;
        }
    })
}

pub fn spawn_snapshots(housekeeping: Housekeeping, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick completes immediately; skip it so the first save waits a full period.
        interval.tick().await;
        loop {
            interval.tick().await;
            housekeeping.snapshot().await;
        }
    })
}
