use parking_lot::RwLock;
use std::collections::HashMap;

use crate::sheets::PresenceStore;

/// Autocomplete limit imposed by Discord.
pub const MAX_CHOICES: usize = 25;

/// Known nicknames per sheet target, used for report autocomplete.
#[derive(Default)]
pub struct RosterCache {
    players: RwLock<HashMap<String, Vec<String>>>,
}

impl RosterCache {
    pub fn add(&self, target: &str, nickname: &str) {
        if nickname.is_empty() {
            return;
        }
        let mut players = self.players.write();
        let list = players.entry(target.to_string()).or_default();
        if !list.iter().any(|n| n == nickname) {
            list.push(nickname.to_string());
            tracing::debug!("Added '{}' to the roster of '{}'", nickname, target);
        }
    }

    pub fn players(&self, target: &str) -> Vec<String> {
        self.players.read().get(target).cloned().unwrap_or_default()
    }

    /// Case-insensitive substring match, capped at the autocomplete limit.
    pub fn search(&self, target: &str, partial: &str) -> Vec<String> {
        let needle = partial.to_lowercase();
        self.players
            .read()
            .get(target)
            .map(|list| {
                list.iter()
                    .filter(|n| n.to_lowercase().contains(&needle))
                    .take(MAX_CHOICES)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn clear(&self) {
        self.players.write().clear();
    }

    /// Rebuilds the roster from every stored row of each target. Targets that fail to
    /// load are logged and left empty.
    pub async fn populate(&self, store: &dyn PresenceStore, targets: &[String]) {
        tracing::info!("Populating player roster for {} divisions", targets.len());
        for target in targets {
            match store.fetch_records(target).await {
                Ok(rows) => {
                    for row in rows {
                        self.add(target, row.nickname.trim());
                    }
                }
                Err(e) => tracing::error!("Failed to load roster for '{}': {}", target, e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_ignores_repeats_and_empty_names() {
        let roster = RosterCache::default();
        roster.add("EUROPE 43", "Ana");
        roster.add("EUROPE 43", "Ana");
        roster.add("EUROPE 43", "");
        roster.add("EUROPE 43", "Bruno");
        assert_eq!(roster.players("EUROPE 43"), vec!["Ana".to_string(), "Bruno".to_string()]);
        assert!(roster.players("EUROPE 14").is_empty());
    }

    #[test]
    fn search_is_case_insensitive_and_capped() {
        let roster = RosterCache::default();
        for i in 0..40 {
            roster.add("EUROPE 43", &format!("Player{i}"));
        }
        roster.add("EUROPE 43", "Ana");

        assert_eq!(roster.search("EUROPE 43", "ana"), vec!["Ana".to_string()]);
        assert_eq!(roster.search("EUROPE 43", "PLAYER").len(), MAX_CHOICES);
        assert!(roster.search("OTHER", "a").is_empty());
    }

    #[test]
    fn clear_empties_every_target() {
        let roster = RosterCache::default();
        roster.add("EUROPE 43", "Ana");
        roster.clear();
        assert!(roster.players("EUROPE 43").is_empty());
    }
}
