pub mod roster;

use crate::sheets::PresenceRow;
use crate::utils::time::{start_of_month, start_of_week};
use chrono::NaiveDate;
use std::collections::HashMap;

pub const WEEKLY_WB_TARGET: usize = 35;
pub const WEEKLY_PICO_PRACA_TARGET: usize = 56;
pub const RANKING_SIZE: usize = 10;

pub fn is_world_boss(event: &str) -> bool {
    event.contains("WB")
}

pub fn is_pico_praca(event: &str) -> bool {
    event.contains("Pico") || event.contains("Praça")
}

/// Weekly events that are neither world bosses nor Pico/Praça.
pub fn is_other_event(event: &str) -> bool {
    !is_world_boss(event) && !is_pico_praca(event)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlayerSummary {
    pub weekly_wb: usize,
    pub weekly_pico_praca: usize,
    pub monthly_wb: usize,
    pub monthly_events: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Rankings {
    pub wb: Vec<(String, usize)>,
    pub pico_praca: Vec<(String, usize)>,
    pub events: Vec<(String, usize)>,
}

fn dated(rows: &[PresenceRow]) -> impl Iterator<Item = (NaiveDate, &PresenceRow)> {
    rows.iter().filter_map(|row| row.date().map(|d| (d, row)))
}

/// Counts for one player (case-insensitive nickname). `None` when the player has no rows.
pub fn player_summary(rows: &[PresenceRow], player: &str, today: NaiveDate) -> Option<PlayerSummary> {
    let player = player.to_lowercase();
    let week_start = start_of_week(today);
    let month_start = start_of_month(today);

    let mine: Vec<(NaiveDate, &PresenceRow)> = dated(rows)
        .filter(|(_, row)| row.nickname.to_lowercase() == player)
        .collect();
    if mine.is_empty() {
        return None;
    }

    let mut summary = PlayerSummary::default();
    for (day, row) in mine {
        if day >= week_start {
            if is_world_boss(&row.event) {
                summary.weekly_wb += 1;
            }
            if is_pico_praca(&row.event) {
                summary.weekly_pico_praca += 1;
            }
        }
        if day >= month_start {
            if is_world_boss(&row.event) {
                summary.monthly_wb += 1;
            }
            if is_other_event(&row.event) {
                summary.monthly_events += 1;
            }
        }
    }

    Some(summary)
}

fn top(counts: HashMap<&str, usize>) -> Vec<(String, usize)> {
    let mut ranked: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(name, count)| (name.to_string(), count))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(RANKING_SIZE);
    ranked
}

/// Top players of the current week in each event class.
pub fn weekly_rankings(rows: &[PresenceRow], today: NaiveDate) -> Rankings {
    let week_start = start_of_week(today);
    let mut wb = HashMap::new();
    let mut pico_praca = HashMap::new();
    let mut events = HashMap::new();

    for (day, row) in dated(rows) {
        if day < week_start || row.nickname.is_empty() {
            continue;
        }
        let name = row.nickname.as_str();
        if is_world_boss(&row.event) {
            *wb.entry(name).or_insert(0) += 1;
        }
        if is_pico_praca(&row.event) {
            *pico_praca.entry(name).or_insert(0) += 1;
        }
        if is_other_event(&row.event) {
            *events.entry(name).or_insert(0) += 1;
        }
    }

    Rankings {
        wb: top(wb),
        pico_praca: top(pico_praca),
        events: top(events),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(day: &str, event: &str, nickname: &str) -> PresenceRow {
        PresenceRow {
            day: day.to_string(),
            event: event.to_string(),
            time: "12:00:00".to_string(),
            nickname: nickname.to_string(),
        }
    }

    /// Wednesday; the week starts on Sunday 2025-01-12 and the month on 2025-01-01.
    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
    }

    #[test]
    fn combined_events_count_in_both_classes() {
        assert!(is_world_boss("WB 10:00 + Pico"));
        assert!(is_pico_praca("WB 10:00 + Pico"));
        assert!(!is_other_event("WB 10:00 + Pico"));
        assert!(is_other_event("Guerra de Vale"));
    }

    #[test]
    fn player_summary_splits_week_and_month() {
        let rows = vec![
            row("13/01/2025", "WB 10:00 + Pico", "Ana"),
            row("14/01/2025", "Praça", "ana"),
            row("12/01/2025", "Guerra de Vale", "Ana"),
            row("05/01/2025", "WB 20:00", "Ana"),
            row("28/12/2024", "WB 20:00", "Ana"),
            row("13/01/2025", "WB 20:00", "Bruno"),
            row("not a date", "WB 20:00", "Ana"),
        ];

        let summary = player_summary(&rows, "ANA", today()).unwrap();
        assert_eq!(
            summary,
            PlayerSummary {
                weekly_wb: 1,
                weekly_pico_praca: 2,
                monthly_wb: 2,
                monthly_events: 1,
            }
        );
    }

    #[test]
    fn unknown_player_has_no_summary() {
        let rows = vec![row("13/01/2025", "WB 20:00", "Bruno")];
        assert!(player_summary(&rows, "Ana", today()).is_none());
    }

    #[test]
    fn rankings_order_by_count_then_name() {
        let rows = vec![
            row("13/01/2025", "WB 20:00", "Bruno"),
            row("14/01/2025", "WB 22:00", "Bruno"),
            row("13/01/2025", "WB 20:00", "Ana"),
            row("13/01/2025", "WB 20:00", "Carla"),
            row("13/01/2025", "Pico", "Carla"),
            row("13/01/2025", "Krukan", "Ana"),
            row("01/01/2025", "WB 20:00", "Davi"),
        ];

        let rankings = weekly_rankings(&rows, today());
        assert_eq!(
            rankings.wb,
            vec![("Bruno".to_string(), 2), ("Ana".to_string(), 1), ("Carla".to_string(), 1)]
        );
        assert_eq!(rankings.pico_praca, vec![("Carla".to_string(), 1)]);
        assert_eq!(rankings.events, vec![("Ana".to_string(), 1)]);
    }

    #[test]
    fn rankings_keep_top_ten() {
        let rows: Vec<PresenceRow> = (0..15)
            .map(|i| row("13/01/2025", "WB 20:00", &format!("P{i:02}")))
            .collect();
        assert_eq!(weekly_rankings(&rows, today()).wb.len(), RANKING_SIZE);
    }
}
