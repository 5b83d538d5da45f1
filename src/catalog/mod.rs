pub mod defaults;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Weekday numbering used throughout the catalog: 0 = Monday ... 6 = Sunday.
pub const ALL_DAYS: [u8; 7] = [0, 1, 2, 3, 4, 5, 6];

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse catalog file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("division '{division}', category '{category}': event has an empty name")]
    EmptyName { division: String, category: String },
    #[error("event '{event}' in '{division}/{category}' has no windows")]
    NoWindows {
        division: String,
        category: String,
        event: String,
    },
    #[error("event '{event}' in '{division}/{category}' has no active weekdays")]
    NoWeekdays {
        division: String,
        category: String,
        event: String,
    },
    #[error("event '{event}' in '{division}/{category}' uses weekday {weekday} (expected 0..=6)")]
    InvalidWeekday {
        division: String,
        category: String,
        event: String,
        weekday: u8,
    },
    #[error("invalid time window {0}")]
    InvalidTime(String),
    #[error("division '{0}' is declared more than once")]
    DuplicateDivision(String),
}

/// A recurring time-of-day interval. `start > end` means the window spans midnight.
/// Both bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// `TimeWindow::from_hms((23, 55, 0), (0, 15, 59))`; `None` if either bound is out of range.
    pub fn from_hms(start: (u32, u32, u32), end: (u32, u32, u32)) -> Option<Self> {
        Some(Self::new(
            NaiveTime::from_hms_opt(start.0, start.1, start.2)?,
            NaiveTime::from_hms_opt(end.0, end.1, end.2)?,
        ))
    }

    #[cfg(test)]
    pub fn hms(start: (u32, u32, u32), end: (u32, u32, u32)) -> Self {
        Self::from_hms(start, end).expect("valid window bounds")
    }

    pub fn wraps_midnight(&self) -> bool {
        self.start > self.end
    }

    pub fn contains(&self, time_of_day: NaiveTime) -> bool {
        if self.wraps_midnight() {
            time_of_day >= self.start || time_of_day <= self.end
        } else {
            self.start <= time_of_day && time_of_day <= self.end
        }
    }

    /// Second-of-day segments covered by this window, split at midnight when it wraps.
    fn segments(&self) -> Vec<(u32, u32)> {
        let start = self.start.num_seconds_from_midnight();
        let end = self.end.num_seconds_from_midnight();
        if self.wraps_midnight() {
            vec![(start, 86_399), (0, end)]
        } else {
            vec![(start, end)]
        }
    }

    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.segments().iter().any(|&(a_start, a_end)| {
            other
                .segments()
                .iter()
                .any(|&(b_start, b_end)| a_start <= b_end && b_start <= a_end)
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDefinition {
    pub name: String,
    pub active_weekdays: Vec<u8>,
    pub windows: Vec<TimeWindow>,
}

impl EventDefinition {
    pub fn new(name: impl Into<String>, active_weekdays: &[u8], windows: Vec<TimeWindow>) -> Self {
        Self {
            name: name.into(),
            active_weekdays: active_weekdays.to_vec(),
            windows,
        }
    }

    pub fn is_active_on(&self, weekday: u8) -> bool {
        self.active_weekdays.contains(&weekday)
    }
}

/// Events monitored in one channel category (a channel name such as `wb` or `eventos`).
///
/// Event order is significant: when two events are active at the same instant the
/// first one declared wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCatalog {
    pub name: String,
    pub events: Vec<EventDefinition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Division {
    /// Name of the Discord category grouping this division's channels.
    pub key: String,
    /// Sheet/tab that registrations for this division are written to.
    pub sheet_target: String,
    pub categories: Vec<CategoryCatalog>,
}

impl Division {
    pub fn category(&self, name: &str) -> Option<&CategoryCatalog> {
        self.categories.iter().find(|c| c.name == name)
    }
}

/// Two events of the same category whose windows intersect on a shared weekday.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlap {
    pub division: String,
    pub category: String,
    pub first: String,
    pub second: String,
    pub weekday: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub divisions: Vec<Division>,
}

impl Catalog {
    /// Loads the catalog from a JSON file, or the built-in table when no path is given,
    /// and validates it before returning.
    pub fn load(path: Option<&Path>) -> Result<Self, CatalogError> {
        let catalog = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)?;
                serde_json::from_str::<Catalog>(&raw)?
            }
            None => defaults::builtin()?,
        };

        catalog.validate()?;

        for overlap in catalog.overlaps() {
            tracing::warn!(
                "Overlapping windows in '{}/{}' on weekday {}: '{}' shadows '{}'",
                overlap.division,
                overlap.category,
                overlap.weekday,
                overlap.first,
                overlap.second
            );
        }

        Ok(catalog)
    }

    pub fn division(&self, key: &str) -> Option<&Division> {
        self.divisions.iter().find(|d| d.key == key)
    }

    pub fn events_for(&self, division_key: &str, category: &str) -> Option<&[EventDefinition]> {
        self.division(division_key)
            .and_then(|d| d.category(category))
            .map(|c| c.events.as_slice())
    }

    pub fn has_sheet_target(&self, target: &str) -> bool {
        self.divisions.iter().any(|d| d.sheet_target == target)
    }

    pub fn sheet_targets(&self) -> Vec<String> {
        self.divisions.iter().map(|d| d.sheet_target.clone()).collect()
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut seen = std::collections::HashSet::new();

        for division in &self.divisions {
            if !seen.insert(division.key.as_str()) {
                return Err(CatalogError::DuplicateDivision(division.key.clone()));
            }

            for category in &division.categories {
                for event in &category.events {
                    if event.name.trim().is_empty() {
                        return Err(CatalogError::EmptyName {
                            division: division.key.clone(),
                            category: category.name.clone(),
                        });
                    }
                    if event.windows.is_empty() {
                        return Err(CatalogError::NoWindows {
                            division: division.key.clone(),
                            category: category.name.clone(),
                            event: event.name.clone(),
                        });
                    }
                    if event.active_weekdays.is_empty() {
                        return Err(CatalogError::NoWeekdays {
                            division: division.key.clone(),
                            category: category.name.clone(),
                            event: event.name.clone(),
                        });
                    }
                    if let Some(&weekday) = event.active_weekdays.iter().find(|&&d| d > 6) {
                        return Err(CatalogError::InvalidWeekday {
                            division: division.key.clone(),
                            category: category.name.clone(),
                            event: event.name.clone(),
                            weekday,
                        });
                    }
                }
            }
        }

        Ok(())
    }

    /// Reports pairs of events that can both match on the same weekday. Not an error:
    /// the resolver picks the earlier declaration.
    pub fn overlaps(&self) -> Vec<Overlap> {
        let mut found = Vec::new();

        for division in &self.divisions {
            for category in &division.categories {
                for (i, first) in category.events.iter().enumerate() {
                    for second in &category.events[i + 1..] {
                        let shared_day = ALL_DAYS
                            .iter()
                            .copied()
                            .find(|&d| first.is_active_on(d) && second.is_active_on(d));
                        let Some(weekday) = shared_day else { continue };

                        let clash = first
                            .windows
                            .iter()
                            .any(|a| second.windows.iter().any(|b| a.overlaps(b)));
                        if clash {
                            found.push(Overlap {
                                division: division.key.clone(),
                                category: category.name.clone(),
                                first: first.name.clone(),
                                second: second.name.clone(),
                                weekday,
                            });
                        }
                    }
                }
            }
        }

        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    fn single_category(events: Vec<EventDefinition>) -> Catalog {
        Catalog {
            divisions: vec![Division {
                key: "TEST 1".to_string(),
                sheet_target: "TEST 1".to_string(),
                categories: vec![CategoryCatalog {
                    name: "eventos".to_string(),
                    events,
                }],
            }],
        }
    }

    #[test]
    fn wrapping_window_contains_both_sides_of_midnight() {
        let window = TimeWindow::hms((23, 55, 0), (0, 15, 0));
        assert!(window.wraps_midnight());
        assert!(window.contains(t(23, 55, 0)));
        assert!(window.contains(t(0, 0, 0)));
        assert!(window.contains(t(0, 15, 0)));
        assert!(!window.contains(t(0, 16, 0)));
        assert!(!window.contains(t(23, 54, 59)));
    }

    #[test]
    fn wrapping_window_overlap_is_detected_across_midnight() {
        let late = TimeWindow::hms((23, 55, 0), (0, 15, 59));
        let early = TimeWindow::hms((0, 10, 0), (0, 30, 0));
        let noon = TimeWindow::hms((12, 0, 0), (12, 30, 0));
        assert!(late.overlaps(&early));
        assert!(early.overlaps(&late));
        assert!(!late.overlaps(&noon));
    }

    #[test]
    fn out_of_range_bounds_do_not_build_a_window() {
        assert!(TimeWindow::from_hms((24, 0, 0), (0, 15, 0)).is_none());
        assert!(TimeWindow::from_hms((23, 55, 0), (0, 60, 0)).is_none());
        assert_eq!(
            TimeWindow::from_hms((23, 55, 0), (0, 15, 59)),
            Some(TimeWindow::new(t(23, 55, 0), t(0, 15, 59)))
        );
    }

    #[test]
    fn builtin_catalog_is_valid() {
        let catalog = defaults::builtin().unwrap();
        catalog.validate().unwrap();
        assert!(catalog.division("NORTH AMERICA 44").is_some());
        assert!(catalog.events_for("EUROPE 14", "eventos-juja").is_some());
        assert!(catalog.events_for("EUROPE 43", "eventos").is_some());
    }

    #[test]
    fn empty_window_list_is_rejected() {
        let catalog = single_category(vec![EventDefinition::new("Krukan", &[1], vec![])]);
        assert!(matches!(catalog.validate(), Err(CatalogError::NoWindows { .. })));
    }

    #[test]
    fn out_of_range_weekday_is_rejected() {
        let catalog = single_category(vec![EventDefinition::new(
            "Krukan",
            &[7],
            vec![TimeWindow::hms((21, 45, 0), (22, 10, 0))],
        )]);
        assert!(matches!(
            catalog.validate(),
            Err(CatalogError::InvalidWeekday { weekday: 7, .. })
        ));
    }

    #[test]
    fn overlapping_events_on_shared_weekday_are_reported_in_declaration_order() {
        let catalog = single_category(vec![
            EventDefinition::new("WB 22:00", &ALL_DAYS, vec![TimeWindow::hms((21, 55, 0), (22, 15, 0))]),
            EventDefinition::new("Praça", &ALL_DAYS, vec![TimeWindow::hms((22, 10, 0), (22, 30, 0))]),
            EventDefinition::new("Guerra de Vale", &[2], vec![TimeWindow::hms((9, 0, 0), (9, 30, 0))]),
        ]);
        catalog.validate().unwrap();

        let overlaps = catalog.overlaps();
        assert_eq!(overlaps.len(), 1);
        assert_eq!(overlaps[0].first, "WB 22:00");
        assert_eq!(overlaps[0].second, "Praça");
    }

    #[test]
    fn windows_on_disjoint_weekdays_do_not_overlap() {
        let catalog = single_category(vec![
            EventDefinition::new("Defesa de Cristal", &[3], vec![TimeWindow::hms((22, 45, 0), (23, 10, 0))]),
            EventDefinition::new("Saque do Castelo", &[4], vec![TimeWindow::hms((22, 45, 0), (23, 10, 0))]),
        ]);
        assert!(catalog.overlaps().is_empty());
    }

    #[test]
    fn catalog_loads_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        let catalog = single_category(vec![EventDefinition::new(
            "Krukan",
            &[1],
            vec![TimeWindow::hms((21, 45, 0), (22, 10, 0))],
        )]);
        std::fs::write(&path, serde_json::to_string(&catalog).unwrap()).unwrap();

        let loaded = Catalog::load(Some(&path)).unwrap();
        assert_eq!(loaded, catalog);
    }
}
