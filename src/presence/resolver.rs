use crate::catalog::{Catalog, EventDefinition};
use crate::utils::time::local_weekday_and_time;
use chrono::{DateTime, NaiveTime, Utc};
use chrono_tz::Tz;

/// Finds the event open at `instant` for a division's category. `None` is the normal
/// outcome for posts made between events.
pub fn resolve<'a>(
    catalog: &'a Catalog,
    division_key: &str,
    category: &str,
    instant: DateTime<Utc>,
    tz: Tz,
) -> Option<&'a EventDefinition> {
    let events = catalog.events_for(division_key, category)?;
    let (weekday, time_of_day) = local_weekday_and_time(instant, tz);
    find_active_event(events, weekday, time_of_day)
}

/// First event, in declaration order, active on `weekday` with a window containing
/// `time_of_day`. Wrapping windows are checked against the post's own weekday.
pub fn find_active_event(
    events: &[EventDefinition],
    weekday: u8,
    time_of_day: NaiveTime,
) -> Option<&EventDefinition> {
    events.iter().find(|event| {
        event.is_active_on(weekday) && event.windows.iter().any(|w| w.contains(time_of_day))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ALL_DAYS, CategoryCatalog, Division, TimeWindow, defaults};
    use crate::utils::time::parse_timezone;
    use chrono::TimeZone;

    fn t(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    fn sao_paulo() -> Tz {
        parse_timezone("America/Sao_Paulo").unwrap()
    }

    fn events() -> Vec<EventDefinition> {
        vec![
            EventDefinition::new("Krukan", &[0, 1, 3, 4], vec![TimeWindow::hms((23, 55, 0), (0, 15, 0))]),
            EventDefinition::new("Guerra de Vale", &[2], vec![TimeWindow::hms((22, 45, 0), (23, 0, 0))]),
            EventDefinition::new(
                "Pico",
                &ALL_DAYS,
                vec![TimeWindow::hms((1, 55, 0), (2, 15, 0)), TimeWindow::hms((4, 55, 0), (5, 15, 0))],
            ),
        ]
    }

    #[test]
    fn matches_inside_and_on_bounds_of_plain_window() {
        let events = events();
        for time in [t(22, 45, 0), t(22, 52, 30), t(23, 0, 0)] {
            let found = find_active_event(&events, 2, time).map(|e| e.name.as_str());
            assert_eq!(found, Some("Guerra de Vale"), "at {time}");
        }
        assert!(find_active_event(&events, 2, t(22, 44, 59)).is_none());
        assert!(find_active_event(&events, 2, t(23, 0, 1)).is_none());
    }

    #[test]
    fn plain_window_requires_active_weekday() {
        assert!(find_active_event(&events(), 3, t(22, 50, 0)).is_none());
    }

    #[test]
    fn wrapping_window_boundaries() {
        let events = events();
        for time in [t(23, 55, 0), t(0, 0, 0), t(0, 15, 0)] {
            let found = find_active_event(&events, 0, time).map(|e| e.name.as_str());
            assert_eq!(found, Some("Krukan"), "at {time}");
        }
        assert!(find_active_event(&events, 0, t(0, 16, 0)).is_none());
    }

    #[test]
    fn wrapping_window_uses_weekday_of_the_post() {
        let events = events();
        // Tuesday night opens the window; the post lands on Wednesday 00:05, and
        // Wednesday is not an active day for the event.
        assert!(find_active_event(&events, 2, t(0, 5, 0)).is_none());
        // Monday 00:05 matches because Monday itself is active.
        assert!(find_active_event(&events, 0, t(0, 5, 0)).is_some());
    }

    #[test]
    fn any_of_multiple_windows_matches() {
        let events = events();
        assert_eq!(find_active_event(&events, 6, t(5, 0, 0)).map(|e| e.name.as_str()), Some("Pico"));
        assert!(find_active_event(&events, 6, t(3, 0, 0)).is_none());
    }

    #[test]
    fn first_declared_event_wins_on_overlap() {
        let events = vec![
            EventDefinition::new("WB 22:00", &ALL_DAYS, vec![TimeWindow::hms((21, 55, 0), (22, 15, 0))]),
            EventDefinition::new("Praça", &ALL_DAYS, vec![TimeWindow::hms((21, 55, 0), (22, 15, 0))]),
        ];
        let found = find_active_event(&events, 4, t(22, 0, 0)).map(|e| e.name.as_str());
        assert_eq!(found, Some("WB 22:00"));
    }

    #[test]
    fn resolves_wednesday_guerra_de_vale_in_local_time() {
        let catalog = defaults::builtin().unwrap();
        // Wednesday 2025-01-01 22:55 in Sao Paulo is 01:55 UTC on Thursday.
        let instant = Utc.with_ymd_and_hms(2025, 1, 2, 1, 55, 0).unwrap();
        let event = resolve(&catalog, "SOUTH AMERICA 23", "eventos", instant, sao_paulo());
        assert_eq!(event.map(|e| e.name.as_str()), Some("Guerra de Vale"));
    }

    #[test]
    fn sub_second_precision_does_not_push_past_end_bound() {
        let catalog = Catalog {
            divisions: vec![Division {
                key: "D".to_string(),
                sheet_target: "D".to_string(),
                categories: vec![CategoryCatalog { name: "wb".to_string(), events: events() }],
            }],
        };
        // Wednesday 23:00:00.750 local.
        let instant = Utc.with_ymd_and_hms(2025, 1, 2, 2, 0, 0).unwrap() + chrono::Duration::milliseconds(750);
        let event = resolve(&catalog, "D", "wb", instant, sao_paulo());
        assert_eq!(event.map(|e| e.name.as_str()), Some("Guerra de Vale"));
    }

    #[test]
    fn unknown_division_or_category_resolves_nothing() {
        let catalog = defaults::builtin().unwrap();
        let instant = Utc.with_ymd_and_hms(2025, 1, 2, 1, 55, 0).unwrap();
        assert!(resolve(&catalog, "NOWHERE", "eventos", instant, sao_paulo()).is_none());
        assert!(resolve(&catalog, "SOUTH AMERICA 23", "praça-pico", instant, sao_paulo()).is_none());
    }
}
