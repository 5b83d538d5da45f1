use anyhow::Result;
use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| anyhow::anyhow!("Unknown timezone: {}", name))
}

pub fn parse_time_string(time_str: &str) -> Result<NaiveTime> {
    let time_str = time_str.trim();

    if let Ok(time) = NaiveTime::parse_from_str(time_str, "%H:%M") {
        return Ok(time);
    }

    if let Ok(time) = NaiveTime::parse_from_str(time_str, "%H:%M:%S") {
        return Ok(time);
    }

    Err(anyhow::anyhow!("Invalid time format. Use HH:MM or HH:MM:SS"))
}

pub fn to_local(instant: DateTime<Utc>, tz: Tz) -> DateTime<Tz> {
    instant.with_timezone(&tz)
}

/// Weekday (0 = Monday) and time of day, truncated to whole seconds, in `tz`.
pub fn local_weekday_and_time(instant: DateTime<Utc>, tz: Tz) -> (u8, NaiveTime) {
    let local = to_local(instant, tz);
    let weekday = local.weekday().num_days_from_monday() as u8;
    let time = local.time().with_nanosecond(0).unwrap_or_else(|| local.time());
    (weekday, time)
}

pub fn get_current_date(tz: Tz) -> NaiveDate {
    Utc::now().with_timezone(&tz).date_naive()
}

/// Sheet day column, `DD/MM/YYYY`.
pub fn format_sheet_day(local: &DateTime<Tz>) -> String {
    local.format("%d/%m/%Y").to_string()
}

/// Sheet time column, `HH:MM:SS`.
pub fn format_sheet_time(local: &DateTime<Tz>) -> String {
    local.format("%H:%M:%S").to_string()
}

pub fn parse_sheet_day(day: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(day.trim(), "%d/%m/%Y").ok()
}

/// Next instant strictly after `now` at which the local wall clock in `tz` reads `at`.
pub fn next_daily_occurrence(now: DateTime<Utc>, tz: Tz, at: NaiveTime) -> DateTime<Utc> {
    let today = now.with_timezone(&tz).date_naive();

    for offset in 0..3u64 {
        let Some(date) = today.checked_add_days(Days::new(offset)) else {
            continue;
        };
        let naive = date.and_time(at);
        // A wall-clock time skipped by a DST jump fires an hour later.
        let candidate = tz
            .from_local_datetime(&naive)
            .earliest()
            .or_else(|| tz.from_local_datetime(&(naive + chrono::Duration::hours(1))).earliest());

        if let Some(candidate) = candidate {
            let candidate = candidate.with_timezone(&Utc);
            if candidate > now {
                return candidate;
            }
        }
    }

    now + chrono::Duration::days(1)
}

/// Sunday that opens the reporting week containing `date`.
pub fn start_of_week(date: NaiveDate) -> NaiveDate {
    let days_since_sunday = date.weekday().num_days_from_sunday() as u64;
    date.checked_sub_days(Days::new(days_since_sunday))
        .unwrap_or(date)
}

pub fn start_of_month(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}

pub fn month_name_pt(month: u32) -> &'static str {
    match month {
        1 => "Janeiro",
        2 => "Fevereiro",
        3 => "Março",
        4 => "Abril",
        5 => "Maio",
        6 => "Junho",
        7 => "Julho",
        8 => "Agosto",
        9 => "Setembro",
        10 => "Outubro",
        11 => "Novembro",
        12 => "Dezembro",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sao_paulo() -> Tz {
        parse_timezone("America/Sao_Paulo").unwrap()
    }

    #[test]
    fn parses_both_time_formats() {
        assert_eq!(parse_time_string("00:25").unwrap(), NaiveTime::from_hms_opt(0, 25, 0).unwrap());
        assert_eq!(parse_time_string(" 23:10:59 ").unwrap(), NaiveTime::from_hms_opt(23, 10, 59).unwrap());
        assert!(parse_time_string("25:00").is_err());
    }

    #[test]
    fn unknown_timezone_is_an_error() {
        assert!(parse_timezone("Mars/Olympus").is_err());
    }

    #[test]
    fn local_weekday_uses_configured_zone() {
        // 2025-01-02 01:30 UTC is Wednesday 22:30 in Sao Paulo (UTC-3).
        let instant = Utc.with_ymd_and_hms(2025, 1, 2, 1, 30, 0).unwrap();
        let (weekday, time) = local_weekday_and_time(instant, sao_paulo());
        assert_eq!(weekday, 2);
        assert_eq!(time, NaiveTime::from_hms_opt(22, 30, 0).unwrap());
    }

    #[test]
    fn next_occurrence_rolls_over_to_tomorrow() {
        let tz = sao_paulo();
        let reset = NaiveTime::from_hms_opt(0, 25, 0).unwrap();

        // 2025-01-01 02:00 local, reset already passed today.
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 5, 0, 0).unwrap();
        let next = next_daily_occurrence(now, tz, reset);
        assert_eq!(next, Utc.with_ymd_and_hms(2025, 1, 2, 3, 25, 0).unwrap());

        // 2025-01-01 00:10 local, reset still ahead today.
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 3, 10, 0).unwrap();
        let next = next_daily_occurrence(now, tz, reset);
        assert_eq!(next, Utc.with_ymd_and_hms(2025, 1, 1, 3, 25, 0).unwrap());
    }

    #[test]
    fn weeks_start_on_sunday() {
        let wednesday = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        assert_eq!(start_of_week(wednesday), NaiveDate::from_ymd_opt(2024, 12, 29).unwrap());

        let sunday = NaiveDate::from_ymd_opt(2024, 12, 29).unwrap();
        assert_eq!(start_of_week(sunday), sunday);
    }

    #[test]
    fn sheet_formats_round_trip_day() {
        let local = Utc.with_ymd_and_hms(2025, 3, 5, 1, 2, 3).unwrap().with_timezone(&sao_paulo());
        assert_eq!(format_sheet_day(&local), "04/03/2025");
        assert_eq!(format_sheet_time(&local), "22:02:03");
        assert_eq!(parse_sheet_day("04/03/2025"), NaiveDate::from_ymd_opt(2025, 3, 4));
    }
}
