use chrono::{DateTime, Duration, FixedOffset, NaiveDate};

use crate::api::{CalendarResponse, DayRecord};
use crate::error::ScheduleError;
use crate::schedule::{DailyTimings, Prayer, Schedule};

/// Flatten the provider's month-keyed calendar into one date-ordered year.
///
/// The result covers every day of `year` from Jan 1 to Dec 31, ascending,
/// with no gaps or duplicates; any violation of that invariant is a
/// [`ScheduleError::MalformedResponse`].
pub fn normalize(resp: &CalendarResponse, year: i32) -> Result<Schedule, ScheduleError> {
    for key in resp.data.keys() {
        let valid = key.parse::<u32>().is_ok_and(|m| (1..=12).contains(&m));
        if !valid {
            return Err(ScheduleError::MalformedResponse(format!(
                "unexpected month key {key:?} in calendar data"
            )));
        }
    }

    let mut days: Schedule = Vec::with_capacity(366);
    for month in 1..=12u32 {
        let records = resp.data.get(&month.to_string()).ok_or_else(|| {
            ScheduleError::MalformedResponse(format!("calendar data is missing month {month}"))
        })?;
        for record in records {
            days.push(normalize_day(month, record)?);
        }
    }

    days.sort_by_key(|d| d.date);
    verify_year_coverage(&days, year)?;
    Ok(days)
}

/// Parse one provider timestamp such as `"2023-01-01T05:38:00-08:00 (PST)"`.
///
/// The provider appends a parenthesized timezone label after the RFC 3339
/// instant; only the instant is kept.
pub fn parse_adhan_timestamp(raw: &str) -> Result<DateTime<FixedOffset>, ScheduleError> {
    let instant = raw.split_whitespace().next().unwrap_or_default();
    DateTime::parse_from_rfc3339(instant).map_err(|_| {
        ScheduleError::MalformedResponse(format!("unparsable adhan timestamp {raw:?}"))
    })
}

fn normalize_day(month: u32, record: &DayRecord) -> Result<DailyTimings, ScheduleError> {
    let raw_date = record
        .date
        .as_ref()
        .and_then(|d| d.gregorian.as_ref())
        .and_then(|g| g.date.as_deref())
        .ok_or_else(|| {
            ScheduleError::MalformedResponse(format!(
                "a day record in month {month} is missing its gregorian date"
            ))
        })?;
    let date = NaiveDate::parse_from_str(raw_date, "%d-%m-%Y").map_err(|_| {
        ScheduleError::MalformedResponse(format!(
            "unparsable gregorian date {raw_date:?} in month {month}"
        ))
    })?;

    let timings = record.timings.as_ref().ok_or_else(|| {
        ScheduleError::MalformedResponse(format!("day {date} has no timings object"))
    })?;

    Ok(DailyTimings {
        date,
        fajr: Some(required_timing(date, Prayer::Fajr, timings.fajr.as_deref())?),
        dhuhr: Some(required_timing(date, Prayer::Dhuhr, timings.dhuhr.as_deref())?),
        asr: Some(required_timing(date, Prayer::Asr, timings.asr.as_deref())?),
        maghrib: Some(required_timing(
            date,
            Prayer::Maghrib,
            timings.maghrib.as_deref(),
        )?),
        isha: Some(required_timing(date, Prayer::Isha, timings.isha.as_deref())?),
        iqama: None,
    })
}

fn required_timing(
    date: NaiveDate,
    prayer: Prayer,
    raw: Option<&str>,
) -> Result<DateTime<FixedOffset>, ScheduleError> {
    let raw = raw.ok_or_else(|| {
        ScheduleError::MalformedResponse(format!("day {date} has no {prayer} timing"))
    })?;
    parse_adhan_timestamp(raw)
}

fn verify_year_coverage(days: &Schedule, year: i32) -> Result<(), ScheduleError> {
    let jan_first = NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(|| {
        ScheduleError::Configuration(format!("year {year} is outside the supported range"))
    })?;
    let dec_last = NaiveDate::from_ymd_opt(year, 12, 31).ok_or_else(|| {
        ScheduleError::Configuration(format!("year {year} is outside the supported range"))
    })?;

    match (days.first(), days.last()) {
        (Some(first), Some(last)) if first.date == jan_first && last.date == dec_last => {}
        _ => {
            return Err(ScheduleError::MalformedResponse(format!(
                "calendar does not span {year} from {jan_first} to {dec_last}"
            )));
        }
    }

    for pair in days.windows(2) {
        let (prev, next) = (pair[0].date, pair[1].date);
        if next == prev {
            return Err(ScheduleError::MalformedResponse(format!(
                "calendar contains day {next} twice"
            )));
        }
        if next - prev != Duration::days(1) {
            return Err(ScheduleError::MalformedResponse(format!(
                "calendar has a gap between {prev} and {next}"
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::{Datelike, Timelike};

    use crate::api::{DayDate, DayTimings, GregorianDate};

    use super::*;

    fn provider_day(date: NaiveDate) -> DayRecord {
        let stamp = |hour: u32, minute: u32| {
            Some(format!(
                "{}T{:02}:{:02}:00-08:00 (PST)",
                date.format("%Y-%m-%d"),
                hour,
                minute
            ))
        };
        DayRecord {
            timings: Some(DayTimings {
                fajr: stamp(5, 38),
                dhuhr: stamp(11, 52),
                asr: stamp(14, 35),
                maghrib: stamp(16, 53),
                isha: stamp(18, 6),
            }),
            date: Some(DayDate {
                readable: Some(date.format("%d %b %Y").to_string()),
                gregorian: Some(GregorianDate {
                    date: Some(date.format("%d-%m-%Y").to_string()),
                }),
            }),
        }
    }

    fn full_year(year: i32) -> CalendarResponse {
        let mut data: HashMap<String, Vec<DayRecord>> = HashMap::new();
        let mut date = NaiveDate::from_ymd_opt(year, 1, 1).unwrap();
        while date.year() == year {
            data.entry(date.month().to_string())
                .or_default()
                .push(provider_day(date));
            date = date.succ_opt().unwrap();
        }
        CalendarResponse {
            code: Some(200),
            status: Some("OK".to_string()),
            data,
        }
    }

    // ==================== Timestamp Parsing Tests ====================

    #[test]
    fn test_parse_adhan_timestamp_strips_timezone_label() {
        let parsed = parse_adhan_timestamp("2023-01-01T05:38:00-08:00 (PST)").unwrap();
        assert_eq!(parsed.hour(), 5);
        assert_eq!(parsed.minute(), 38);
        assert_eq!(parsed.offset().local_minus_utc(), -8 * 3600);
    }

    #[test]
    fn test_parse_adhan_timestamp_accepts_bare_rfc3339() {
        let parsed = parse_adhan_timestamp("2023-06-15T04:12:00+03:00").unwrap();
        assert_eq!(parsed.date_naive(), NaiveDate::from_ymd_opt(2023, 6, 15).unwrap());
    }

    #[test]
    fn test_parse_adhan_timestamp_rejects_garbage() {
        for raw in ["", "not a time", "05:38", "2023-01-01 (PST)"] {
            let result = parse_adhan_timestamp(raw);
            assert!(
                matches!(result, Err(ScheduleError::MalformedResponse(_))),
                "{raw:?} should be rejected"
            );
        }
    }

    // ==================== Normalization Tests ====================

    #[test]
    fn test_normalize_full_year() {
        let schedule = normalize(&full_year(2023), 2023).unwrap();
        assert_eq!(schedule.len(), 365);
        assert_eq!(
            schedule[0].date,
            NaiveDate::from_ymd_opt(2023, 1, 1).unwrap()
        );
        assert_eq!(
            schedule[364].date,
            NaiveDate::from_ymd_opt(2023, 12, 31).unwrap()
        );
        // Timestamps parsed, iqama not yet derived
        assert_eq!(schedule[0].fajr.unwrap().minute(), 38);
        assert!(schedule[0].iqama.is_none());
    }

    #[test]
    fn test_normalize_leap_year() {
        let schedule = normalize(&full_year(2024), 2024).unwrap();
        assert_eq!(schedule.len(), 366);
    }

    #[test]
    fn test_normalize_orders_days_even_if_months_interleave() {
        let mut resp = full_year(2023);
        // Shuffle one month's records
        resp.data.get_mut("3").unwrap().reverse();
        let schedule = normalize(&resp, 2023).unwrap();
        let march: Vec<_> = schedule.iter().filter(|d| d.date.month() == 3).collect();
        assert_eq!(march[0].date.day(), 1);
        assert_eq!(march[30].date.day(), 31);
    }

    #[test]
    fn test_normalize_rejects_missing_month() {
        let mut resp = full_year(2023);
        resp.data.remove("7");
        let err = normalize(&resp, 2023).unwrap_err();
        assert!(err.to_string().contains("missing month 7"));
    }

    #[test]
    fn test_normalize_rejects_unexpected_month_key() {
        let mut resp = full_year(2023);
        resp.data.insert("13".to_string(), Vec::new());
        let err = normalize(&resp, 2023).unwrap_err();
        assert!(err.to_string().contains("unexpected month key"));
    }

    #[test]
    fn test_normalize_rejects_duplicate_day() {
        let mut resp = full_year(2023);
        let dup = provider_day(NaiveDate::from_ymd_opt(2023, 5, 10).unwrap());
        resp.data.get_mut("5").unwrap().push(dup);
        let err = normalize(&resp, 2023).unwrap_err();
        assert!(err.to_string().contains("twice"));
    }

    #[test]
    fn test_normalize_rejects_gap() {
        let mut resp = full_year(2023);
        resp.data.get_mut("5").unwrap().remove(9);
        let err = normalize(&resp, 2023).unwrap_err();
        assert!(err.to_string().contains("gap"));
    }

    #[test]
    fn test_normalize_rejects_wrong_year_content() {
        let err = normalize(&full_year(2022), 2023).unwrap_err();
        assert!(matches!(err, ScheduleError::MalformedResponse(_)));
    }

    #[test]
    fn test_normalize_rejects_day_without_timings() {
        let mut resp = full_year(2023);
        resp.data.get_mut("1").unwrap()[0].timings = None;
        let err = normalize(&resp, 2023).unwrap_err();
        assert!(err.to_string().contains("no timings object"));
        assert!(err.to_string().contains("2023-01-01"));
    }

    #[test]
    fn test_normalize_rejects_day_missing_one_prayer() {
        let mut resp = full_year(2023);
        resp.data.get_mut("2").unwrap()[3]
            .timings
            .as_mut()
            .unwrap()
            .maghrib = None;
        let err = normalize(&resp, 2023).unwrap_err();
        assert!(err.to_string().contains("no Maghrib timing"));
    }

    #[test]
    fn test_normalize_rejects_unparsable_timestamp() {
        let mut resp = full_year(2023);
        resp.data.get_mut("2").unwrap()[3]
            .timings
            .as_mut()
            .unwrap()
            .isha = Some("soon".to_string());
        let err = normalize(&resp, 2023).unwrap_err();
        assert!(err.to_string().contains("unparsable adhan timestamp"));
    }

    #[test]
    fn test_normalize_rejects_day_without_date() {
        let mut resp = full_year(2023);
        resp.data.get_mut("9").unwrap()[0].date = None;
        let err = normalize(&resp, 2023).unwrap_err();
        assert!(err.to_string().contains("missing its gregorian date"));
    }
}
