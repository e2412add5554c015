use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, NaiveTime};
use serde::Serialize;

use crate::schedule::DailyTimings;

/// One CSV row: the date, the five adhan clock times, the five iqama times.
#[derive(Debug, Serialize)]
struct ScheduleRow {
    date: String,
    fajr: String,
    dhuhr: String,
    asr: String,
    maghrib: String,
    isha: String,
    fajr_iqama: String,
    dhuhr_iqama: String,
    asr_iqama: String,
    maghrib_iqama: String,
    isha_iqama: String,
}

fn clock(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

fn adhan_clock(instant: Option<DateTime<FixedOffset>>) -> String {
    instant.map(|i| i.time().format("%H:%M").to_string()).unwrap_or_default()
}

impl ScheduleRow {
    fn from_day(day: &DailyTimings) -> Result<Self> {
        let iqama = day
            .iqama
            .as_ref()
            .with_context(|| format!("day {} has no iqama times to export", day.date))?;
        Ok(Self {
            date: day.date.format("%Y-%m-%d").to_string(),
            fajr: adhan_clock(day.fajr),
            dhuhr: adhan_clock(day.dhuhr),
            asr: adhan_clock(day.asr),
            maghrib: adhan_clock(day.maghrib),
            isha: adhan_clock(day.isha),
            fajr_iqama: clock(iqama.fajr),
            dhuhr_iqama: clock(iqama.dhuhr),
            asr_iqama: clock(iqama.asr),
            maghrib_iqama: clock(iqama.maghrib),
            isha_iqama: clock(iqama.isha),
        })
    }
}

/// Write a finished schedule as CSV, one row per day.
pub fn write_csv(schedule: &[DailyTimings], path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path).context("Failed to create CSV writer")?;

    for day in schedule {
        wtr.serialize(ScheduleRow::from_day(day)?)
            .context("Failed to serialize schedule row")?;
    }

    wtr.flush().context("Failed to flush CSV writer")?;
    Ok(())
}
