use std::path::PathBuf;

use anyhow::Result;
use chrono::{Datelike, NaiveDate, NaiveTime};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::ScheduleError;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub provider: ProviderConfig,
    pub network: NetworkConfig,
    pub query: QueryConfig,
    pub iqama: IqamaSettings,
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    pub base_url: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "http://api.aladhan.com".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct NetworkConfig {
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

/// Identifies one annual calendar query against the timing provider.
#[derive(Debug, Deserialize, Clone)]
pub struct QueryConfig {
    pub address: String,
    pub year: i32,
    /// Provider calculation method, passed through opaquely.
    /// See https://aladhan.com/calculation-methods
    pub method: u32,
}

/// Raw per-prayer adjustment settings as loaded from file/environment.
/// Validated into an [`IqamaConfig`] before any rule runs.
#[derive(Debug, Deserialize, Clone)]
pub struct IqamaSettings {
    pub fajr_delay: i64,
    pub asr_delay: i64,
    pub maghrib_delay: i64,
    pub isha_delay: i64,
    pub maghrib_ramzan_delay: i64,
    pub dhuhr_time: String,
    pub min_fajr_time: String,
    pub min_isha_time: String,
    pub max_isha_time: String,
    /// Seasonal window bounds, `YYYY-MM-DD`. Both set or both unset.
    pub ramzan_start: Option<String>,
    pub ramzan_end: Option<String>,
}

impl Default for IqamaSettings {
    fn default() -> Self {
        Self {
            fajr_delay: 15,
            asr_delay: 15,
            maghrib_delay: 10,
            isha_delay: 10,
            maghrib_ramzan_delay: 15,
            dhuhr_time: "1:30".to_string(),
            min_fajr_time: "5:00".to_string(),
            min_isha_time: "8:15".to_string(),
            max_isha_time: "9:30".to_string(),
            ramzan_start: None,
            ramzan_end: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    pub csv_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            csv_path: "iqama_schedule.csv".to_string(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        // Load .env file (silently ignore if not present - production uses env vars directly)
        let _ = dotenvy::dotenv();

        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("iqama-schedule");

        let current_year = i64::from(chrono::Local::now().year());

        let builder = Config::builder()
            // 1. Load default values
            // Provider
            .set_default("provider.base_url", "http://api.aladhan.com")?
            // Network
            .set_default("network.request_timeout_secs", 30)?
            .set_default("network.connect_timeout_secs", 10)?
            // Query
            .set_default("query.address", "")?
            .set_default("query.year", current_year)?
            .set_default("query.method", 2)?
            // Iqama adjustments
            .set_default("iqama.fajr_delay", 15)?
            .set_default("iqama.asr_delay", 15)?
            .set_default("iqama.maghrib_delay", 10)?
            .set_default("iqama.isha_delay", 10)?
            .set_default("iqama.maghrib_ramzan_delay", 15)?
            .set_default("iqama.dhuhr_time", "1:30")?
            .set_default("iqama.min_fajr_time", "5:00")?
            .set_default("iqama.min_isha_time", "8:15")?
            .set_default("iqama.max_isha_time", "9:30")?
            .set_default("iqama.ramzan_start", None::<String>)?
            .set_default("iqama.ramzan_end", None::<String>)?
            // Output
            .set_default("output.csv_path", "iqama_schedule.csv")?

            // 2. Load from local config file (optional, lowest priority)
            .add_source(File::from(PathBuf::from("config.toml")).required(false))

            // 3. Load from user config directory (optional, overrides local)
            .add_source(File::from(config_dir.join("config.toml")).required(false))

            // 4. Load from Environment variables (IQAMA__QUERY__ADDRESS=...)
            .add_source(Environment::with_prefix("IQAMA").separator("__"));

        let s = builder.build()?;
        Ok(s.try_deserialize()?)
    }
}

// ==================== Clock-Time Parsing ====================

fn invalid_clock_time(value: &str) -> ScheduleError {
    ScheduleError::Configuration(format!("invalid clock time {value:?}, expected H:MM"))
}

/// Parse an `H:MM` or `H:MM:SS` clock-time string into (hour, minute).
///
/// The seconds component, when present, is ignored. Out-of-range hours or
/// minutes are rejected rather than defaulted.
pub fn parse_clock_time(value: &str) -> Result<(u32, u32), ScheduleError> {
    let parts: Vec<&str> = value.trim().split(':').collect();
    if parts.len() < 2 || parts.len() > 3 {
        return Err(invalid_clock_time(value));
    }
    let hour: u32 = parts[0].parse().map_err(|_| invalid_clock_time(value))?;
    let minute: u32 = parts[1].parse().map_err(|_| invalid_clock_time(value))?;
    if hour > 23 || minute > 59 {
        return Err(invalid_clock_time(value));
    }
    Ok((hour, minute))
}

/// Parse a morning clock time, taken literally ("5:00" is 05:00).
pub fn morning_time(value: &str) -> Result<NaiveTime, ScheduleError> {
    let (hour, minute) = parse_clock_time(value)?;
    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| invalid_clock_time(value))
}

/// Parse an afternoon/evening clock time.
///
/// Mosque announcement boards write these in 12-hour form: hours 1-11 mean
/// PM ("1:30" is 13:30, "8:15" is 20:15). Hours 0 and 12-23 are literal.
pub fn evening_time(value: &str) -> Result<NaiveTime, ScheduleError> {
    let (hour, minute) = parse_clock_time(value)?;
    let hour = if (1..=11).contains(&hour) { hour + 12 } else { hour };
    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| invalid_clock_time(value))
}

// ==================== Validated Domain Configuration ====================

/// Immutable, validated configuration for one schedule build.
///
/// Construction is the only place configuration errors can surface; the rule
/// engine itself never re-validates.
#[derive(Debug, Clone)]
pub struct IqamaConfig {
    pub address: String,
    pub year: i32,
    pub method: u32,
    pub fajr_delay: i64,
    pub asr_delay: i64,
    pub maghrib_delay: i64,
    pub isha_delay: i64,
    pub maghrib_ramzan_delay: i64,
    pub dhuhr_time: NaiveTime,
    pub min_fajr_time: NaiveTime,
    pub min_isha_time: NaiveTime,
    pub max_isha_time: NaiveTime,
    /// Seasonal window (start, end); start exclusive, end inclusive.
    pub ramzan: Option<(NaiveDate, NaiveDate)>,
}

impl IqamaConfig {
    pub fn new(query: &QueryConfig, settings: &IqamaSettings) -> Result<Self, ScheduleError> {
        if query.address.trim().is_empty() {
            return Err(ScheduleError::Configuration(
                "query address must not be empty".to_string(),
            ));
        }

        for (name, delay) in [
            ("fajr_delay", settings.fajr_delay),
            ("asr_delay", settings.asr_delay),
            ("maghrib_delay", settings.maghrib_delay),
            ("isha_delay", settings.isha_delay),
            ("maghrib_ramzan_delay", settings.maghrib_ramzan_delay),
        ] {
            if delay < 0 {
                return Err(ScheduleError::Configuration(format!(
                    "{name} must not be negative, got {delay}"
                )));
            }
        }

        let dhuhr_time = evening_time(&settings.dhuhr_time)?;
        let min_fajr_time = morning_time(&settings.min_fajr_time)?;
        let min_isha_time = evening_time(&settings.min_isha_time)?;
        let max_isha_time = evening_time(&settings.max_isha_time)?;

        if min_isha_time > max_isha_time {
            return Err(ScheduleError::Configuration(format!(
                "min_isha_time {min_isha_time} is after max_isha_time {max_isha_time}"
            )));
        }

        let ramzan = match (&settings.ramzan_start, &settings.ramzan_end) {
            (None, None) => None,
            (Some(start), Some(end)) => {
                let start = parse_window_date("ramzan_start", start)?;
                let end = parse_window_date("ramzan_end", end)?;
                if end < start {
                    return Err(ScheduleError::Configuration(format!(
                        "ramzan_end {end} is before ramzan_start {start}"
                    )));
                }
                Some((start, end))
            }
            _ => {
                return Err(ScheduleError::Configuration(
                    "ramzan_start and ramzan_end must be set together".to_string(),
                ));
            }
        };

        Ok(Self {
            address: query.address.clone(),
            year: query.year,
            method: query.method,
            fajr_delay: settings.fajr_delay,
            asr_delay: settings.asr_delay,
            maghrib_delay: settings.maghrib_delay,
            isha_delay: settings.isha_delay,
            maghrib_ramzan_delay: settings.maghrib_ramzan_delay,
            dhuhr_time,
            min_fajr_time,
            min_isha_time,
            max_isha_time,
            ramzan,
        })
    }
}

fn parse_window_date(name: &str, value: &str) -> Result<NaiveDate, ScheduleError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        ScheduleError::Configuration(format!("invalid {name} {value:?}, expected YYYY-MM-DD"))
    })
}
