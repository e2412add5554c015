//! Iqama Schedule Library
//!
//! Derives a yearly congregation announcement ("iqama") schedule from the
//! adhan times published by the AlAdhan calendar API: fetch, normalize into
//! date-ordered daily records, then apply per-prayer adjustment rules
//! (minimum floors, fixed delays, quarter-hour ceilings, a seasonal Ramadan
//! window, and a fixed Dhuhr time).

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod normalize;
pub mod rules;
pub mod schedule;

// Re-export commonly used types
pub use api::{AdhanApiClient, CalendarResponse};
pub use config::{AppConfig, IqamaConfig, IqamaSettings, parse_clock_time};
pub use engine::IqamaScheduleBuilder;
pub use error::ScheduleError;
pub use export::write_csv;
pub use normalize::{normalize, parse_adhan_timestamp};
pub use rules::{
    IqamaRule, build_schedule, ceil_quarter_hour, update_asr, update_dhuhr, update_fajr,
    update_isha, update_maghrib,
};
pub use schedule::{DailyTimings, IqamaTimes, Prayer, Schedule};
