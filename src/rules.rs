use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, Timelike};

use crate::config::IqamaConfig;
use crate::error::ScheduleError;
use crate::schedule::{DailyTimings, IqamaTimes, Prayer, Schedule};

/// Round an instant up to the next quarter-hour boundary.
///
/// An instant already on a boundary is unchanged; the carry propagates into
/// the hour and date (23:50 rounds to 00:00 of the next day).
pub fn ceil_quarter_hour(instant: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    let past_boundary = i64::from(instant.minute() % 15) * 60 + i64::from(instant.second());
    if past_boundary == 0 {
        return instant;
    }
    instant + Duration::seconds(15 * 60 - past_boundary)
}

/// Fajr: clamp the time-of-day up to `floor` if earlier (date kept), add the
/// delay, round up to the quarter hour.
pub fn update_fajr(
    adhan: DateTime<FixedOffset>,
    floor: NaiveTime,
    delay_minutes: i64,
) -> NaiveTime {
    let clamped = if adhan.time() < floor {
        adhan + (floor - adhan.time())
    } else {
        adhan
    };
    ceil_quarter_hour(clamped + Duration::minutes(delay_minutes)).time()
}

/// Dhuhr: the announcement time is fixed; the provider value is ignored.
pub fn update_dhuhr(fixed: NaiveTime) -> NaiveTime {
    fixed
}

/// Asr: add the delay, round up to the quarter hour.
pub fn update_asr(adhan: DateTime<FixedOffset>, delay_minutes: i64) -> NaiveTime {
    ceil_quarter_hour(adhan + Duration::minutes(delay_minutes)).time()
}

/// Maghrib: the Ramadan delay inside the seasonal window, the plain delay
/// outside it. The window is start-exclusive, end-inclusive; no window means
/// every day is outside. No rounding.
pub fn update_maghrib(
    adhan: DateTime<FixedOffset>,
    date: NaiveDate,
    window: Option<(NaiveDate, NaiveDate)>,
    delay_minutes: i64,
    ramzan_delay_minutes: i64,
) -> NaiveTime {
    let in_ramzan = window.is_some_and(|(start, end)| date > start && date <= end);
    let minutes = if in_ramzan {
        ramzan_delay_minutes
    } else {
        delay_minutes
    };
    (adhan + Duration::minutes(minutes)).time()
}

/// Isha: add the delay, then clamp the time-of-day into `[min, max]`.
pub fn update_isha(
    adhan: DateTime<FixedOffset>,
    delay_minutes: i64,
    min: NaiveTime,
    max: NaiveTime,
) -> NaiveTime {
    (adhan + Duration::minutes(delay_minutes)).time().clamp(min, max)
}

/// The closed set of per-prayer adjustment rules.
///
/// Dispatch is by [`Prayer`] through [`IqamaRule::for_prayer`]; adding a new
/// prayer or policy means adding a variant here, not branching ad hoc in the
/// engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IqamaRule {
    /// Clamp up to a minimum time-of-day, delay, ceil to the quarter hour.
    FloorDelayCeil { floor: NaiveTime, delay: i64 },
    /// Fixed announcement time, identical every day.
    FixedTime { at: NaiveTime },
    /// Delay, then ceil to the quarter hour.
    DelayCeil { delay: i64 },
    /// Alternate delay inside a seasonal date window.
    SeasonalDelay {
        window: Option<(NaiveDate, NaiveDate)>,
        delay: i64,
        window_delay: i64,
    },
    /// Delay, then clamp into an allowed time-of-day range.
    DelayClamp {
        delay: i64,
        min: NaiveTime,
        max: NaiveTime,
    },
}

impl IqamaRule {
    /// The rule one prayer follows under the given configuration.
    pub fn for_prayer(config: &IqamaConfig, prayer: Prayer) -> Self {
        match prayer {
            Prayer::Fajr => Self::FloorDelayCeil {
                floor: config.min_fajr_time,
                delay: config.fajr_delay,
            },
            Prayer::Dhuhr => Self::FixedTime {
                at: config.dhuhr_time,
            },
            Prayer::Asr => Self::DelayCeil {
                delay: config.asr_delay,
            },
            Prayer::Maghrib => Self::SeasonalDelay {
                window: config.ramzan,
                delay: config.maghrib_delay,
                window_delay: config.maghrib_ramzan_delay,
            },
            Prayer::Isha => Self::DelayClamp {
                delay: config.isha_delay,
                min: config.min_isha_time,
                max: config.max_isha_time,
            },
        }
    }

    /// Apply the rule to one day's record, yielding the announcement time.
    ///
    /// The record is not mutated; a rule that needs the adhan instant fails
    /// with [`ScheduleError::IncompleteRecord`] when the record lacks it.
    pub fn apply(&self, day: &DailyTimings, prayer: Prayer) -> Result<NaiveTime, ScheduleError> {
        match *self {
            Self::FixedTime { at } => Ok(update_dhuhr(at)),
            Self::FloorDelayCeil { floor, delay } => {
                Ok(update_fajr(require_adhan(day, prayer)?, floor, delay))
            }
            Self::DelayCeil { delay } => Ok(update_asr(require_adhan(day, prayer)?, delay)),
            Self::SeasonalDelay {
                window,
                delay,
                window_delay,
            } => Ok(update_maghrib(
                require_adhan(day, prayer)?,
                day.date,
                window,
                delay,
                window_delay,
            )),
            Self::DelayClamp { delay, min, max } => {
                Ok(update_isha(require_adhan(day, prayer)?, delay, min, max))
            }
        }
    }
}

fn require_adhan(
    day: &DailyTimings,
    prayer: Prayer,
) -> Result<DateTime<FixedOffset>, ScheduleError> {
    day.adhan(prayer).ok_or(ScheduleError::IncompleteRecord {
        date: day.date,
        prayer,
    })
}

/// Derive announcement times for every record of a normalized schedule.
///
/// Returns the same sequence with `iqama` populated on each record; either
/// every day succeeds or the first failing day's error is returned.
pub fn build_schedule(config: &IqamaConfig, schedule: Schedule) -> Result<Schedule, ScheduleError> {
    schedule
        .into_iter()
        .map(|day| apply_rules(config, day))
        .collect()
}

fn apply_rules(config: &IqamaConfig, mut day: DailyTimings) -> Result<DailyTimings, ScheduleError> {
    let time_for = |prayer: Prayer| IqamaRule::for_prayer(config, prayer).apply(&day, prayer);
    let iqama = IqamaTimes {
        fajr: time_for(Prayer::Fajr)?,
        dhuhr: time_for(Prayer::Dhuhr)?,
        asr: time_for(Prayer::Asr)?,
        maghrib: time_for(Prayer::Maghrib)?,
        isha: time_for(Prayer::Isha)?,
    };
    day.iqama = Some(iqama);
    Ok(day)
}
