use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};

/// The five daily prayers, in calendar order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Prayer {
    Fajr,
    Dhuhr,
    Asr,
    Maghrib,
    Isha,
}

impl Prayer {
    pub const ALL: [Prayer; 5] = [
        Prayer::Fajr,
        Prayer::Dhuhr,
        Prayer::Asr,
        Prayer::Maghrib,
        Prayer::Isha,
    ];

    /// Name as the timing provider spells it in its `timings` object.
    pub fn name(&self) -> &'static str {
        match self {
            Prayer::Fajr => "Fajr",
            Prayer::Dhuhr => "Dhuhr",
            Prayer::Asr => "Asr",
            Prayer::Maghrib => "Maghrib",
            Prayer::Isha => "Isha",
        }
    }
}

impl fmt::Display for Prayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Congregation announcement times for one day, wall-clock only.
///
/// Announcement times carry no date component: a schedule row says "Fajr
/// iqama at 06:00", not an instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IqamaTimes {
    pub fajr: NaiveTime,
    pub dhuhr: NaiveTime,
    pub asr: NaiveTime,
    pub maghrib: NaiveTime,
    pub isha: NaiveTime,
}

impl IqamaTimes {
    pub fn get(&self, prayer: Prayer) -> NaiveTime {
        match prayer {
            Prayer::Fajr => self.fajr,
            Prayer::Dhuhr => self.dhuhr,
            Prayer::Asr => self.asr,
            Prayer::Maghrib => self.maghrib,
            Prayer::Isha => self.isha,
        }
    }
}

/// One calendar day of provider-published adhan times.
///
/// The adhan instants are timezone-aware (the provider reports them with the
/// query location's UTC offset). `iqama` stays `None` until the rule engine
/// has run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyTimings {
    pub date: NaiveDate,
    pub fajr: Option<DateTime<FixedOffset>>,
    pub dhuhr: Option<DateTime<FixedOffset>>,
    pub asr: Option<DateTime<FixedOffset>>,
    pub maghrib: Option<DateTime<FixedOffset>>,
    pub isha: Option<DateTime<FixedOffset>>,
    pub iqama: Option<IqamaTimes>,
}

impl DailyTimings {
    /// The raw adhan instant for one prayer, if the record carries it.
    pub fn adhan(&self, prayer: Prayer) -> Option<DateTime<FixedOffset>> {
        match prayer {
            Prayer::Fajr => self.fajr,
            Prayer::Dhuhr => self.dhuhr,
            Prayer::Asr => self.asr,
            Prayer::Maghrib => self.maghrib,
            Prayer::Isha => self.isha,
        }
    }
}

/// A full year of daily records, ascending by date, no gaps or duplicates.
/// The normalizer enforces the invariant; consumers may rely on it.
pub type Schedule = Vec<DailyTimings>;
