use chrono::NaiveDate;
use reqwest::StatusCode;
use thiserror::Error;

use crate::schedule::Prayer;

/// Typed errors for schedule construction.
///
/// Every failure is terminal for the `execute` call that raised it: the
/// caller either receives a full year's schedule or one of these, never a
/// partial result.
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// Invalid or contradictory configuration, detected at construction.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// The timing provider answered with a non-success HTTP status.
    #[error("timing provider returned status {status}")]
    Provider { status: StatusCode },

    /// The request to the timing provider could not be completed.
    #[error("timing provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider payload does not match the expected calendar shape.
    #[error("malformed provider response: {0}")]
    MalformedResponse(String),

    /// A specific day is missing a timestamp required by a rule.
    #[error("record for {date} has no {prayer} time")]
    IncompleteRecord { date: NaiveDate, prayer: Prayer },
}
