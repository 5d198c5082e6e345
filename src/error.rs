use chrono::{DateTime, Utc};

use crate::optimizer::SolverStatus;

/// Domain errors the scheduling cycle must branch on.
///
/// [`Error::Validation`] is fatal and aborts before any solver work. The
/// no-data variants abort the current cycle only; the next scheduled
/// invocation retries. [`Error::Solver`] triggers the fallback to the last
/// published schedule.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid parameters: {0}")]
    Validation(String),

    #[error("no {label} forecast readings")]
    EmptyForecast { label: String },

    #[error("no valid {label} value for {time}")]
    Uncovered { label: String, time: DateTime<Utc> },

    #[error("every input series is empty")]
    AllSeriesEmpty,

    #[error("common forecast window of {actual} s is shorter than the required {minimum} s")]
    ShortHorizon { actual: i64, minimum: i64 },

    #[error("solver failed: {0}")]
    Solver(SolverStatus),
}

impl Error {
    /// Whether the next scheduled cycle is expected to succeed without
    /// operator intervention.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_is_fatal() {
        assert!(!Error::Validation("interval must be positive".into()).is_recoverable());
    }

    #[test]
    fn no_data_is_recoverable() {
        assert!(Error::EmptyForecast { label: "consumption".into() }.is_recoverable());
        assert!(Error::ShortHorizon { actual: 10, minimum: 3600 }.is_recoverable());
    }
}
