use std::fmt::{Debug, Formatter};

use chrono::{DateTime, TimeDelta, Utc};

use crate::{core::Series, error::Error};

/// The joint-validity window of several forecast series.
#[derive(Copy, Clone, Eq, PartialEq)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Debug for TimeRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}..{:?}", self.start, self.end)
    }
}

impl TimeRange {
    #[must_use]
    pub const fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub fn duration(self) -> TimeDelta {
        self.end - self.start
    }

    /// Require the window to be strictly longer than `minimum`; a window of
    /// exactly the minimal duration is still too short to schedule.
    pub fn ensure_min_duration(self, minimum: TimeDelta) -> Result<(), Error> {
        let duration = self.duration();
        if duration <= minimum {
            return Err(Error::ShortHorizon {
                actual: duration.num_seconds(),
                minimum: minimum.num_seconds(),
            });
        }
        Ok(())
    }
}

/// Intersect the time spans of the given series: the latest of the
/// per-series minima to the earliest of the per-series maxima.
///
/// Empty series are ignored. Fails only when every input is empty. The
/// optimization horizon is clipped to this window so that no source series
/// ever needs extrapolation.
pub fn find_common_time_range<'a>(
    series: impl IntoIterator<Item = &'a Series>,
) -> Result<TimeRange, Error> {
    let mut range: Option<TimeRange> = None;
    for series in series {
        let (Some(first), Some(last)) = (series.first_time(), series.last_time()) else {
            continue;
        };
        range = Some(match range {
            None => TimeRange::new(first, last),
            Some(range) => TimeRange::new(range.start.max(first), range.end.min(last)),
        });
    }
    range.ok_or(Error::AllSeriesEmpty)
}
