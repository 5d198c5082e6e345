use chrono::{DateTime, TimeDelta, Utc};

use crate::{core::Series, error::Error};

/// A canonical regular time grid: `count` points spaced `interval` apart,
/// starting at `start`, with the last point at or before the horizon end.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TimeGrid {
    start: DateTime<Utc>,
    interval: TimeDelta,
    count: usize,
}

impl TimeGrid {
    pub fn try_new(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        interval: TimeDelta,
    ) -> Result<Self, Error> {
        if interval <= TimeDelta::zero() {
            return Err(Error::Validation("interval must be positive".to_string()));
        }
        if start >= end {
            return Err(Error::Validation("start must be before end".to_string()));
        }
        #[allow(clippy::cast_sign_loss)]
        let count = ((end - start).num_seconds() / interval.num_seconds()) as usize + 1;
        Ok(Self { start, interval, count })
    }

    #[must_use]
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    #[must_use]
    pub const fn interval(&self) -> TimeDelta {
        self.interval
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.count
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        // The constructor guarantees at least one point.
        self.count == 0
    }

    /// Timestamp of the `index`-th grid point.
    #[must_use]
    pub fn point(&self, index: usize) -> DateTime<Utc> {
        self.start + self.interval * i32::try_from(index).unwrap_or(i32::MAX)
    }

    pub fn timestamps(&self) -> impl Iterator<Item = DateTime<Utc>> + '_ {
        (0..self.count).map(|index| self.point(index))
    }

    /// The grid step expressed in hours, for energy integration.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn step_hours(&self) -> f64 {
        self.interval.num_seconds() as f64 / 3600.0
    }
}

/// Estimate how many readings are needed to cover a one-hour span at the
/// given interval for a periodic source series.
///
/// Returns 0 for an empty series and when the series starts at or before
/// the horizon start. The estimate is only ever logged.
#[must_use]
pub fn estimate_reading_count(
    series: &Series,
    start: DateTime<Utc>,
    interval: TimeDelta,
) -> usize {
    let Some(first_time) = series.first_time() else {
        return 0;
    };
    let offset_seconds = (first_time - start).num_seconds();
    if offset_seconds <= 0 {
        return 0;
    }
    let interval_seconds = interval.num_seconds();
    #[allow(clippy::cast_sign_loss)]
    let per_series = (3600 / interval_seconds) as usize;
    #[allow(clippy::cast_sign_loss)]
    let lead_in = (offset_seconds as u64).div_ceil(interval_seconds as u64) as usize;
    series.len() * per_series + lead_in
}
