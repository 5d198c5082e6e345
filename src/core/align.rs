//! Last-observation-carried-forward resampling of irregular readings onto
//! a regular grid.
//!
//! Both operations walk the grid left-to-right with a forward cursor into
//! the sorted series, so the merge stays O(n + N) after the O(n log n)
//! ingestion sort. Do not replace the cursor with a per-point search.

use chrono::{DateTime, TimeDelta, Utc};

use crate::{
    core::{Reading, Series, TimeGrid},
    error::Error,
};

/// Resample onto the grid, carrying `initial` until the series' first
/// entry becomes effective. Produces a value at every grid point.
pub fn align_lenient(
    series: &Series,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    interval: TimeDelta,
    initial: f64,
) -> Result<Series, Error> {
    let grid = TimeGrid::try_new(start, end, interval)?;
    let points = clip(series, end);

    let mut aligned = Vec::with_capacity(grid.len());
    let mut cursor = 0;
    let mut last_value = initial;
    for time in grid.timestamps() {
        cursor = advance(&points, cursor, time);
        if !points.is_empty() && points[cursor].time <= time {
            last_value = points[cursor].value;
        }
        aligned.push(Reading::new(time, last_value));
    }
    Ok(aligned.into_iter().collect())
}

/// Resample onto the grid with no fallback seed: every grid point must be
/// covered by an earlier-or-equal reading, otherwise the cycle fails with
/// a labeled, recoverable error.
pub fn align_strict(
    series: &Series,
    label: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    interval: TimeDelta,
) -> Result<Series, Error> {
    if series.is_empty() {
        return Err(Error::EmptyForecast { label: label.to_string() });
    }
    let grid = TimeGrid::try_new(start, end, interval)?;
    let points = clip(series, end);

    let mut aligned = Vec::with_capacity(grid.len());
    let mut cursor = 0;
    for time in grid.timestamps() {
        cursor = advance(&points, cursor, time);
        match points.get(cursor) {
            Some(point) if point.time <= time => aligned.push(Reading::new(time, point.value)),
            _ => return Err(Error::Uncovered { label: label.to_string(), time }),
        }
    }
    Ok(aligned.into_iter().collect())
}

/// Entries past the horizon end can never become effective.
fn clip(series: &Series, end: DateTime<Utc>) -> Vec<Reading> {
    series.readings().iter().copied().filter(|reading| reading.time <= end).collect()
}

/// Move the cursor to the last entry effective at `time` without ever
/// stepping backwards.
fn advance(points: &[Reading], mut cursor: usize, time: DateTime<Utc>) -> usize {
    while cursor + 1 < points.len() && points[cursor + 1].time <= time {
        cursor += 1;
    }
    cursor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tests::timestamp;

    fn step() -> TimeDelta {
        TimeDelta::seconds(30)
    }

    fn source() -> Series {
        [
            Reading::new(timestamp(60), 5.0),
            Reading::new(timestamp(150), 7.0),
            Reading::new(timestamp(240), 9.0),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn lenient_seeds_initial_before_the_first_entry() {
        let aligned =
            align_lenient(&source(), timestamp(0), timestamp(240), step(), 1.5).unwrap();
        assert_eq!(
            aligned.values(),
            [1.5, 1.5, 5.0, 5.0, 5.0, 7.0, 7.0, 7.0, 9.0],
        );
    }

    #[test]
    fn lenient_carries_the_latest_value_at_or_before_each_point() {
        let aligned =
            align_lenient(&source(), timestamp(60), timestamp(180), step(), 0.0).unwrap();
        assert_eq!(aligned.values(), [5.0, 5.0, 5.0, 7.0, 7.0]);
        assert_eq!(aligned.readings()[0].time, timestamp(60));
        assert_eq!(aligned.readings()[4].time, timestamp(180));
    }

    #[test]
    fn lenient_ignores_entries_past_the_horizon_end() {
        let aligned =
            align_lenient(&source(), timestamp(0), timestamp(120), step(), 0.0).unwrap();
        assert_eq!(aligned.values(), [0.0, 0.0, 5.0, 5.0, 5.0]);
    }

    #[test]
    fn alignment_is_pure() {
        let first = align_lenient(&source(), timestamp(0), timestamp(240), step(), 1.5).unwrap();
        let second = align_lenient(&source(), timestamp(0), timestamp(240), step(), 1.5).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn strict_extracts_a_fully_covered_grid() {
        let aligned =
            align_strict(&source(), "consumption", timestamp(60), timestamp(240), step()).unwrap();
        assert_eq!(aligned.values(), [5.0, 5.0, 5.0, 7.0, 7.0, 7.0, 9.0]);
    }

    #[test]
    fn strict_fails_when_a_grid_point_precedes_every_entry() {
        let result = align_strict(&source(), "production", timestamp(0), timestamp(240), step());
        match result {
            Err(Error::Uncovered { label, time }) => {
                assert_eq!(label, "production");
                assert_eq!(time, timestamp(0));
            }
            other => panic!("expected an uncovered grid point, got {other:?}"),
        }
    }

    #[test]
    fn strict_fails_on_an_empty_series() {
        let result =
            align_strict(&Series::default(), "production", timestamp(0), timestamp(60), step());
        assert!(matches!(result, Err(Error::EmptyForecast { .. })));
    }

    #[test]
    fn both_modes_reject_a_degenerate_horizon() {
        let result = align_lenient(&source(), timestamp(60), timestamp(60), step(), 0.0);
        assert!(matches!(result, Err(Error::Validation(_))));
        let result = align_strict(&source(), "load", timestamp(60), timestamp(0), step());
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn both_modes_reject_a_non_positive_interval() {
        let result =
            align_lenient(&source(), timestamp(0), timestamp(60), TimeDelta::zero(), 0.0);
        assert!(matches!(result, Err(Error::Validation(_))));
        let result =
            align_strict(&source(), "load", timestamp(0), timestamp(60), TimeDelta::seconds(-5));
        assert!(matches!(result, Err(Error::Validation(_))));
    }
}
