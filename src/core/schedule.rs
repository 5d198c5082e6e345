use crate::core::{Reading, Series, TimeGrid};

/// The publishable result of a scheduling cycle: one dispatched-power
/// reading per horizon step, in wire units (watts).
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Schedule(Vec<Reading>);

impl Schedule {
    /// Pair optimized per-step values with the grid timestamps.
    #[must_use]
    pub fn from_grid(grid: &TimeGrid, values: impl IntoIterator<Item = f64>) -> Self {
        Self(
            grid.timestamps()
                .zip(values)
                .map(|(time, value)| Reading::new(time, value))
                .collect(),
        )
    }

    /// Fall back to a previously published schedule, unmodified.
    ///
    /// Returns `None` for an empty series: a failed run must never publish
    /// an empty schedule.
    #[must_use]
    pub fn from_previous(previous: &Series) -> Option<Self> {
        if previous.is_empty() {
            None
        } else {
            Some(Self(previous.readings().to_vec()))
        }
    }

    #[must_use]
    pub fn readings(&self) -> &[Reading] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;

    use super::*;
    use crate::core::tests::timestamp;

    #[test]
    fn pairs_values_with_grid_timestamps() {
        let grid =
            TimeGrid::try_new(timestamp(0), timestamp(1800), TimeDelta::seconds(900)).unwrap();
        let schedule = Schedule::from_grid(&grid, [100.0, 200.0, 300.0]);
        assert_eq!(
            schedule.readings(),
            [
                Reading::new(timestamp(0), 100.0),
                Reading::new(timestamp(900), 200.0),
                Reading::new(timestamp(1800), 300.0),
            ],
        );
    }

    #[test]
    fn fallback_republishes_the_previous_schedule_unmodified() {
        let previous: Series =
            [Reading::new(timestamp(0), 1500.0), Reading::new(timestamp(900), -250.0)]
                .into_iter()
                .collect();
        let schedule = Schedule::from_previous(&previous).unwrap();
        assert_eq!(schedule.readings(), previous.readings());
    }

    #[test]
    fn fallback_refuses_an_empty_schedule() {
        assert!(Schedule::from_previous(&Series::default()).is_none());
    }
}
