use chrono::{DateTime, Utc};

use crate::core::Reading;

/// An ordered sequence of readings representing a stepwise-constant
/// (last-observation-carried-forward) signal.
///
/// The constructor sorts, so downstream code may rely on ascending times
/// even when the data service returns readings out of order.
#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Series(Vec<Reading>);

impl Series {
    #[must_use]
    pub fn from_unsorted(mut readings: Vec<Reading>) -> Self {
        readings.sort_by_key(|reading| reading.time);
        Self(readings)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn readings(&self) -> &[Reading] {
        &self.0
    }

    #[must_use]
    pub fn first_time(&self) -> Option<DateTime<Utc>> {
        self.0.first().map(|reading| reading.time)
    }

    #[must_use]
    pub fn last_time(&self) -> Option<DateTime<Utc>> {
        self.0.last().map(|reading| reading.time)
    }

    /// Values in time order, without the timestamps.
    #[must_use]
    pub fn values(&self) -> Vec<f64> {
        self.0.iter().map(|reading| reading.value).collect()
    }

    #[must_use]
    pub fn map_values(mut self, f: impl Fn(f64) -> f64) -> Self {
        for reading in &mut self.0 {
            reading.value = f(reading.value);
        }
        self
    }
}

impl FromIterator<Reading> for Series {
    fn from_iter<I: IntoIterator<Item = Reading>>(iter: I) -> Self {
        Self::from_unsorted(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tests::timestamp;

    #[test]
    fn sorts_on_ingestion() {
        let series = Series::from_unsorted(vec![
            Reading::new(timestamp(30), 7.0),
            Reading::new(timestamp(0), 5.0),
            Reading::new(timestamp(30), 8.0),
        ]);
        assert_eq!(series.first_time(), Some(timestamp(0)));
        assert_eq!(series.last_time(), Some(timestamp(30)));
        assert_eq!(series.values(), [5.0, 7.0, 8.0]);
    }

    #[test]
    fn empty_series_has_no_span() {
        let series = Series::default();
        assert!(series.is_empty());
        assert_eq!(series.first_time(), None);
        assert_eq!(series.last_time(), None);
    }

    #[test]
    fn map_values_rescales() {
        let series: Series = [Reading::new(timestamp(0), 1000.0)].into_iter().collect();
        assert_eq!(series.map_values(|value| value / 1000.0).values(), [1.0]);
    }
}
