use chrono::{DateTime, Utc};

/// A single forecast or measurement point.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    derive_more::Constructor,
    serde::Deserialize,
    serde::Serialize,
)]
pub struct Reading {
    pub time: DateTime<Utc>,
    pub value: f64,
}
