//! The two quantities the dispatch model actually needs.

use serde::{Deserialize, Serialize};

/// Power in kilowatts.
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    PartialEq,
    PartialOrd,
    Serialize,
    derive_more::Add,
    derive_more::Display,
    derive_more::From,
    derive_more::FromStr,
    derive_more::Neg,
    derive_more::Sub,
)]
#[display("{_0} kW")]
pub struct Kilowatts(pub f64);

impl Kilowatts {
    #[must_use]
    pub fn from_watts(watts: f64) -> Self {
        Self(watts / 1000.0)
    }

    #[must_use]
    pub fn into_watts(self) -> f64 {
        self.0 * 1000.0
    }
}

/// The wire protocol carries plain watt floats; forecast series stay `f64`
/// end to end, so the per-reading conversions are free functions.
#[must_use]
pub fn watts_to_kilowatts(watts: f64) -> f64 {
    watts / 1000.0
}

#[must_use]
pub fn kilowatts_to_watts(kilowatts: f64) -> f64 {
    kilowatts * 1000.0
}

/// Energy in kilowatt-hours.
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    PartialEq,
    PartialOrd,
    Serialize,
    derive_more::Add,
    derive_more::Display,
    derive_more::From,
    derive_more::FromStr,
    derive_more::Sub,
)]
#[display("{_0} kWh")]
pub struct KilowattHours(pub f64);
