use chrono::{DateTime, Utc};

use crate::core::Reading;

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Datapoint {
    pub id: i64,

    #[serde(default)]
    pub last_reading_value: Option<f64>,

    #[serde(default)]
    pub last_prognosis_id: Option<i64>,
}

/// Prognosis header posted ahead of the individual readings.
#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PrognosisPayload<'a> {
    pub datapoint_id: i64,
    pub time: DateTime<Utc>,
    pub readings: &'a [Reading],
}

#[derive(Debug, serde::Deserialize)]
pub struct PrognosisConfirmation {
    pub id: i64,
}

#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PrognosisReadingPayload {
    pub datapoint_prognosis_id: i64,
    pub time: DateTime<Utc>,
    pub value: f64,
}
