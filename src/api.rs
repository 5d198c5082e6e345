//! Datapoint service client.
//!
//! Thin typed wrapper over the REST API the scheduler reads forecasts from
//! and publishes schedules to. Query parameters are built fresh for every
//! request from explicit filter/pagination/sort values. The client itself
//! holds nothing but the base URL and the authorization header.

mod models;

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::{
    Client,
    Url,
    header::{AUTHORIZATION, HeaderMap, HeaderValue},
};
use serde::{Serialize, de::DeserializeOwned};

pub use self::models::{Datapoint, PrognosisConfirmation};
use self::models::{PrognosisPayload, PrognosisReadingPayload};
use crate::{
    core::{Reading, Schedule, Series},
    prelude::*,
};

pub struct Api {
    client: Client,
    base_url: Url,
}

impl Api {
    pub fn try_new(base_url: Url, token: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(token)?);
        let client = Client::builder()
            .user_agent("gridplan")
            .default_headers(headers)
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { client, base_url })
    }

    /// Datapoint metadata: the numeric id, the last reading value and the
    /// last prognosis id.
    #[instrument(skip_all, fields(identifier = identifier))]
    pub async fn get_datapoint(&self, identifier: &str) -> Result<Datapoint> {
        let query = Query::new().filter(Filter::equals("identifier", identifier)).paginate(0, 1);
        let mut datapoints: Vec<Datapoint> = self.get_json("datapoints", &query).await?;
        ensure!(!datapoints.is_empty(), "no datapoint with identifier `{identifier}`");
        Ok(datapoints.swap_remove(0))
    }

    /// The `fetch_scalar` interface: the datapoint's last reading value.
    pub async fn get_last_reading_value(&self, identifier: &str) -> Result<f64> {
        self.get_datapoint(identifier)
            .await?
            .last_reading_value
            .with_context(|| format!("datapoint `{identifier}` has no readings"))
    }

    /// Readings of the datapoint's most recent prognosis, in wire units.
    ///
    /// A datapoint without any prognosis yields an empty series for the
    /// caller to branch on. It is not a transport error.
    #[instrument(skip_all, fields(identifier = identifier))]
    pub async fn get_last_prognosis_readings(&self, identifier: &str) -> Result<Series> {
        let datapoint = self.get_datapoint(identifier).await?;
        let Some(prognosis_id) = datapoint.last_prognosis_id else {
            warn!(identifier, "no prognosis available");
            return Ok(Series::default());
        };
        let query = Query::new()
            .filter(Filter::equals("datapointPrognosisId", prognosis_id))
            .order_by("time", "asc");
        let readings: Vec<Reading> = self.get_json("prognosis-readings", &query).await?;
        ensure!(!readings.is_empty(), "no readings found for prognosis {prognosis_id}");
        Ok(Series::from_unsorted(readings))
    }

    /// Publish the schedule: post the prognosis header first, then every
    /// reading tagged with the returned prognosis id.
    #[instrument(skip_all, fields(datapoint_id = datapoint_id, n_readings = schedule.len()))]
    pub async fn publish_schedule(
        &self,
        datapoint_id: i64,
        published_at: DateTime<Utc>,
        schedule: &Schedule,
    ) -> Result<PrognosisConfirmation> {
        let payload = PrognosisPayload {
            datapoint_id,
            time: published_at,
            readings: schedule.readings(),
        };
        let confirmation: PrognosisConfirmation =
            self.post_json("datapoint-prognoses", &payload).await?;
        for reading in schedule.readings() {
            let payload = PrognosisReadingPayload {
                datapoint_prognosis_id: confirmation.id,
                time: reading.time,
                value: reading.value,
            };
            self.post("prognosis-readings", &payload).await?;
        }
        info!(prognosis_id = confirmation.id, "Published");
        Ok(confirmation)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &Query) -> Result<T> {
        self.client
            .get(self.endpoint(path))
            .query(&query.to_pairs())
            .send()
            .await
            .context("failed to call the datapoint service")?
            .error_for_status()
            .context("the datapoint service rejected the request")?
            .json()
            .await
            .context("failed to deserialize the response")
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        self.client
            .post(self.endpoint(path))
            .json(body)
            .send()
            .await
            .context("failed to call the datapoint service")?
            .error_for_status()
            .context("the datapoint service rejected the request")?
            .json()
            .await
            .context("failed to deserialize the response")
    }

    async fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<()> {
        self.client
            .post(self.endpoint(path))
            .json(body)
            .send()
            .await
            .context("failed to call the datapoint service")?
            .error_for_status()
            .context("the datapoint service rejected the request")?;
        Ok(())
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url.as_str().trim_end_matches('/'))
    }
}

/// One `(field, operator, value)` filter expression, serialized as a
/// `field.operator=value` query parameter.
#[derive(Clone, Debug)]
pub struct Filter {
    field: &'static str,
    operator: Operator,
    value: String,
}

#[derive(Copy, Clone, Debug, derive_more::Display)]
enum Operator {
    #[display("equals")]
    Equals,
}

impl Filter {
    pub fn equals(field: &'static str, value: impl ToString) -> Self {
        Self { field, operator: Operator::Equals, value: value.to_string() }
    }
}

/// Per-request parameter set. Built fresh for every call and serialized in
/// a fixed order: filters first, then sort, then pagination.
#[derive(Clone, Debug, Default)]
struct Query {
    filters: Vec<Filter>,
    sort: Option<(&'static str, &'static str)>,
    page: Option<(u32, u32)>,
}

impl Query {
    fn new() -> Self {
        Self::default()
    }

    fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    fn order_by(mut self, field: &'static str, direction: &'static str) -> Self {
        self.sort = Some((field, direction));
        self
    }

    fn paginate(mut self, page: u32, size: u32) -> Self {
        self.page = Some((page, size));
        self
    }

    fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(self.filters.len() + 3);
        for filter in &self.filters {
            pairs.push((format!("{}.{}", filter.field, filter.operator), filter.value.clone()));
        }
        if let Some((field, direction)) = self.sort {
            pairs.push(("sort".to_string(), format!("{field},{direction}")));
        }
        if let Some((page, size)) = self.page {
            pairs.push(("page".to_string(), page.to_string()));
            pairs.push(("size".to_string(), size.to_string()));
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_serialization_is_deterministic() {
        let query = Query::new()
            .filter(Filter::equals("identifier", "pcc/meter"))
            .filter(Filter::equals("datapointId", 42))
            .order_by("time", "desc")
            .paginate(0, 1);
        assert_eq!(
            query.to_pairs(),
            [
                ("identifier.equals".to_string(), "pcc/meter".to_string()),
                ("datapointId.equals".to_string(), "42".to_string()),
                ("sort".to_string(), "time,desc".to_string()),
                ("page".to_string(), "0".to_string()),
                ("size".to_string(), "1".to_string()),
            ],
        );
    }

    #[test]
    fn datapoint_deserializes_from_wire_fields() {
        let datapoint: Datapoint = serde_json::from_str(
            r#"{
                "id": 7,
                "identifier": "pcc/meter",
                "lastReadingValue": 1500.0,
                "lastPrognosisId": 42
            }"#,
        )
        .unwrap();
        assert_eq!(datapoint.id, 7);
        assert_eq!(datapoint.last_reading_value, Some(1500.0));
        assert_eq!(datapoint.last_prognosis_id, Some(42));
    }

    #[test]
    fn datapoint_tolerates_missing_optional_fields() {
        let datapoint: Datapoint = serde_json::from_str(r#"{"id": 7}"#).unwrap();
        assert_eq!(datapoint.last_reading_value, None);
        assert_eq!(datapoint.last_prognosis_id, None);
    }

    #[test]
    fn endpoint_tolerates_a_trailing_slash() {
        let api = Api::try_new(Url::parse("http://localhost:8080/api/").unwrap(), "token")
            .unwrap();
        assert_eq!(api.endpoint("datapoints"), "http://localhost:8080/api/datapoints");
    }
}
