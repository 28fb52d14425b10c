//! OpenDataSoft city search client

use async_trait::async_trait;
use serde::Deserialize;

use crate::action::Action;
use crate::state::CityRecord;

pub const DEFAULT_ENDPOINT: &str = "https://public.opendatasoft.com/api/records/1.0/search/";
pub const DEFAULT_DATASET: &str = "geonames-all-cities-with-a-population-1000";

/// Errors from fetching a page of cities
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("server returned {0}")]
    Status(reqwest::StatusCode),
    #[error("response parse error: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A paginated source of city records
#[async_trait]
pub trait CitySource: Send + Sync {
    /// Fetch up to `rows` records starting at row `start`.
    async fn fetch_page(&self, start: u64, rows: u32) -> Result<Vec<CityRecord>, FetchError>;
}

// ============================================================================
// Wire format
// ============================================================================

#[derive(Debug, Deserialize)]
struct SearchResponse {
    records: Vec<RecordResponse>,
}

#[derive(Debug, Deserialize)]
struct RecordResponse {
    recordid: String,
    #[serde(default)]
    fields: RecordFields,
}

#[derive(Debug, Default, Deserialize)]
struct RecordFields {
    name: Option<String>,
    country: Option<String>,
    cou_name_en: Option<String>,
    timezone: Option<String>,
}

fn record_from_response(record: RecordResponse) -> CityRecord {
    let RecordFields {
        name,
        country,
        cou_name_en,
        timezone,
    } = record.fields;
    CityRecord {
        id: record.recordid,
        name: name.unwrap_or_default(),
        country: country.or(cou_name_en).unwrap_or_default(),
        timezone: timezone.unwrap_or_default(),
    }
}

/// Decode a search response body into city records, in response order.
pub fn parse_page(body: &str) -> Result<Vec<CityRecord>, FetchError> {
    let response: SearchResponse = serde_json::from_str(body)?;
    Ok(response
        .records
        .into_iter()
        .map(record_from_response)
        .collect())
}

// ============================================================================
// HTTP client
// ============================================================================

/// `CitySource` backed by the OpenDataSoft records search API
#[derive(Clone, Debug)]
pub struct OpenDataSoftClient {
    http: reqwest::Client,
    endpoint: String,
    dataset: String,
}

impl OpenDataSoftClient {
    pub fn new(endpoint: impl Into<String>, dataset: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            dataset: dataset.into(),
        }
    }

    pub fn page_url(&self, start: u64, rows: u32) -> String {
        format!(
            "{}?dataset={}&rows={}&start={}",
            self.endpoint,
            urlencoding::encode(&self.dataset),
            rows,
            start
        )
    }
}

impl Default for OpenDataSoftClient {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT, DEFAULT_DATASET)
    }
}

#[async_trait]
impl CitySource for OpenDataSoftClient {
    async fn fetch_page(&self, start: u64, rows: u32) -> Result<Vec<CityRecord>, FetchError> {
        let url = self.page_url(start, rows);
        tracing::debug!(%url, "requesting city page");

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }
        let body = response.text().await?;
        parse_page(&body)
    }
}

/// Run one page fetch and turn the outcome into the action the reducer expects.
/// Failures are logged here; the reducer only clears the in-flight marker.
pub async fn load_page(source: &dyn CitySource, page: u32, start: u64, rows: u32) -> Action {
    match source.fetch_page(start, rows).await {
        Ok(records) => {
            tracing::info!(page, count = records.len(), "city page loaded");
            Action::PageDidLoad { page, records }
        }
        Err(error) => {
            tracing::warn!(page, start, %error, "city page fetch failed");
            Action::PageDidError {
                page,
                error: error.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_url() {
        let client = OpenDataSoftClient::default();
        assert_eq!(
            client.page_url(100, 50),
            "https://public.opendatasoft.com/api/records/1.0/search/\
             ?dataset=geonames-all-cities-with-a-population-1000&rows=50&start=100"
        );
    }

    #[test]
    fn test_parse_page() {
        let body = r#"{
            "nhits": 2,
            "records": [
                {
                    "recordid": "abc",
                    "fields": {
                        "name": "London",
                        "cou_name_en": "United Kingdom",
                        "timezone": "Europe/London",
                        "population": 8961989
                    }
                },
                {
                    "recordid": "def",
                    "fields": { "name": "Paris", "country": "France" }
                }
            ]
        }"#;

        let records = parse_page(body).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0],
            CityRecord {
                id: "abc".into(),
                name: "London".into(),
                country: "United Kingdom".into(),
                timezone: "Europe/London".into(),
            }
        );
        assert_eq!(records[1].country, "France");
        assert_eq!(records[1].timezone, "");
    }

    #[test]
    fn test_parse_page_empty_records() {
        assert!(parse_page(r#"{"nhits": 0, "records": []}"#).unwrap().is_empty());
    }

    #[test]
    fn test_parse_page_without_records_is_decode_error() {
        let err = parse_page(r#"{"error": "Unknown dataset", "errorcode": 10002}"#).unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }

    #[test]
    fn test_parse_page_rejects_garbage() {
        let err = parse_page("<html>").unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }
}
