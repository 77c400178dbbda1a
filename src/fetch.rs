//! Socrata (SODA) dataset retrieval.
//!
//! One GET per dataset with `$limit` and an optional `$$app_token`. Failures
//! are reported as [`FetchError`]; there is no retry.

use crate::config::Config;
use crate::errors::FetchError;
use crate::models::{RawDataset, RawRecord};
use reqwest::{Client, header::USER_AGENT};
use tracing::info;

pub struct SodaClient {
    http: Client,
    user_agent: String,
    app_token: Option<String>,
}

impl SodaClient {
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(config.fetch_timeout)
            .build()
            .map_err(|source| FetchError::Http {
                dataset: "client".to_string(),
                source,
            })?;

        Ok(Self {
            http,
            user_agent: config.user_agent.clone(),
            app_token: config.app_token.clone(),
        })
    }

    pub async fn fetch(&self, dataset: &str, url: &str, limit: u32) -> Result<RawDataset, FetchError> {
        info!(
            "fetching {dataset}: limit={limit}, authenticated={}",
            self.app_token.is_some()
        );

        let response = self
            .http
            .get(url)
            .query(&query_params(limit, self.app_token.as_deref()))
            .header(USER_AGENT, self.user_agent.as_str())
            .send()
            .await
            .map_err(|source| FetchError::Http {
                dataset: dataset.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                dataset: dataset.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|source| FetchError::Http {
            dataset: dataset.to_string(),
            source,
        })?;
        let records = parse_payload(dataset, &body)?;
        info!("received {} {dataset} rows", records.len());

        Ok(RawDataset {
            name: dataset.to_string(),
            records,
        })
    }
}

fn query_params(limit: u32, app_token: Option<&str>) -> Vec<(&'static str, String)> {
    let mut params = vec![("$limit", limit.to_string())];
    if let Some(token) = app_token {
        params.push(("$$app_token", token.to_string()));
    }
    params
}

/// Decodes a SODA response body: a JSON array whose elements are all objects.
pub fn parse_payload(dataset: &str, body: &[u8]) -> Result<Vec<RawRecord>, FetchError> {
    let malformed = |reason: String| FetchError::Payload {
        dataset: dataset.to_string(),
        reason,
    };

    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(|err| malformed(err.to_string()))?;
    let serde_json::Value::Array(items) = value else {
        return Err(malformed("expected a JSON array".to_string()));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            serde_json::Value::Object(record) => Ok(record),
            other => Err(malformed(format!(
                "element {index} is {} rather than an object",
                json_kind(&other)
            ))),
        })
        .collect()
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, http::StatusCode, routing::get};

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn non_success_status_is_fetch_error() {
        let base = serve(Router::new().route(
            "/cases.json",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        ))
        .await;
        let client = SodaClient::new(&Config::from_lookup(|_| None)).unwrap();

        let err = client
            .fetch("cases", &format!("{base}/cases.json"), 10)
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 500, .. }));
        assert_eq!(err.to_string(), "cases responded with HTTP 500");
    }

    #[tokio::test]
    async fn successful_fetch_returns_named_dataset() {
        let base = serve(Router::new().route(
            "/population.json",
            get(|| async { axum::Json(serde_json::json!([{"fips": "51540"}])) }),
        ))
        .await;
        let client = SodaClient::new(&Config::from_lookup(|_| None)).unwrap();

        let dataset = client
            .fetch("population", &format!("{base}/population.json"), 10)
            .await
            .unwrap();
        assert_eq!(dataset.name, "population");
        assert_eq!(dataset.records.len(), 1);
    }

    #[test]
    fn parses_array_of_objects() {
        let body = br#"[{"fips":"51540","total_cases":"12"},{"fips":"51003"}]"#;
        let records = parse_payload("cases", body).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["total_cases"], "12");
    }

    #[test]
    fn rejects_non_array_payload() {
        let err = parse_payload("cases", br#"{"error":"throttled"}"#).unwrap_err();
        assert!(matches!(err, FetchError::Payload { .. }));
        assert!(err.to_string().contains("cases"));
    }

    #[test]
    fn rejects_non_object_elements() {
        let err = parse_payload("population", b"[{}, 3]").unwrap_err();
        assert!(err.to_string().contains("element 1 is a number"));
    }

    #[test]
    fn rejects_invalid_json() {
        assert!(parse_payload("cases", b"<html>").is_err());
    }

    #[test]
    fn token_is_only_sent_when_configured() {
        assert_eq!(query_params(10, None), vec![("$limit", "10".to_string())]);
        let params = query_params(10, Some("abc"));
        assert!(params.contains(&("$$app_token", "abc".to_string())));
    }
}
