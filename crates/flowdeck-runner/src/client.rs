use std::time::Duration;

use futures::future::BoxFuture;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use flowdeck_core::error::{FlowdeckError, Result};
use flowdeck_core::traits::RunBackend;
use flowdeck_core::types::{NodeId, RunRequest, SeriesData};

/// HTTP client for the workflow backend.
pub struct HttpBackend {
    http: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| FlowdeckError::Backend(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

impl RunBackend for HttpBackend {
    fn run_node(&self, request: &RunRequest) -> BoxFuture<'_, Result<String>> {
        let request = request.clone();
        Box::pin(async move {
            let url = format!("{}/run", self.base_url);
            let response = self
                .http
                .post(&url)
                .json(&request)
                .send()
                .await
                .map_err(|e| FlowdeckError::Backend(e.to_string()))?;

            let status = response.status();
            let body = response
                .text()
                .await
                .map_err(|e| FlowdeckError::Backend(e.to_string()))?;

            if !status.is_success() {
                return Err(FlowdeckError::BackendStatus {
                    status: status.as_u16(),
                    body,
                });
            }

            Ok(reply_text(&body))
        })
    }

    fn fetch_series(&self, node_id: NodeId) -> BoxFuture<'_, Option<SeriesData>> {
        Box::pin(async move {
            let url = format!(
                "{}/simulation/{}",
                self.base_url,
                urlencoding::encode(&node_id.to_string())
            );
            let response = match self.http.get(&url).send().await {
                Ok(r) if r.status().is_success() => r,
                Ok(r) => {
                    debug!(%node_id, status = %r.status(), "Series fetch refused");
                    return None;
                }
                Err(e) => {
                    debug!(%node_id, error = %e, "Series fetch failed");
                    return None;
                }
            };

            let value: Value = match response.json().await {
                Ok(v) => v,
                Err(e) => {
                    warn!(%node_id, error = %e, "Series payload is not JSON");
                    return None;
                }
            };

            let series = parse_series(&value);
            if series.is_none() {
                warn!(%node_id, "Series payload has unexpected shape, treating as no data");
            }
            series
        })
    }
}

/// Extract the result text from a 2xx run response body.
///
/// The backend replies with either a bare JSON string or an object carrying an
/// optional `result` field; anything else degrades to the raw body.
pub fn reply_text(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::String(s)) => s,
        Ok(Value::Object(map)) => match map.get("result") {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        },
        _ => body.trim().to_string(),
    }
}

/// Parse a secondary result payload into a series.
///
/// Accepts a 2-element array of numeric arrays, or an object wrapping the same
/// under `data`. Any other shape is `None`: absent data, not an error.
pub fn parse_series(value: &Value) -> Option<SeriesData> {
    let arrays = match value {
        Value::Array(_) => value,
        Value::Object(map) => map.get("data")?,
        _ => return None,
    };

    let pair = arrays.as_array()?;
    if pair.len() != 2 {
        return None;
    }

    let axis = |v: &Value| -> Option<Vec<f64>> {
        v.as_array()?.iter().map(Value::as_f64).collect()
    };

    Some(SeriesData {
        x: axis(&pair[0])?,
        y: axis(&pair[1])?,
    })
}
