use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ValidityError;
use crate::ValidityOracle;

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

/// Validity oracle backed by the Yahoo Finance chart endpoint.
///
/// A ticker is valid when the chart metadata names the symbol. Yahoo answers
/// unknown symbols with 404, which is a definite "not valid" rather than an error.
pub struct YahooValidity {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl YahooValidity {
    pub fn new(timeout: Duration) -> Result<Self, ValidityError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent("Mozilla/5.0 (compatible; stockpick)")
            .build()?;

        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn chart_url(&self, identifier: &str) -> String {
        format!(
            "{}/v8/finance/chart/{identifier}?range=1d&interval=1d",
            self.base_url
        )
    }
}

#[async_trait]
impl ValidityOracle for YahooValidity {
    async fn is_valid(&self, identifier: &str) -> Result<bool, ValidityError> {
        let url = self.chart_url(identifier);
        debug!(ticker = %identifier, "Checking ticker with Yahoo");

        let resp = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                ValidityError::Timeout(self.timeout.as_secs())
            } else {
                ValidityError::Http(e)
            }
        })?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            debug!(ticker = %identifier, "Yahoo does not know ticker");
            return Ok(false);
        }
        if !status.is_success() {
            warn!(ticker = %identifier, status = %status, "Yahoo chart lookup failed");
            return Err(ValidityError::Status(status.as_u16()));
        }

        let body: Value = resp.json().await?;
        chart_names_symbol(&body, identifier)
    }
}

/// Inspect a `/v8/finance/chart` body for metadata naming `identifier`.
pub fn chart_names_symbol(body: &Value, identifier: &str) -> Result<bool, ValidityError> {
    let chart = body
        .get("chart")
        .ok_or_else(|| ValidityError::Malformed("missing chart".to_string()))?;

    let Some(results) = chart.get("result").and_then(|r| r.as_array()) else {
        // Yahoo reports unknown symbols as `result: null` plus an error object.
        if chart.get("error").is_some_and(|e| !e.is_null()) {
            return Ok(false);
        }
        return Err(ValidityError::Malformed("missing chart.result".to_string()));
    };

    Ok(results.iter().any(|item| {
        let Some(meta) = item.get("meta") else {
            return false;
        };
        let named = ["shortName", "longName"].iter().any(|field| {
            meta.get(*field)
                .and_then(|n| n.as_str())
                .is_some_and(|n| !n.trim().is_empty())
        });
        named && meta.get("symbol").and_then(|s| s.as_str()) == Some(identifier)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_chart_is_valid() {
        let body = serde_json::json!({
            "chart": {
                "result": [{
                    "meta": {"symbol": "AAPL", "shortName": "Apple Inc.", "regularMarketPrice": 227.5},
                    "timestamp": [1729000000]
                }],
                "error": null
            }
        });
        assert!(chart_names_symbol(&body, "AAPL").unwrap());
    }

    #[test]
    fn long_name_is_enough() {
        let body = serde_json::json!({
            "chart": {"result": [{"meta": {"symbol": "SPY", "longName": "SPDR S&P 500 ETF Trust"}}]}
        });
        assert!(chart_names_symbol(&body, "SPY").unwrap());
    }

    #[test]
    fn unknown_symbol_error_is_invalid() {
        let body = serde_json::json!({
            "chart": {"result": null, "error": {"code": "Not Found", "description": "No data found, symbol may be delisted"}}
        });
        assert!(!chart_names_symbol(&body, "ZZZZZ").unwrap());
    }

    #[test]
    fn meta_without_name_is_invalid() {
        let body = serde_json::json!({
            "chart": {"result": [{"meta": {"symbol": "XYZ", "instrumentType": "NONE"}}]}
        });
        assert!(!chart_names_symbol(&body, "XYZ").unwrap());
    }

    #[test]
    fn other_symbol_does_not_count() {
        let body = serde_json::json!({
            "chart": {"result": [{"meta": {"symbol": "AAPL", "shortName": "Apple Inc."}}]}
        });
        assert!(!chart_names_symbol(&body, "APL").unwrap());
    }

    #[test]
    fn unexpected_shape_is_error() {
        let body = serde_json::json!({"finance": {"error": "Unauthorized"}});
        assert!(matches!(
            chart_names_symbol(&body, "AAPL"),
            Err(ValidityError::Malformed(_))
        ));
    }

    #[test]
    fn base_url_override() {
        let oracle = YahooValidity::new(Duration::from_secs(5))
            .unwrap()
            .with_base_url("http://localhost:9999/");
        assert_eq!(
            oracle.chart_url("MSFT"),
            "http://localhost:9999/v8/finance/chart/MSFT?range=1d&interval=1d"
        );
    }
}
