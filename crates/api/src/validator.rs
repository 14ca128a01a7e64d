//! Client for the external Powston code-checker.
//!
//! The studio never interprets the checker's verdict beyond extracting
//! line-numbered findings; everything else is passed through to the caller
//! under `details`.

use reqwest::StatusCode;
use serde_json::Value;

use rulestudio_core::validation::Finding;

/// Errors from the validation proxy. All of them surface as 400s with a
/// distinguishable message; an unreachable checker never crashes the
/// compile/test pipeline.
#[derive(Debug, thiserror::Error)]
pub enum ValidatorError {
    #[error("POWSTON_API_KEY is not set in the environment")]
    MissingApiKey,

    #[error("Powston validation failed: {status} {body}")]
    Upstream { status: StatusCode, body: String },

    #[error("Powston request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Raw validation result, before section attribution.
#[derive(Debug)]
pub struct ValidationReport {
    pub message: Option<String>,
    /// Line-numbered findings extracted from the response body, if the
    /// checker returned a structured report.
    pub findings: Vec<Finding>,
    /// The checker's response body, passed through untouched.
    pub details: Value,
}

/// HTTP client for `POST {base}/api/check_code`.
pub struct PowstonClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl PowstonClient {
    pub fn new(base_url: String, api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            api_key,
        }
    }

    /// Submit a compiled script to the checker.
    pub async fn check_code(&self, compiled: &str) -> Result<ValidationReport, ValidatorError> {
        let api_key = self.api_key.as_deref().ok_or(ValidatorError::MissingApiKey)?;

        let response = self
            .http
            .post(format!("{}/api/check_code", self.base_url))
            .bearer_auth(api_key)
            .json(&serde_json::json!({ "code": compiled }))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ValidatorError::Upstream { status, body });
        }

        // The checker answers with JSON when it has something structured to
        // say, plain text otherwise.
        let details: Value = serde_json::from_str(&body).unwrap_or(Value::String(body));

        let message = match &details {
            Value::Object(map) => map
                .get("message")
                .and_then(Value::as_str)
                .map(ToString::to_string),
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            _ => None,
        };

        Ok(ValidationReport {
            message,
            findings: extract_findings(&details),
            details,
        })
    }
}

/// Pull `(line, message)` findings out of the checker's response body.
///
/// Accepts entries shaped as `{"line": 3, "message": "..."}` or
/// `[3, "..."]`, under any of the keys `errors`, `issues`, or `findings`.
/// Anything else is ignored.
fn extract_findings(details: &Value) -> Vec<Finding> {
    let Value::Object(map) = details else {
        return Vec::new();
    };

    ["errors", "issues", "findings"]
        .iter()
        .filter_map(|key| map.get(*key).and_then(Value::as_array))
        .flatten()
        .filter_map(parse_finding)
        .collect()
}

fn parse_finding(entry: &Value) -> Option<Finding> {
    match entry {
        Value::Object(obj) => {
            let line = obj.get("line")?.as_u64()? as usize;
            let message = obj.get("message")?.as_str()?.to_string();
            Some(Finding { line, message })
        }
        Value::Array(pair) => {
            let line = pair.first()?.as_u64()? as usize;
            let message = pair.get(1)?.as_str()?.to_string();
            Some(Finding { line, message })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_object_shaped_findings() {
        let details = json!({
            "errors": [
                { "line": 3, "message": "undefined name 'prce'" },
                { "line": 10, "message": "syntax error" },
            ]
        });
        let findings = extract_findings(&details);
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].line, 3);
        assert_eq!(findings[1].message, "syntax error");
    }

    #[test]
    fn extracts_pair_shaped_findings() {
        let details = json!({ "issues": [[7, "bad indent"]] });
        let findings = extract_findings(&details);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].line, 7);
        assert_eq!(findings[0].message, "bad indent");
    }

    #[test]
    fn ignores_unstructured_bodies() {
        assert!(extract_findings(&json!("all good")).is_empty());
        assert!(extract_findings(&json!({ "ok": true })).is_empty());
        assert!(extract_findings(&json!({ "errors": ["not a pair"] })).is_empty());
    }
}
