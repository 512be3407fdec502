//! Version lookups.
//!
//! Accepted response bodies, tried in order:
//!
//! 1. a JSON object with a `version` field (string or number)
//! 2. a bare JSON string
//! 3. a single plain-text token such as `1.4.2` or `2024.03.1-rc1`

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use serde_json::value::RawValue;
use tracing::debug;

use lisa_core::Service;

use crate::error::{HealthResult, VersionError};

/// Longest plain-text body accepted as a version token.
const MAX_TEXT_VERSION_LEN: usize = 64;

/// Fetches deployed version strings. No caching; one request per call.
#[derive(Debug, Clone)]
pub struct VersionChecker {
    client: reqwest::Client,
    timeout: Duration,
}

impl VersionChecker {
    pub fn new(timeout: Duration) -> HealthResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("lisa-health/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, timeout })
    }

    /// Fetch and extract the version reported by a service.
    pub async fn get_version(&self, service: &Service) -> Result<String, VersionError> {
        let url = service.version_check_url.as_str();
        let unreachable = |reason: String| VersionError::Unreachable {
            url: url.to_string(),
            reason,
        };

        let body = tokio::time::timeout(self.timeout, async {
            let resp = self.client.get(url).send().await?;
            let resp = resp.error_for_status()?;
            resp.text().await
        })
        .await
        .map_err(|_| unreachable(format!("timed out after {:?}", self.timeout)))?
        .map_err(|e| unreachable(e.to_string()))?;

        let version = parse_version(&body).map_err(|reason| VersionError::MalformedResponse {
            url: url.to_string(),
            reason: reason.to_string(),
        })?;
        debug!(service_id = %service.id, %version, "version fetched");
        Ok(version)
    }
}

#[derive(Deserialize)]
struct VersionDocument<'a> {
    #[serde(borrow)]
    version: Option<&'a RawValue>,
}

/// Extract a version string from a response body.
///
/// Versions are returned as written: `1.10` stays `1.10`, in plain text
/// and in a JSON `version` field alike.
pub fn parse_version(body: &str) -> Result<String, &'static str> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Err("empty body");
    }

    let candidate = if trimmed.starts_with('{') {
        let doc: VersionDocument<'_> =
            serde_json::from_str(trimmed).map_err(|_| "body is not a valid JSON object")?;
        let raw = doc.version.ok_or("JSON body has no `version` field")?;
        version_from_raw(raw)?
    } else if trimmed.starts_with('"') {
        serde_json::from_str::<String>(trimmed)
            .map_err(|_| "body is not a valid JSON string")?
            .trim()
            .to_string()
    } else {
        return plain_token(trimmed);
    };

    if candidate.is_empty() {
        return Err("empty version");
    }
    Ok(candidate)
}

fn version_from_raw(raw: &RawValue) -> Result<String, &'static str> {
    let text = raw.get().trim();
    if text.starts_with('"') {
        let s: String = serde_json::from_str(text).map_err(|_| "`version` field is not a string")?;
        return Ok(s.trim().to_string());
    }
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Number(_)) => Ok(text.to_string()),
        _ => Err("`version` field is not a string"),
    }
}

fn plain_token(trimmed: &str) -> Result<String, &'static str> {
    if trimmed.len() > MAX_TEXT_VERSION_LEN || trimmed.contains(char::is_whitespace) {
        return Err("body is not a single version token");
    }
    if trimmed.starts_with('<') || trimmed.starts_with('[') {
        return Err("body is not a version string");
    }
    if matches!(trimmed, "true" | "false" | "null") {
        return Err("body is not a version string");
    }
    Ok(trimmed.to_string())
}
