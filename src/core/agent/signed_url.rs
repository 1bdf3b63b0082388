//! Signed-URL retrieval from the agent provider.
//!
//! One authenticated HTTP exchange per call: given an agent id, the
//! provider returns a short-lived WebSocket target for that call. Any
//! failure here is fatal to the requesting session only.

use serde::Deserialize;

use crate::errors::{BridgeError, BridgeResult};

/// Signed-URL endpoint path on the provider API.
pub const SIGNED_URL_PATH: &str = "/v1/convai/conversation/get_signed_url";

#[derive(Debug, Deserialize)]
struct SignedUrlResponse {
    signed_url: String,
}

/// Fetch a time-limited agent-leg connection target.
///
/// `base_url` is configurable so tests can point at a mock issuer.
pub async fn fetch_signed_url(
    http: &reqwest::Client,
    base_url: &str,
    api_key: &str,
    agent_id: &str,
) -> BridgeResult<String> {
    let url = format!("{}{}", base_url.trim_end_matches('/'), SIGNED_URL_PATH);

    let response = http
        .get(&url)
        .query(&[("agent_id", agent_id)])
        .header("xi-api-key", api_key)
        .send()
        .await
        .map_err(|e| BridgeError::SignedUrl(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(BridgeError::SignedUrl(format!(
            "issuer returned {status}: {body}"
        )));
    }

    let body: SignedUrlResponse = response
        .json()
        .await
        .map_err(|e| BridgeError::SignedUrl(e.to_string()))?;

    Ok(body.signed_url)
}
