//! Asset fetcher
//!
//! One plain GET per resolved image, re-encoded as base64 for transport.
//! Asset hosts commonly reject default client identifiers, so the request
//! carries the same spoofed user-agent the browser session uses. Failure is
//! never fatal: text is the primary payload and the image is best-effort.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use tracing::{debug, warn};

/// Fetch an image and encode its body as base64
///
/// Returns `None` on any non-200 status or network error, logging the
/// condition.
pub async fn fetch_and_encode(image_url: &str, user_agent: &str) -> Option<String> {
    match fetch(image_url, user_agent).await {
        Ok(encoded) => {
            debug!("Fetched image {} ({} base64 chars)", image_url, encoded.len());
            Some(encoded)
        }
        Err(reason) => {
            warn!("Image fetch degraded to null for {}: {}", image_url, reason);
            None
        }
    }
}

async fn fetch(image_url: &str, user_agent: &str) -> Result<String, String> {
    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(15))
        .user_agent(user_agent)
        .build()
        .map_err(|e| format!("client build failed: {}", e))?;

    let response = client
        .get(image_url)
        .send()
        .await
        .map_err(|e| format!("request failed: {}", e))?;

    if response.status() != reqwest::StatusCode::OK {
        return Err(format!("status {}", response.status()));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| format!("body read failed: {}", e))?;

    Ok(BASE64.encode(&bytes))
}
