//! Automation-marker suppression
//!
//! Pages that serve different content to detected automation key off the
//! `navigator.webdriver` marker and a near-empty plugin list. The init script
//! below runs before any page script on every new document.

use crate::browser::profile::BrowserProfile;
use crate::cdp::CdpClient;
use crate::Result;
use std::sync::Arc;
use tracing::debug;

/// Init script masking the scripting-bridge marker
pub const SUPPRESS_AUTOMATION_SCRIPT: &str = r#"
(function() {
    Object.defineProperty(navigator, 'webdriver', { get: () => false });
    Object.defineProperty(navigator, 'languages', { get: () => ['es-ES', 'es', 'en'] });
    Object.defineProperty(navigator, 'plugins', { get: () => [
        {
            0: { type: "application/x-google-chrome-pdf", suffixes: "pdf", description: "Portable Document Format" },
            description: "Portable Document Format",
            filename: "internal-pdf-viewer",
            length: 1,
            name: "Chrome PDF Plugin"
        }
    ]});
})();
"#;

/// Apply the capability profile to a freshly created page
///
/// User-agent and viewport overrides must land before the first navigation so
/// the listing request already carries them.
pub async fn apply_profile(client: &Arc<dyn CdpClient>, profile: &BrowserProfile) -> Result<()> {
    debug!("Applying browser profile: ua={}", profile.user_agent);

    client.enable_domain("Network").await?;
    client
        .call_method(
            "Network.setUserAgentOverride",
            serde_json::json!({ "userAgent": profile.user_agent }),
        )
        .await?;

    client
        .call_method(
            "Emulation.setDeviceMetricsOverride",
            serde_json::json!({
                "width": profile.viewport_width,
                "height": profile.viewport_height,
                "deviceScaleFactor": 1.0,
                "mobile": false,
            }),
        )
        .await?;

    if profile.suppress_automation {
        client
            .call_method(
                "Page.addScriptToEvaluateOnNewDocument",
                serde_json::json!({ "source": SUPPRESS_AUTOMATION_SCRIPT }),
            )
            .await?;
    }

    Ok(())
}
