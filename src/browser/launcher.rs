//! Chromium process launcher
//!
//! Spawns a Chromium with a fixed flag set on an OS-assigned debugging port
//! and a throwaway profile directory, then waits for the DevTools HTTP
//! endpoint to come up. Launch failures kill the child before returning, so
//! a failed acquire never leaves an orphaned browser process.

use crate::browser::profile::BrowserProfile;
use crate::{Error, Result};
use std::process::Stdio;
use tempfile::TempDir;
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

/// Binary names probed when no explicit path is configured
const BROWSER_CANDIDATES: &[&str] = &[
    "google-chrome",
    "google-chrome-stable",
    "chromium",
    "chromium-browser",
];

/// Attempts when polling the DevTools endpoint
const ENDPOINT_ATTEMPTS: u32 = 40;

/// Delay between endpoint polls
const ENDPOINT_POLL: std::time::Duration = std::time::Duration::from_millis(250);

/// A running Chromium owned by one session
#[derive(Debug)]
pub struct LaunchedBrowser {
    child: Option<Child>,
    http_endpoint: String,
    // Held for its Drop: the profile directory outlives the process
    _profile_dir: TempDir,
}

impl LaunchedBrowser {
    /// DevTools HTTP endpoint (e.g., "http://127.0.0.1:43251")
    pub fn http_endpoint(&self) -> &str {
        &self.http_endpoint
    }

    /// Create a new page target and return its WebSocket URL
    ///
    /// Uses the /json/new endpoint, which creates a page and returns its
    /// WebSocket URL directly.
    pub async fn create_page_target(&self) -> Result<String> {
        let url = format!("{}/json/new?about:blank", self.http_endpoint);

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(5))
            .build()
            .map_err(|e| Error::session_start(format!("Failed to create HTTP client: {}", e)))?;

        let response = client
            .put(&url)
            .send()
            .await
            .map_err(|e| Error::session_start(format!("Failed to create page target: {}", e)))?;

        let target_json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| Error::session_start(format!("Failed to parse new target response: {}", e)))?;

        let ws_url = target_json
            .get("webSocketDebuggerUrl")
            .and_then(|v| v.as_str())
            .ok_or_else(|| Error::session_start("No webSocketDebuggerUrl in new target response"))?;

        debug!("Created page target: {}", ws_url);

        Ok(ws_url.to_string())
    }

    /// Terminate the browser process; safe to call more than once
    pub async fn shutdown(&mut self) {
        if let Some(mut child) = self.child.take() {
            debug!("Terminating browser process");
            if let Err(e) = child.start_kill() {
                debug!("Kill signal failed (process likely exited): {}", e);
            }
            if let Err(e) = child.wait().await {
                warn!("Failed to reap browser process: {}", e);
            }
        }
    }
}

/// Launch a Chromium with the given capability profile
pub async fn launch(profile: &BrowserProfile, executable: Option<&str>) -> Result<LaunchedBrowser> {
    let profile_dir = TempDir::new()
        .map_err(|e| Error::session_start(format!("Failed to create profile dir: {}", e)))?;

    let port = free_port()?;

    let candidates: Vec<&str> = match executable {
        // An explicit path must not silently fall back to something else
        Some(path) => vec![path],
        None => BROWSER_CANDIDATES.to_vec(),
    };

    let mut child = None;
    let mut last_error = None;

    for candidate in &candidates {
        match spawn_browser(candidate, profile, port, profile_dir.path()) {
            Ok(spawned) => {
                info!("Launched {} on debugging port {}", candidate, port);
                child = Some(spawned);
                break;
            }
            Err(e) => {
                debug!("Candidate {} failed to spawn: {}", candidate, e);
                last_error = Some(e);
            }
        }
    }

    let child = child.ok_or_else(|| {
        Error::session_start(format!(
            "No usable browser binary among {:?}: {}",
            candidates,
            last_error.map(|e| e.to_string()).unwrap_or_default()
        ))
    })?;

    let mut launched = LaunchedBrowser {
        child: Some(child),
        http_endpoint: format!("http://127.0.0.1:{}", port),
        _profile_dir: profile_dir,
    };

    if let Err(e) = wait_for_endpoint(&mut launched).await {
        launched.shutdown().await;
        return Err(e);
    }

    Ok(launched)
}

/// Spawn the browser process with the fixed flag set
fn spawn_browser(
    binary: &str,
    profile: &BrowserProfile,
    port: u16,
    profile_dir: &std::path::Path,
) -> std::io::Result<Child> {
    let mut command = Command::new(binary);

    if profile.headless {
        command.arg("--headless=new");
    }

    command
        .arg("--no-sandbox")
        .arg("--disable-gpu")
        .arg("--disable-dev-shm-usage")
        .arg("--no-first-run")
        .arg("--no-default-browser-check")
        .arg(format!("--remote-debugging-port={}", port))
        .arg(format!("--user-data-dir={}", profile_dir.display()))
        .arg(format!(
            "--window-size={},{}",
            profile.viewport_width, profile.viewport_height
        ))
        .arg(format!("--user-agent={}", profile.user_agent));

    if profile.suppress_automation {
        command.arg("--disable-blink-features=AutomationControlled");
    }

    command
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
}

/// Ask the OS for a free localhost port
fn free_port() -> Result<u16> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")
        .map_err(|e| Error::session_start(format!("Failed to find a free port: {}", e)))?;
    let port = listener
        .local_addr()
        .map_err(|e| Error::session_start(format!("Failed to read local addr: {}", e)))?
        .port();
    Ok(port)
}

/// Poll /json/version until the DevTools endpoint answers
async fn wait_for_endpoint(launched: &mut LaunchedBrowser) -> Result<()> {
    let url = format!("{}/json/version", launched.http_endpoint);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(2))
        .build()
        .map_err(|e| Error::session_start(format!("Failed to create HTTP client: {}", e)))?;

    for attempt in 0..ENDPOINT_ATTEMPTS {
        // A child that already died will never open the port
        if let Some(child) = launched.child.as_mut() {
            if let Ok(Some(status)) = child.try_wait() {
                return Err(Error::session_start(format!(
                    "Browser exited during startup with {}",
                    status
                )));
            }
        }

        match client.get(&url).send().await {
            Ok(response) if response.status().is_success() => {
                let version: serde_json::Value = response.json().await.unwrap_or_default();
                debug!(
                    "DevTools endpoint ready on attempt {}: {}",
                    attempt + 1,
                    version
                        .get("Browser")
                        .and_then(|v| v.as_str())
                        .unwrap_or("unknown")
                );
                return Ok(());
            }
            Ok(response) => {
                debug!("Endpoint answered {} on attempt {}", response.status(), attempt + 1);
            }
            Err(e) => {
                debug!("Endpoint not ready on attempt {}: {}", attempt + 1, e);
            }
        }

        tokio::time::sleep(ENDPOINT_POLL).await;
    }

    Err(Error::session_start(
        "DevTools endpoint never became ready".to_string(),
    ))
}
