//! Browser session lifecycle
//!
//! A `BrowserSession` is an owned, exclusive handle to one browser process
//! plus one open page. Operations on it are sequential; it is destroyed at
//! the end of one extraction or on unrecoverable error. Release is idempotent
//! and the process carries `kill_on_drop`, so termination is guaranteed on
//! every exit path, including cancellation.

use crate::browser::launcher::{self, LaunchedBrowser};
use crate::browser::profile::BrowserProfile;
use crate::browser::stealth;
use crate::cdp::{CdpClient, CdpClientImpl, CdpWebSocketConnection};
use crate::{Error, Result};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

/// Exclusive handle to one browser process and one page
#[derive(Debug)]
pub struct BrowserSession {
    id: String,
    client: Arc<dyn CdpClient>,
    launched: Mutex<Option<LaunchedBrowser>>,
}

impl BrowserSession {
    /// Session ID
    pub fn id(&self) -> &str {
        &self.id
    }

    /// CDP client for the session's page
    pub fn client(&self) -> Arc<dyn CdpClient> {
        Arc::clone(&self.client)
    }

    /// Terminate the browser; safe to call more than once
    pub async fn release(&self) {
        let mut launched = self.launched.lock().await;

        if let Some(mut browser) = launched.take() {
            info!("Releasing browser session {}", self.id);

            if let Err(e) = self.client.connection().close().await {
                warn!("Failed to close CDP connection for {}: {}", self.id, e);
            }

            browser.shutdown().await;
        }
    }

    /// Session backed by an existing client; used by tests with a mock CDP
    pub fn with_client(client: Arc<dyn CdpClient>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            client,
            launched: Mutex::new(None),
        }
    }
}

/// Acquires and releases exclusive browser sessions
///
/// Sessions are not pooled: every acquire spawns a fresh process, and
/// concurrent callers each get their own.
#[derive(Debug, Clone, Default)]
pub struct SessionManager {
    chrome_path: Option<String>,
}

impl SessionManager {
    /// Create a session manager
    pub fn new(chrome_path: Option<String>) -> Self {
        Self { chrome_path }
    }

    /// Launch a browser and bootstrap a CDP page connection
    pub async fn acquire(&self, profile: &BrowserProfile) -> Result<BrowserSession> {
        let mut launched = launcher::launch(profile, self.chrome_path.as_deref()).await?;

        match Self::bootstrap(&launched, profile).await {
            Ok(client) => {
                let session = BrowserSession {
                    id: Uuid::new_v4().to_string(),
                    client,
                    launched: Mutex::new(Some(launched)),
                };
                info!("Acquired browser session {}", session.id);
                Ok(session)
            }
            Err(e) => {
                // Connection or profile setup failed after the process came
                // up; reap it before surfacing the error
                launched.shutdown().await;
                Err(Error::session_start(format!("Session bootstrap failed: {}", e)))
            }
        }
    }

    /// Release a session; idempotent
    pub async fn release(&self, session: &BrowserSession) {
        session.release().await;
    }

    async fn bootstrap(
        launched: &LaunchedBrowser,
        profile: &BrowserProfile,
    ) -> Result<Arc<dyn CdpClient>> {
        let ws_url = launched.create_page_target().await?;

        let connection = CdpWebSocketConnection::new(ws_url).await?;
        let client: Arc<dyn CdpClient> = Arc::new(CdpClientImpl::new(connection));

        client.enable_domain("Page").await?;
        client.enable_domain("Runtime").await?;

        stealth::apply_profile(&client, profile).await?;

        Ok(client)
    }
}
