//! Page readiness waiter
//!
//! Rendered pages populate content asynchronously after the initial response,
//! so waiting is condition-polling with a bounded deadline: check, sleep one
//! poll interval, repeat. Fails with `Error::ReadinessTimeout` carrying the
//! condition description once the deadline elapses.

use crate::cdp::CdpClient;
use crate::dom::element::ElementHandle;
use crate::dom::scripts;
use crate::dom::selector::SelectorChain;
use crate::{Error, Result};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Condition the waiter polls for
#[derive(Debug, Clone)]
pub enum ReadyCondition<'a> {
    /// At least one element matches the chain
    ChainMatches(&'a SelectorChain),
    /// The current URL differs from a baseline URL
    UrlDiffersFrom(&'a str),
    /// The element is visible, enabled and not occluded
    Clickable(&'a ElementHandle),
}

impl fmt::Display for ReadyCondition<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadyCondition::ChainMatches(chain) => write!(f, "selector chain {}", chain),
            ReadyCondition::UrlDiffersFrom(url) => write!(f, "url change away from {}", url),
            ReadyCondition::Clickable(handle) => {
                write!(f, "element slot {} clickable", handle.slot())
            }
        }
    }
}

/// Condition poller with a fixed interval and bounded deadline
#[derive(Debug, Clone)]
pub struct Waiter {
    poll_interval: Duration,
    timeout: Duration,
}

impl Waiter {
    /// Create a waiter
    pub fn new(poll_interval: Duration, timeout: Duration) -> Self {
        Self {
            poll_interval,
            timeout,
        }
    }

    /// The configured deadline
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Waiter with the same interval but a different deadline
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        Self {
            poll_interval: self.poll_interval,
            timeout,
        }
    }

    /// Block until the condition holds or the deadline elapses
    pub async fn wait_until(
        &self,
        client: &Arc<dyn CdpClient>,
        condition: ReadyCondition<'_>,
    ) -> Result<()> {
        let deadline = Instant::now() + self.timeout;

        loop {
            if Self::check(client, &condition).await {
                return Ok(());
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(Error::readiness_timeout(
                    condition.to_string(),
                    self.timeout.as_secs(),
                ));
            }

            // Never poll faster than the interval, never sleep past the deadline
            let remaining = deadline - now;
            tokio::time::sleep(remaining.min(self.poll_interval)).await;
        }
    }

    /// Evaluate the condition once; transport hiccups count as "not yet"
    async fn check(client: &Arc<dyn CdpClient>, condition: &ReadyCondition<'_>) -> bool {
        let result = match condition {
            ReadyCondition::ChainMatches(chain) => {
                let script = format!("({})({})", scripts::COUNT_CHAIN_SCRIPT, chain.to_json());
                match client.evaluate(&script, false).await {
                    Ok(result) => Ok(result.as_f64().unwrap_or(0.0) > 0.0),
                    Err(e) => Err(e),
                }
            }
            ReadyCondition::UrlDiffersFrom(baseline) => match client.current_url().await {
                Ok(url) => Ok(url != *baseline),
                Err(e) => Err(e),
            },
            ReadyCondition::Clickable(handle) => handle.is_clickable().await,
        };

        match result {
            Ok(ready) => ready,
            Err(e) => {
                // Mid-navigation evaluations fail routinely; the deadline bounds us
                debug!("Readiness check failed, treating as not ready: {}", e);
                false
            }
        }
    }
}
