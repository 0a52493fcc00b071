//! Browser capability profile

use crate::config::Config;
use rand::Rng;

/// User agent pool drawn from when no override is configured
pub const DESKTOP_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/130.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
];

/// Fixed capability profile a session is acquired with
#[derive(Debug, Clone)]
pub struct BrowserProfile {
    /// Headless mode (no GUI)
    pub headless: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// User agent string
    pub user_agent: String,
    /// Suppress the automation-detection marker the scripting bridge exposes
    pub suppress_automation: bool,
}

impl Default for BrowserProfile {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1920,
            viewport_height: 1080,
            user_agent: pick_user_agent(),
            suppress_automation: true,
        }
    }
}

impl BrowserProfile {
    /// Build a profile from server configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            headless: config.headless,
            viewport_width: config.viewport_width,
            viewport_height: config.viewport_height,
            user_agent: config
                .user_agent
                .clone()
                .unwrap_or_else(pick_user_agent),
            suppress_automation: config.suppress_automation,
        }
    }
}

/// Choose a realistic user agent from the pool
pub fn pick_user_agent() -> String {
    let mut rng = rand::thread_rng();
    DESKTOP_USER_AGENTS[rng.gen_range(0..DESKTOP_USER_AGENTS.len())].to_string()
}
