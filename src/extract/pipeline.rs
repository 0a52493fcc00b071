//! Pipeline orchestrator
//!
//! Sequences session acquisition, listing scan, image resolution, detail
//! extraction and asset fetch into one `extract` call. Only failures that
//! make the whole call meaningless propagate: no session, no valid entries,
//! or a detail page that never becomes ready. Everything else degrades the
//! affected field.

use crate::browser::{BrowserProfile, BrowserSession, SessionManager};
use crate::config::Config;
use crate::dom::wait::Waiter;
use crate::extract::detail::{DetailExtractor, RetryPolicy};
use crate::extract::listing::{self, Entry};
use crate::extract::rules::SiteRules;
use crate::extract::{assets, images};
use crate::{Error, Result};
use serde::Serialize;
use std::time::Duration;
use tracing::info;

/// Result of one extraction
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult {
    /// The listing URL the extraction started from
    pub source_url: String,
    /// The selected article's URL
    pub detail_url: String,
    /// Space-joined article text; empty when no text-bearing element matched
    pub text: String,
    /// Resolved lead-image URL, when one was found
    pub image_url: Option<String>,
    /// Base64-encoded image body, when the fetch succeeded
    pub image_base64: Option<String>,
}

/// Composes the pipeline components over one exclusive session per call
#[derive(Debug, Clone)]
pub struct Extractor {
    manager: SessionManager,
    profile: BrowserProfile,
    rules: SiteRules,
    waiter: Waiter,
    retry: RetryPolicy,
}

impl Extractor {
    /// Create an extractor
    pub fn new(
        manager: SessionManager,
        profile: BrowserProfile,
        rules: SiteRules,
        waiter: Waiter,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            manager,
            profile,
            rules,
            waiter,
            retry,
        }
    }

    /// Build an extractor from server configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let rules = match &config.site_rules_path {
            Some(path) => SiteRules::from_file(path)?,
            None => SiteRules::default(),
        };

        Ok(Self::new(
            SessionManager::new(config.chrome_path.clone()),
            BrowserProfile::from_config(config),
            rules,
            Waiter::new(
                Duration::from_millis(config.poll_interval_ms),
                Duration::from_secs(config.readiness_timeout),
            ),
            RetryPolicy {
                max_attempts: config.retry_attempts,
                backoff: Duration::from_secs(config.retry_backoff),
            },
        ))
    }

    /// Extract the most recent article behind a listing URL
    ///
    /// Acquires an exclusive session and releases it on every exit path.
    /// Cancellation is the caller's wall-clock timeout around this future;
    /// the browser process itself is reaped on drop either way.
    pub async fn extract(&self, listing_url: &str) -> Result<ExtractionResult> {
        let session = self.manager.acquire(&self.profile).await?;
        let result = self.extract_with_session(&session, listing_url).await;
        session.release().await;
        result
    }

    /// Extract the N most recent articles behind a listing URL
    pub async fn extract_many(&self, listing_url: &str, max_posts: usize) -> Result<Vec<ExtractionResult>> {
        let session = self.manager.acquire(&self.profile).await?;
        let result = self
            .extract_many_with_session(&session, listing_url, max_posts)
            .await;
        session.release().await;
        result
    }

    /// Run one extraction on an already-acquired session
    pub async fn extract_with_session(
        &self,
        session: &BrowserSession,
        listing_url: &str,
    ) -> Result<ExtractionResult> {
        let client = session.client();

        let entries = listing::scan(&client, listing_url, &self.rules, &self.waiter).await?;
        let winner = listing::most_recent(&entries)
            .cloned()
            .ok_or_else(|| Error::NoValidEntries(listing_url.to_string()))?;

        info!(
            "Most recent entry on {} is {} ({})",
            listing_url, winner.detail_url, winner.date
        );

        // The thumbnail handle dies with the listing document; resolve its
        // URL before following the detail link
        let image_url = match &winner.thumbnail {
            Some(handle) => images::resolve_from_element(handle, listing_url).await,
            None => None,
        };

        let detail = DetailExtractor::new(self.waiter.clone(), self.retry.clone());
        let text = detail
            .extract_text(
                &client,
                &winner.detail_url,
                Some(listing_url),
                &self.rules.text_chains,
            )
            .await?;

        let image_base64 = match &image_url {
            Some(url) => assets::fetch_and_encode(url, &self.profile.user_agent).await,
            None => None,
        };

        Ok(ExtractionResult {
            source_url: listing_url.to_string(),
            detail_url: winner.detail_url,
            text,
            image_url,
            image_base64,
        })
    }

    /// Run a multi-article extraction on an already-acquired session
    pub async fn extract_many_with_session(
        &self,
        session: &BrowserSession,
        listing_url: &str,
        max_posts: usize,
    ) -> Result<Vec<ExtractionResult>> {
        let client = session.client();

        let mut entries = listing::scan(&client, listing_url, &self.rules, &self.waiter).await?;
        entries.sort_by(|a, b| b.date.cmp(&a.date));
        entries.truncate(max_posts.max(1));

        // All image URLs resolve now; every entry handle is stale after the
        // first detail navigation
        let mut selected: Vec<(Entry, Option<String>)> = Vec::with_capacity(entries.len());
        for entry in entries {
            let image_url = match &entry.thumbnail {
                Some(handle) => images::resolve_from_element(handle, listing_url).await,
                None => None,
            };
            selected.push((entry, image_url));
        }

        let detail = DetailExtractor::new(self.waiter.clone(), self.retry.clone());
        let mut results = Vec::with_capacity(selected.len());
        let mut baseline = listing_url.to_string();

        for (entry, image_url) in selected {
            let baseline_url = if entry.detail_url == baseline {
                None
            } else {
                Some(baseline.as_str())
            };

            let text = detail
                .extract_text(&client, &entry.detail_url, baseline_url, &self.rules.text_chains)
                .await?;

            let image_base64 = match &image_url {
                Some(url) => assets::fetch_and_encode(url, &self.profile.user_agent).await,
                None => None,
            };

            results.push(ExtractionResult {
                source_url: listing_url.to_string(),
                detail_url: entry.detail_url.clone(),
                text,
                image_url,
                image_base64,
            });

            baseline = entry.detail_url;
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_defaults() {
        let extractor = Extractor::from_config(&Config::default()).unwrap();
        assert_eq!(extractor.retry.max_attempts, 3);
        assert_eq!(extractor.waiter.timeout(), Duration::from_secs(15));
        assert!(!extractor.rules.entry_chain.is_empty());
    }

    #[test]
    fn test_result_serialization_shape() {
        let result = ExtractionResult {
            source_url: "https://diario.example/portada".to_string(),
            detail_url: "https://diario.example/articles/a".to_string(),
            text: "Hola.".to_string(),
            image_url: None,
            image_base64: None,
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["source_url"], "https://diario.example/portada");
        assert_eq!(json["text"], "Hola.");
        assert!(json["image_url"].is_null());
        assert!(json["image_base64"].is_null());
    }
}
