//! Detail-page text extraction
//!
//! Navigates to the selected article and collects body text through a
//! fallback chain list. Pages that keep re-rendering after load can
//! invalidate handles between locating and reading them; that stale-reference
//! condition retries the whole collection under a bounded `RetryPolicy`, and
//! exhaustion degrades to an empty string rather than failing the pipeline.

use crate::cdp::CdpClient;
use crate::dom::resolver::{resolve_all, Scope};
use crate::dom::selector::SelectorChain;
use crate::dom::wait::{ReadyCondition, Waiter};
use crate::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Bounded retry for stale-reference and transient conditions
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Collection attempts before giving up
    pub max_attempts: u32,
    /// Pause between attempts
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_secs(1),
        }
    }
}

/// Extracts article text from a detail page
#[derive(Debug, Clone)]
pub struct DetailExtractor {
    /// Readiness waiter for the detail page
    pub waiter: Waiter,
    /// Retry policy for stale collections
    pub retry: RetryPolicy,
}

impl DetailExtractor {
    /// Create an extractor
    pub fn new(waiter: Waiter, retry: RetryPolicy) -> Self {
        Self { waiter, retry }
    }

    /// Navigate to the detail page and extract its body text
    ///
    /// When `baseline_url` is given, readiness means the page actually left
    /// that URL; a timeout there surfaces to the caller. The text chains then
    /// get a tolerated wait: a page with no matching text elements yields an
    /// empty string, not a failure.
    pub async fn extract_text(
        &self,
        client: &Arc<dyn CdpClient>,
        detail_url: &str,
        baseline_url: Option<&str>,
        chains: &[SelectorChain],
    ) -> Result<String> {
        client.navigate(detail_url).await?;

        if let Some(baseline) = baseline_url {
            self.waiter
                .wait_until(client, ReadyCondition::UrlDiffersFrom(baseline))
                .await?;
        }

        if let Some(first) = chains.first() {
            if let Err(e) = self
                .waiter
                .wait_until(client, ReadyCondition::ChainMatches(first))
                .await
            {
                debug!("Primary text chain never matched ({}), trying fallbacks", e);
            }
        }

        let mut attempt = 0;
        loop {
            attempt += 1;

            match self.collect(client, chains).await {
                Ok(text) => return Ok(text),
                Err(e) if e.is_stale() && attempt < self.retry.max_attempts => {
                    warn!(
                        "Stale reference during text collection (attempt {}/{}), retrying",
                        attempt, self.retry.max_attempts
                    );
                    tokio::time::sleep(self.retry.backoff).await;
                }
                Err(e) if e.is_stale() => {
                    warn!(
                        "Text collection still stale after {} attempts, reporting empty text",
                        self.retry.max_attempts
                    );
                    return Ok(String::new());
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// One collection pass: first chain with matches wins, texts joined by a
    /// single space, empty texts skipped
    async fn collect(&self, client: &Arc<dyn CdpClient>, chains: &[SelectorChain]) -> Result<String> {
        for chain in chains {
            let handles = resolve_all(client, Scope::Document, chain).await?;
            if handles.is_empty() {
                continue;
            }

            debug!("Text chain {} matched {} element(s)", chain, handles.len());

            let mut parts = Vec::new();
            for handle in &handles {
                let text = handle.text().await?;
                if !text.is_empty() {
                    parts.push(text);
                }
            }

            return Ok(parts.join(" "));
        }

        Ok(String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cdp::mock::MockCdpClient;
    use crate::dom::selector::SelectorQuery;
    use crate::Error;

    fn extractor() -> DetailExtractor {
        DetailExtractor::new(
            Waiter::new(Duration::from_millis(5), Duration::from_millis(50)),
            RetryPolicy {
                max_attempts: 3,
                backoff: Duration::from_millis(5),
            },
        )
    }

    fn chains() -> Vec<SelectorChain> {
        vec![
            SelectorChain::single(SelectorQuery::css(".cuerpo p")),
            SelectorChain::single(SelectorQuery::css("article p")),
        ]
    }

    #[tokio::test]
    async fn test_joins_nonempty_texts_with_spaces() {
        let mock = Arc::new(MockCdpClient::new());
        let cdp: Arc<dyn CdpClient> = mock.clone();

        mock.on_eval(r#"cuerpo p"}])"#, serde_json::json!(3));
        mock.on_eval(r#"cuerpo p"}], null)"#, serde_json::json!(r#"{"slots": [1, 2, 3]}"#));
        mock.on_eval("(1)", serde_json::json!(r#"{"text": "Uno."}"#));
        mock.on_eval("(2)", serde_json::json!(r#"{"text": "  "}"#));
        mock.on_eval("(3)", serde_json::json!(r#"{"text": " Tres. "}"#));

        let text = extractor()
            .extract_text(&cdp, "https://diario.example/articles/a", None, &chains())
            .await
            .unwrap();

        assert_eq!(text, "Uno. Tres.");
    }

    #[tokio::test]
    async fn test_falls_back_to_second_chain() {
        let mock = Arc::new(MockCdpClient::new());
        let cdp: Arc<dyn CdpClient> = mock.clone();

        mock.on_eval(r#"cuerpo p"}])"#, serde_json::json!(0));
        mock.on_eval(r#"cuerpo p"}], null)"#, serde_json::json!(r#"{"slots": []}"#));
        mock.on_eval(r#"article p"}], null)"#, serde_json::json!(r#"{"slots": [5]}"#));
        mock.on_eval("(5)", serde_json::json!(r#"{"text": "Desde el fallback."}"#));

        let text = extractor()
            .extract_text(&cdp, "https://diario.example/articles/a", None, &chains())
            .await
            .unwrap();

        assert_eq!(text, "Desde el fallback.");
    }

    #[tokio::test]
    async fn test_no_matches_anywhere_is_empty_string() {
        let mock = Arc::new(MockCdpClient::new());
        let cdp: Arc<dyn CdpClient> = mock.clone();

        mock.on_eval(r#"cuerpo p"}])"#, serde_json::json!(0));
        mock.on_eval(r#"cuerpo p"}], null)"#, serde_json::json!(r#"{"slots": []}"#));
        mock.on_eval(r#"article p"}], null)"#, serde_json::json!(r#"{"slots": []}"#));

        let text = extractor()
            .extract_text(&cdp, "https://diario.example/articles/a", None, &chains())
            .await
            .unwrap();

        assert_eq!(text, "");
    }

    #[tokio::test]
    async fn test_stale_collection_retries_then_succeeds() {
        let mock = Arc::new(MockCdpClient::new());
        let cdp: Arc<dyn CdpClient> = mock.clone();

        mock.on_eval(r#"cuerpo p"}])"#, serde_json::json!(1));
        mock.on_eval(r#"cuerpo p"}], null)"#, serde_json::json!(r#"{"slots": [7]}"#));
        // First read hits a re-render, second lands
        mock.on_eval("(7)", serde_json::json!(r#"{"stale": true}"#));
        mock.on_eval("(7)", serde_json::json!(r#"{"text": "Recuperado."}"#));

        let text = extractor()
            .extract_text(&cdp, "https://diario.example/articles/a", None, &chains())
            .await
            .unwrap();

        assert_eq!(text, "Recuperado.");
    }

    #[tokio::test]
    async fn test_stale_exhaustion_degrades_to_empty() {
        let mock = Arc::new(MockCdpClient::new());
        let cdp: Arc<dyn CdpClient> = mock.clone();

        mock.on_eval(r#"cuerpo p"}])"#, serde_json::json!(1));
        mock.on_eval(r#"cuerpo p"}], null)"#, serde_json::json!(r#"{"slots": [7]}"#));
        mock.on_eval("(7)", serde_json::json!(r#"{"stale": true}"#));

        let text = extractor()
            .extract_text(&cdp, "https://diario.example/articles/a", None, &chains())
            .await
            .unwrap();

        assert_eq!(text, "");
    }

    #[tokio::test]
    async fn test_unchanged_url_surfaces_readiness_timeout() {
        let mock = Arc::new(MockCdpClient::new());
        let cdp: Arc<dyn CdpClient> = mock.clone();
        mock.navigate("https://diario.example/portada").await.unwrap();
        mock.hold_url(true);

        let err = extractor()
            .extract_text(
                &cdp,
                "https://diario.example/articles/a",
                Some("https://diario.example/portada"),
                &chains(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, Error::ReadinessTimeout { .. }));
    }
}
