//! Common test utilities
//!
//! Shared helpers for staging scripted listing/detail scenarios on the mock
//! CDP client and for serving canned image bytes over loopback HTTP.

use prensa_oxide::browser::{BrowserProfile, BrowserSession, SessionManager};
use prensa_oxide::cdp::mock::MockCdpClient;
use prensa_oxide::cdp::CdpClient;
use prensa_oxide::dom::{SelectorChain, SelectorQuery, Waiter};
use prensa_oxide::extract::{Extractor, RetryPolicy, SiteRules};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

pub const LISTING_URL: &str = "https://diario.example/portada";

/// Rules with one distinctive selector per field, so mock patterns stay
/// unambiguous
pub fn test_rules() -> SiteRules {
    SiteRules {
        entry_chain: SelectorChain::single(SelectorQuery::css("article.entry")),
        date_chain: SelectorChain::single(SelectorQuery::css(".fecha")),
        link_chain: SelectorChain::single(SelectorQuery::css("a.enlace")),
        link_attr: "href".to_string(),
        thumb_chain: SelectorChain::single(SelectorQuery::css("img.thumb")),
        text_chains: vec![
            SelectorChain::single(SelectorQuery::css(".cuerpo p")),
            SelectorChain::single(SelectorQuery::css("article p")),
        ],
        ..Default::default()
    }
}

/// Extractor with short deadlines suitable for mock-backed tests
pub fn test_extractor() -> Extractor {
    Extractor::new(
        SessionManager::new(None),
        BrowserProfile {
            user_agent: "TestAgent/1.0".to_string(),
            ..Default::default()
        },
        test_rules(),
        Waiter::new(Duration::from_millis(5), Duration::from_millis(80)),
        RetryPolicy {
            max_attempts: 2,
            backoff: Duration::from_millis(5),
        },
    )
}

/// A session backed by a scripted mock client
pub fn mock_session() -> (Arc<MockCdpClient>, BrowserSession) {
    let mock = Arc::new(MockCdpClient::new());
    let session = BrowserSession::with_client(mock.clone() as Arc<dyn CdpClient>);
    (mock, session)
}

/// JSON-string payload the resolver script would return for these slots
pub fn slots_json(slots: &[u64]) -> serde_json::Value {
    let listed = slots
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    serde_json::Value::String(format!(r#"{{"slots": [{}]}}"#, listed))
}

/// Stage one listing entry rooted at `root`: a date element, a link element
/// and optionally a thumbnail element
pub fn stage_entry(
    mock: &MockCdpClient,
    root: u64,
    date_slot: u64,
    date_text: &str,
    link_slot: u64,
    href: &str,
    thumb_slot: Option<u64>,
) {
    mock.on_eval(&format!(r#"fecha"}}], {})"#, root), slots_json(&[date_slot]));
    mock.on_eval(
        &format!("({})", date_slot),
        serde_json::Value::String(format!(r#"{{"text": "{}"}}"#, date_text)),
    );

    mock.on_eval(&format!(r#"enlace"}}], {})"#, root), slots_json(&[link_slot]));
    mock.on_eval(
        &format!(r#"({}, "href")"#, link_slot),
        serde_json::Value::String(format!(r#"{{"value": "{}"}}"#, href)),
    );

    match thumb_slot {
        Some(slot) => mock.on_eval(&format!(r#"thumb"}}], {})"#, root), slots_json(&[slot])),
        None => mock.on_eval(&format!(r#"thumb"}}], {})"#, root), slots_json(&[])),
    }
}

/// Stage the standard two-entry listing: an older article and a newer one
///
/// Entry roots are slots 0 and 1; the newer entry ("/articles/nuevo",
/// 5 marzo 2024) wins the most-recent ranking. Its thumbnail is slot 22.
pub fn stage_two_entry_listing(mock: &MockCdpClient) {
    mock.on_eval(r#".entry"}])"#, serde_json::json!(2));
    mock.on_eval(r#".entry"}], null)"#, slots_json(&[0, 1]));

    stage_entry(mock, 0, 10, "3 marzo 2024", 11, "/articles/viejo", Some(12));
    stage_entry(mock, 1, 20, "5 marzo 2024", 21, "/articles/nuevo", Some(22));
}

/// Stage detail-page text: the primary chain matches the given slots
pub fn stage_detail_text(mock: &MockCdpClient, slots: &[u64], texts: &[&str]) {
    mock.on_eval(r#"cuerpo p"}])"#, serde_json::json!(slots.len()));
    mock.on_eval(r#"cuerpo p"}], null)"#, slots_json(slots));

    for (slot, text) in slots.iter().zip(texts) {
        mock.on_eval(
            &format!("({})", slot),
            serde_json::Value::String(format!(r#"{{"text": "{}"}}"#, text)),
        );
    }
}

/// Serve a fixed HTTP response to every loopback connection
pub async fn spawn_image_server(status_line: &'static str, body: &'static [u8]) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let response = format!(
                    "{}\r\nContent-Type: image/jpeg\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    status_line,
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.write_all(body).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    format!("http://{}/foto.jpg", addr)
}
