//! End-to-end pipeline tests
//!
//! Drive the whole extraction pipeline over a scripted mock CDP client:
//! listing scan, most-recent ranking, image resolution, detail-text
//! collection and asset fetch, plus the surfaced failure modes.

mod common;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use common::*;
use prensa_oxide::cdp::CdpClient;
use prensa_oxide::Error;

#[tokio::test]
async fn test_extract_end_to_end() {
    let (mock, session) = mock_session();
    stage_two_entry_listing(&mock);

    // Winner's thumbnail points at a live loopback image
    let body: &[u8] = b"\xff\xd8\xff\xe0fake-jpeg-bytes";
    let image_url = spawn_image_server("HTTP/1.1 200 OK", body).await;
    mock.on_eval(
        "(22)",
        serde_json::Value::String(format!(r#"{{"attrs": {{"src": "{}"}}}}"#, image_url)),
    );

    stage_detail_text(&mock, &[30, 31, 32], &["Uno.", "Dos.", "Tres."]);

    let result = test_extractor()
        .extract_with_session(&session, LISTING_URL)
        .await
        .unwrap();

    assert_eq!(result.source_url, LISTING_URL);
    assert_eq!(result.detail_url, "https://diario.example/articles/nuevo");
    assert_eq!(result.text, "Uno. Dos. Tres.");
    assert_eq!(result.image_url, Some(image_url));
    assert_eq!(result.image_base64, Some(BASE64.encode(body)));

    // One listing load, one detail load, in that order
    assert_eq!(
        mock.navigations(),
        vec![
            LISTING_URL.to_string(),
            "https://diario.example/articles/nuevo".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_extract_with_lazy_thumbnail_and_relative_srcset() {
    let (mock, session) = mock_session();
    stage_two_entry_listing(&mock);

    // Placeholder src, real candidates in srcset; last one wins and joins the base
    mock.on_eval(
        "(22)",
        serde_json::Value::String(
            r#"{"attrs": {"src": "data:image/gif;base64,R0lGOD", "srcset": "img-300.jpg 300w, img-1200.jpg 1200w"}}"#
                .to_string(),
        ),
    );

    stage_detail_text(&mock, &[30], &["Cuerpo."]);

    let result = test_extractor()
        .extract_with_session(&session, LISTING_URL)
        .await
        .unwrap();

    assert_eq!(
        result.image_url,
        Some("https://diario.example/img-1200.jpg".to_string())
    );
    // The URL resolved but nothing serves it; the image degrades to null
    assert_eq!(result.image_base64, None);
    assert_eq!(result.text, "Cuerpo.");
}

#[tokio::test]
async fn test_extract_zero_text_elements_yields_empty_string() {
    let (mock, session) = mock_session();
    stage_two_entry_listing(&mock);
    mock.on_eval("(22)", serde_json::Value::String(r#"{"attrs": {}}"#.to_string()));

    // No text chain ever matches on the detail page
    mock.on_eval(r#"cuerpo p"}])"#, serde_json::json!(0));
    mock.on_eval(r#"cuerpo p"}], null)"#, slots_json(&[]));
    mock.on_eval(r#"article p"}], null)"#, slots_json(&[]));

    let result = test_extractor()
        .extract_with_session(&session, LISTING_URL)
        .await
        .unwrap();

    assert_eq!(result.text, "");
    assert_eq!(result.image_url, None);
    assert_eq!(result.image_base64, None);
}

#[tokio::test]
async fn test_no_valid_entries_when_listing_never_populates() {
    let (mock, session) = mock_session();
    mock.on_eval(r#".entry"}])"#, serde_json::json!(0));

    let err = test_extractor()
        .extract_with_session(&session, LISTING_URL)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::NoValidEntries(_)));
}

#[tokio::test]
async fn test_no_valid_entries_when_every_entry_is_malformed() {
    let (mock, session) = mock_session();
    mock.on_eval(r#".entry"}])"#, serde_json::json!(1));
    mock.on_eval(r#".entry"}], null)"#, slots_json(&[0]));
    // Entry has a date element, but its text never parses
    stage_entry(&mock, 0, 10, "xx yy", 11, "/articles/a", None);

    let err = test_extractor()
        .extract_with_session(&session, LISTING_URL)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::NoValidEntries(_)));
}

#[tokio::test]
async fn test_unparsable_date_excludes_entry_from_ranking() {
    let (mock, session) = mock_session();
    mock.on_eval(r#".entry"}])"#, serde_json::json!(3));
    mock.on_eval(r#".entry"}], null)"#, slots_json(&[0, 1, 2]));

    stage_entry(&mock, 0, 10, "3 marzo 2024", 11, "/articles/a", None);
    stage_entry(&mock, 1, 20, "5 marzo 2024", 21, "/articles/b", None);
    // Newest-looking entry, but its date is garbage: excluded entirely
    stage_entry(&mock, 2, 30, "xx yy", 31, "/articles/c", None);

    stage_detail_text(&mock, &[40], &["Cuerpo."]);

    let result = test_extractor()
        .extract_with_session(&session, LISTING_URL)
        .await
        .unwrap();

    assert_eq!(result.detail_url, "https://diario.example/articles/b");
    assert!(!mock
        .navigations()
        .iter()
        .any(|u| u.ends_with("/articles/c")));
}

#[tokio::test]
async fn test_missing_thumbnail_keeps_entry_and_nulls_image() {
    let (mock, session) = mock_session();
    mock.on_eval(r#".entry"}])"#, serde_json::json!(1));
    mock.on_eval(r#".entry"}], null)"#, slots_json(&[0]));
    stage_entry(&mock, 0, 10, "5 marzo 2024", 11, "/articles/solo", None);

    stage_detail_text(&mock, &[40], &["Cuerpo."]);

    let result = test_extractor()
        .extract_with_session(&session, LISTING_URL)
        .await
        .unwrap();

    assert_eq!(result.detail_url, "https://diario.example/articles/solo");
    assert_eq!(result.image_url, None);
    assert_eq!(result.image_base64, None);
    assert_eq!(result.text, "Cuerpo.");
}

#[tokio::test]
async fn test_detail_page_never_ready_surfaces_readiness_timeout() {
    let (mock, session) = mock_session();
    stage_two_entry_listing(&mock);
    mock.on_eval("(22)", serde_json::Value::String(r#"{"attrs": {}}"#.to_string()));

    // Park the page on the listing URL and freeze it: the detail navigation
    // never takes effect
    mock.navigate(LISTING_URL).await.unwrap();
    mock.hold_url(true);

    let err = test_extractor()
        .extract_with_session(&session, LISTING_URL)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::ReadinessTimeout { .. }));
}

#[tokio::test]
async fn test_extract_many_returns_most_recent_first() {
    let (mock, session) = mock_session();
    stage_two_entry_listing(&mock);
    mock.on_eval("(12)", serde_json::Value::String(r#"{"attrs": {}}"#.to_string()));
    mock.on_eval("(22)", serde_json::Value::String(r#"{"attrs": {}}"#.to_string()));

    mock.on_eval(r#"cuerpo p"}])"#, serde_json::json!(1));
    mock.on_eval(r#"cuerpo p"}], null)"#, slots_json(&[30]));
    mock.on_eval(r#"cuerpo p"}], null)"#, slots_json(&[40]));
    mock.on_eval("(30)", serde_json::Value::String(r#"{"text": "Nuevo cuerpo."}"#.to_string()));
    mock.on_eval("(40)", serde_json::Value::String(r#"{"text": "Viejo cuerpo."}"#.to_string()));

    let results = test_extractor()
        .extract_many_with_session(&session, LISTING_URL, 2)
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].detail_url, "https://diario.example/articles/nuevo");
    assert_eq!(results[0].text, "Nuevo cuerpo.");
    assert_eq!(results[1].detail_url, "https://diario.example/articles/viejo");
    assert_eq!(results[1].text, "Viejo cuerpo.");

    assert_eq!(
        mock.navigations(),
        vec![
            LISTING_URL.to_string(),
            "https://diario.example/articles/nuevo".to_string(),
            "https://diario.example/articles/viejo".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_session_released_after_success_and_failure() {
    // Success path
    let (mock, session) = mock_session();
    stage_two_entry_listing(&mock);
    mock.on_eval("(22)", serde_json::Value::String(r#"{"attrs": {}}"#.to_string()));
    stage_detail_text(&mock, &[30], &["Cuerpo."]);

    test_extractor()
        .extract_with_session(&session, LISTING_URL)
        .await
        .unwrap();
    session.release().await;
    session.release().await;

    // Failure path: release stays safe after an error outcome
    let (mock, session) = mock_session();
    mock.on_eval(r#".entry"}])"#, serde_json::json!(0));

    let _ = test_extractor()
        .extract_with_session(&session, LISTING_URL)
        .await
        .unwrap_err();
    session.release().await;
    session.release().await;
}
