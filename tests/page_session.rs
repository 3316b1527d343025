use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use cdp_adapter::MockCdp;
use pagetag::{Pacing, PageError, PageSession, PagetagConfig, ScrollDirection, Tag, TagKind};
use perceiver_structural::test_support::SnapshotBuilder;
use perceiver_structural::Rect;
use perceiver_visual::{not_available_base64, not_available_png, UNAVAILABLE};
use serde_json::{json, Value};

fn layout_metrics(mock: &MockCdp) {
    mock.respond_value(
        "Page.getLayoutMetrics",
        json!({
            "cssVisualViewport": {
                "clientWidth": 1280.0, "clientHeight": 800.0,
                "pageX": 0.0, "pageY": 0.0
            },
            "cssContentSize": { "x": 0, "y": 0, "width": 1280.0, "height": 800.0 }
        }),
    );
}

/// Describes always echo the asked-for node; hit tests resolve through `hit`.
fn script_page<F>(mock: &MockCdp, snapshot: Value, hit: F)
where
    F: Fn(i64, i64) -> i64 + Send + Sync + 'static,
{
    layout_metrics(mock);
    mock.respond_value("DOMSnapshot.captureSnapshot", snapshot)
        .respond("DOM.describeNode", |params| {
            Ok(json!({ "node": { "backendNodeId": params["backendNodeId"] } }))
        })
        .respond("DOM.getNodeForLocation", move |params| {
            let x = params["x"].as_i64().unwrap_or_default();
            let y = params["y"].as_i64().unwrap_or_default();
            Ok(json!({ "backendNodeId": hit(x, y) }))
        });
}

/// A "Save" button above a checkbox.
fn two_controls(mock: &MockCdp) {
    let mut b = SnapshotBuilder::new(1280, 800);
    let html = b.root_html();
    let body = b.boxed(html, "BODY", &[], Rect::new(0, 0, 1280, 800));
    let button = b.boxed(body, "BUTTON", &[("id", Some("save"))], Rect::new(10, 10, 80, 20));
    b.text(button, "Save");
    let checkbox = b.boxed(
        body,
        "INPUT",
        &[("type", Some("checkbox"))],
        Rect::new(20, 100, 13, 13),
    );
    let (button_id, checkbox_id) = (b.backend_id(button), b.backend_id(checkbox));
    let snapshot = serde_json::to_value(b.build()).unwrap();
    script_page(mock, snapshot, move |_, y| if y < 60 { button_id } else { checkbox_id });
}

fn session_with(config: &PagetagConfig) -> (Arc<MockCdp>, PageSession) {
    let mock = Arc::new(MockCdp::new());
    let session = PageSession::with_config(mock.clone(), config).with_pacing(Pacing::immediate());
    (mock, session)
}

fn session() -> (Arc<MockCdp>, PageSession) {
    session_with(&PagetagConfig::default())
}

#[tokio::test]
async fn checked_checkbox_next_to_hidden_div_is_the_only_tag() {
    let (mock, session) = session();
    let mut b = SnapshotBuilder::new(1280, 800);
    let html = b.root_html();
    let body = b.boxed(html, "BODY", &[], Rect::new(0, 0, 1280, 800));
    let checkbox = b.boxed(
        body,
        "INPUT",
        &[("type", Some("checkbox"))],
        Rect::new(20, 20, 13, 13),
    );
    b.checked(checkbox);
    let hidden = b.boxed(body, "DIV", &[], Rect::new(0, 0, 0, 0));
    b.style(hidden, "display", "none").clickable(hidden);
    let checkbox_id = b.backend_id(checkbox);
    script_page(&mock, serde_json::to_value(b.build()).unwrap(), move |_, _| checkbox_id);

    let tags = session.tagify().await.unwrap();
    assert_eq!(tags.len(), 1);
    let tag = tags.get("0").unwrap();
    assert_eq!(tag.kind(), TagKind::Input);
    let Tag::Input(input) = tag else {
        panic!("expected an input tag");
    };
    assert_eq!(input.value.as_deref(), Some("true"));
}

#[tokio::test]
async fn untagify_invalidates_every_number() {
    let (mock, session) = session();
    two_controls(&mock);
    let tags = session.tagify().await.unwrap();
    assert_eq!(tags.len(), 2);

    session.untagify().await;
    assert!(session.tagged_elements().is_empty());
    mock.clear_log();

    for annotation in [0, 1] {
        let err = session.click(annotation).await.unwrap_err();
        assert!(err.is_invalid_input(), "{err}");
    }
    assert!(mock.calls_to("Input.dispatchMouseEvent").is_empty());
}

#[tokio::test]
async fn second_pass_numbers_after_the_first() {
    let (mock, session) = session();
    two_controls(&mock);

    let first = session.tagify().await.unwrap();
    assert_eq!(first.iter().map(|(k, _)| k).collect::<Vec<_>>(), ["0", "1"]);
    let second = session.tagify().await.unwrap();
    assert_eq!(second.iter().map(|(k, _)| k).collect::<Vec<_>>(), ["2", "3"]);
    assert_eq!(second.get("2").unwrap().tag_name(), "BUTTON");

    mock.clear_log();
    let stale = session.click(0).await.unwrap_err();
    assert!(stale.is_invalid_input());
    assert!(mock.calls().is_empty());

    let report = session.click(2).await.unwrap();
    assert_eq!(report.annotation, Some(2));
    let events = mock.calls_to("Input.dispatchMouseEvent");
    assert_eq!(events.len(), 4);
    assert_eq!(events[1]["type"], "mousePressed");
    assert_eq!((events[1]["x"].clone(), events[1]["y"].clone()), (json!(50), json!(20)));
}

#[tokio::test]
async fn out_of_range_click_leaves_the_table_alone() {
    let (mock, session) = session();
    two_controls(&mock);
    session.tagify().await.unwrap();
    let before = session.tagged_elements();

    let err = session.click(2).await.unwrap_err();
    assert!(matches!(
        err,
        PageError::Action(pagetag::ActionError::AnnotationOutOfRange(2))
    ));

    let after = session.tagged_elements();
    assert!(Arc::ptr_eq(&before, &after));
    assert_eq!(after.len(), 2);
}

#[tokio::test]
async fn unsupported_scroll_direction_sends_nothing() {
    let (mock, session) = session();
    two_controls(&mock);
    session.tagify().await.unwrap();
    mock.clear_log();

    let err = session.scroll(0, ScrollDirection::Left).await.unwrap_err();
    assert!(err.is_invalid_input());
    assert!(mock.calls().is_empty());
}

#[tokio::test]
async fn slow_screenshot_degrades_to_placeholder() {
    let mut config = PagetagConfig::default();
    config.timeouts.screenshot_ms = 50;
    let (mock, session) = session_with(&config);
    two_controls(&mock);
    session.tagify().await.unwrap();
    let before = session.tagged_elements();

    mock.delay("Page.captureScreenshot", Duration::from_secs(10));
    let shot = session.take_screenshot().await.unwrap();

    assert_eq!(shot.error.as_deref(), Some(UNAVAILABLE));
    assert!(!shot.is_available());
    assert_eq!(shot.b64_image, not_available_base64().unwrap());
    assert!(Arc::ptr_eq(&before, &session.tagged_elements()));
}

#[tokio::test]
async fn screenshot_carries_the_overlay() {
    let (mock, session) = session();
    two_controls(&mock);
    session.tagify().await.unwrap();

    let page_png = not_available_png().unwrap();
    mock.respond_value(
        "Page.captureScreenshot",
        json!({ "data": BASE64.encode(&page_png) }),
    );
    let shot = session.take_screenshot().await.unwrap();

    assert!(shot.is_available());
    let annotated = BASE64.decode(&shot.b64_image).unwrap();
    assert_ne!(annotated, page_png);
    assert_eq!(mock.calls_to("Page.captureScreenshot")[0]["format"], "png");
}

#[tokio::test]
async fn page_details_time_out() {
    let mut config = PagetagConfig::default();
    config.timeouts.page_details_ms = 50;
    let (mock, session) = session_with(&config);
    layout_metrics(&mock);
    mock.delay("Page.getNavigationHistory", Duration::from_secs(10));

    let err = session.page_details().await.unwrap_err();
    assert!(err.is_timeout());
}

#[tokio::test]
async fn goto_validates_before_navigating() {
    let (mock, session) = session();
    let err = session.goto("not a url").await.unwrap_err();
    assert!(err.is_invalid_input());
    assert!(mock.calls_to("Page.navigate").is_empty());

    let report = session.goto("https://example.com/").await.unwrap();
    assert!(!report.timed_out);
    assert_eq!(mock.calls_to("Page.navigate")[0]["url"], "https://example.com/");
}
