use cdp_adapter::{AdapterError, MockCdp};
use perceiver_structural::{run_pass, Rect, Tag, TagKind, TaggingOptions};
use serde_json::{json, Value};

fn options() -> TaggingOptions {
    TaggingOptions {
        queried_styles: ["display", "visibility", "cursor", "overflow-x", "overflow-y"]
            .into_iter()
            .map(String::from)
            .collect(),
        ..TaggingOptions::default()
    }
}

/// A trimmed `captureSnapshot` reply: a checked checkbox next to a `display:none` div.
fn checkbox_page() -> Value {
    json!({
        "strings": [
            "main", "#document", "HTML", "BODY", "INPUT", "DIV", "type", "checkbox",
            "block", "visible", "auto", "none", "#text", "Hidden", "inline-block", "id", "agree"
        ],
        "documents": [{
            "frameId": 0,
            "contentWidth": 1280.0,
            "contentHeight": 800.0,
            "nodes": {
                "parentIndex": [-1, 0, 1, 2, 2, 4],
                "nodeType": [9, 1, 1, 1, 1, 3],
                "nodeName": [1, 2, 3, 4, 5, 12],
                "nodeValue": [-1, -1, -1, -1, -1, 13],
                "backendNodeId": [1, 2, 3, 4, 5, 6],
                "attributes": [[], [], [], [6, 7, 15, 16], [], []],
                "inputChecked": { "index": [3] }
            },
            "layout": {
                "nodeIndex": [1, 2, 3, 4],
                "styles": [
                    [8, 9, 10, 9, 9],
                    [8, 9, 10, 9, 9],
                    [14, 9, 10, 9, 9],
                    [11, 9, 10, 9, 9]
                ],
                "bounds": [
                    [0.0, 0.0, 1280.0, 800.0],
                    [8.0, 8.0, 1264.0, 784.0],
                    [20.0, 20.0, 13.0, 13.0],
                    [0.0, 0.0, 0.0, 0.0]
                ],
                "text": [-1, -1, -1, -1],
                "clientRects": [[0.0, 0.0, 1280.0, 800.0], [], [], []],
                "scrollRects": [[0.0, 0.0, 1280.0, 800.0], [], [], []]
            }
        }]
    })
}

#[tokio::test]
async fn checked_checkbox_is_the_only_tag() {
    let mock = MockCdp::new();
    mock.respond_value("DOMSnapshot.captureSnapshot", checkbox_page())
        .respond_value("DOM.describeNode", json!({ "node": { "backendNodeId": 4 } }))
        .respond_value("DOM.getNodeForLocation", json!({ "backendNodeId": 4 }));

    let pass = run_pass(&mock, Rect::new(0, 0, 1280, 800), 0, &options())
        .await
        .expect("tagging pass");

    assert_eq!(pass.tags.len(), 1);
    let tag = pass.tags.get("0").expect("tag 0");
    assert_eq!(tag.kind(), TagKind::Input);
    let Tag::Input(input) = tag else {
        panic!("expected an input tag");
    };
    assert_eq!(input.value.as_deref(), Some("true"));
    assert_eq!(input.base.html_id.as_deref(), Some("agree"));
    assert_eq!(pass.table.point_for(0), Some((26, 26)));

    let json = serde_json::to_value(&pass.tags).expect("serialize");
    assert_eq!(json["0"]["tag_name"], "INPUT");
    assert_eq!(json["0"]["type"], "checkbox");
}

#[tokio::test]
async fn failed_describe_drops_the_element_but_not_the_pass() {
    let mock = MockCdp::new();
    mock.respond_value("DOMSnapshot.captureSnapshot", checkbox_page())
        .fail(
            "DOM.describeNode",
            AdapterError::command("DOM.describeNode", -32000, "node detached"),
        )
        .respond_value("DOM.getNodeForLocation", json!({ "backendNodeId": 4 }));

    let pass = run_pass(&mock, Rect::new(0, 0, 1280, 800), 0, &options())
        .await
        .expect("tagging pass");
    assert!(pass.tags.is_empty());
    assert!(pass.table.is_empty());
}

#[tokio::test]
async fn scrolled_viewport_skips_elements_above_it() {
    let mock = MockCdp::new();
    mock.respond_value("DOMSnapshot.captureSnapshot", checkbox_page());

    let pass = run_pass(&mock, Rect::new(0, 400, 1280, 800), 0, &options())
        .await
        .expect("tagging pass");
    assert!(pass.tags.is_empty());
    assert!(mock.calls_to("DOM.getNodeForLocation").is_empty());
}
