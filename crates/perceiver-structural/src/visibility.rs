//! Live hit-testing that confirms a candidate is actually painted on top.

use std::collections::HashSet;

use cdp_adapter::Cdp;
use futures::future::join_all;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::element::Element;
use crate::metrics;
use crate::rect::Rect;

/// Center first, then the four corners, keeping only points on screen.
pub fn sample_points(bounds: &Rect, visible_rect: &Rect) -> Vec<(i32, i32)> {
    [
        bounds.center(),
        (bounds.x, bounds.y),
        (bounds.right(), bounds.y),
        (bounds.x, bounds.bottom()),
        (bounds.right(), bounds.bottom()),
    ]
    .into_iter()
    .filter(|&(x, y)| visible_rect.contains(x, y))
    .collect()
}

/// Backend ids of a `DOM.describeNode` result and everything below it.
fn subtree_ids(root: &Value) -> HashSet<i64> {
    let mut ids = HashSet::new();
    let mut queue = vec![root];
    while let Some(node) = queue.pop() {
        if let Some(id) = node.get("backendNodeId").and_then(Value::as_i64) {
            ids.insert(id);
        }
        for key in ["children", "shadowRoots"] {
            if let Some(children) = node.get(key).and_then(Value::as_array) {
                queue.extend(children);
            }
        }
        if let Some(content) = node.get("contentDocument") {
            queue.push(content);
        }
    }
    ids
}

/// First sampled point whose hit-tested node belongs to `element`'s subtree.
///
/// Protocol failures count as "not visible"; they never fail the caller.
pub async fn confirm_visible<C>(
    cdp: &C,
    element: &Element,
    visible_rect: &Rect,
) -> Option<(i32, i32)>
where
    C: Cdp + ?Sized,
{
    let points = sample_points(&element.bounds, visible_rect);

    let describe = cdp.send(
        "DOM.describeNode",
        json!({ "backendNodeId": element.backend_node_id, "depth": -1, "pierce": true }),
    );
    let hits = join_all(
        points
            .iter()
            .map(|&(x, y)| cdp.send("DOM.getNodeForLocation", json!({ "x": x, "y": y }))),
    );
    let (described, hits) = futures::join!(describe, hits);

    let described = match described {
        Ok(value) => value,
        Err(err) => {
            metrics::record_hit_test_failure();
            warn!(
                backend_node_id = element.backend_node_id,
                name = %element.name,
                %err,
                "describeNode failed; treating element as not visible"
            );
            return None;
        }
    };
    let owned = subtree_ids(described.get("node").unwrap_or(&Value::Null));

    for (point, hit) in points.into_iter().zip(hits) {
        match hit {
            Ok(value) => {
                if value
                    .get("backendNodeId")
                    .and_then(Value::as_i64)
                    .is_some_and(|id| owned.contains(&id))
                {
                    return Some(point);
                }
            }
            Err(err) => {
                metrics::record_hit_test_failure();
                debug!(backend_node_id = element.backend_node_id, ?point, %err, "hit test failed");
            }
        }
    }
    None
}
