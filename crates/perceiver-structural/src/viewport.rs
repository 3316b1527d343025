//! Page url, title and scroll geometry from `Page.*` metrics.

use cdp_adapter::Cdp;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::errors::PerceiverError;
use crate::rect::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: i32,
    pub height: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDimensions {
    pub width: i32,
    pub height: i32,
    #[serde(alias = "scroll_x")]
    pub scroll_x: i32,
    #[serde(alias = "scroll_y")]
    pub scroll_y: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageDetails {
    pub url: String,
    pub title: String,
    pub viewport: Option<Viewport>,
    pub dimensions: PageDimensions,
}

impl PageDetails {
    /// Viewport expressed in root-document coordinates.
    pub fn visible_rect(&self) -> Rect {
        let (width, height) = self
            .viewport
            .map(|v| (v.width, v.height))
            .unwrap_or((0, 0));
        Rect::new(
            self.dimensions.scroll_x,
            self.dimensions.scroll_y,
            width,
            height,
        )
    }
}

fn int_at(value: &Value, pointer: &str) -> Option<i32> {
    value.pointer(pointer).and_then(Value::as_f64).map(|v| v as i32)
}

fn parse_metrics(metrics: &Value) -> Result<(Option<Viewport>, PageDimensions), PerceiverError> {
    let viewport = match (
        int_at(metrics, "/cssVisualViewport/clientWidth"),
        int_at(metrics, "/cssVisualViewport/clientHeight"),
    ) {
        (Some(width), Some(height)) => Some(Viewport { width, height }),
        _ => None,
    };
    let content = |key: &str| {
        int_at(metrics, &format!("/cssContentSize/{key}"))
            .ok_or_else(|| PerceiverError::missing_metrics(format!("cssContentSize.{key}")))
    };
    let dimensions = PageDimensions {
        width: content("width")?,
        height: content("height")?,
        scroll_x: int_at(metrics, "/cssVisualViewport/pageX").unwrap_or(0),
        scroll_y: int_at(metrics, "/cssVisualViewport/pageY").unwrap_or(0),
    };
    Ok((viewport, dimensions))
}

fn parse_history(history: &Value) -> Result<(String, String), PerceiverError> {
    let entry = history
        .get("currentIndex")
        .and_then(Value::as_u64)
        .and_then(|idx| history.pointer(&format!("/entries/{idx}")))
        .ok_or_else(|| PerceiverError::missing_metrics("navigation history entry"))?;
    let field = |key: &str| {
        entry
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    Ok((field("url"), field("title")))
}

pub async fn fetch_page_details<C>(cdp: &C) -> Result<PageDetails, PerceiverError>
where
    C: Cdp + ?Sized,
{
    let (metrics, history) = futures::try_join!(
        cdp.send("Page.getLayoutMetrics", json!({})),
        cdp.send("Page.getNavigationHistory", json!({})),
    )?;
    let (viewport, dimensions) = parse_metrics(&metrics)?;
    let (url, title) = parse_history(&history)?;
    Ok(PageDetails {
        url,
        title,
        viewport,
        dimensions,
    })
}

/// Current viewport rect, without the navigation-history round trip.
pub async fn fetch_visible_rect<C>(cdp: &C) -> Result<Rect, PerceiverError>
where
    C: Cdp + ?Sized,
{
    let metrics = cdp.send("Page.getLayoutMetrics", json!({})).await?;
    let (viewport, dimensions) = parse_metrics(&metrics)?;
    let (width, height) = viewport.map(|v| (v.width, v.height)).unwrap_or((0, 0));
    Ok(Rect::new(dimensions.scroll_x, dimensions.scroll_y, width, height))
}
