//! Action primitives implementation
//!
//! Element-addressed primitives resolve their target through the tag table of the
//! most recent tagging pass; the table is only read, never changed.
//! 1. click / hover - synthetic pointer events
//! 2. focus / enter_text / press_key - keyboard input
//! 3. scroll - scroll a tagged container by most of its visible size
//! 4. select - pick a `<select>` option by its visible text
//! 5. navigate - time-boxed `Page.navigate`

mod click;
mod navigate;
mod scroll;
mod select;
mod type_text;

pub use click::*;
pub use navigate::*;
pub use scroll::*;
pub use select::*;
pub use type_text::*;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use cdp_adapter::Cdp;
use perceiver_structural::{Element, ScrollDirection, TaggedElements};

use crate::{
    errors::ActionError,
    types::{ActionReport, Pacing},
};

pub const DEFAULT_NAVIGATION_TIMEOUT: Duration = Duration::from_secs(3);

/// Action primitives trait
///
/// Element-addressed operations fail with [`ActionError::AnnotationOutOfRange`] before
/// any protocol traffic when the number is not in `table`.
#[async_trait]
pub trait ActionPrimitives: Send + Sync {
    /// Click the point where the element was confirmed visible
    async fn click(&self, table: &TaggedElements, annotation: i64)
        -> Result<ActionReport, ActionError>;

    async fn focus(&self, table: &TaggedElements, annotation: i64)
        -> Result<ActionReport, ActionError>;

    /// Move the pointer to viewport coordinates and rest there
    async fn hover(&self, x: i32, y: i32) -> Result<ActionReport, ActionError>;

    async fn scroll(
        &self,
        table: &TaggedElements,
        annotation: i64,
        direction: ScrollDirection,
    ) -> Result<ActionReport, ActionError>;

    /// Replace the element's current text with `text`
    async fn enter_text(
        &self,
        table: &TaggedElements,
        annotation: i64,
        text: &str,
    ) -> Result<ActionReport, ActionError>;

    async fn press_key(&self, key: &str) -> Result<ActionReport, ActionError>;

    /// Select the option whose visible text equals `option`
    async fn select(
        &self,
        table: &TaggedElements,
        annotation: i64,
        option: &str,
    ) -> Result<ActionReport, ActionError>;

    async fn navigate(&self, url: &str) -> Result<ActionReport, ActionError>;
}

/// Default implementation of action primitives
pub struct DefaultActionPrimitives {
    /// Session-scoped channel to the page
    cdp: Arc<dyn Cdp>,

    pacing: Pacing,

    /// Upper bound on waiting for `Page.navigate` to answer
    navigation_timeout: Duration,
}

impl DefaultActionPrimitives {
    pub fn new(cdp: Arc<dyn Cdp>) -> Self {
        Self {
            cdp,
            pacing: Pacing::default(),
            navigation_timeout: DEFAULT_NAVIGATION_TIMEOUT,
        }
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_navigation_timeout(mut self, timeout: Duration) -> Self {
        self.navigation_timeout = timeout;
        self
    }

    pub fn cdp(&self) -> &dyn Cdp {
        self.cdp.as_ref()
    }

    pub fn pacing(&self) -> Pacing {
        self.pacing
    }

    pub fn navigation_timeout(&self) -> Duration {
        self.navigation_timeout
    }
}

/// Looks up `annotation` in `table`.
pub fn target(table: &TaggedElements, annotation: i64) -> Result<&Element, ActionError> {
    table
        .get(annotation)
        .ok_or(ActionError::AnnotationOutOfRange(annotation))
}

#[async_trait]
impl ActionPrimitives for DefaultActionPrimitives {
    async fn click(
        &self,
        table: &TaggedElements,
        annotation: i64,
    ) -> Result<ActionReport, ActionError> {
        execute_click(self, table, annotation).await
    }

    async fn focus(
        &self,
        table: &TaggedElements,
        annotation: i64,
    ) -> Result<ActionReport, ActionError> {
        execute_focus(self, table, annotation).await
    }

    async fn hover(&self, x: i32, y: i32) -> Result<ActionReport, ActionError> {
        execute_hover(self, x, y).await
    }

    async fn scroll(
        &self,
        table: &TaggedElements,
        annotation: i64,
        direction: ScrollDirection,
    ) -> Result<ActionReport, ActionError> {
        execute_scroll(self, table, annotation, direction).await
    }

    async fn enter_text(
        &self,
        table: &TaggedElements,
        annotation: i64,
        text: &str,
    ) -> Result<ActionReport, ActionError> {
        execute_enter_text(self, table, annotation, text).await
    }

    async fn press_key(&self, key: &str) -> Result<ActionReport, ActionError> {
        execute_press_key(self, key).await
    }

    async fn select(
        &self,
        table: &TaggedElements,
        annotation: i64,
        option: &str,
    ) -> Result<ActionReport, ActionError> {
        execute_select(self, table, annotation, option).await
    }

    async fn navigate(&self, url: &str) -> Result<ActionReport, ActionError> {
        execute_navigate(self, url).await
    }
}
