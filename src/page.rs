//! Page session: the tagged-element table of one page and everything addressed by it.

use std::sync::Arc;

use action_primitives::{ActionPrimitives, ActionReport, DefaultActionPrimitives, Pacing};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use cdp_adapter::Cdp;
use parking_lot::RwLock;
use perceiver_structural::{
    fetch_page_details, fetch_visible_rect, run_pass, PageDetails, ScrollDirection, TagMap,
    TaggedElements, TaggingOptions,
};
use perceiver_visual::{annotate_png, capture_png, not_available_base64, ScreenshotDetails};
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::config::{PagetagConfig, TimeoutConfig};
use crate::errors::{PageError, PageResult};

const ENABLED_DOMAINS: [&str; 4] = ["Page", "DOMSnapshot", "DOM", "Runtime"];

/// Owns the current tagged-element table of a page.
///
/// Each [`tagify`](Self::tagify) replaces the table wholesale and numbers its elements
/// after the last number ever handed out, so a stale number never resolves to an
/// element of a later pass. Actions only read the table.
pub struct PageSession {
    cdp: Arc<dyn Cdp>,
    actions: DefaultActionPrimitives,
    tagging: TaggingOptions,
    timeouts: TimeoutConfig,
    table: RwLock<Arc<TaggedElements>>,
    /// Serializes tagging passes and resets
    pass_lock: Mutex<()>,
}

impl PageSession {
    pub fn new(cdp: Arc<dyn Cdp>) -> Self {
        Self::with_config(cdp, &PagetagConfig::default())
    }

    pub fn with_config(cdp: Arc<dyn Cdp>, config: &PagetagConfig) -> Self {
        let actions = DefaultActionPrimitives::new(cdp.clone())
            .with_pacing(Pacing::from(config.pacing))
            .with_navigation_timeout(config.timeouts.navigation());
        Self {
            cdp,
            actions,
            tagging: config.tagging.clone(),
            timeouts: config.timeouts,
            table: RwLock::new(Arc::new(TaggedElements::new(0))),
            pass_lock: Mutex::new(()),
        }
    }

    /// Overrides the input pacing, e.g. [`Pacing::immediate`] for scripted runs.
    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.actions = self.actions.with_pacing(pacing);
        self
    }

    pub fn cdp(&self) -> &dyn Cdp {
        self.cdp.as_ref()
    }

    /// Enables the domains tagging relies on and installs a virtual authenticator so
    /// WebAuthn prompts cannot block the page.
    pub async fn init(&self) -> PageResult<()> {
        for domain in ENABLED_DOMAINS {
            self.cdp.send(&format!("{domain}.enable"), json!({})).await?;
        }
        self.cdp
            .send("WebAuthn.enable", json!({ "enableUI": false }))
            .await?;
        self.cdp
            .send(
                "WebAuthn.addVirtualAuthenticator",
                json!({
                    "options": {
                        "protocol": "ctap2",
                        "transport": "usb",
                        "hasResidentKey": false,
                        "hasUserVerification": false,
                        "isUserVerified": false,
                    }
                }),
            )
            .await?;
        debug!("page session initialised");
        Ok(())
    }

    /// Target id of the attached page.
    pub async fn page_id(&self) -> PageResult<String> {
        let reply = self.cdp.send("Target.getTargetInfo", json!({})).await?;
        reply
            .pointer("/targetInfo/targetId")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| PageError::UnexpectedReply {
                method: "Target.getTargetInfo".to_string(),
                detail: "missing targetInfo.targetId".to_string(),
            })
    }

    /// Runs one tagging pass over the current viewport and makes its table current.
    pub async fn tagify(&self) -> PageResult<TagMap> {
        let _pass = self.pass_lock.lock().await;
        let visible_rect = fetch_visible_rect(self.cdp.as_ref()).await?;
        let first_annotation = self.table.read().next_annotation();

        let pass = run_pass(self.cdp.as_ref(), visible_rect, first_annotation, &self.tagging).await?;
        info!(
            first_annotation,
            tagged = pass.table.len(),
            "tagged elements replaced"
        );
        *self.table.write() = Arc::new(pass.table);
        Ok(pass.tags)
    }

    /// Forgets every tagged element; previously issued numbers stop resolving.
    pub async fn untagify(&self) {
        let _pass = self.pass_lock.lock().await;
        let mut table = self.table.write();
        let next = table.next_annotation();
        *table = Arc::new(TaggedElements::new(next));
        debug!(next_annotation = next, "tagged elements cleared");
    }

    /// The table actions currently resolve against.
    pub fn tagged_elements(&self) -> Arc<TaggedElements> {
        self.table.read().clone()
    }

    pub async fn click(&self, annotation: i64) -> PageResult<ActionReport> {
        let table = self.tagged_elements();
        Ok(self.actions.click(&table, annotation).await?)
    }

    pub async fn focus(&self, annotation: i64) -> PageResult<ActionReport> {
        let table = self.tagged_elements();
        Ok(self.actions.focus(&table, annotation).await?)
    }

    pub async fn enter_text(&self, annotation: i64, text: &str) -> PageResult<ActionReport> {
        let table = self.tagged_elements();
        Ok(self.actions.enter_text(&table, annotation, text).await?)
    }

    pub async fn press_key(&self, key: &str) -> PageResult<ActionReport> {
        Ok(self.actions.press_key(key).await?)
    }

    pub async fn select(&self, annotation: i64, option: &str) -> PageResult<ActionReport> {
        let table = self.tagged_elements();
        Ok(self.actions.select(&table, annotation, option).await?)
    }

    pub async fn scroll(
        &self,
        annotation: i64,
        direction: ScrollDirection,
    ) -> PageResult<ActionReport> {
        let table = self.tagged_elements();
        Ok(self.actions.scroll(&table, annotation, direction).await?)
    }

    /// Hovers at viewport coordinates.
    pub async fn hover(&self, x: i32, y: i32) -> PageResult<ActionReport> {
        Ok(self.actions.hover(x, y).await?)
    }

    /// Starts navigating to `url` without waiting for the load to finish.
    pub async fn goto(&self, url: &str) -> PageResult<ActionReport> {
        Ok(self.actions.navigate(url).await?)
    }

    /// Viewport screenshot with the current tags drawn on it.
    ///
    /// When the capture does not finish in time the placeholder image is returned
    /// with the `unavailable` flag instead of an error.
    pub async fn take_screenshot(&self) -> PageResult<ScreenshotDetails> {
        let cdp = self.cdp.as_ref();
        let capture = async {
            let visible_rect = fetch_visible_rect(cdp).await?;
            let screenshot = capture_png(cdp).await?;
            Ok::<_, PageError>((visible_rect, screenshot))
        };

        let (visible_rect, screenshot) = match timeout(self.timeouts.screenshot(), capture).await {
            Ok(captured) => captured?,
            Err(_) => {
                warn!(
                    timeout_ms = self.timeouts.screenshot_ms,
                    "screenshot timed out; returning placeholder"
                );
                return Ok(ScreenshotDetails::unavailable(not_available_base64()?));
            }
        };

        let table = self.tagged_elements();
        let annotated = annotate_png(&screenshot.data, &visible_rect, &table)?;
        debug!(
            width = screenshot.width,
            height = screenshot.height,
            tagged = table.len(),
            "screenshot annotated"
        );
        Ok(ScreenshotDetails::image(BASE64.encode(annotated)))
    }

    pub async fn page_details(&self) -> PageResult<PageDetails> {
        match timeout(self.timeouts.page_details(), fetch_page_details(self.cdp.as_ref())).await {
            Ok(details) => Ok(details?),
            Err(_) => Err(PageError::timeout("page_details", self.timeouts.page_details())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cdp_adapter::MockCdp;

    fn session() -> (Arc<MockCdp>, PageSession) {
        let mock = Arc::new(MockCdp::new());
        let session = PageSession::new(mock.clone()).with_pacing(Pacing::immediate());
        (mock, session)
    }

    #[tokio::test]
    async fn init_enables_domains_and_authenticator() {
        let (mock, session) = session();
        session.init().await.unwrap();

        let methods = mock.methods();
        assert_eq!(
            &methods[..4],
            ["Page.enable", "DOMSnapshot.enable", "DOM.enable", "Runtime.enable"]
        );
        assert_eq!(mock.calls_to("WebAuthn.enable")[0]["enableUI"], false);
        let options = &mock.calls_to("WebAuthn.addVirtualAuthenticator")[0]["options"];
        assert_eq!(options["protocol"], "ctap2");
        assert_eq!(options["transport"], "usb");
        assert_eq!(options["hasResidentKey"], false);
    }

    #[tokio::test]
    async fn page_id_reads_target_info() {
        let (mock, session) = session();
        mock.respond_value(
            "Target.getTargetInfo",
            json!({ "targetInfo": { "targetId": "T-1", "type": "page" } }),
        );
        assert_eq!(session.page_id().await.unwrap(), "T-1");

        mock.respond_value("Target.getTargetInfo", json!({}));
        assert!(matches!(
            session.page_id().await,
            Err(PageError::UnexpectedReply { .. })
        ));
    }

    #[tokio::test]
    async fn untagify_keeps_the_numbering_moving_forward() {
        let (_mock, session) = session();
        assert_eq!(session.tagged_elements().next_annotation(), 0);
        session.untagify().await;
        assert!(session.tagged_elements().is_empty());
        assert_eq!(session.tagged_elements().first_annotation(), 0);
    }
}
