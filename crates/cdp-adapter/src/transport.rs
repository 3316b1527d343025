//! One websocket to one browser, with commands multiplexed over flattened sessions.

use std::collections::HashMap;

use async_trait::async_trait;
use chromiumoxide::async_process::Child;
use chromiumoxide::browser::BrowserConfig;
use chromiumoxide::cdp::browser_protocol::target::SessionId;
use chromiumoxide::cdp::events::CdpEventMessage;
use chromiumoxide::conn::Connection;
use chromiumoxide_types::{CallId, Message, MethodId, Response};
use futures::StreamExt;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot, Mutex, OnceCell};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::CdpConfig;
use crate::error::AdapterError;
use crate::util::extract_ws_url;

/// Where a command is routed: the browser endpoint or one flattened page session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandTarget {
    Browser,
    Session(String),
}

#[async_trait]
pub trait CdpTransport: Send + Sync {
    async fn send_command(
        &self,
        target: CommandTarget,
        method: &str,
        params: Value,
    ) -> Result<Value, AdapterError>;

    /// Drops the connection and stops any browser this transport launched.
    async fn shutdown(&self) {}
}

/// Attaches to `websocket_url` or launches Chromium, on the first command.
pub struct ChromiumTransport {
    cfg: CdpConfig,
    link: OnceCell<Link>,
}

impl ChromiumTransport {
    pub fn new(cfg: CdpConfig) -> Self {
        Self {
            cfg,
            link: OnceCell::new(),
        }
    }

    async fn link(&self) -> Result<&Link, AdapterError> {
        self.link.get_or_try_init(|| Link::open(&self.cfg)).await
    }
}

#[async_trait]
impl CdpTransport for ChromiumTransport {
    async fn send_command(
        &self,
        target: CommandTarget,
        method: &str,
        params: Value,
    ) -> Result<Value, AdapterError> {
        let link = self.link().await?;
        let (reply, answer) = oneshot::channel();
        link.requests
            .send(Request {
                target,
                method: method.to_string(),
                params,
                reply,
            })
            .await
            .map_err(|_| AdapterError::closed("transport is shut down"))?;

        match tokio::time::timeout(self.cfg.command_timeout(), answer).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(AdapterError::closed(format!(
                "connection dropped before {method} was answered"
            ))),
            Err(_) => Err(AdapterError::timeout(method, self.cfg.command_timeout_ms)),
        }
    }

    async fn shutdown(&self) {
        if let Some(link) = self.link.get() {
            link.close().await;
        }
    }
}

struct Request {
    target: CommandTarget,
    method: String,
    params: Value,
    reply: oneshot::Sender<Result<Value, AdapterError>>,
}

struct Pending {
    method: String,
    reply: oneshot::Sender<Result<Value, AdapterError>>,
}

struct Link {
    requests: mpsc::Sender<Request>,
    pump: JoinHandle<()>,
    browser: Mutex<Option<Child>>,
}

impl Link {
    async fn open(cfg: &CdpConfig) -> Result<Self, AdapterError> {
        let (browser, ws_url) = match &cfg.websocket_url {
            Some(url) => (None, url.clone()),
            None => {
                let mut child = launch(cfg)?;
                let url = extract_ws_url(&mut child)
                    .await
                    .map_err(|err| AdapterError::Launch(format!("{err:#}")))?;
                (Some(child), url)
            }
        };

        let conn = Connection::<CdpEventMessage>::connect(&ws_url)
            .await
            .map_err(|err| AdapterError::closed(format!("cannot connect to {ws_url}: {err}")))?;

        let (requests, inbox) = mpsc::channel(64);
        let pump = tokio::spawn(pump(conn, inbox));
        info!(
            target: "cdp-transport",
            url = %ws_url,
            launched = browser.is_some(),
            "connected to browser"
        );

        Ok(Self {
            requests,
            pump,
            browser: Mutex::new(browser),
        })
    }

    async fn close(&self) {
        self.pump.abort();
        if let Some(mut child) = self.browser.lock().await.take() {
            if let Err(err) = child.kill().await {
                warn!(target: "cdp-transport", %err, "failed to stop browser process");
            }
        }
        debug!(target: "cdp-transport", "transport shut down");
    }
}

impl Drop for Link {
    fn drop(&mut self) {
        self.pump.abort();
        let Some(mut child) = self.browser.get_mut().take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    let _ = child.kill().await;
                });
            }
            Err(_) => debug!(target: "cdp-transport", "no runtime left to stop the browser"),
        }
    }
}

fn launch(cfg: &CdpConfig) -> Result<Child, AdapterError> {
    let mut builder = BrowserConfig::builder()
        .chrome_executable(cfg.resolve_executable()?)
        .request_timeout(cfg.command_timeout())
        .args(cfg.extra_args.iter().cloned());
    if !cfg.headless {
        builder = builder.with_head();
    }
    if let Some(dir) = &cfg.user_data_dir {
        builder = builder.user_data_dir(dir);
    }

    builder
        .build()
        .map_err(AdapterError::Launch)?
        .launch()
        .map_err(|err| AdapterError::Launch(err.to_string()))
}

/// Owns the websocket: submits queued requests and routes replies by call id.
/// Every outstanding request is failed once the socket goes away.
async fn pump(mut conn: Connection<CdpEventMessage>, mut inbox: mpsc::Receiver<Request>) {
    let mut pending: HashMap<CallId, Pending> = HashMap::new();

    let reason = loop {
        tokio::select! {
            request = inbox.recv() => match request {
                Some(request) => submit(&mut conn, request, &mut pending),
                None => break "transport dropped".to_string(),
            },
            message = conn.next() => match message {
                Some(Ok(Message::Response(response))) => {
                    if let Some(waiting) = pending.remove(&response.id) {
                        let _ = waiting.reply.send(reply_payload(&waiting.method, response));
                    }
                }
                Some(Ok(Message::Event(_))) => {}
                Some(Err(err)) => break format!("websocket error: {err}"),
                None => break "websocket closed".to_string(),
            },
        }
    };

    warn!(target: "cdp-transport", %reason, outstanding = pending.len(), "connection ended");
    for (_, waiting) in pending.drain() {
        let _ = waiting.reply.send(Err(AdapterError::closed(reason.clone())));
    }
}

fn submit(
    conn: &mut Connection<CdpEventMessage>,
    request: Request,
    pending: &mut HashMap<CallId, Pending>,
) {
    let session = match request.target {
        CommandTarget::Browser => None,
        CommandTarget::Session(id) => Some(SessionId::from(id)),
    };
    let method: MethodId = request.method.clone().into();
    match conn.submit_command(method, session, request.params) {
        Ok(call_id) => {
            pending.insert(
                call_id,
                Pending {
                    method: request.method,
                    reply: request.reply,
                },
            );
        }
        Err(err) => {
            let _ = request.reply.send(Err(AdapterError::closed(format!(
                "cannot submit {}: {err}",
                request.method
            ))));
        }
    }
}

fn reply_payload(method: &str, response: Response) -> Result<Value, AdapterError> {
    match (response.result, response.error) {
        (Some(result), _) => Ok(result),
        (None, Some(error)) => Err(AdapterError::command(method, error.code, error.message)),
        (None, None) => Err(AdapterError::bad_reply(
            method,
            "reply carries neither result nor error",
        )),
    }
}
