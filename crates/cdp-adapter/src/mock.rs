//! Scripted in-memory [`Cdp`] for unit and integration tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};

use crate::channel::Cdp;
use crate::error::AdapterError;

type Responder = Arc<dyn Fn(&Value) -> Result<Value, AdapterError> + Send + Sync>;

/// Answers commands from per-method responders and records every call.
///
/// Methods without a responder succeed with `{}`.
#[derive(Default)]
pub struct MockCdp {
    responders: Mutex<HashMap<String, Responder>>,
    delays: Mutex<HashMap<String, Duration>>,
    log: Mutex<Vec<(String, Value)>>,
}

impl MockCdp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond<F>(&self, method: &str, responder: F) -> &Self
    where
        F: Fn(&Value) -> Result<Value, AdapterError> + Send + Sync + 'static,
    {
        self.responders
            .lock()
            .insert(method.to_string(), Arc::new(responder));
        self
    }

    pub fn respond_value(&self, method: &str, value: Value) -> &Self {
        self.respond(method, move |_| Ok(value.clone()))
    }

    pub fn fail(&self, method: &str, error: AdapterError) -> &Self {
        self.respond(method, move |_| Err(error.clone()))
    }

    /// Holds the reply to `method` back for `delay`.
    pub fn delay(&self, method: &str, delay: Duration) -> &Self {
        self.delays.lock().insert(method.to_string(), delay);
        self
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.log.lock().clone()
    }

    pub fn methods(&self) -> Vec<String> {
        self.log.lock().iter().map(|(m, _)| m.clone()).collect()
    }

    pub fn calls_to(&self, method: &str) -> Vec<Value> {
        self.log
            .lock()
            .iter()
            .filter(|(m, _)| m == method)
            .map(|(_, p)| p.clone())
            .collect()
    }

    pub fn clear_log(&self) {
        self.log.lock().clear();
    }
}

#[async_trait]
impl Cdp for MockCdp {
    async fn send(&self, method: &str, params: Value) -> Result<Value, AdapterError> {
        self.log.lock().push((method.to_string(), params.clone()));
        let delay = self.delays.lock().get(method).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let responder = self.responders.lock().get(method).cloned();
        match responder {
            Some(responder) => responder(&params),
            None => Ok(json!({})),
        }
    }
}
