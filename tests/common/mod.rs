#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

use meraki_dispatch::registry::{SectionDeclaration, catalog};
use meraki_dispatch::{ClientError, DispatchConfig, Dispatcher, Parameters, VendorClient};

/// Vendor stand-in that fails N times, then answers with a payload echoing
/// the call and its sequence number.
pub struct StubClient {
    sections: Vec<SectionDeclaration>,
    fail_count: AtomicU32,
    fail_with: fn() -> ClientError,
    total_calls: AtomicU32,
    delays: Vec<Duration>,
    last_parameters: Mutex<Option<Parameters>>,
}

impl StubClient {
    /// A client over the embedded catalog that always succeeds.
    pub fn new() -> Self {
        Self::failing(0, || ClientError::Network("unused".into()))
    }

    pub fn failing(failures: u32, fail_with: fn() -> ClientError) -> Self {
        Self {
            sections: catalog::embedded_sections().expect("embedded catalog"),
            fail_count: AtomicU32::new(failures),
            fail_with,
            total_calls: AtomicU32::new(0),
            delays: Vec::new(),
            last_parameters: Mutex::new(None),
        }
    }

    /// Sleep (on tokio's clock) before answering.
    pub fn with_delay(self, delay: Duration) -> Self {
        self.with_delays(vec![delay])
    }

    /// Delay the n-th call by `delays[n]`; calls past the end reuse the last delay.
    pub fn with_delays(mut self, delays: Vec<Duration>) -> Self {
        self.delays = delays;
        self
    }

    pub fn with_sections(mut self, sections: Vec<SectionDeclaration>) -> Self {
        self.sections = sections;
        self
    }

    pub fn call_count(&self) -> u32 {
        self.total_calls.load(Ordering::SeqCst)
    }

    pub fn last_parameters(&self) -> Option<Parameters> {
        self.last_parameters.lock().unwrap().clone()
    }
}

#[async_trait]
impl VendorClient for StubClient {
    fn sections(&self) -> Vec<SectionDeclaration> {
        self.sections.clone()
    }

    async fn invoke(
        &self,
        section: &str,
        method: &str,
        parameters: &Parameters,
    ) -> Result<Value, ClientError> {
        let call = self.total_calls.fetch_add(1, Ordering::SeqCst) + 1;
        *self.last_parameters.lock().unwrap() = Some(parameters.clone());
        let index = (call as usize - 1).min(self.delays.len().saturating_sub(1));
        if let Some(delay) = self.delays.get(index) {
            tokio::time::sleep(*delay).await;
        }
        let remaining = self.fail_count.load(Ordering::SeqCst);
        if remaining > 0 {
            self.fail_count.fetch_sub(1, Ordering::SeqCst);
            return Err((self.fail_with)());
        }
        Ok(json!({
            "section": section,
            "method": method,
            "call": call,
            "parameters": parameters,
        }))
    }
}

pub fn dispatcher(client: &Arc<StubClient>, config: DispatchConfig) -> Dispatcher {
    Dispatcher::builder()
        .client(client.clone())
        .config(config)
        .build()
        .expect("dispatcher builds")
}

/// Build a parameter map from a JSON object literal.
pub fn params(value: Value) -> Parameters {
    match value {
        Value::Object(map) => map,
        other => panic!("parameters must be an object, got {other}"),
    }
}
