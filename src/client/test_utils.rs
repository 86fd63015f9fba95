//! In-process [`Transport`] fake for client tests.
//!
//! Responses are scripted per call; an optional gate holds requests in
//! flight until the test releases them.
#![allow(dead_code)]

use std::{
    collections::VecDeque,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::Semaphore;

use super::{FetchError, Transport};

#[derive(Default)]
pub struct FakeTransport {
    calls: AtomicUsize,
    script: Mutex<VecDeque<Result<Value, FetchError>>>,
    fallback: Mutex<Option<Result<Value, FetchError>>>,
    requests: Mutex<Vec<(String, Vec<(String, String)>)>>,
    gate: Option<Semaphore>,
}

impl FakeTransport {
    /// Every call returns `value`.
    pub fn always(value: Value) -> Arc<Self> {
        Arc::new(Self {
            fallback: Mutex::new(Some(Ok(value))),
            ..Default::default()
        })
    }

    /// Calls consume `responses` in order; once exhausted, the last one repeats.
    pub fn scripted(responses: Vec<Result<Value, FetchError>>) -> Arc<Self> {
        let fallback = responses.last().cloned();
        Arc::new(Self {
            script: Mutex::new(responses.into()),
            fallback: Mutex::new(fallback),
            ..Default::default()
        })
    }

    /// Like [`FakeTransport::scripted`], but each call blocks until
    /// [`FakeTransport::release`] grants it a permit.
    pub fn gated(responses: Vec<Result<Value, FetchError>>) -> Arc<Self> {
        let fallback = responses.last().cloned();
        Arc::new(Self {
            script: Mutex::new(responses.into()),
            fallback: Mutex::new(fallback),
            gate: Some(Semaphore::new(0)),
            ..Default::default()
        })
    }

    pub fn release(&self, n: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(n);
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<(String, Vec<(String, String)>)> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn get(&self, path: &str, params: &[(String, String)]) -> Result<Value, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push((path.to_string(), params.to_vec()));

        if let Some(gate) = &self.gate {
            match gate.acquire().await {
                Ok(permit) => permit.forget(),
                Err(_) => return Err(FetchError::Network("gate closed".into())),
            }
        }

        let next = self.script.lock().pop_front();
        match next {
            Some(result) => result,
            None => self
                .fallback
                .lock()
                .clone()
                .unwrap_or_else(|| Err(FetchError::Network("no scripted response".into()))),
        }
    }
}
