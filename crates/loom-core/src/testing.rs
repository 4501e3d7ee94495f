//! Test doubles shared by the unit tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{ExecutionOutcome, LoomError};
use crate::executor::{Executor, NotifyContext};
use crate::ports::{HttpCall, HttpResponse, Transport};

#[derive(Debug, Clone)]
enum Script {
    Succeed,
    Fail(String),
    FailTimes(usize, String),
    Error(String),
    Panic,
}

/// Executor whose behaviour is fixed up front.
#[derive(Debug)]
pub struct ScriptedExecutor {
    script: Script,
    delay: Option<Duration>,
    notify_error: Option<String>,
    reject_payloads: bool,
    performed: AtomicUsize,
    notified: Mutex<Vec<NotifyContext>>,
}

impl ScriptedExecutor {
    fn with_script(script: Script) -> Self {
        Self {
            script,
            delay: None,
            notify_error: None,
            reject_payloads: false,
            performed: AtomicUsize::new(0),
            notified: Mutex::new(Vec::new()),
        }
    }

    pub fn succeeding() -> Self {
        Self::with_script(Script::Succeed)
    }

    /// Reports `success: false` on every attempt.
    pub fn failing(message: &str) -> Self {
        Self::with_script(Script::Fail(message.to_string()))
    }

    /// Fails the first `n` attempts, then succeeds.
    pub fn failing_times(n: usize, message: &str) -> Self {
        Self::with_script(Script::FailTimes(n, message.to_string()))
    }

    /// Returns `Err` on every attempt.
    pub fn erroring(message: &str) -> Self {
        Self::with_script(Script::Error(message.to_string()))
    }

    pub fn panicking() -> Self {
        Self::with_script(Script::Panic)
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_notify_error(mut self, message: &str) -> Self {
        self.notify_error = Some(message.to_string());
        self
    }

    pub fn rejecting_payloads(mut self) -> Self {
        self.reject_payloads = true;
        self
    }

    pub fn performed(&self) -> usize {
        self.performed.load(Ordering::SeqCst)
    }

    pub fn notified(&self) -> Vec<NotifyContext> {
        self.notified
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl Executor for ScriptedExecutor {
    async fn perform(&self, _payload: &serde_json::Value) -> Result<ExecutionOutcome, LoomError> {
        let attempt = self.performed.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.script {
            Script::Succeed => Ok(ExecutionOutcome::success().with_data(serde_json::json!("ok"))),
            Script::Fail(msg) => Ok(ExecutionOutcome::failure(msg.clone())),
            Script::FailTimes(n, msg) if attempt < *n => Ok(ExecutionOutcome::failure(msg.clone())),
            Script::FailTimes(..) => Ok(ExecutionOutcome::success()),
            Script::Error(msg) => Err(LoomError::Execution(msg.clone())),
            Script::Panic => panic!("scripted executor panic"),
        }
    }

    async fn notify(&self, ctx: NotifyContext) -> Result<(), LoomError> {
        self.notified
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(ctx);
        match &self.notify_error {
            Some(msg) => Err(LoomError::Transport(msg.clone())),
            None => Ok(()),
        }
    }

    fn validate(&self, _payload: &serde_json::Value) -> Result<(), LoomError> {
        if self.reject_payloads {
            return Err(LoomError::InvalidPayload("rejected".to_string()));
        }
        Ok(())
    }
}

/// Transport that records every call and answers from a script.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    calls: Mutex<Vec<HttpCall>>,
    response: Mutex<Option<serde_json::Value>>,
    failure: Mutex<Option<String>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond_with(&self, body: serde_json::Value) {
        *self.response.lock().unwrap_or_else(|e| e.into_inner()) = Some(body);
    }

    pub fn fail_with(&self, message: &str) {
        *self.failure.lock().unwrap_or_else(|e| e.into_inner()) = Some(message.to_string());
    }

    pub fn calls(&self) -> Vec<HttpCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, call: HttpCall) -> Result<HttpResponse, LoomError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);

        if let Some(msg) = self.failure.lock().unwrap_or_else(|e| e.into_inner()).clone() {
            return Err(LoomError::Transport(msg));
        }
        let body = self
            .response
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .unwrap_or(serde_json::Value::Null);
        Ok(HttpResponse { status: 200, body })
    }
}

/// Succeeds and records the `name` field of every payload it runs, in order.
#[derive(Debug, Default)]
pub struct OrderRecorder {
    seen: Mutex<Vec<String>>,
}

impl OrderRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl Executor for OrderRecorder {
    async fn perform(&self, payload: &serde_json::Value) -> Result<ExecutionOutcome, LoomError> {
        let name = payload["name"].as_str().unwrap_or_default().to_string();
        self.seen
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(name);
        Ok(ExecutionOutcome::success())
    }

    async fn notify(&self, _ctx: NotifyContext) -> Result<(), LoomError> {
        Ok(())
    }
}
