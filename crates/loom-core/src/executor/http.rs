//! HttpExecutor - HTTP 呼び出し（またはそのシミュレーション）を行う Executor
//!
//! payload は 2 種類:
//! - `{ "timeout": <秒>, "text": "..." }`: 指定秒数 sleep して成功する
//!   （timeout は数値でも数値文字列でもよい）
//! - `{ "url": "...", "method": "get|post|put|delete", "body": ... }`: Transport 経由で送信
//!
//! 4 つの TaskType すべてにこの Executor を登録するのが既定構成。

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use super::{Executor, NotifyContext};
use crate::domain::{ExecutionOutcome, LoomError};
use crate::ports::{HttpCall, HttpMethod, Transport};

/// Parsed executor payload.
#[derive(Debug, Clone, PartialEq)]
pub enum HttpPayload {
    Simulated {
        seconds: f64,
        delay: Duration,
        text: String,
    },
    Request(HttpCall),
}

#[derive(Deserialize)]
struct RawPayload {
    timeout: Option<serde_json::Value>,
    text: Option<String>,
    url: Option<String>,
    method: Option<String>,
    body: Option<serde_json::Value>,
}

impl HttpPayload {
    pub fn parse(payload: &serde_json::Value) -> Result<Self, LoomError> {
        let raw: RawPayload = serde_json::from_value(payload.clone())
            .map_err(|e| LoomError::InvalidPayload(e.to_string()))?;

        if let Some(seconds) = raw.timeout.as_ref().and_then(seconds_of)
            && seconds.is_finite()
            && seconds > 0.0
            && let Some(text) = raw.text
            && !text.is_empty()
        {
            let delay = Duration::try_from_secs_f64(seconds)
                .map_err(|e| LoomError::InvalidPayload(format!("timeout {seconds}: {e}")))?;
            return Ok(HttpPayload::Simulated {
                seconds,
                delay,
                text,
            });
        }

        let (Some(url), Some(method)) = (raw.url, raw.method) else {
            return Err(LoomError::InvalidPayload(
                "expected {timeout, text} or {url, method}".to_string(),
            ));
        };
        if url.is_empty() {
            return Err(LoomError::InvalidPayload("url must not be empty".to_string()));
        }
        let method: HttpMethod = method.parse()?;

        Ok(HttpPayload::Request(HttpCall {
            method,
            url,
            body: raw.body.filter(|b| !b.is_null()),
        }))
    }
}

/// `2`, `1.5` and `"2"` all count; anything else is treated as absent.
fn seconds_of(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub struct HttpExecutor {
    transport: Arc<dyn Transport>,
}

impl HttpExecutor {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl Executor for HttpExecutor {
    async fn perform(&self, payload: &serde_json::Value) -> Result<ExecutionOutcome, LoomError> {
        match HttpPayload::parse(payload)? {
            HttpPayload::Simulated {
                seconds,
                delay,
                text,
            } => {
                info!(%text, seconds, "simulating call");
                tokio::time::sleep(delay).await;
                info!(%text, "simulated call completed");
                Ok(ExecutionOutcome::success()
                    .with_data(json!(format!("Success response after {seconds} seconds"))))
            }
            HttpPayload::Request(call) => {
                debug!(method = %call.method, url = %call.url, "sending request");
                match self.transport.send(call).await {
                    Ok(response) => Ok(ExecutionOutcome::success().with_data(response.body)),
                    Err(e) => Ok(ExecutionOutcome::failure(e.to_string())),
                }
            }
        }
    }

    async fn notify(&self, ctx: NotifyContext) -> Result<(), LoomError> {
        let Some(url) = ctx.callback.clone() else {
            debug!(task_id = %ctx.task_id, "no callback configured");
            return Ok(());
        };

        let body = serde_json::to_value(&ctx)
            .map_err(|e| LoomError::Execution(format!("callback body: {e}")))?;
        self.transport
            .send(HttpCall {
                method: HttpMethod::Post,
                url,
                body: Some(body),
            })
            .await?;
        Ok(())
    }

    fn validate(&self, payload: &serde_json::Value) -> Result<(), LoomError> {
        HttpPayload::parse(payload).map(|_| ())
    }
}
