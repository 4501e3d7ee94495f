//! Transport port - 外向きの HTTP 呼び出し
//!
//! Executor は「何を呼ぶか」だけを組み立て、実際の送信はここに任せる。
//! 本番は `impls::ReqwestTransport`、テストは記録用の fake。

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::LoomError;

/// HTTP methods an executor payload may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = LoomError;

    /// Case-insensitive: payloads arrive as `"get"`, `"POST"`, ...
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "get" => Ok(HttpMethod::Get),
            "post" => Ok(HttpMethod::Post),
            "put" => Ok(HttpMethod::Put),
            "delete" => Ok(HttpMethod::Delete),
            _ => Err(LoomError::InvalidPayload(format!("invalid method: {s}"))),
        }
    }
}

/// One outbound request.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpCall {
    pub method: HttpMethod,
    pub url: String,
    pub body: Option<serde_json::Value>,
}

/// A response with a success status.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: serde_json::Value,
}

/// Sends `HttpCall`s.
///
/// Implementations return `LoomError::Transport` for connection failures and
/// non-success status codes alike; the executor treats both as a failed
/// attempt.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, call: HttpCall) -> Result<HttpResponse, LoomError>;
}
