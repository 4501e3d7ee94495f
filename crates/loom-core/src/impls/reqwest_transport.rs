//! ReqwestTransport - Transport の本番実装

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::LoomError;
use crate::ports::{HttpCall, HttpMethod, HttpResponse, Transport};

pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Transport with a per-request timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, LoomError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LoomError::Transport(format!("client build failed: {e}")))?;
        Ok(Self { client })
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

fn to_reqwest(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Delete => reqwest::Method::DELETE,
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, call: HttpCall) -> Result<HttpResponse, LoomError> {
        let mut request = self.client.request(to_reqwest(call.method), &call.url);
        if let Some(body) = &call.body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| LoomError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoomError::Transport(format!(
                "{} {} returned {}",
                call.method, call.url, status
            )));
        }

        // body が JSON でなければ文字列として持つ
        let text = response
            .text()
            .await
            .map_err(|e| LoomError::Transport(e.to_string()))?;
        let body = serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text));

        Ok(HttpResponse {
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_every_method() {
        assert_eq!(to_reqwest(HttpMethod::Get), reqwest::Method::GET);
        assert_eq!(to_reqwest(HttpMethod::Post), reqwest::Method::POST);
        assert_eq!(to_reqwest(HttpMethod::Put), reqwest::Method::PUT);
        assert_eq!(to_reqwest(HttpMethod::Delete), reqwest::Method::DELETE);
    }

    #[tokio::test]
    async fn unreachable_host_is_a_transport_error() {
        // a port that was just free and is no longer listened on
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let transport = ReqwestTransport::with_timeout(Duration::from_millis(500)).unwrap();
        let err = transport
            .send(HttpCall {
                method: HttpMethod::Get,
                url: format!("http://127.0.0.1:{port}/"),
                body: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, LoomError::Transport(_)));
    }
}
