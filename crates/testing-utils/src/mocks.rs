//! 内存 HTTP 传输替身
//!
//! 路由以百分号编码后的路径为键（如 `POST /api/jobs/orders%2Fv2/extract`），
//! 查询参数不参与匹配，但会被记录。

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use kel_console_client::{ApiRequest, ApiResponse, HttpMethod, HttpTransport};
use kel_console_core::{ConsoleError, ConsoleResult};
use serde_json::Value;
use url::Url;

const MOCK_BASE_URL: &str = "http://mock.kel.local/";

/// 被记录的一次出站请求
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: HttpMethod,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl RecordedRequest {
    pub fn route(&self) -> String {
        format!("{} {}", self.method, self.path)
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_query(&self, key: &str) -> bool {
        self.query_value(key).is_some()
    }
}

#[derive(Debug, Clone)]
enum MockReply {
    Response(ApiResponse),
    TransportError(String),
}

/// 脚本化的 HTTP 传输
///
/// 同一路由登记多个响应时依次消费，最后一个会被重复使用。
/// 未登记的路由返回 404。
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    routes: Arc<Mutex<HashMap<String, Vec<MockReply>>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, method: HttpMethod, path: &str, status: u16, body: &str) -> &Self {
        self.push(method, path, MockReply::Response(ApiResponse::new(status, body)));
        self
    }

    pub fn respond_json(&self, method: HttpMethod, path: &str, body: Value) -> &Self {
        self.respond(method, path, 200, &body.to_string())
    }

    pub fn respond_error(&self, method: HttpMethod, path: &str, status: u16, error: &str) -> &Self {
        let body = serde_json::json!({ "error": error }).to_string();
        self.respond(method, path, status, &body)
    }

    /// 模拟请求未到达服务端
    pub fn fail(&self, method: HttpMethod, path: &str, message: &str) -> &Self {
        self.push(method, path, MockReply::TransportError(message.to_string()));
        self
    }

    pub fn clear_routes(&self) {
        self.routes.lock().unwrap().clear();
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests_to(&self, method: HttpMethod, path: &str) -> Vec<RecordedRequest> {
        let route = route_key(method, path);
        self.requests()
            .into_iter()
            .filter(|r| r.route() == route)
            .collect()
    }

    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    pub fn clear_requests(&self) {
        self.requests.lock().unwrap().clear();
    }

    fn push(&self, method: HttpMethod, path: &str, reply: MockReply) {
        self.routes
            .lock()
            .unwrap()
            .entry(route_key(method, path))
            .or_default()
            .push(reply);
    }

    fn next_reply(&self, route: &str) -> Option<MockReply> {
        let mut routes = self.routes.lock().unwrap();
        let replies = routes.get_mut(route)?;
        if replies.len() > 1 {
            Some(replies.remove(0))
        } else {
            replies.first().cloned()
        }
    }
}

fn route_key(method: HttpMethod, path: &str) -> String {
    format!("{method} {path}")
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: ApiRequest) -> ConsoleResult<ApiResponse> {
        let base = Url::parse(MOCK_BASE_URL).expect("mock base url");
        let url = request.url(&base)?;
        let recorded = RecordedRequest {
            method: request.method,
            path: url.path().to_string(),
            query: request.query.clone(),
            body: request.body.clone(),
        };
        let route = recorded.route();
        self.requests.lock().unwrap().push(recorded);

        match self.next_reply(&route) {
            Some(MockReply::Response(response)) => Ok(response),
            Some(MockReply::TransportError(message)) => Err(ConsoleError::transport(message)),
            None => Ok(ApiResponse::new(404, r#"{"error":"not found"}"#)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_replies_then_repeat_last() {
        let transport = MockTransport::new();
        transport
            .respond(HttpMethod::Get, "/api/tasks/1", 500, "")
            .respond(HttpMethod::Get, "/api/tasks/1", 200, "{}");

        let route = "GET /api/tasks/1";
        assert!(matches!(
            transport.next_reply(route),
            Some(MockReply::Response(r)) if r.status == 500
        ));
        for _ in 0..2 {
            assert!(matches!(
                transport.next_reply(route),
                Some(MockReply::Response(r)) if r.status == 200
            ));
        }
    }
}
