use std::time::Duration;

use async_trait::async_trait;
use kel_console_core::{ApiConfig, ConsoleError, ConsoleResult};
use tracing::debug;
use url::Url;

use crate::request::{ApiRequest, ApiResponse, HttpMethod};

/// HTTP 传输抽象
///
/// 非 2xx 响应不是传输错误，原样返回由上层归一化；
/// 只有请求未能完成时才返回 `Err`。
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> ConsoleResult<ApiResponse>;
}

/// 基于 reqwest 的传输实现，超时策略在此处统一设置
pub struct ReqwestTransport {
    base_url: Url,
    http_client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(config: &ApiConfig) -> ConsoleResult<Self> {
        config.validate()?;
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ConsoleError::config_error(format!("API基础地址无效: {e}")))?;
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| ConsoleError::Internal(format!("创建HTTP客户端失败: {e}")))?;

        Ok(Self {
            base_url,
            http_client,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> ConsoleResult<ApiResponse> {
        let url = request.url(&self.base_url)?;
        debug!("{} {}", request.method, url);

        let builder = match request.method {
            HttpMethod::Get => self.http_client.get(url),
            HttpMethod::Post => self.http_client.post(url),
            HttpMethod::Put => self.http_client.put(url),
            HttpMethod::Delete => self.http_client.delete(url),
        };
        let builder = match &request.body {
            Some(body) => builder.json(body),
            None => builder,
        };

        let response = builder
            .send()
            .await
            .map_err(|e| ConsoleError::transport(format!("网络请求失败: {e}")))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ConsoleError::transport(format!("读取响应失败: {e}")))?;

        Ok(ApiResponse { status, body })
    }
}
