//! Dedibox HTTP 请求方法

use reqwest::header::ACCEPT;
use reqwest::{Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::Result;
use crate::http_client::{HttpResponse, HttpUtils};
use crate::utils::log_sanitizer::truncate_for_log;

use super::DediboxClient;

impl DediboxClient {
    /// 带认证头的请求构造器
    fn request(&self, method: Method, url: &Url) -> RequestBuilder {
        self.client
            .request(method, url.clone())
            .header(ACCEPT, "application/json")
            .bearer_auth(&self.api_token)
    }

    /// 发送请求并校验 2xx
    async fn send(
        &self,
        method: Method,
        url: &Url,
        builder: RequestBuilder,
    ) -> Result<HttpResponse> {
        let response = HttpUtils::execute_request(builder, &method, url.as_str()).await?;
        HttpUtils::ensure_success(response, &method, url.as_str())
    }

    /// 执行 GET 请求
    pub(crate) async fn get<T: DeserializeOwned>(&self, url: &Url) -> Result<T> {
        let builder = self.request(Method::GET, url);
        let response = self.send(Method::GET, url, builder).await?;
        HttpUtils::parse_json(&response, &Method::GET, url.as_str())
    }

    /// 执行 POST 请求（JSON 请求体）
    pub(crate) async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        url: &Url,
        body: &B,
    ) -> Result<T> {
        let body_json =
            serde_json::to_string(body).unwrap_or_else(|_| "<unserializable body>".to_string());
        log::debug!("[dedibox] Request Body: {}", truncate_for_log(&body_json));

        let builder = self.request(Method::POST, url).json(body);
        let response = self.send(Method::POST, url, builder).await?;
        HttpUtils::parse_json(&response, &Method::POST, url.as_str())
    }

    /// 执行无请求体、忽略响应体的 PATCH 请求
    pub(crate) async fn patch_empty(&self, url: &Url) -> Result<()> {
        let builder = self.request(Method::PATCH, url);
        self.send(Method::PATCH, url, builder).await?;
        Ok(())
    }

    /// 执行 DELETE 请求
    pub(crate) async fn delete(&self, url: &Url) -> Result<()> {
        let builder = self.request(Method::DELETE, url);
        self.send(Method::DELETE, url, builder).await?;
        Ok(())
    }
}
