//! 共享测试工具和辅助函数

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use dedibox_dns_provider::{DediboxClient, DediboxConfig, DediboxProvider, StaticZoneResolver};
use wiremock::{MockServer, Request, ResponseTemplate};

/// 跳过测试的宏（当环境变量缺失时）
#[macro_export]
macro_rules! skip_if_no_credentials {
    ($($var:expr),+) => {
        $(
            if std::env::var($var).is_err() {
                eprintln!("跳过测试: 缺少环境变量 {}", $var);
                return;
            }
        )+
    };
}

/// 断言 `Option` 为 `Some`，并解包返回内部值（失败则直接让测试失败）。
#[macro_export]
macro_rules! require_some {
    ($expr:expr $(,)?) => {{
        let opt = $expr;
        assert!(opt.is_some(), "expected Some(..), got None");
        let Some(val) = opt else {
            return;
        };
        val
    }};
}

/// 断言 `Result` 为 `Ok`，并解包返回内部值（失败则直接让测试失败）。
#[macro_export]
macro_rules! require_ok {
    ($expr:expr $(,)?) => {{
        let res = $expr;
        assert!(res.is_ok(), "expected Ok(..), got {res:?}");
        let Ok(val) = res else {
            return;
        };
        val
    }};
    ($expr:expr, $($msg:tt)+) => {{
        let res = $expr;
        assert!(
            res.is_ok(),
            "{}: {res:?}",
            format_args!($($msg)+)
        );
        let Ok(val) = res else {
            return;
        };
        val
    }};
}

pub const TOKEN: &str = "test-api-token";
pub const ZONE: &str = "test.com.";
pub const DOMAIN: &str = "test.com";

/// UUID of the active version in `domain_versions_all.json`.
pub const ACTIVE_UUID: &str = "313dbb10-75b9-4401-9fdb-d9149e5611eb";
/// UUID returned by `create_version.json`.
pub const TEMP_UUID: &str = "313dbb10-75b9-4401-9fdb-d9149e5611ec";

pub const VERSIONS_PATH: &str = "/domain/test.com/version";

pub fn version_path(uuid: &str) -> String {
    format!("{VERSIONS_PATH}/{uuid}")
}

pub fn zone_path(uuid: &str) -> String {
    format!("{VERSIONS_PATH}/{uuid}/zone")
}

pub fn enable_path(uuid: &str) -> String {
    format!("{VERSIONS_PATH}/{uuid}/enable")
}

/// 读取 `tests/fixtures/` 下的 JSON 文件
pub fn fixture(name: &str) -> String {
    let path = format!("{}/tests/fixtures/{name}", env!("CARGO_MANIFEST_DIR"));
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("missing fixture {path}: {e}"))
}

/// JSON 响应，内容来自 fixture
pub fn json_fixture(status: u16, name: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_raw(fixture(name), "application/json")
}

pub fn json_body(status: u16, body: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(body)
}

pub fn client(server: &MockServer) -> DediboxClient {
    DediboxClient::with_options(TOKEN, &server.uri(), Duration::from_secs(5))
        .unwrap_or_else(|e| panic!("client construction failed: {e}"))
}

pub fn config(server: &MockServer) -> DediboxConfig {
    let mut config = DediboxConfig::new(TOKEN);
    config.base_url = server.uri();
    config.http_timeout = Duration::from_secs(5);
    config
}

/// Provider bound to the mock server, managing the single zone `test.com.`.
pub fn provider(config: DediboxConfig) -> DediboxProvider {
    DediboxProvider::with_resolver(config, Arc::new(StaticZoneResolver::new(ZONE)))
        .unwrap_or_else(|e| panic!("provider construction failed: {e}"))
}

/// `METHOD /path` of every request the server received, in order.
pub async fn request_log(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|r| format!("{} {}", r.method, r.url.path()))
        .collect()
}

/// Requests matching `method` and `path`, in order.
pub async fn requests_to(server: &MockServer, method: &str, path: &str) -> Vec<Request> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.method.as_str() == method && r.url.path() == path)
        .collect()
}

pub fn body_json(request: &Request) -> serde_json::Value {
    serde_json::from_slice(&request.body)
        .unwrap_or_else(|e| panic!("request body is not JSON: {e}"))
}
