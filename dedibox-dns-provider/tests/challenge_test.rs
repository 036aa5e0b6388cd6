//! DNS-01 present / cleanup tests against a mock server

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::*;
use dedibox_dns_provider::{
    ChallengePhase, ChallengeProvider, ChallengeStep, DediboxError, DediboxProvider,
    StaticZoneResolver,
};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// sha256("keyAuth"), unpadded base64url
const KEY_AUTH: &str = "keyAuth";
const CHALLENGE_VALUE: &str = "pW9ZKG0xz_PCriK-nCMOjADy9eJcgGWIzkkj2fN4uZM";

/// Mounts every endpoint of a successful present + cleanup.
async fn mount_happy_path(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(VERSIONS_PATH))
        .respond_with(json_fixture(200, "domain_versions_all.json"))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path(VERSIONS_PATH))
        .respond_with(json_fixture(200, "create_version.json"))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(zone_path(ACTIVE_UUID)))
        .respond_with(json_fixture(200, "get_zone_mixed_types.json"))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path(zone_path(TEMP_UUID)))
        .respond_with(json_fixture(200, "create_record.json"))
        .mount(server)
        .await;
    Mock::given(method("PATCH"))
        .and(path(enable_path(TEMP_UUID)))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;
    mount_cleanup(server).await;
}

async fn mount_cleanup(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(version_path(TEMP_UUID)))
        .respond_with(json_fixture(200, "create_version.json"))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(version_path(ACTIVE_UUID)))
        .respond_with(json_fixture(200, "get_version.json"))
        .mount(server)
        .await;
    Mock::given(method("PATCH"))
        .and(path(enable_path(ACTIVE_UUID)))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(version_path(TEMP_UUID)))
        .respond_with(ResponseTemplate::new(204))
        .mount(server)
        .await;
}

fn versions_with_temp() -> serde_json::Value {
    json!([
        {
            "uuid_ref": ACTIVE_UUID,
            "Name": "activeVersion001",
            "creation_date": "2024-01-05T16:42:10.000Z",
            "active": true
        },
        {
            "uuid_ref": TEMP_UUID,
            "Name": "lego_tmp",
            "creation_date": "2024-03-01T10:20:30.000Z",
            "active": false
        }
    ])
}

#[tokio::test]
async fn present_then_cleanup() {
    let server = MockServer::start().await;
    mount_happy_path(&server).await;
    let provider = provider(config(&server));

    require_ok!(provider.present(DOMAIN, "token", KEY_AUTH).await);

    let session = require_some!(provider.session(ZONE).await);
    assert_eq!(session.active_version_uuid, ACTIVE_UUID);
    assert_eq!(session.temp_version_uuid, TEMP_UUID);

    let temp_zone = zone_path(TEMP_UUID);
    let present_log = request_log(&server).await;
    assert_eq!(
        present_log,
        vec![
            format!("GET {VERSIONS_PATH}"),
            format!("GET {VERSIONS_PATH}"),
            format!("POST {VERSIONS_PATH}"),
            format!("GET {}", zone_path(ACTIVE_UUID)),
            format!("POST {temp_zone}"),
            format!("POST {temp_zone}"),
            format!("POST {temp_zone}"),
            format!("PATCH {}", enable_path(TEMP_UUID)),
        ]
    );

    let posted = requests_to(&server, "POST", &temp_zone).await;
    let challenge = body_json(&posted[2]);
    assert_eq!(
        challenge,
        json!({
            "type": "TXT",
            "name": "_acme-challenge",
            "data": CHALLENGE_VALUE,
            "ttl": 120,
            "priority": 12
        })
    );

    require_ok!(provider.cleanup(DOMAIN, "token", KEY_AUTH).await);
    assert!(provider.session(ZONE).await.is_none());

    let cleanup_log = request_log(&server).await.split_off(present_log.len());
    assert_eq!(
        cleanup_log,
        vec![
            format!("GET {}", version_path(TEMP_UUID)),
            format!("GET {}", version_path(ACTIVE_UUID)),
            format!("PATCH {}", enable_path(ACTIVE_UUID)),
            format!("DELETE {}", version_path(TEMP_UUID)),
        ]
    );
}

#[tokio::test]
async fn wildcard_and_subdomain_record_names() {
    let server = MockServer::start().await;
    mount_happy_path(&server).await;
    let provider = provider(config(&server));

    require_ok!(provider.present("*.www.test.com", "token", KEY_AUTH).await);

    let posted = requests_to(&server, "POST", &zone_path(TEMP_UUID)).await;
    let challenge = body_json(&posted[2]);
    assert_eq!(challenge["name"], "_acme-challenge.www");
    assert_eq!(challenge["data"], CHALLENGE_VALUE);
}

#[tokio::test]
async fn custom_ttl_is_used() {
    let server = MockServer::start().await;
    mount_happy_path(&server).await;
    let mut config = config(&server);
    config.ttl = 600;
    let provider = provider(config);

    require_ok!(provider.present(DOMAIN, "token", KEY_AUTH).await);

    let posted = requests_to(&server, "POST", &zone_path(TEMP_UUID)).await;
    assert_eq!(body_json(&posted[2])["ttl"], 600);
}

#[tokio::test]
async fn present_refuses_existing_temporary_version() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(VERSIONS_PATH))
        .respond_with(json_body(200, versions_with_temp()))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;
    let provider = provider(config(&server));

    let result = provider.present(DOMAIN, "token", KEY_AUTH).await;
    let Err(err) = result else {
        panic!("expected a conflict, got {result:?}");
    };
    assert!(err.is_conflict());
    assert_eq!(err.phase, ChallengePhase::Present);
    assert_eq!(err.step, ChallengeStep::CheckTemporaryVersion);
    assert!(provider.session(ZONE).await.is_none());
}

#[tokio::test]
async fn second_present_in_same_zone_conflicts() {
    let server = MockServer::start().await;
    mount_happy_path(&server).await;
    let provider = provider(config(&server));

    require_ok!(provider.present(DOMAIN, "token", KEY_AUTH).await);
    let after_first = request_log(&server).await.len();

    let result = provider.present(DOMAIN, "token", "otherKeyAuth").await;
    assert!(
        matches!(&result, Err(e) if e.is_conflict()),
        "unexpected result: {result:?}"
    );

    // 只进行了名称检查
    assert_eq!(request_log(&server).await.len(), after_first + 1);
    let session = require_some!(provider.session(ZONE).await);
    assert_eq!(session.temp_version_uuid, TEMP_UUID);
}

#[tokio::test]
async fn present_without_active_version() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(VERSIONS_PATH))
        .respond_with(json_fixture(200, "domain_versions_none_active.json"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;
    let provider = provider(config(&server));

    let result = provider.present(DOMAIN, "token", KEY_AUTH).await;
    let Err(err) = result else {
        panic!("expected an error, got {result:?}");
    };
    assert!(err.is_not_found());
    assert_eq!(err.step, ChallengeStep::FindActiveVersion);
}

#[tokio::test]
async fn failed_step_stops_present() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(VERSIONS_PATH))
        .respond_with(json_fixture(200, "domain_versions_all.json"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(VERSIONS_PATH))
        .respond_with(json_fixture(200, "create_version.json"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(zone_path(ACTIVE_UUID)))
        .respond_with(json_body(200, json!([])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(zone_path(TEMP_UUID)))
        .respond_with(ResponseTemplate::new(400).set_body_string("invalid record"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let provider = provider(config(&server));

    let result = provider.present(DOMAIN, "token", KEY_AUTH).await;
    let Err(err) = result else {
        panic!("expected an error, got {result:?}");
    };
    assert_eq!(err.step, ChallengeStep::CreateChallengeRecord);
    assert_eq!(err.kind().status(), Some(400));
    assert!(err.kind().to_string().contains("invalid record"));
    assert!(err.to_string().starts_with("[dedibox] create_challenge_record failed:"));

    // 临时版本已创建，会话保留以便清理
    let session = require_some!(provider.session(ZONE).await);
    assert_eq!(session.temp_version_uuid, TEMP_UUID);
}

#[tokio::test]
async fn cleanup_after_failed_present_removes_temporary_version() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(VERSIONS_PATH))
        .respond_with(json_fixture(200, "domain_versions_all.json"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(VERSIONS_PATH))
        .respond_with(json_fixture(200, "create_version.json"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(zone_path(ACTIVE_UUID)))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    mount_cleanup(&server).await;
    let provider = provider(config(&server));

    let result = provider.present(DOMAIN, "token", KEY_AUTH).await;
    assert!(
        matches!(&result, Err(e) if e.step == ChallengeStep::DuplicateRecords),
        "unexpected result: {result:?}"
    );

    require_ok!(provider.cleanup(DOMAIN, "token", KEY_AUTH).await);
    assert_eq!(
        requests_to(&server, "DELETE", &version_path(TEMP_UUID))
            .await
            .len(),
        1
    );
}

#[tokio::test]
async fn cleanup_without_present() {
    let server = MockServer::start().await;
    let provider = provider(config(&server));

    let result = provider.cleanup(DOMAIN, "token", KEY_AUTH).await;
    let Err(err) = result else {
        panic!("expected an error, got {result:?}");
    };
    assert!(err.is_not_found());
    assert_eq!(err.phase, ChallengePhase::Cleanup);
    assert_eq!(err.step, ChallengeStep::LoadSession);
    assert!(request_log(&server).await.is_empty());
}

#[tokio::test]
async fn cleanup_with_vanished_temporary_version() {
    let server = MockServer::start().await;
    mount_happy_path(&server).await;
    let provider = provider(config(&server));
    require_ok!(provider.present(DOMAIN, "token", KEY_AUTH).await);

    server.reset().await;
    Mock::given(method("GET"))
        .and(path(version_path(TEMP_UUID)))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let result = provider.cleanup(DOMAIN, "token", KEY_AUTH).await;
    let Err(err) = result else {
        panic!("expected an error, got {result:?}");
    };
    assert!(err.is_not_found());
    assert_eq!(err.step, ChallengeStep::FetchTemporaryVersion);
}

#[tokio::test]
async fn failed_cleanup_can_be_retried() {
    let server = MockServer::start().await;
    mount_happy_path(&server).await;
    let provider = provider(config(&server));
    require_ok!(provider.present(DOMAIN, "token", KEY_AUTH).await);

    server.reset().await;
    Mock::given(method("DELETE"))
        .and(path(version_path(TEMP_UUID)))
        .respond_with(ResponseTemplate::new(500).set_body_string("try later"))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    mount_cleanup(&server).await;

    let result = provider.cleanup(DOMAIN, "token", KEY_AUTH).await;
    let Err(err) = result else {
        panic!("expected an error, got {result:?}");
    };
    assert_eq!(err.step, ChallengeStep::DeleteTemporaryVersion);
    assert!(err.kind().is_retryable());
    assert!(provider.session(ZONE).await.is_some());

    require_ok!(provider.cleanup(DOMAIN, "token", KEY_AUTH).await);
    assert!(provider.session(ZONE).await.is_none());
}

#[tokio::test]
async fn recovery_marker_allows_cleanup_from_fresh_provider() {
    let server = MockServer::start().await;
    mount_happy_path(&server).await;
    let mut config = config(&server);
    config.recovery_marker = true;

    let first = provider(config.clone());
    require_ok!(first.present(DOMAIN, "token", KEY_AUTH).await);

    let posted = requests_to(&server, "POST", &zone_path(TEMP_UUID)).await;
    assert_eq!(posted.len(), 4);
    let marker = body_json(&posted[3]);
    assert_eq!(marker["type"], "TXT");
    assert_eq!(marker["name"], "lego");
    assert_eq!(marker["data"], format!("active_version:{ACTIVE_UUID}"));

    // 新进程：只能从后端恢复会话
    server.reset().await;
    Mock::given(method("GET"))
        .and(path(VERSIONS_PATH))
        .respond_with(json_body(200, versions_with_temp()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(zone_path(TEMP_UUID)))
        .respond_with(json_body(
            200,
            json!([
                { "type": "A", "name": "www", "data": "192.0.2.10", "ttl": 3600 },
                { "type": "TXT", "name": "_acme-challenge", "data": CHALLENGE_VALUE, "ttl": 120 },
                { "type": "TXT", "name": "lego", "data": format!("active_version:{ACTIVE_UUID}"), "ttl": 120 }
            ]),
        ))
        .mount(&server)
        .await;
    mount_cleanup(&server).await;

    let second = provider(config);
    require_ok!(second.cleanup(DOMAIN, "token", KEY_AUTH).await);

    assert_eq!(
        requests_to(&server, "PATCH", &enable_path(ACTIVE_UUID))
            .await
            .len(),
        1
    );
    assert_eq!(
        requests_to(&server, "DELETE", &version_path(TEMP_UUID))
            .await
            .len(),
        1
    );
}

#[tokio::test]
async fn recovery_without_temporary_version() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(VERSIONS_PATH))
        .respond_with(json_fixture(200, "domain_versions_all.json"))
        .mount(&server)
        .await;
    let mut config = config(&server);
    config.recovery_marker = true;
    let provider = provider(config);

    let result = provider.cleanup(DOMAIN, "token", KEY_AUTH).await;
    let Err(err) = result else {
        panic!("expected an error, got {result:?}");
    };
    assert!(err.is_not_found());
    assert_eq!(err.step, ChallengeStep::LoadSession);
}

#[tokio::test]
async fn zone_outside_resolver_scope() {
    let server = MockServer::start().await;
    let provider = provider(config(&server));

    let result = provider.present("example.org", "token", KEY_AUTH).await;
    let Err(err) = result else {
        panic!("expected an error, got {result:?}");
    };
    assert_eq!(err.step, ChallengeStep::ResolveZone);
    assert!(matches!(err.kind(), DediboxError::ZoneResolution { .. }));
    assert!(request_log(&server).await.is_empty());
}

#[tokio::test]
async fn provider_surface() {
    let server = MockServer::start().await;
    let mut config = config(&server);
    config.propagation_timeout = Duration::from_secs(300);
    config.polling_interval = Duration::from_secs(5);

    let provider: Arc<dyn ChallengeProvider> = Arc::new(require_ok!(
        DediboxProvider::with_resolver(config, Arc::new(StaticZoneResolver::new(ZONE)))
    ));

    assert_eq!(provider.id(), "dedibox");
    assert_eq!(
        provider.timeout(),
        (Duration::from_secs(300), Duration::from_secs(5))
    );
}

#[tokio::test]
async fn invalid_config_is_rejected() {
    let server = MockServer::start().await;
    let mut config = config(&server);
    config.api_token = String::new();

    let result = DediboxProvider::with_resolver(config, Arc::new(StaticZoneResolver::new(ZONE)));
    assert!(matches!(result, Err(DediboxError::MissingCredential)));
}
