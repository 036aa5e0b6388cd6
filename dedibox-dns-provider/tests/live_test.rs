//! Read-only checks against the real Dedibox API
//!
//! 需要环境变量：
//! - `DEDIBOX_API_TOKEN`
//! - `DEDIBOX_TEST_DOMAIN`（账户下已托管的域名）
//!
//! 运行: `cargo test -p dedibox-dns-provider --test live_test -- --nocapture`

mod common;

use dedibox_dns_provider::{DediboxClient, DediboxConfig, RecordType};

fn live_client() -> Option<(DediboxClient, String)> {
    let config = DediboxConfig::from_env().ok()?;
    let domain = std::env::var("DEDIBOX_TEST_DOMAIN").ok()?;
    let client = DediboxClient::from_config(&config).ok()?;
    Some((client, domain))
}

#[tokio::test]
async fn live_active_version_has_records() {
    skip_if_no_credentials!("DEDIBOX_API_TOKEN", "DEDIBOX_TEST_DOMAIN");
    let (client, domain) = require_some!(live_client());

    let versions = require_ok!(client.list_versions(&domain).await);
    assert_eq!(
        versions.iter().filter(|v| v.active).count(),
        1,
        "exactly one version must be active"
    );

    let active = require_ok!(client.find_active_version(&domain).await);
    let records = require_ok!(client.list_records(&domain, &active.uuid).await);
    println!(
        "{domain}: active version {} ({}) with {} records, {} duplicable",
        active.name,
        active.uuid,
        records.len(),
        records
            .iter()
            .filter(|r| RecordType::parse(&r.record_type).is_some())
            .count()
    );
}
