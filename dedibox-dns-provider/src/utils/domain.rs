//! 域名名称处理

/// 去掉域名末尾的点
pub fn normalize_domain_name(name: &str) -> &str {
    name.trim_end_matches('.')
}

/// 补全末尾的点，得到 FQDN
/// 如: "example.com" -> "example.com."
pub fn to_fqdn(name: &str) -> String {
    format!("{}.", normalize_domain_name(name))
}

/// 将 zone（FQDN 形式）转换为 API 路径中的域名段
/// 如: "example.com." -> "example.com"
pub fn domain_segment(zone: &str) -> &str {
    zone.strip_suffix('.').unwrap_or(zone)
}

/// 判断 `fqdn` 是否位于 `zone` 之内（含 zone 本身），不区分大小写
pub fn is_within_zone(fqdn: &str, zone: &str) -> bool {
    let full = normalize_domain_name(fqdn).to_ascii_lowercase();
    let zone = normalize_domain_name(zone).to_ascii_lowercase();

    full == zone || full.ends_with(&format!(".{zone}"))
}

/// 将完整域名转换为相对名称
/// 如: "_acme-challenge.www.example.com." + "example.com." -> "_acme-challenge.www"
/// 如: "example.com." + "example.com." -> "@"
pub fn full_name_to_relative(full_name: &str, zone_name: &str) -> String {
    let full = normalize_domain_name(full_name);
    let zone = normalize_domain_name(zone_name);

    if full.eq_ignore_ascii_case(zone) {
        "@".to_string()
    } else if let Some(subdomain) = full.strip_suffix(&format!(".{zone}")) {
        subdomain.to_string()
    } else {
        full.to_string()
    }
}
