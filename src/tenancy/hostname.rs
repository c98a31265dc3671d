//! Host header parsing

use std::net::IpAddr;

/// Lower-case a host, dropping any port and trailing dot
pub fn normalize_host(raw: &str) -> Option<String> {
    let raw = raw.trim();

    let host = if let Some(rest) = raw.strip_prefix('[') {
        // [v6]:port
        rest.split(']').next().unwrap_or_default()
    } else if raw.matches(':').count() == 1 {
        raw.split(':').next().unwrap_or_default()
    } else {
        raw
    };

    let host = host.trim_end_matches('.').to_ascii_lowercase();
    (!host.is_empty()).then_some(host)
}

/// Tenant slug carried as the first label of `host`.
///
/// Bare IPs, `localhost`, hosts with fewer than `min_labels` labels, and
/// reserved leading labels never name a tenant.
pub fn extract_subdomain(host: &str, reserved: &[String], min_labels: usize) -> Option<String> {
    let host = normalize_host(host)?;

    if host == "localhost" || host.ends_with(".localhost") || host.parse::<IpAddr>().is_ok() {
        return None;
    }

    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() < min_labels || labels.iter().any(|l| l.is_empty()) {
        return None;
    }

    let first = labels[0];
    if reserved.iter().any(|r| r.eq_ignore_ascii_case(first)) {
        return None;
    }
    Some(first.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reserved() -> Vec<String> {
        vec!["www".into(), "api".into(), "app".into()]
    }

    #[test]
    fn test_normalize_host() {
        assert_eq!(normalize_host("Acme.Example.COM:8080").as_deref(), Some("acme.example.com"));
        assert_eq!(normalize_host("example.com.").as_deref(), Some("example.com"));
        assert_eq!(normalize_host("[::1]:3000").as_deref(), Some("::1"));
        assert_eq!(normalize_host("::1").as_deref(), Some("::1"));
        assert_eq!(normalize_host("  "), None);
    }

    #[test]
    fn test_extract_subdomain() {
        assert_eq!(
            extract_subdomain("acme.platform.io", &reserved(), 3).as_deref(),
            Some("acme")
        );
        assert_eq!(extract_subdomain("platform.io", &reserved(), 3), None);
        assert_eq!(extract_subdomain("www.platform.io", &reserved(), 3), None);
        assert_eq!(extract_subdomain("API.platform.io", &reserved(), 3), None);
    }

    #[test]
    fn test_ip_and_localhost_rejected() {
        assert_eq!(extract_subdomain("10.0.0.12", &reserved(), 3), None);
        assert_eq!(extract_subdomain("10.0.0.12:8080", &reserved(), 3), None);
        assert_eq!(extract_subdomain("[::1]:8080", &reserved(), 3), None);
        assert_eq!(extract_subdomain("localhost:3000", &reserved(), 3), None);
        assert_eq!(extract_subdomain("acme.localhost", &reserved(), 2), None);
    }
}
