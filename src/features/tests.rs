use super::extract::{extract, NetworkOptions};
use super::layout::{FEATURE_COUNT, FEATURE_LAYOUT};
use crate::error::CoreError;

fn lexical(url: &str) -> super::vector::FeatureVector {
    extract(url, &NetworkOptions::disabled()).unwrap()
}

#[test]
fn test_schema_complete_for_ordinary_url() {
    let v = lexical("https://www.example.com/a/b?x=1");
    assert_eq!(v.values.len(), FEATURE_COUNT);
    for name in FEATURE_LAYOUT {
        assert!(v.get_by_name(name).is_some(), "missing feature {}", name);
    }
}

#[test]
fn test_empty_input_is_invalid() {
    match extract("", &NetworkOptions::disabled()) {
        Err(CoreError::InvalidInput(_)) => {}
        other => panic!("expected InvalidInput, got {:?}", other.map(|_| ())),
    }
    assert!(extract("   ", &NetworkOptions::disabled()).is_err());
}

#[test]
fn test_unparseable_input_returns_zero_schema() {
    let v = extract("ht!tp://%%%", &NetworkOptions::disabled()).unwrap();
    assert!(v.values.iter().all(|&x| x == 0.0));
}

#[test]
fn test_ratios_in_unit_interval() {
    for url in [
        "https://www.example.com",
        "http://192.168.0.1/login",
        "https://a1b2c3.tk/x?q=9",
        "example.com",
        "http://bit.ly/abc",
    ] {
        let v = lexical(url);
        for name in ["ratio_digits", "ratio_letters"] {
            let r = v.get_by_name(name).unwrap();
            assert!((0.0..=1.0).contains(&r), "{} out of range for {}", name, url);
        }
    }
}

#[test]
fn test_extraction_is_idempotent_without_network() {
    let a = lexical("https://accounts-update-secure-login.tk/verify");
    let b = lexical("https://accounts-update-secure-login.tk/verify");
    assert_eq!(a, b);
}

#[test]
fn test_keyword_and_tld_signals() {
    let v = lexical("https://accounts-update-secure-login.tk/verify");

    assert!(v.get_by_name("suspicious_keyword_count").unwrap() >= 4.0);
    assert_eq!(v.get_by_name("has_suspicious_keyword"), Some(1.0));
    assert_eq!(v.get_by_name("is_tld_suspicious"), Some(1.0));
    assert_eq!(v.get_by_name("is_trusted_domain"), Some(0.0));
}

#[test]
fn test_trusted_https_signals() {
    let v = lexical("https://www.who.int");

    assert_eq!(v.get_by_name("has_https"), Some(1.0));
    assert_eq!(v.get_by_name("is_trusted_domain"), Some(1.0));
    assert_eq!(v.get_by_name("is_https_and_trusted"), Some(1.0));
    assert_eq!(v.get_by_name("has_suspicious_keyword"), Some(0.0));
}

#[test]
fn test_ip_host_detection() {
    let v = lexical("http://203.0.113.44/paypal/login");
    assert_eq!(v.get_by_name("has_ip"), Some(1.0));

    // Version-like path segment must not trigger the IP flag
    let v = lexical("https://example.com/download/1.2.3.4/setup");
    assert_eq!(v.get_by_name("has_ip"), Some(0.0));
}

#[test]
fn test_subdomain_count_clamped() {
    let v = lexical("http://example.com");
    assert_eq!(v.get_by_name("num_subdomains"), Some(0.0));

    let v = lexical("http://a.b.c.example.com");
    assert_eq!(v.get_by_name("num_subdomains"), Some(3.0));
}

#[test]
fn test_structural_flags() {
    let v = lexical("http://user@example.com:8080/a//b?id=1");
    assert_eq!(v.get_by_name("has_at_symbol"), Some(1.0));
    assert_eq!(v.get_by_name("has_port"), Some(1.0));
    assert_eq!(v.get_by_name("has_query"), Some(1.0));
    assert_eq!(v.get_by_name("has_equals"), Some(1.0));
    assert_eq!(v.get_by_name("has_double_slash"), Some(1.0));
}

#[test]
fn test_hex_encoding_flag() {
    let v = lexical("http://example.com/a%20b");
    assert_eq!(v.get_by_name("has_hex_encoding"), Some(1.0));

    let v = lexical("http://example.com/ab");
    assert_eq!(v.get_by_name("has_hex_encoding"), Some(0.0));
}

#[test]
fn test_shortener_flag() {
    let v = lexical("http://bit.ly/3xYz");
    assert_eq!(v.get_by_name("is_shortener"), Some(1.0));
    assert_eq!(v.get_by_name("host_is_short"), Some(1.0));
}

#[test]
fn test_network_features_zero_when_disabled() {
    let v = lexical("https://www.example.com");
    assert_eq!(v.get_by_name("cert_valid"), Some(0.0));
    assert_eq!(v.get_by_name("cert_age_days"), Some(0.0));
    assert_eq!(v.get_by_name("cert_matches_host"), Some(0.0));
    assert_eq!(v.get_by_name("domain_age_days"), Some(0.0));
}

#[test]
fn test_scheme_assumed_for_parsing_only() {
    let with_scheme = lexical("http://example.com/login");
    let without_scheme = lexical("example.com/login");

    // Same host/path signals either way
    assert_eq!(
        with_scheme.get_by_name("host_length"),
        without_scheme.get_by_name("host_length")
    );
    assert_eq!(
        with_scheme.get_by_name("path_length"),
        without_scheme.get_by_name("path_length")
    );
    // But the synthetic scheme does not inflate the URL length
    assert!(
        without_scheme.get_by_name("url_length").unwrap()
            < with_scheme.get_by_name("url_length").unwrap()
    );
}
