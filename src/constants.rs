//! Central Configuration Constants
//!
//! Single source of truth for curated signal lists and service defaults.
//! To tune the keyword or TLD lists, only edit this file.

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "PhishGuard";

/// Default RDAP endpoint for domain-age lookups
///
/// rdap.org redirects to the registry responsible for the queried TLD.
pub const DEFAULT_RDAP_URL: &str = "https://rdap.org";

/// Default probe timeout (seconds) for TLS / RDAP lookups
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 3;

/// Hosts shorter than this count as "short" (shortener-style) hosts
pub const SHORT_HOST_LEN: usize = 15;

// ============================================================================
// CURATED SIGNAL LISTS
// ============================================================================

/// Keywords that frequently appear in credential-phishing URLs.
/// Membership is substring-based over the whole normalized URL.
pub const SUSPICIOUS_KEYWORDS: &[&str] = &[
    "secure", "account", "update", "login", "signin", "banking", "confirm",
    "password", "ebay", "paypal", "dropbox", "admin", "submit", "wp-admin",
    "webscr", "verify", "validate", "reset",
];

/// TLDs with disproportionate phishing registration volume
pub const SUSPICIOUS_TLDS: &[&str] = &["tk", "ml", "ga", "cf", "gq", "xyz"];

/// Well-known URL shortener hosts
pub const URL_SHORTENERS: &[&str] = &[
    "bit.ly", "goo.gl", "t.co", "tinyurl.com", "is.gd", "ow.ly",
];

/// Allowlist fragments for institutional domains.
/// Matched as substrings of the host.
pub const TRUSTED_DOMAINS: &[&str] = &[
    "gov", ".gov", ".edu", "who.int", "nasa.gov", "india.gov.in", "europa.eu",
];

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get RDAP endpoint from environment or use default
pub fn get_rdap_url() -> String {
    std::env::var("PHISHGUARD_RDAP_URL").unwrap_or_else(|_| DEFAULT_RDAP_URL.to_string())
}

/// Check if network-derived features are enabled via environment
pub fn network_checks_env_enabled() -> bool {
    std::env::var("PHISHGUARD_NETWORK_CHECKS")
        .map(|s| s.to_lowercase() != "false" && s != "0")
        .unwrap_or(false)
}
