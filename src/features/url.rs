//! Lexical URL Feature Extraction
//!
//! Computes every signal that can be derived from the URL string alone.
//! Parsing is permissive; callers decide what to do when it fails
//! (see `extract.rs` for the zero-vector policy).

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use super::vector::{FeatureExtractor, FeatureVector};
use crate::constants::{
    SHORT_HOST_LEN, SUSPICIOUS_KEYWORDS, SUSPICIOUS_TLDS, TRUSTED_DOMAINS, URL_SHORTENERS,
};
use crate::error::CoreError;

// ============================================================================
// PATTERNS
// ============================================================================

/// Strict dotted-quad match. Deliberately not a general IP parser, so
/// version-like path segments ("1.2.3.4" inside a path) or exotic IP
/// notations never count as an IP host.
static DOTTED_QUAD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:\d{1,3}\.){3}\d{1,3}$").expect("dotted-quad regex"));

/// Percent-escape obfuscation
static HEX_ESCAPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"%[0-9a-fA-F]{2}").expect("hex-escape regex"));

/// Plausible registered-name charset. The permissive parser accepts more
/// than this; anything outside is treated as unparseable upstream.
static HOST_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9._-]+$").expect("host regex"));

// ============================================================================
// NORMALIZATION & PARSING
// ============================================================================

/// Trim and lowercase the raw input. The only hard failure in the whole
/// extraction pipeline: empty input after trimming.
pub fn normalize(url: &str) -> Result<String, CoreError> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(CoreError::InvalidInput("empty URL".to_string()));
    }
    Ok(trimmed.to_lowercase())
}

fn has_scheme(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Strict dotted-quad check, shared with the probe module
pub(crate) fn is_dotted_quad(host: &str) -> bool {
    DOTTED_QUAD_RE.is_match(host)
}

/// Decomposed URL. `scheme` reflects the original input; a synthetic
/// `http://` added for parsing does not mark the URL as insecure beyond
/// what the absence of `https://` already does.
#[derive(Debug, Clone)]
pub struct UrlParts {
    pub scheme: String,
    pub host: String,
    pub path: String,
    pub query: String,
    pub explicit_port: bool,
}

/// Parse a normalized URL into its parts.
///
/// Returns `None` when the URL does not parse or the host is not a
/// plausible registered name / dotted quad; the caller maps that to the
/// all-zero schema.
pub fn parse_parts(normalized: &str) -> Option<UrlParts> {
    let input = if has_scheme(normalized) {
        normalized.to_string()
    } else {
        format!("http://{}", normalized)
    };

    let parsed = Url::parse(&input).ok()?;
    let host = parsed.host_str()?.to_string();
    if !HOST_RE.is_match(&host) {
        return None;
    }

    Some(UrlParts {
        scheme: parsed.scheme().to_string(),
        host,
        path: parsed.path().to_string(),
        query: parsed.query().unwrap_or("").to_string(),
        explicit_port: parsed.port().is_some(),
    })
}

// ============================================================================
// LEXICAL SIGNALS
// ============================================================================

/// Signal group computed from the normalized URL string and its parts
pub struct LexicalSignals<'a> {
    pub url: &'a str,
    pub parts: &'a UrlParts,
}

impl LexicalSignals<'_> {
    fn is_https(&self) -> bool {
        self.parts.scheme == "https"
    }

    fn tld(&self) -> &str {
        if self.parts.host.contains('.') {
            self.parts.host.rsplit('.').next().unwrap_or("")
        } else {
            ""
        }
    }

    fn keyword_hits(&self) -> usize {
        SUSPICIOUS_KEYWORDS
            .iter()
            .filter(|k| self.url.contains(*k))
            .count()
    }

    fn is_trusted(&self) -> bool {
        TRUSTED_DOMAINS.iter().any(|t| self.parts.host.contains(t))
    }
}

impl FeatureExtractor for LexicalSignals<'_> {
    fn extract(&self, vector: &mut FeatureVector) {
        let host = &self.parts.host;
        let path = &self.parts.path;
        let query = &self.parts.query;

        // Counts run over host+path+query, the portion an attacker
        // actually controls.
        let full = format!("{}{}?{}", host, path, query);
        let total = full.chars().count();
        let digits = full.chars().filter(|c| c.is_ascii_digit()).count();
        let letters = full.chars().filter(|c| c.is_alphabetic()).count();

        vector.set_by_name("url_length", self.url.chars().count() as f32);
        vector.set_by_name("host_length", host.chars().count() as f32);
        vector.set_by_name("path_length", path.chars().count() as f32);
        vector.set_by_name("query_length", query.chars().count() as f32);

        vector.set_by_name("num_dots", full.matches('.').count() as f32);
        vector.set_by_name("num_hyphens", full.matches('-').count() as f32);
        vector.set_by_name("num_underscores", full.matches('_').count() as f32);
        vector.set_by_name("num_slashes", full.matches('/').count() as f32);
        vector.set_by_name("num_digits", digits as f32);
        vector.set_by_name("num_letters", letters as f32);

        // Ratios must never divide by zero
        let ratio = |n: usize| {
            if total == 0 {
                0.0
            } else {
                n as f32 / total as f32
            }
        };
        vector.set_by_name("ratio_digits", ratio(digits));
        vector.set_by_name("ratio_letters", ratio(letters));

        vector.set_flag("has_https", self.is_https());
        vector.set_by_name("count_https_token", self.url.matches("https").count() as f32);

        vector.set_flag("has_ip", DOTTED_QUAD_RE.is_match(host));
        vector.set_flag("has_at_symbol", self.url.contains('@'));
        vector.set_flag("has_port", self.parts.explicit_port);
        vector.set_flag("has_query", !query.is_empty());
        vector.set_flag("has_equals", query.contains('='));
        vector.set_flag(
            "has_double_slash",
            path.trim_start_matches('/').contains("//"),
        );
        vector.set_flag("has_hex_encoding", HEX_ESCAPE_RE.is_match(self.url));
        vector.set_by_name(
            "num_subdomains",
            host.matches('.').count().saturating_sub(1) as f32,
        );

        let hits = self.keyword_hits();
        vector.set_by_name("suspicious_keyword_count", hits as f32);
        vector.set_flag("has_suspicious_keyword", hits > 0);

        let tld = self.tld();
        vector.set_by_name("tld_length", tld.chars().count() as f32);
        vector.set_flag("is_tld_suspicious", SUSPICIOUS_TLDS.contains(&tld));
        vector.set_flag("is_shortener", URL_SHORTENERS.contains(&host.as_str()));

        let trusted = self.is_trusted();
        vector.set_flag("is_trusted_domain", trusted);
        vector.set_flag("host_is_short", host.chars().count() < SHORT_HOST_LEN);
        vector.set_flag("is_https_and_trusted", self.is_https() && trusted);
    }
}

// ============================================================================
// FLAG REASON
// ============================================================================

/// Human-readable headline for why a URL looks risky.
/// Operator-facing only; never fed to the model.
pub fn flag_reason(vector: &FeatureVector) -> Option<&'static str> {
    let flag = |name: &str| vector.get_by_name(name).unwrap_or(0.0) > 0.0;

    if flag("has_suspicious_keyword") && vector.get_by_name("num_subdomains").unwrap_or(0.0) > 2.0 {
        Some("Suspicious keywords and many subdomains")
    } else if flag("has_ip") {
        Some("IP address used as host")
    } else if flag("is_shortener") {
        Some("Shortened URL")
    } else if flag("has_at_symbol") {
        Some("Obfuscated with '@'")
    } else if !flag("has_https") {
        Some("Not using HTTPS")
    } else {
        None
    }
}

// ============================================================================
// TESTS
// ============================================================================
