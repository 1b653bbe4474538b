//! Network-Derived Feature Probes
//!
//! Live enrichment: TLS certificate signals (handshake on port 443) and
//! RDAP domain age. Every failure mode here - DNS, connect, handshake,
//! HTTP, parse, timeout - degrades to sentinel values. Network flakiness
//! must never fail feature extraction, and no probe ever outlives its
//! timeout by more than one socket operation.

use std::fmt;
use std::io;
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use once_cell::sync::Lazy;
use rustls::pki_types::ServerName;
use x509_parser::prelude::*;

use super::url::is_dotted_quad;
use super::vector::{FeatureExtractor, FeatureVector};
use crate::constants;

// ============================================================================
// SENTINELS
// ============================================================================

/// Sentinel for unavailable age signals (days)
pub const AGE_UNKNOWN: i64 = -1;

/// Sentinel issuer when the certificate could not be read
pub const ISSUER_UNKNOWN: &str = "Unknown";

// ============================================================================
// TLS CLIENT CONFIG
// ============================================================================

static TLS_CONFIG: Lazy<Arc<rustls::ClientConfig>> = Lazy::new(|| {
    let roots = rustls::RootCertStore {
        roots: webpki_roots::TLS_SERVER_ROOTS.iter().cloned().collect(),
    };
    Arc::new(
        rustls::ClientConfig::builder()
            .with_root_certificates(roots)
            .with_no_client_auth(),
    )
});

// ============================================================================
// PROBE ERROR (internal only - never crosses the module boundary)
// ============================================================================

#[derive(Debug)]
enum ProbeError {
    Dns(String),
    Io(io::Error),
    Tls(String),
    Http(String),
    Parse(String),
    NotApplicable(&'static str),
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeError::Dns(msg) => write!(f, "DNS: {}", msg),
            ProbeError::Io(e) => write!(f, "IO: {}", e),
            ProbeError::Tls(msg) => write!(f, "TLS: {}", msg),
            ProbeError::Http(msg) => write!(f, "HTTP: {}", msg),
            ProbeError::Parse(msg) => write!(f, "Parse: {}", msg),
            ProbeError::NotApplicable(msg) => write!(f, "Not applicable: {}", msg),
        }
    }
}

impl From<io::Error> for ProbeError {
    fn from(err: io::Error) -> Self {
        ProbeError::Io(err)
    }
}

// ============================================================================
// CERTIFICATE INFO
// ============================================================================

/// Certificate signals for one host.
/// `Default` is the documented sentinel state.
#[derive(Debug, Clone)]
pub struct CertificateInfo {
    pub valid: bool,
    pub age_days: i64,
    pub issuer: String,
    pub matches_host: bool,
}

impl Default for CertificateInfo {
    fn default() -> Self {
        Self {
            valid: false,
            age_days: AGE_UNKNOWN,
            issuer: ISSUER_UNKNOWN.to_string(),
            matches_host: false,
        }
    }
}

// ============================================================================
// NETWORK SIGNALS
// ============================================================================

/// Signal group collected from the network probes.
/// `Default` carries the full sentinel set.
#[derive(Debug, Clone)]
pub struct NetworkSignals {
    pub cert: CertificateInfo,
    pub domain_age_days: i64,
}

impl Default for NetworkSignals {
    fn default() -> Self {
        Self {
            cert: CertificateInfo::default(),
            domain_age_days: AGE_UNKNOWN,
        }
    }
}

impl FeatureExtractor for NetworkSignals {
    fn extract(&self, vector: &mut FeatureVector) {
        vector.set_flag("cert_valid", self.cert.valid);
        vector.set_by_name("cert_age_days", self.cert.age_days as f32);
        vector.set_flag("cert_matches_host", self.cert.matches_host);
        vector.set_by_name("domain_age_days", self.domain_age_days as f32);
    }
}

/// Run both probes for a host. Never fails: each probe error is logged
/// at debug level and replaced by its sentinel.
pub fn collect(host: &str, timeout: Duration) -> NetworkSignals {
    let cert = match probe_certificate(host, timeout) {
        Ok(info) => info,
        Err(e) => {
            log::debug!("certificate probe for {} degraded to sentinel: {}", host, e);
            CertificateInfo::default()
        }
    };

    let domain_age_days = match lookup_domain_age(host, timeout) {
        Ok(days) => days,
        Err(e) => {
            log::debug!("domain-age lookup for {} degraded to sentinel: {}", host, e);
            AGE_UNKNOWN
        }
    };

    NetworkSignals {
        cert,
        domain_age_days,
    }
}

// ============================================================================
// TLS CERTIFICATE PROBE
// ============================================================================

fn probe_certificate(host: &str, timeout: Duration) -> Result<CertificateInfo, ProbeError> {
    let server_name = ServerName::try_from(host.to_string())
        .map_err(|e| ProbeError::Tls(format!("invalid server name: {}", e)))?;

    let addr = (host, 443u16)
        .to_socket_addrs()
        .map_err(|e| ProbeError::Dns(e.to_string()))?
        .next()
        .ok_or_else(|| ProbeError::Dns(format!("no address for {}", host)))?;

    let mut sock = TcpStream::connect_timeout(&addr, timeout)?;
    sock.set_read_timeout(Some(timeout))?;
    sock.set_write_timeout(Some(timeout))?;

    let mut conn = rustls::ClientConnection::new(Arc::clone(&TLS_CONFIG), server_name)
        .map_err(|e| ProbeError::Tls(e.to_string()))?;

    // Drive the handshake to completion; chain validation happens here.
    while conn.is_handshaking() {
        conn.complete_io(&mut sock)
            .map_err(|e| ProbeError::Tls(e.to_string()))?;
    }

    let certs = conn
        .peer_certificates()
        .ok_or_else(|| ProbeError::Tls("no peer certificate".to_string()))?;
    let leaf = certs
        .first()
        .ok_or_else(|| ProbeError::Tls("empty certificate chain".to_string()))?;

    let (_, cert) = X509Certificate::from_der(leaf.as_ref())
        .map_err(|e| ProbeError::Parse(e.to_string()))?;

    let now = Utc::now().timestamp();
    let not_before = cert.validity().not_before.timestamp();
    let not_after = cert.validity().not_after.timestamp();

    let issuer = cert
        .issuer()
        .iter_common_name()
        .next()
        .or_else(|| cert.issuer().iter_organization().next())
        .and_then(|attr| attr.as_str().ok())
        .unwrap_or(ISSUER_UNKNOWN)
        .to_string();

    let matches_host = cert
        .subject()
        .iter_common_name()
        .filter_map(|attr| attr.as_str().ok())
        .any(|cn| cert_name_matches(cn, host));

    Ok(CertificateInfo {
        valid: now >= not_before && now < not_after,
        age_days: (now - not_before) / 86_400,
        issuer,
        matches_host,
    })
}

/// CN comparison with wildcard support
fn cert_name_matches(cn: &str, host: &str) -> bool {
    let cn = cn.to_lowercase();
    if let Some(suffix) = cn.strip_prefix("*.") {
        host == suffix || host.ends_with(&format!(".{}", suffix))
    } else {
        cn == host || cn.contains(host)
    }
}

// ============================================================================
// RDAP DOMAIN AGE
// ============================================================================

/// Registrable portion of a host: the last two labels. Multi-label
/// public suffixes (co.uk style) fall through to an RDAP miss and thus
/// the sentinel.
fn registrable_domain(host: &str) -> String {
    let labels: Vec<&str> = host.split('.').filter(|l| !l.is_empty()).collect();
    if labels.len() <= 2 {
        host.trim_matches('.').to_string()
    } else {
        labels[labels.len() - 2..].join(".")
    }
}

fn lookup_domain_age(host: &str, timeout: Duration) -> Result<i64, ProbeError> {
    if is_dotted_quad(host) {
        return Err(ProbeError::NotApplicable("IP-literal host"));
    }

    let domain = registrable_domain(host);
    let endpoint = format!("{}/domain/{}", constants::get_rdap_url(), domain);

    let response = ureq::get(&endpoint)
        .timeout(timeout)
        .call()
        .map_err(|e| ProbeError::Http(e.to_string()))?;

    let body = response
        .into_string()
        .map_err(|e| ProbeError::Http(e.to_string()))?;
    let json: serde_json::Value =
        serde_json::from_str(&body).map_err(|e| ProbeError::Parse(e.to_string()))?;

    let events = json
        .get("events")
        .and_then(|e| e.as_array())
        .ok_or_else(|| ProbeError::Parse("no events in RDAP response".to_string()))?;

    for event in events {
        if event.get("eventAction").and_then(|a| a.as_str()) == Some("registration") {
            let date = event
                .get("eventDate")
                .and_then(|d| d.as_str())
                .ok_or_else(|| ProbeError::Parse("registration event without date".to_string()))?;
            let registered = chrono::DateTime::parse_from_rfc3339(date)
                .map_err(|e| ProbeError::Parse(e.to_string()))?;
            return Ok((Utc::now().timestamp() - registered.timestamp()) / 86_400);
        }
    }

    Err(ProbeError::Parse(
        "no registration event in RDAP response".to_string(),
    ))
}

// ============================================================================
// TESTS
// ============================================================================
