//! Seed Corpus
//!
//! Curated starter examples so a fresh install can train a usable model
//! before any operator corpus or feedback exists. Deliberately balanced;
//! the retrainer overlays the operator corpus and feedback on top.

use super::record::TrainingExample;
use crate::classifier::Label;

pub const SEED_LEGITIMATE: &[&str] = &[
    "https://www.google.com",
    "https://www.wikipedia.org",
    "https://github.com/rust-lang/rust",
    "https://www.who.int",
    "https://www.nasa.gov",
    "https://europa.eu/index_en",
    "https://www.india.gov.in",
    "https://www.mit.edu",
    "https://www.stanford.edu/academics",
    "https://docs.python.org/3/library",
    "https://www.rust-lang.org/learn",
    "https://crates.io/crates/serde",
    "https://www.bbc.co.uk/news",
    "https://www.nytimes.com",
    "https://en.wikipedia.org/wiki/Rust",
    "https://www.irs.gov/refunds",
    "https://www.gov.uk/browse/tax",
    "https://www.cdc.gov/flu",
    "https://scholar.google.com",
    "https://www.reddit.com/r/programming",
    "https://stackoverflow.com/questions",
    "https://www.mozilla.org/en-US/firefox",
    "https://developer.mozilla.org/en-US/docs/Web",
    "https://www.kernel.org",
];

pub const SEED_PHISHING: &[&str] = &[
    "http://paypal-account-verify.tk/signin",
    "http://secure-login-update.ml/account",
    "https://appleid-confirm-support.xyz/verify?user=1",
    "http://banking-alert-secure.cf/confirm",
    "http://free-gift-paypal.com.redirect.ga/webscr",
    "http://update-password-required.gq/login.php?id=22",
    "http://ebay-item-dispute.xyz/signin/submit",
    "http://dropbox-share-login.tk/verify",
    "http://admin-reset-password.ml/confirm?token=abc123",
    "http://203.0.113.77/paypal/webscr/login",
    "http://198.51.100.23/secure/banking/login.php",
    "http://bit.ly.secure-check.cf/account/update",
    "http://login.bank0famerica-verify.xyz/session",
    "http://wp-admin-security-update.ga/validate",
    "http://confirm-your-account-now.tk/banking",
    "http://secure123-paypal.xyz/signin?redirect=1",
    "http://netflix-billing-update.cf/confirm",
    "http://amaz0n-order-issue.gq/verify/submit",
    "http://icloud-find-device.ml/login",
    "http://hsbc-online-secure.tk/validate?step=2",
    "http://account-services-verify.xyz/reset",
    "http://tinyurl.com/x9secure",
    "http://whatsapp-invite-group.ga/signin",
    "http://online-banking-update.cf/login",
];

/// Seed examples as a training list
pub fn seed_examples() -> Vec<TrainingExample> {
    let legitimate = SEED_LEGITIMATE
        .iter()
        .map(|url| TrainingExample::new(*url, Label::Legitimate));
    let phishing = SEED_PHISHING
        .iter()
        .map(|url| TrainingExample::new(*url, Label::Phishing));
    legitimate.chain(phishing).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_is_balanced() {
        assert_eq!(SEED_LEGITIMATE.len(), SEED_PHISHING.len());
        assert_eq!(
            seed_examples().len(),
            SEED_LEGITIMATE.len() + SEED_PHISHING.len()
        );
    }

    #[test]
    fn test_seed_urls_are_unique() {
        let mut urls: Vec<&str> = SEED_LEGITIMATE
            .iter()
            .chain(SEED_PHISHING.iter())
            .copied()
            .collect();
        let before = urls.len();
        urls.sort();
        urls.dedup();
        assert_eq!(urls.len(), before);
    }

    #[test]
    fn test_seed_urls_extract_cleanly() {
        use crate::features::{extract, NetworkOptions};
        for example in seed_examples() {
            let v = extract(&example.url, &NetworkOptions::disabled()).unwrap();
            // Seed URLs must all parse into real signals
            assert!(v.get_by_name("host_length").unwrap() > 0.0, "{}", example.url);
        }
    }
}
