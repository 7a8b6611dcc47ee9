//! Cache key classification.
//!
//! Key names decide placement. Material that is private to the node while a
//! protocol exchange is in flight (client private keys, one-time challenge
//! tokens, the account key) must never reach the shared backing store;
//! issued certificates are safe to distribute.

/// Primary name under which the ACME account private key is cached.
pub const ACCOUNT_KEY: &str = "acme_account+key";

/// Legacy name for the ACME account private key, still recognized on read.
pub const ACCOUNT_KEY_LEGACY: &str = "acme_account.key";

const TOKEN_SUFFIX: &str = "+token";
const PRIVATE_KEY_SUFFIX: &str = "+rsa";
const CHALLENGE_MARKER: &str = "http-01";

/// Placement class derived from a cache key name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyClass {
    /// Must remain confined to the node that created it.
    Local,
    /// May be distributed through the backing store.
    Shareable,
}

/// Returns true iff `name` is one of the recognized account-key names.
pub fn is_account_key(name: &str) -> bool {
    name == ACCOUNT_KEY || name == ACCOUNT_KEY_LEGACY
}

/// Returns true for names of node-local material: one-time challenge
/// tokens, in-flight private keys, HTTP challenge artifacts and the
/// account key.
pub fn is_local_only(name: &str) -> bool {
    name.ends_with(TOKEN_SUFFIX)
        || name.ends_with(PRIVATE_KEY_SUFFIX)
        || name.contains(CHALLENGE_MARKER)
        || is_account_key(name)
}

/// Classify a cache key name.
pub fn classify(name: &str) -> KeyClass {
    if is_local_only(name) {
        KeyClass::Local
    } else {
        KeyClass::Shareable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_key_literals() {
        assert!(is_account_key("acme_account+key"));
        assert!(is_account_key("acme_account.key"));
        assert!(!is_account_key("acme_account"));
        assert!(!is_account_key("acme_account+key2"));
        assert!(!is_account_key(""));
    }

    #[test]
    fn test_local_only_names() {
        assert!(is_local_only("example.com+token"));
        assert!(is_local_only("example.com+rsa"));
        assert!(is_local_only("acme/http-01/example.com"));
        assert!(is_local_only("http-01"));
        assert!(is_local_only("acme_account+key"));
        assert!(is_local_only("acme_account.key"));
    }

    #[test]
    fn test_shareable_names() {
        assert!(!is_local_only("example.com"));
        assert!(!is_local_only("cert-example.com"));
        assert!(!is_local_only("example.com+token2"));
        assert!(!is_local_only("token"));
        assert!(!is_local_only("rsa"));
        assert!(!is_local_only(""));
    }

    #[test]
    fn test_classify_matches_predicate() {
        assert_eq!(classify("example.com+rsa"), KeyClass::Local);
        assert_eq!(classify("acme_account.key"), KeyClass::Local);
        assert_eq!(classify("example.com"), KeyClass::Shareable);
    }
}
