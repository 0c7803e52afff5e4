//! API key authentication
//!
//! A single opaque header conveys the tenant identity: the key itself is the
//! tenant id. With no keys configured the server runs in development mode and
//! every request maps to a fixed tenant.

use std::collections::HashSet;

use crate::error::Error;

/// Header carrying the API key
pub const API_KEY_HEADER: &str = "x-api-key";

/// Tenant used when no API keys are configured
pub const DEV_MODE_TENANT: &str = "dev_mode";

/// Resolve a request's API key to a tenant id
///
/// `AuthMissing` when the header is absent, `AuthInvalid` when the key is not
/// in the configured set. An empty key set means development mode.
pub fn authenticate(valid_keys: &HashSet<String>, api_key: Option<&str>) -> Result<String, Error> {
    if valid_keys.is_empty() {
        return Ok(DEV_MODE_TENANT.to_string());
    }

    let key = api_key.ok_or(Error::AuthMissing)?;
    if !valid_keys.contains(key) {
        return Err(Error::AuthInvalid);
    }

    // The key is the tenant identity
    Ok(key.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(values: &[&str]) -> HashSet<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_missing_key_rejected() {
        let err = authenticate(&keys(&["k1"]), None).unwrap_err();
        assert!(matches!(err, Error::AuthMissing));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = authenticate(&keys(&["k1"]), Some("nope")).unwrap_err();
        assert!(matches!(err, Error::AuthInvalid));
    }

    #[test]
    fn test_valid_key_is_tenant() {
        let tenant = authenticate(&keys(&["k1", "k2"]), Some("k2")).unwrap();
        assert_eq!(tenant, "k2");
    }

    #[test]
    fn test_empty_keyset_is_dev_mode() {
        let tenant = authenticate(&HashSet::new(), None).unwrap();
        assert_eq!(tenant, DEV_MODE_TENANT);
        let tenant = authenticate(&HashSet::new(), Some("anything")).unwrap();
        assert_eq!(tenant, DEV_MODE_TENANT);
    }
}
