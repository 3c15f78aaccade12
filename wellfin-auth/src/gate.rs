use std::collections::BTreeSet;

use serde::Serialize;

use crate::error::AuthError;

/// Header carrying the shared secret.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Key accepted outside production so local clients work without setup.
pub const DEV_API_KEY: &str = "dev-secret-key";

/// Paths reachable without a key.
pub const DEFAULT_EXEMPT_PATHS: [&str; 4] = ["/", "/health", "/test-ai", "/api/v1/vertex-ai-test"];

/// Who made the request, derived from the key prefix. Used for logging only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiIdentity {
    pub user_id: String,
}

impl ApiIdentity {
    pub fn from_key(key: &str) -> Self {
        let prefix: String = key.chars().take(8).collect();
        Self { user_id: format!("api-user-{prefix}") }
    }
}

/// Allow-list of shared secrets plus the paths that skip the check.
#[derive(Debug, Clone)]
pub struct ApiKeyGate {
    keys: Vec<String>,
    exempt_paths: BTreeSet<String>,
}

impl Default for ApiKeyGate {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiKeyGate {
    /// Empty allow-list with the default exempt paths.
    pub fn new() -> Self {
        Self { keys: Vec::new(), exempt_paths: DEFAULT_EXEMPT_PATHS.iter().map(|p| p.to_string()).collect() }
    }

    /// Adds a key; blank keys are ignored.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        let key = key.trim();
        if !key.is_empty() && !self.keys.iter().any(|k| k == key) {
            self.keys.push(key.to_string());
        }
        self
    }

    pub fn with_keys<I, S>(self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        keys.into_iter().fold(self, |gate, key| gate.with_key(key))
    }

    /// Accepts [`DEV_API_KEY`] unless running in production.
    pub fn with_dev_key(self, production: bool) -> Self {
        if production {
            self
        } else {
            self.with_key(DEV_API_KEY)
        }
    }

    pub fn with_exempt_path(mut self, path: impl Into<String>) -> Self {
        self.exempt_paths.insert(path.into());
        self
    }

    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    pub fn is_exempt(&self, path: &str) -> bool {
        self.exempt_paths.contains(path)
    }

    /// Checks the header value against every configured key.
    pub fn authenticate(&self, provided: Option<&str>) -> Result<ApiIdentity, AuthError> {
        let provided = provided.map(str::trim).filter(|k| !k.is_empty()).ok_or(AuthError::MissingKey)?;

        // No early exit, so timing does not reveal which key matched.
        let matched = self.keys.iter().fold(false, |found, key| constant_time_eq(key, provided) | found);

        if matched { Ok(ApiIdentity::from_key(provided)) } else { Err(AuthError::InvalidKey) }
    }
}

/// Compares every byte of the shorter input; only the lengths leak.
fn constant_time_eq(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let mut diff = u8::from(a.len() != b.len());
    for (x, y) in a.iter().zip(b) {
        diff |= x ^ y;
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_configured_and_dev_keys() {
        let gate = ApiKeyGate::new().with_keys(["prod-key", " ", "prod-key"]).with_dev_key(false);
        assert_eq!(gate.key_count(), 2);
        assert_eq!(gate.authenticate(Some("prod-key")).unwrap().user_id, "api-user-prod-key");
        assert_eq!(gate.authenticate(Some(DEV_API_KEY)).unwrap().user_id, "api-user-dev-secr");
    }

    #[test]
    fn dev_key_rejected_in_production() {
        let gate = ApiKeyGate::new().with_key("k").with_dev_key(true);
        assert_eq!(gate.authenticate(Some(DEV_API_KEY)), Err(AuthError::InvalidKey));
    }

    #[test]
    fn missing_and_blank_keys() {
        let gate = ApiKeyGate::new().with_key("k");
        assert_eq!(gate.authenticate(None), Err(AuthError::MissingKey));
        assert_eq!(gate.authenticate(Some("  ")), Err(AuthError::MissingKey));
        assert_eq!(gate.authenticate(Some("k2")), Err(AuthError::InvalidKey));
    }

    #[test]
    fn prefix_of_a_key_is_not_a_match() {
        assert!(!constant_time_eq("secret", "secre"));
        assert!(!constant_time_eq("secret", "secreT"));
        assert!(constant_time_eq("secret", "secret"));
    }

    #[test]
    fn exempt_paths() {
        let gate = ApiKeyGate::new().with_exempt_path("/metrics");
        assert!(gate.is_exempt("/health"));
        assert!(gate.is_exempt("/api/v1/vertex-ai-test"));
        assert!(gate.is_exempt("/metrics"));
        assert!(!gate.is_exempt("/api/v1/recommendations"));
    }
}
