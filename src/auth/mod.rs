//! Login check for the demo UI flow.
//!
//! Workflow code depends on [`Authenticator`] only, so the static pair from
//! config can be swapped for a real identity store.

use crate::config::AuthConfig;

/// Checks a login id / secret pair.
pub trait Authenticator: Send + Sync {
    fn verify(&self, id: &str, secret: &str) -> bool;
}

/// A single configured credential pair.
#[derive(Debug, Clone)]
pub struct StaticCredentials {
    login_id: String,
    password: String,
}

impl StaticCredentials {
    pub fn new(login_id: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            login_id: login_id.into(),
            password: password.into(),
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(config.login_id.clone(), config.password.clone())
    }
}

impl Authenticator for StaticCredentials {
    fn verify(&self, id: &str, secret: &str) -> bool {
        // Both fields are always compared
        let id_ok = constant_time_eq(id.as_bytes(), self.login_id.as_bytes());
        let secret_ok = constant_time_eq(secret.as_bytes(), self.password.as_bytes());
        id_ok & secret_ok
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_credentials() {
        let auth = StaticCredentials::from_config(&AuthConfig::default());
        assert!(auth.verify("Admin", "VVIT"));
    }

    #[test]
    fn test_rejects_wrong_pairs() {
        let auth = StaticCredentials::new("Admin", "VVIT");
        assert!(!auth.verify("admin", "VVIT"));
        assert!(!auth.verify("Admin", "vvit"));
        assert!(!auth.verify("", ""));
        assert!(!auth.verify("Admin", "VVIT "));
    }

    #[test]
    fn test_usable_as_trait_object() {
        let auth: Box<dyn Authenticator> = Box::new(StaticCredentials::new("a", "b"));
        assert!(auth.verify("a", "b"));
    }
}
