//! core::secret
//!
//! The server's `SECRET_KEY`.
//!
//! Taken from the environment when set, otherwise generated fresh for the
//! process. The value never appears in `Debug` output or logs.

use std::fmt;

use uuid::Uuid;

/// Environment variable holding the key.
pub const SECRET_KEY_VAR: &str = "SECRET_KEY";

/// A redacting wrapper around the secret key.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey {
    value: String,
    generated: bool,
}

impl SecretKey {
    /// Read `SECRET_KEY`, generating a key when it is unset or empty.
    pub fn from_env() -> Self {
        Self::from_value(std::env::var(SECRET_KEY_VAR).ok())
    }

    /// Use `value` when non-empty, otherwise generate a key.
    pub fn from_value(value: Option<String>) -> Self {
        match value.filter(|v| !v.is_empty()) {
            Some(value) => Self {
                value,
                generated: false,
            },
            None => Self::generate(),
        }
    }

    /// A random 64-character hex key.
    pub fn generate() -> Self {
        let value = format!(
            "{}{}",
            Uuid::new_v4().simple(),
            Uuid::new_v4().simple()
        );
        Self {
            value,
            generated: true,
        }
    }

    pub fn expose(&self) -> &str {
        &self.value
    }

    /// Whether the key was generated rather than configured.
    pub fn is_generated(&self) -> bool {
        self.generated
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretKey")
            .field("value", &"[REDACTED]")
            .field("generated", &self.generated)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_key_is_64_hex_chars() {
        let key = SecretKey::generate();
        assert_eq!(key.expose().len(), 64);
        assert!(key.expose().chars().all(|c| c.is_ascii_hexdigit()));
        assert!(key.is_generated());
        assert_ne!(key, SecretKey::generate());
    }

    #[test]
    fn configured_value_is_kept() {
        let key = SecretKey::from_value(Some("s3cret".to_string()));
        assert_eq!(key.expose(), "s3cret");
        assert!(!key.is_generated());

        assert!(SecretKey::from_value(Some(String::new())).is_generated());
    }

    #[test]
    fn debug_redacts() {
        let key = SecretKey::from_value(Some("s3cret".to_string()));
        let shown = format!("{:?}", key);
        assert!(!shown.contains("s3cret"));
        assert!(shown.contains("REDACTED"));
    }
}
