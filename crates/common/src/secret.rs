//! Secret types for protecting sensitive values from accidental logging.
//!
//! Re-exports types from the [`secrecy`] crate. Use them for every
//! sensitive value the room controller touches: the database URL (it may
//! embed credentials) and the conferencing-provider API key.
//!
//! `SecretString` implements `Debug` with redaction, so any struct that
//! derives `Debug` while holding one gets safe logging behavior for free;
//! reading the value requires an explicit `expose_secret()` call. Secrets
//! are zeroized on drop.
//!
//! # Example
//!
//! ```rust
//! use common::secret::{ExposeSecret, SecretString};
//!
//! #[derive(Debug)]
//! struct ProviderCredentials {
//!     base_url: String,
//!     api_key: SecretString,
//! }
//!
//! let creds = ProviderCredentials {
//!     base_url: "https://provider.example.com".to_string(),
//!     api_key: SecretString::from("k-123456"),
//! };
//!
//! // Debug output redacts the key
//! assert!(!format!("{creds:?}").contains("k-123456"));
//!
//! // Access requires an explicit expose
//! assert_eq!(creds.api_key.expose_secret(), "k-123456");
//! ```

// Re-export the main types from secrecy
pub use secrecy::{ExposeSecret, SecretBox, SecretString};

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn test_debug_is_redacted() {
        let secret = SecretString::from("hunter2");
        let debug_str = format!("{secret:?}");

        assert!(debug_str.contains("REDACTED"));
        assert!(!debug_str.contains("hunter2"));
    }

    #[test]
    fn test_expose_secret_returns_inner_value() {
        let secret = SecretString::from("postgres://user:pw@db/parley");
        assert_eq!(secret.expose_secret(), "postgres://user:pw@db/parley");
    }

    #[test]
    fn test_deserialize() {
        #[allow(dead_code)]
        #[derive(Debug, Deserialize)]
        struct Credentials {
            key_id: String,
            api_key: SecretString,
        }

        let json = r#"{"key_id": "svc-123", "api_key": "my-secret-value"}"#;
        let creds: Credentials = serde_json::from_str(json).expect("deserialize");

        assert_eq!(creds.api_key.expose_secret(), "my-secret-value");

        let debug = format!("{creds:?}");
        assert!(!debug.contains("my-secret-value"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn test_clone_works() {
        let secret = SecretString::from("cloneable");
        let cloned = secret.clone();
        assert_eq!(cloned.expose_secret(), "cloneable");
    }
}
