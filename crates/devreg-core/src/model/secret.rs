// ── Credential secrets ──
//
// Secret shapes for each typed credential variant. Serde handles the
// structural mapping; `validate` covers the cross-field rules serde cannot
// express. Validation failures are plain messages that the owning
// credential wraps into a `CoreError::InvalidCredential`.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Common fields ───────────────────────────────────────────────────

/// Fields shared by every secret kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretCommon {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    #[serde(rename = "not-before", default, skip_serializing_if = "Option::is_none")]
    pub not_before: Option<DateTime<Utc>>,

    #[serde(rename = "not-after", default, skip_serializing_if = "Option::is_none")]
    pub not_after: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl SecretCommon {
    /// Effective flag: an unset flag means enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }

    /// Whether `at` falls inside the validity window. Open bounds match.
    pub fn is_valid_at(&self, at: DateTime<Utc>) -> bool {
        self.not_before.is_none_or(|nb| nb <= at) && self.not_after.is_none_or(|na| at <= na)
    }

    pub fn validate(&self) -> Result<(), String> {
        if let (Some(not_before), Some(not_after)) = (self.not_before, self.not_after) {
            if not_before >= not_after {
                return Err(format!(
                    "'not-before' ({not_before}) must be before 'not-after' ({not_after})"
                ));
            }
        }
        Ok(())
    }
}

// ── Hashed password ─────────────────────────────────────────────────

/// Hash functions a stored password hash may have been produced with.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
pub enum HashFunction {
    #[serde(rename = "sha-256")]
    #[strum(serialize = "sha-256")]
    Sha256,
    #[serde(rename = "sha-512")]
    #[strum(serialize = "sha-512")]
    Sha512,
    #[serde(rename = "bcrypt")]
    #[strum(serialize = "bcrypt")]
    Bcrypt,
}

/// Secret of a `hashed-password` credential.
///
/// A client either supplies a plain password for the registry to hash, or
/// a precomputed hash along with the function that produced it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordSecret {
    #[serde(flatten)]
    pub common: SecretCommon,

    #[serde(rename = "hash-function", default, skip_serializing_if = "Option::is_none")]
    pub hash_function: Option<HashFunction>,

    #[serde(rename = "pwd-hash", default, skip_serializing_if = "Option::is_none")]
    pub pwd_hash: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salt: Option<String>,

    #[serde(rename = "pwd-plain", default, skip_serializing_if = "Option::is_none")]
    pub pwd_plain: Option<String>,
}

impl PasswordSecret {
    /// A secret carrying a clear text password.
    pub fn plain(password: impl Into<String>) -> Self {
        Self {
            pwd_plain: Some(password.into()),
            ..Self::default()
        }
    }

    /// A secret carrying a precomputed hash.
    pub fn hashed(function: HashFunction, hash: impl Into<String>) -> Self {
        Self {
            hash_function: Some(function),
            pwd_hash: Some(hash.into()),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        self.common.validate()?;
        match (&self.pwd_hash, &self.pwd_plain) {
            (Some(_), Some(_)) => {
                return Err("'pwd-hash' and 'pwd-plain' must not be set at the same time".into());
            }
            (Some(_), None) if self.hash_function.is_none() => {
                return Err("'hash-function' must be set when 'pwd-hash' is set".into());
            }
            (None, _) if self.salt.is_some() => {
                return Err("'salt' requires 'pwd-hash' to be set".into());
            }
            (None, Some(plain)) if plain.is_empty() => {
                return Err("'pwd-plain' must not be empty".into());
            }
            _ => {}
        }
        Ok(())
    }
}

// ── Pre-shared key ──────────────────────────────────────────────────

/// Secret of a `psk` credential.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PskSecret {
    #[serde(flatten)]
    pub common: SecretCommon,

    /// Standard base64 encoding of the shared key.
    #[serde(default)]
    pub key: String,
}

impl PskSecret {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            common: SecretCommon::default(),
            key: key.into(),
        }
    }

    /// Decoded key bytes.
    pub fn key_bytes(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(&self.key)
    }

    pub fn validate(&self) -> Result<(), String> {
        self.common.validate()?;
        if self.key.is_empty() {
            return Err("'key' field must be set".into());
        }
        self.key_bytes()
            .map_err(|e| format!("'key' is not valid base64: {e}"))?;
        Ok(())
    }
}

// ── X.509 certificate ───────────────────────────────────────────────

/// Secret of an `x509-cert` credential. The certificate itself is
/// identified by the credential's auth-id (the subject DN).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct X509CertificateSecret {
    #[serde(flatten)]
    pub common: SecretCommon,
}

impl X509CertificateSecret {
    pub fn validate(&self) -> Result<(), String> {
        self.common.validate()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    #[test]
    fn hash_function_names() {
        assert_eq!(HashFunction::Sha256.to_string(), "sha-256");
        assert_eq!("bcrypt".parse::<HashFunction>().unwrap(), HashFunction::Bcrypt);
        assert_eq!(
            serde_json::to_value(HashFunction::Sha512).unwrap(),
            json!("sha-512")
        );
        assert!(serde_json::from_value::<HashFunction>(json!("md5")).is_err());
    }

    #[test]
    fn password_hash_and_plain_are_exclusive() {
        let secret = PasswordSecret {
            pwd_plain: Some("secret".into()),
            ..PasswordSecret::hashed(HashFunction::Sha256, "aGFzaA==")
        };
        assert!(secret.validate().unwrap_err().contains("must not be set at the same time"));
    }

    #[test]
    fn password_hash_requires_function() {
        let secret = PasswordSecret {
            pwd_hash: Some("aGFzaA==".into()),
            ..PasswordSecret::default()
        };
        assert!(secret.validate().unwrap_err().contains("'hash-function'"));
    }

    #[test]
    fn password_salt_requires_hash() {
        let secret = PasswordSecret {
            salt: Some("c2FsdA==".into()),
            ..PasswordSecret::plain("secret")
        };
        assert!(secret.validate().unwrap_err().contains("'salt'"));
    }

    #[test]
    fn valid_password_secrets() {
        assert!(PasswordSecret::plain("secret").validate().is_ok());
        let hashed = PasswordSecret {
            salt: Some("c2FsdA==".into()),
            ..PasswordSecret::hashed(HashFunction::Bcrypt, "$2a$10$abc")
        };
        assert!(hashed.validate().is_ok());
    }

    #[test]
    fn psk_key_must_be_base64() {
        assert!(PskSecret::new("c2VjcmV0").validate().is_ok());
        assert_eq!(
            PskSecret::default().validate().unwrap_err(),
            "'key' field must be set"
        );
        assert!(PskSecret::new("not base64!").validate().is_err());
    }

    #[test]
    fn validity_window_must_be_ordered() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();

        let mut common = SecretCommon {
            not_before: Some(start),
            not_after: Some(end),
            ..SecretCommon::default()
        };
        assert!(common.validate().is_ok());
        assert!(common.is_valid_at(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()));
        assert!(!common.is_valid_at(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()));

        common.not_after = Some(start);
        assert!(common.validate().is_err());
    }

    #[test]
    fn secret_fields_use_wire_names() {
        let secret: PasswordSecret = serde_json::from_value(json!({
            "id": "s1",
            "not-before": "2024-01-01T00:00:00Z",
            "hash-function": "sha-256",
            "pwd-hash": "aGFzaA==",
        }))
        .unwrap();
        assert_eq!(secret.common.id.as_deref(), Some("s1"));
        assert_eq!(secret.hash_function, Some(HashFunction::Sha256));
        assert!(secret.common.not_before.is_some());

        let encoded = serde_json::to_value(&secret).unwrap();
        assert_eq!(encoded["pwd-hash"], json!("aGFzaA=="));
        assert!(encoded.get("pwd-plain").is_none());
    }
}
