// ── Credential domain types ──
//
// A credential binds an authentication identifier to a list of secrets of
// one kind. The `type` discriminant selects the variant; unknown types are
// kept as `Generic` with their secrets and extra fields left opaque.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use super::secret::{PasswordSecret, PskSecret, X509CertificateSecret};
use crate::codec;
use crate::error::CoreError;

/// Discriminant of hashed-password credentials.
pub const PASSWORD_TYPE: &str = "hashed-password";
/// Discriminant of pre-shared-key credentials.
pub const PSK_TYPE: &str = "psk";
/// Discriminant of X.509 client certificate credentials.
pub const X509_TYPE: &str = "x509-cert";

// ── Common fields ───────────────────────────────────────────────────

/// Fields every credential carries regardless of its type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CredentialCommon {
    #[serde(rename = "auth-id")]
    pub auth_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub ext: Map<String, Value>,
}

impl CredentialCommon {
    pub fn new(auth_id: impl Into<String>) -> Self {
        Self {
            auth_id: auth_id.into(),
            ..Self::default()
        }
    }
}

// ── Typed variants ──────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PasswordCredential {
    #[serde(flatten)]
    pub common: CredentialCommon,
    #[serde(default)]
    pub secrets: Vec<PasswordSecret>,
}

impl PasswordCredential {
    pub fn new(auth_id: impl Into<String>, secrets: Vec<PasswordSecret>) -> Self {
        Self {
            common: CredentialCommon::new(auth_id),
            secrets,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PskCredential {
    #[serde(flatten)]
    pub common: CredentialCommon,
    #[serde(default)]
    pub secrets: Vec<PskSecret>,
}

impl PskCredential {
    pub fn new(auth_id: impl Into<String>, secrets: Vec<PskSecret>) -> Self {
        Self {
            common: CredentialCommon::new(auth_id),
            secrets,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct X509CertificateCredential {
    #[serde(flatten)]
    pub common: CredentialCommon,
    #[serde(default)]
    pub secrets: Vec<X509CertificateSecret>,
}

impl X509CertificateCredential {
    pub fn new(subject_dn: impl Into<String>, secrets: Vec<X509CertificateSecret>) -> Self {
        Self {
            common: CredentialCommon::new(subject_dn),
            secrets,
        }
    }
}

/// A credential of a type this registry has no dedicated shape for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenericCredential {
    #[serde(skip)]
    type_name: String,
    #[serde(flatten)]
    pub common: CredentialCommon,
    #[serde(default)]
    pub secrets: Vec<Map<String, Value>>,
    /// Top-level fields beyond the common ones, carried through unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GenericCredential {
    pub fn new(
        type_name: impl Into<String>,
        auth_id: impl Into<String>,
        secrets: Vec<Map<String, Value>>,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            common: CredentialCommon::new(auth_id),
            secrets,
            extra: Map::new(),
        }
    }

    /// The `type` string exactly as it was received.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub(crate) fn set_type_name(&mut self, type_name: impl Into<String>) {
        self.type_name = type_name.into();
    }
}

// ── Credential ──────────────────────────────────────────────────────

/// A decoded credential, one variant per supported type.
#[derive(Debug, Clone, PartialEq)]
pub enum Credential {
    Password(PasswordCredential),
    Psk(PskCredential),
    X509Certificate(X509CertificateCredential),
    Generic(GenericCredential),
}

impl Credential {
    /// The `type` discriminant written on encode.
    pub fn type_name(&self) -> &str {
        match self {
            Self::Password(_) => PASSWORD_TYPE,
            Self::Psk(_) => PSK_TYPE,
            Self::X509Certificate(_) => X509_TYPE,
            Self::Generic(c) => c.type_name(),
        }
    }

    pub fn common(&self) -> &CredentialCommon {
        match self {
            Self::Password(c) => &c.common,
            Self::Psk(c) => &c.common,
            Self::X509Certificate(c) => &c.common,
            Self::Generic(c) => &c.common,
        }
    }

    pub fn auth_id(&self) -> &str {
        &self.common().auth_id
    }

    /// Effective flag: an unset flag means enabled.
    pub fn is_enabled(&self) -> bool {
        self.common().enabled.unwrap_or(true)
    }

    pub fn secret_count(&self) -> usize {
        match self {
            Self::Password(c) => c.secrets.len(),
            Self::Psk(c) => c.secrets.len(),
            Self::X509Certificate(c) => c.secrets.len(),
            Self::Generic(c) => c.secrets.len(),
        }
    }

    /// Check the variant's secrets. Generic secrets are not inspected.
    pub fn validate(&self) -> Result<(), CoreError> {
        let result = match self {
            Self::Password(c) => validate_each(&c.secrets, PasswordSecret::validate),
            Self::Psk(c) => validate_each(&c.secrets, PskSecret::validate),
            Self::X509Certificate(c) => validate_each(&c.secrets, X509CertificateSecret::validate),
            Self::Generic(_) => Ok(()),
        };
        result.map_err(|message| CoreError::InvalidCredential {
            credential_type: self.type_name().to_owned(),
            message,
        })
    }
}

fn validate_each<T>(secrets: &[T], check: fn(&T) -> Result<(), String>) -> Result<(), String> {
    secrets
        .iter()
        .enumerate()
        .try_for_each(|(idx, secret)| check(secret).map_err(|e| format!("secret #{idx}: {e}")))
}

impl From<PasswordCredential> for Credential {
    fn from(c: PasswordCredential) -> Self {
        Self::Password(c)
    }
}

impl From<PskCredential> for Credential {
    fn from(c: PskCredential) -> Self {
        Self::Psk(c)
    }
}

impl From<X509CertificateCredential> for Credential {
    fn from(c: X509CertificateCredential) -> Self {
        Self::X509Certificate(c)
    }
}

impl From<GenericCredential> for Credential {
    fn from(c: GenericCredential) -> Self {
        Self::Generic(c)
    }
}

// ── Serde ───────────────────────────────────────────────────────────

#[derive(Serialize)]
struct Tagged<'a, T> {
    #[serde(rename = "type")]
    type_name: &'a str,
    #[serde(flatten)]
    inner: &'a T,
}

impl Serialize for Credential {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let type_name = self.type_name();
        match self {
            Self::Password(inner) => Tagged { type_name, inner }.serialize(serializer),
            Self::Psk(inner) => Tagged { type_name, inner }.serialize(serializer),
            Self::X509Certificate(inner) => Tagged { type_name, inner }.serialize(serializer),
            Self::Generic(inner) => Tagged { type_name, inner }.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Credential {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let object = Map::<String, Value>::deserialize(deserializer)?;
        codec::decode(&object).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::model::secret::HashFunction;

    #[test]
    fn password_credential_encodes_type_and_fields() {
        let mut credential =
            PasswordCredential::new("device1", vec![PasswordSecret::plain("secret")]);
        credential.common.enabled = Some(false);
        let json = serde_json::to_value(Credential::from(credential)).unwrap();
        assert_eq!(
            json,
            json!({
                "type": "hashed-password",
                "auth-id": "device1",
                "enabled": false,
                "secrets": [{ "pwd-plain": "secret" }]
            })
        );
    }

    #[test]
    fn generic_credential_keeps_its_type() {
        let mut secret = Map::new();
        secret.insert("token".into(), json!("abc"));
        let credential = Credential::from(GenericCredential::new("custom-token", "d1", vec![secret]));
        assert_eq!(credential.type_name(), "custom-token");

        let json = serde_json::to_value(&credential).unwrap();
        assert_eq!(json["type"], json!("custom-token"));
        assert_eq!(json["secrets"][0]["token"], json!("abc"));
    }

    #[test]
    fn deserialize_goes_through_codec() {
        let credential: Credential = serde_json::from_value(json!({
            "type": "psk",
            "auth-id": "sensor-1",
            "secrets": [{ "key": "c2VjcmV0" }]
        }))
        .unwrap();
        assert!(matches!(credential, Credential::Psk(_)));
        assert_eq!(credential.auth_id(), "sensor-1");
        assert!(credential.is_enabled());

        let err = serde_json::from_value::<Credential>(json!({ "auth-id": "x" })).unwrap_err();
        assert!(err.to_string().contains("'type' field must be set"));
    }

    #[test]
    fn validate_reports_offending_secret() {
        let credential = Credential::from(PasswordCredential::new(
            "device1",
            vec![
                PasswordSecret::plain("ok"),
                PasswordSecret {
                    pwd_plain: Some("secret".into()),
                    ..PasswordSecret::hashed(HashFunction::Sha512, "aGFzaA==")
                },
            ],
        ));
        let err = credential.validate().unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().starts_with("Invalid 'hashed-password' credential: secret #1"));
    }
}
