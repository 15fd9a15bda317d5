// ── Credential codec ──
//
// Turns untyped JSON objects into typed credentials and back. Decoding is
// all-or-nothing: the first invalid element aborts the whole batch.

use std::sync::LazyLock;

use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::CoreError;
use crate::model::credential::{PASSWORD_TYPE, PSK_TYPE, X509_TYPE};
use crate::model::{
    Credential, GenericCredential, PasswordCredential, PskCredential, X509CertificateCredential,
};

pub const FIELD_TYPE: &str = "type";
pub const FIELD_AUTH_ID: &str = "auth-id";

/// Pattern a credential `type` must match.
pub const TYPE_PATTERN: &str = "^[a-z0-9-]+$";
/// Pattern a credential `auth-id` must match.
pub const AUTH_ID_PATTERN: &str = r"^[a-zA-Z0-9-_=\.]+$";

static TYPE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(TYPE_PATTERN).expect("type pattern is a valid regex"));
static AUTH_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(AUTH_ID_PATTERN).expect("auth-id pattern is a valid regex"));

type Decoder = fn(&str, &Map<String, Value>) -> Result<Credential, CoreError>;

/// Typed decoders by discriminant. Types not listed decode as generic.
const DECODERS: &[(&str, Decoder)] = &[
    (PASSWORD_TYPE, decode_password),
    (PSK_TYPE, decode_psk),
    (X509_TYPE, decode_x509),
];

// ── Decoding ────────────────────────────────────────────────────────

/// Decode a sequence of raw values. Elements that are not JSON objects are
/// skipped.
pub fn decode_all(values: &[Value]) -> Result<Vec<Credential>, CoreError> {
    values
        .iter()
        .filter_map(|value| match value {
            Value::Object(object) => Some(object),
            other => {
                debug!(kind = value_kind(other), "skipping non-object credential element");
                None
            }
        })
        .map(decode)
        .collect()
}

/// Decode a whole request payload, which must be a JSON array.
pub fn decode_array(payload: &Value) -> Result<Vec<Credential>, CoreError> {
    match payload {
        Value::Array(values) => decode_all(values),
        other => Err(CoreError::MalformedPayload {
            message: format!("expected a JSON array, got {}", value_kind(other)),
        }),
    }
}

/// Parse raw bytes as JSON and decode them as a credential array.
pub fn decode_body(body: &[u8]) -> Result<Vec<Credential>, CoreError> {
    if body.is_empty() {
        return Err(CoreError::MalformedPayload {
            message: "request body is empty".into(),
        });
    }
    let payload: Value = serde_json::from_slice(body)?;
    decode_array(&payload)
}

/// Decode a single credential object.
pub fn decode(object: &Map<String, Value>) -> Result<Credential, CoreError> {
    let type_name = required_matching(object, FIELD_TYPE, &TYPE_REGEX, TYPE_PATTERN)?;
    required_matching(object, FIELD_AUTH_ID, &AUTH_ID_REGEX, AUTH_ID_PATTERN)?;

    let decoder: Decoder = match DECODERS.iter().find(|(discriminant, _)| *discriminant == type_name) {
        Some((_, decoder)) => *decoder,
        None => decode_generic,
    };

    let credential = decoder(type_name, object)?;
    credential.validate()?;
    Ok(credential)
}

fn required_matching<'a>(
    object: &'a Map<String, Value>,
    field: &'static str,
    regex: &Regex,
    pattern: &'static str,
) -> Result<&'a str, CoreError> {
    let value = match object.get(field) {
        Some(Value::String(s)) if !s.is_empty() => s.as_str(),
        Some(Value::String(_) | Value::Null) | None => {
            return Err(CoreError::MissingField { field });
        }
        Some(other) => {
            return Err(CoreError::PatternMismatch {
                field,
                value: other.to_string(),
                pattern,
            });
        }
    };
    if !regex.is_match(value) {
        return Err(CoreError::PatternMismatch {
            field,
            value: value.to_owned(),
            pattern,
        });
    }
    Ok(value)
}

fn decode_variant<T: DeserializeOwned>(
    type_name: &str,
    object: &Map<String, Value>,
) -> Result<T, CoreError> {
    serde_json::from_value(Value::Object(object.clone())).map_err(|e| {
        CoreError::InvalidCredential {
            credential_type: type_name.to_owned(),
            message: e.to_string(),
        }
    })
}

fn decode_password(type_name: &str, object: &Map<String, Value>) -> Result<Credential, CoreError> {
    decode_variant::<PasswordCredential>(type_name, object).map(Credential::Password)
}

fn decode_psk(type_name: &str, object: &Map<String, Value>) -> Result<Credential, CoreError> {
    decode_variant::<PskCredential>(type_name, object).map(Credential::Psk)
}

fn decode_x509(type_name: &str, object: &Map<String, Value>) -> Result<Credential, CoreError> {
    decode_variant::<X509CertificateCredential>(type_name, object).map(Credential::X509Certificate)
}

fn decode_generic(type_name: &str, object: &Map<String, Value>) -> Result<Credential, CoreError> {
    let mut fields = object.clone();
    fields.remove(FIELD_TYPE);
    let mut credential = decode_variant::<GenericCredential>(type_name, &fields)?;
    credential.set_type_name(type_name);
    Ok(Credential::Generic(credential))
}

// ── Encoding ────────────────────────────────────────────────────────

/// Encode one credential to its raw JSON object.
pub fn encode(credential: &Credential) -> Result<Value, CoreError> {
    serde_json::to_value(credential).map_err(|e| CoreError::Encoding {
        message: e.to_string(),
    })
}

/// Encode credentials in order.
pub fn encode_all(credentials: &[Credential]) -> Result<Vec<Value>, CoreError> {
    credentials.iter().map(encode).collect()
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
