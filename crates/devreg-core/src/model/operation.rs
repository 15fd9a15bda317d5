// ── Management operation outcomes ──

use std::fmt;

use http::StatusCode;
use serde::{Deserialize, Serialize};

/// Opaque version token of a stored resource, surfaced as an `ETag`.
///
/// The endpoint never interprets the token; it threads the client's
/// `If-Match` value to the service and echoes whatever the service returns.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceVersion(String);

impl ResourceVersion {
    pub fn new(version: impl Into<String>) -> Self {
        Self(version.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ResourceVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ResourceVersion {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ResourceVersion {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// What a management service reports back for one operation.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationResult<T> {
    pub status: u16,
    pub payload: Option<T>,
    pub resource_version: Option<ResourceVersion>,
}

impl<T> OperationResult<T> {
    pub fn new(status: u16, payload: Option<T>, resource_version: Option<ResourceVersion>) -> Self {
        Self {
            status,
            payload,
            resource_version,
        }
    }

    /// A `200 OK` outcome carrying a payload.
    pub fn ok(payload: T, resource_version: Option<ResourceVersion>) -> Self {
        Self::new(StatusCode::OK.as_u16(), Some(payload), resource_version)
    }

    /// An outcome with only a status.
    pub fn empty(status: u16) -> Self {
        Self::new(status, None, None)
    }

    #[must_use]
    pub fn with_resource_version(mut self, version: impl Into<ResourceVersion>) -> Self {
        self.resource_version = Some(version.into());
        self
    }

    pub fn is_success(&self) -> bool {
        StatusCode::from_u16(self.status).is_ok_and(|status| status.is_success())
    }

    pub fn into_payload(self) -> Option<T> {
        self.payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_carries_payload_and_version() {
        let result = OperationResult::ok(vec![1, 2], Some("v3".into()));
        assert_eq!(result.status, 200);
        assert!(result.is_success());
        assert_eq!(result.resource_version.as_ref().map(ResourceVersion::as_str), Some("v3"));
        assert_eq!(result.into_payload(), Some(vec![1, 2]));
    }

    #[test]
    fn empty_outcomes() {
        let result: OperationResult<()> = OperationResult::empty(204).with_resource_version("7");
        assert!(result.is_success());
        assert_eq!(result.resource_version.unwrap().to_string(), "7");

        let missing: OperationResult<()> = OperationResult::empty(404);
        assert!(!missing.is_success());
        assert!(missing.payload.is_none());
    }
}
