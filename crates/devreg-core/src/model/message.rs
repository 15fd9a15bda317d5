// ── Downstream message metadata ──
//
// Only the parts of a message the registry core inspects: the creation
// time, the application properties and the transport annotations.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

/// Application property carrying the time-until-disconnect in seconds.
pub const PROPERTY_TTD: &str = "ttd";
/// Application property carrying the originating device id.
pub const PROPERTY_DEVICE_ID: &str = "device_id";
/// Annotation carrying the tenant the device belongs to.
pub const ANNOTATION_TENANT_ID: &str = "tenant_id";
/// `ttd` value meaning the device stays connected until further notice.
pub const TTD_VALUE_UNLIMITED: i64 = -1;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Message {
    pub creation_time: Option<DateTime<Utc>>,
    pub application_properties: Map<String, Value>,
    pub annotations: Map<String, Value>,
}

impl Message {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_creation_time(mut self, at: DateTime<Utc>) -> Self {
        self.creation_time = Some(at);
        self
    }

    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.application_properties.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_annotation(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.annotations.insert(key.into(), value.into());
        self
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.application_properties.get(key)
    }

    pub fn annotation(&self, key: &str) -> Option<&Value> {
        self.annotations.get(key)
    }

    pub fn ttd(&self) -> Option<i64> {
        self.property(PROPERTY_TTD).and_then(Value::as_i64)
    }

    pub fn device_id(&self) -> Option<&str> {
        self.property(PROPERTY_DEVICE_ID).and_then(Value::as_str)
    }

    pub fn tenant_id(&self) -> Option<&str> {
        self.annotation(ANNOTATION_TENANT_ID).and_then(Value::as_str)
    }
}
