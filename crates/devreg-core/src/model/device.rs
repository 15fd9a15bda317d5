// ── Device domain type ──

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CoreError;

const FIELD_VIA: &str = "via";
const FIELD_VIA_GROUPS: &str = "viaGroups";
const FIELD_MEMBER_OF: &str = "memberOf";

/// A registered device's relationship and behavior metadata.
///
/// `memberOf` is mutually exclusive with both `via` and `viaGroups`. The
/// relationship setters enforce this when they are called, and decoding
/// goes through the same setters, so a `Device` value never holds both
/// sides at once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DeviceDocument")]
pub struct Device {
    #[serde(skip_serializing_if = "Option::is_none")]
    enabled: Option<bool>,

    #[serde(rename = "ext", skip_serializing_if = "Map::is_empty")]
    extensions: Map<String, Value>,

    #[serde(skip_serializing_if = "Map::is_empty")]
    defaults: Map<String, Value>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    via: Vec<String>,

    #[serde(rename = "viaGroups", skip_serializing_if = "Vec::is_empty")]
    via_groups: Vec<String>,

    #[serde(rename = "memberOf", skip_serializing_if = "BTreeSet::is_empty")]
    member_of: BTreeSet<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    mapper: Option<String>,

    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    authorities: BTreeSet<String>,
}

impl Device {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Enabled flag ─────────────────────────────────────────────────

    /// The explicitly set flag, if any.
    pub fn enabled(&self) -> Option<bool> {
        self.enabled
    }

    /// Effective flag: an unset flag means enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }

    pub fn set_enabled(&mut self, enabled: bool) -> &mut Self {
        self.enabled = Some(enabled);
        self
    }

    /// Return the flag to its unset state.
    pub fn clear_enabled(&mut self) -> &mut Self {
        self.enabled = None;
        self
    }

    // ── Relationships ────────────────────────────────────────────────

    pub fn via(&self) -> &[String] {
        &self.via
    }

    pub fn via_groups(&self) -> &[String] {
        &self.via_groups
    }

    pub fn member_of(&self) -> &BTreeSet<String> {
        &self.member_of
    }

    /// Replace the gateways this device communicates through.
    ///
    /// Fails if the list is non-empty while `memberOf` is set.
    pub fn set_via<I, S>(&mut self, via: I) -> Result<&mut Self, CoreError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let via: Vec<String> = via.into_iter().map(Into::into).collect();
        if !via.is_empty() && !self.member_of.is_empty() {
            return Err(CoreError::MutuallyExclusive {
                existing: FIELD_MEMBER_OF,
                requested: FIELD_VIA,
            });
        }
        self.via = via;
        Ok(self)
    }

    /// Replace the gateway groups this device communicates through.
    ///
    /// Fails if the list is non-empty while `memberOf` is set.
    pub fn set_via_groups<I, S>(&mut self, via_groups: I) -> Result<&mut Self, CoreError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let via_groups: Vec<String> = via_groups.into_iter().map(Into::into).collect();
        if !via_groups.is_empty() && !self.member_of.is_empty() {
            return Err(CoreError::MutuallyExclusive {
                existing: FIELD_MEMBER_OF,
                requested: FIELD_VIA_GROUPS,
            });
        }
        self.via_groups = via_groups;
        Ok(self)
    }

    /// Replace the groups this device belongs to.
    ///
    /// Fails if the set is non-empty while `via` or `viaGroups` is set.
    pub fn set_member_of<I, S>(&mut self, member_of: I) -> Result<&mut Self, CoreError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let member_of: BTreeSet<String> = member_of.into_iter().map(Into::into).collect();
        if !member_of.is_empty() {
            if !self.via.is_empty() {
                return Err(CoreError::MutuallyExclusive {
                    existing: FIELD_VIA,
                    requested: FIELD_MEMBER_OF,
                });
            }
            if !self.via_groups.is_empty() {
                return Err(CoreError::MutuallyExclusive {
                    existing: FIELD_VIA_GROUPS,
                    requested: FIELD_MEMBER_OF,
                });
            }
        }
        self.member_of = member_of;
        Ok(self)
    }

    // ── Opaque metadata ──────────────────────────────────────────────

    pub fn extensions(&self) -> &Map<String, Value> {
        &self.extensions
    }

    pub fn extensions_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.extensions
    }

    pub fn put_extension(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.extensions.insert(key.into(), value.into());
        self
    }

    pub fn defaults(&self) -> &Map<String, Value> {
        &self.defaults
    }

    pub fn put_default(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.defaults.insert(key.into(), value.into());
        self
    }

    pub fn mapper(&self) -> Option<&str> {
        self.mapper.as_deref()
    }

    pub fn set_mapper(&mut self, mapper: impl Into<String>) -> &mut Self {
        self.mapper = Some(mapper.into());
        self
    }

    pub fn authorities(&self) -> &BTreeSet<String> {
        &self.authorities
    }

    pub fn set_authorities<I, S>(&mut self, authorities: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.authorities = authorities.into_iter().map(Into::into).collect();
        self
    }
}

// ── Wire document ───────────────────────────────────────────────────

/// Unchecked shape of a device as it arrives on the wire.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DeviceDocument {
    enabled: Option<bool>,
    ext: Map<String, Value>,
    defaults: Map<String, Value>,
    via: Vec<String>,
    #[serde(rename = "viaGroups")]
    via_groups: Vec<String>,
    #[serde(rename = "memberOf")]
    member_of: Vec<String>,
    mapper: Option<String>,
    authorities: Vec<String>,
}

impl TryFrom<DeviceDocument> for Device {
    type Error = CoreError;

    fn try_from(doc: DeviceDocument) -> Result<Self, Self::Error> {
        let mut device = Device {
            enabled: doc.enabled,
            extensions: doc.ext,
            defaults: doc.defaults,
            mapper: doc.mapper,
            ..Device::default()
        };
        device
            .set_via(doc.via)?
            .set_via_groups(doc.via_groups)?
            .set_member_of(doc.member_of)?
            .set_authorities(doc.authorities);
        Ok(device)
    }
}
