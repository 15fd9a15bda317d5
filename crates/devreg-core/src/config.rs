// ── Runtime endpoint configuration ──
//
// Describes how the credentials endpoint presents itself to a transport
// binding. Never touches disk: `devreg-config` (or an embedding server)
// builds one and hands it in.

/// Default management API version segment.
pub const DEFAULT_API_VERSION: &str = "v1";

/// Default limit for request bodies, in bytes.
pub const DEFAULT_MAX_PAYLOAD_SIZE: usize = 2048;

/// Configuration for a management endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointConfig {
    /// Version segment prefixed to every resource path (e.g. `v1`).
    pub api_version: String,
    /// Largest request body accepted, in bytes.
    pub max_payload_size: usize,
    /// Origin advertised to CORS preflight requests.
    pub cors_allowed_origin: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            api_version: DEFAULT_API_VERSION.into(),
            max_payload_size: DEFAULT_MAX_PAYLOAD_SIZE,
            cors_allowed_origin: "*".into(),
        }
    }
}
