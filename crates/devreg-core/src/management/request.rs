use http::Method;

/// Transport-independent view of an incoming management request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagementRequest {
    pub method: Method,
    pub tenant_id: Option<String>,
    pub device_id: Option<String>,
    /// Raw `If-Match` header value.
    pub if_match: Option<String>,
    pub body: Vec<u8>,
}

impl ManagementRequest {
    pub fn new(method: Method, tenant_id: impl Into<String>, device_id: impl Into<String>) -> Self {
        Self {
            method,
            tenant_id: Some(tenant_id.into()),
            device_id: Some(device_id.into()),
            if_match: None,
            body: Vec::new(),
        }
    }

    pub fn get(tenant_id: impl Into<String>, device_id: impl Into<String>) -> Self {
        Self::new(Method::GET, tenant_id, device_id)
    }

    pub fn put(
        tenant_id: impl Into<String>,
        device_id: impl Into<String>,
        body: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            body: body.into(),
            ..Self::new(Method::PUT, tenant_id, device_id)
        }
    }

    #[must_use]
    pub fn with_if_match(mut self, version: impl Into<String>) -> Self {
        self.if_match = Some(version.into());
        self
    }
}
