use http::StatusCode;
use serde_json::Value;

use crate::error::CoreError;
use crate::model::ResourceVersion;

const CONTENT_TYPE_JSON: &str = "application/json";
const CONTENT_TYPE_TEXT: &str = "text/plain; charset=utf-8";

#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Empty,
    Json(Value),
    /// Error message written for failed requests.
    Text(String),
}

/// Transport-independent response of a management request.
#[derive(Debug, Clone, PartialEq)]
pub struct ManagementResponse {
    pub status: StatusCode,
    /// Value of the `ETag` header, if any.
    pub etag: Option<String>,
    pub body: ResponseBody,
}

impl ManagementResponse {
    /// A response with the given status and no body.
    pub fn status(status: StatusCode) -> Self {
        Self {
            status,
            etag: None,
            body: ResponseBody::Empty,
        }
    }

    pub fn json(status: StatusCode, body: Value) -> Self {
        Self {
            body: ResponseBody::Json(body),
            ..Self::status(status)
        }
    }

    /// Status and message of a failed request.
    pub fn from_error(err: &CoreError) -> Self {
        Self {
            body: ResponseBody::Text(err.to_string()),
            ..Self::status(err.status_code())
        }
    }

    #[must_use]
    pub fn with_etag(mut self, version: Option<ResourceVersion>) -> Self {
        self.etag = version.map(ResourceVersion::into_inner);
        self
    }

    pub fn content_type(&self) -> Option<&'static str> {
        match self.body {
            ResponseBody::Empty => None,
            ResponseBody::Json(_) => Some(CONTENT_TYPE_JSON),
            ResponseBody::Text(_) => Some(CONTENT_TYPE_TEXT),
        }
    }

    /// Serialized body bytes, ready to be written by a transport.
    pub fn body_bytes(&self) -> Vec<u8> {
        match &self.body {
            ResponseBody::Empty => Vec::new(),
            ResponseBody::Json(value) => value.to_string().into_bytes(),
            ResponseBody::Text(text) => text.clone().into_bytes(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}
