use tracing::field::Empty;
use tracing::{Span, debug, info_span, warn};

use super::response::ManagementResponse;
use crate::error::{CoreError, StatusClass};

/// Tracing span covering one management request from receipt to response.
///
/// `finish` consumes the guard, so a request cannot be finished twice.
/// A guard dropped without `finish` still closes its span, flagged as an
/// error.
#[derive(Debug)]
pub struct RequestSpan {
    span: Span,
    finished: bool,
}

impl RequestSpan {
    pub fn get_credentials(tenant_id: Option<&str>, device_id: Option<&str>) -> Self {
        let span = info_span!(
            "get Credentials from management API",
            tenant_id = Empty,
            device_id = Empty,
            http.status_code = Empty,
            error = Empty,
        );
        Self::open(span, tenant_id, device_id)
    }

    pub fn update_credentials(tenant_id: Option<&str>, device_id: Option<&str>) -> Self {
        let span = info_span!(
            "update Credentials from management API",
            tenant_id = Empty,
            device_id = Empty,
            http.status_code = Empty,
            error = Empty,
        );
        Self::open(span, tenant_id, device_id)
    }

    fn open(span: Span, tenant_id: Option<&str>, device_id: Option<&str>) -> Self {
        if let Some(tenant_id) = tenant_id {
            span.record("tenant_id", tenant_id);
        }
        if let Some(device_id) = device_id {
            span.record("device_id", device_id);
        }
        Self {
            span,
            finished: false,
        }
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Mark the span as failed and attach the error as an event.
    pub fn log_error(&self, err: &CoreError) {
        self.span.record("error", true);
        if err.status_class() == StatusClass::Server {
            warn!(parent: &self.span, status = err.status_code().as_u16(), error = %err, "request failed");
        } else {
            debug!(parent: &self.span, status = err.status_code().as_u16(), error = %err, "request rejected");
        }
    }

    /// Record the outcome status and close the span.
    pub fn finish(mut self, response: ManagementResponse) -> ManagementResponse {
        self.span.record("http.status_code", response.status.as_u16());
        if response.status.is_client_error() || response.status.is_server_error() {
            self.span.record("error", true);
        }
        self.finished = true;
        response
    }

    /// Record `err`, respond with its status and message, close the span.
    pub fn fail(self, err: &CoreError) -> ManagementResponse {
        self.log_error(err);
        self.finish(ManagementResponse::from_error(err))
    }
}

impl Drop for RequestSpan {
    fn drop(&mut self) {
        if !self.finished {
            self.span.record("error", true);
            debug!(parent: &self.span, "request abandoned before a response was produced");
        }
    }
}
