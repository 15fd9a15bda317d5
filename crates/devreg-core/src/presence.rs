// ── Time-until-disconnect notifications ──
//
// A device that sends a message with a `ttd` application property tells
// applications it will stay connected (and able to receive commands) for
// that many seconds after the message was created.

use chrono::{DateTime, TimeDelta, Utc};
use tracing::debug;

use crate::model::Message;
use crate::model::message::TTD_VALUE_UNLIMITED;

/// When a device stops being ready to receive commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    /// The device stays connected until further notice.
    Unlimited,
    /// The device is ready until this instant.
    At(DateTime<Utc>),
}

/// A device's announcement that it is ready to receive commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeUntilDisconnectNotification {
    tenant_id: String,
    device_id: String,
    ttd: i64,
    ready_until: Expiry,
    creation_time: DateTime<Utc>,
    millis_until_expiry: Option<i64>,
}

impl TimeUntilDisconnectNotification {
    /// Extract a notification from `message`, evaluated at `now`.
    ///
    /// Returns `None` if the message carries no usable `ttd`, lacks the
    /// tenant or device id, or the announced window has already passed.
    pub fn decode(message: &Message, now: DateTime<Utc>) -> Option<Self> {
        let Some(ttd) = message.ttd() else {
            debug!("message carries no integer ttd property");
            return None;
        };
        let (Some(tenant_id), Some(device_id)) = (message.tenant_id(), message.device_id()) else {
            debug!(ttd, "ttd message without tenant or device id");
            return None;
        };
        let creation_time = message.creation_time.unwrap_or(DateTime::<Utc>::UNIX_EPOCH);

        let (ready_until, millis_until_expiry) = if ttd == TTD_VALUE_UNLIMITED {
            (Expiry::Unlimited, None)
        } else if ttd > 0 {
            let until = creation_time.checked_add_signed(TimeDelta::try_seconds(ttd)?)?;
            let remaining = (until - now).num_milliseconds();
            if remaining <= 0 {
                debug!(tenant_id, device_id, ttd, %until, "ttd already expired");
                return None;
            }
            (Expiry::At(until), Some(remaining))
        } else {
            debug!(tenant_id, device_id, ttd, "ignoring non-positive ttd");
            return None;
        };

        Some(Self {
            tenant_id: tenant_id.to_owned(),
            device_id: device_id.to_owned(),
            ttd,
            ready_until,
            creation_time,
            millis_until_expiry,
        })
    }

    /// [`decode`](Self::decode) against the wall clock.
    pub fn decode_now(message: &Message) -> Option<Self> {
        Self::decode(message, Utc::now())
    }

    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// The raw `ttd` value in seconds, `-1` for unlimited.
    pub fn ttd(&self) -> i64 {
        self.ttd
    }

    pub fn ready_until(&self) -> Expiry {
        self.ready_until
    }

    pub fn creation_time(&self) -> DateTime<Utc> {
        self.creation_time
    }

    /// Milliseconds between the decode instant and expiry; `None` if unlimited.
    pub fn millis_until_expiry(&self) -> Option<i64> {
        self.millis_until_expiry
    }
}
