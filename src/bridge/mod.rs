//! Bridge Core
//!
//! The tick-driven heart of the crate: a round-robin publication scheduler
//! that drains per-device change bits into retained MQTT topics, and the
//! dispatcher that routes inbound `set/` writes back into the device model.
//!
//! # Tick model
//!
//! There is exactly one logical thread of control. An external driver calls
//! [`Bridge::update`] once per tick (nominally once per second); the bridge
//! performs at most one unit of publish work per tick, so the call returns
//! promptly no matter how many devices are dirty. Inbound messages are pumped
//! from within the same tick, so the device model is never accessed
//! re-entrantly and no locking exists anywhere in this crate.

pub(crate) mod dispatch;
pub(crate) mod scheduler;

pub use scheduler::Bridge;

use embassy_time::Duration;

/// Read-only bridge configuration, loaded and validated by the host process.
#[derive(Debug, Clone)]
pub struct BridgeOptions<'a> {
    /// Client identifier passed to the transport on connect.
    pub client_id: &'a str,
    /// Username for the broker session; empty means anonymous.
    pub username: &'a str,
    /// Password, used only together with a non-empty username.
    pub password: &'a str,
    /// Topic root under which every device path lives. May span several
    /// segments (`home/hr20`).
    pub prefix: &'a str,
    /// Minimum interval between connection attempts.
    pub reconnect_interval: Duration,
}

impl<'a> BridgeOptions<'a> {
    /// Options for an anonymous session with a 5 second reconnect backoff.
    pub const fn new(client_id: &'a str, prefix: &'a str) -> Self {
        Self {
            client_id,
            username: "",
            password: "",
            prefix,
            reconnect_interval: Duration::from_secs(5),
        }
    }

    pub const fn with_credentials(mut self, username: &'a str, password: &'a str) -> Self {
        self.username = username;
        self.password = password;
        self
    }

    pub const fn with_reconnect_interval(mut self, interval: Duration) -> Self {
        self.reconnect_interval = interval;
        self
    }

    /// Credentials to hand to the transport, gated on a non-empty username.
    pub(crate) fn credentials(&self) -> Option<(&'a str, &'a str)> {
        if self.username.is_empty() {
            None
        } else {
            Some((self.username, self.password))
        }
    }
}
