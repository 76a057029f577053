//! # MQTT Transport Abstraction
//!
//! The bridge does not implement MQTT itself; it drives an existing client
//! through the [`Transport`] trait. Any session-managing MQTT client can be
//! adapted: an `rumqttc` handle on a hosted target, a `no_std` client on
//! embedded, or a plain mock in tests.
//!
//! All operations are synchronous and must not block: `connect` performs one
//! bounded attempt, `publish` is fire-and-forget at the bridge's level, and
//! `poll` only drains deliveries that are already queued.

/// One publish/subscribe transport session.
pub trait Transport {
    /// Whether a live session exists right now.
    fn connected(&self) -> bool;

    /// Attempt to establish a session. Returns `false` on refusal or timeout;
    /// the bridge applies its own backoff between attempts.
    fn connect(&mut self, client_id: &str, credentials: Option<(&str, &str)>) -> bool;

    /// Subscribe to a topic pattern. Called once per session, right after a
    /// successful connect.
    fn subscribe(&mut self, pattern: &str) -> bool;

    /// Publish one message. `retain` asks the broker to keep the last value
    /// for late subscribers.
    fn publish(&mut self, topic: &str, payload: &[u8], retain: bool) -> bool;

    /// Pump pending inbound deliveries, invoking `on_message` once per queued
    /// message. Invoked exactly once per scheduler tick.
    fn poll(&mut self, on_message: &mut dyn FnMut(&str, &[u8]));
}
