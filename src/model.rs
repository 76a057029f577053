//! # Device-Model Contract
//!
//! The bridge publishes values it does not own. The device model (the radio
//! protocol side keeping valves in sync) exposes its per-device state through
//! the object-safe traits in this module, and the bridge restricts itself to
//! one-directional flag transitions: it only reads values, only *sets*
//! `published`, and only *clears* dirty bits it has fully drained.

use crate::topic::Topic;

/// Days in the weekly timer schedule.
pub const TIMER_DAYS: u8 = 8;
/// Configurable time/mode pairs per day.
pub const TIMER_SLOTS: u8 = 8;

/// Capacity of a formatted attribute value, in bytes.
pub const MAX_VALUE_LEN: usize = 32;
/// Capacity of a full-state JSON snapshot, in bytes.
#[cfg(feature = "json-state")]
pub const MAX_STATE_LEN: usize = 160;

/// Fixed-capacity buffer for one formatted attribute value.
pub type ValueBuf = heapless::String<MAX_VALUE_LEN>;
/// Fixed-capacity buffer for one full-state snapshot.
#[cfg(feature = "json-state")]
pub type StateBuf = heapless::String<MAX_STATE_LEN>;

/// One cached attribute value as the bridge sees it.
///
/// The publish contract: send iff `remote_valid() && !published()`, then
/// `mark_published()` after the send attempt. The model flips `published`
/// back to false whenever the value changes.
pub trait Value {
    /// An authoritative value has been received from the device at least once.
    fn remote_valid(&self) -> bool;

    /// The current value has already been sent since it last changed.
    fn published(&self) -> bool;

    fn mark_published(&mut self);

    /// Format the current value for the wire.
    fn format(&self, out: &mut ValueBuf) -> core::fmt::Result;
}

/// One timer slot: a switching time paired with a target mode, published as
/// two sibling topics from a single cached entry.
pub trait TimerSlotValue {
    fn remote_valid(&self) -> bool;
    fn published(&self) -> bool;
    fn mark_published(&mut self);

    /// Format the slot's mode value.
    fn format_mode(&self, out: &mut ValueBuf) -> core::fmt::Result;

    /// Format the slot's switching time (HH:MM).
    fn format_time(&self, out: &mut ValueBuf) -> core::fmt::Result;
}

/// One thermostatic valve.
pub trait Device {
    /// Access the cached value behind a frequent attribute topic. Returns
    /// `None` for topics the device does not publish.
    fn attr(&mut self, topic: Topic) -> Option<&mut dyn Value>;

    /// Access one timer slot. `None` when day or slot are out of range.
    fn timer_slot(&mut self, day: u8, slot: u8) -> Option<&mut dyn TimerSlotValue>;

    /// Route an inbound write for a writable attribute (requested
    /// temperature, mode, lock). Returns `false` when the payload fails
    /// validation; the stored value is left untouched in that case.
    fn set_requested(&mut self, topic: Topic, payload: &[u8]) -> bool;

    /// Route an inbound timer-mode write.
    fn set_timer_mode(&mut self, day: u8, slot: u8, payload: &[u8]) -> bool;

    /// Route an inbound timer-time write.
    fn set_timer_time(&mut self, day: u8, slot: u8, payload: &[u8]) -> bool;

    /// Render the device's full state as a structured document for the
    /// `state` topic.
    #[cfg(feature = "json-state")]
    fn state_json(&self, out: &mut StateBuf) -> core::fmt::Result;
}

/// The fleet of devices plus the change-bit vocabulary of their protocol.
///
/// The bit-mask mapping lives here because the protocol side owns the dirty
/// bit layout; the bridge treats the mask as opaque apart from these lookups.
pub trait DeviceModel {
    /// Look up a device by address. Address 0 is never valid.
    fn device(&mut self, addr: u8) -> Option<&mut dyn Device>;

    /// Bits marking "some frequent attribute changed".
    fn frequent_change_mask(&self) -> u32;

    /// Bits marking "timer slots of `day` changed".
    fn timer_day_mask(&self, day: u8) -> u32;

    /// Extract the per-day timer change bits (bit `d` set means day `d` is
    /// dirty) from a full 32-bit change mask.
    fn timer_change_bits(&self, mask: u32) -> u8;
}
