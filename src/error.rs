//! # Error and Event Reporting
//!
//! Every failure in the bridge core is a value handed to an [`EventSink`],
//! never a panic and never control flow that could stall the tick loop. Most
//! variants carry the 16-bit diagnostic code of the path they relate to
//! (see [`crate::path::Path::code`]) so a constrained host can correlate
//! events without storing topic strings.

/// Non-fatal bridge errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BridgeError {
    /// The transport refused the connection attempt. Retried only after the
    /// configured backoff interval.
    CannotConnect,
    /// A publish was rejected by the transport. Not retried within the tick.
    CannotPublish(u16),
    /// The scheduler cursor points at an address with no device behind it.
    InvalidClient,
    /// An inbound setter path addressed a device that does not exist.
    BadAddress,
    /// An inbound path failed to parse, was not a setter path, or named an
    /// unactionable topic kind.
    InvalidTopic,
    /// Timer day or slot out of bounds, or an unrecognized timer sub-kind.
    /// The tag is `day | 0x10`, `slot | 0x20`, or `0` for a bad sub-kind.
    InvalidTimerTopic(u8),
    /// The payload failed validation in the device-model setter.
    InvalidValue(u16),
}

impl core::fmt::Display for BridgeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            BridgeError::CannotConnect => write!(f, "cannot connect to broker"),
            BridgeError::CannotPublish(code) => write!(f, "cannot publish ({:#x})", code),
            BridgeError::InvalidClient => write!(f, "no device at scheduled address"),
            BridgeError::BadAddress => write!(f, "inbound write for unknown device"),
            BridgeError::InvalidTopic => write!(f, "invalid inbound topic"),
            BridgeError::InvalidTimerTopic(tag) => {
                write!(f, "invalid timer topic ({:#x})", tag)
            }
            BridgeError::InvalidValue(code) => write!(f, "invalid topic value ({:#x})", code),
        }
    }
}

impl core::error::Error for BridgeError {}

/// Observable bridge events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BridgeEvent {
    /// Connected to the broker and subscribed to the setter wildcard.
    Connected,
    /// One attribute or timer slot was published.
    Published(u16),
    /// One inbound setter message was routed to the device model.
    CallbackProcessed(u16),
}

/// Sink for bridge events and errors.
///
/// Implementations are expected to be cheap: a counter bump, a log line, a
/// ring-buffer push. The bridge calls into the sink synchronously from the
/// tick path.
pub trait EventSink {
    fn event(&mut self, event: BridgeEvent);
    fn error(&mut self, error: BridgeError);
}

/// A sink that discards everything. Useful as a placeholder and in tests.
pub struct NoopSink;

impl EventSink for NoopSink {
    fn event(&mut self, _event: BridgeEvent) {}
    fn error(&mut self, _error: BridgeError) {}
}

/// A sink that counts occurrences per category, mirroring the event-counter
/// diagnostics of the original master firmware.
#[derive(Debug, Default, Clone, Copy)]
pub struct EventCounters {
    pub connects: u32,
    pub published: u32,
    pub callbacks: u32,
    pub errors: u32,
    /// The most recent error, kept for diagnostics readout.
    pub last_error: Option<BridgeError>,
}

impl EventCounters {
    pub const fn new() -> Self {
        Self {
            connects: 0,
            published: 0,
            callbacks: 0,
            errors: 0,
            last_error: None,
        }
    }
}

impl EventSink for EventCounters {
    fn event(&mut self, event: BridgeEvent) {
        match event {
            BridgeEvent::Connected => self.connects += 1,
            BridgeEvent::Published(_) => self.published += 1,
            BridgeEvent::CallbackProcessed(_) => self.callbacks += 1,
        }
    }

    fn error(&mut self, error: BridgeError) {
        self.errors += 1;
        self.last_error = Some(error);
        #[cfg(feature = "log")]
        log::warn!("bridge error: {}", error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_tally_by_category() {
        let mut sink = EventCounters::new();
        sink.event(BridgeEvent::Connected);
        sink.event(BridgeEvent::Published(0x25));
        sink.event(BridgeEvent::Published(0x26));
        sink.error(BridgeError::CannotPublish(0x25));

        assert_eq!(sink.connects, 1);
        assert_eq!(sink.published, 2);
        assert_eq!(sink.callbacks, 0);
        assert_eq!(sink.errors, 1);
        assert_eq!(sink.last_error, Some(BridgeError::CannotPublish(0x25)));
    }
}
