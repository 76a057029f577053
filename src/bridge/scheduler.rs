//! Round-robin publication scheduler.
//!
//! The scheduler walks a two-level cursor: the device address as the outer
//! index, and within one device a major phase (frequent attributes, then
//! timer slots) with a minor step counter. Every tick performs at most one
//! unit of publish work, so worst-case fairness is bounded: with work pending
//! a device is revisited within `MAX_ADDR` ticks, and a full timer sweep of
//! one device takes at most 64 ticks.

use embassy_time::Instant;

use crate::error::{BridgeError, BridgeEvent, EventSink};
use crate::model::{Device, DeviceModel, TIMER_DAYS, TIMER_SLOTS, TimerSlotValue, ValueBuf};
use crate::path::{Path, TopicBuf};
use crate::topic::{TimerTopic, Topic};
use crate::transport::Transport;

use super::BridgeOptions;
use super::dispatch;

/// Every bridge publish is retained so late subscribers see current state.
const RETAIN: bool = true;

/// Frequent attributes in publication order, indexed by the minor cursor.
const FREQUENT_SEQUENCE: [Topic; 9] = [
    Topic::Mode,
    Topic::Lock,
    Topic::Window,
    Topic::AverageTemp,
    Topic::Battery,
    Topic::RequestedTemp,
    Topic::ValveWanted,
    Topic::Error,
    Topic::LastSeen,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Frequent,
    Timer,
}

/// The MQTT bridge: connection upkeep, dirty-bit bookkeeping and the
/// publication state machine.
///
/// `MAX_ADDR` bounds the device address space; the dirty-bitmask table is a
/// flat `[u32; MAX_ADDR]`, one word per address. Address 0 is reserved as
/// invalid but keeps its table slot so addresses index directly.
pub struct Bridge<'a, T, E, const MAX_ADDR: usize> {
    options: BridgeOptions<'a>,
    transport: T,
    events: E,
    /// Per-address dirty bits, OR-ed in by [`Bridge::note_change`], cleared
    /// only once drained for publication.
    states: [u32; MAX_ADDR],
    addr: u8,
    phase: Phase,
    minor: u8,
    /// Timestamp of the last connection attempt, for backoff gating.
    last_conn: Option<Instant>,
}

impl<'a, T, E, const MAX_ADDR: usize> Bridge<'a, T, E, MAX_ADDR>
where
    T: Transport,
    E: EventSink,
{
    pub fn new(options: BridgeOptions<'a>, transport: T, events: E) -> Self {
        Self {
            options,
            transport,
            events,
            states: [0; MAX_ADDR],
            addr: 0,
            phase: Phase::Frequent,
            minor: 0,
            last_conn: None,
        }
    }

    /// Record a change notification from the device model. Bits accumulate
    /// until the scheduler drains them; addresses outside the table are
    /// ignored.
    pub fn note_change(&mut self, addr: u8, mask: u32) {
        if let Some(state) = self.states.get_mut(addr as usize) {
            *state |= mask;
        }
    }

    /// Pending dirty bits for an address.
    pub fn dirty_mask(&self, addr: u8) -> u32 {
        self.states.get(addr as usize).copied().unwrap_or(0)
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn events(&self) -> &E {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut E {
        &mut self.events
    }

    /// One scheduler tick.
    ///
    /// Maintains the connection (backoff-gated), pumps inbound deliveries
    /// into the dispatcher, then performs at most one unit of publish work
    /// for the device under the cursor.
    pub fn update(&mut self, now: Instant, model: &mut dyn DeviceModel) {
        if !self.reconnect(now) {
            return;
        }

        let Self {
            transport,
            events,
            options,
            ..
        } = self;
        transport.poll(&mut |topic, payload| {
            dispatch::on_message(options.prefix, &mut *model, &mut *events, topic, payload);
        });

        if self.states[self.addr as usize] == 0 {
            // Nothing pending for this device; look at the next one on the
            // next tick.
            self.next_client();
            return;
        }

        match self.phase {
            Phase::Frequent => self.publish_frequent(model),
            Phase::Timer => self.publish_timers(model),
        }
    }

    /// Route one inbound topic write into the device model.
    ///
    /// [`Bridge::update`] feeds this from the transport's delivery pump;
    /// hosts whose transport delivers through its own callback can invoke it
    /// directly instead.
    pub fn handle_inbound(&mut self, model: &mut dyn DeviceModel, topic: &str, payload: &[u8]) {
        dispatch::on_message(
            self.options.prefix,
            model,
            &mut self.events,
            topic,
            payload,
        );
    }

    /// Ensure a live session, reporting readiness for this tick.
    ///
    /// Attempts are rate-limited by the configured reconnect interval so a
    /// dead broker cannot stall the host's main loop. On success the setter
    /// wildcard subscription is installed before any publish work happens.
    fn reconnect(&mut self, now: Instant) -> bool {
        if self.transport.connected() {
            return true;
        }

        if let Some(last) = self.last_conn {
            let ready = now
                .checked_duration_since(last)
                .is_some_and(|elapsed| elapsed >= self.options.reconnect_interval);
            if !ready {
                return false;
            }
        }
        self.last_conn = Some(now);

        #[cfg(feature = "log")]
        log::debug!("mqtt connect as {}", self.options.client_id);

        if !self
            .transport
            .connect(self.options.client_id, self.options.credentials())
        {
            self.events.error(BridgeError::CannotConnect);
            return false;
        }
        self.events.event(BridgeEvent::Connected);

        let mut pattern = TopicBuf::new();
        if Path::compose_set_wildcard(self.options.prefix, &mut pattern).is_ok() {
            self.transport.subscribe(pattern.as_str());
        }
        true
    }

    /// Advance the cursor to the next device, wrapping past the last address.
    fn next_client(&mut self) {
        self.addr = self.addr.wrapping_add(1);
        if self.addr as usize >= MAX_ADDR {
            self.addr = 0;
        }
        self.phase = Phase::Frequent;
        self.minor = 0;
    }

    /// Advance past the current phase; leaving the timer phase moves on to
    /// the next device.
    fn next_major(&mut self) {
        self.minor = 0;
        match self.phase {
            Phase::Frequent => self.phase = Phase::Timer,
            Phase::Timer => self.next_client(),
        }
    }

    /// Frequent-attribute sub-step: publish the attribute under the minor
    /// cursor, or finish the phase and clear the drained bits.
    fn publish_frequent(&mut self, model: &mut dyn DeviceModel) {
        let idx = self.addr as usize;
        let freq_mask = model.frequent_change_mask();
        if self.states[idx] & freq_mask == 0 {
            self.next_major();
            return;
        }

        if model.device(self.addr).is_none() {
            self.events.error(BridgeError::InvalidClient);
            return;
        }

        match self.minor as usize {
            m if m < FREQUENT_SEQUENCE.len() => {
                let path = Path::new(self.addr, FREQUENT_SEQUENCE[m]);
                if let Some(dev) = model.device(self.addr) {
                    self.publish_value(&path, dev);
                }
                self.minor += 1;
            }
            #[cfg(feature = "json-state")]
            m if m == FREQUENT_SEQUENCE.len() => {
                self.publish_state(model);
                self.minor += 1;
            }
            _ => {
                // Every slot visited; the frequent bits are drained.
                self.states[idx] &= !freq_mask;
                self.next_major();
            }
        }
    }

    /// Publish one cached attribute value under the cached-value contract.
    fn publish_value(&mut self, path: &Path, dev: &mut dyn Device) {
        let Some(val) = dev.attr(path.topic) else {
            return;
        };
        if val.published() || !val.remote_valid() {
            return;
        }

        let mut value = ValueBuf::new();
        let mut topic = TopicBuf::new();
        let sent = val.format(&mut value).is_ok()
            && path.compose(self.options.prefix, &mut topic).is_ok()
            && self
                .transport
                .publish(topic.as_str(), value.as_bytes(), RETAIN);

        let code = path.code();
        if sent {
            self.events.event(BridgeEvent::Published(code));
        } else {
            self.events.error(BridgeError::CannotPublish(code));
        }
        val.mark_published();
    }

    /// Publish the full-state snapshot topic. The snapshot is rendered fresh
    /// each sweep and bypasses the cached-value flags.
    #[cfg(feature = "json-state")]
    fn publish_state(&mut self, model: &mut dyn DeviceModel) {
        use crate::model::StateBuf;

        let path = Path::new(self.addr, Topic::State);
        let Some(dev) = model.device(self.addr) else {
            return;
        };

        let mut state = StateBuf::new();
        let mut topic = TopicBuf::new();
        let sent = dev.state_json(&mut state).is_ok()
            && path.compose(self.options.prefix, &mut topic).is_ok()
            && self
                .transport
                .publish(topic.as_str(), state.as_bytes(), RETAIN);

        let code = path.code();
        if sent {
            self.events.event(BridgeEvent::Published(code));
        } else {
            self.events.error(BridgeError::CannotPublish(code));
        }
    }

    /// Timer sub-step: the minor cursor encodes `day * 8 + slot` and always
    /// advances, so a full sweep of one device is bounded at 64 ticks even
    /// when most days are clean.
    fn publish_timers(&mut self, model: &mut dyn DeviceModel) {
        let idx = self.addr as usize;

        if model.device(self.addr).is_none() {
            self.events.error(BridgeError::InvalidClient);
            return;
        }

        if model.timer_change_bits(self.states[idx]) == 0 {
            self.next_major();
            return;
        }

        let day = self.minor >> 3;
        let slot = self.minor & 0x7;
        self.minor = self.minor.wrapping_add(1);

        if day >= TIMER_DAYS {
            self.next_major();
            return;
        }

        let day_bits = model.timer_change_bits(self.states[idx]);
        if day_bits & (1 << day) == 0 {
            // This day is clean; the tick is consumed either way.
            return;
        }

        // Reaching the last slot means every slot of this day has been
        // visited; the day bit clears regardless of send outcomes.
        if slot == TIMER_SLOTS - 1 {
            self.states[idx] &= !model.timer_day_mask(day);
        }

        let path = Path::timer(self.addr, day, slot, TimerTopic::None);
        let Some(dev) = model.device(self.addr) else {
            return;
        };
        let Some(val) = dev.timer_slot(day, slot) else {
            return;
        };
        self.publish_timer_slot(&path, val);
    }

    /// Publish one timer slot as its two sibling topics (`…/mode`, `…/time`).
    ///
    /// Fire-and-mark: the slot is marked published even when one of the two
    /// sends fails; the failure stays observable through the error stream but
    /// is not retried within this change cycle.
    fn publish_timer_slot(&mut self, path: &Path, val: &mut dyn TimerSlotValue) {
        if val.published() || !val.remote_valid() {
            return;
        }

        let mut mode_path = *path;
        mode_path.timer_topic = TimerTopic::Mode;
        let mut time_path = *path;
        time_path.timer_topic = TimerTopic::Time;

        let mut value = ValueBuf::new();
        let mut topic = TopicBuf::new();
        let mode_sent = val.format_mode(&mut value).is_ok()
            && mode_path.compose(self.options.prefix, &mut topic).is_ok()
            && self
                .transport
                .publish(topic.as_str(), value.as_bytes(), RETAIN);

        value.clear();
        topic.clear();
        let time_sent = val.format_time(&mut value).is_ok()
            && time_path.compose(self.options.prefix, &mut topic).is_ok()
            && self
                .transport
                .publish(topic.as_str(), value.as_bytes(), RETAIN);

        let code = path.code();
        if mode_sent && time_sent {
            self.events.event(BridgeEvent::Published(code));
        } else {
            self.events.error(BridgeError::CannotPublish(code));
        }
        val.mark_published();
    }
}
