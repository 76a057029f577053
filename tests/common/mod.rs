//! Shared mock transport, device model and event sink for integration tests.

#![allow(dead_code)]

use core::fmt::Write;
use std::collections::VecDeque;

use hr20_mqtt_bridge::{
    BridgeError, BridgeEvent, Device, DeviceModel, EventSink, TimerSlotValue, Topic, Transport,
    Value, ValueBuf,
};

/// Test bit layout: bit 0 marks "some frequent attribute changed", bits 8..16
/// mark the timer days.
pub const FREQ_BIT: u32 = 0x0000_0001;

pub fn day_bit(day: u8) -> u32 {
    1u32 << (8 + day as u32)
}

pub struct MockTransport {
    pub connected: bool,
    pub accept_connect: bool,
    pub publish_ok: bool,
    pub connect_attempts: usize,
    pub last_credentials: Option<(String, String)>,
    pub subscriptions: Vec<String>,
    pub published: Vec<(String, Vec<u8>)>,
    pub inbound: VecDeque<(String, Vec<u8>)>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            connected: false,
            accept_connect: true,
            publish_ok: true,
            connect_attempts: 0,
            last_credentials: None,
            subscriptions: Vec::new(),
            published: Vec::new(),
            inbound: VecDeque::new(),
        }
    }

    /// A transport that starts with a live session, skipping the connect
    /// handshake in tests that do not care about it.
    pub fn connected_now() -> Self {
        let mut t = Self::new();
        t.connected = true;
        t
    }

    pub fn refusing() -> Self {
        let mut t = Self::new();
        t.accept_connect = false;
        t
    }

    pub fn queue_inbound(&mut self, topic: &str, payload: &[u8]) {
        self.inbound.push_back((topic.to_owned(), payload.to_vec()));
    }

    pub fn topics(&self) -> Vec<&str> {
        self.published.iter().map(|(t, _)| t.as_str()).collect()
    }
}

impl Transport for MockTransport {
    fn connected(&self) -> bool {
        self.connected
    }

    fn connect(&mut self, _client_id: &str, credentials: Option<(&str, &str)>) -> bool {
        self.connect_attempts += 1;
        self.last_credentials = credentials.map(|(u, p)| (u.to_owned(), p.to_owned()));
        if self.accept_connect {
            self.connected = true;
        }
        self.connected
    }

    fn subscribe(&mut self, pattern: &str) -> bool {
        self.subscriptions.push(pattern.to_owned());
        true
    }

    fn publish(&mut self, topic: &str, payload: &[u8], _retain: bool) -> bool {
        if self.publish_ok {
            self.published.push((topic.to_owned(), payload.to_vec()));
        }
        self.publish_ok
    }

    fn poll(&mut self, on_message: &mut dyn FnMut(&str, &[u8])) {
        while let Some((topic, payload)) = self.inbound.pop_front() {
            on_message(&topic, &payload);
        }
    }
}

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<BridgeEvent>,
    pub errors: Vec<BridgeError>,
}

impl EventSink for RecordingSink {
    fn event(&mut self, event: BridgeEvent) {
        self.events.push(event);
    }

    fn error(&mut self, error: BridgeError) {
        self.errors.push(error);
    }
}

pub struct MockValue {
    pub text: String,
    pub remote_valid: bool,
    pub published: bool,
}

impl MockValue {
    /// A value that is due for publication.
    pub fn ready(text: &str) -> Self {
        Self {
            text: text.to_owned(),
            remote_valid: true,
            published: false,
        }
    }
}

impl Value for MockValue {
    fn remote_valid(&self) -> bool {
        self.remote_valid
    }

    fn published(&self) -> bool {
        self.published
    }

    fn mark_published(&mut self) {
        self.published = true;
    }

    fn format(&self, out: &mut ValueBuf) -> core::fmt::Result {
        write!(out, "{}", self.text)
    }
}

pub struct MockTimerSlot {
    pub mode: u8,
    pub time: String,
    pub remote_valid: bool,
    pub published: bool,
}

impl TimerSlotValue for MockTimerSlot {
    fn remote_valid(&self) -> bool {
        self.remote_valid
    }

    fn published(&self) -> bool {
        self.published
    }

    fn mark_published(&mut self) {
        self.published = true;
    }

    fn format_mode(&self, out: &mut ValueBuf) -> core::fmt::Result {
        write!(out, "{}", self.mode)
    }

    fn format_time(&self, out: &mut ValueBuf) -> core::fmt::Result {
        write!(out, "{}", self.time)
    }
}

/// The frequent attributes in the order the scheduler sweeps them.
pub const FREQUENT_TOPICS: [Topic; 9] = [
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

pub struct MockDevice {
    pub values: Vec<(Topic, MockValue)>,
    /// 8 days of 8 slots, all clean unless a test dirties them.
    pub timers: Vec<Vec<MockTimerSlot>>,
    /// Accepted attribute writes, in arrival order.
    pub requested: Vec<(Topic, Vec<u8>)>,
    /// Accepted timer writes as (kind, day, slot, payload).
    pub timer_writes: Vec<(&'static str, u8, u8, Vec<u8>)>,
}

impl MockDevice {
    /// A device whose frequent attributes are all valid and pending.
    pub fn with_ready_values() -> Self {
        let values = FREQUENT_TOPICS
            .iter()
            .map(|&topic| (topic, MockValue::ready("1")))
            .collect();
        let timers = (0..8)
            .map(|_| {
                (0..8)
                    .map(|_| MockTimerSlot {
                        mode: 1,
                        time: "06:30".to_owned(),
                        remote_valid: true,
                        published: true,
                    })
                    .collect()
            })
            .collect();
        Self {
            values,
            timers,
            requested: Vec::new(),
            timer_writes: Vec::new(),
        }
    }

    pub fn value_mut(&mut self, topic: Topic) -> &mut MockValue {
        self.values
            .iter_mut()
            .find(|(t, _)| *t == topic)
            .map(|(_, v)| v)
            .expect("topic not modeled")
    }
}

impl Device for MockDevice {
    fn attr(&mut self, topic: Topic) -> Option<&mut dyn Value> {
        self.values
            .iter_mut()
            .find(|(t, _)| *t == topic)
            .map(|(_, v)| v as &mut dyn Value)
    }

    fn timer_slot(&mut self, day: u8, slot: u8) -> Option<&mut dyn TimerSlotValue> {
        self.timers
            .get_mut(day as usize)?
            .get_mut(slot as usize)
            .map(|s| s as &mut dyn TimerSlotValue)
    }

    fn set_requested(&mut self, topic: Topic, payload: &[u8]) -> bool {
        let ok = match topic {
            Topic::RequestedTemp => std::str::from_utf8(payload)
                .ok()
                .and_then(|s| s.trim().parse::<f32>().ok())
                .is_some(),
            Topic::Mode | Topic::Lock => matches!(payload, b"0" | b"1"),
            _ => false,
        };
        if ok {
            self.requested.push((topic, payload.to_vec()));
        }
        ok
    }

    fn set_timer_mode(&mut self, day: u8, slot: u8, payload: &[u8]) -> bool {
        let ok = std::str::from_utf8(payload)
            .ok()
            .and_then(|s| s.parse::<u8>().ok())
            .is_some();
        if ok {
            self.timer_writes.push(("mode", day, slot, payload.to_vec()));
        }
        ok
    }

    fn set_timer_time(&mut self, day: u8, slot: u8, payload: &[u8]) -> bool {
        let ok = std::str::from_utf8(payload).is_ok_and(|s| {
            s.len() == 5
                && s.as_bytes()[2] == b':'
                && s[..2].chars().all(|c| c.is_ascii_digit())
                && s[3..].chars().all(|c| c.is_ascii_digit())
        });
        if ok {
            self.timer_writes.push(("time", day, slot, payload.to_vec()));
        }
        ok
    }

    #[cfg(feature = "json-state")]
    fn state_json(&self, out: &mut hr20_mqtt_bridge::model::StateBuf) -> core::fmt::Result {
        write!(out, "{{\"mode\":1}}")
    }
}

pub struct MockModel {
    pub devices: Vec<(u8, MockDevice)>,
}

impl MockModel {
    pub fn empty() -> Self {
        Self {
            devices: Vec::new(),
        }
    }

    pub fn single(addr: u8) -> Self {
        Self::with_addrs(&[addr])
    }

    pub fn with_addrs(addrs: &[u8]) -> Self {
        Self {
            devices: addrs
                .iter()
                .map(|&a| (a, MockDevice::with_ready_values()))
                .collect(),
        }
    }

    pub fn device_mut(&mut self, addr: u8) -> &mut MockDevice {
        self.devices
            .iter_mut()
            .find(|(a, _)| *a == addr)
            .map(|(_, d)| d)
            .expect("device not modeled")
    }

    pub fn device_ref(&self, addr: u8) -> &MockDevice {
        self.devices
            .iter()
            .find(|(a, _)| *a == addr)
            .map(|(_, d)| d)
            .expect("device not modeled")
    }
}

impl DeviceModel for MockModel {
    fn device(&mut self, addr: u8) -> Option<&mut dyn Device> {
        self.devices
            .iter_mut()
            .find(|(a, _)| *a == addr)
            .map(|(_, d)| d as &mut dyn Device)
    }

    fn frequent_change_mask(&self) -> u32 {
        FREQ_BIT
    }

    fn timer_day_mask(&self, day: u8) -> u32 {
        day_bit(day)
    }

    fn timer_change_bits(&self, mask: u32) -> u8 {
        ((mask >> 8) & 0xff) as u8
    }
}
