//! Example: driving the bridge from a hosted main loop
//!
//! This example wires the bridge to a stub transport and a two-device model
//! and runs a handful of ticks, printing every publish the scheduler emits.
//! In a real deployment the transport wraps an actual MQTT client and the
//! device model is the protocol side talking to the valves.

use core::fmt::Write as _;

use embassy_time::Instant;
use hr20_mqtt_bridge::{
    Bridge, BridgeOptions, Device, DeviceModel, EventCounters, TimerSlotValue, Topic, Transport,
    Value, ValueBuf,
};

/// A transport that accepts everything and prints outbound traffic.
struct StdoutTransport {
    connected: bool,
}

impl Transport for StdoutTransport {
    fn connected(&self) -> bool {
        self.connected
    }

    fn connect(&mut self, client_id: &str, _credentials: Option<(&str, &str)>) -> bool {
        println!("connect as {client_id}");
        self.connected = true;
        true
    }

    fn subscribe(&mut self, pattern: &str) -> bool {
        println!("subscribe {pattern}");
        true
    }

    fn publish(&mut self, topic: &str, payload: &[u8], retain: bool) -> bool {
        println!(
            "publish {} = {:?} (retain={})",
            topic,
            core::str::from_utf8(payload).unwrap_or("<binary>"),
            retain
        );
        true
    }

    fn poll(&mut self, _on_message: &mut dyn FnMut(&str, &[u8])) {}
}

/// A fixed-point temperature cached from the device.
struct Temperature {
    centi_deg: i16,
    published: bool,
}

impl Value for Temperature {
    fn remote_valid(&self) -> bool {
        true
    }

    fn published(&self) -> bool {
        self.published
    }

    fn mark_published(&mut self) {
        self.published = true;
    }

    fn format(&self, out: &mut ValueBuf) -> core::fmt::Result {
        write!(out, "{}.{:02}", self.centi_deg / 100, self.centi_deg % 100)
    }
}

struct Valve {
    average_temp: Temperature,
}

impl Device for Valve {
    fn attr(&mut self, topic: Topic) -> Option<&mut dyn Value> {
        match topic {
            Topic::AverageTemp => Some(&mut self.average_temp),
            _ => None,
        }
    }

    fn timer_slot(&mut self, _day: u8, _slot: u8) -> Option<&mut dyn TimerSlotValue> {
        None
    }

    fn set_requested(&mut self, _topic: Topic, _payload: &[u8]) -> bool {
        false
    }

    fn set_timer_mode(&mut self, _day: u8, _slot: u8, _payload: &[u8]) -> bool {
        false
    }

    fn set_timer_time(&mut self, _day: u8, _slot: u8, _payload: &[u8]) -> bool {
        false
    }
}

struct Fleet {
    valves: [(u8, Valve); 2],
}

impl DeviceModel for Fleet {
    fn device(&mut self, addr: u8) -> Option<&mut dyn Device> {
        self.valves
            .iter_mut()
            .find(|(a, _)| *a == addr)
            .map(|(_, v)| v as &mut dyn Device)
    }

    fn frequent_change_mask(&self) -> u32 {
        0x0000_00ff
    }

    fn timer_day_mask(&self, day: u8) -> u32 {
        1 << (8 + day as u32)
    }

    fn timer_change_bits(&self, mask: u32) -> u8 {
        ((mask >> 8) & 0xff) as u8
    }
}

fn main() {
    let mut model = Fleet {
        valves: [
            (
                1,
                Valve {
                    average_temp: Temperature {
                        centi_deg: 2150,
                        published: false,
                    },
                },
            ),
            (
                2,
                Valve {
                    average_temp: Temperature {
                        centi_deg: 1975,
                        published: false,
                    },
                },
            ),
        ],
    };

    let options = BridgeOptions::new("hr20-demo", "hr20");
    let mut bridge: Bridge<_, _, 8> = Bridge::new(
        options,
        StdoutTransport { connected: false },
        EventCounters::new(),
    );

    bridge.note_change(1, 0x01);
    bridge.note_change(2, 0x01);

    for tick in 0..64u64 {
        bridge.update(Instant::from_secs(tick), &mut model);
    }

    let counters = bridge.events();
    println!(
        "connects={} published={} errors={}",
        counters.connects, counters.published, counters.errors
    );
}
