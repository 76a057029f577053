//! # MQTT Bridge for HR20-Class Thermostatic Valves
//!
//! `hr20-mqtt-bridge` is a `no_std`, allocation-free bridge core that exposes
//! the state of a fleet of remote thermostatic-valve devices as retained MQTT
//! topics and routes inbound topic writes back into per-device control
//! values. Buffers are managed with `heapless`; timestamps use
//! [`embassy-time`](https://embassy.dev/).
//!
//! ## Core pieces
//!
//! - **Topic path codec** ([`path`], [`topic`]): parses and composes
//!   `prefix/[set/]addr/topic[/day/slot/sub]` paths on fixed 128-byte
//!   buffers, with no heap allocation in either direction.
//! - **Publication scheduler** ([`bridge::Bridge`]): a tick-driven state
//!   machine that drains each device's dirty change bits into the transport,
//!   publishing at most one attribute (or timer slot pair) per tick so the
//!   host main loop never stalls.
//! - **Inbound dispatcher**: validates `set/`-branch deliveries and routes
//!   payloads into the device model's setters; failures are reported as
//!   values, never raised.
//!
//! The MQTT transport, the device model and the event sink are consumed
//! through the narrow traits in [`transport`], [`model`] and [`error`]; the
//! bridge owns only its cursor and the per-device dirty-bitmask table.
//!
//! ## Driving the bridge
//!
//! ```ignore
//! let options = BridgeOptions::new("hr20-master", "hr20");
//! let mut bridge: Bridge<_, _, 30> = Bridge::new(options, transport, EventCounters::new());
//!
//! loop {
//!     // Forward change notifications from the device model.
//!     while let Some((addr, mask)) = model.take_change() {
//!         bridge.note_change(addr, mask);
//!     }
//!     bridge.update(Instant::now(), &mut model);
//!     ticker.next().await;
//! }
//! ```
//!
//! ## Features
//!
//! - `json-state`: publish a full-state snapshot topic per device at the end
//!   of each frequent sweep, rendered by the device model.
//! - `log` / `defmt`: optional diagnostics for hosted and embedded targets.

#![no_std]
pub mod bridge;
pub mod error;
pub mod model;
pub mod path;
pub mod topic;
pub mod transport;

// Re-export key types for easier access at the crate root.
pub use bridge::{Bridge, BridgeOptions};
pub use error::{BridgeError, BridgeEvent, EventCounters, EventSink, NoopSink};
pub use model::{Device, DeviceModel, TIMER_DAYS, TIMER_SLOTS, TimerSlotValue, Value, ValueBuf};
pub use path::{ComposeError, MAX_PATH_LEN, Path, TopicBuf};
pub use topic::{TimerTopic, Topic};
pub use transport::Transport;
