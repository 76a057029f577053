//! Inbound setter dispatch.
//!
//! Messages arrive under the `set/` branch only (the subscription is the
//! setter wildcard), but every delivery is fully re-validated here before a
//! payload reaches a device-model mutator. Failures degrade the one message
//! being processed and nothing else.

use crate::error::{BridgeError, BridgeEvent, EventSink};
use crate::model::{Device, DeviceModel, TIMER_DAYS, TIMER_SLOTS};
use crate::path::Path;
use crate::topic::{TimerTopic, Topic};

/// Route one raw topic + payload delivery into the device model.
pub(crate) fn on_message(
    prefix: &str,
    model: &mut dyn DeviceModel,
    events: &mut dyn EventSink,
    topic: &str,
    payload: &[u8],
) {
    let Some(path) = Path::parse(topic, prefix) else {
        events.error(BridgeError::InvalidTopic);
        return;
    };

    // Defensive re-check: the subscription only matches the setter wildcard,
    // but a misbehaving broker must not reach the mutators.
    if !path.valid() || !path.setter {
        events.error(BridgeError::InvalidTopic);
        return;
    }

    let Some(dev) = model.device(path.addr) else {
        events.error(BridgeError::BadAddress);
        return;
    };

    let ok = match path.topic {
        Topic::RequestedTemp | Topic::Mode | Topic::Lock => {
            dev.set_requested(path.topic, payload)
        }
        Topic::Timer => set_timer(dev, events, &path, payload),
        _ => {
            events.error(BridgeError::InvalidTopic);
            return;
        }
    };

    events.event(BridgeEvent::CallbackProcessed(path.code()));

    #[cfg(feature = "log")]
    log::debug!(
        "mqtt setter addr={} code={:#x} ok={}",
        path.addr,
        path.code(),
        ok
    );

    if !ok {
        events.error(BridgeError::InvalidValue(path.code()));
    }
}

/// Validate timer bounds and route to the timer-mode or timer-time setter.
///
/// Bound violations are reported with a tag naming which bound failed; they
/// do not count as bad payload values.
fn set_timer(
    dev: &mut dyn Device,
    events: &mut dyn EventSink,
    path: &Path,
    payload: &[u8],
) -> bool {
    if path.day >= TIMER_DAYS {
        events.error(BridgeError::InvalidTimerTopic(path.day | 0x10));
        return true;
    }
    if path.slot >= TIMER_SLOTS {
        events.error(BridgeError::InvalidTimerTopic(path.slot | 0x20));
        return true;
    }

    match path.timer_topic {
        TimerTopic::Mode => dev.set_timer_mode(path.day, path.slot, payload),
        TimerTopic::Time => dev.set_timer_time(path.day, path.slot, payload),
        TimerTopic::None => {
            events.error(BridgeError::InvalidTimerTopic(0));
            true
        }
    }
}
