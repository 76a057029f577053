//! # Topic Vocabulary
//!
//! The closed set of attribute topic names published for every valve, plus the
//! timer sub-topic names. These strings are wire format: external controllers
//! (Home Assistant, scripts) address devices through them, so they must never
//! change spelling or case.

/// Per-device attribute topics.
///
/// Discriminants are stable because they feed the packed diagnostic code
/// (see [`crate::path::Path::code`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Topic {
    AverageTemp = 1,
    Battery = 2,
    Error = 3,
    Lock = 4,
    Mode = 5,
    RequestedTemp = 6,
    ValveWanted = 7,
    Window = 8,
    LastSeen = 9,
    Timer = 10,
    State = 11,
}

/// Sub-topic of one timer slot: the switching time or the target mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum TimerTopic {
    /// No sub-topic selected. A timer path is only well formed once this is
    /// replaced by [`TimerTopic::Time`] or [`TimerTopic::Mode`].
    None = 0,
    Time = 1,
    Mode = 2,
}

pub(crate) const S_AVG_TMP: &str = "average_temp";
pub(crate) const S_BAT: &str = "battery";
pub(crate) const S_ERR: &str = "error";
pub(crate) const S_LOCK: &str = "lock";
pub(crate) const S_MODE: &str = "mode";
pub(crate) const S_REQ_TMP: &str = "requested_temp";
pub(crate) const S_VALVE_WTD: &str = "valve_wanted";
pub(crate) const S_WND: &str = "window";
pub(crate) const S_LAST_SEEN: &str = "last_seen";
pub(crate) const S_TIMER: &str = "timer";
pub(crate) const S_STATE: &str = "state";

pub(crate) const S_TIMER_MODE: &str = "mode";
pub(crate) const S_TIMER_TIME: &str = "time";

/// The reserved topic branch for inbound writes.
pub(crate) const S_SET: &str = "set";

impl Topic {
    /// Wire name of the topic.
    pub const fn name(self) -> &'static str {
        match self {
            Topic::AverageTemp => S_AVG_TMP,
            Topic::Battery => S_BAT,
            Topic::Error => S_ERR,
            Topic::Lock => S_LOCK,
            Topic::Mode => S_MODE,
            Topic::RequestedTemp => S_REQ_TMP,
            Topic::ValveWanted => S_VALVE_WTD,
            Topic::Window => S_WND,
            Topic::LastSeen => S_LAST_SEEN,
            Topic::Timer => S_TIMER,
            Topic::State => S_STATE,
        }
    }

    /// Parse a topic name token.
    ///
    /// Dispatches on the leading byte so that at most two full string
    /// comparisons happen per lookup. The match is exact and case sensitive.
    pub fn parse(token: &str) -> Option<Topic> {
        match token.as_bytes().first()? {
            b'a' => (token == S_AVG_TMP).then_some(Topic::AverageTemp),
            b'b' => (token == S_BAT).then_some(Topic::Battery),
            b'e' => (token == S_ERR).then_some(Topic::Error),
            b'l' => {
                if token == S_LOCK {
                    Some(Topic::Lock)
                } else if token == S_LAST_SEEN {
                    Some(Topic::LastSeen)
                } else {
                    None
                }
            }
            b'm' => (token == S_MODE).then_some(Topic::Mode),
            b'r' => (token == S_REQ_TMP).then_some(Topic::RequestedTemp),
            b's' => (token == S_STATE).then_some(Topic::State),
            b't' => (token == S_TIMER).then_some(Topic::Timer),
            b'v' => (token == S_VALVE_WTD).then_some(Topic::ValveWanted),
            b'w' => (token == S_WND).then_some(Topic::Window),
            _ => None,
        }
    }
}

impl TimerTopic {
    /// Wire name of the sub-topic, if one is selected.
    pub const fn name(self) -> Option<&'static str> {
        match self {
            TimerTopic::Time => Some(S_TIMER_TIME),
            TimerTopic::Mode => Some(S_TIMER_MODE),
            TimerTopic::None => None,
        }
    }

    /// Parse a timer sub-topic token, leading-byte dispatched like
    /// [`Topic::parse`].
    pub fn parse(token: &str) -> Option<TimerTopic> {
        match token.as_bytes().first()? {
            b't' => (token == S_TIMER_TIME).then_some(TimerTopic::Time),
            b'm' => (token == S_TIMER_MODE).then_some(TimerTopic::Mode),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_names_round_trip() {
        let all = [
            Topic::AverageTemp,
            Topic::Battery,
            Topic::Error,
            Topic::Lock,
            Topic::Mode,
            Topic::RequestedTemp,
            Topic::ValveWanted,
            Topic::Window,
            Topic::LastSeen,
            Topic::Timer,
            Topic::State,
        ];
        for topic in all {
            assert_eq!(Topic::parse(topic.name()), Some(topic));
        }
    }

    #[test]
    fn test_topic_match_is_exact() {
        // Same leading byte, different tail.
        assert_eq!(Topic::parse("lockk"), None);
        assert_eq!(Topic::parse("loc"), None);
        assert_eq!(Topic::parse("batteryy"), None);
        assert_eq!(Topic::parse("timers"), None);
        // Case sensitive.
        assert_eq!(Topic::parse("Mode"), None);
        assert_eq!(Topic::parse(""), None);
    }

    #[test]
    fn test_timer_topic_parse() {
        assert_eq!(TimerTopic::parse("time"), Some(TimerTopic::Time));
        assert_eq!(TimerTopic::parse("mode"), Some(TimerTopic::Mode));
        assert_eq!(TimerTopic::parse("tim"), None);
        assert_eq!(TimerTopic::parse("modes"), None);
        assert_eq!(TimerTopic::parse(""), None);
    }

    #[test]
    fn test_timer_topic_none_has_no_name() {
        assert_eq!(TimerTopic::None.name(), None);
        assert_eq!(TimerTopic::Time.name(), Some("time"));
        assert_eq!(TimerTopic::Mode.name(), Some("mode"));
    }
}
