//! # Topic Path Codec
//!
//! Parses and composes the hierarchical topic paths under which device
//! attributes are published:
//!
//! ```text
//! <prefix>/[set/]<addr>/<topic>[/<day>/<slot>/<mode|time>]
//! ```
//!
//! Parsing works on borrowed `&str` segments and never copies substrings;
//! composition appends into a caller-supplied fixed-capacity buffer. Both
//! directions are allocation free.

use core::fmt::Write;

use crate::topic::{S_SET, TimerTopic, Topic};

/// Path segment separator.
pub const SEPARATOR: char = '/';

/// Multi-level wildcard used for the setter subscription.
pub const WILDCARD: char = '#';

/// Capacity of a composed topic path, in bytes.
pub const MAX_PATH_LEN: usize = 128;

/// Fixed-capacity buffer holding one composed topic path.
pub type TopicBuf = heapless::String<MAX_PATH_LEN>;

/// Failure modes of [`Path::compose`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ComposeError {
    /// The destination buffer capacity was reached before the path was
    /// completely written.
    Overflow,
    /// A timer path was composed without a concrete sub-topic.
    MalformedPath,
}

impl From<core::fmt::Error> for ComposeError {
    fn from(_: core::fmt::Error) -> Self {
        ComposeError::Overflow
    }
}

/// One parsed or to-be-composed topic path.
///
/// An address of `0` marks an invalid path; no device may be addressed as
/// zero, and every consumer gates on [`Path::valid`] before dereferencing the
/// address into a device lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Path {
    /// Device address. `0` means invalid.
    pub addr: u8,
    /// Timer day, meaningful only for [`Topic::Timer`].
    pub day: u8,
    /// Timer slot within the day, meaningful only for [`Topic::Timer`].
    pub slot: u8,
    pub topic: Topic,
    /// Timer sub-topic, [`TimerTopic::None`] outside the timer branch.
    pub timer_topic: TimerTopic,
    /// True for paths below the reserved `set/` branch.
    pub setter: bool,
}

impl Path {
    /// Path for one frequent attribute of a device.
    pub const fn new(addr: u8, topic: Topic) -> Self {
        Path {
            addr,
            day: 0,
            slot: 0,
            topic,
            timer_topic: TimerTopic::None,
            setter: false,
        }
    }

    /// Path for one timer slot of a device.
    pub const fn timer(addr: u8, day: u8, slot: u8, timer_topic: TimerTopic) -> Self {
        Path {
            addr,
            day,
            slot,
            topic: Topic::Timer,
            timer_topic,
            setter: false,
        }
    }

    /// A path is valid iff it addresses a real device.
    pub const fn valid(&self) -> bool {
        self.addr != 0
    }

    /// Compose the full topic string into `out`.
    ///
    /// Writes `prefix/[set/]addr/topic` and, for the timer branch,
    /// `/day/slot/<sub>`. The write saturates at the buffer capacity and
    /// reports [`ComposeError::Overflow`] instead of producing a partial path
    /// the caller might publish.
    pub fn compose(&self, prefix: &str, out: &mut TopicBuf) -> Result<(), ComposeError> {
        write!(out, "{}{}", prefix, SEPARATOR)?;

        if self.setter {
            write!(out, "{}{}", S_SET, SEPARATOR)?;
        }

        write!(out, "{}{}{}", self.addr, SEPARATOR, self.topic.name())?;

        if self.topic == Topic::Timer {
            let sub = self.timer_topic.name().ok_or(ComposeError::MalformedPath)?;
            write!(
                out,
                "{}{}{}{}{}{}",
                SEPARATOR, self.day, SEPARATOR, self.slot, SEPARATOR, sub
            )?;
        }

        Ok(())
    }

    /// Compose the wildcard subscription path `prefix/set/#` used once at
    /// connect time to receive every inbound write.
    pub fn compose_set_wildcard(prefix: &str, out: &mut TopicBuf) -> Result<(), ComposeError> {
        write!(
            out,
            "{}{}{}{}{}",
            prefix, SEPARATOR, S_SET, SEPARATOR, WILDCARD
        )?;
        Ok(())
    }

    /// Parse a raw topic against the configured prefix.
    ///
    /// Returns `None` on any structural mismatch: unknown prefix, missing
    /// separator, unknown topic name, malformed timer tail. A syntactically
    /// well-formed path with a zero address still parses; callers reject it
    /// through [`Path::valid`].
    pub fn parse(raw: &str, prefix: &str) -> Option<Path> {
        let mut rest = skip_prefix(raw, prefix)?;
        let mut setter = false;

        // Optional `set` branch in front of the address.
        let (token, tail) = split_segment(rest);
        let (addr_token, addr_tail) = if token == S_SET {
            setter = true;
            split_segment(tail?)
        } else {
            (token, tail)
        };

        // The address must be all digits up to the separator. Values past
        // the u8 range wrap, matching the wire behavior relied on by tests
        // against the legacy master.
        let addr = parse_num(addr_token)?;
        rest = addr_tail?;

        let (topic_token, topic_tail) = split_segment(rest);
        let topic = Topic::parse(topic_token)?;

        if topic != Topic::Timer {
            // Frequent attributes are terminal segments.
            if topic_tail.is_some() {
                return None;
            }
            return Some(Path {
                addr,
                day: 0,
                slot: 0,
                topic,
                timer_topic: TimerTopic::None,
                setter,
            });
        }

        // timer/<day>/<slot>/<mode|time>
        let (day_token, day_tail) = split_segment(topic_tail?);
        let day = parse_num(day_token)?;

        let (slot_token, slot_tail) = split_segment(day_tail?);
        let slot = parse_num(slot_token)?;

        let (sub_token, sub_tail) = split_segment(slot_tail?);
        if sub_tail.is_some() {
            return None;
        }
        let timer_topic = TimerTopic::parse(sub_token)?;

        Some(Path {
            addr,
            day,
            slot,
            topic,
            timer_topic,
            setter,
        })
    }

    /// Compressed diagnostic code: address in bits 0..5, topic in bits 5..9,
    /// timer sub-topic in bits 9..11. Only used to tag log events and errors;
    /// collisions across the truncated address bits are acceptable.
    pub fn code(&self) -> u16 {
        (self.addr as u16 & 0x1f)
            | ((self.topic as u16 & 0x0f) << 5)
            | ((self.timer_topic as u16 & 0x03) << 9)
    }
}

/// Split `s` into the segment before the first separator and the remainder
/// after it. `None` remainder means the segment was terminal.
fn split_segment(s: &str) -> (&str, Option<&str>) {
    match s.find(SEPARATOR) {
        Some(i) => (&s[..i], Some(&s[i + 1..])),
        None => (s, None),
    }
}

/// Truncating decimal parse.
///
/// Consumes digits left to right with wrapping u8 arithmetic. A non-digit
/// byte inside the token means the character after the numeric run is not a
/// separator, which fails the whole parse. An empty token yields 0 and is
/// caught later by the address validity gate.
fn parse_num(token: &str) -> Option<u8> {
    let mut res: u8 = 0;
    for b in token.bytes() {
        if !b.is_ascii_digit() {
            return None;
        }
        res = res.wrapping_mul(10).wrapping_add(b - b'0');
    }
    Some(res)
}

/// Consume the configured prefix from the head of `raw`, token by token.
///
/// One leading separator is ignored on both sides, so `/hr20` and `hr20`
/// match either way. The prefix may span several segments. Returns the
/// remainder after the prefix, or `None` when a token differs or `raw` ends
/// before the prefix does.
fn skip_prefix<'a>(raw: &'a str, prefix: &str) -> Option<&'a str> {
    let raw = raw.strip_prefix(SEPARATOR).unwrap_or(raw);
    let prefix = prefix.strip_prefix(SEPARATOR).unwrap_or(prefix);

    let mut rest = raw;
    for want in prefix.split(SEPARATOR) {
        if want.is_empty() {
            continue;
        }
        let (token, tail) = split_segment(rest);
        if token != want {
            return None;
        }
        // Just the prefix with nothing behind it is not a path.
        rest = tail?;
    }

    if rest.is_empty() {
        return None;
    }
    Some(rest)
}
