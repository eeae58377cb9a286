/*!
The `filter` module provides a small, closed algebra of predicates over event streams. A
[`Filter`] either keeps or drops the events selected by its [`Predicate`]; filters are pure,
preserve order, and never combine or split events, so they compose as ordinary function
composition over iterators.
!*/

use crate::core::{Event, EventKind, UniversalKind};
use std::ops::RangeInclusive;

/// What a predicate selects on.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Predicate {
    /// Every event.
    All,
    /// Events whose [`EventKind`] is in the set.
    Kind(KindSet),
    /// Channel voice events on one of the given channels. Events without a channel never
    /// match.
    Channel(ChannelSet),
    /// Control change events with one of the given controller numbers.
    CcNumber(CcSet),
    /// Note events whose note number falls in any of the ranges.
    NoteRange(Vec<RangeInclusive<u8>>),
    /// Events in one of the given UMP groups.
    Group(GroupSet),
    /// System exclusive events of the given flavor, across the 7- and 8-bit forms.
    Sysex(SysexKindSet),
}

impl Predicate {
    /// Whether this predicate selects `event`.
    pub fn matches(&self, event: &Event) -> bool {
        match self {
            Predicate::All => true,
            Predicate::Kind(set) => set.contains(event.kind()),
            Predicate::Channel(set) => match event.channel() {
                Some(channel) => set.contains(channel.get()),
                None => false,
            },
            Predicate::CcNumber(set) => match event {
                Event::ControlChange(cc) => set.contains(cc.controller.to_u8()),
                _ => false,
            },
            Predicate::NoteRange(ranges) => match event.note() {
                Some(note) => ranges.iter().any(|range| range.contains(&note.get())),
                None => false,
            },
            Predicate::Group(set) => set.contains(event.group().get()),
            Predicate::Sysex(set) => match event {
                Event::SysEx7(_) | Event::SysEx8(_) => set.manufacturer,
                Event::UniversalSysEx7(s) => set.matches_universal(s.kind),
                Event::UniversalSysEx8(s) => set.matches_universal(s.kind),
                _ => false,
            },
        }
    }
}

/// A set of [`EventKind`]s, as a bitmask over their declaration order.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct KindSet(u64);

impl KindSet {
    pub fn new(kinds: &[EventKind]) -> Self {
        let mut mask = 0u64;
        for kind in kinds {
            mask |= 1 << kind.bit();
        }
        Self(mask)
    }

    pub fn contains(&self, kind: EventKind) -> bool {
        self.0 & (1 << kind.bit()) != 0
    }

    /// The set of all channel voice kinds.
    pub fn channel_voice() -> Self {
        let kinds: Vec<EventKind> = EventKind::ALL
            .iter()
            .copied()
            .filter(|kind| kind.is_channel_voice())
            .collect();
        Self::new(&kinds)
    }

    /// The set of all system realtime kinds.
    pub fn system_realtime() -> Self {
        let kinds: Vec<EventKind> = EventKind::ALL
            .iter()
            .copied()
            .filter(|kind| kind.is_system_realtime())
            .collect();
        Self::new(&kinds)
    }
}

/// A set of channels 0-15, as a bitmask.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct ChannelSet(u16);

impl ChannelSet {
    pub fn new(channels: &[u8]) -> Self {
        let mut mask = 0u16;
        for &channel in channels {
            if channel < 16 {
                mask |= 1 << channel;
            }
        }
        Self(mask)
    }

    pub fn contains(&self, channel: u8) -> bool {
        channel < 16 && self.0 & (1 << channel) != 0
    }
}

/// A set of UMP groups 0-15, as a bitmask.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct GroupSet(u16);

impl GroupSet {
    pub fn new(groups: &[u8]) -> Self {
        let mut mask = 0u16;
        for &group in groups {
            if group < 16 {
                mask |= 1 << group;
            }
        }
        Self(mask)
    }

    pub fn contains(&self, group: u8) -> bool {
        group < 16 && self.0 & (1 << group) != 0
    }
}

/// A set of controller numbers 0-127, as a bitmask.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct CcSet(u128);

impl CcSet {
    pub fn new(numbers: &[u8]) -> Self {
        let mut mask = 0u128;
        for &number in numbers {
            if number < 128 {
                mask |= 1 << number;
            }
        }
        Self(mask)
    }

    pub fn contains(&self, number: u8) -> bool {
        number < 128 && self.0 & (1 << number) != 0
    }
}

/// Which system exclusive flavors to select.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct SysexKindSet {
    pub manufacturer: bool,
    pub universal_non_realtime: bool,
    pub universal_realtime: bool,
}

impl SysexKindSet {
    pub fn all() -> Self {
        Self {
            manufacturer: true,
            universal_non_realtime: true,
            universal_realtime: true,
        }
    }

    fn matches_universal(&self, kind: UniversalKind) -> bool {
        match kind {
            UniversalKind::NonRealTime => self.universal_non_realtime,
            UniversalKind::RealTime => self.universal_realtime,
        }
    }
}

/// Whether the filter keeps or drops the events its predicate selects.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
enum Mode {
    Keep,
    Drop,
}

/// A stream filter: keep or drop the events selected by a predicate.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Filter {
    mode: Mode,
    predicate: Predicate,
}

impl Filter {
    /// Keep only the events selected by `predicate`.
    pub fn keep(predicate: Predicate) -> Self {
        Self {
            mode: Mode::Keep,
            predicate,
        }
    }

    /// `only` is a synonym of [`Filter::keep`].
    pub fn only(predicate: Predicate) -> Self {
        Self::keep(predicate)
    }

    /// Drop the events selected by `predicate`, keeping everything else.
    pub fn drop(predicate: Predicate) -> Self {
        Self {
            mode: Mode::Drop,
            predicate,
        }
    }

    /// Whether `event` survives this filter.
    pub fn matches(&self, event: &Event) -> bool {
        match self.mode {
            Mode::Keep => self.predicate.matches(event),
            Mode::Drop => !self.predicate.matches(event),
        }
    }

    /// Apply the filter to an iterator of events, preserving order.
    pub fn apply<I>(self, events: I) -> impl Iterator<Item = Event>
    where
        I: IntoIterator<Item = Event>,
    {
        events
            .into_iter()
            .filter(move |event| self.matches(event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ChanValue, Controller, Velocity, U4, U7};

    fn sample_events() -> Vec<Event> {
        vec![
            Event::note_on(
                U4::new(0),
                U4::new(0),
                U7::new(60),
                Velocity::Midi1(U7::new(100)),
            ),
            Event::control_change(
                U4::new(0),
                U4::new(1),
                Controller::ModWheel,
                ChanValue::Midi1(U7::new(5)),
            ),
            Event::TimingClock(U4::new(2)),
            Event::note_on(
                U4::new(0),
                U4::new(1),
                U7::new(100),
                Velocity::Midi1(U7::new(1)),
            ),
        ]
    }

    #[test]
    fn keep_all_is_identity() {
        let events = sample_events();
        let kept: Vec<Event> = Filter::only(Predicate::All).apply(events.clone()).collect();
        assert_eq!(events, kept);
    }

    #[test]
    fn drop_empty_kind_set_is_identity() {
        let events = sample_events();
        let kept: Vec<Event> = Filter::drop(Predicate::Kind(KindSet::new(&[])))
            .apply(events.clone())
            .collect();
        assert_eq!(events, kept);
    }

    #[test]
    fn keep_by_channel() {
        let kept: Vec<Event> = Filter::keep(Predicate::Channel(ChannelSet::new(&[1])))
            .apply(sample_events())
            .collect();
        assert_eq!(2, kept.len());
        assert!(kept.iter().all(|e| e.channel() == Some(U4::new(1))));
    }

    #[test]
    fn drop_by_kind() {
        let kept: Vec<Event> = Filter::drop(Predicate::Kind(KindSet::new(&[
            EventKind::TimingClock,
        ])))
        .apply(sample_events())
        .collect();
        assert_eq!(3, kept.len());
    }

    #[test]
    fn keep_by_note_range() {
        let kept: Vec<Event> = Filter::keep(Predicate::NoteRange(vec![0..=64]))
            .apply(sample_events())
            .collect();
        assert_eq!(1, kept.len());
    }

    #[test]
    fn keep_by_cc_number() {
        let kept: Vec<Event> = Filter::keep(Predicate::CcNumber(CcSet::new(&[1])))
            .apply(sample_events())
            .collect();
        assert_eq!(1, kept.len());
        assert_eq!(EventKind::ControlChange, kept[0].kind());
    }

    #[test]
    fn keep_by_group() {
        let kept: Vec<Event> = Filter::keep(Predicate::Group(GroupSet::new(&[2])))
            .apply(sample_events())
            .collect();
        assert_eq!(vec![Event::TimingClock(U4::new(2))], kept);
    }
}
