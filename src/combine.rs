/*!
The `combine` module provides two stateful processors that reassemble multi-message MIDI 1.0
idioms into single logical events:

- [`Cc14Combiner`] pairs a controller 0-31 MSB with its matching controller 32-63 LSB into one
  14-bit [`Cc14`] value, when the pair arrives on the same channel within a time window.
- [`RpnCombiner`] folds a registered / non-registered parameter transaction (parameter select,
  data entry, data increment/decrement) into exactly one [`Event::Rpn`] / [`Event::Nrpn`].

Both processors are fed `(event, timestamp)` pairs; timestamps are caller-supplied
microseconds from any monotonic origin. Events that do not participate pass through in order.
!*/

use crate::core::{
    ControlChange, Controller, Event, Nrpn, ParamValue, ParameterChange, Rpn, U14, U32, U4, U7,
};

/// A coalesced 14-bit control change, produced by [`Cc14Combiner`] from an MSB/LSB pair.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Cc14 {
    pub group: U4,
    pub channel: U4,
    /// The MSB controller number (0 to 31).
    pub controller: U7,
    pub value: U14,
}

/// The output of [`Cc14Combiner`]: either an event passed through untouched, or a coalesced
/// 14-bit control change.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Combined {
    Event(Event),
    Cc14(Cc14),
}

#[derive(Clone, Debug)]
struct PendingMsb {
    message: ControlChange,
    at_micros: u64,
}

/// Pairs controller 0-31 MSB messages with their controller 32-63 LSB counterparts. An MSB is
/// held until its LSB arrives; any other traffic, or the window expiring, releases the MSB as
/// an ordinary control change.
#[derive(Clone, Debug)]
pub struct Cc14Combiner {
    window_micros: u64,
    pending: Option<PendingMsb>,
}

impl Default for Cc14Combiner {
    fn default() -> Self {
        Self::new(50_000)
    }
}

impl Cc14Combiner {
    pub fn new(window_micros: u64) -> Self {
        Self {
            window_micros,
            pending: None,
        }
    }

    /// Feed one event. Returns the events/combinations released by this input, in order.
    pub fn push(&mut self, event: Event, at_micros: u64) -> Vec<Combined> {
        let mut out = Vec::new();
        // an expired MSB is released before the new input is considered
        if let Some(pending) = &self.pending {
            if at_micros.saturating_sub(pending.at_micros) > self.window_micros {
                out.push(Combined::Event(Event::ControlChange(pending.message)));
                self.pending = None;
            }
        }
        match event {
            Event::ControlChange(cc) if cc.controller.to_u8() < 32 => {
                if let Some(pending) = self.pending.take() {
                    out.push(Combined::Event(Event::ControlChange(pending.message)));
                }
                self.pending = Some(PendingMsb {
                    message: cc,
                    at_micros,
                });
            }
            Event::ControlChange(cc)
                if (32..64).contains(&cc.controller.to_u8()) && self.matches_pending(&cc) =>
            {
                let pending = self.pending.take().expect("checked by matches_pending");
                out.push(Combined::Cc14(Cc14 {
                    group: cc.group,
                    channel: cc.channel,
                    controller: U7::new(pending.message.controller.to_u8()),
                    value: U14::from_pair(
                        pending.message.value.midi1(),
                        cc.value.midi1(),
                    ),
                }));
            }
            other => {
                if let Some(pending) = self.pending.take() {
                    out.push(Combined::Event(Event::ControlChange(pending.message)));
                }
                out.push(Combined::Event(other));
            }
        }
        out
    }

    /// Release a held MSB, if any.
    pub fn flush(&mut self) -> Option<Event> {
        self.pending
            .take()
            .map(|pending| Event::ControlChange(pending.message))
    }

    fn matches_pending(&self, lsb: &ControlChange) -> bool {
        match &self.pending {
            Some(pending) => {
                pending.message.channel == lsb.channel
                    && pending.message.group == lsb.group
                    && pending.message.controller.to_u8() + 32 == lsb.controller.to_u8()
            }
            None => false,
        }
    }
}

/// Which parameter space a transaction is addressing.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum ParameterSpace {
    Registered,
    NonRegistered,
}

#[derive(Clone, Debug)]
struct Transaction {
    channel: U4,
    group: U4,
    space: ParameterSpace,
    msb: Option<U7>,
    lsb: Option<U7>,
    data_msb: Option<(U7, u64)>,
}

/// Folds MIDI 1.0 RPN/NRPN controller transactions into single parameter events. One
/// transaction produces exactly one event: data entry MSB is held for a window in case the
/// LSB follows; increment/decrement produce relative events immediately. The null parameter
/// (127, 127) closes the transaction without emitting.
#[derive(Clone, Debug)]
pub struct RpnCombiner {
    window_micros: u64,
    transaction: Option<Transaction>,
}

impl Default for RpnCombiner {
    fn default() -> Self {
        Self::new(50_000)
    }
}

impl RpnCombiner {
    pub fn new(window_micros: u64) -> Self {
        Self {
            window_micros,
            transaction: None,
        }
    }

    /// Feed one event. Participating controller messages are swallowed; assembled parameter
    /// events and passed-through traffic come back in order.
    pub fn push(&mut self, event: Event, at_micros: u64) -> Vec<Event> {
        let mut out = Vec::new();
        // release a data-entry MSB whose window has passed
        if let Some(emitted) = self.take_expired(at_micros) {
            out.push(emitted);
        }
        let cc = match &event {
            Event::ControlChange(cc) => *cc,
            _ => {
                if let Some(emitted) = self.take_pending_data() {
                    out.push(emitted);
                }
                out.push(event);
                return out;
            }
        };
        match cc.controller {
            Controller::RegisteredParameterMsb => {
                self.select(cc, ParameterSpace::Registered, Some(cc.value.midi1()), None)
            }
            Controller::RegisteredParameterLsb => {
                self.select(cc, ParameterSpace::Registered, None, Some(cc.value.midi1()))
            }
            Controller::NonRegisteredParameterMsb => self.select(
                cc,
                ParameterSpace::NonRegistered,
                Some(cc.value.midi1()),
                None,
            ),
            Controller::NonRegisteredParameterLsb => self.select(
                cc,
                ParameterSpace::NonRegistered,
                None,
                Some(cc.value.midi1()),
            ),
            Controller::DataEntry => {
                let selected =
                    matches!(&self.transaction, Some(t) if t.channel == cc.channel);
                if selected {
                    if let Some(emitted) = self.take_pending_data() {
                        out.push(emitted);
                    }
                    if let Some(transaction) = &mut self.transaction {
                        transaction.data_msb = Some((cc.value.midi1(), at_micros));
                    }
                } else {
                    out.push(event);
                }
            }
            Controller::DataEntryLsb => match self.take_data_pair(cc) {
                Some(emitted) => out.push(emitted),
                None => out.push(event),
            },
            Controller::DataIncrement | Controller::DataDecrement => {
                match self.relative(cc) {
                    Some(emitted) => out.push(emitted),
                    None => out.push(event),
                }
            }
            _ => {
                if let Some(emitted) = self.take_pending_data() {
                    out.push(emitted);
                }
                out.push(event);
            }
        }
        out
    }

    /// Release anything still held.
    pub fn flush(&mut self) -> Option<Event> {
        self.take_pending_data()
    }

    fn select(
        &mut self,
        cc: ControlChange,
        space: ParameterSpace,
        msb: Option<U7>,
        lsb: Option<U7>,
    ) {
        match &mut self.transaction {
            Some(transaction)
                if transaction.channel == cc.channel && transaction.space == space =>
            {
                if msb.is_some() {
                    transaction.msb = msb;
                }
                if lsb.is_some() {
                    transaction.lsb = lsb;
                }
                transaction.data_msb = None;
            }
            _ => {
                self.transaction = Some(Transaction {
                    channel: cc.channel,
                    group: cc.group,
                    space,
                    msb,
                    lsb,
                    data_msb: None,
                });
            }
        }
        // the null parameter deselects
        if let Some(transaction) = &self.transaction {
            if transaction.msb.map(|v| v.get()) == Some(127)
                && transaction.lsb.map(|v| v.get()) == Some(127)
            {
                self.transaction = None;
            }
        }
    }

    fn parameter(transaction: &Transaction) -> U14 {
        U14::from_pair(
            transaction.msb.unwrap_or_default(),
            transaction.lsb.unwrap_or_default(),
        )
    }

    fn emit(
        transaction: &Transaction,
        value: ParamValue,
        change: ParameterChange,
    ) -> Event {
        let parameter = Self::parameter(transaction);
        match transaction.space {
            ParameterSpace::Registered => Event::Rpn(Rpn {
                group: transaction.group,
                channel: transaction.channel,
                parameter,
                value,
                change,
            }),
            ParameterSpace::NonRegistered => Event::Nrpn(Nrpn {
                group: transaction.group,
                channel: transaction.channel,
                parameter,
                value,
                change,
            }),
        }
    }

    fn take_expired(&mut self, at_micros: u64) -> Option<Event> {
        let expired = match &self.transaction {
            Some(Transaction {
                data_msb: Some((_, at)),
                ..
            }) => at_micros.saturating_sub(*at) > self.window_micros,
            _ => false,
        };
        if expired {
            self.take_pending_data()
        } else {
            None
        }
    }

    fn take_pending_data(&mut self) -> Option<Event> {
        let transaction = self.transaction.as_mut()?;
        let (msb, _) = transaction.data_msb.take()?;
        let value = ParamValue::Midi1(U14::from_pair(msb, U7::new(0)));
        Some(Self::emit(transaction, value, ParameterChange::Absolute))
    }

    fn take_data_pair(&mut self, cc: ControlChange) -> Option<Event> {
        let transaction = self.transaction.as_mut()?;
        if transaction.channel != cc.channel {
            return None;
        }
        let (msb, _) = transaction.data_msb.take()?;
        let value = ParamValue::Midi1(U14::from_pair(msb, cc.value.midi1()));
        Some(Self::emit(transaction, value, ParameterChange::Absolute))
    }

    fn relative(&mut self, cc: ControlChange) -> Option<Event> {
        let transaction = self.transaction.as_ref()?;
        if transaction.channel != cc.channel {
            return None;
        }
        let value = if cc.controller == Controller::DataIncrement {
            ParamValue::Midi2(U32::new(1))
        } else {
            // -1 in two's complement, the MIDI 2.0 relative controller encoding
            ParamValue::Midi2(U32::new(u32::MAX))
        };
        Some(Self::emit(transaction, value, ParameterChange::Relative))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ChanValue, EventKind};

    fn cc(channel: u8, controller: Controller, value: u8) -> Event {
        Event::control_change(
            U4::new(0),
            U4::new(channel),
            controller,
            ChanValue::Midi1(U7::new(value)),
        )
    }

    #[test]
    fn cc14_pair_combines() {
        let mut combiner = Cc14Combiner::default();
        // B0 01 40 then B0 21 00 within the window
        assert!(combiner.push(cc(0, Controller::ModWheel, 0x40), 0).is_empty());
        let out = combiner.push(cc(0, Controller::ModWheelLsb, 0x00), 1_000);
        assert_eq!(
            vec![Combined::Cc14(Cc14 {
                group: U4::new(0),
                channel: U4::new(0),
                controller: U7::new(1),
                value: U14::new(0x2000),
            })],
            out
        );
    }

    #[test]
    fn cc14_window_expiry_releases_msb() {
        let mut combiner = Cc14Combiner::new(50_000);
        assert!(combiner.push(cc(0, Controller::ModWheel, 0x40), 0).is_empty());
        let out = combiner.push(cc(0, Controller::ModWheelLsb, 0x00), 60_000);
        // the MSB expired, so the LSB is not combined and both pass through
        assert_eq!(2, out.len());
        assert!(matches!(out[0], Combined::Event(_)));
        assert!(matches!(out[1], Combined::Event(_)));
    }

    #[test]
    fn cc14_unrelated_traffic_passes_through() {
        let mut combiner = Cc14Combiner::default();
        assert!(combiner.push(cc(0, Controller::ModWheel, 0x40), 0).is_empty());
        let out = combiner.push(Event::TimingClock(U4::new(0)), 100);
        assert_eq!(2, out.len());
        assert!(combiner.flush().is_none());
    }

    #[test]
    fn rpn_transaction_combines_to_one_event() {
        let mut combiner = RpnCombiner::default();
        let mut out = Vec::new();
        // pitch bend sensitivity = 2 semitones: 101=0, 100=0, 6=2, 38=0
        out.extend(combiner.push(cc(0, Controller::RegisteredParameterMsb, 0), 0));
        out.extend(combiner.push(cc(0, Controller::RegisteredParameterLsb, 0), 10));
        out.extend(combiner.push(cc(0, Controller::DataEntry, 2), 20));
        out.extend(combiner.push(cc(0, Controller::DataEntryLsb, 0), 30));
        assert_eq!(1, out.len());
        match &out[0] {
            Event::Rpn(rpn) => {
                assert_eq!(0, rpn.parameter.get());
                assert_eq!(U14::from_pair(U7::new(2), U7::new(0)), rpn.value.midi1());
                assert_eq!(ParameterChange::Absolute, rpn.change);
            }
            other => panic!("expected rpn, got {:?}", other),
        }
    }

    #[test]
    fn nrpn_increment_is_relative() {
        let mut combiner = RpnCombiner::default();
        let mut out = Vec::new();
        out.extend(combiner.push(cc(3, Controller::NonRegisteredParameterMsb, 1), 0));
        out.extend(combiner.push(cc(3, Controller::NonRegisteredParameterLsb, 5), 10));
        out.extend(combiner.push(cc(3, Controller::DataIncrement, 0), 20));
        assert_eq!(1, out.len());
        match &out[0] {
            Event::Nrpn(nrpn) => {
                assert_eq!(U14::from_pair(U7::new(1), U7::new(5)), nrpn.parameter);
                assert_eq!(ParameterChange::Relative, nrpn.change);
            }
            other => panic!("expected nrpn, got {:?}", other),
        }
    }

    #[test]
    fn null_parameter_closes_without_emitting() {
        let mut combiner = RpnCombiner::default();
        let mut out = Vec::new();
        out.extend(combiner.push(cc(0, Controller::RegisteredParameterMsb, 127), 0));
        out.extend(combiner.push(cc(0, Controller::RegisteredParameterLsb, 127), 10));
        out.extend(combiner.push(cc(0, Controller::DataEntry, 9), 20));
        // the data entry has no selected parameter, so it passes through untouched
        assert_eq!(1, out.len());
        assert_eq!(EventKind::ControlChange, out[0].kind());
        assert!(combiner.flush().is_none());
    }

    #[test]
    fn data_msb_alone_flushes_with_zero_lsb() {
        let mut combiner = RpnCombiner::default();
        combiner.push(cc(0, Controller::RegisteredParameterMsb, 0), 0);
        combiner.push(cc(0, Controller::RegisteredParameterLsb, 1), 0);
        combiner.push(cc(0, Controller::DataEntry, 3), 0);
        let flushed = combiner.flush().unwrap();
        match flushed {
            Event::Rpn(rpn) => {
                assert_eq!(1, rpn.parameter.get());
                assert_eq!(U14::from_pair(U7::new(3), U7::new(0)), rpn.value.midi1());
            }
            other => panic!("expected rpn, got {:?}", other),
        }
    }
}
