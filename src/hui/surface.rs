use crate::core::{U14, U4, U7};
use crate::hui::switch::{
    AssignSwitch, AutoEnableSwitch, AutoModeSwitch, BankMoveSwitch, ControlRoomSwitch,
    CursorSwitch, EditSwitch, FunctionKeySwitch, HotKeySwitch, NumPadSwitch, ParamEditSwitch,
    StatusAndGroupSwitch, StripControl, Switch, TransportSwitch, WindowSwitch,
};
use crate::hui::vpot::{VPotDisplay, VPotId};
use crate::hui::HuiMessage;
use std::collections::HashMap;

/// The mutable state of one channel strip.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct ChannelStripState {
    pub fader: U14,
    pub fader_touched: bool,
    pub vpot_display: VPotDisplay,
    pub select: bool,
    pub mute: bool,
    pub solo: bool,
    pub auto: bool,
    pub vsel: bool,
    pub insert: bool,
    pub record_ready: bool,
}

impl Default for ChannelStripState {
    fn default() -> Self {
        Self {
            fader: U14::new(0),
            fader_touched: false,
            vpot_display: VPotDisplay::all_off(),
            select: false,
            mute: false,
            solo: false,
            auto: false,
            vsel: false,
            insert: false,
            record_ready: false,
        }
    }
}

/// Which element of a channel strip changed, carrying the new value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StripElement {
    Fader(U14),
    FaderTouch(bool),
    Select(bool),
    Mute(bool),
    Solo(bool),
    Auto(bool),
    VSel(bool),
    Insert(bool),
    RecordReady(bool),
    VPotDisplay(VPotDisplay),
}

/// What a surface-model update touched. The variants mirror the addressing sections
/// one-for-one, plus the displays, pings and pot rotations.
#[derive(Clone, Debug, PartialEq)]
pub enum SurfaceNotification {
    Ping { reply: bool },
    ChannelStrip { strip: u8, element: StripElement },
    Assign { switch: AssignSwitch, state: bool },
    AutoEnable { switch: AutoEnableSwitch, state: bool },
    AutoMode { switch: AutoModeSwitch, state: bool },
    BankMove { switch: BankMoveSwitch, state: bool },
    ControlRoom { switch: ControlRoomSwitch, state: bool },
    Cursor { switch: CursorSwitch, state: bool },
    Edit { switch: EditSwitch, state: bool },
    FunctionKey { switch: FunctionKeySwitch, state: bool },
    HotKey { switch: HotKeySwitch, state: bool },
    NumPad { switch: NumPadSwitch, state: bool },
    ParamEdit { switch: ParamEditSwitch, state: bool },
    StatusAndGroup { switch: StatusAndGroupSwitch, state: bool },
    Transport { switch: TransportSwitch, state: bool },
    Window { switch: WindowSwitch, state: bool },
    UndefinedSwitch { zone: U7, port: U4, state: bool },
    VPotRotation { vpot: VPotId, delta: i8 },
    TimeDisplay([u8; 8]),
    SmallDisplay { strip: u8, text: [u8; 4] },
    LargeDisplaySlice { index: u8, text: [u8; 10] },
    SelectAssignDisplay([u8; 4]),
}

/// The result of applying one message to the model.
#[derive(Clone, Debug, PartialEq)]
pub struct UpdateResult {
    /// Whether any state actually changed. An idempotent write still notifies, with
    /// `changed = false`, so observers can distinguish confirmation from change.
    pub changed: bool,
    pub notification: SurfaceNotification,
}

/// An aggregate of every controllable element on a HUI surface. Applying a decoded message
/// mutates exactly one slot. The host periodically replays its whole state onto the surface
/// to heal drift; because updates are idempotent, the replay is harmless.
#[derive(Clone, Debug, Default)]
pub struct SurfaceModel {
    strips: [ChannelStripState; 8],
    /// States for every non-strip switch, keyed by wire address.
    switches: HashMap<(u8, u8), bool>,
    time_display: [u8; 8],
    small_displays: [[u8; 4]; 8],
    large_display: [[u8; 10]; 8],
    select_assign: [u8; 4],
}

impl SurfaceModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strip(&self, index: usize) -> Option<&ChannelStripState> {
        self.strips.get(index)
    }

    /// The state of any switch, strip or otherwise. Unknown switches that were never written
    /// are off.
    pub fn switch_state(&self, switch: Switch) -> bool {
        match switch {
            Switch::ChannelStrip { strip, control } => {
                let strip = match self.strips.get(strip as usize) {
                    Some(strip) => strip,
                    None => return false,
                };
                match control {
                    StripControl::FaderTouch => strip.fader_touched,
                    StripControl::Select => strip.select,
                    StripControl::Mute => strip.mute,
                    StripControl::Solo => strip.solo,
                    StripControl::Auto => strip.auto,
                    StripControl::VSel => strip.vsel,
                    StripControl::Insert => strip.insert,
                    StripControl::RecordReady => strip.record_ready,
                }
            }
            other => {
                let (zone, port) = other.address();
                *self
                    .switches
                    .get(&(zone.get(), port.get()))
                    .unwrap_or(&false)
            }
        }
    }

    /// The time display contents, rightmost digit first.
    pub fn time_display(&self) -> &[u8; 8] {
        &self.time_display
    }

    /// One line of the large display, assembled from its four slices.
    pub fn large_display_line(&self, line: usize) -> [u8; 40] {
        let mut out = [b' '; 40];
        for slice in 0..4 {
            let source = &self.large_display[line.min(1) * 4 + slice];
            out[slice * 10..slice * 10 + 10].copy_from_slice(source);
        }
        out
    }

    pub fn select_assign_display(&self) -> &[u8; 4] {
        &self.select_assign
    }

    /// Apply one decoded message. Exactly one slot changes; the returned notification names
    /// it and carries the new value.
    pub fn apply(&mut self, message: &HuiMessage) -> UpdateResult {
        match message {
            HuiMessage::Ping => UpdateResult {
                changed: false,
                notification: SurfaceNotification::Ping { reply: false },
            },
            HuiMessage::PingReply => UpdateResult {
                changed: false,
                notification: SurfaceNotification::Ping { reply: true },
            },
            HuiMessage::Switch { switch, state } => self.apply_switch(*switch, *state),
            HuiMessage::Fader { strip, value } => {
                let slot = &mut self.strips[strip.get() as usize & 0x7];
                let changed = slot.fader != *value;
                slot.fader = *value;
                UpdateResult {
                    changed,
                    notification: SurfaceNotification::ChannelStrip {
                        strip: strip.get(),
                        element: StripElement::Fader(*value),
                    },
                }
            }
            HuiMessage::VPotRotation { vpot, delta } => UpdateResult {
                // a rotation is a relative input, not a stored state
                changed: *delta != 0,
                notification: SurfaceNotification::VPotRotation {
                    vpot: *vpot,
                    delta: *delta,
                },
            },
            HuiMessage::VPotDisplay { vpot, display } => {
                let strip_ix = match vpot {
                    VPotId::Channel(index) => index.get() as usize,
                    // only the strip pots are modelled; the param-edit ring displays are
                    // transient editor state
                    _ => {
                        return UpdateResult {
                            changed: false,
                            notification: SurfaceNotification::VPotRotation {
                                vpot: *vpot,
                                delta: 0,
                            },
                        }
                    }
                };
                let slot = &mut self.strips[strip_ix & 0x7];
                let changed = slot.vpot_display != *display;
                slot.vpot_display = *display;
                UpdateResult {
                    changed,
                    notification: SurfaceNotification::ChannelStrip {
                        strip: strip_ix as u8,
                        element: StripElement::VPotDisplay(*display),
                    },
                }
            }
            HuiMessage::SmallDisplay { strip, text } => {
                let slot = &mut self.small_displays[strip.get() as usize & 0x7];
                let changed = slot != text;
                *slot = *text;
                UpdateResult {
                    changed,
                    notification: SurfaceNotification::SmallDisplay {
                        strip: strip.get(),
                        text: *text,
                    },
                }
            }
            HuiMessage::TimeDisplay { digits } => {
                let mut new_display = self.time_display;
                for (ix, digit) in digits.iter().take(8).enumerate() {
                    new_display[ix] = *digit;
                }
                let changed = new_display != self.time_display;
                self.time_display = new_display;
                UpdateResult {
                    changed,
                    notification: SurfaceNotification::TimeDisplay(new_display),
                }
            }
            HuiMessage::LargeDisplaySlice { index, text } => {
                let slot = &mut self.large_display[*index as usize & 0x7];
                let changed = slot != text;
                *slot = *text;
                UpdateResult {
                    changed,
                    notification: SurfaceNotification::LargeDisplaySlice {
                        index: *index,
                        text: *text,
                    },
                }
            }
            HuiMessage::SelectAssignDisplay { text } => {
                let changed = self.select_assign != *text;
                self.select_assign = *text;
                UpdateResult {
                    changed,
                    notification: SurfaceNotification::SelectAssignDisplay(*text),
                }
            }
        }
    }

    fn apply_switch(&mut self, switch: Switch, state: bool) -> UpdateResult {
        let changed = match switch {
            Switch::ChannelStrip { strip, control } => {
                let slot = &mut self.strips[strip as usize & 0x7];
                let target = match control {
                    StripControl::FaderTouch => &mut slot.fader_touched,
                    StripControl::Select => &mut slot.select,
                    StripControl::Mute => &mut slot.mute,
                    StripControl::Solo => &mut slot.solo,
                    StripControl::Auto => &mut slot.auto,
                    StripControl::VSel => &mut slot.vsel,
                    StripControl::Insert => &mut slot.insert,
                    StripControl::RecordReady => &mut slot.record_ready,
                };
                let changed = *target != state;
                *target = state;
                changed
            }
            other => {
                let (zone, port) = other.address();
                let slot = self.switches.entry((zone.get(), port.get())).or_insert(false);
                let changed = *slot != state;
                *slot = state;
                changed
            }
        };
        UpdateResult {
            changed,
            notification: Self::switch_notification(switch, state),
        }
    }

    fn switch_notification(switch: Switch, state: bool) -> SurfaceNotification {
        match switch {
            Switch::ChannelStrip { strip, control } => {
                let element = match control {
                    StripControl::FaderTouch => StripElement::FaderTouch(state),
                    StripControl::Select => StripElement::Select(state),
                    StripControl::Mute => StripElement::Mute(state),
                    StripControl::Solo => StripElement::Solo(state),
                    StripControl::Auto => StripElement::Auto(state),
                    StripControl::VSel => StripElement::VSel(state),
                    StripControl::Insert => StripElement::Insert(state),
                    StripControl::RecordReady => StripElement::RecordReady(state),
                };
                SurfaceNotification::ChannelStrip { strip, element }
            }
            Switch::Assign(switch) => SurfaceNotification::Assign { switch, state },
            Switch::AutoEnable(switch) => SurfaceNotification::AutoEnable { switch, state },
            Switch::AutoMode(switch) => SurfaceNotification::AutoMode { switch, state },
            Switch::BankMove(switch) => SurfaceNotification::BankMove { switch, state },
            Switch::ControlRoom(switch) => SurfaceNotification::ControlRoom { switch, state },
            Switch::Cursor(switch) => SurfaceNotification::Cursor { switch, state },
            Switch::Edit(switch) => SurfaceNotification::Edit { switch, state },
            Switch::FunctionKey(switch) => SurfaceNotification::FunctionKey { switch, state },
            Switch::HotKey(switch) => SurfaceNotification::HotKey { switch, state },
            Switch::NumPad(switch) => SurfaceNotification::NumPad { switch, state },
            Switch::ParamEdit(switch) => SurfaceNotification::ParamEdit { switch, state },
            Switch::StatusAndGroup(switch) => {
                SurfaceNotification::StatusAndGroup { switch, state }
            }
            Switch::Transport(switch) => SurfaceNotification::Transport { switch, state },
            Switch::Window(switch) => SurfaceNotification::Window { switch, state },
            Switch::Undefined { zone, port } => SurfaceNotification::UndefinedSwitch {
                zone,
                port,
                state,
            },
        }
    }
}

/// Tracks ping liveness on either end of the link. The host pings once a second; a peer that
/// has been silent for the timeout is considered absent. All times are caller-supplied
/// microseconds from any monotonic origin; the codec itself never reads a clock.
#[derive(Clone, Debug)]
pub struct PingMonitor {
    interval_micros: u64,
    timeout_micros: u64,
    last_sent: Option<u64>,
    last_heard: Option<u64>,
}

impl Default for PingMonitor {
    fn default() -> Self {
        Self::new(1_000_000, 3_000_000)
    }
}

impl PingMonitor {
    pub fn new(interval_micros: u64, timeout_micros: u64) -> Self {
        Self {
            interval_micros,
            timeout_micros,
            last_sent: None,
            last_heard: None,
        }
    }

    /// Whether a ping should be sent now.
    pub fn ping_due(&self, now_micros: u64) -> bool {
        match self.last_sent {
            None => true,
            Some(last) => now_micros.saturating_sub(last) >= self.interval_micros,
        }
    }

    /// Record that a ping was sent.
    pub fn record_sent(&mut self, now_micros: u64) {
        self.last_sent = Some(now_micros);
    }

    /// Record that anything was heard from the peer (a ping reply or ordinary traffic).
    pub fn record_heard(&mut self, now_micros: u64) {
        self.last_heard = Some(now_micros);
    }

    /// Whether the peer has been heard from within the timeout.
    pub fn is_present(&self, now_micros: u64) -> bool {
        match self.last_heard {
            None => false,
            Some(last) => now_micros.saturating_sub(last) <= self.timeout_micros,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hui::vpot::VPotRing;
    use crate::hui::{HuiRole, LedPosition};

    #[test]
    fn switch_update_notifies_and_tracks_change() {
        let mut model = SurfaceModel::new();
        let message = HuiMessage::Switch {
            switch: Switch::ChannelStrip {
                strip: 3,
                control: StripControl::Mute,
            },
            state: true,
        };
        let first = model.apply(&message);
        assert!(first.changed);
        assert_eq!(
            SurfaceNotification::ChannelStrip {
                strip: 3,
                element: StripElement::Mute(true)
            },
            first.notification
        );
        // idempotent write: same notification, changed = false
        let second = model.apply(&message);
        assert!(!second.changed);
        assert_eq!(first.notification, second.notification);
        assert!(model.switch_state(Switch::ChannelStrip {
            strip: 3,
            control: StripControl::Mute
        }));
    }

    #[test]
    fn vpot_display_scenario() {
        let mut model = SurfaceModel::new();
        let message = HuiMessage::VPotDisplay {
            vpot: VPotId::Channel(U4::new(3)),
            display: VPotDisplay::single(0.5),
        };
        let first = model.apply(&message);
        assert!(first.changed);
        match first.notification {
            SurfaceNotification::ChannelStrip {
                strip: 3,
                element: StripElement::VPotDisplay(display),
            } => {
                assert_eq!(VPotRing::Single(LedPosition::CENTER), display.ring);
            }
            other => panic!("unexpected notification {:?}", other),
        }
        let second = model.apply(&message);
        assert!(!second.changed);
    }

    #[test]
    fn full_refresh_is_idempotent() {
        let mut model = SurfaceModel::new();
        let messages = vec![
            HuiMessage::Fader {
                strip: U4::new(0),
                value: U14::new(0x2000),
            },
            HuiMessage::Switch {
                switch: Switch::Transport(crate::hui::TransportSwitch::Main(
                    crate::hui::TransportMainSwitch::Play,
                )),
                state: true,
            },
            HuiMessage::SelectAssignDisplay { text: *b"SND " },
        ];
        for message in &messages {
            model.apply(message);
        }
        let snapshot = model.clone();
        for message in &messages {
            let result = model.apply(message);
            assert!(!result.changed, "replay changed state: {:?}", message);
        }
        assert_eq!(snapshot.select_assign, model.select_assign);
    }

    #[test]
    fn time_display_updates_partially() {
        let mut model = SurfaceModel::new();
        let result = model.apply(&HuiMessage::TimeDisplay {
            digits: vec![9, 8, 7],
        });
        assert!(result.changed);
        assert_eq!([9, 8, 7, 0, 0, 0, 0, 0], *model.time_display());
    }

    #[test]
    fn large_display_lines_assemble() {
        let mut model = SurfaceModel::new();
        model.apply(&HuiMessage::LargeDisplaySlice {
            index: 4,
            text: *b"0123456789",
        });
        let line = model.large_display_line(1);
        assert_eq!(&line[..10], b"0123456789");
        assert!(line[10..].iter().all(|byte| *byte == 0 || *byte == b' '));
    }

    #[test]
    fn ping_monitor_timing() {
        let mut monitor = PingMonitor::default();
        assert!(monitor.ping_due(0));
        monitor.record_sent(0);
        assert!(!monitor.ping_due(500_000));
        assert!(monitor.ping_due(1_000_000));
        assert!(!monitor.is_present(0));
        monitor.record_heard(100);
        assert!(monitor.is_present(3_000_000));
        assert!(!monitor.is_present(3_100_200));
    }

    #[test]
    fn roles_are_symmetric() {
        assert_eq!(HuiRole::Surface, HuiRole::Host.peer());
        assert_eq!(HuiRole::Host, HuiRole::Surface.peer());
    }
}
