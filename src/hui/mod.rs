/*!
The `hui` module is a codec for the HUI control-surface protocol, which rides on MIDI 1.0
channel voice and system exclusive messages. Switches are addressed by `(zone, port)`
coordinates selected by one controller message and actuated by a second; faders are
per-channel pitch bend; V-Pot rotations and LED rings share a controller range with
sign/magnitude and mode/index encodings; the four text displays are driven over system
exclusive.

The protocol is bidirectional and asymmetric: the host and the surface use different
controller numbers for switch addressing, and V-Pot controllers mean "rotation delta" inbound
to the host but "ring display" outbound. Encode with your own role; decode with your own role
(the decoder then interprets traffic as coming from the peer).
!*/

mod surface;
mod switch;
mod vpot;

pub use surface::{
    ChannelStripState, PingMonitor, StripElement, SurfaceModel, SurfaceNotification, UpdateResult,
};
pub use switch::{
    AssignModeSwitch, AssignSendSwitch, AssignSwitch, AutoEnableSwitch, AutoModeSwitch,
    BankMoveSwitch, ControlRoomInputSwitch, ControlRoomOutputSwitch, ControlRoomSwitch,
    CursorSwitch, EditSwitch, FunctionKeySwitch, HotKeySwitch, NumPadHighSwitch, NumPadLowSwitch,
    NumPadSwitch, ParamEditSwitch, StatusAndGroupSwitch, StripControl, Switch,
    TransportExtentSwitch, TransportMainSwitch, TransportPunchSwitch, TransportSwitch,
    WindowSwitch,
};
pub use vpot::{decode_delta, encode_delta, LedPosition, VPotDisplay, VPotId, VPotRing};

use crate::core::{
    BendValue, ChanValue, Controller, Event, ManufacturerId, SysEx7, Velocity, U14, U4, U7,
};
use crate::error::LibResult;
use log::warn;

/// The HUI ping note number (note on, channel 1).
const PING_NOTE: u8 = 0x00;

/// The zone-select and port/state controllers, host side and surface side.
const CC_ZONE_SELECT_HOST: u8 = 0x0c;
const CC_ZONE_SELECT_SURFACE: u8 = 0x0f;
const CC_PORT_HOST: u8 = 0x2c;
const CC_PORT_SURFACE: u8 = 0x2f;

/// The switch "on" bit within a port/state value.
const PORT_STATE_BIT: u8 = 0x40;

/// The thirteen V-Pot controllers, `0x10..=0x1c`.
const CC_VPOT_FIRST: u8 = 0x10;
const CC_VPOT_LAST: u8 = 0x1c;

/// The system exclusive header that follows the Mackie manufacturer ID: HUI device, revision.
const HUI_SYSEX_DEVICE: u8 = 0x05;
const HUI_SYSEX_REVISION: u8 = 0x00;

const SUBID_SMALL_DISPLAY: u8 = 0x10;
const SUBID_TIME_DISPLAY: u8 = 0x11;
const SUBID_LARGE_DISPLAY: u8 = 0x12;
const SUBID_SELECT_ASSIGN_DISPLAY: u8 = 0x13;

/// Which end of the link we are.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum HuiRole {
    Host,
    Surface,
}

impl HuiRole {
    fn peer(&self) -> HuiRole {
        match self {
            HuiRole::Host => HuiRole::Surface,
            HuiRole::Surface => HuiRole::Host,
        }
    }

    fn zone_select_cc(&self) -> u8 {
        match self {
            HuiRole::Host => CC_ZONE_SELECT_HOST,
            HuiRole::Surface => CC_ZONE_SELECT_SURFACE,
        }
    }

    fn port_cc(&self) -> u8 {
        match self {
            HuiRole::Host => CC_PORT_HOST,
            HuiRole::Surface => CC_PORT_SURFACE,
        }
    }
}

/// One decoded HUI message.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum HuiMessage {
    /// The host's periodic presence ping.
    Ping,
    /// The surface's reply (also sent unsolicited when the surface connects).
    PingReply,
    /// A switch changed state (or its LED is being commanded, host to surface).
    Switch { switch: Switch, state: bool },
    /// A fader moved, or is being moved. 14-bit position.
    Fader { strip: U4, value: U14 },
    /// A pot was rotated (surface to host).
    VPotRotation { vpot: VPotId, delta: i8 },
    /// A ring display instruction (host to surface).
    VPotDisplay { vpot: VPotId, display: VPotDisplay },
    /// Four characters for one strip's small display.
    SmallDisplay { strip: U4, text: [u8; 4] },
    /// Digits for the time display, rightmost digit first.
    TimeDisplay { digits: Vec<u8> },
    /// Ten characters for one slice of the large 2x40 display. Slices 0-3 are the top line,
    /// 4-7 the bottom line.
    LargeDisplaySlice { index: u8, text: [u8; 10] },
    /// Four characters for the select-assign display.
    SelectAssignDisplay { text: [u8; 4] },
}

/// Encode a message as the MIDI events that carry it, `sender` being the role doing the
/// talking.
pub fn encode(message: &HuiMessage, sender: HuiRole) -> Vec<Event> {
    let group = U4::new(0);
    let channel = U4::new(0);
    match message {
        HuiMessage::Ping => vec![Event::note_on(
            group,
            channel,
            U7::new(PING_NOTE),
            Velocity::Midi1(U7::new(0x00)),
        )],
        HuiMessage::PingReply => vec![Event::note_on(
            group,
            channel,
            U7::new(PING_NOTE),
            Velocity::Midi1(U7::new(0x7f)),
        )],
        HuiMessage::Switch { switch, state } => {
            let (zone, port) = switch.address();
            let state_bit = if *state { PORT_STATE_BIT } else { 0 };
            vec![
                control(sender.zone_select_cc(), zone.get()),
                control(sender.port_cc(), state_bit | port.get()),
            ]
        }
        HuiMessage::Fader { strip, value } => vec![Event::pitch_bend(
            group,
            *strip,
            BendValue::Midi1(*value),
        )],
        HuiMessage::VPotRotation { vpot, delta } => {
            vec![control(CC_VPOT_FIRST + vpot.raw(), encode_delta(*delta))]
        }
        HuiMessage::VPotDisplay { vpot, display } => {
            vec![control(CC_VPOT_FIRST + vpot.raw(), display.encode())]
        }
        HuiMessage::SmallDisplay { strip, text } => {
            let mut payload = vec![SUBID_SMALL_DISPLAY, strip.get()];
            payload.extend(text.iter().map(|byte| byte & 0x7f));
            vec![hui_sysex(payload)]
        }
        HuiMessage::TimeDisplay { digits } => {
            let mut payload = vec![SUBID_TIME_DISPLAY];
            payload.extend(digits.iter().map(|byte| byte & 0x7f));
            vec![hui_sysex(payload)]
        }
        HuiMessage::LargeDisplaySlice { index, text } => {
            let mut payload = vec![SUBID_LARGE_DISPLAY, index & 0x07];
            payload.extend(text.iter().map(|byte| byte & 0x7f));
            vec![hui_sysex(payload)]
        }
        HuiMessage::SelectAssignDisplay { text } => {
            let mut payload = vec![SUBID_SELECT_ASSIGN_DISPLAY];
            payload.extend(text.iter().map(|byte| byte & 0x7f));
            vec![hui_sysex(payload)]
        }
    }
}

fn control(controller: u8, value: u8) -> Event {
    Event::control_change(
        U4::new(0),
        U4::new(0),
        Controller::from_u7(U7::new_truncating(controller)),
        ChanValue::Midi1(U7::new_truncating(value)),
    )
}

fn hui_sysex(data: Vec<u8>) -> Event {
    let mut payload = vec![HUI_SYSEX_DEVICE, HUI_SYSEX_REVISION];
    payload.extend(data);
    Event::SysEx7(SysEx7 {
        group: U4::new(0),
        manufacturer: mackie(),
        data: payload,
    })
}

fn mackie() -> ManufacturerId {
    // infallible: both bytes are 7-bit
    ManufacturerId::extended(0x00, 0x66).expect("mackie manufacturer id")
}

/// A stateful decoder for one direction of a HUI link. Construct it with *your* role; it then
/// interprets incoming events as sent by the peer (a host decoder reads surface messages, and
/// vice versa).
#[derive(Debug)]
pub struct HuiDecoder {
    peer: HuiRole,
    pending_zone: Option<u8>,
}

impl HuiDecoder {
    pub fn new(own_role: HuiRole) -> Self {
        Self {
            peer: own_role.peer(),
            pending_zone: None,
        }
    }

    /// Feed one MIDI event. Returns a message when the event (with any pending zone select)
    /// completes one. Events that are not HUI traffic are ignored.
    pub fn feed(&mut self, event: &Event) -> crate::Result<Option<HuiMessage>> {
        Ok(self.feed_inner(event)?)
    }

    fn feed_inner(&mut self, event: &Event) -> LibResult<Option<HuiMessage>> {
        match event {
            Event::NoteOn(note) | Event::NoteOff(note) => {
                if note.note.get() != PING_NOTE || note.channel.get() != 0 {
                    return Ok(None);
                }
                Ok(Some(if note.velocity.midi1().get() == 0 {
                    HuiMessage::Ping
                } else {
                    HuiMessage::PingReply
                }))
            }
            Event::ControlChange(cc) => {
                if cc.channel.get() != 0 {
                    return Ok(None);
                }
                self.feed_control(cc.controller.to_u8(), cc.value.midi1().get())
            }
            Event::PitchBend(bend) => {
                if bend.channel.get() > 7 {
                    return Ok(None);
                }
                Ok(Some(HuiMessage::Fader {
                    strip: bend.channel,
                    value: bend.value.midi1(),
                }))
            }
            Event::SysEx7(sysex) => self.feed_sysex(sysex),
            _ => Ok(None),
        }
    }

    fn feed_control(&mut self, controller: u8, value: u8) -> LibResult<Option<HuiMessage>> {
        if controller == self.peer.zone_select_cc() {
            self.pending_zone = Some(value);
            return Ok(None);
        }
        if controller == self.peer.port_cc() {
            let zone = match self.pending_zone.take() {
                Some(zone) => zone,
                None => {
                    warn!("port/state value {:#04x} with no zone selected", value);
                    return Ok(None);
                }
            };
            let port = value & 0x0f;
            let state = value & PORT_STATE_BIT != 0;
            return Ok(Some(HuiMessage::Switch {
                switch: Switch::lookup(zone, port),
                state,
            }));
        }
        if (CC_VPOT_FIRST..=CC_VPOT_LAST).contains(&controller) {
            let vpot = match VPotId::from_raw(controller - CC_VPOT_FIRST) {
                Some(vpot) => vpot,
                None => return Ok(None),
            };
            return Ok(Some(match self.peer {
                // the surface reports rotations; the host commands ring displays
                HuiRole::Surface => HuiMessage::VPotRotation {
                    vpot,
                    delta: decode_delta(value),
                },
                HuiRole::Host => HuiMessage::VPotDisplay {
                    vpot,
                    display: VPotDisplay::decode(value),
                },
            }));
        }
        Ok(None)
    }

    fn feed_sysex(&mut self, sysex: &SysEx7) -> LibResult<Option<HuiMessage>> {
        if sysex.manufacturer != mackie() {
            return Ok(None);
        }
        let data = &sysex.data;
        if data.len() < 2 || data[0] != HUI_SYSEX_DEVICE || data[1] != HUI_SYSEX_REVISION {
            return Ok(None);
        }
        let body = &data[2..];
        let sub_id = match body.first() {
            Some(sub_id) => *sub_id,
            None => malformed!(0u64, "hui sysex with no sub id"),
        };
        let payload = &body[1..];
        match sub_id {
            SUBID_SMALL_DISPLAY => {
                if payload.len() != 5 || payload[0] > 7 {
                    malformed!(0u64, "bad small display payload, {} bytes", payload.len());
                }
                let mut text = [0u8; 4];
                text.copy_from_slice(&payload[1..5]);
                Ok(Some(HuiMessage::SmallDisplay {
                    strip: U4::new(payload[0]),
                    text,
                }))
            }
            SUBID_TIME_DISPLAY => {
                if payload.is_empty() || payload.len() > 8 {
                    malformed!(0u64, "bad time display payload, {} bytes", payload.len());
                }
                Ok(Some(HuiMessage::TimeDisplay {
                    digits: payload.to_vec(),
                }))
            }
            SUBID_LARGE_DISPLAY => {
                if payload.len() != 11 || payload[0] > 7 {
                    malformed!(0u64, "bad large display payload, {} bytes", payload.len());
                }
                let mut text = [0u8; 10];
                text.copy_from_slice(&payload[1..11]);
                Ok(Some(HuiMessage::LargeDisplaySlice {
                    index: payload[0],
                    text,
                }))
            }
            SUBID_SELECT_ASSIGN_DISPLAY => {
                if payload.len() != 4 {
                    malformed!(
                        0u64,
                        "bad select assign display payload, {} bytes",
                        payload.len()
                    );
                }
                let mut text = [0u8; 4];
                text.copy_from_slice(payload);
                Ok(Some(HuiMessage::SelectAssignDisplay { text }))
            }
            _ => malformed!(0u64, "unknown hui sysex sub id {:#04x}", sub_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(message: HuiMessage, sender: HuiRole) -> HuiMessage {
        let events = encode(&message, sender);
        let mut decoder = HuiDecoder::new(sender.peer());
        let mut decoded = None;
        for event in &events {
            if let Some(message) = decoder.feed(event).unwrap() {
                assert!(decoded.is_none(), "more than one message decoded");
                decoded = Some(message);
            }
        }
        decoded.expect("no message decoded")
    }

    #[test]
    fn ping_round_trip() {
        assert_eq!(HuiMessage::Ping, round_trip(HuiMessage::Ping, HuiRole::Host));
        assert_eq!(
            HuiMessage::PingReply,
            round_trip(HuiMessage::PingReply, HuiRole::Surface)
        );
    }

    #[test]
    fn switch_round_trip_both_directions() {
        let message = HuiMessage::Switch {
            switch: Switch::Transport(TransportSwitch::Main(TransportMainSwitch::Play)),
            state: true,
        };
        assert_eq!(message, round_trip(message.clone(), HuiRole::Host));
        assert_eq!(message, round_trip(message.clone(), HuiRole::Surface));
    }

    #[test]
    fn unknown_switch_coordinates_are_tolerated() {
        let message = HuiMessage::Switch {
            switch: Switch::Undefined {
                zone: U7::new(0x55),
                port: U4::new(0x9),
            },
            state: false,
        };
        assert_eq!(message, round_trip(message.clone(), HuiRole::Surface));
    }

    #[test]
    fn vpot_direction_depends_on_sender() {
        let rotation = HuiMessage::VPotRotation {
            vpot: VPotId::Channel(U4::new(2)),
            delta: -3,
        };
        assert_eq!(rotation, round_trip(rotation.clone(), HuiRole::Surface));

        let display = HuiMessage::VPotDisplay {
            vpot: VPotId::Channel(U4::new(2)),
            display: VPotDisplay::single(0.5),
        };
        assert_eq!(display, round_trip(display.clone(), HuiRole::Host));
    }

    #[test]
    fn fader_round_trip() {
        let message = HuiMessage::Fader {
            strip: U4::new(3),
            value: U14::new(0x1234),
        };
        assert_eq!(message, round_trip(message.clone(), HuiRole::Host));
    }

    #[test]
    fn displays_round_trip() {
        let samples = vec![
            HuiMessage::SmallDisplay {
                strip: U4::new(2),
                text: *b"Gtr1",
            },
            HuiMessage::TimeDisplay {
                digits: vec![0x01, 0x02, 0x03],
            },
            HuiMessage::LargeDisplaySlice {
                index: 5,
                text: *b"HELLO WRLD",
            },
            HuiMessage::SelectAssignDisplay { text: *b"PAN " },
        ];
        for message in samples {
            assert_eq!(message, round_trip(message.clone(), HuiRole::Host));
        }
    }

    #[test]
    fn bad_sysex_sub_id_is_malformed() {
        let mut decoder = HuiDecoder::new(HuiRole::Surface);
        let event = hui_sysex(vec![0x7b]);
        let err = decoder.feed(&event).unwrap_err();
        assert_eq!(crate::ErrorKind::Malformed, err.kind());
    }

    #[test]
    fn foreign_sysex_is_ignored() {
        let mut decoder = HuiDecoder::new(HuiRole::Host);
        let event = Event::SysEx7(SysEx7 {
            group: U4::new(0),
            manufacturer: ManufacturerId::standard(0x41).unwrap(),
            data: vec![0x01, 0x02],
        });
        assert_eq!(None, decoder.feed(&event).unwrap());
    }

    #[test]
    fn port_without_zone_is_ignored() {
        let mut decoder = HuiDecoder::new(HuiRole::Host);
        let event = control(CC_PORT_SURFACE, 0x42);
        assert_eq!(None, decoder.feed(&event).unwrap());
    }
}
