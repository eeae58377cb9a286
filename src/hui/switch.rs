/*!
The `switch` module is the HUI zone/port address table. Every pushbutton and touch sensor on
the surface lives at a `(zone, port)` coordinate; the table partitions the coordinates into
the surface's sections. Coordinates outside the table decode to [`Switch::Undefined`] rather
than failing, because surfaces disagree about the rarely used corners of the map.
!*/

use crate::core::{U4, U7};

/// The eight channel strips occupy zones `0x00..=0x07`, one zone per strip.
pub(crate) const ZONE_STRIP_FIRST: u8 = 0x00;
pub(crate) const ZONE_STRIP_LAST: u8 = 0x07;
const ZONE_HOT_KEY: u8 = 0x08;
const ZONE_WINDOW: u8 = 0x09;
const ZONE_BANK_MOVE: u8 = 0x0a;
const ZONE_ASSIGN_SEND: u8 = 0x0b;
const ZONE_ASSIGN_MODE: u8 = 0x0c;
const ZONE_FUNCTION_KEY: u8 = 0x0d;
const ZONE_PARAM_EDIT: u8 = 0x0e;
const ZONE_AUTO_ENABLE: u8 = 0x0f;
const ZONE_AUTO_MODE: u8 = 0x10;
const ZONE_STATUS_AND_GROUP: u8 = 0x11;
const ZONE_EDIT: u8 = 0x12;
const ZONE_NUM_PAD_LOW: u8 = 0x13;
const ZONE_NUM_PAD_HIGH: u8 = 0x14;
const ZONE_TRANSPORT_MAIN: u8 = 0x17;
const ZONE_TRANSPORT_EXTENT: u8 = 0x18;
const ZONE_TRANSPORT_PUNCH: u8 = 0x19;
const ZONE_CURSOR: u8 = 0x1a;
const ZONE_CONTROL_ROOM_INPUT: u8 = 0x1b;
const ZONE_CONTROL_ROOM_OUTPUT: u8 = 0x1c;

/// The per-strip controls, by port within the strip's zone.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum StripControl {
    /// The fader's touch sensor.
    FaderTouch = 0,
    Select = 1,
    Mute = 2,
    Solo = 3,
    Auto = 4,
    VSel = 5,
    Insert = 6,
    RecordReady = 7,
}

macro_rules! section_enum {
    ($(#[$attr:meta])* $name:ident { $($variant:ident = $port:expr),+ $(,)? }) => {
        $(#[$attr])*
        #[repr(u8)]
        #[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
        pub enum $name {
            $($variant = $port),+
        }

        impl $name {
            pub(crate) fn from_port(port: u8) -> Option<Self> {
                match port {
                    $($port => Some($name::$variant),)+
                    _ => None,
                }
            }

            pub(crate) fn port(&self) -> u8 {
                *self as u8
            }
        }
    };
}

impl StripControl {
    pub(crate) fn from_port(port: u8) -> Option<Self> {
        match port {
            0 => Some(StripControl::FaderTouch),
            1 => Some(StripControl::Select),
            2 => Some(StripControl::Mute),
            3 => Some(StripControl::Solo),
            4 => Some(StripControl::Auto),
            5 => Some(StripControl::VSel),
            6 => Some(StripControl::Insert),
            7 => Some(StripControl::RecordReady),
            _ => None,
        }
    }

    pub(crate) fn port(&self) -> u8 {
        *self as u8
    }
}

section_enum!(
    /// Keyboard-shortcut keys.
    HotKeySwitch {
        Ctrl = 0,
        Shift = 1,
        EditMode = 2,
        Undo = 3,
        Cmd = 4,
        Option = 5,
        EditTool = 6,
        Save = 7,
    }
);

section_enum!(
    /// Window-management keys.
    WindowSwitch {
        Mix = 0,
        Edit = 1,
        Transport = 2,
        MemLoc = 3,
        Status = 4,
        Alt = 5,
    }
);

section_enum!(
    /// Channel/bank navigation.
    BankMoveSwitch {
        ChannelLeft = 0,
        BankLeft = 1,
        ChannelRight = 2,
        BankRight = 3,
    }
);

section_enum!(
    /// The send/IO assignment row. `SendA` through `SendE` select sends; the mode keys in the
    /// second assign zone control how the assignment is applied.
    AssignSendSwitch {
        Output = 0,
        Input = 1,
        Pan = 2,
        SendE = 3,
        SendD = 4,
        SendC = 5,
        SendB = 6,
        SendA = 7,
    }
);

section_enum!(
    AssignModeSwitch {
        Assign = 0,
        Default = 1,
        Suspend = 2,
        Mute = 3,
        Bypass = 4,
        RecordReadyAll = 5,
    }
);

/// The assignment section spans two zones: send selection and mode keys.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum AssignSwitch {
    Send(AssignSendSwitch),
    Mode(AssignModeSwitch),
}

section_enum!(
    FunctionKeySwitch {
        F1 = 0,
        F2 = 1,
        F3 = 2,
        F4 = 3,
        F5 = 4,
        F6 = 5,
        F7 = 6,
        F8 = 7,
    }
);

section_enum!(
    /// The DSP/plug-in parameter edit section.
    ParamEditSwitch {
        Assign = 0,
        Compare = 1,
        Bypass = 2,
        Select1 = 3,
        Select2 = 4,
        Select3 = 5,
        Select4 = 6,
        InsertOrParam = 7,
    }
);

section_enum!(
    /// Which automation lanes are armed.
    AutoEnableSwitch {
        Fader = 0,
        Pan = 1,
        Plugin = 2,
        Mute = 3,
        Send = 4,
        SendMute = 5,
    }
);

section_enum!(
    AutoModeSwitch {
        Read = 0,
        Latch = 1,
        Trim = 2,
        Touch = 3,
        Write = 4,
        Off = 5,
    }
);

section_enum!(
    StatusAndGroupSwitch {
        Auto = 0,
        Monitor = 1,
        Phase = 2,
        Group = 3,
        Create = 4,
        Suspend = 5,
    }
);

section_enum!(
    EditSwitch {
        Capture = 0,
        Cut = 1,
        Paste = 2,
        Separate = 3,
        Copy = 4,
        Delete = 5,
    }
);

section_enum!(
    NumPadLowSwitch {
        Num0 = 0,
        Num1 = 1,
        Num4 = 2,
        Num2 = 3,
        Num5 = 4,
        Dot = 5,
        Num3 = 6,
        Num6 = 7,
    }
);

section_enum!(
    NumPadHighSwitch {
        Enter = 0,
        Plus = 1,
        Num7 = 2,
        Num8 = 3,
        Num9 = 4,
        Minus = 5,
        Clr = 6,
        Equals = 7,
    }
);

/// The numeric keypad spans two zones.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum NumPadSwitch {
    Low(NumPadLowSwitch),
    High(NumPadHighSwitch),
}

section_enum!(
    TransportMainSwitch {
        Talkback = 0,
        Rewind = 1,
        FastForward = 2,
        Stop = 3,
        Play = 4,
        Record = 5,
    }
);

section_enum!(
    TransportExtentSwitch {
        ReturnToZero = 0,
        ToEnd = 1,
        OnLine = 2,
        Loop = 3,
        QuickPunch = 4,
    }
);

section_enum!(
    TransportPunchSwitch {
        Audition = 0,
        Pre = 1,
        In = 2,
        Out = 3,
        Post = 4,
    }
);

/// The transport section spans three zones.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum TransportSwitch {
    Main(TransportMainSwitch),
    Extent(TransportExtentSwitch),
    Punch(TransportPunchSwitch),
}

section_enum!(
    CursorSwitch {
        Down = 0,
        Left = 1,
        Mode = 2,
        Right = 3,
        Up = 4,
        Scrub = 5,
        Shuttle = 6,
    }
);

section_enum!(
    ControlRoomInputSwitch {
        Input3 = 0,
        Input2 = 1,
        Input1 = 2,
        Mute = 3,
        Discrete = 4,
    }
);

section_enum!(
    ControlRoomOutputSwitch {
        Output3 = 0,
        Output2 = 1,
        Output1 = 2,
        Dim = 3,
        Mono = 4,
    }
);

/// The control-room monitoring section spans two zones.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum ControlRoomSwitch {
    Input(ControlRoomInputSwitch),
    Output(ControlRoomOutputSwitch),
}

/// Any addressable switch on the surface.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Switch {
    ChannelStrip { strip: u8, control: StripControl },
    HotKey(HotKeySwitch),
    Window(WindowSwitch),
    BankMove(BankMoveSwitch),
    Assign(AssignSwitch),
    FunctionKey(FunctionKeySwitch),
    ParamEdit(ParamEditSwitch),
    AutoEnable(AutoEnableSwitch),
    AutoMode(AutoModeSwitch),
    StatusAndGroup(StatusAndGroupSwitch),
    Edit(EditSwitch),
    NumPad(NumPadSwitch),
    Transport(TransportSwitch),
    Cursor(CursorSwitch),
    ControlRoom(ControlRoomSwitch),
    /// A coordinate outside the table. Tolerated, never an error.
    Undefined { zone: U7, port: U4 },
}

impl Switch {
    /// Resolve a wire coordinate. Total: unknown coordinates come back as
    /// [`Switch::Undefined`].
    pub fn lookup(zone: u8, port: u8) -> Switch {
        let resolved = match zone {
            ZONE_STRIP_FIRST..=ZONE_STRIP_LAST => {
                StripControl::from_port(port).map(|control| Switch::ChannelStrip {
                    strip: zone,
                    control,
                })
            }
            ZONE_HOT_KEY => HotKeySwitch::from_port(port).map(Switch::HotKey),
            ZONE_WINDOW => WindowSwitch::from_port(port).map(Switch::Window),
            ZONE_BANK_MOVE => BankMoveSwitch::from_port(port).map(Switch::BankMove),
            ZONE_ASSIGN_SEND => AssignSendSwitch::from_port(port)
                .map(|switch| Switch::Assign(AssignSwitch::Send(switch))),
            ZONE_ASSIGN_MODE => AssignModeSwitch::from_port(port)
                .map(|switch| Switch::Assign(AssignSwitch::Mode(switch))),
            ZONE_FUNCTION_KEY => FunctionKeySwitch::from_port(port).map(Switch::FunctionKey),
            ZONE_PARAM_EDIT => ParamEditSwitch::from_port(port).map(Switch::ParamEdit),
            ZONE_AUTO_ENABLE => AutoEnableSwitch::from_port(port).map(Switch::AutoEnable),
            ZONE_AUTO_MODE => AutoModeSwitch::from_port(port).map(Switch::AutoMode),
            ZONE_STATUS_AND_GROUP => {
                StatusAndGroupSwitch::from_port(port).map(Switch::StatusAndGroup)
            }
            ZONE_EDIT => EditSwitch::from_port(port).map(Switch::Edit),
            ZONE_NUM_PAD_LOW => NumPadLowSwitch::from_port(port)
                .map(|switch| Switch::NumPad(NumPadSwitch::Low(switch))),
            ZONE_NUM_PAD_HIGH => NumPadHighSwitch::from_port(port)
                .map(|switch| Switch::NumPad(NumPadSwitch::High(switch))),
            ZONE_TRANSPORT_MAIN => TransportMainSwitch::from_port(port)
                .map(|switch| Switch::Transport(TransportSwitch::Main(switch))),
            ZONE_TRANSPORT_EXTENT => TransportExtentSwitch::from_port(port)
                .map(|switch| Switch::Transport(TransportSwitch::Extent(switch))),
            ZONE_TRANSPORT_PUNCH => TransportPunchSwitch::from_port(port)
                .map(|switch| Switch::Transport(TransportSwitch::Punch(switch))),
            ZONE_CURSOR => CursorSwitch::from_port(port).map(Switch::Cursor),
            ZONE_CONTROL_ROOM_INPUT => ControlRoomInputSwitch::from_port(port)
                .map(|switch| Switch::ControlRoom(ControlRoomSwitch::Input(switch))),
            ZONE_CONTROL_ROOM_OUTPUT => ControlRoomOutputSwitch::from_port(port)
                .map(|switch| Switch::ControlRoom(ControlRoomSwitch::Output(switch))),
            _ => None,
        };
        resolved.unwrap_or(Switch::Undefined {
            zone: U7::new_truncating(zone),
            port: U4::new_truncating(port),
        })
    }

    /// The wire coordinate of this switch.
    pub fn address(&self) -> (U7, U4) {
        let (zone, port) = match self {
            Switch::ChannelStrip { strip, control } => (*strip, control.port()),
            Switch::HotKey(switch) => (ZONE_HOT_KEY, switch.port()),
            Switch::Window(switch) => (ZONE_WINDOW, switch.port()),
            Switch::BankMove(switch) => (ZONE_BANK_MOVE, switch.port()),
            Switch::Assign(AssignSwitch::Send(switch)) => (ZONE_ASSIGN_SEND, switch.port()),
            Switch::Assign(AssignSwitch::Mode(switch)) => (ZONE_ASSIGN_MODE, switch.port()),
            Switch::FunctionKey(switch) => (ZONE_FUNCTION_KEY, switch.port()),
            Switch::ParamEdit(switch) => (ZONE_PARAM_EDIT, switch.port()),
            Switch::AutoEnable(switch) => (ZONE_AUTO_ENABLE, switch.port()),
            Switch::AutoMode(switch) => (ZONE_AUTO_MODE, switch.port()),
            Switch::StatusAndGroup(switch) => (ZONE_STATUS_AND_GROUP, switch.port()),
            Switch::Edit(switch) => (ZONE_EDIT, switch.port()),
            Switch::NumPad(NumPadSwitch::Low(switch)) => (ZONE_NUM_PAD_LOW, switch.port()),
            Switch::NumPad(NumPadSwitch::High(switch)) => (ZONE_NUM_PAD_HIGH, switch.port()),
            Switch::Transport(TransportSwitch::Main(switch)) => {
                (ZONE_TRANSPORT_MAIN, switch.port())
            }
            Switch::Transport(TransportSwitch::Extent(switch)) => {
                (ZONE_TRANSPORT_EXTENT, switch.port())
            }
            Switch::Transport(TransportSwitch::Punch(switch)) => {
                (ZONE_TRANSPORT_PUNCH, switch.port())
            }
            Switch::Cursor(switch) => (ZONE_CURSOR, switch.port()),
            Switch::ControlRoom(ControlRoomSwitch::Input(switch)) => {
                (ZONE_CONTROL_ROOM_INPUT, switch.port())
            }
            Switch::ControlRoom(ControlRoomSwitch::Output(switch)) => {
                (ZONE_CONTROL_ROOM_OUTPUT, switch.port())
            }
            Switch::Undefined { zone, port } => return (*zone, *port),
        };
        (U7::new(zone), U4::new(port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_and_address_are_inverse() {
        for zone in 0u8..=0x20 {
            for port in 0u8..=0x0f {
                let switch = Switch::lookup(zone, port);
                let (z, p) = switch.address();
                assert_eq!(zone, z.get(), "zone {:#x} port {:#x}", zone, port);
                assert_eq!(port, p.get(), "zone {:#x} port {:#x}", zone, port);
            }
        }
    }

    #[test]
    fn known_switches() {
        assert_eq!(
            Switch::ChannelStrip {
                strip: 3,
                control: StripControl::Mute
            },
            Switch::lookup(0x03, 2)
        );
        assert_eq!(
            Switch::Transport(TransportSwitch::Main(TransportMainSwitch::Play)),
            Switch::lookup(0x17, 4)
        );
        assert!(matches!(
            Switch::lookup(0x30, 0),
            Switch::Undefined { .. }
        ));
    }
}
