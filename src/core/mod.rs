/*!
The `core` module is for types and concepts that are *not* strictly related to any one wire
format. These types flow through the MIDI 1.0 byte codec, the UMP codec and the file layer
alike.
!*/

mod controller;
mod event;
mod manufacturer;
mod note;
mod numbers;
mod status_type;
mod value;

pub use controller::Controller;
pub use event::{
    ChannelPressure, ControlChange, DataBytes, Event, EventKind, JrTime, NoteAttribute, NoteCc,
    NoteManagement, NoteMessage, NotePitchBend, NotePressure, Nrpn, ParameterChange,
    PerNoteController, PitchBend, ProgramChange, Rpn, SongPositionPointer, SongSelect, SysEx7,
    SysEx8, TimecodeQuarterFrame, UniversalKind, UniversalSysEx7, UniversalSysEx8,
    UnrecognizedPacket,
};
pub use manufacturer::ManufacturerId;
pub use note::{note_name, note_number};
pub use numbers::{scale_down, scale_up, U14, U16, U25, U32, U4, U7};
pub use value::{BendValue, ChanValue, ParamValue, Velocity};

pub(crate) use manufacturer::{UNIVERSAL_NON_REAL_TIME, UNIVERSAL_REAL_TIME};
pub(crate) use status_type::StatusType;
