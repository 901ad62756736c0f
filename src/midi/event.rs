#![doc = r#"
The tagged representation of a single MIDI, meta or sysex event.

Program change and both aftertouch forms are remapped to pseudo-controller
numbers at parse time (see [`controllers`]), so a channel-voice event is
always one of note on/off, controller or pitch bend. The merged
[`Note`](MidiEvent::Note) kind only exists after
[`merge_note_on_off`](crate::midi::MidiTrack::merge_note_on_off).
"#]

/// Status byte of a Note Off channel message.
pub const NOTE_OFF: u8 = 0x80;
/// Status byte of a Note On channel message.
pub const NOTE_ON: u8 = 0x90;
/// Status byte of a polyphonic aftertouch channel message.
pub const POLY_AFTERTOUCH: u8 = 0xA0;
/// Status byte of a control change channel message.
pub const CONTROLLER: u8 = 0xB0;
/// Status byte of a program change channel message.
pub const PROGRAM: u8 = 0xC0;
/// Status byte of a channel aftertouch message.
pub const AFTERTOUCH: u8 = 0xD0;
/// Status byte of a pitch bend channel message.
pub const PITCH_BEND: u8 = 0xE0;
/// Status byte opening a system exclusive event.
pub const SYSEX: u8 = 0xF0;
/// Sysex terminator, also a valid sysex-event status byte.
pub const END_SYSEX: u8 = 0xF7;
/// Status byte of a meta event.
pub const META: u8 = 0xFF;

/// Meta type of the End-Of-Track event.
pub const META_END_OF_TRACK: u8 = 0x2F;

pub mod controllers {
    //! Controller numbers the codec and post-processing care about.
    //!
    //! Values above 0x7F are pseudo-controllers: channel messages that are
    //! remapped into [`MidiEvent::Controller`](super::MidiEvent::Controller)
    //! on read and restored to their own status bytes on write.

    /// Bank select, high byte.
    pub const HBANK: u32 = 0x00;
    /// Data entry, high byte (RPN/NRPN value).
    pub const HDATA: u32 = 0x06;
    /// Channel volume.
    pub const VOLUME: u32 = 0x07;
    /// Expression.
    pub const EXPRESSION: u32 = 0x0B;
    /// Bank select, low byte.
    pub const LBANK: u32 = 0x20;
    /// Data entry, low byte (RPN/NRPN value).
    pub const LDATA: u32 = 0x26;
    /// Chorus send level.
    pub const CHORUS_SEND: u32 = 0x5D;
    /// Non-registered parameter number, low byte.
    pub const LNRPN: u32 = 0x62;
    /// Non-registered parameter number, high byte.
    pub const HNRPN: u32 = 0x63;
    /// Registered parameter number, low byte.
    pub const LRPN: u32 = 0x64;
    /// Registered parameter number, high byte.
    pub const HRPN: u32 = 0x65;

    /// Pseudo-controller for a remapped program change.
    pub const PROGRAM: u32 = 0x81;
    /// Pseudo-controller for remapped channel aftertouch.
    pub const PRESS: u32 = 0x82;
    /// Pseudo-controller for remapped polyphonic aftertouch.
    pub const POLYAFTER: u32 = 0x83;
}

#[doc = r#"
A single event within a MIDI track.

Channel-voice variants carry their channel (0–15) and data bytes (0–127
each). `Meta` and `SysEx` carry a payload whose significant length is
tracked separately from the stored bytes: meta payloads keep a trailing
NUL appended at parse time for the benefit of string-typed meta events,
and sysex payloads may retain a trailing 0xF7 terminator that `len`
excludes.

`Invalid` is a tombstone used by post-processing to delete an event in
place; it never appears in a reader's or post-processor's output and is
never written.
"#]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MidiEvent {
    /// Note on. A velocity of zero acts as a note off.
    NoteOn { channel: u8, pitch: u8, velocity: u8 },
    /// Note off.
    NoteOff { channel: u8, pitch: u8, velocity: u8 },
    /// Control change, including remapped program change and aftertouch
    /// (see [`controllers`]) and post-processing's folded wide RPN/NRPN
    /// controllers, hence the wide fields.
    Controller { channel: u8, controller: u32, value: u32 },
    /// Pitch bend with its two raw data bytes.
    PitchBend { channel: u8, data_a: u8, data_b: u8 },
    /// Meta event: a type byte plus payload. `len` is the payload length
    /// as read, excluding the trailing NUL stored in `data`.
    Meta { meta_type: u8, data: Vec<u8>, len: usize },
    /// System exclusive event. `len` excludes a trailing 0xF7 terminator
    /// that may still be present in `data`.
    SysEx { data: Vec<u8>, len: usize },
    /// A note with a duration in ticks, merged from a note on/off pair.
    Note { channel: u8, pitch: u8, velocity: u8, duration: u32 },
    /// Tombstone marking a logically deleted event.
    Invalid,
}

impl MidiEvent {
    /// The channel of a channel-voice (or merged note) event.
    pub fn channel(&self) -> Option<u8> {
        match self {
            Self::NoteOn { channel, .. }
            | Self::NoteOff { channel, .. }
            | Self::Controller { channel, .. }
            | Self::PitchBend { channel, .. }
            | Self::Note { channel, .. } => Some(*channel),
            Self::Meta { .. } | Self::SysEx { .. } | Self::Invalid => None,
        }
    }

    /// True for events addressed to a channel.
    pub fn is_channel_event(&self) -> bool {
        self.channel().is_some()
    }

    /// True for the End-Of-Track meta event.
    pub fn is_end_of_track(&self) -> bool {
        matches!(
            self,
            Self::Meta { meta_type, .. } if *meta_type == META_END_OF_TRACK
        )
    }

    /// True for the tombstone marker.
    pub fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid)
    }
}
