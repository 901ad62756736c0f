use std::io::{self, Seek, SeekFrom, Write};

use super::event::{self, MidiEvent};
use super::{MidiFile, MidiTrack};
use crate::midi::event::controllers;

#[doc = r#"
Serializer from a [`MidiFile`] back to Standard MIDI File bytes.

Each track chunk is written with a placeholder length that is patched by
seeking back once the body size is known. Running status is re-derived
while writing (meta and sysex events reset it, matching the reader's
constraint) unless the file's
[`no_running_status`](MidiFile::no_running_status) flag forces explicit
status bytes.

Tracks without an assigned output channel are written as a chunk header
plus End-Of-Track only. Tombstones and merged notes never reach the wire.
"#]
pub struct MidiFileWriter<'a, W: Write + Seek> {
    out: &'a mut W,
    status: Option<u8>,
    no_running_status: bool,
}

impl<'a, W: Write + Seek> MidiFileWriter<'a, W> {
    /// Borrow a byte sink.
    pub fn new(out: &'a mut W) -> Self {
        Self {
            out,
            status: None,
            no_running_status: false,
        }
    }

    /// Serialize a whole file.
    pub fn write(&mut self, file: &MidiFile) -> io::Result<()> {
        self.no_running_status = file.no_running_status();

        self.out.write_all(&MidiFile::HEADER_CHUNK_TYPE)?;
        self.write_u32(6)?;
        self.write_u16(u16::from(file.format()))?;
        self.write_u16(file.tracks().len() as u16)?;
        self.write_u16(file.division())?;

        for track in file.tracks() {
            self.write_track(track)?;
        }

        Ok(())
    }

    fn write_track(&mut self, track: &MidiTrack) -> io::Result<()> {
        self.out.write_all(&MidiFile::TRACK_CHUNK_TYPE)?;
        let len_pos = self.out.stream_position()?;
        self.write_u32(0)?; // placeholder, patched below

        self.status = None;
        let mut tick = 0u32;
        let mut has_end_of_track = false;

        // tracks with no assigned channel get no body events
        if track.out_channel().is_some() {
            for (next_tick, event) in track.events() {
                if !is_writable(event) {
                    continue;
                }

                self.put_var_len(next_tick - tick)?;
                tick = *next_tick;
                self.write_event(event)?;

                if event.is_end_of_track() {
                    has_end_of_track = true;
                    break;
                }
            }
        }

        if !has_end_of_track {
            self.put_var_len(1)?;
            self.put(event::META)?;
            self.put(event::META_END_OF_TRACK)?;
            self.put_var_len(0)?;
        }

        // patch the chunk length; it excludes the 8-byte chunk header
        let end_pos = self.out.stream_position()?;
        self.out.seek(SeekFrom::Start(len_pos))?;
        self.write_u32((end_pos - len_pos - 4) as u32)?;
        self.out.seek(SeekFrom::Start(end_pos))?;

        Ok(())
    }

    fn write_event(&mut self, midi_event: &MidiEvent) -> io::Result<()> {
        match midi_event {
            MidiEvent::NoteOn {
                channel,
                pitch,
                velocity,
            } => {
                self.write_status(event::NOTE_ON, *channel)?;
                self.put(*pitch)?;
                self.put(*velocity)?;
            }

            MidiEvent::NoteOff {
                channel,
                pitch,
                velocity,
            } => {
                self.write_status(event::NOTE_OFF, *channel)?;
                self.put(*pitch)?;
                self.put(*velocity)?;
            }

            MidiEvent::PitchBend {
                channel,
                data_a,
                data_b,
            } => {
                self.write_status(event::PITCH_BEND, *channel)?;
                self.put(*data_a)?;
                self.put(*data_b)?;
            }

            MidiEvent::Controller {
                channel,
                controller,
                value,
            } => match *controller {
                controllers::PROGRAM => {
                    self.write_status(event::PROGRAM, *channel)?;
                    self.put((*value & 0x7F) as u8)?;
                }
                controllers::PRESS => {
                    self.write_status(event::AFTERTOUCH, *channel)?;
                    self.put((*value & 0x7F) as u8)?;
                }
                _ => {
                    self.write_status(event::CONTROLLER, *channel)?;
                    self.put(*controller as u8)?;
                    self.put((*value & 0x7F) as u8)?;
                }
            },

            MidiEvent::Meta {
                meta_type,
                data,
                len,
            } => {
                self.put(event::META)?;
                self.put(*meta_type)?;
                self.put_var_len(*len as u32)?;
                self.out.write_all(&data[..*len])?;
                self.reset_running_status();
            }

            MidiEvent::SysEx { data, len } => {
                self.put(event::SYSEX)?;
                self.put_var_len(*len as u32 + 1)?; // including 0xf7
                self.out.write_all(&data[..*len])?;
                self.put(event::END_SYSEX)?;
                self.reset_running_status();
            }

            MidiEvent::Note { .. } | MidiEvent::Invalid => {}
        }

        Ok(())
    }

    /// Write the status byte, unless running status makes it redundant.
    fn write_status(&mut self, kind: u8, channel: u8) -> io::Result<()> {
        let status = kind | (channel & 0x0F);

        if self.no_running_status || (status & 0xF0 != 0xF0 && Some(status) != self.status) {
            self.status = Some(status);
            self.put(status)?;
        }

        Ok(())
    }

    fn reset_running_status(&mut self) {
        self.status = None;
    }

    /// Write a variable-length quantity, 7 bits per byte, MSB first.
    fn put_var_len(&mut self, mut value: u32) -> io::Result<()> {
        let mut buf = u64::from(value & 0x7F);
        value >>= 7;
        while value > 0 {
            buf <<= 8;
            buf |= 0x80;
            buf += u64::from(value & 0x7F);
            value >>= 7;
        }

        loop {
            self.put(buf as u8)?;
            if buf & 0x80 != 0 {
                buf >>= 8;
            } else {
                return Ok(());
            }
        }
    }

    fn put(&mut self, byte: u8) -> io::Result<()> {
        self.out.write_all(&[byte])
    }

    fn write_u16(&mut self, value: u16) -> io::Result<()> {
        self.out.write_all(&value.to_be_bytes())
    }

    fn write_u32(&mut self, value: u32) -> io::Result<()> {
        self.out.write_all(&value.to_be_bytes())
    }
}

/// Merged notes and tombstones only exist for import post-processing;
/// they never appear in output.
fn is_writable(midi_event: &MidiEvent) -> bool {
    !matches!(midi_event, MidiEvent::Note { .. } | MidiEvent::Invalid)
}
