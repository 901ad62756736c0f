use std::io::{Read, Seek};

use log::warn;

use super::event::{self, MidiEvent, controllers};
use super::{Division, MidiError, MidiErrorKind, MidiFile, MidiFileFormat, MidiTrack, ReadResult};
use crate::serialization::BinaryReader;

const HEADER_CHUNK_SIZE: u32 = 6;

/// The largest legal variable-length quantity is 0x0FFFFFFF, four bytes.
const VAR_INT_MAX_BYTES: usize = 4;

fn is_status_byte(byte: u8) -> bool {
    byte & 0x80 != 0
}

fn is_data_byte(byte: u8) -> bool {
    !is_status_byte(byte)
}

fn is_channel_status_byte(byte: u8) -> bool {
    is_status_byte(byte) && byte < 0xF0
}

struct ChunkHeader {
    chunk_type: [u8; 4],
    data_size: u32,
}

struct HeaderData {
    format: MidiFileFormat,
    num_tracks: u16,
    division: Division,
}

#[doc = r#"
Single-pass parser from a Standard MIDI File byte stream to a
[`MidiFile`].

The reader is tolerant where real-world files demand it: alien chunks are
skipped by their declared length, a missing End-Of-Track meta only warns,
a data byte with no running status falls back to the last seen channel
status with a warning, and out-of-range data bytes are clamped to 127 in
the contexts where that is provably safe. Everything else fails with a
[`MidiError`] carrying the byte offset.

A reader instance owns its running-status and tick state exclusively; it
is not reentrant, but independent instances over independent sources may
run in parallel.
"#]
pub struct MidiFileReader<'a, R: Read + Seek> {
    input: BinaryReader<'a, R>,
    running_status: Option<u8>,
    backup_running_status: Option<u8>,
    current_ticks: u32,
}

impl<'a, R: Read + Seek> MidiFileReader<'a, R> {
    /// Borrow a byte source positioned at the start of the file.
    pub fn new(device: &'a mut R) -> Self {
        Self {
            input: BinaryReader::new(device),
            running_status: None,
            backup_running_status: None,
            current_ticks: 0,
        }
    }

    /// Parse the whole stream into a [`MidiFile`].
    pub fn read(&mut self) -> ReadResult<MidiFile> {
        // Spec: "A MIDI file always starts with a header chunk, ..."
        let chunk_header = self.read_chunk_header()?;
        let header = self.read_header(&chunk_header)?;

        if header.format == MidiFileFormat::IndependentTracks {
            return Err(self.make_error(MidiErrorKind::UnsupportedFileFormat));
        }

        // Spec: "... and is followed by one or more track chunks."
        let tracks = self.read_tracks(header.num_tracks)?;

        if tracks.is_empty() {
            return Err(self.make_error(MidiErrorKind::NoTracks));
        }

        if tracks.len() != usize::from(header.num_tracks) {
            warn!(
                "file contains {} tracks, but header claims {}",
                tracks.len(),
                header.num_tracks
            );
        }

        let (division, is_division_in_tps) = match header.division {
            Division::TicksPerQuarterNote(ticks) => (ticks, false),
            Division::TicksPerFrame {
                frames_per_second,
                ticks_per_frame,
            } => {
                let division = if frames_per_second == 29 {
                    // nominal drop-frame rate
                    (f64::from(ticks_per_frame) * 29.97).round() as u16
                } else {
                    u16::from(ticks_per_frame) * u16::from(frames_per_second)
                };

                (division, true)
            }
        };

        Ok(MidiFile::new(tracks, header.format, division, is_division_in_tps))
    }

    fn read_chunk_header(&mut self) -> ReadResult<ChunkHeader> {
        let chunk_type = self.input.read_array::<4>()?;
        let data_size = self.input.read_u32_be()?;

        Ok(ChunkHeader { chunk_type, data_size })
    }

    fn read_header(&mut self, chunk_header: &ChunkHeader) -> ReadResult<HeaderData> {
        // Spec: "<Header Chunk> = 'MThd' <length> <format> <ntrks> <division>"

        if chunk_header.chunk_type != MidiFile::HEADER_CHUNK_TYPE {
            return Err(self.make_error(MidiErrorKind::InvalidChunkType));
        }

        if chunk_header.data_size < HEADER_CHUNK_SIZE {
            return Err(self.make_error(MidiErrorKind::InvalidChunkSize));
        }

        let raw_format = self.input.read_u16_be()?;
        let format = MidiFileFormat::try_from(raw_format)
            .map_err(|_| self.make_error(MidiErrorKind::UnsupportedFileFormat))?;

        let num_tracks = self.input.read_u16_be()?;
        let division = Division::from_midi_data(self.input.read_u16_be()?);

        // Spec: "[...] it is important to read and honor the length, even
        //        if it is longer than 6."
        let skipped = self
            .input
            .skip(u64::from(chunk_header.data_size - HEADER_CHUNK_SIZE))?;
        if skipped != 0 {
            warn!("header chunk has more data");
        }

        Ok(HeaderData {
            format,
            num_tracks,
            division,
        })
    }

    fn read_tracks(&mut self, num_tracks: u16) -> ReadResult<Vec<MidiTrack>> {
        let mut tracks = Vec::new();

        'scan: while tracks.len() < usize::from(num_tracks) {
            // Spec: "Your programs should expect alien chunks and treat
            //        them as if they weren't there."
            let mut header = match self.read_chunk_header() {
                Ok(header) => header,
                Err(e) if e.kind() == MidiErrorKind::EndOfFile => break 'scan,
                Err(e) => return Err(e),
            };

            while header.chunk_type != MidiFile::TRACK_CHUNK_TYPE {
                let data_size = u64::from(header.data_size);
                if self.input.skip(data_size)? != data_size {
                    return Err(self.make_error(MidiErrorKind::InvalidChunkSize));
                }

                header = match self.read_chunk_header() {
                    Ok(header) => header,
                    Err(e) if e.kind() == MidiErrorKind::EndOfFile => break 'scan,
                    Err(e) => return Err(e),
                };
            }

            tracks.push(self.read_track(&header)?);
        }

        Ok(tracks)
    }

    fn read_track(&mut self, chunk_header: &ChunkHeader) -> ReadResult<MidiTrack> {
        // Spec: "<Track Chunk> = 'MTrk' <length> <MTrk event>+"

        if chunk_header.chunk_type != MidiFile::TRACK_CHUNK_TYPE {
            return Err(self.make_error(MidiErrorKind::InvalidChunkType));
        }

        self.running_status = None;
        self.backup_running_status = None;
        self.current_ticks = 0;

        let mut track = MidiTrack::default();
        track.set_out_port(Some(0));

        let start_pos = self.input.position()?;
        let end_pos = start_pos + u64::from(chunk_header.data_size);

        let mut has_end_of_track = false;
        while self.input.position()? < end_pos {
            let event = self.read_track_event()?;
            let is_end_of_track = event.is_end_of_track();

            track.insert(self.current_ticks, event);

            if is_end_of_track {
                has_end_of_track = true;
                break;
            }
        }

        // we could have read more bytes than what is part of this chunk
        let bytes_read = self.input.position()? - start_pos;
        if bytes_read > u64::from(chunk_header.data_size) {
            return Err(self.make_error(MidiErrorKind::InvalidChunkSize));
        }

        if !has_end_of_track {
            warn!("missing EndOfTrack meta event");
        }

        // skip unused bytes in the chunk
        if bytes_read < u64::from(chunk_header.data_size) {
            let extra = u64::from(chunk_header.data_size) - bytes_read;
            warn!("track chunk claims to have {extra} additional bytes of data");

            if self.input.skip(extra)? != extra {
                return Err(self.make_error(MidiErrorKind::InvalidChunkSize));
            }
        }

        // Spec: "([...] at least one MTrk event must be present)"
        if track.events().is_empty() {
            return Err(self.make_error(MidiErrorKind::EmptyTrack));
        }

        Ok(track)
    }

    fn read_track_event(&mut self) -> ReadResult<MidiEvent> {
        // Spec: "<MTrk event> = <delta-time> <event>"

        let delta_ticks = self.read_var_int()?;
        self.current_ticks += delta_ticks;

        let first_byte = self.input.read_byte()?;

        if is_data_byte(first_byte) {
            let status = match self.running_status {
                Some(status) => status,
                None => {
                    // we tolerate non-standard running status behaviour
                    let Some(backup) = self.backup_running_status else {
                        return Err(self.make_error(MidiErrorKind::NoRunningStatus));
                    };

                    warn!("no running status, using backup");
                    self.running_status = Some(backup);
                    backup
                }
            };

            return self.read_channel_event(status, first_byte);
        }

        if is_channel_status_byte(first_byte) {
            self.running_status = Some(first_byte);
            self.backup_running_status = Some(first_byte);

            let first_data_byte = self.read_data_byte()?;
            return self.read_channel_event(first_byte, first_data_byte);
        }

        if first_byte == event::META {
            // Spec: "Sysex events and meta-events cancel any running
            //        status which was in effect."
            self.running_status = None;

            return self.read_meta_event();
        }

        if first_byte == event::SYSEX || first_byte == event::END_SYSEX {
            self.running_status = None;

            return self.read_sysex_event();
        }

        Err(self.make_error(MidiErrorKind::InvalidStatusByte))
    }

    fn read_channel_event(&mut self, status: u8, first_data_byte: u8) -> ReadResult<MidiEvent> {
        let kind = status & 0xF0;
        let channel = status & 0x0F;

        if kind == event::PROGRAM {
            return Ok(MidiEvent::Controller {
                channel,
                controller: controllers::PROGRAM,
                value: u32::from(first_data_byte),
            });
        }

        if kind == event::AFTERTOUCH {
            return Ok(MidiEvent::Controller {
                channel,
                controller: controllers::PRESS,
                value: u32::from(first_data_byte),
            });
        }

        let can_safely_clamp = matches!(
            kind,
            event::NOTE_OFF | event::NOTE_ON | event::POLY_AFTERTOUCH
        ) || (kind == event::CONTROLLER
            && matches!(
                u32::from(first_data_byte),
                controllers::VOLUME | controllers::EXPRESSION | controllers::CHORUS_SEND
            ));

        let second_data_byte = match self.read_data_byte() {
            Ok(byte) => byte,
            Err(e) if e.kind() == MidiErrorKind::InvalidDataByte && can_safely_clamp => {
                // some midi files contain data bytes > 127; clamp them
                // where that cannot change the meaning of the event
                warn!("clamping invalid data byte at {}", e.position());
                127
            }
            Err(e) => return Err(e),
        };

        match kind {
            event::NOTE_OFF => Ok(MidiEvent::NoteOff {
                channel,
                pitch: first_data_byte,
                velocity: second_data_byte,
            }),
            event::NOTE_ON => Ok(MidiEvent::NoteOn {
                channel,
                pitch: first_data_byte,
                velocity: second_data_byte,
            }),
            event::PITCH_BEND => Ok(MidiEvent::PitchBend {
                channel,
                data_a: first_data_byte,
                data_b: second_data_byte,
            }),
            event::POLY_AFTERTOUCH => Ok(MidiEvent::Controller {
                channel,
                controller: controllers::POLYAFTER,
                value: (u32::from(first_data_byte) << 8) + u32::from(second_data_byte),
            }),
            event::CONTROLLER => Ok(MidiEvent::Controller {
                channel,
                controller: u32::from(first_data_byte),
                value: u32::from(second_data_byte),
            }),
            _ => Err(self.make_error(MidiErrorKind::InvalidStatusByte)),
        }
    }

    fn read_meta_event(&mut self) -> ReadResult<MidiEvent> {
        // Spec: "FF <type> <length> <bytes>"

        // Spec: "[...] programs must properly ignore meta-events which
        //        they do not recognize"
        let meta_type = self.input.read_byte()?;

        // Spec: "If there is no data, the length is 0."
        let data_size = self.read_var_int()? as usize;
        let mut data = self.input.read_n_bytes(data_size)?;

        // import code assumes NUL termination when the data is a string
        data.push(0);

        Ok(MidiEvent::Meta {
            meta_type,
            data,
            len: data_size,
        })
    }

    fn read_sysex_event(&mut self) -> ReadResult<MidiEvent> {
        // Spec: "F0 <length> <bytes to be transmitted after F0>"
        //       "F7 <length> <all bytes to be transmitted>"

        let data_size = self.read_var_int()? as usize;
        let data = self.input.read_n_bytes(data_size)?;

        // don't count a trailing 0xf7
        let mut len = data_size;
        if len > 0 && data[len - 1] == event::END_SYSEX {
            len -= 1;
        }

        Ok(MidiEvent::SysEx { data, len })
    }

    fn read_data_byte(&mut self) -> ReadResult<u8> {
        let byte = self.input.read_byte()?;
        if !is_data_byte(byte) {
            return Err(self.make_error(MidiErrorKind::InvalidDataByte));
        }

        Ok(byte)
    }

    fn read_var_int(&mut self) -> ReadResult<u32> {
        // Spec: "These numbers are represented 7 bits per byte, most
        //        significant bits first. The largest number which is
        //        allowed is 0FFFFFFF [...]"
        let mut value: u32 = 0;
        for _ in 0..VAR_INT_MAX_BYTES {
            let byte = self.input.read_byte()?;

            value += u32::from(byte & 0x7F);
            if byte & 0x80 == 0 {
                return Ok(value);
            }
            value <<= 7;
        }

        Err(self.make_error(MidiErrorKind::InvalidVarInt))
    }

    fn make_error(&mut self, kind: MidiErrorKind) -> MidiError {
        let position = self.input.position().unwrap_or_default();
        MidiError::new(position, kind)
    }
}
