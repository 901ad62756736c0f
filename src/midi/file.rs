use super::{MidiFileFormat, MidiTrack};

#[doc = r#"
An in-memory Standard MIDI File: format, tracks and timing division.

Constructed either empty (building tracks up through the API before
writing) or by [`MidiFileReader`](super::MidiFileReader). The division is
kept as the plain 16-bit value together with a flag saying whether it
counts ticks per second (converted from an SMPTE header) or ticks per
beat.
"#]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MidiFile {
    tracks: Vec<MidiTrack>,
    format: MidiFileFormat,
    division: u16,
    is_division_in_tps: bool,
    no_running_status: bool,
}

impl MidiFile {
    /// Chunk type tag of the header chunk.
    pub const HEADER_CHUNK_TYPE: [u8; 4] = *b"MThd";
    /// Chunk type tag of a track chunk.
    pub const TRACK_CHUNK_TYPE: [u8; 4] = *b"MTrk";

    /// Assemble a file from parsed parts.
    pub fn new(
        tracks: Vec<MidiTrack>,
        format: MidiFileFormat,
        division: u16,
        is_division_in_tps: bool,
    ) -> Self {
        Self {
            tracks,
            format,
            division,
            is_division_in_tps,
            no_running_status: false,
        }
    }

    /// The tracks in file order.
    pub fn tracks(&self) -> &[MidiTrack] {
        &self.tracks
    }

    /// Mutable access to the tracks.
    pub fn tracks_mut(&mut self) -> &mut Vec<MidiTrack> {
        &mut self.tracks
    }

    /// The file format from the header chunk.
    pub fn format(&self) -> MidiFileFormat {
        self.format
    }

    /// Set the file format.
    pub fn set_format(&mut self, format: MidiFileFormat) {
        self.format = format;
    }

    /// The 16-bit division value.
    pub fn division(&self) -> u16 {
        self.division
    }

    /// Set the division value.
    pub fn set_division(&mut self, division: u16) {
        self.division = division;
    }

    /// True if the division counts ticks per second rather than ticks
    /// per beat.
    pub fn is_division_in_tps(&self) -> bool {
        self.is_division_in_tps
    }

    /// True if the writer must emit an explicit status byte before every
    /// event.
    pub fn no_running_status(&self) -> bool {
        self.no_running_status
    }

    /// Suppress running status on write.
    pub fn set_no_running_status(&mut self, no_running_status: bool) {
        self.no_running_status = no_running_status;
    }

    /// Split tracks that address more than one MIDI channel.
    ///
    /// Every track is assigned the lowest channel its channel-voice
    /// events reference (channel 0 if there are none). A track using
    /// several channels keeps the lowest channel's events and one new
    /// track per additional channel is inserted right after it, in
    /// ascending channel order; non-channel events (meta, sysex) stay in
    /// the original track.
    pub fn separate_channel(&mut self) {
        let mut i = 0;
        while i < self.tracks.len() {
            let mut channels: Vec<u8> = Vec::new();
            for (_, event) in self.tracks[i].events() {
                if let Some(channel) = event.channel()
                    && !channels.contains(&channel)
                {
                    channels.push(channel);
                }
            }
            channels.sort_unstable();

            self.tracks[i].set_out_channel(Some(channels.first().copied().unwrap_or(0)));
            if channels.len() <= 1 {
                i += 1;
                continue;
            }

            for (n, channel) in channels[1..].iter().enumerate() {
                let mut track = MidiTrack::default();
                track.set_out_channel(Some(*channel));
                self.tracks.insert(i + 1 + n, track);
            }

            // redistribute channel events; everything else keeps index 0
            let events = self.tracks[i].take_events();
            for (tick, event) in events {
                let idx = event
                    .channel()
                    .and_then(|ch| channels.iter().position(|c| *c == ch))
                    .unwrap_or(0);
                self.tracks[i + idx].insert(tick, event);
            }

            i += channels.len();
        }
    }
}
