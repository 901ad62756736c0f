#![doc = r#"
Standard MIDI File codec and the low-level streaming primitives it is
built on.

# Overview

`smfio` has two halves:

- [`serialization`] — generic byte/text/XML streaming: a position-tracked
  [`BinaryReader`](serialization::BinaryReader) over any `Read + Seek`
  source, a buffered [`TextStream`](serialization::TextStream), and an
  indenting, escaping [`XmlStreamWriter`](serialization::XmlStreamWriter).
- [`midi`] — the Standard MIDI File (SMF) codec: a tolerant
  [`MidiFileReader`](midi::MidiFileReader) that parses chunked SMF bytes
  (running status, variable-length quantities, meta/sysex framing) into a
  [`MidiFile`](midi::MidiFile), a [`MidiFileWriter`](midi::MidiFileWriter)
  that serializes the model back, and the post-processing passes that turn
  raw note on/off pairs into duration-bearing notes and split
  multi-channel tracks.

Malformed input is handled with an explicit policy: anomalies that can be
tolerated (alien chunks, missing End-Of-Track, clampable data bytes) are
logged through the [`log`] facade and parsing continues; everything else
fails with a typed error carrying the byte offset where the problem was
detected.

# Example

```no_run
use std::io::Cursor;
use smfio::midi::MidiFileReader;

# fn main() -> Result<(), Box<dyn std::error::Error>> {
let bytes = std::fs::read("song.mid")?;
let mut source = Cursor::new(bytes);
let mut file = MidiFileReader::new(&mut source).read()?;

file.separate_channel();
for track in file.tracks_mut() {
    track.merge_note_on_off();
}
# Ok(())
# }
```
"#]

pub mod midi;
pub mod serialization;

pub mod prelude {
    //! Commonly used types, re-exported in one place.
    pub use crate::midi::{
        Division, MidiError, MidiErrorKind, MidiEvent, MidiFile, MidiFileFormat, MidiFileReader,
        MidiFileWriter, MidiTrack, ReadResult,
    };
    pub use crate::serialization::{BinaryReader, ReadError, ReadErrorKind, TextStream, XmlStreamWriter};
}
