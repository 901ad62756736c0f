#![doc = r#"
The Standard MIDI File (SMF) codec.

[`MidiFileReader`] parses chunked SMF bytes into a [`MidiFile`] made of
[`MidiTrack`]s holding tick-ordered [`MidiEvent`]s; [`MidiFileWriter`]
serializes the model back. [`MidiTrack::merge_note_on_off`] and
[`MidiFile::separate_channel`] post-process a freshly read file for
consumption by import code.
"#]

mod error;
pub use error::*;

pub mod event;
pub use event::MidiEvent;

mod file;
pub use file::*;

mod format;
pub use format::*;

mod reader;
pub use reader::*;

mod track;
pub use track::*;

mod writer;
pub use writer::*;
