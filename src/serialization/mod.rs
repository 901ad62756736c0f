#![doc = r#"
Generic streaming primitives: binary reading, buffered text output and
XML output.

These are independent of the MIDI codec; the [`BinaryReader`] is what the
MIDI reader parses through, while [`TextStream`] and [`XmlStreamWriter`]
serve text-based document formats.
"#]

mod binary_reader;
pub use binary_reader::*;

mod text_stream;
pub use text_stream::*;

mod xml_stream_writer;
pub use xml_stream_writer::*;
