use thiserror::Error;

use crate::serialization::{ReadError, ReadErrorKind};

#[doc = r#"
An error produced while reading a Standard MIDI File, carrying the byte
offset at which the problem was detected.

All errors are terminal for the read call; whether to report them to a
user or abort an import is the caller's decision.
"#]
#[derive(Debug, Error)]
#[error("{kind} at position {position}")]
pub struct MidiError {
    position: u64,
    kind: MidiErrorKind,
}

/// A kind of error the MIDI file reader can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MidiErrorKind {
    /// The underlying byte source reported an error.
    #[error("i/o error")]
    IoError,
    /// Fewer bytes were available than a read requested.
    #[error("unexpected end of file")]
    EndOfFile,
    /// Header format word above 2, or format 2 (independent tracks),
    /// which this reader does not support.
    #[error("unsupported file format")]
    UnsupportedFileFormat,
    /// A chunk of the wrong type where a specific one was required.
    #[error("invalid chunk type")]
    InvalidChunkType,
    /// A declared chunk length that cannot be honored.
    #[error("invalid chunk size")]
    InvalidChunkSize,
    /// No valid track chunk was found.
    #[error("no tracks")]
    NoTracks,
    /// A track chunk that contains no events.
    #[error("empty track")]
    EmptyTrack,
    /// A data byte with no running status in effect and no backup to
    /// fall back on.
    #[error("no running status")]
    NoRunningStatus,
    /// A variable-length quantity longer than four bytes.
    #[error("invalid variable-length quantity")]
    InvalidVarInt,
    /// A data byte with the high bit set, in a context where clamping
    /// is not safe.
    #[error("invalid data byte")]
    InvalidDataByte,
    /// A status byte that is neither a channel status, meta nor sysex.
    #[error("invalid status byte")]
    InvalidStatusByte,
}

impl MidiError {
    /// Create an error from a position and kind.
    pub const fn new(position: u64, kind: MidiErrorKind) -> Self {
        Self { position, kind }
    }

    /// Returns the error kind.
    pub const fn kind(&self) -> MidiErrorKind {
        self.kind
    }

    /// Returns the byte offset at which the error was detected.
    pub const fn position(&self) -> u64 {
        self.position
    }
}

impl From<ReadError> for MidiError {
    /// Low-level read errors map 1:1 into the MIDI taxonomy, keeping
    /// their offset.
    fn from(err: ReadError) -> Self {
        let kind = match err.kind() {
            ReadErrorKind::Io(_) => MidiErrorKind::IoError,
            ReadErrorKind::EndOfFile => MidiErrorKind::EndOfFile,
        };

        Self::new(err.position(), kind)
    }
}

/// The result type of MIDI file reading (see [`MidiError`]).
pub type ReadResult<T> = Result<T, MidiError>;
