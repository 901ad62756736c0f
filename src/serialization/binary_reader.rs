use std::io::{self, Read, Seek, SeekFrom};

use thiserror::Error;

#[doc = r#"
An error produced by a [`BinaryReader`], carrying the byte offset at which
the problem was detected.
"#]
#[derive(Debug, Error)]
#[error("{kind} at position {position}")]
pub struct ReadError {
    position: u64,
    kind: ReadErrorKind,
}

/// A kind of error that a binary read can produce.
#[derive(Debug, Error)]
pub enum ReadErrorKind {
    /// The underlying source reported an error.
    #[error("i/o error: {0}")]
    Io(#[source] io::Error),
    /// Fewer bytes were available than requested.
    #[error("unexpected end of file")]
    EndOfFile,
}

impl ReadError {
    /// Create a read error from a position and kind.
    pub const fn new(position: u64, kind: ReadErrorKind) -> Self {
        Self { position, kind }
    }

    /// Returns the error kind.
    pub fn kind(&self) -> &ReadErrorKind {
        &self.kind
    }

    /// Returns the byte offset at which the error was detected.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// True if the source ran out of bytes mid-read.
    pub const fn is_end_of_file(&self) -> bool {
        matches!(self.kind, ReadErrorKind::EndOfFile)
    }
}

macro_rules! int_reads {
    ($($be:ident, $le:ident -> $t:ty;)*) => {$(
        #[doc = concat!("Read a big-endian `", stringify!($t), "` (byte 0 is most significant).")]
        pub fn $be(&mut self) -> Result<$t, ReadError> {
            Ok(<$t>::from_be_bytes(self.read_array()?))
        }

        #[doc = concat!("Read a little-endian `", stringify!($t), "` (byte 0 is least significant).")]
        pub fn $le(&mut self) -> Result<$t, ReadError> {
            Ok(<$t>::from_le_bytes(self.read_array()?))
        }
    )*}
}

#[doc = r#"
Sequential, position-tracked reader over a borrowed byte source.

Every typed read either returns exactly the requested bytes or fails with
a [`ReadError`]; a failed multi-byte read seeks the source back to where
the read began, so no partial consumption is observable.
"#]
pub struct BinaryReader<'a, R> {
    device: &'a mut R,
}

impl<'a, R: Read + Seek> BinaryReader<'a, R> {
    /// Borrow a byte source.
    pub fn new(device: &'a mut R) -> Self {
        Self { device }
    }

    /// Current byte offset from the start of the source.
    pub fn position(&mut self) -> Result<u64, ReadError> {
        self.device
            .stream_position()
            .map_err(|e| ReadError::new(0, ReadErrorKind::Io(e)))
    }

    int_reads! {
        read_i16_be, read_i16_le -> i16;
        read_u16_be, read_u16_le -> u16;
        read_i32_be, read_i32_le -> i32;
        read_u32_be, read_u32_le -> u32;
        read_i64_be, read_i64_le -> i64;
        read_u64_be, read_u64_le -> u64;
    }

    /// Read a single byte.
    pub fn read_byte(&mut self) -> Result<u8, ReadError> {
        Ok(self.read_array::<1>()?[0])
    }

    /// Read exactly `N` bytes, failing otherwise.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], ReadError> {
        let mut buf = [0u8; N];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Read exactly `n` bytes, failing otherwise.
    pub fn read_n_bytes(&mut self, n: usize) -> Result<Vec<u8>, ReadError> {
        let mut buf = vec![0u8; n];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Read exactly `buf.len()` bytes into `buf`, failing otherwise.
    ///
    /// On failure the source position is restored to where the read began
    /// and the reported offset is that position.
    pub fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), ReadError> {
        let start = self.position()?;

        let bytes_read = self.read_bytes(buf)?;
        if bytes_read != buf.len() {
            self.device
                .seek(SeekFrom::Start(start))
                .map_err(|e| ReadError::new(start, ReadErrorKind::Io(e)))?;

            return Err(ReadError::new(start, ReadErrorKind::EndOfFile));
        }

        Ok(())
    }

    /// Best-effort read: transfers up to `buf.len()` bytes and returns the
    /// actual count. Not length-checked.
    pub fn read_bytes(&mut self, buf: &mut [u8]) -> Result<usize, ReadError> {
        let mut total = 0;
        while total < buf.len() {
            match self.device.read(&mut buf[total..]) {
                Ok(0) => break,
                Ok(n) => total += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    let position = self.position().unwrap_or_default();
                    return Err(ReadError::new(position, ReadErrorKind::Io(e)));
                }
            }
        }

        Ok(total)
    }

    /// Skip up to `n` bytes and return the count actually skipped.
    pub fn skip(&mut self, n: u64) -> Result<u64, ReadError> {
        match io::copy(&mut self.device.by_ref().take(n), &mut io::sink()) {
            Ok(skipped) => Ok(skipped),
            Err(e) => {
                let position = self.position().unwrap_or_default();
                Err(ReadError::new(position, ReadErrorKind::Io(e)))
            }
        }
    }
}
