//! Bounds-checked little-endian reader over an in-memory buffer
//!
//! Every replay section is decoded through a single `ByteReader`. The wire
//! format has no resynchronisation points, so the first failed read moves the
//! reader into the `Failed` state and every later read is refused.

use std::io::{self, Cursor, Read};

use byteorder::{LittleEndian, ReadBytesExt};

use crate::error::{ReplayError, Result};
use crate::replay::model::Vector3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderState {
    Reading,
    Failed,
}

pub struct ByteReader<'a> {
    cursor: Cursor<&'a [u8]>,
    state: ReaderState,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        ByteReader {
            cursor: Cursor::new(data),
            state: ReaderState::Reading,
        }
    }

    pub fn position(&self) -> u64 {
        self.cursor.position()
    }

    pub fn remaining(&self) -> usize {
        let len = self.cursor.get_ref().len() as u64;
        len.saturating_sub(self.cursor.position()) as usize
    }

    pub fn state(&self) -> ReaderState {
        self.state
    }

    /// Move the reader into the failed state and hand the error back
    pub fn fail(&mut self, err: ReplayError) -> ReplayError {
        self.state = ReaderState::Failed;
        err
    }

    fn take<T>(
        &mut self,
        needed: usize,
        read: impl FnOnce(&mut Cursor<&'a [u8]>) -> io::Result<T>,
    ) -> Result<T> {
        if self.state == ReaderState::Failed {
            return Err(ReplayError::ReaderFailed);
        }

        let offset = self.position();
        let remaining = self.remaining();
        let truncated = ReplayError::TruncatedInput {
            offset,
            needed,
            remaining,
        };

        if needed > remaining {
            return Err(self.fail(truncated));
        }

        match read(&mut self.cursor) {
            Ok(value) => Ok(value),
            Err(_) => Err(self.fail(truncated)),
        }
    }

    pub fn read_bytes(&mut self, length: usize) -> Result<Vec<u8>> {
        self.take(length, |cursor| {
            let mut buffer = vec![0u8; length];
            cursor.read_exact(&mut buffer)?;
            Ok(buffer)
        })
    }

    pub fn read_byte(&mut self) -> Result<u8> {
        self.take(1, |cursor| cursor.read_u8())
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_byte()? != 0)
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        self.take(4, |cursor| cursor.read_i32::<LittleEndian>())
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.take(4, |cursor| cursor.read_u32::<LittleEndian>())
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        self.take(4, |cursor| cursor.read_f32::<LittleEndian>())
    }

    /// Three consecutive f32 components, widened to f64
    pub fn read_vector3(&mut self) -> Result<Vector3> {
        let x = self.read_f32()?;
        let y = self.read_f32()?;
        let z = self.read_f32()?;
        Ok(Vector3::new(f64::from(x), f64::from(y), f64::from(z)))
    }

    /// An i32 element count. A negative count means no elements.
    pub fn read_count(&mut self) -> Result<usize> {
        Ok(self.read_i32()?.max(0) as usize)
    }

    /// i32 byte length followed by UTF-8 bytes
    pub fn read_string(&mut self) -> Result<String> {
        let offset = self.position();
        let length = self.read_i32()?;
        if length < 0 {
            return Err(self.fail(ReplayError::InvalidStringLength { length, offset }));
        }
        let bytes = self.read_bytes(length as usize)?;
        self.decode_utf8(bytes, offset)
    }

    /// Same wire bytes as `read_string`, but the payload is consumed one byte
    /// at a time and a negative byte count yields an empty string. Track
    /// metadata labels are stored this way.
    pub fn read_byte_array_string(&mut self) -> Result<String> {
        let offset = self.position();
        let length = self.read_count()?;
        let mut bytes = Vec::with_capacity(length.min(self.remaining()));
        for _ in 0..length {
            bytes.push(self.read_byte()?);
        }
        self.decode_utf8(bytes, offset)
    }

    fn decode_utf8(&mut self, bytes: Vec<u8>, offset: u64) -> Result<String> {
        String::from_utf8(bytes).map_err(|_| self.fail(ReplayError::InvalidUtf8 { offset }))
    }
}
