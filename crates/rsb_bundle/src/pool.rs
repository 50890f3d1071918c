//! Decoding of the shared string pools.
//!
//! A pool is a run of 32 bit coded units. Each unit carries one byte of the current string in
//! its low 8 bits and, in its upper 24 bits, an optional unit index where another string
//! continues. When a unit names such an index, the string built so far is remembered as the
//! prefix of the string that starts there, so strings with a common beginning store it once.
//! A zero byte ends the current string.
//!
//! Two pools use this encoding and are decoded separately:
//!
//! - the packet name pool, where each string is followed by a 32 bit pool index and bytes are
//!   kept as they are
//! - the per-packet path pool, where each string is followed by a resource record and `\` is
//!   rewritten to `/`

use std::collections::HashMap;

use derive_more::derive::Deref;

use crate::cursor::ByteCursor;
use crate::error::{Error, Result};

/// One packed pool unit
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CodedUnit(pub u32);

impl CodedUnit {
    const OFFSET_MASK: u32 = 0xFFFF_FF00;
    const OFFSET_SHIFT: u32 = 8;
    const BYTE_MASK: u32 = 0x0000_00FF;

    /// Pack a continuation offset and a byte. Offsets wider than 24 bits are truncated.
    pub fn new(offset: u32, byte: u8) -> Self {
        Self(((offset << Self::OFFSET_SHIFT) & Self::OFFSET_MASK) | byte as u32)
    }

    /// Unit index where a string sharing the current prefix continues, zero for none
    pub fn offset(self) -> u32 {
        (self.0 & Self::OFFSET_MASK) >> Self::OFFSET_SHIFT
    }

    /// The byte carried by this unit
    pub fn byte(self) -> u8 {
        (self.0 & Self::BYTE_MASK) as u8
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Separator {
    Keep,
    Slash,
}

/// Walks the strings of a pool, leaving the cursor after each terminator so the caller can
/// read whatever trails the string
#[derive(Debug)]
struct PoolScanner<'a> {
    cursor: ByteCursor<'a>,
    begin: u64,
    end: u64,
    pending: HashMap<u64, String>,
    separator: Separator,
}

impl<'a> PoolScanner<'a> {
    fn new(data: &'a [u8], begin: u64, length: u64, separator: Separator) -> Self {
        let mut cursor = ByteCursor::new(data);
        cursor.set_position(begin);
        Self {
            cursor,
            begin,
            end: begin + length,
            pending: HashMap::new(),
            separator,
        }
    }

    /// The next string, or `None` once the pool is exhausted or an empty string is read
    fn next_string(&mut self) -> Result<Option<String>> {
        let start = self.cursor.position();
        if start >= self.end {
            return Ok(None);
        }

        let index = (start - self.begin) / 4;
        let mut value = self.pending.remove(&index).unwrap_or_default();

        loop {
            if self.cursor.position() >= self.end {
                return Err(Error::UnterminatedString {
                    offset: start,
                    end: self.end,
                });
            }

            let unit = CodedUnit(self.cursor.read_u32()?);
            if unit.offset() != 0 {
                self.pending.insert(unit.offset() as u64, value.clone());
            }

            match (unit.byte(), self.separator) {
                (0, _) => break,
                (b'\\', Separator::Slash) => value.push('/'),
                (byte, _) => value.push(char::from(byte)),
            }
        }

        if value.is_empty() {
            return Ok(None);
        }
        Ok(Some(value))
    }
}

/// Packet names keyed by pool index
#[derive(Debug, Clone, Default, PartialEq, Eq, Deref)]
pub struct NamePool(HashMap<u32, String>);

impl NamePool {
    /// Decode the packet name pool occupying `[begin, begin + length)`
    pub fn decode(data: &[u8], begin: u64, length: u64) -> Result<Self> {
        let mut scanner = PoolScanner::new(data, begin, length, Separator::Keep);
        let mut names = HashMap::new();

        while let Some(name) = scanner.next_string()? {
            let index = scanner.cursor.read_u32()?;
            names.insert(index, name);
        }

        Ok(Self(names))
    }

    /// Name registered for `index`
    pub fn name(&self, index: u32) -> Result<&str> {
        self.0
            .get(&index)
            .map(String::as_str)
            .ok_or(Error::UnknownPacket(index))
    }
}

/// Resource paths of one packet
///
/// Each path is followed by a resource record that the caller reads through
/// [`PathPool::cursor`] before asking for the next path.
#[derive(Debug)]
pub struct PathPool<'a> {
    scanner: PoolScanner<'a>,
}

impl<'a> PathPool<'a> {
    /// Start decoding the path pool occupying `[begin, begin + length)`
    pub fn new(data: &'a [u8], begin: u64, length: u64) -> Self {
        Self {
            scanner: PoolScanner::new(data, begin, length, Separator::Slash),
        }
    }

    /// The next path, with `\` rewritten to `/`
    pub fn next_path(&mut self) -> Result<Option<String>> {
        self.scanner.next_string()
    }

    /// Cursor positioned after the last path read
    pub fn cursor(&mut self) -> &mut ByteCursor<'a> {
        &mut self.scanner.cursor
    }
}
