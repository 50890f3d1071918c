//! Positioned little-endian reads over an in-memory container.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{Error, Result};

macro_rules! read_impl {
    ($name:ident, $name_at:ident, $ty:ty, $width:expr, $conv:expr) => {
        #[doc = concat!("Read a `", stringify!($ty), "` at the cursor and advance past it")]
        pub fn $name(&mut self) -> Result<$ty> {
            let value = self.$name_at(self.position)?;
            self.position += $width;
            Ok(value)
        }

        #[doc = concat!("Read a `", stringify!($ty), "` at `offset` without moving the cursor")]
        pub fn $name_at(&self, offset: u64) -> Result<$ty> {
            let bytes = self.slice(offset, $width)?;
            Ok(($conv)(bytes))
        }
    };
}

/// Reader over a borrowed byte buffer
///
/// Sequential reads (`read_u32`, ...) advance the cursor. Absolute reads (`read_u32_at`, ...)
/// leave it where it is. Any read that would cross the end of the buffer fails with
/// [`Error::OutOfRange`].
///
/// ```
/// use rsb_bundle::cursor::ByteCursor;
///
/// let mut cursor = ByteCursor::new(&[0x01, 0x00, 0x00, 0x00, 0xFF]);
/// assert_eq!(cursor.read_u32_at(0).unwrap(), 1);
/// assert_eq!(cursor.position(), 0);
/// assert_eq!(cursor.read_u32().unwrap(), 1);
/// assert_eq!(cursor.position(), 4);
/// assert!(cursor.read_u16().is_err());
/// ```
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    position: u64,
}

impl<'a> ByteCursor<'a> {
    /// Create a cursor positioned at the start of `data`
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Current position of the sequential cursor
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Move the sequential cursor to an absolute offset
    pub fn set_position(&mut self, position: u64) {
        self.position = position;
    }

    /// Advance the sequential cursor without reading
    pub fn skip(&mut self, count: u64) {
        self.position += count;
    }

    /// Size of the underlying buffer
    pub fn len(&self) -> u64 {
        self.data.len() as u64
    }

    /// Whether the underlying buffer is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The whole underlying buffer
    pub fn get_ref(&self) -> &'a [u8] {
        self.data
    }

    read_impl!(read_u8, read_u8_at, u8, 1, |b: &[u8]| b[0]);
    read_impl!(read_i8, read_i8_at, i8, 1, |b: &[u8]| b[0] as i8);
    read_impl!(read_u16, read_u16_at, u16, 2, LittleEndian::read_u16);
    read_impl!(read_i16, read_i16_at, i16, 2, LittleEndian::read_i16);
    read_impl!(read_u32, read_u32_at, u32, 4, LittleEndian::read_u32);
    read_impl!(read_i32, read_i32_at, i32, 4, LittleEndian::read_i32);
    read_impl!(read_u64, read_u64_at, u64, 8, LittleEndian::read_u64);
    read_impl!(read_i64, read_i64_at, i64, 8, LittleEndian::read_i64);

    /// Borrow the bytes in `[start, end)`
    pub fn read_bytes(&self, start: u64, end: u64) -> Result<&'a [u8]> {
        if end < start {
            return Err(Error::InvalidOffset(format!(
                "byte range {start:#x}..{end:#x} ends before it starts"
            )));
        }
        self.slice(start, end - start)
    }

    /// Read a null-terminated string at `offset`, stopping after `max_width` bytes if no
    /// terminator is found first
    pub fn read_string_at(&self, offset: u64, max_width: u64) -> Result<String> {
        let mut value = String::new();
        for i in 0..max_width {
            let byte = self.read_u8_at(offset + i)?;
            if byte == 0 {
                break;
            }
            value.push(char::from(byte));
        }
        Ok(value)
    }

    /// Read exactly `width` bytes at `offset` as a string, terminators included
    pub fn read_fixed_string_at(&self, offset: u64, width: u64) -> Result<String> {
        Ok(self.slice(offset, width)?.iter().copied().map(char::from).collect())
    }

    fn slice(&self, offset: u64, length: u64) -> Result<&'a [u8]> {
        let size = self.len();
        let out_of_range = || Error::OutOfRange {
            offset,
            length,
            size,
        };

        let end = offset.checked_add(length).ok_or_else(out_of_range)?;
        if end > size {
            return Err(out_of_range());
        }

        Ok(&self.data[offset as usize..end as usize])
    }
}
