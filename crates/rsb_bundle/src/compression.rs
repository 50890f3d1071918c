//! Packet payload sniffing and decompression.

use flate2::{Decompress, FlushDecompress, Status};
use serde::{Deserialize, Serialize};
use tracing::{instrument, trace};

use crate::cursor::ByteCursor;
use crate::error::{Error, Result};
use crate::types::CompositeRsgInfo;

/// The two leading bytes of a zlib stream for each compression level
pub const ZLIB_HEADERS: [[u8; 2]; 4] = [[0x78, 0x01], [0x78, 0x5E], [0x78, 0x9C], [0x78, 0xDA]];

/// Records which parts of a packet were stored raw
///
/// Starts at [`CompressionFlags::COMPRESSED`] and is lowered to
/// [`CompressionFlags::RAW_GENERAL`] when the general part is raw, or to
/// [`CompressionFlags::RAW_TEXTURE`] when the texture part is raw.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
#[serde(transparent)]
pub struct CompressionFlags(pub u32);

impl CompressionFlags {
    /// The texture part was stored raw
    pub const RAW_TEXTURE: Self = Self(0);
    /// The general part was stored raw
    pub const RAW_GENERAL: Self = Self(1);
    /// Every part present was compressed
    pub const COMPRESSED: Self = Self(3);
}

impl Default for CompressionFlags {
    fn default() -> Self {
        Self::COMPRESSED
    }
}

/// Inflates a complete zlib stream
pub trait Inflate {
    /// Decompress `data`, failing if the stream is corrupt or ends early
    fn inflate(&self, data: &[u8]) -> Result<Vec<u8>>;
}

/// [`Inflate`] backed by [`flate2`]
#[derive(Debug, Default, Copy, Clone)]
pub struct ZlibInflate;

impl Inflate for ZlibInflate {
    fn inflate(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut decoder = Decompress::new(true);
        let mut output = Vec::with_capacity(data.len().saturating_mul(4).max(64));

        loop {
            if output.len() == output.capacity() {
                output.reserve(output.capacity());
            }

            let consumed = decoder.total_in() as usize;
            let produced = decoder.total_out();
            let status =
                decoder.decompress_vec(&data[consumed..], &mut output, FlushDecompress::Finish)?;

            match status {
                Status::StreamEnd => return Ok(output),
                Status::Ok | Status::BufError => {
                    let stalled = decoder.total_in() as usize == consumed
                        && decoder.total_out() == produced;
                    if stalled && output.len() < output.capacity() {
                        return Err(Error::TruncatedStream {
                            consumed: decoder.total_in(),
                            length: data.len() as u64,
                        });
                    }
                }
            }
        }
    }
}

/// Whether the region starting at `offset` begins with a zlib header
pub fn is_zlib_stream(cursor: &ByteCursor<'_>, offset: u64) -> Result<bool> {
    let head = [cursor.read_u8_at(offset)?, cursor.read_u8_at(offset + 1)?];
    Ok(ZLIB_HEADERS.contains(&head))
}

/// A packet's decoded payload
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PacketPayload {
    /// General part followed by the texture part
    pub data: Vec<u8>,

    /// Offset of the texture part in [`PacketPayload::data`], zero when absent
    pub atlas_offset: u64,

    /// Which parts were found raw
    pub flags: CompressionFlags,
}

/// Decode both parts of a packet, sniffing each for a zlib header
///
/// Compressed reads are clamped to the packet extent so a corrupt stored size cannot pull in
/// bytes belonging to the next packet.
#[instrument(skip(cursor, inflater), err)]
pub fn decompress_packet<I: Inflate>(
    cursor: &ByteCursor<'_>,
    info: &CompositeRsgInfo,
    inflater: &I,
) -> Result<PacketPayload> {
    let mut payload = PacketPayload::default();
    let limit = info.pos + info.size;

    if info.part0_pos + info.part0_size > 0 || info.part0_pos + info.part0_zlib > 0 {
        let raw = decode_part(
            cursor,
            inflater,
            info.pos + info.part0_pos,
            info.part0_size,
            info.part0_zlib,
            limit,
            &mut payload.data,
        )?;
        if raw {
            payload.flags = CompressionFlags::RAW_GENERAL;
        }
    }

    if info.ptx_number != 0 {
        payload.atlas_offset = payload.data.len() as u64;
        let raw = decode_part(
            cursor,
            inflater,
            info.pos + info.part1_pos,
            info.part1_size,
            info.part1_zlib,
            limit,
            &mut payload.data,
        )?;
        if raw {
            payload.flags = CompressionFlags::RAW_TEXTURE;
        }
    }

    Ok(payload)
}

/// Append one decoded part to `output`, returning whether it was stored raw
fn decode_part<I: Inflate>(
    cursor: &ByteCursor<'_>,
    inflater: &I,
    start: u64,
    raw_length: u64,
    stored_length: u64,
    limit: u64,
    output: &mut Vec<u8>,
) -> Result<bool> {
    if is_zlib_stream(cursor, start)? {
        let end = (start + stored_length).min(limit);
        trace!(start, end, "inflating part");
        output.extend(inflater.inflate(cursor.read_bytes(start, end)?)?);
        Ok(false)
    } else {
        trace!(start, raw_length, "copying raw part");
        output.extend_from_slice(cursor.read_bytes(start, start + raw_length)?);
        Ok(true)
    }
}
