//! Decoding of a single packet: payload, resource records and texture metadata.

use tracing::{debug, instrument};

use crate::compression::{decompress_packet, Inflate};
use crate::cursor::ByteCursor;
use crate::error::{Error, Result};
use crate::manifest::{PacketInfo, ResourceEntry, TextureInfo};
use crate::pool::PathPool;
use crate::sink::ResourceSink;
use crate::types::{layout, CompositeRsgInfo, RsbHeader};

/// Decompress a packet, hand every resource to `sink` and describe what was found
///
/// `cursor` spans the whole container: the path pool and texture table are read from the
/// container, resource bytes from the decompressed payload.
#[instrument(skip_all, fields(pos = info.pos), err)]
pub fn unpack_packet<I: Inflate, S: ResourceSink>(
    cursor: &ByteCursor<'_>,
    header: &RsbHeader,
    info: &CompositeRsgInfo,
    inflater: &I,
    sink: &mut S,
) -> Result<PacketInfo> {
    let payload = decompress_packet(cursor, info, inflater)?;
    let resources = ByteCursor::new(&payload.data);

    let pool_length = cursor.read_u32_at(info.pos + layout::PACKET_FILE_LIST_LENGTH)? as u64;
    let pool_begin = info.pos + cursor.read_u32_at(info.pos + layout::PACKET_FILE_LIST_BEGIN)? as u64;
    let mut pool = PathPool::new(cursor.get_ref(), pool_begin, pool_length);

    let mut res = Vec::new();
    while let Some(path) = pool.next_path()? {
        let records = pool.cursor();
        let is_atlas = records.read_u32()? == 1;
        let pos = records.read_u32()? as u64 + if is_atlas { payload.atlas_offset } else { 0 };
        let size = records.read_u32()? as u64;

        sink.write_resource(&path, resources.read_bytes(pos, pos + size)?)?;

        let ptx_info = if is_atlas {
            let id = records.read_u32()?;
            records.skip(layout::ATLAS_RECORD_RESERVED);
            let width = records.read_u32()?;
            let height = records.read_u32()?;
            Some(read_texture_info(cursor, header, info, id, width, height)?)
        } else {
            None
        };

        res.push(ResourceEntry { path, ptx_info });
    }

    debug!(resources = res.len(), flags = payload.flags.0, "unpacked packet");

    Ok(PacketInfo {
        compression_flags: payload.flags,
        res,
    })
}

/// Complete the metadata of an atlas resource from the container's texture table
///
/// Entries are indexed backwards from the number of textures preceding the packet. Tables
/// with entries shorter than [`layout::TEXTURE_WITH_ALPHA_SIZE`] have no alpha fields; tables
/// without an explicit alpha format get one derived from the alpha size.
pub fn read_texture_info(
    cursor: &ByteCursor<'_>,
    header: &RsbHeader,
    info: &CompositeRsgInfo,
    id: u32,
    width: u32,
    height: u32,
) -> Result<TextureInfo> {
    let index = i128::from(info.ptx_before_number) - i128::from(id);
    let offset = i128::from(header.ptx_info_begin)
        + index * i128::from(header.ptx_info_each_length)
        + i128::from(layout::TEXTURE_PITCH);
    let entry = u64::try_from(offset).map_err(|_| {
        Error::InvalidOffset(format!(
            "texture {id} resolves to table offset {offset} before the start of the file"
        ))
    })?;

    let mut texture = TextureInfo {
        id,
        width,
        height,
        pitch: cursor.read_u32_at(entry)?,
        format: cursor.read_u32_at(entry + 4)?,
        alpha_size: None,
        alpha_format: None,
    };

    if header.ptx_info_each_length >= layout::TEXTURE_WITH_ALPHA_SIZE {
        let alpha_size = cursor.read_u32_at(entry + 8)?;
        let alpha_format = match header.ptx_info_each_length {
            layout::TEXTURE_WITH_ALPHA_FORMAT => cursor.read_u32_at(entry + 12)?,
            _ if alpha_size == 0 => 0,
            _ => layout::DERIVED_ALPHA_FORMAT,
        };
        texture.alpha_size = Some(alpha_size);
        texture.alpha_format = Some(alpha_format);
    }

    Ok(texture)
}
