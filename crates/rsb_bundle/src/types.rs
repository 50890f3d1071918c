//! Base types for structure of RSB file.

use binrw::BinRead;

use crate::cursor::ByteCursor;
use crate::error::{Error, Result};

/// Fixed offsets inside the records the unpacker visits
///
/// Composite and packet records are addressed relative to the start of their own record, packet
/// headers relative to the packet position, texture entries relative to their table entry.
pub mod layout {
    /// Width reserved for the composite name at the start of a composite record
    pub const COMPOSITE_NAME_WIDTH: u64 = 0x80;
    /// Start of the packet reference list inside a composite record
    pub const COMPOSITE_REFERENCES: u64 = 0x80;
    /// Size of one packet reference (`rsg_index`, category code, category tag, reserved)
    pub const COMPOSITE_REFERENCE_STRIDE: u64 = 0x10;
    /// Offset of the packet reference count inside a composite record
    pub const COMPOSITE_REFERENCE_COUNT: u64 = 0x480;
    /// Suffix marking a composite that aggregates resolution or locale variants
    pub const COMPOSITE_SHELL_SUFFIX: &str = "_CompositeShell";

    /// Offset of the packet position inside a packet info record
    pub const RSG_INFO_POSITION: u64 = 0x80;
    /// Offset of `part0_pos`, followed by `part0_size` and `part0_zlib`
    pub const RSG_INFO_PART0: u64 = 0x94;
    /// Offset of `part1_pos`, followed by `part1_size` and `part1_zlib`
    pub const RSG_INFO_PART1: u64 = 0xA4;
    /// Distance from the end of a packet info record to `ptx_number`, followed by
    /// `ptx_before_number`
    pub const RSG_INFO_TEXTURE_COUNTERS_FROM_END: u64 = 0x08;
    /// Packet sizes at or below this value are replaced by [`RSG_DEFAULT_SIZE`]
    pub const RSG_SMALL_SIZE: u64 = 0x400;
    /// Size assumed for packets whose declared parts are implausibly small
    pub const RSG_DEFAULT_SIZE: u64 = 0x1000;

    /// Offset of the file list length inside a packet header
    pub const PACKET_FILE_LIST_LENGTH: u64 = 0x48;
    /// Offset of the file list start inside a packet header
    pub const PACKET_FILE_LIST_BEGIN: u64 = 0x4C;
    /// File list starts seen in packet headers the unpacker understands
    pub const PACKET_FILE_LIST_GUARDS: [u32; 3] = [0x5C, 0xEC, 0x1000];

    /// Bytes between the atlas id and the width of an atlas resource record
    pub const ATLAS_RECORD_RESERVED: u64 = 0x08;
    /// Offset of the pitch inside a texture table entry
    pub const TEXTURE_PITCH: u64 = 0x08;
    /// Smallest texture entry that carries `alpha_size`
    pub const TEXTURE_WITH_ALPHA_SIZE: u32 = 0x14;
    /// Texture entry that carries an explicit `alpha_format`
    pub const TEXTURE_WITH_ALPHA_FORMAT: u32 = 0x18;
    /// Alpha format assumed for older tables when an alpha channel is present
    pub const DERIVED_ALPHA_FORMAT: u32 = 0x64;
}

/// RSB file header
///
/// Only the section boundaries and strides are read. The magic and version are kept for
/// reporting, but never checked, since patched containers commonly scramble them.
/// All data is stored in little endian format
#[derive(BinRead, Debug, Default, Copy, Clone, PartialEq)]
#[br(little)]
pub struct RsbHeader {
    /// The four magic bytes, `1bsr` in untouched containers
    pub magic: [u8; 4],

    /// The format version
    pub version: u32,

    /// Length of the resource path pool
    #[br(pad_before = 8)]
    pub file_list_length: u32,

    /// Offset of the resource path pool
    pub file_list_begin: u32,

    /// Length of the packet name pool
    #[br(pad_before = 8)]
    pub rsg_list_length: u32,

    /// Offset of the packet name pool
    pub rsg_list_begin: u32,

    /// Number of packet info records
    pub rsg_number: u32,

    /// Offset of the first packet info record
    pub rsg_info_begin: u32,

    /// Size of a single packet info record
    pub rsg_info_each_length: u32,

    /// Number of composite records
    pub composite_number: u32,

    /// Offset of the first composite record
    pub composite_info_begin: u32,

    /// Size of a single composite record
    pub composite_info_each_length: u32,

    /// Length of the composite name pool
    pub composite_list_length: u32,

    /// Offset of the composite name pool
    pub composite_list_begin: u32,

    /// Number of autopool records
    pub autopool_number: u32,

    /// Offset of the first autopool record
    pub autopool_info_begin: u32,

    /// Size of a single autopool record
    pub autopool_info_each_length: u32,

    /// Number of texture records
    pub ptx_number: u32,

    /// Offset of the first texture record
    pub ptx_info_begin: u32,

    /// Size of a single texture record
    pub ptx_info_each_length: u32,

    /// Offset of the payload region
    #[br(pad_before = 12)]
    pub file_offset: u32,
}

impl RsbHeader {
    /// Read the header from the start of a container
    pub fn parse(data: &[u8]) -> Result<Self> {
        let header = Self::read(&mut std::io::Cursor::new(data))?;
        header.validate()?;
        Ok(header)
    }

    /// Reject strides too small to hold the fields the unpacker reads from each record
    pub fn validate(&self) -> Result<()> {
        if self.composite_number == 0 {
            return Ok(());
        }

        let checks = [
            (
                "composite_info_each_length",
                self.composite_info_each_length,
                (layout::COMPOSITE_REFERENCE_COUNT + 4) as u32,
            ),
            (
                "rsg_info_each_length",
                self.rsg_info_each_length,
                (layout::RSG_INFO_PART1 + 12) as u32,
            ),
        ];

        for (field, value, minimum) in checks {
            if value < minimum {
                return Err(Error::InvalidStride {
                    field,
                    value,
                    minimum,
                });
            }
        }

        Ok(())
    }

    /// Absolute offset of the composite record at `index`
    pub fn composite_offset(&self, index: u32) -> u64 {
        self.composite_info_begin as u64 + index as u64 * self.composite_info_each_length as u64
    }

    /// Absolute offset of the packet info record at `index`
    pub fn rsg_info_offset(&self, index: u32) -> u64 {
        self.rsg_info_begin as u64 + index as u64 * self.rsg_info_each_length as u64
    }
}

/// Category attached to a packet reference
///
/// Serialized as a two element array: the numeric code (usually a resolution) and the optional
/// four character tag (usually a locale).
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Category(pub u32, pub Option<String>);

/// A packet reference inside a composite record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketReference {
    /// Index into the packet name pool and the packet info table
    pub rsg_index: u32,

    /// Category of this reference
    pub category: Category,
}

/// A composite record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeRecord {
    /// Name with any shell suffix removed
    pub name: String,

    /// Whether the name carried the shell suffix
    pub is_composite: bool,

    /// Packet references in declaration order
    pub references: Vec<PacketReference>,
}

impl CompositeRecord {
    /// Read the composite record starting at `base`
    pub fn read(cursor: &ByteCursor<'_>, base: u64) -> Result<Self> {
        let mut name = cursor.read_string_at(base, layout::COMPOSITE_NAME_WIDTH)?;
        let is_composite = name.ends_with(layout::COMPOSITE_SHELL_SUFFIX);
        if is_composite {
            name.truncate(name.len() - layout::COMPOSITE_SHELL_SUFFIX.len());
        }

        let count = cursor.read_u32_at(base + layout::COMPOSITE_REFERENCE_COUNT)?;
        let references = (0..count as u64)
            .map(|k| -> Result<PacketReference> {
                let entry =
                    base + layout::COMPOSITE_REFERENCES + k * layout::COMPOSITE_REFERENCE_STRIDE;
                let rsg_index = cursor.read_u32_at(entry)?;
                let code = cursor.read_u32_at(entry + 4)?;
                let tag = match cursor.read_u32_at(entry + 8)? {
                    0 => None,
                    _ => Some(cursor.read_fixed_string_at(entry + 8, 4)?),
                };
                Ok(PacketReference {
                    rsg_index,
                    category: Category(code, tag),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            name,
            is_composite,
            references,
        })
    }
}

/// Packet descriptor from the packet info table
///
/// Part positions are relative to [`CompositeRsgInfo::pos`].
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct CompositeRsgInfo {
    /// Absolute offset of the packet
    pub pos: u64,

    /// Extent of the packet used to clamp compressed reads
    pub size: u64,

    /// Offset of the general resource part
    pub part0_pos: u64,

    /// Size of the general resource part once decompressed
    pub part0_size: u64,

    /// Size of the general resource part as stored
    pub part0_zlib: u64,

    /// Offset of the texture part
    pub part1_pos: u64,

    /// Size of the texture part once decompressed
    pub part1_size: u64,

    /// Size of the texture part as stored
    pub part1_zlib: u64,

    /// Number of textures in this packet
    pub ptx_number: u32,

    /// Number of textures in packets preceding this one
    pub ptx_before_number: u32,
}

impl CompositeRsgInfo {
    /// Read the packet info record at `index`
    pub fn read(cursor: &ByteCursor<'_>, header: &RsbHeader, index: u32) -> Result<Self> {
        let base = header.rsg_info_offset(index);
        let read = |offset: u64| cursor.read_u32_at(base + offset).map(u64::from);

        let part0_pos = read(layout::RSG_INFO_PART0)?;
        let part0_size = read(layout::RSG_INFO_PART0 + 4)?;
        let part1_size = read(layout::RSG_INFO_PART1 + 4)?;

        let mut size = part0_pos + part0_size + part1_size;
        if size <= layout::RSG_SMALL_SIZE {
            size = layout::RSG_DEFAULT_SIZE;
        }

        let counters =
            base + header.rsg_info_each_length as u64 - layout::RSG_INFO_TEXTURE_COUNTERS_FROM_END;

        Ok(Self {
            pos: read(layout::RSG_INFO_POSITION)?,
            size,
            part0_pos,
            part0_size,
            part0_zlib: read(layout::RSG_INFO_PART0 + 8)?,
            part1_pos: read(layout::RSG_INFO_PART1)?,
            part1_size,
            part1_zlib: read(layout::RSG_INFO_PART1 + 8)?,
            ptx_number: cursor.read_u32_at(counters)?,
            ptx_before_number: cursor.read_u32_at(counters + 4)?,
        })
    }

    /// The file list start recorded in the packet header
    pub fn file_list_guard(&self, cursor: &ByteCursor<'_>) -> Result<u32> {
        cursor.read_u32_at(self.pos + layout::PACKET_FILE_LIST_BEGIN)
    }

    /// Whether the packet header points its file list at a known location
    pub fn has_known_layout(&self, cursor: &ByteCursor<'_>) -> Result<bool> {
        let guard = self.file_list_guard(cursor)?;
        Ok(layout::PACKET_FILE_LIST_GUARDS.contains(&guard))
    }
}
