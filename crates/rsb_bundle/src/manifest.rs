//! The resource tree produced by an unpack.

use std::{fs::File, io::BufWriter, io::Write, path::Path};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::compression::CompressionFlags;
use crate::error::Result;

pub use crate::types::Category;

/// Manifest version written by the unpacker
pub const MANIFEST_VERSION: u32 = 4;

/// Texture metadata of an atlas resource
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct TextureInfo {
    /// Index of the texture
    pub id: u32,

    /// Width in pixels
    pub width: u32,

    /// Height in pixels
    pub height: u32,

    /// Bytes per row
    pub pitch: u32,

    /// Pixel format code
    pub format: u32,

    /// Size of the separate alpha channel, absent in tables without one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpha_size: Option<u32>,

    /// Format of the separate alpha channel, absent in tables without one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpha_format: Option<u32>,
}

/// One extracted file
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct ResourceEntry {
    /// Path relative to the resource directory, with `/` separators
    pub path: String,

    /// Texture metadata for atlas resources
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ptx_info: Option<TextureInfo>,
}

/// Decoded contents of one packet
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct PacketInfo {
    /// Which parts were stored raw
    pub compression_flags: CompressionFlags,

    /// Resources in pool order
    pub res: Vec<ResourceEntry>,
}

/// A packet referenced from a composite
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SubgroupEntry {
    /// Category of the reference
    pub category: Category,

    /// Decoded packet
    pub packet_info: PacketInfo,
}

/// A composite and the packets it references
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct GroupEntry {
    /// Whether the composite was a shell
    pub is_composite: bool,

    /// Packets keyed by name
    pub subgroup: IndexMap<String, SubgroupEntry>,
}

/// Resource tree of a whole container
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    /// Always [`MANIFEST_VERSION`]
    pub version: u32,

    /// Size of a texture table entry in the source container
    pub ptx_info_size: u32,

    /// Composites keyed by upper-cased name
    pub group: IndexMap<String, GroupEntry>,
}

impl Manifest {
    /// Create an empty manifest for a container with the given texture entry size
    pub fn new(ptx_info_size: u32) -> Self {
        Self {
            version: MANIFEST_VERSION,
            ptx_info_size,
            group: IndexMap::new(),
        }
    }

    /// Serialize as tab indented JSON
    pub fn to_writer<W: Write>(&self, writer: W) -> Result<()> {
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
        let mut serializer = serde_json::Serializer::with_formatter(writer, formatter);
        self.serialize(&mut serializer)?;
        Ok(())
    }

    /// Serialize to a file, replacing it if present
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.to_writer(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Read a manifest previously written with [`Manifest::write_to`]
    pub fn read_from(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
    }
}
