//! This library recovers resources from compiled **RSB** resource bundles.
//!
//! # RSB Container Format Documentation
//!
//! An RSB file packs many resource packets ("RSG") into a single container, together with
//! tables describing how packets are grouped into composites and which textures they carry.
//! Containers found in the wild are frequently produced by unknown tool versions or patched
//! after the fact, so this crate reads them with *loose constraints*: only the header and the
//! few fields needed to find each packet are trusted, and a packet that does not look like one
//! is skipped instead of failing the whole container.
//!
//! ## File Structure
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Magic number           | 4 bytes: `1bsr`, not checked                               |
//! | 0x0004         | Version                | 4 bytes: format version, not checked                       |
//! | 0x0010         | File List              | 8 bytes: length and offset of the resource path pool       |
//! | 0x0020         | RSG List               | 8 bytes: length and offset of the packet name pool         |
//! | 0x0028         | RSG Info               | 12 bytes: count, offset and stride of packet records       |
//! | 0x0034         | Composite Info         | 12 bytes: count, offset and stride of composite records    |
//! | 0x0040         | Composite List         | 8 bytes: length and offset of the composite name pool      |
//! | 0x0048         | Autopool Info          | 12 bytes: count, offset and stride of autopool records     |
//! | 0x0054         | PTX Info               | 12 bytes: count, offset and stride of texture records      |
//! | 0x006C         | File Offset            | 4 bytes: start of the payload region                       |
//!
//! ### Composite Records
//!
//! | Offset (bytes) | Field                  | Description                                             |
//! |----------------|------------------------|---------------------------------------------------------|
//! | 0x0000         | Name                   | 128 bytes: null terminated name                         |
//! | 0x0080         | References             | 16 bytes each: packet index, category code, category tag, reserved |
//! | 0x0480         | Reference Count        | 4 bytes: number of references                           |
//!
//! A name ending in `_CompositeShell` marks a composite that aggregates variants of the same
//! content. A non-zero category tag is read back as a four character string.
//!
//! ### Packet Records
//!
//! | Offset (bytes) | Field                  | Description                                             |
//! |----------------|------------------------|---------------------------------------------------------|
//! | 0x0080         | Position               | 4 bytes: offset of the packet in the file               |
//! | 0x0094         | Part 0                 | 12 bytes: offset, size and stored size of general data  |
//! | 0x00A4         | Part 1                 | 12 bytes: offset, size and stored size of texture data  |
//! | stride - 8     | Texture Counters       | 8 bytes: textures in this packet, textures before it    |
//!
//! Each packet starts with its own header. The words at `0x48` and `0x4C` hold the length and
//! offset of the packet's path pool. Known layouts place the pool at `0x5C`, `0xEC` or
//! `0x1000`; any other value marks a packet this crate cannot interpret.
//!
//! ### String Pools
//!
//! Packet names and resource paths are stored in pools of 32 bit units sharing common
//! prefixes, see [`pool`]. Every resource path is followed by a record giving the location of
//! its bytes in the decompressed packet and, for atlas resources, its texture dimensions.
//!
//! ### Compression
//!
//! Each part of a packet is either raw or a zlib stream. The compression is detected from the
//! first two bytes of the part rather than from any flag, see [`compression`].
//!
//! ## Additional Information
//!
//! - **File Extension**: `.rsb`, `.obb`
//! - **Endianness**: Little-endian for all multi-byte integers
//!

pub mod compression;
pub mod cursor;
pub mod error;
pub mod manifest;
pub mod packet;
pub mod pool;
pub mod sink;
pub mod types;
pub mod unpack;

pub use compression::{CompressionFlags, Inflate, ZlibInflate};
pub use manifest::Manifest;
pub use unpack::{unpack_fs, RsbUnpacker};
