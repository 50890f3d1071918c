//! Types for unpacking RSB containers
//!

use std::path::Path;

use tracing::{debug, info, instrument, warn};

use crate::{
    compression::{Inflate, ZlibInflate},
    cursor::ByteCursor,
    error::Result,
    manifest::{GroupEntry, Manifest, SubgroupEntry},
    packet::unpack_packet,
    pool::NamePool,
    sink::{DirectorySink, ResourceSink},
    types::{CompositeRecord, CompositeRsgInfo, RsbHeader},
};

/// Directory below the destination that receives extracted resources
pub const RESOURCE_DIRECTORY: &str = "resource";

/// File below the destination that receives the manifest
pub const MANIFEST_FILE: &str = "manifest.json";

/// RSB container unpacker
///
/// Trusts only the header and the minimal structure needed to find each packet. A packet whose
/// header does not point its file list at a known location is reported and left out of the
/// manifest; every other inconsistency aborts the unpack.
///
/// ```no_run
/// use rsb_bundle::{sink::MemorySink, RsbUnpacker};
///
/// fn list_packets(data: &[u8]) -> rsb_bundle::error::Result<()> {
///     let unpacker = RsbUnpacker::new(data)?;
///     let mut sink = MemorySink::new();
///     let manifest = unpacker.unpack(&mut sink)?;
///
///     for (name, group) in &manifest.group {
///         for packet in group.subgroup.keys() {
///             println!("{name}: {packet}");
///         }
///     }
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct RsbUnpacker<'a, I = ZlibInflate> {
    cursor: ByteCursor<'a>,
    header: RsbHeader,
    inflater: I,
}

impl<'a> RsbUnpacker<'a> {
    /// Read the header of a container held in memory
    pub fn new(data: &'a [u8]) -> Result<Self> {
        Self::with_inflater(data, ZlibInflate)
    }
}

impl<'a, I: Inflate> RsbUnpacker<'a, I> {
    /// Read the header of a container, inflating packets with `inflater`
    pub fn with_inflater(data: &'a [u8], inflater: I) -> Result<Self> {
        let header = RsbHeader::parse(data)?;
        debug!(
            magic = %String::from_utf8_lossy(&header.magic),
            version = header.version,
            composites = header.composite_number,
            packets = header.rsg_number,
            "read header"
        );

        Ok(Self {
            cursor: ByteCursor::new(data),
            header,
            inflater,
        })
    }

    /// The container header
    pub fn header(&self) -> &RsbHeader {
        &self.header
    }

    /// Decode the packet name pool
    pub fn packet_names(&self) -> Result<NamePool> {
        NamePool::decode(
            self.cursor.get_ref(),
            self.header.rsg_list_begin as u64,
            self.header.rsg_list_length as u64,
        )
    }

    /// Read the composite record at `index`
    pub fn composite(&self, index: u32) -> Result<CompositeRecord> {
        CompositeRecord::read(&self.cursor, self.header.composite_offset(index))
    }

    /// Read the packet info record at `index`
    pub fn packet_info(&self, index: u32) -> Result<CompositeRsgInfo> {
        CompositeRsgInfo::read(&self.cursor, &self.header, index)
    }

    /// Unpack every composite, handing resources to `sink`
    #[instrument(skip_all, err)]
    pub fn unpack<S: ResourceSink>(&self, mut sink: S) -> Result<Manifest> {
        let names = self.packet_names()?;
        let mut manifest = Manifest::new(self.header.ptx_info_each_length);

        for i in 0..self.header.composite_number {
            let composite = self.composite(i)?;
            let mut group = GroupEntry {
                is_composite: composite.is_composite,
                ..Default::default()
            };

            for reference in composite.references {
                let info = self.packet_info(reference.rsg_index)?;

                if !info.has_known_layout(&self.cursor)? {
                    match names.get(&reference.rsg_index) {
                        Some(packet_name) => warn!("skip_category: {packet_name}"),
                        None => warn!("skip_category: {}", reference.rsg_index),
                    }
                    continue;
                }

                let packet_name = names.name(reference.rsg_index)?;

                let packet_info =
                    unpack_packet(&self.cursor, &self.header, &info, &self.inflater, &mut sink)?;
                group.subgroup.insert(
                    packet_name.to_owned(),
                    SubgroupEntry {
                        category: reference.category,
                        packet_info,
                    },
                );
            }

            debug!(
                name = %composite.name,
                packets = group.subgroup.len(),
                "unpacked composite"
            );
            manifest.group.insert(composite.name.to_uppercase(), group);
        }

        Ok(manifest)
    }
}

/// Unpack the container at `source` into `destination`
///
/// Resources go to `destination/resource/`, the manifest to `destination/manifest.json`. The
/// manifest is only written once every packet has been unpacked; resources written before a
/// failure are left in place.
#[instrument(skip_all, fields(source = %source.as_ref().display()), err)]
pub fn unpack_fs(source: impl AsRef<Path>, destination: impl AsRef<Path>) -> Result<Manifest> {
    let data = std::fs::read(source.as_ref())?;
    let destination = destination.as_ref();

    let unpacker = RsbUnpacker::new(&data)?;
    let manifest = unpacker.unpack(DirectorySink::new(destination.join(RESOURCE_DIRECTORY)))?;

    std::fs::create_dir_all(destination)?;
    manifest.write_to(destination.join(MANIFEST_FILE))?;
    info!(
        groups = manifest.group.len(),
        "wrote {}",
        destination.join(MANIFEST_FILE).display()
    );

    Ok(manifest)
}
