//! Assembles small synthetic RSB containers for tests and benchmarks.

#![allow(dead_code)]

use std::io::Write;

use flate2::{write::ZlibEncoder, Compression};

pub const HEADER_SIZE: usize = 0x70;
pub const COMPOSITE_STRIDE: usize = 0x494;
pub const RSG_STRIDE: usize = 0xCC;

#[derive(Debug, Clone)]
pub struct Texture {
    pub id: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone)]
pub struct Resource {
    pub path: String,
    pub data: Vec<u8>,
    pub texture: Option<Texture>,
}

impl Resource {
    pub fn new(path: &str, data: &[u8]) -> Self {
        Self {
            path: path.to_owned(),
            data: data.to_vec(),
            texture: None,
        }
    }

    pub fn atlas(path: &str, data: &[u8], id: u32, width: u32, height: u32) -> Self {
        Self {
            path: path.to_owned(),
            data: data.to_vec(),
            texture: Some(Texture { id, width, height }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Packet {
    pub name: String,
    pub guard: u32,
    pub compress: bool,
    pub ptx_before_number: u32,
    pub resources: Vec<Resource>,
    /// Whether the packet name is written to the name pool
    pub listed: bool,
    /// Stored bytes of the general part, replacing what the resources would produce
    pub stored_part0: Option<Vec<u8>>,
}

impl Packet {
    pub fn new(name: &str, resources: Vec<Resource>) -> Self {
        Self {
            name: name.to_owned(),
            guard: 0x5C,
            compress: false,
            ptx_before_number: 0,
            resources,
            listed: true,
            stored_part0: None,
        }
    }

    pub fn guard(mut self, guard: u32) -> Self {
        self.guard = guard;
        self
    }

    pub fn compressed(mut self) -> Self {
        self.compress = true;
        self
    }

    pub fn ptx_before_number(mut self, count: u32) -> Self {
        self.ptx_before_number = count;
        self
    }

    pub fn unlisted(mut self) -> Self {
        self.listed = false;
        self
    }

    pub fn stored_part0(mut self, stored: Vec<u8>) -> Self {
        self.stored_part0 = Some(stored);
        self
    }
}

#[derive(Debug, Clone)]
pub struct Reference {
    pub packet: u32,
    pub code: u32,
    pub tag: Option<[u8; 4]>,
}

#[derive(Debug, Clone)]
pub struct Composite {
    pub name: String,
    pub references: Vec<Reference>,
}

impl Composite {
    pub fn new(name: &str, packets: &[u32]) -> Self {
        Self {
            name: name.to_owned(),
            references: packets
                .iter()
                .map(|&packet| Reference {
                    packet,
                    code: 0,
                    tag: None,
                })
                .collect(),
        }
    }
}

/// Texture table entry: pitch, format, alpha size, alpha format
pub type TextureEntry = [u32; 4];

#[derive(Debug, Clone, Default)]
pub struct ContainerBuilder {
    pub composites: Vec<Composite>,
    pub packets: Vec<Packet>,
    pub ptx_stride: u32,
    pub textures: Vec<TextureEntry>,
}

pub fn zlib(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

fn align(value: usize, to: usize) -> usize {
    value.div_ceil(to) * to
}

fn put(data: &mut Vec<u8>, offset: usize, value: u32) {
    if data.len() < offset + 4 {
        data.resize(offset + 4, 0);
    }
    data[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

fn put_bytes(data: &mut Vec<u8>, offset: usize, bytes: &[u8]) {
    if data.len() < offset + bytes.len() {
        data.resize(offset + bytes.len(), 0);
    }
    data[offset..offset + bytes.len()].copy_from_slice(bytes);
}

/// Encode strings without any shared prefixes
fn string_units(value: &str) -> Vec<u8> {
    value
        .bytes()
        .chain(std::iter::once(0))
        .flat_map(|b| (b as u32).to_le_bytes())
        .collect()
}

impl ContainerBuilder {
    pub fn new() -> Self {
        Self {
            ptx_stride: 0x10,
            ..Default::default()
        }
    }

    pub fn packet(mut self, packet: Packet) -> Self {
        self.packets.push(packet);
        self
    }

    pub fn composite(mut self, composite: Composite) -> Self {
        self.composites.push(composite);
        self
    }

    pub fn textures(mut self, stride: u32, entries: Vec<TextureEntry>) -> Self {
        self.ptx_stride = stride;
        self.textures = entries;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut data = vec![0u8; HEADER_SIZE];
        put_bytes(&mut data, 0, b"1bsr");
        put(&mut data, 4, 4);

        // packet name pool
        let names_begin = HEADER_SIZE;
        let mut names = Vec::new();
        for (i, packet) in self.packets.iter().enumerate().filter(|(_, p)| p.listed) {
            names.extend(string_units(&packet.name));
            names.extend((i as u32).to_le_bytes());
        }
        put_bytes(&mut data, names_begin, &names);

        let composite_begin = align(names_begin + names.len(), 0x10);
        let rsg_begin = composite_begin + self.composites.len() * COMPOSITE_STRIDE;
        let ptx_begin = rsg_begin + self.packets.len() * RSG_STRIDE;
        let packets_begin = align(
            ptx_begin + self.textures.len() * self.ptx_stride as usize,
            0x1000,
        );

        // header
        put(&mut data, 0x20, names.len() as u32);
        put(&mut data, 0x24, names_begin as u32);
        put(&mut data, 0x28, self.packets.len() as u32);
        put(&mut data, 0x2C, rsg_begin as u32);
        put(&mut data, 0x30, RSG_STRIDE as u32);
        put(&mut data, 0x34, self.composites.len() as u32);
        put(&mut data, 0x38, composite_begin as u32);
        put(&mut data, 0x3C, COMPOSITE_STRIDE as u32);
        put(&mut data, 0x54, self.textures.len() as u32);
        put(&mut data, 0x58, ptx_begin as u32);
        put(&mut data, 0x5C, self.ptx_stride);
        put(&mut data, 0x6C, packets_begin as u32);

        // composites
        for (i, composite) in self.composites.iter().enumerate() {
            let base = composite_begin + i * COMPOSITE_STRIDE;
            let mut name = composite.name.as_bytes().to_vec();
            name.push(0);
            put_bytes(&mut data, base, &name);
            for (k, reference) in composite.references.iter().enumerate() {
                let entry = base + 0x80 + k * 0x10;
                put(&mut data, entry, reference.packet);
                put(&mut data, entry + 4, reference.code);
                match reference.tag {
                    Some(tag) => put_bytes(&mut data, entry + 8, &tag),
                    None => put(&mut data, entry + 8, 0),
                }
            }
            put(&mut data, base + 0x480, composite.references.len() as u32);
        }

        // texture table
        for (i, entry) in self.textures.iter().enumerate() {
            let base = ptx_begin + i * self.ptx_stride as usize;
            put(&mut data, base, 0xFFFF_FFFF);
            put(&mut data, base + 4, 0xFFFF_FFFF);
            for (k, value) in entry.iter().enumerate() {
                if 8 + k * 4 + 4 <= self.ptx_stride as usize {
                    put(&mut data, base + 8 + k * 4, *value);
                }
            }
        }

        // packets
        let mut position = packets_begin;
        for (i, packet) in self.packets.iter().enumerate() {
            let end = self.write_packet(&mut data, position, rsg_begin + i * RSG_STRIDE, packet);
            position = align(end + 1, 0x1000);
        }
        data.resize(position.max(data.len()), 0);

        data
    }

    fn write_packet(&self, data: &mut Vec<u8>, position: usize, info: usize, packet: &Packet) -> usize {
        let mut general = Vec::new();
        let mut atlas = Vec::new();
        let mut pool = Vec::new();
        let mut textures = 0;

        for resource in &packet.resources {
            pool.extend(string_units(&resource.path));
            let part = if resource.texture.is_some() {
                &mut atlas
            } else {
                &mut general
            };
            pool.extend((resource.texture.is_some() as u32).to_le_bytes());
            pool.extend((part.len() as u32).to_le_bytes());
            pool.extend((resource.data.len() as u32).to_le_bytes());
            part.extend_from_slice(&resource.data);

            if let Some(texture) = &resource.texture {
                textures += 1;
                pool.extend(texture.id.to_le_bytes());
                pool.extend([0u8; 8]);
                pool.extend(texture.width.to_le_bytes());
                pool.extend(texture.height.to_le_bytes());
            }
        }

        let pool_begin = match packet.guard {
            0x5C | 0xEC | 0x1000 => packet.guard as usize,
            _ => 0x5C,
        };
        put_bytes(data, position, b"pgsr");
        put(data, position + 0x48, pool.len() as u32);
        put(data, position + 0x4C, packet.guard);
        put_bytes(data, position + pool_begin, &pool);

        let store = |part: &[u8]| {
            if packet.compress {
                zlib(part)
            } else {
                part.to_vec()
            }
        };

        let part0_pos = align(pool_begin + pool.len(), 0x10);
        let stored0 = packet.stored_part0.clone().unwrap_or_else(|| store(&general));
        put_bytes(data, position + part0_pos, &stored0);

        let part1_pos = align(part0_pos + stored0.len(), 0x10);
        let stored1 = store(&atlas);
        if textures > 0 {
            put_bytes(data, position + part1_pos, &stored1);
        }

        put(data, info + 0x80, position as u32);
        put(data, info + 0x94, part0_pos as u32);
        put(data, info + 0x98, general.len() as u32);
        put(data, info + 0x9C, stored0.len() as u32);
        put(data, info + 0xA4, part1_pos as u32);
        put(data, info + 0xA8, atlas.len() as u32);
        put(data, info + 0xAC, stored1.len() as u32);
        put(data, info + RSG_STRIDE - 8, textures);
        put(data, info + RSG_STRIDE - 4, packet.ptx_before_number);

        position + part1_pos + stored1.len()
    }
}
