use crate::{index_range, ReadableRelative, Vector};
use bytemuck::{Pod, Zeroable};
use std::mem::size_of;

pub const VVD_ID: i32 = i32::from_le_bytes(*b"IDSV");
pub const VVD_VERSION: i32 = 4;

pub const MAX_LODS: usize = 8;

#[derive(Debug, Clone, Copy, Zeroable, Pod)]
#[repr(C)]
pub struct VvdHeader {
    pub id: i32,
    pub version: i32,
    pub checksum: i32,
    pub lod_count: i32,
    lod_vertex_count: [i32; MAX_LODS],
    fixup_count: i32,
    fixup_index: i32,
    vertex_index: i32,
    tangent_index: i32,
}

static_assertions::const_assert_eq!(size_of::<VvdHeader>(), 64);

impl ReadableRelative for VvdHeader {}

impl VvdHeader {
    pub fn fixup_indexes(&self) -> impl Iterator<Item = usize> {
        index_range(
            self.fixup_index,
            self.fixup_count,
            size_of::<VertexFileFixup>(),
        )
    }

    pub fn has_fixups(&self) -> bool {
        self.fixup_count > 0
    }

    pub fn lod_vertex_count(&self, lod: i32) -> usize {
        if (0..self.lod_count.min(MAX_LODS as i32)).contains(&lod) {
            self.lod_vertex_count[lod as usize].max(0) as usize
        } else {
            0
        }
    }

    /// Byte offset of a vertex in the vertex stream.
    pub fn vertex_index(&self, vertex: usize) -> usize {
        usize::try_from(self.vertex_index).unwrap_or(usize::MAX)
            .saturating_add(vertex * size_of::<Vertex>())
    }

    /// Byte offset of a tangent in the tangent stream, parallel to the vertex stream.
    pub fn tangent_index(&self, vertex: usize) -> usize {
        usize::try_from(self.tangent_index).unwrap_or(usize::MAX)
            .saturating_add(vertex * size_of::<Tangent>())
    }
}

#[derive(Debug, Clone, Zeroable, Pod, Copy)]
#[repr(C)]
pub struct VertexFileFixup {
    pub lod: i32,
    pub source_vertex_id: i32,
    pub vertex_count: i32,
}

static_assertions::const_assert_eq!(size_of::<VertexFileFixup>(), 12);

impl ReadableRelative for VertexFileFixup {}

#[derive(Debug, Clone, Zeroable, Pod, Copy)]
#[repr(C)]
pub struct Vertex {
    pub bone_weights: BoneWeights,
    pub position: Vector,
    pub normal: Vector,
    pub texture_coordinates: [f32; 2],
}

static_assertions::const_assert_eq!(size_of::<Vertex>(), 48);

impl ReadableRelative for Vertex {}

#[derive(Debug, Clone, Zeroable, Pod, Copy)]
#[repr(C)]
pub struct BoneWeights {
    pub weight: [f32; 3],
    pub bone: [u8; 3],
    pub bone_count: u8,
}

static_assertions::const_assert_eq!(size_of::<BoneWeights>(), 16);

#[derive(Debug, Clone, Zeroable, Pod, Copy)]
#[repr(C)]
pub struct Tangent {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

static_assertions::const_assert_eq!(size_of::<Tangent>(), 16);

impl ReadableRelative for Tangent {}
