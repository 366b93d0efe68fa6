use crate::{index_range, ReadableRelative};
use bitflags::bitflags;
use bytemuck::{Pod, Zeroable};
use std::mem::size_of;
use std::ops::Range;

pub const VTX_VERSION: i32 = 7;

#[derive(Debug, Clone, Copy, Zeroable, Pod)]
#[repr(C)]
pub struct VtxHeader {
    pub version: i32,
    pub vertex_cache_size: i32,
    pub max_bones_per_strip: u16,
    pub max_bones_per_triangle: u16,
    pub max_bones_per_vertex: i32,
    pub checksum: i32,
    pub lod_count: i32,
    pub material_replacement_list: i32,
    body_part_count: i32,
    body_part_offset: i32,
}

static_assertions::const_assert_eq!(size_of::<VtxHeader>(), 36);

impl ReadableRelative for VtxHeader {}

impl VtxHeader {
    pub fn body_indexes(&self) -> impl Iterator<Item = usize> {
        index_range(
            self.body_part_offset,
            self.body_part_count,
            size_of::<BodyPartHeader>(),
        )
    }
}

#[derive(Debug, Clone, Copy, Zeroable, Pod)]
#[repr(C)]
pub struct BodyPartHeader {
    model_count: i32,
    model_offset: i32,
}

static_assertions::const_assert_eq!(size_of::<BodyPartHeader>(), 8);

impl BodyPartHeader {
    pub fn model_indexes(&self) -> impl Iterator<Item = usize> {
        index_range(
            self.model_offset,
            self.model_count,
            size_of::<ModelHeader>(),
        )
    }
}

#[derive(Debug, Clone, Copy, Zeroable, Pod)]
#[repr(C)]
pub struct ModelHeader {
    lod_count: i32,
    lod_offset: i32,
}

static_assertions::const_assert_eq!(size_of::<ModelHeader>(), 8);

impl ModelHeader {
    pub fn lod_indexes(&self) -> impl Iterator<Item = usize> {
        index_range(self.lod_offset, self.lod_count, size_of::<ModelLodHeader>())
    }
}

#[derive(Debug, Clone, Copy, Zeroable, Pod)]
#[repr(C)]
pub struct ModelLodHeader {
    mesh_count: i32,
    mesh_offset: i32,
    pub switch_point: f32,
}

static_assertions::const_assert_eq!(size_of::<ModelLodHeader>(), 12);

impl ModelLodHeader {
    pub fn mesh_indexes(&self) -> impl Iterator<Item = usize> {
        index_range(self.mesh_offset, self.mesh_count, size_of::<MeshHeader>())
    }
}

#[derive(Debug, Clone, Copy, Zeroable, Pod)]
#[repr(C, packed)]
pub struct MeshHeader {
    strip_group_count: i32,
    strip_group_offset: i32,
    pub flags: MeshFlags,
}

static_assertions::const_assert_eq!(size_of::<MeshHeader>(), 9);

impl MeshHeader {
    pub fn strip_group_indexes(&self) -> impl Iterator<Item = usize> {
        index_range(
            self.strip_group_offset,
            self.strip_group_count,
            size_of::<StripGroupHeader>(),
        )
    }
}

#[derive(Zeroable, Pod, Copy, Clone, Debug)]
#[repr(C)]
pub struct MeshFlags(u8);

bitflags! {
    impl MeshFlags: u8 {
        const IS_TEETH = 0x01;
        const IS_EYES =  0x02;
    }
}

#[derive(Debug, Clone, Copy, Zeroable, Pod)]
#[repr(C, packed)]
pub struct StripGroupHeader {
    vertex_count: i32,
    vertex_offset: i32,
    index_count: i32,
    index_offset: i32,
    strip_count: i32,
    strip_offset: i32,
    pub flags: StripGroupFlags,
}

static_assertions::const_assert_eq!(size_of::<StripGroupHeader>(), 25);

impl StripGroupHeader {
    /// Positions of the per strip-group vertex refs into the vvd stream.
    pub fn vertex_indexes(&self) -> impl Iterator<Item = usize> {
        index_range(self.vertex_offset, self.vertex_count, size_of::<Vertex>())
    }

    pub fn index_indexes(&self) -> impl Iterator<Item = usize> {
        index_range(self.index_offset, self.index_count, size_of::<u16>())
    }

    pub fn strip_indexes(&self) -> impl Iterator<Item = usize> {
        index_range(
            self.strip_offset,
            self.strip_count,
            size_of::<StripHeader>(),
        )
    }
}

#[derive(Zeroable, Pod, Copy, Clone, Debug)]
#[repr(C)]
pub struct StripGroupFlags(u8);

bitflags! {
    impl StripGroupFlags: u8 {
        const IS_FLEXED =         0x01;
        const IS_HWSKINNED =      0x02;
        const IS_DELTA_FLEXED =   0x04;
        const SUPPRESS_HW_MORPH = 0x08;
    }
}

#[derive(Debug, Clone, Copy, Zeroable, Pod)]
#[repr(C, packed)]
#[allow(dead_code)]
pub struct StripHeader {
    index_count: i32,
    index_offset: i32,
    vertex_count: i32,
    vertex_offset: i32,
    pub bone_count: u16,
    pub flags: StripFlags,
    bone_state_change_count: i32,
    bone_state_change_offset: i32,
}

static_assertions::const_assert_eq!(size_of::<StripHeader>(), 27);

#[derive(Zeroable, Pod, Copy, Clone, Debug)]
#[repr(C)]
pub struct StripFlags(u8);

bitflags! {
    impl StripFlags: u8 {
        const IS_TRI_LIST =  0x01;
        const IS_TRI_STRIP = 0x02;
    }
}

impl StripHeader {
    /// Window into the strip group's index array.
    pub fn index_indexes(&self) -> Range<usize> {
        let start = self.index_offset.max(0) as usize;
        start..start + self.index_count.max(0) as usize
    }
}

#[derive(Debug, Clone, Copy, Zeroable, Pod)]
#[repr(C, packed)]
pub struct Vertex {
    pub bone_weight_indexes: [u8; 3],
    pub bone_count: u8,
    pub original_mesh_vertex_id: u16,
    pub bone_id: [u8; 3],
}

static_assertions::const_assert_eq!(size_of::<Vertex>(), 9);

impl ReadableRelative for Vertex {}
