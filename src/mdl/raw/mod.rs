use crate::{index_range, read_relative, read_single, FixedString, ModelError, ReadRelative, Vector};
use bitflags::bitflags;
use bytemuck::{Pod, Zeroable};
use std::mem::size_of;

mod animation;
mod bones;
pub mod header;

pub use animation::*;
pub use bones::*;
pub use header::*;

#[derive(Debug, Clone, Copy, Zeroable, Pod)]
#[repr(C)]
pub struct BodyPartHeader {
    pub name_index: i32,
    model_count: i32,
    pub base: i32,
    model_index: i32,
}

static_assertions::const_assert_eq!(size_of::<BodyPartHeader>(), 16);

impl BodyPartHeader {
    pub fn model_indexes(&self) -> impl Iterator<Item = usize> {
        index_range(self.model_index, self.model_count, size_of::<ModelHeader>())
    }
}

/// A group of interchangeable sub-models for one region of the model.
#[derive(Debug, Clone)]
pub struct BodyPart {
    pub name: String,
    pub models: Vec<SubModel>,
}

impl ReadRelative for BodyPart {
    type Header = BodyPartHeader;

    fn read(data: &[u8], header: Self::Header) -> Result<Self, ModelError> {
        Ok(BodyPart {
            name: read_single(data, header.name_index)?,
            models: read_relative(data, header.model_indexes())?,
        })
    }
}

#[derive(Debug, Clone, Copy, Zeroable, Pod)]
#[repr(C)]
#[allow(dead_code)]
pub struct ModelHeader {
    pub name: [u8; 64],
    pub ty: i32,
    pub bounding_radius: f32,
    mesh_count: i32,
    mesh_index: i32,
    vertex_count: i32,
    pub vertex_index: i32,
    tangent_index: i32,
    attachment_count: i32,
    attachment_index: i32,
    eyeball_count: i32,
    eyeball_index: i32,
    pub vertex_data: ModelVertexData,
    padding: [i32; 8],
}

static_assertions::const_assert_eq!(size_of::<ModelHeader>(), 148);

impl ModelHeader {
    pub fn mesh_indexes(&self) -> impl Iterator<Item = usize> {
        index_range(self.mesh_index, self.mesh_count, size_of::<MeshHeader>())
    }

    pub fn eyeball_indexes(&self) -> impl Iterator<Item = usize> {
        index_range(
            self.eyeball_index,
            self.eyeball_count,
            size_of::<EyeballHeader>(),
        )
    }
}

#[derive(Debug, Clone, Copy, Zeroable, Pod)]
#[repr(C)]
#[allow(dead_code)]
pub struct ModelVertexData {
    // pointers at runtime, junk on disk
    vertex_data: i32,
    tangent_data: i32,
}

/// A sub-model of a body part, owning a contiguous window of the vvd vertex stream.
#[derive(Debug, Clone)]
pub struct SubModel {
    pub name: FixedString<64>,
    /// Byte offset of this model's first vertex in the vvd vertex stream.
    pub vertex_index: i32,
    pub meshes: Vec<SubMesh>,
    pub eyeballs: Vec<Eyeball>,
}

impl ReadRelative for SubModel {
    type Header = ModelHeader;

    fn read(data: &[u8], header: Self::Header) -> Result<Self, ModelError> {
        Ok(SubModel {
            name: FixedString::try_from(header.name)?,
            vertex_index: header.vertex_index,
            meshes: read_relative(data, header.mesh_indexes())?,
            eyeballs: read_relative(data, header.eyeball_indexes())?,
        })
    }
}

#[derive(Debug, Clone, Copy, Zeroable, Pod)]
#[repr(C)]
#[allow(dead_code)]
pub struct MeshHeader {
    pub material: i32,
    model_index: i32,
    vertex_count: i32,
    pub vertex_index: i32,
    flex_count: i32,
    flex_index: i32,
    pub material_type: i32,
    pub material_param: i32,
    pub mesh_id: i32,
    pub center: Vector,
    vertex_data: MeshVertexData,
    padding: [i32; 8],
}

static_assertions::const_assert_eq!(size_of::<MeshHeader>(), 116);

#[derive(Debug, Clone, Copy, Zeroable, Pod)]
#[repr(C)]
#[allow(dead_code)]
pub struct MeshVertexData {
    model_vertex_data: i32,
    lod_vertex_count: [i32; 8],
}

/// A sub-mesh of a sub-model, one material per sub-mesh.
#[derive(Debug, Clone)]
pub struct SubMesh {
    /// Index into the mdl texture table.
    pub material: i32,
    /// First vertex of the sub-mesh, in vertices, relative to the owning sub-model.
    pub vertex_offset: i32,
}

impl ReadRelative for SubMesh {
    type Header = MeshHeader;

    fn read(_data: &[u8], header: Self::Header) -> Result<Self, ModelError> {
        Ok(SubMesh {
            material: header.material,
            vertex_offset: header.vertex_index,
        })
    }
}

#[derive(Debug, Clone, Copy, Zeroable, Pod)]
#[repr(C)]
#[allow(dead_code)]
pub struct EyeballHeader {
    pub name_index: i32,
    pub bone: i32,
    pub org: Vector,
    pub z_offset: f32,
    pub radius: f32,
    pub up: Vector,
    pub forward: Vector,
    pub texture: i32,
    unused1: i32,
    pub iris_scale: f32,
    unused2: i32,
    upper_flex_desc: [i32; 3],
    lower_flex_desc: [i32; 3],
    upper_target: [f32; 3],
    lower_target: [f32; 3],
    upper_lid_flex_desc: i32,
    lower_lid_flex_desc: i32,
    unused3: [i32; 4],
    non_facs: u8,
    unused4: [u8; 3],
    unused5: [i32; 7],
}

static_assertions::const_assert_eq!(size_of::<EyeballHeader>(), 172);

#[derive(Debug, Clone)]
pub struct Eyeball {
    pub name: String,
    pub origin: Vector,
    pub radius: f32,
    pub up: Vector,
    pub forward: Vector,
    /// Index into the mdl texture table of the iris texture.
    pub texture: i32,
    pub iris_scale: f32,
}

impl ReadRelative for Eyeball {
    type Header = EyeballHeader;

    fn read(data: &[u8], header: Self::Header) -> Result<Self, ModelError> {
        Ok(Eyeball {
            name: read_single(data, header.name_index)?,
            origin: header.org,
            radius: header.radius,
            up: header.up,
            forward: header.forward,
            texture: header.texture,
            iris_scale: header.iris_scale,
        })
    }
}

#[derive(Debug, Clone, Copy, Zeroable, Pod)]
#[repr(C)]
#[allow(dead_code)]
pub struct MeshTexture {
    pub name_index: i32, // relative offset to this struct
    pub flags: TextureFlags,
    pub used: i32,
    _padding: i32,
    pub material_ptr: i32,
    pub client_material_ptr: i32,
    _padding2: [i32; 10],
}

static_assertions::const_assert_eq!(size_of::<MeshTexture>(), 16 * 4);

#[derive(Zeroable, Pod, Copy, Clone, Debug)]
#[repr(C)]
pub struct TextureFlags(u32);

bitflags! {
    impl TextureFlags: u32 {
        const SELF_ILLUM = 0x0001;
        const HALF_LAMBERT = 0x0002;
    }
}

#[derive(Debug, Clone)]
pub struct Texture {
    pub name: String,
    pub flags: TextureFlags,
}

impl ReadRelative for Texture {
    type Header = MeshTexture;

    fn read(data: &[u8], header: Self::Header) -> Result<Self, ModelError> {
        Ok(Texture {
            name: read_single(data, header.name_index)?,
            flags: header.flags,
        })
    }
}
