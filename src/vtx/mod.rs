mod raw;

use crate::{read_relative, ModelError, ReadRelative, Readable};
use itertools::Either;
pub use raw::{MeshFlags, StripFlags, StripGroupFlags, Vertex, VtxHeader, VTX_VERSION};
use raw::*;
use std::ops::Range;

type Result<T> = std::result::Result<T, ModelError>;

/// The renderable topology of a model, one entry per mdl body part.
#[derive(Debug, Clone)]
pub struct Vtx {
    pub header: VtxHeader,
    pub body_parts: Vec<BodyPart>,
}

impl Vtx {
    pub fn read(data: &[u8]) -> Result<Self> {
        let header = <VtxHeader as Readable>::read(data)?;
        if header.version != VTX_VERSION {
            return Err(ModelError::MissingSibling { file: "vtx" });
        }
        Ok(Vtx {
            body_parts: read_relative(data, header.body_indexes())?,
            header,
        })
    }
}

#[derive(Debug, Clone)]
pub struct BodyPart {
    pub models: Vec<Model>,
}

impl ReadRelative for BodyPart {
    type Header = BodyPartHeader;

    fn read(data: &[u8], header: Self::Header) -> Result<Self> {
        Ok(BodyPart {
            models: read_relative(data, header.model_indexes())?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Model {
    pub lods: Vec<ModelLod>,
}

impl ReadRelative for Model {
    type Header = ModelHeader;

    fn read(data: &[u8], header: Self::Header) -> Result<Self> {
        Ok(Model {
            lods: read_relative(data, header.lod_indexes())?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ModelLod {
    pub meshes: Vec<Mesh>,
    pub switch_point: f32,
}

impl ReadRelative for ModelLod {
    type Header = ModelLodHeader;

    fn read(data: &[u8], header: Self::Header) -> Result<Self> {
        Ok(ModelLod {
            meshes: read_relative(data, header.mesh_indexes())?,
            switch_point: header.switch_point,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Mesh {
    pub strip_groups: Vec<StripGroup>,
    pub flags: MeshFlags,
}

impl ReadRelative for Mesh {
    type Header = MeshHeader;

    fn read(data: &[u8], header: Self::Header) -> Result<Self> {
        Ok(Mesh {
            strip_groups: read_relative(data, header.strip_group_indexes())?,
            flags: header.flags,
        })
    }
}

/// A batch of primitives sharing a window of the vvd vertex stream.
#[derive(Debug, Clone)]
pub struct StripGroup {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u16>,
    pub strips: Vec<Strip>,
    pub flags: StripGroupFlags,
}

impl ReadRelative for StripGroup {
    type Header = StripGroupHeader;

    fn read(data: &[u8], header: Self::Header) -> Result<Self> {
        Ok(StripGroup {
            vertices: read_relative(data, header.vertex_indexes())?,
            indices: read_relative(data, header.index_indexes())?,
            strips: read_relative(data, header.strip_indexes())?,
            flags: header.flags,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Strip {
    indices: Range<usize>,
    pub flags: StripFlags,
}

impl ReadRelative for Strip {
    type Header = StripHeader;

    fn read(_data: &[u8], header: Self::Header) -> Result<Self> {
        Ok(Strip {
            indices: header.index_indexes(),
            flags: header.flags,
        })
    }
}

impl Strip {
    /// Triangles as positions into the owning strip group's index array.
    ///
    /// Triangle strips yield `index_count - 2` triangles with the first two corners
    /// swapped on odd positions to keep a consistent winding, triangle lists yield one
    /// triangle per three indices.
    pub fn triangles(&self) -> impl Iterator<Item = [usize; 3]> + 'static {
        let offset = self.indices.start;
        let count = self.indices.len();
        if self.flags.contains(StripFlags::IS_TRI_STRIP) {
            Either::Left((0..count.saturating_sub(2)).map(move |i| {
                let position = offset + i;
                if i % 2 == 0 {
                    [position, position + 1, position + 2]
                } else {
                    [position + 1, position, position + 2]
                }
            }))
        } else {
            Either::Right(
                (0..count / 3).map(move |i| [offset + i * 3, offset + i * 3 + 1, offset + i * 3 + 2]),
            )
        }
    }
}
