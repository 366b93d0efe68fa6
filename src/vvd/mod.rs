mod raw;

use crate::{read_relative, read_single, ModelError, Readable};
pub use raw::{BoneWeights, Tangent, Vertex, VertexFileFixup, VvdHeader, VVD_ID, VVD_VERSION};
use std::ops::Range;

type Result<T> = std::result::Result<T, ModelError>;

/// The vvd vertex stream for a single root lod, fixups already applied.
#[derive(Debug, Clone)]
pub struct Vvd {
    pub header: VvdHeader,
    pub vertices: Vec<Vertex>,
    pub tangents: Vec<Tangent>,
}

impl Vvd {
    pub fn read(data: &[u8], root_lod: i32) -> Result<Self> {
        let header = VvdHeader::read(data)?;
        if header.id != VVD_ID || header.version != VVD_VERSION {
            return Err(ModelError::MissingSibling { file: "vvd" });
        }

        let mut vertices = Vec::new();
        let mut tangents = Vec::new();
        for range in vertex_ranges(&header, data, root_lod)? {
            for vertex in range {
                vertices.push(read_single(data, header.vertex_index(vertex))?);
                tangents.push(read_single(data, header.tangent_index(vertex))?);
            }
        }

        Ok(Vvd {
            header,
            vertices,
            tangents,
        })
    }
}

/// Source-stream vertex ranges making up the stream for `root_lod`, in fixup order.
///
/// Lower lods are stored as sub-ranges of the lod 0 stream, remapped by the fixup
/// table. Without fixups the stream is a plain prefix.
fn vertex_ranges(header: &VvdHeader, data: &[u8], root_lod: i32) -> Result<Vec<Range<usize>>> {
    if header.has_fixups() {
        let fixups: Vec<VertexFileFixup> = read_relative(data, header.fixup_indexes())?;
        Ok(fixups
            .into_iter()
            .filter(|fixup| fixup.lod >= root_lod)
            .map(|fixup| {
                let start = fixup.source_vertex_id.max(0) as usize;
                start..start + fixup.vertex_count.max(0) as usize
            })
            .collect())
    } else {
        Ok(vec![0..header.lod_vertex_count(root_lod)])
    }
}
