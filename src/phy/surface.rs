use super::ConvexHull;
use crate::phy::raw::*;
use crate::{read_single, ModelError};
use std::mem::size_of;

type Result<T> = std::result::Result<T, ModelError>;

/// Decode the convex hulls of a single solid blob.
///
/// Ledges with fewer than 4 distinct points don't span a volume and are dropped.
pub(super) fn read_solid(blob: &[u8]) -> Result<Vec<ConvexHull>> {
    let surface_offset = surface_offset(blob)?;
    let surface: CompactSurface = read_single(blob, surface_offset)?;
    let root = offset_by(surface_offset, surface.offset_ledgetree_root)?;

    let mut hulls = Vec::new();
    for ledge_offset in walk_ledge_tree(blob, root)? {
        if let Some(hull) = read_ledge(blob, ledge_offset)? {
            hulls.push(hull);
        }
    }
    Ok(hulls)
}

/// Position of the compact surface in the blob.
///
/// Newer files prefix the surface with a `VPHY` collide header, older files store the
/// raw compact surface with its identifier embedded at byte 44.
fn surface_offset(blob: &[u8]) -> Result<usize> {
    let collide: CollideHeader = read_single(blob, 0usize)?;
    if collide.id == VPHY_ID {
        match CollideType::try_from(collide.model_type) {
            Ok(CollideType::Poly) => {
                Ok(size_of::<CollideHeader>() + size_of::<CompactSurfaceHeader>())
            }
            _ => Err(ModelError::UnsupportedSolid("non convex-hull collide model")),
        }
    } else {
        let id = blob.get(44..48).ok_or(ModelError::OutOfBounds {
            data: "compact surface identifier",
            offset: 44,
        })?;
        if id == [0; 4] || id == IVP_SURFACE_ID || id == IVP_SURFACE_ID_SWAPPED {
            Ok(0)
        } else {
            Err(ModelError::UnsupportedSolid("unknown compact surface identifier"))
        }
    }
}

/// Collect the ledge offsets of the tree rooted at `root`, iteratively with an explicit
/// stack.
///
/// The node budget bounds the walk on malformed trees whose offsets form a cycle.
fn walk_ledge_tree(data: &[u8], root: usize) -> Result<Vec<usize>> {
    let mut ledges = Vec::new();
    let mut stack = vec![root];
    let mut budget = data.len() / size_of::<LedgeNode>() + 1;

    while let Some(offset) = stack.pop() {
        budget = budget
            .checked_sub(1)
            .ok_or(ModelError::OutOfBounds {
                data: "ledge tree",
                offset,
            })?;
        let node: LedgeNode = read_single(data, offset)?;
        if node.offset_compact_ledge != 0 {
            ledges.push(offset_by(offset, node.offset_compact_ledge)?);
        }
        if node.offset_right_node != 0 {
            stack.push(offset_by(offset, node.offset_right_node)?);
            stack.push(offset + size_of::<LedgeNode>());
        }
    }
    Ok(ledges)
}

fn read_ledge(data: &[u8], ledge_offset: usize) -> Result<Option<ConvexHull>> {
    let ledge: CompactLedge = read_single(data, ledge_offset)?;
    let points_offset = offset_by(ledge_offset, ledge.c_point_offset)?;
    let triangles_offset = ledge_offset + size_of::<CompactLedge>();

    // distinct point indices in first-seen order
    let mut indices: Vec<u16> = Vec::new();
    for triangle_index in 0..ledge.n_triangles.max(0) as usize {
        let triangle: CompactTriangle = read_single(
            data,
            triangles_offset + triangle_index * size_of::<CompactTriangle>(),
        )?;
        for edge in triangle.edges {
            let point = edge.start_point_index();
            if !indices.contains(&point) {
                indices.push(point);
            }
        }
    }
    if indices.len() < 4 {
        return Ok(None);
    }

    let points = indices
        .into_iter()
        .map(|index| {
            read_single::<PolyPoint, _>(
                data,
                points_offset + index as usize * size_of::<PolyPoint>(),
            )
            .map(PolyPoint::to_source)
        })
        .collect::<Result<_>>()?;
    Ok(Some(ConvexHull { points }))
}

fn offset_by(base: usize, offset: i32) -> Result<usize> {
    base.checked_add_signed(offset as isize)
        .ok_or(ModelError::OutOfBounds {
            data: "compact surface offset",
            offset: base,
        })
}
