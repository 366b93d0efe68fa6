use crate::{ReadableRelative, Vector};
use bytemuck::{Pod, Zeroable};
use num_enum::TryFromPrimitive;
use std::mem::size_of;

pub const VPHY_ID: i32 = i32::from_le_bytes(*b"VPHY");
pub const IVP_SURFACE_ID: [u8; 4] = *b"IVPS";
pub const IVP_SURFACE_ID_SWAPPED: [u8; 4] = *b"SPVI";

/// Meters to inches, ivp stores its geometry in meters.
pub const IVP_TO_SOURCE: f32 = 39.3701;

#[derive(Debug, Clone, Copy, Zeroable, Pod)]
#[repr(C)]
pub struct PhyHeader {
    pub header_size: i32,
    pub id: i32,
    pub solid_count: i32,
    pub checksum: i32,
}

static_assertions::const_assert_eq!(size_of::<PhyHeader>(), 16);

impl ReadableRelative for PhyHeader {}

#[derive(Debug, Clone, Copy, Zeroable, Pod)]
#[repr(C)]
pub struct CollideHeader {
    pub id: i32,
    pub version: i16,
    pub model_type: i16,
}

static_assertions::const_assert_eq!(size_of::<CollideHeader>(), 8);

impl ReadableRelative for CollideHeader {}

#[derive(Debug, Copy, Clone, TryFromPrimitive)]
#[repr(i16)]
pub enum CollideType {
    Poly = 0,
    Mopp = 1,
    Ball = 2,
    Virtual = 3,
}

/// `compactsurfaceheader_t`, skipped between the collide header and the compact surface.
#[derive(Debug, Clone, Copy, Zeroable, Pod)]
#[repr(C)]
#[allow(dead_code)]
pub struct CompactSurfaceHeader {
    pub surface_size: i32,
    pub drag_axis_areas: Vector,
    pub axis_map_size: i32,
}

static_assertions::const_assert_eq!(size_of::<CompactSurfaceHeader>(), 20);

/// The ivp compact surface, the ledge tree root offset is relative to the surface start.
#[derive(Debug, Clone, Copy, Zeroable, Pod)]
#[repr(C)]
#[allow(dead_code)]
pub struct CompactSurface {
    pub mass_center: Vector,
    pub rotation_inertia: Vector,
    pub upper_limit_radius: f32,
    size_and_max_deviation: i32,
    pub offset_ledgetree_root: i32,
    dummy: [i32; 3],
}

static_assertions::const_assert_eq!(size_of::<CompactSurface>(), 48);

impl ReadableRelative for CompactSurface {}

/// A ledge tree node, child and ledge offsets are relative to the node's own position.
///
/// A node with `offset_right_node == 0` is a leaf, the left child directly follows its
/// parent in the buffer.
#[derive(Debug, Clone, Copy, Zeroable, Pod)]
#[repr(C)]
#[allow(dead_code)]
pub struct LedgeNode {
    pub offset_right_node: i32,
    pub offset_compact_ledge: i32,
    center: Vector,
    radius: f32,
    box_sizes: [u8; 3],
    free_0: u8,
}

static_assertions::const_assert_eq!(size_of::<LedgeNode>(), 28);

impl ReadableRelative for LedgeNode {}

/// A convex ledge, the point array offset is relative to the ledge, the triangles
/// directly follow it.
#[derive(Debug, Clone, Copy, Zeroable, Pod)]
#[repr(C)]
#[allow(dead_code)]
pub struct CompactLedge {
    pub c_point_offset: i32,
    ledgetree_node_offset: i32,
    flags: i32,
    pub n_triangles: i16,
    for_future_use: i16,
}

static_assertions::const_assert_eq!(size_of::<CompactLedge>(), 16);

impl ReadableRelative for CompactLedge {}

#[derive(Debug, Clone, Copy, Zeroable, Pod)]
#[repr(C)]
#[allow(dead_code)]
pub struct CompactTriangle {
    header: u32,
    pub edges: [CompactEdge; 3],
}

static_assertions::const_assert_eq!(size_of::<CompactTriangle>(), 16);

impl ReadableRelative for CompactTriangle {}

#[derive(Debug, Clone, Copy, Zeroable, Pod)]
#[repr(C)]
pub struct CompactEdge(u32);

impl CompactEdge {
    pub fn start_point_index(&self) -> u16 {
        (self.0 & 0xFFFF) as u16
    }
}

/// A point of the ledge point array, ivp coordinates in meters plus the hesse distance.
#[derive(Debug, Clone, Copy, Zeroable, Pod)]
#[repr(C)]
#[allow(dead_code)]
pub struct PolyPoint {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    hesse: f32,
}

static_assertions::const_assert_eq!(size_of::<PolyPoint>(), 16);

impl ReadableRelative for PolyPoint {}

impl PolyPoint {
    /// Convert from the ivp coordinate system (meters, y up) to source (inches, z up).
    pub fn to_source(self) -> Vector {
        Vector {
            x: self.x * IVP_TO_SOURCE,
            y: self.z * IVP_TO_SOURCE,
            z: -self.y * IVP_TO_SOURCE,
        }
    }
}
