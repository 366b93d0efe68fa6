use crate::{
    read_single, ModelError, Quaternion, RadianEuler, ReadRelative, Transform3x4, Vector,
};
use bitflags::bitflags;
use bytemuck::{Pod, Zeroable};
use std::mem::size_of;

#[derive(Debug, Clone, Copy, Zeroable, Pod)]
#[repr(C)]
pub struct BoneHeader {
    pub sz_name_index: i32,
    pub parent: i32,               // parent bone, -1 == root
    pub bone_controller: [i32; 6], // bone controller index, -1 == none

    pub pos: Vector,
    pub quaternion: Quaternion,
    pub rot: RadianEuler,
    pub pos_scale: Vector,
    pub rot_scale: Vector,

    pub pose_to_bone: Transform3x4,
    pub q_alignment: Quaternion,
    pub flags: BoneFlags,
    pub proc_type: i32,
    pub proc_index: i32,
    pub physics_bone: i32,
    pub surface_prop_idx: i32,
    pub contents: i32,

    #[allow(dead_code)]
    reserved: [i32; 8],
}

static_assertions::const_assert_eq!(size_of::<BoneHeader>(), 216);

/// A bone of the skeleton, local transform relative to the parent.
///
/// The scale vectors apply to the compressed per-axis animation tracks of this bone.
#[derive(Debug, Clone)]
pub struct Bone {
    pub name: String,
    pub parent: i32,
    pub pos: Vector,
    pub quaternion: Quaternion,
    pub rot: RadianEuler,
    pub pos_scale: Vector,
    pub rot_scale: Vector,
    pub flags: BoneFlags,
}

impl Bone {
    pub fn parent(&self) -> Option<usize> {
        usize::try_from(self.parent).ok()
    }
}

impl ReadRelative for Bone {
    type Header = BoneHeader;

    fn read(data: &[u8], header: Self::Header) -> Result<Self, ModelError> {
        Ok(Bone {
            name: read_single(data, header.sz_name_index)?,
            parent: header.parent,
            pos: header.pos,
            quaternion: header.quaternion,
            rot: header.rot,
            pos_scale: header.pos_scale,
            rot_scale: header.rot_scale,
            flags: header.flags,
        })
    }
}

#[derive(Zeroable, Pod, Copy, Clone, Debug)]
#[repr(C)]
pub struct BoneFlags(u32);

bitflags! {
    impl BoneFlags: u32 {
        const BONE_PHYSICALLY_SIMULATED = 	0x00000001;
        const BONE_PHYSICS_PROCEDURAL = 	0x00000002;
        const BONE_ALWAYS_PROCEDURAL = 		0x00000004;
        const BONE_SCREEN_ALIGN_SPHERE = 	0x00000008;
        const BONE_SCREEN_ALIGN_CYLINDER = 	0x00000010;

        const BONE_USED_BY_HITBOX =			0x00000100;
        const BONE_USED_BY_ATTACHMENT =		0x00000200;

        const BONE_USED_BY_VERTEX_LOD0 =	0x00000400;
        const BONE_USED_BY_VERTEX_LOD1 =	0x00000800;
        const BONE_USED_BY_VERTEX_LOD2 =	0x00001000;
        const BONE_USED_BY_VERTEX_LOD3 =	0x00002000;
        const BONE_USED_BY_VERTEX_LOD4 =	0x00004000;
        const BONE_USED_BY_VERTEX_LOD5 =	0x00008000;
        const BONE_USED_BY_VERTEX_LOD6 =	0x00010000;
        const BONE_USED_BY_VERTEX_LOD7 =	0x00020000;
        const BONE_USED_BY_BONE_MERGE =		0x00040000;

        const BONE_TYPE_MASK =				0x00F00000;
        const BONE_FIXED_ALIGNMENT =		0x00100000;

        const BONE_HAS_SAVEFRAME_POS =		0x00200000;
        const BONE_HAS_SAVEFRAME_ROT =		0x00400000;
    }
}
