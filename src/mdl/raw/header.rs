use crate::mdl::raw::{
    AnimationBlock, AnimationDescriptionHeader, BodyPartHeader, BoneHeader, IncludeModelHeader,
    MeshTexture, SequenceHeader,
};
use crate::{index_range, ReadableRelative, Vector};
use bitflags::bitflags;
use bytemuck::{Pod, Zeroable};
use std::mem::size_of;
use std::ops::RangeInclusive;

pub const FILETYPE_ID: i32 = i32::from_le_bytes(*b"IDST");
pub const MDL_VERSIONS: RangeInclusive<i32> = 44..=49;

#[derive(Debug, Clone, Copy, Zeroable, Pod)]
#[repr(C)]
#[allow(dead_code)]
pub struct StudioHeader {
    pub id: i32,
    pub version: i32,
    pub checksum: i32, // This has to be the same in the vvd, vtx and phy files to load!
    pub name: [u8; 64],
    pub data_length: i32,

    pub eye_position: Vector,
    pub illumination_position: Vector,
    pub hull_min: Vector,
    pub hull_max: Vector,
    pub view_bb_min: Vector,
    pub view_bb_max: Vector,

    pub flags: ModelFlags,

    // mstudiobone_t
    bone_count: i32,
    bone_offset: i32,

    // mstudiobonecontroller_t
    bone_controller_count: i32,
    bone_controller_offset: i32,

    // mstudiohitboxset_t
    hitbox_count: i32,
    hitbox_offset: i32,

    // mstudioanimdesc_t
    local_animation_count: i32,
    local_animation_offset: i32,

    // mstudioseqdesc_t
    local_seq_count: i32,
    local_seq_offset: i32,

    pub activity_list_version: i32,
    pub events_indexed: i32,

    // VMT texture filenames, mstudiotexture_t
    texture_count: i32,
    texture_offset: i32,

    // Offsets into a series of ints, each an offset to a null-terminated search path
    texture_dir_count: i32,
    texture_dir_offset: i32,

    pub skin_reference_count: i32,
    pub skin_family_count: i32,
    pub skin_reference_offset: i32,

    // mstudiobodyparts_t
    body_part_count: i32,
    body_part_offset: i32,

    // mstudioattachment_t
    attachment_count: i32,
    attachment_offset: i32,

    local_node_count: i32,
    local_node_index: i32,
    local_node_name_index: i32,

    flex_desc_count: i32,
    flex_desc_index: i32,

    flex_controller_count: i32,
    flex_controller_index: i32,

    flex_rules_count: i32,
    flex_rules_index: i32,

    ik_chain_count: i32,
    ik_chain_index: i32,

    mouths_count: i32,
    mouths_index: i32,

    local_pose_param_count: i32,
    local_pose_param_index: i32,

    pub surface_prop_index: i32,

    // Unusual: in this one index comes first, then count
    key_value_index: i32,
    key_value_count: i32,

    ik_lock_count: i32,
    ik_lock_index: i32,

    pub mass: f32,
    pub contents: i32,

    // Other models referenced for re-used sequences and animations ($includemodel)
    // mstudiomodelgroup_t
    include_model_count: i32,
    include_model_index: i32,

    pub virtual_model: i32, // placeholder for mutable void*

    // mstudioanimblock_t
    anim_blocks_name_index: i32,
    anim_blocks_count: i32,
    anim_blocks_index: i32,

    pub anim_block_model: i32, // placeholder for mutable void*

    pub bone_table_name_index: i32,

    pub vertex_base: i32, // placeholder for void*
    pub offset_base: i32, // placeholder for void*

    pub directional_dot_product: u8,

    pub root_lod: u8, // preferred rather than clamped

    // 0 means any allowed, N means lod 0 -> (N-1)
    pub num_allowed_root_lods: u8,

    #[allow(dead_code)]
    unused0: u8,
    #[allow(dead_code)]
    unused1: i32,

    pub flex_controller_ui_count: i32,
    pub flex_controller_ui_index: i32,

    pub vert_anim_fixed_point_scale: f32,
    pub unused2: i32,

    pub studio_hdr2_index: i32,

    #[allow(dead_code)]
    unused3: i32,
}

#[derive(Zeroable, Pod, Copy, Clone, Debug)]
#[repr(C)]
pub struct ModelFlags(u32);

bitflags! {
    impl ModelFlags: u32 {
        const AUTOGENERATED_HITBOX =				0x00000001;
        const USES_ENV_CUBEMAP =					0x00000002;
        const FORCE_OPAQUE =						0x00000004;
        const TRANSLUCENT_TWOPASS =					0x00000008;
        const STATIC_PROP =							0x00000010;
        const USES_FB_TEXTURE =						0x00000020;
        const HASSHADOWLOD =						0x00000040;
        const USES_BUMPMAPPING =					0x00000080;
        const USE_SHADOWLOD_MATERIALS =				0x00000100;
        const OBSOLETE =							0x00000200;
        const UNUSED =								0x00000400;
        const NO_FORCED_FADE =						0x00000800;
        const FORCE_PHONEME_CROSSFADE =				0x00001000;
        const CONSTANT_DIRECTIONAL_LIGHT_DOT =		0x00002000;
        const FLEXES_CONVERTED =					0x00004000;
        const BUILT_IN_PREVIEW_MODE =				0x00008000;
        const AMBIENT_BOOST =						0x00010000;
        const DO_NOT_CAST_SHADOWS =					0x00020000;
        const CAST_TEXTURE_SHADOWS =				0x00040000;
        const VERT_ANIM_FIXED_POINT_SCALE =			0x00200000;
    }
}

impl StudioHeader {
    pub fn bone_indexes(&self) -> impl Iterator<Item = usize> {
        index_range(self.bone_offset, self.bone_count, size_of::<BoneHeader>())
    }

    pub fn body_part_indexes(&self) -> impl Iterator<Item = usize> {
        index_range(
            self.body_part_offset,
            self.body_part_count,
            size_of::<BodyPartHeader>(),
        )
    }

    pub fn texture_indexes(&self) -> impl Iterator<Item = usize> {
        index_range(
            self.texture_offset,
            self.texture_count,
            size_of::<MeshTexture>(),
        )
    }

    pub fn texture_dir_indexes(&self) -> impl Iterator<Item = usize> {
        index_range(
            self.texture_dir_offset,
            self.texture_dir_count,
            size_of::<i32>(),
        )
    }

    pub fn local_animation_indexes(&self) -> impl Iterator<Item = usize> {
        index_range(
            self.local_animation_offset,
            self.local_animation_count,
            size_of::<AnimationDescriptionHeader>(),
        )
    }

    pub fn local_sequence_indexes(&self) -> impl Iterator<Item = usize> {
        index_range(
            self.local_seq_offset,
            self.local_seq_count,
            size_of::<SequenceHeader>(),
        )
    }

    pub fn include_model_indexes(&self) -> impl Iterator<Item = usize> {
        index_range(
            self.include_model_index,
            self.include_model_count,
            size_of::<IncludeModelHeader>(),
        )
    }

    pub fn animation_block_indexes(&self) -> impl Iterator<Item = usize> {
        index_range(
            self.anim_blocks_index,
            self.anim_blocks_count,
            size_of::<AnimationBlock>(),
        )
    }
}

static_assertions::const_assert_eq!(size_of::<StudioHeader>(), 408);

impl ReadableRelative for StudioHeader {}
