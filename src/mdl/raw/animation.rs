use crate::{read_single, ModelError, ReadRelative, ReadableRelative, Vector};
use bitflags::bitflags;
use bytemuck::{Pod, Zeroable};
use std::mem::size_of;

#[derive(Debug, Clone, Copy, Zeroable, Pod)]
#[repr(C)]
#[allow(dead_code)]
pub struct AnimationDescriptionHeader {
    base_ptr: i32,
    name_offset: i32,
    fps: f32,
    flags: AnimationDescriptionFlags,

    frame_count: i32,

    movement_count: i32,
    movement_offset: i32,

    _padding: [i32; 6],

    animation_block: i32,
    animation_index: i32, // non-zero when anim data isn't in sections

    ik_rule_count: i32,
    ik_rule_offset: i32,
    animation_block_ik_rule_index: i32,

    local_hierarchy_count: i32,
    local_hierarchy_offset: i32,

    section_offset: i32,
    section_frames: i32,

    zero_frame_span: i16,
    zero_frame_count: i16,
    zero_frame_offset: i32,

    zero_frame_stall_time: f32,
}

static_assertions::const_assert_eq!(size_of::<AnimationDescriptionHeader>(), 100);

#[derive(Zeroable, Pod, Copy, Clone, Debug)]
#[repr(C)]
pub struct AnimationDescriptionFlags(u32);

bitflags! {
    impl AnimationDescriptionFlags: u32 {
        const LOOPING =  0x0001;
        const SNAP =     0x0002;
        const DELTA =    0x0004;
        const AUTOPLAY = 0x0008;
        const POST =     0x0010;
        const ALLZEROS = 0x0020;
        const CYCLEPOSE = 0x0080;
        const REALTIME = 0x0100;
        const LOCAL =    0x0200;
        const HIDDEN =   0x0400;
    }
}

/// Metadata of a single animation, the frame data itself is decoded lazily.
#[derive(Clone, Debug)]
pub struct AnimationDescription {
    pub name: String,
    pub fps: f32,
    pub flags: AnimationDescriptionFlags,
    pub frame_count: i32,
    pub animation_block: i32,
    pub animation_index: i32,
    pub section_frames: i32,
    section_offset: i32,
    /// Absolute position of the descriptor in the mdl buffer, filled in by [`Mdl::read`](crate::mdl::Mdl::read).
    pub offset: usize,
}

impl AnimationDescription {
    pub fn is_delta(&self) -> bool {
        self.flags.contains(AnimationDescriptionFlags::DELTA)
    }

    pub fn is_looping(&self) -> bool {
        self.flags.contains(AnimationDescriptionFlags::LOOPING)
    }

    pub fn has_sections(&self) -> bool {
        self.section_frames != 0
    }

    /// Read the `(block, index)` pair for a section from the descriptor-relative section table.
    ///
    /// `data` is the mdl buffer sliced at the descriptor (`data[self.offset..]`).
    pub fn section(&self, data: &[u8], section: usize) -> Result<AnimationSection, ModelError> {
        let offset = (self.section_offset as usize).saturating_add(section * size_of::<AnimationSection>());
        read_single(data, offset)
    }
}

impl ReadRelative for AnimationDescription {
    type Header = AnimationDescriptionHeader;

    fn read(data: &[u8], header: Self::Header) -> Result<Self, ModelError> {
        Ok(AnimationDescription {
            name: read_single(data, header.name_offset)?,
            fps: header.fps,
            flags: header.flags,
            frame_count: header.frame_count,
            animation_block: header.animation_block,
            animation_index: header.animation_index,
            section_frames: header.section_frames,
            section_offset: header.section_offset,
            offset: 0,
        })
    }
}

#[derive(Debug, Clone, Copy, Zeroable, Pod)]
#[repr(C)]
pub struct AnimationSection {
    pub animation_block: i32,
    pub animation_index: i32,
}

impl ReadableRelative for AnimationSection {}

#[derive(Debug, Clone, Copy, Zeroable, Pod)]
#[repr(C)]
pub struct AnimationBlock {
    pub data_start: i32,
    pub data_end: i32,
}

impl ReadableRelative for AnimationBlock {}

#[derive(Zeroable, Pod, Copy, Clone, Debug, Default)]
#[repr(C)]
#[allow(dead_code)]
pub struct SequenceHeader {
    base: i32,
    label_index: i32,
    activity_name_index: i32,
    flags: i32,
    activity: i32,
    weight: i32,
    event_count: i32,
    event_offset: i32,
    bounding_box_min: Vector,
    bounding_box_max: Vector,
    blend_count: i32,
    animation_index_index: i32,
    movement_index: i32,
    group_size: [i32; 2],
    param_index: [i32; 2],
    param_start: [f32; 2],
    param_end: [f32; 2],
    param_parent: i32,

    fade_in_time: f32,
    fade_out_time: f32,

    local_entry_node: i32,
    local_exit_node: i32,
    node_flags: i32,

    entry_phase: f32,
    exit_phase: f32,

    last_frame: f32,

    next_sequence: i32,
    pose: i32,

    ik_rule_count: i32,

    auto_layer_count: i32,
    auto_layer_offset: i32,

    weight_list_offset: i32,

    pose_key_offset: i32,

    ik_lock_count: i32,
    ik_lock_offset: i32,

    key_value_offset: i32,
    key_value_size: i32,

    cycle_pose_offset: i32,

    activity_modifiers_offset: i32,
    activity_modifiers_count: i32,

    _padding: [i32; 5],
}

static_assertions::const_assert_eq!(size_of::<SequenceHeader>(), 212);

/// A sequence descriptor, naming the first entry of its blend-indexed animation table.
#[derive(Debug, Clone)]
pub struct Sequence {
    pub label: String,
    pub activity_name: String,
    /// Local animation index from the `(0, 0)` entry of the blend table.
    pub animation: i16,
}

impl ReadRelative for Sequence {
    type Header = SequenceHeader;

    fn read(data: &[u8], header: Self::Header) -> Result<Self, ModelError> {
        Ok(Sequence {
            label: read_single(data, header.label_index)?,
            activity_name: read_single(data, header.activity_name_index)?,
            animation: read_single(data, header.animation_index_index)?,
        })
    }
}

#[derive(Debug, Clone, Copy, Zeroable, Pod)]
#[repr(C)]
pub struct IncludeModelHeader {
    pub label_index: i32,
    pub file_name_index: i32,
}

static_assertions::const_assert_eq!(size_of::<IncludeModelHeader>(), 8);

/// An external mdl contributing extra sequences that reuse the host skeleton by bone name.
#[derive(Debug, Clone)]
pub struct IncludeModel {
    pub label: String,
    pub file_name: String,
}

impl ReadRelative for IncludeModel {
    type Header = IncludeModelHeader;

    fn read(data: &[u8], header: Self::Header) -> Result<Self, ModelError> {
        Ok(IncludeModel {
            label: read_single(data, header.label_index)?,
            file_name: read_single(data, header.file_name_index)?,
        })
    }
}

/// Per-bone record of an animation frame block, chained by `next_offset`.
#[derive(Debug, Clone, Copy, Zeroable, Pod)]
#[repr(C)]
pub struct AnimationRecord {
    pub bone: u8,
    pub flags: AnimationFlags,
    pub next_offset: i16,
}

static_assertions::const_assert_eq!(size_of::<AnimationRecord>(), 4);

impl ReadableRelative for AnimationRecord {}

#[derive(Zeroable, Pod, Copy, Clone, Debug)]
#[repr(C)]
pub struct AnimationFlags(u8);

bitflags! {
    impl AnimationFlags: u8 {
        /// Vector48
        const RAW_POS =  0x01;
        /// Quaternion48
        const RAW_ROT =  0x02;
        /// Compressed position track
        const ANIM_POS = 0x04;
        /// Compressed euler track
        const ANIM_ROT = 0x08;
        const DELTA =    0x10;
        /// Quaternion64
        const RAW_ROT2 = 0x20;
    }
}

impl AnimationFlags {
    /// Size of the rotation payload preceding the position payload.
    pub fn rotation_size(&self) -> usize {
        if self.contains(AnimationFlags::RAW_ROT) {
            6
        } else if self.contains(AnimationFlags::RAW_ROT2) {
            8
        } else if self.contains(AnimationFlags::ANIM_ROT) {
            6
        } else {
            0
        }
    }
}

/// Struct-relative offsets to the per-axis value streams, zero meaning no data for the axis.
#[derive(Zeroable, Pod, Copy, Clone, Debug)]
#[repr(C)]
pub struct AnimationValuePointers(pub [i16; 3]);

impl ReadableRelative for AnimationValuePointers {}

impl AnimationValuePointers {
    /// Decode the three axis values for `frame`, anchored at the pointer struct (`data`),
    /// scaled per axis.
    pub fn values(&self, data: &[u8], frame: usize, scale: Vector) -> [f32; 3] {
        let mut result = [0.0; 3];
        for ((out, pointer), scale) in result.iter_mut().zip(self.0).zip(scale.iter()) {
            if pointer > 0 {
                *out = extract_anim_value(&data[(pointer as usize).min(data.len())..], frame) * scale;
            }
        }
        result
    }
}

/// Walk the run-length encoded value stream for the value of a single frame.
///
/// The stream is a list of `(valid, total)` byte pairs each followed by `valid` i16 values,
/// a run covering `total` frames and holding its last valid value for frames past `valid`.
/// Malformed streams yield 0 instead of failing the frame.
pub(crate) fn extract_anim_value(data: &[u8], mut frame: usize) -> f32 {
    let mut offset = 0usize;
    loop {
        let (valid, total) = match (data.get(offset), data.get(offset + 1)) {
            (Some(&valid), Some(&total)) => (valid as usize, total as usize),
            _ => return 0.0,
        };
        if total == 0 {
            return 0.0;
        }
        if frame < total {
            if valid == 0 {
                return 0.0;
            }
            let index = frame.min(valid - 1);
            let value_offset = offset + 2 + index * 2;
            return match data.get(value_offset..value_offset + 2) {
                Some(bytes) => i16::from_le_bytes([bytes[0], bytes[1]]) as f32,
                None => 0.0,
            };
        }
        frame -= total;
        offset += 2 + valid * 2;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(runs: &[(u8, u8, &[i16])]) -> Vec<u8> {
        let mut data = Vec::new();
        for (valid, total, values) in runs {
            data.push(*valid);
            data.push(*total);
            for value in *values {
                data.extend(value.to_le_bytes());
            }
        }
        data
    }

    #[test]
    fn single_run_direct_values() {
        let data = stream(&[(3, 3, &[10, 20, 30])]);
        assert_eq!(extract_anim_value(&data, 0), 10.0);
        assert_eq!(extract_anim_value(&data, 1), 20.0);
        assert_eq!(extract_anim_value(&data, 2), 30.0);
    }

    #[test]
    fn run_holds_last_valid_value() {
        let data = stream(&[(2, 5, &[10, 20])]);
        assert_eq!(extract_anim_value(&data, 1), 20.0);
        assert_eq!(extract_anim_value(&data, 4), 20.0);
    }

    #[test]
    fn frame_in_second_run() {
        let data = stream(&[(1, 2, &[7]), (2, 3, &[40, 50])]);
        assert_eq!(extract_anim_value(&data, 1), 7.0);
        assert_eq!(extract_anim_value(&data, 2), 40.0);
        assert_eq!(extract_anim_value(&data, 3), 50.0);
    }

    #[test]
    fn overrun_yields_zero() {
        let data = stream(&[(1, 2, &[7])]);
        assert_eq!(extract_anim_value(&data, 10), 0.0);
        assert_eq!(extract_anim_value(&[], 0), 0.0);
    }
}
