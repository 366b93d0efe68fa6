use crate::compressed::{Quaternion48, Quaternion64, Vector48};
use crate::mdl::raw::{AnimationFlags, AnimationRecord, AnimationValuePointers};
use crate::mdl::{AnimationDescription, Bone, Mdl};
use crate::mesh::normalize_path;
use crate::resolver::AssetResolver;
use crate::skeleton::Skeleton;
use crate::{read_single, BoneTransform, Quaternion, RadianEuler, Vector};
use std::mem::size_of;
use tracing::{debug, warn};

/// A fully expanded animation, one transform per destination bone per frame.
///
/// Delta animations store per-bone offsets from the base pose instead of absolute
/// local transforms.
#[derive(Debug, Clone)]
pub struct Animation {
    pub name: String,
    pub fps: f32,
    pub looping: bool,
    pub delta: bool,
    pub frames: Vec<Vec<BoneTransform>>,
}

/// Expand every sequence of the model plus those of its include models.
pub(crate) fn decode_animations<R: AssetResolver + ?Sized>(
    mdl: &Mdl,
    data: &[u8],
    ani: Option<&[u8]>,
    skeleton: &Skeleton,
    resolver: &R,
) -> Vec<Animation> {
    let base = skeleton.base_pose();
    let mut animations = decode_sequences(mdl, data, ani, &base, None);

    for include in &mdl.include_models {
        let path = normalize_path(&include.file_name);
        let Some(include_data) = resolver.read(&path) else {
            debug!(%path, "include model not found");
            continue;
        };
        let include_mdl = match Mdl::read(&include_data) {
            Ok(mdl) => mdl,
            Err(error) => {
                warn!(%path, %error, "skipping unreadable include model");
                continue;
            }
        };
        let include_ani = resolver.read(&ani_sibling(&path));
        // include model bones drive the host skeleton by name, unmatched bones are dropped
        let bone_map: Vec<Option<usize>> = include_mdl
            .bones
            .iter()
            .map(|bone| skeleton.bone_by_name(&bone.name))
            .collect();
        animations.extend(decode_sequences(
            &include_mdl,
            &include_data,
            include_ani.as_deref(),
            &base,
            Some(&bone_map),
        ));
    }
    animations
}

fn ani_sibling(path: &str) -> String {
    format!("{}.ani", path.strip_suffix(".mdl").unwrap_or(path))
}

fn decode_sequences(
    mdl: &Mdl,
    data: &[u8],
    ani: Option<&[u8]>,
    base: &[BoneTransform],
    bone_map: Option<&[Option<usize>]>,
) -> Vec<Animation> {
    let mut animations = Vec::new();
    for sequence in &mdl.sequences {
        let description = usize::try_from(sequence.animation)
            .ok()
            .and_then(|index| mdl.animations.get(index));
        let Some(description) = description else {
            debug!(sequence = %sequence.label, "sequence references a missing animation");
            continue;
        };
        if description.frame_count <= 0 {
            continue;
        }
        let frames = (0..description.frame_count as usize)
            .map(|frame| decode_frame(mdl, data, ani, description, frame, base, bone_map))
            .collect();
        animations.push(Animation {
            name: sequence.label.clone(),
            fps: description.fps,
            looping: description.is_looping(),
            delta: description.is_delta(),
            frames,
        });
    }
    animations
}

/// Decode a single frame into one transform per destination bone.
///
/// Bones without a record keep the base pose (or the identity offset for delta
/// animations), as do whole frames whose animation block can't be resolved.
fn decode_frame(
    mdl: &Mdl,
    data: &[u8],
    ani: Option<&[u8]>,
    description: &AnimationDescription,
    frame: usize,
    base: &[BoneTransform],
    bone_map: Option<&[Option<usize>]>,
) -> Vec<BoneTransform> {
    let delta = description.is_delta();
    let mut transforms = if delta {
        vec![BoneTransform::default(); base.len()]
    } else {
        base.to_vec()
    };

    let Some((buffer, start, frame)) = locate_frame_data(mdl, data, ani, description, frame)
    else {
        debug!(animation = %description.name, frame, "animation frame data is unresolvable");
        return transforms;
    };

    let mut offset = start;
    // chains hold at most one record per bone, anything longer is malformed
    for _ in 0..=u8::MAX as usize {
        let Ok(record) = read_single::<AnimationRecord, _>(buffer, offset) else {
            break;
        };
        let payload = offset + size_of::<AnimationRecord>();
        if let Some(bone) = mdl.bones.get(record.bone as usize) {
            let destination = match bone_map {
                None => Some(record.bone as usize),
                Some(map) => map.get(record.bone as usize).copied().flatten(),
            };
            if let Some(destination) =
                destination.filter(|destination| *destination < transforms.len())
            {
                transforms[destination] =
                    decode_record(buffer, payload, record.flags, bone, frame, delta);
            }
        }
        if record.next_offset == 0 {
            break;
        }
        match offset.checked_add_signed(record.next_offset as isize) {
            Some(next) => offset = next,
            None => break,
        }
    }

    transforms
}

/// Resolve the buffer, offset and block-relative frame holding the records for `frame`.
///
/// Sectioned animations split their frames over multiple `(block, index)` pairs, block 0
/// lives in the mdl buffer itself, other blocks in the ani side file.
fn locate_frame_data<'a>(
    mdl: &Mdl,
    data: &'a [u8],
    ani: Option<&'a [u8]>,
    description: &AnimationDescription,
    frame: usize,
) -> Option<(&'a [u8], usize, usize)> {
    let (block, index, frame) = if description.has_sections() {
        let section_frames = description.section_frames.max(1) as usize;
        let frame_count = description.frame_count as usize;
        // the final frame maps to its own trailing section
        let (section, relative) = if frame == frame_count - 1 {
            (frame_count / section_frames + 1, 0)
        } else {
            (frame / section_frames, frame % section_frames)
        };
        let section = description.section(data.get(description.offset..)?, section).ok()?;
        (section.animation_block, section.animation_index, relative)
    } else {
        (description.animation_block, description.animation_index, frame)
    };

    if block == 0 {
        let offset = description
            .offset
            .checked_add(usize::try_from(index).ok()?)?;
        Some((data, offset, frame))
    } else {
        let ani = ani?;
        let block = mdl.animation_blocks.get(usize::try_from(block).ok()?)?;
        let offset = usize::try_from(block.data_start)
            .ok()?
            .checked_add(usize::try_from(index).ok()?)?;
        Some((ani, offset, frame))
    }
}

fn decode_record(
    buffer: &[u8],
    payload: usize,
    flags: AnimationFlags,
    bone: &Bone,
    frame: usize,
    delta: bool,
) -> BoneTransform {
    let rotation = if flags.contains(AnimationFlags::RAW_ROT) {
        read_single::<Quaternion48, _>(buffer, payload)
            .map(Quaternion::from)
            .ok()
    } else if flags.contains(AnimationFlags::RAW_ROT2) {
        read_single::<Quaternion64, _>(buffer, payload)
            .map(Quaternion::from)
            .ok()
    } else if flags.contains(AnimationFlags::ANIM_ROT) {
        read_single::<AnimationValuePointers, _>(buffer, payload)
            .ok()
            .map(|pointers| {
                let [x, y, z] = pointers.values(&buffer[payload..], frame, bone.rot_scale);
                let euler = RadianEuler { x, y, z };
                let euler = if delta { euler } else { bone.rot + euler };
                Quaternion::from(euler)
            })
    } else {
        None
    };
    let rotation = rotation.unwrap_or(if delta {
        Quaternion::default()
    } else {
        bone.quaternion
    });

    let position_payload = payload + flags.rotation_size();
    let position = if flags.contains(AnimationFlags::RAW_POS) {
        // absolute for plain animations, an offset for delta animations, either way
        // the value is used as is
        read_single::<Vector48, _>(buffer, position_payload)
            .map(Vector::from)
            .ok()
    } else if flags.contains(AnimationFlags::ANIM_POS) {
        read_single::<AnimationValuePointers, _>(buffer, position_payload)
            .ok()
            .map(|pointers| {
                let [x, y, z] =
                    pointers.values(&buffer[position_payload..], frame, bone.pos_scale);
                let value = Vector { x, y, z };
                if delta {
                    value
                } else {
                    bone.pos + value
                }
            })
    } else {
        None
    };
    let position = position.unwrap_or(if delta { Vector::default() } else { bone.pos });

    BoneTransform { position, rotation }
}
