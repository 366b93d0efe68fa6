use crate::keyvalues::{self, Section};
use crate::phy::{ConvexHull, Phy};
use crate::skeleton::Skeleton;
use crate::{BoneTransform, BoundingBox};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Hulls smaller than this in any axis don't simulate usefully and are dropped.
const MIN_SOLID_SIZE: f32 = 0.01;

/// Axis ranges narrower than this are treated as locked.
const LOCKED_AXIS_THRESHOLD: f32 = 5.0;

/// A rigid body of the ragdoll, attached to the named bone.
#[derive(Debug, Clone)]
pub struct PhysicsBody {
    pub mass: f32,
    pub surface: Option<String>,
    pub bone: String,
    pub hulls: Vec<ConvexHull>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum JointKind {
    Fixed,
    Hinge { twist_min: f32, twist_max: f32 },
    Ball {
        swing_limit: f32,
        twist_min: f32,
        twist_max: f32,
    },
}

/// A constraint between two bodies, frames expressing the child in parent space.
#[derive(Debug, Clone)]
pub struct Joint {
    pub kind: JointKind,
    pub parent: usize,
    pub child: usize,
    pub frame_parent: BoneTransform,
    pub frame_child: BoneTransform,
}

struct SolidInfo {
    name: String,
    mass: f32,
    surface: Option<String>,
}

/// Decode the collision solids and trailing ragdoll description into bodies and
/// joints.
pub(crate) fn decode_physics(phy: &Phy, skeleton: &Skeleton) -> (Vec<PhysicsBody>, Vec<Joint>) {
    let sections = keyvalues::sections(&phy.key_values);
    let infos = solid_infos(&sections);

    let mut bodies = Vec::new();
    // only solids that produced a body are addressable by constraints
    let mut body_by_solid: HashMap<i32, usize> = HashMap::new();

    for (solid_index, solid) in phy.solids.iter().enumerate() {
        let solid_index = solid_index as i32;
        if solid.hulls.is_empty() {
            continue;
        }
        let bounds: BoundingBox = solid
            .hulls
            .iter()
            .flat_map(|hull| hull.points.iter().copied())
            .collect();
        let size = bounds.size();
        if size.x <= MIN_SOLID_SIZE || size.y <= MIN_SOLID_SIZE || size.z <= MIN_SOLID_SIZE {
            debug!(solid = solid_index, "dropping degenerate solid");
            continue;
        }
        let info = infos.get(&solid_index);
        bodies.push(PhysicsBody {
            mass: info.map(|info| info.mass).unwrap_or(1.0),
            surface: info.and_then(|info| info.surface.clone()),
            bone: info.map(|info| info.name.clone()).unwrap_or_default(),
            hulls: solid.hulls.clone(),
        });
        body_by_solid.insert(solid_index, bodies.len() - 1);
    }

    let mut joints = Vec::new();
    for section in sections
        .iter()
        .filter(|section| section.name.eq_ignore_ascii_case("ragdollconstraint"))
    {
        match decode_constraint(section, &infos, &body_by_solid, skeleton) {
            Some(joint) => joints.push(joint),
            None => warn!("skipping constraint between missing or identical bodies"),
        }
    }

    (bodies, joints)
}

fn solid_infos(sections: &[Section]) -> HashMap<i32, SolidInfo> {
    sections
        .iter()
        .filter(|section| section.name.eq_ignore_ascii_case("solid"))
        .filter_map(|section| {
            Some((
                section.get_i32("index")?,
                SolidInfo {
                    name: section.get("name").unwrap_or_default().to_string(),
                    mass: section.get_f32("mass").unwrap_or(1.0),
                    surface: section.get("surfaceprop").map(String::from),
                },
            ))
        })
        .collect()
}

fn decode_constraint(
    section: &Section,
    infos: &HashMap<i32, SolidInfo>,
    body_by_solid: &HashMap<i32, usize>,
    skeleton: &Skeleton,
) -> Option<Joint> {
    let parent_solid = section.get_i32("parent")?;
    let child_solid = section.get_i32("child")?;
    let parent = *body_by_solid.get(&parent_solid)?;
    let child = *body_by_solid.get(&child_solid)?;
    if parent == child {
        return None;
    }

    let (frame_parent, frame_child) = constraint_frames(
        infos.get(&parent_solid),
        infos.get(&child_solid),
        skeleton,
    );

    let range = |axis: &str| {
        (
            section.get_f32(&format!("{axis}min")).unwrap_or(0.0),
            section.get_f32(&format!("{axis}max")).unwrap_or(0.0),
        )
    };
    let (x_min, x_max) = range("x");
    let (y_min, y_max) = range("y");
    let (z_min, z_max) = range("z");

    let free = |(min, max): (f32, f32)| (max - min).abs() > LOCKED_AXIS_THRESHOLD;
    let twist = free((x_min, x_max));
    let swing_y = free((y_min, y_max));
    let swing_z = free((z_min, z_max));

    let kind = match (twist, swing_y, swing_z) {
        (false, false, false) => JointKind::Fixed,
        (true, false, false) => JointKind::Hinge {
            twist_min: x_min,
            twist_max: x_max,
        },
        (false, true, false) => JointKind::Hinge {
            twist_min: y_min,
            twist_max: y_max,
        },
        (false, false, true) => JointKind::Hinge {
            twist_min: z_min,
            twist_max: z_max,
        },
        _ => JointKind::Ball {
            swing_limit: y_min
                .abs()
                .max(y_max.abs())
                .max(z_min.abs().max(z_max.abs())),
            twist_min: x_min,
            twist_max: x_max,
        },
    };

    Some(Joint {
        kind,
        parent,
        child,
        frame_parent,
        frame_child,
    })
}

/// The child's world transform expressed in the parent's local space, identity frames
/// when either solid doesn't resolve to a skeleton bone.
fn constraint_frames(
    parent: Option<&SolidInfo>,
    child: Option<&SolidInfo>,
    skeleton: &Skeleton,
) -> (BoneTransform, BoneTransform) {
    let bone = |info: Option<&SolidInfo>| {
        info.and_then(|info| skeleton.bone_by_name(&info.name))
            .and_then(|bone| skeleton.world(bone))
    };
    match (bone(parent), bone(child)) {
        (Some(parent_world), Some(child_world)) => (
            parent_world.inverse().compose(child_world),
            BoneTransform::default(),
        ),
        _ => (BoneTransform::default(), BoneTransform::default()),
    }
}
