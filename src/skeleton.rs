use crate::mdl::Bone;
use crate::BoneTransform;

/// The bone tree of a model with world transforms accumulated root-first.
///
/// Bone parents precede their children in the table, so a single in-order pass
/// suffices.
#[derive(Debug, Clone, Default)]
pub struct Skeleton {
    bones: Vec<SkeletonBone>,
}

#[derive(Debug, Clone)]
pub struct SkeletonBone {
    pub name: String,
    pub parent: Option<usize>,
    pub local: BoneTransform,
    pub world: BoneTransform,
}

impl Skeleton {
    pub fn from_bones(bones: &[Bone]) -> Self {
        let mut out: Vec<SkeletonBone> = Vec::with_capacity(bones.len());
        for bone in bones {
            let local = BoneTransform::new(bone.pos, bone.quaternion);
            let parent = bone.parent().filter(|parent| *parent < out.len());
            let world = match parent {
                Some(parent) => out[parent].world.compose(&local),
                None => local,
            };
            out.push(SkeletonBone {
                name: bone.name.clone(),
                parent,
                local,
                world,
            });
        }
        Skeleton { bones: out }
    }

    pub fn bones(&self) -> &[SkeletonBone] {
        &self.bones
    }

    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    pub fn world(&self, bone: usize) -> Option<&BoneTransform> {
        self.bones.get(bone).map(|bone| &bone.world)
    }

    /// Base pose of every bone, local space.
    pub fn base_pose(&self) -> Vec<BoneTransform> {
        self.bones.iter().map(|bone| bone.local).collect()
    }

    pub fn bone_by_name(&self, name: &str) -> Option<usize> {
        self.bones
            .iter()
            .position(|bone| bone.name.eq_ignore_ascii_case(name))
    }
}
