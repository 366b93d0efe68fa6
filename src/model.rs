use crate::animation::{decode_animations, Animation};
use crate::mdl::Mdl;
use crate::mesh::{assemble_meshes, normalize_path, Mesh};
use crate::phy::Phy;
use crate::physics::{decode_physics, Joint, PhysicsBody};
use crate::resolver::{AssetResolver, MaterialLoader};
use crate::skeleton::Skeleton;
use crate::vtx::Vtx;
use crate::vvd::Vvd;
use crate::{BoneTransform, BoundingBox, ModelError};
use tracing::warn;

/// The five buffers making up a model, `ani` and `phy` are optional.
#[derive(Debug, Clone, Copy)]
pub struct ModelBuffers<'a> {
    pub mdl: &'a [u8],
    pub vvd: &'a [u8],
    pub vtx: &'a [u8],
    pub ani: Option<&'a [u8]>,
    pub phy: Option<&'a [u8]>,
}

/// Receiver for the decoded model, implemented by whatever runtime the model is
/// handed off to.
///
/// `add_body` returns the receiver's handle for the body, joints reference bodies
/// through those handles.
pub trait ModelSink {
    fn add_bone(&mut self, name: &str, world: BoneTransform, parent: Option<&str>);
    fn add_mesh(&mut self, mesh: Mesh, lod: usize);
    fn add_body(&mut self, body: PhysicsBody) -> usize;
    fn add_joint(&mut self, joint: Joint);
    fn add_animation(&mut self, animation: Animation);
}

/// Default in-memory collector, the output of [`decode_model`].
#[derive(Debug, Clone, Default)]
pub struct Model {
    pub name: String,
    pub skeleton: Skeleton,
    pub lod: usize,
    pub meshes: Vec<Mesh>,
    pub bodies: Vec<PhysicsBody>,
    pub joints: Vec<Joint>,
    pub animations: Vec<Animation>,
}

impl Model {
    pub fn bounding_box(&self) -> BoundingBox {
        self.meshes
            .iter()
            .flat_map(|mesh| mesh.vertices.iter().map(|vertex| vertex.position))
            .collect()
    }

    /// Replay the decoded model into a sink, joints remapped through the sink's body
    /// handles.
    pub fn write_to<S: ModelSink + ?Sized>(&self, sink: &mut S) {
        for bone in self.skeleton.bones() {
            let parent = bone
                .parent
                .and_then(|parent| self.skeleton.bones().get(parent))
                .map(|parent| parent.name.as_str());
            sink.add_bone(&bone.name, bone.world, parent);
        }
        for mesh in &self.meshes {
            sink.add_mesh(mesh.clone(), self.lod);
        }
        let handles: Vec<usize> = self
            .bodies
            .iter()
            .map(|body| sink.add_body(body.clone()))
            .collect();
        for joint in &self.joints {
            if let (Some(&parent), Some(&child)) =
                (handles.get(joint.parent), handles.get(joint.child))
            {
                sink.add_joint(Joint {
                    parent,
                    child,
                    ..joint.clone()
                });
            }
        }
        for animation in &self.animations {
            sink.add_animation(animation.clone());
        }
    }
}

/// Decode the model held in `buffers` into a fresh [`Model`].
///
/// Mdl, vvd and vtx problems fail the decode, physics and animation problems degrade
/// to missing bodies or base-pose frames.
pub fn decode_model<R, M>(
    buffers: ModelBuffers<'_>,
    path: &str,
    resolver: &R,
    materials: &mut M,
) -> Result<Model, ModelError>
where
    R: AssetResolver + ?Sized,
    M: MaterialLoader + ?Sized,
{
    let mdl = Mdl::read(buffers.mdl)?;

    let vvd = Vvd::read(buffers.vvd, mdl.root_lod())?;
    if vvd.header.checksum != mdl.checksum() {
        return Err(ModelError::ChecksumMismatch {
            file: "vvd",
            expected: mdl.checksum(),
            found: vvd.header.checksum,
        });
    }
    let vtx = Vtx::read(buffers.vtx)?;
    if vtx.header.checksum != mdl.checksum() {
        return Err(ModelError::ChecksumMismatch {
            file: "vtx",
            expected: mdl.checksum(),
            found: vtx.header.checksum,
        });
    }

    let skeleton = Skeleton::from_bones(&mdl.bones);
    let lod = mdl.root_lod() as usize;
    let meshes = assemble_meshes(&mdl, &vvd, &vtx, lod, resolver, materials);

    let (bodies, joints) = match buffers.phy {
        Some(phy) => match Phy::read(phy) {
            Ok(phy) => decode_physics(&phy, &skeleton),
            Err(error) => {
                warn!(%error, "ignoring unreadable phy data");
                (Vec::new(), Vec::new())
            }
        },
        None => (Vec::new(), Vec::new()),
    };

    let animations = decode_animations(&mdl, buffers.mdl, buffers.ani, &skeleton, resolver);

    Ok(Model {
        name: path.into(),
        skeleton,
        lod,
        meshes,
        bodies,
        joints,
        animations,
    })
}

/// [`decode_model`] straight into a sink.
///
/// The sink is only written once the whole decode has succeeded, a failed decode
/// leaves it untouched.
pub fn decode_model_into<R, M, S>(
    buffers: ModelBuffers<'_>,
    path: &str,
    resolver: &R,
    materials: &mut M,
    sink: &mut S,
) -> Result<(), ModelError>
where
    R: AssetResolver + ?Sized,
    M: MaterialLoader + ?Sized,
    S: ModelSink + ?Sized,
{
    let model = decode_model(buffers, path, resolver, materials)?;
    model.write_to(sink);
    Ok(())
}

/// Resolve the sibling files of `path` through the resolver and decode the model.
///
/// The vvd and vtx siblings are required, ani and phy are picked up when present.
pub fn load_model<R, M>(
    path: &str,
    resolver: &R,
    materials: &mut M,
) -> Result<Model, ModelError>
where
    R: AssetResolver + ?Sized,
    M: MaterialLoader + ?Sized,
{
    let path = normalize_path(path);
    let base = path.strip_suffix(".mdl").unwrap_or(&path).to_string();

    let mdl = resolver
        .read(&path)
        .ok_or(ModelError::MissingSibling { file: "mdl" })?;
    let vvd = resolver
        .read(&format!("{base}.vvd"))
        .ok_or(ModelError::MissingSibling { file: "vvd" })?;
    let vtx = ["dx90.vtx", "vtx"]
        .iter()
        .find_map(|extension| resolver.read(&format!("{base}.{extension}")))
        .ok_or(ModelError::MissingSibling { file: "vtx" })?;
    let ani = resolver.read(&format!("{base}.ani"));
    let phy = resolver.read(&format!("{base}.phy"));

    decode_model(
        ModelBuffers {
            mdl: &mdl,
            vvd: &vvd,
            vtx: &vtx,
            ani: ani.as_deref(),
            phy: phy.as_deref(),
        },
        &path,
        resolver,
        materials,
    )
}
