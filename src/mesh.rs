use crate::mdl::{Eyeball, Mdl, SubMesh, SubModel};
use crate::resolver::{AssetResolver, MaterialHandle, MaterialLoader};
use crate::shared::normalize;
use crate::vtx::Vtx;
use crate::vvd::{Vertex as VvdVertex, Vvd};
use crate::{vtx, BoundingBox, Vector};
use cgmath::{InnerSpace, Vector3};
use std::collections::HashMap;
use std::mem::size_of;
use tracing::{debug, warn};

/// A vertex of an emitted mesh, bone weights in 8-bit fixed point summing to 255.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshVertex {
    pub position: Vector,
    pub normal: Vector,
    pub tangent: Vector,
    pub uv: [f32; 2],
    pub bones: [u8; 3],
    pub weights: [u8; 3],
}

/// Material of an emitted mesh, with the iris projection for eyeball meshes.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshMaterial {
    pub handle: MaterialHandle,
    pub eye: Option<EyeUniforms>,
}

/// `g_vIrisU`/`g_vIrisV` shader constants projecting world positions onto the iris.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyeUniforms {
    pub iris_u: [f32; 4],
    pub iris_v: [f32; 4],
}

/// A deduplicated triangle list for one sub-mesh of a sub-model.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub material: Option<MeshMaterial>,
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
    pub bounds: BoundingBox,
    pub body_part: String,
    pub sub_model: usize,
}

/// Join the vtx topology with the vvd vertex stream into one mesh per sub-mesh with
/// non-empty geometry.
pub(crate) fn assemble_meshes<R, M>(
    mdl: &Mdl,
    vvd: &Vvd,
    vtx: &Vtx,
    lod: usize,
    resolver: &R,
    materials: &mut M,
) -> Vec<Mesh>
where
    R: AssetResolver + ?Sized,
    M: MaterialLoader + ?Sized,
{
    let mut meshes = Vec::new();

    for (body_part, vtx_body_part) in mdl.body_parts.iter().zip(&vtx.body_parts) {
        for (model_index, (model, vtx_model)) in
            body_part.models.iter().zip(&vtx_body_part.models).enumerate()
        {
            if model.meshes.is_empty() {
                continue;
            }
            let Some(vtx_lod) = vtx_model.lods.get(lod) else {
                warn!(model = %model.name, lod, "model has no topology for the root lod");
                continue;
            };
            if model.vertex_index % size_of::<VvdVertex>() as i32 != 0 {
                warn!(
                    model = %model.name,
                    vertex_index = model.vertex_index,
                    "model vertex offset is not a whole vertex, skipping"
                );
                continue;
            }
            let model_vertex_offset = model.vertex_index as usize / size_of::<VvdVertex>();
            let eyeballs = eyeballs_by_texture(model);

            for (sub_mesh, vtx_mesh) in model.meshes.iter().zip(&vtx_lod.meshes) {
                let material =
                    resolve_mesh_material(mdl, sub_mesh, &eyeballs, resolver, materials);
                if let Some(mesh) = assemble_sub_mesh(
                    vvd,
                    vtx_mesh,
                    model_vertex_offset + sub_mesh.vertex_offset.max(0) as usize,
                    material,
                    &body_part.name,
                    model_index,
                ) {
                    meshes.push(mesh);
                }
            }
        }
    }

    // all meshes of a model share one bounding box
    let bounds: BoundingBox = meshes
        .iter()
        .flat_map(|mesh| mesh.vertices.iter().map(|vertex| vertex.position))
        .collect();
    for mesh in &mut meshes {
        mesh.bounds = bounds;
    }

    meshes
}

fn assemble_sub_mesh(
    vvd: &Vvd,
    vtx_mesh: &vtx::Mesh,
    vertex_offset: usize,
    material: Option<MeshMaterial>,
    body_part: &str,
    sub_model: usize,
) -> Option<Mesh> {
    let mut vertices = Vec::new();
    let mut indices = Vec::new();
    // global vvd index -> emitted index, per sub-mesh
    let mut emitted: HashMap<usize, u32> = HashMap::new();

    for strip_group in &vtx_mesh.strip_groups {
        for strip in &strip_group.strips {
            for triangle in strip.triangles() {
                let global = triangle.map(|position| {
                    strip_group
                        .indices
                        .get(position)
                        .and_then(|&vertex| strip_group.vertices.get(vertex as usize))
                        .map(|vertex| vertex_offset + vertex.original_mesh_vertex_id as usize)
                });
                let [Some(a), Some(b), Some(c)] = global else {
                    debug!(body_part, sub_model, "dropping triangle with unresolvable corner");
                    continue;
                };
                if a == b || b == c || a == c {
                    continue;
                }
                // reversed winding, source strips are left-handed
                for global in [a, c, b] {
                    let Some(index) = emit_vertex(vvd, global, &mut vertices, &mut emitted) else {
                        debug!(global, "vvd vertex out of range");
                        indices.truncate(indices.len() - indices.len() % 3);
                        break;
                    };
                    indices.push(index);
                }
            }
        }
    }
    indices.truncate(indices.len() - indices.len() % 3);

    (!indices.is_empty()).then(|| Mesh {
        material,
        vertices,
        indices,
        bounds: BoundingBox::default(),
        body_part: body_part.into(),
        sub_model,
    })
}

fn emit_vertex(
    vvd: &Vvd,
    global: usize,
    vertices: &mut Vec<MeshVertex>,
    emitted: &mut HashMap<usize, u32>,
) -> Option<u32> {
    if let Some(&index) = emitted.get(&global) {
        return Some(index);
    }
    let vertex = vvd.vertices.get(global)?;
    let tangent = vvd.tangents.get(global)?;
    let index = vertices.len() as u32;
    vertices.push(MeshVertex {
        position: vertex.position,
        normal: vertex.normal,
        tangent: Vector {
            x: tangent.x,
            y: tangent.y,
            z: tangent.z,
        },
        uv: vertex.texture_coordinates,
        bones: vertex.bone_weights.bone,
        weights: fixed_point_weights(
            vertex.bone_weights.weight,
            vertex.bone_weights.bone_count,
        ),
    });
    emitted.insert(global, index);
    Some(index)
}

/// Convert bone weights to 8-bit fixed point, distributing the rounding residual onto
/// the largest weight so the triple sums to exactly 255.
fn fixed_point_weights(weights: [f32; 3], bone_count: u8) -> [u8; 3] {
    let count = (bone_count as usize).clamp(1, 3);
    let mut fixed = [0i32; 3];
    for (fixed, weight) in fixed.iter_mut().zip(weights).take(count) {
        *fixed = ((weight * 255.0).round() as i32).clamp(0, 255);
    }
    let residual = 255 - fixed.iter().sum::<i32>();
    let largest = (0..3)
        .max_by_key(|&index| (fixed[index], std::cmp::Reverse(index)))
        .unwrap_or_default();
    fixed[largest] = (fixed[largest] + residual).clamp(0, 255);
    fixed.map(|weight| weight as u8)
}

fn eyeballs_by_texture(model: &SubModel) -> HashMap<i32, &Eyeball> {
    let mut map = HashMap::new();
    for eyeball in &model.eyeballs {
        map.entry(eyeball.texture).or_insert(eyeball);
    }
    map
}

fn resolve_mesh_material<R, M>(
    mdl: &Mdl,
    sub_mesh: &SubMesh,
    eyeballs: &HashMap<i32, &Eyeball>,
    resolver: &R,
    materials: &mut M,
) -> Option<MeshMaterial>
where
    R: AssetResolver + ?Sized,
    M: MaterialLoader + ?Sized,
{
    let handle = resolve_material(mdl, sub_mesh.material, resolver, materials)?;
    let eye = eyeballs
        .get(&sub_mesh.material)
        .map(|eyeball| eye_uniforms(eyeball));
    Some(MeshMaterial { handle, eye })
}

/// Walk the cd-texture search paths for the first material that exists.
fn resolve_material<R, M>(
    mdl: &Mdl,
    texture: i32,
    resolver: &R,
    materials: &mut M,
) -> Option<MaterialHandle>
where
    R: AssetResolver + ?Sized,
    M: MaterialLoader + ?Sized,
{
    let texture = mdl.textures.get(usize::try_from(texture).ok()?)?;
    let name = normalize_path(&texture.name);
    for search_path in &mdl.texture_dirs {
        let search_path = normalize_path(search_path);
        let search_path = search_path.trim_matches('/');
        let base = if search_path.is_empty() {
            format!("materials/{name}")
        } else {
            format!("materials/{search_path}/{name}")
        };
        if resolver.exists(&format!("{base}.vmt")) {
            if let Some(handle) = materials.load(&base) {
                return Some(handle);
            }
        }
    }
    None
}

pub(crate) fn normalize_path(path: &str) -> String {
    path.to_ascii_lowercase().replace('\\', "/")
}

/// Iris projection from the eyeball parameters, `right = forward × up`.
fn eye_uniforms(eyeball: &Eyeball) -> EyeUniforms {
    let forward = Vector3::from(eyeball.forward);
    let up = Vector3::from(eyeball.up);
    let right = normalize(forward.cross(up));
    let up = normalize(up);
    let origin = Vector3::from(eyeball.origin);

    let iris_radius = eyeball.radius * eyeball.iris_scale;
    let scale = if iris_radius != 0.0 {
        0.5 / iris_radius
    } else {
        0.0
    };

    let axis = |axis: Vector3<f32>| {
        [
            axis.x * scale,
            axis.y * scale,
            axis.z * scale,
            0.5 - axis.dot(origin) * scale,
        ]
    };
    EyeUniforms {
        iris_u: axis(right),
        iris_v: axis(up),
    }
}
