//! Builders synthesizing the binary model files for the integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use studiomodel::AssetResolver;

pub fn set_i16(data: &mut [u8], offset: usize, value: i16) {
    data[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

pub fn set_i32(data: &mut [u8], offset: usize, value: i32) {
    data[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

pub fn set_f32(data: &mut [u8], offset: usize, value: f32) {
    data[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

pub fn set_f32s(data: &mut [u8], offset: usize, values: &[f32]) {
    for (index, value) in values.iter().enumerate() {
        set_f32(data, offset + index * 4, *value);
    }
}

fn push_name(names: &mut Vec<u8>, name: &str) -> usize {
    let position = names.len();
    names.extend(name.as_bytes());
    names.push(0);
    position
}

// ---------------------------------------------------------------------------
// mdl

pub struct TestBone {
    pub name: &'static str,
    pub parent: i32,
    pub pos: [f32; 3],
    pub quat: [f32; 4],
    pub rot: [f32; 3],
    pub pos_scale: [f32; 3],
    pub rot_scale: [f32; 3],
}

impl TestBone {
    pub fn root(name: &'static str) -> Self {
        TestBone {
            name,
            parent: -1,
            ..TestBone::default()
        }
    }

    pub fn child(name: &'static str, parent: i32) -> Self {
        TestBone {
            name,
            parent,
            ..TestBone::default()
        }
    }
}

impl Default for TestBone {
    fn default() -> Self {
        TestBone {
            name: "root",
            parent: -1,
            pos: [0.0; 3],
            quat: [0.0, 0.0, 0.0, 1.0],
            rot: [0.0; 3],
            pos_scale: [1.0; 3],
            rot_scale: [1.0; 3],
        }
    }
}

pub struct TestMesh {
    pub material: i32,
    pub vertex_offset: i32,
}

pub struct TestModel {
    pub vertex_index: i32,
    pub meshes: Vec<TestMesh>,
}

pub struct TestBodyPart {
    pub name: &'static str,
    pub models: Vec<TestModel>,
}

pub struct TestSequence {
    pub label: &'static str,
    pub animation: i16,
}

pub const ANIM_LOOPING: u32 = 0x0001;
pub const ANIM_DELTA: u32 = 0x0004;

pub const RECORD_RAW_POS: u8 = 0x01;

pub struct TestAnimation {
    pub name: &'static str,
    pub fps: f32,
    pub flags: u32,
    pub frame_count: i32,
    /// Per-bone record chain, appended right after the descriptor (block 0).
    pub records: Vec<u8>,
}

#[derive(Default)]
pub struct TestMdl {
    pub version: i32,
    pub checksum: i32,
    pub root_lod: u8,
    pub bones: Vec<TestBone>,
    pub body_parts: Vec<TestBodyPart>,
    pub textures: Vec<&'static str>,
    pub texture_dirs: Vec<&'static str>,
    pub sequences: Vec<TestSequence>,
    pub animations: Vec<TestAnimation>,
    pub includes: Vec<(&'static str, &'static str)>,
}

impl TestMdl {
    pub fn new(checksum: i32) -> Self {
        TestMdl {
            version: 46,
            checksum,
            ..TestMdl::default()
        }
    }

    pub fn build(&self) -> Vec<u8> {
        let mut data = vec![0u8; 408];
        data[0..4].copy_from_slice(b"IDST");
        set_i32(&mut data, 4, self.version);
        set_i32(&mut data, 8, self.checksum);
        data[377] = self.root_lod;

        self.write_bones(&mut data);
        self.write_body_parts(&mut data);
        self.write_textures(&mut data);
        self.write_texture_dirs(&mut data);
        self.write_animations(&mut data);
        self.write_sequences(&mut data);
        self.write_includes(&mut data);

        let length = data.len() as i32;
        set_i32(&mut data, 76, length);
        data
    }

    fn write_bones(&self, data: &mut Vec<u8>) {
        set_i32(data, 156, self.bones.len() as i32);
        let data_len = data.len() as i32;
        set_i32(data, 160, data_len);
        let headers_len = self.bones.len() * 216;
        let mut region = vec![0u8; headers_len];
        let mut names = Vec::new();
        for (index, bone) in self.bones.iter().enumerate() {
            let offset = index * 216;
            let name_position = headers_len + push_name(&mut names, bone.name);
            set_i32(&mut region, offset, (name_position - offset) as i32);
            set_i32(&mut region, offset + 4, bone.parent);
            set_f32s(&mut region, offset + 32, &bone.pos);
            set_f32s(&mut region, offset + 44, &bone.quat);
            set_f32s(&mut region, offset + 60, &bone.rot);
            set_f32s(&mut region, offset + 72, &bone.pos_scale);
            set_f32s(&mut region, offset + 84, &bone.rot_scale);
        }
        region.extend(names);
        data.extend(region);
    }

    fn write_body_parts(&self, data: &mut Vec<u8>) {
        set_i32(data, 232, self.body_parts.len() as i32);
        let data_len = data.len() as i32;
        set_i32(data, 236, data_len);
        let model_total: usize = self.body_parts.iter().map(|part| part.models.len()).sum();
        let mesh_total: usize = self
            .body_parts
            .iter()
            .flat_map(|part| &part.models)
            .map(|model| model.meshes.len())
            .sum();
        let models_start = self.body_parts.len() * 16;
        let meshes_start = models_start + model_total * 148;
        let names_start = meshes_start + mesh_total * 116;

        let mut region = vec![0u8; names_start];
        let mut names = Vec::new();
        let mut model_slot = 0usize;
        let mut mesh_slot = 0usize;
        for (index, part) in self.body_parts.iter().enumerate() {
            let part_offset = index * 16;
            let name_position = names_start + push_name(&mut names, part.name);
            set_i32(&mut region, part_offset, (name_position - part_offset) as i32);
            set_i32(&mut region, part_offset + 4, part.models.len() as i32);
            set_i32(
                &mut region,
                part_offset + 12,
                (models_start + model_slot * 148 - part_offset) as i32,
            );
            for model in &part.models {
                let model_offset = models_start + model_slot * 148;
                set_i32(&mut region, model_offset + 72, model.meshes.len() as i32);
                set_i32(
                    &mut region,
                    model_offset + 76,
                    (meshes_start + mesh_slot * 116 - model_offset) as i32,
                );
                set_i32(&mut region, model_offset + 84, model.vertex_index);
                for mesh in &model.meshes {
                    let mesh_offset = meshes_start + mesh_slot * 116;
                    set_i32(&mut region, mesh_offset, mesh.material);
                    set_i32(&mut region, mesh_offset + 12, mesh.vertex_offset);
                    mesh_slot += 1;
                }
                model_slot += 1;
            }
        }
        region.extend(names);
        data.extend(region);
    }

    fn write_textures(&self, data: &mut Vec<u8>) {
        set_i32(data, 204, self.textures.len() as i32);
        let data_len = data.len() as i32;
        set_i32(data, 208, data_len);
        let headers_len = self.textures.len() * 64;
        let mut region = vec![0u8; headers_len];
        let mut names = Vec::new();
        for (index, texture) in self.textures.iter().enumerate() {
            let offset = index * 64;
            let name_position = headers_len + push_name(&mut names, texture);
            set_i32(&mut region, offset, (name_position - offset) as i32);
        }
        region.extend(names);
        data.extend(region);
    }

    fn write_texture_dirs(&self, data: &mut Vec<u8>) {
        set_i32(data, 212, self.texture_dirs.len() as i32);
        let data_len = data.len() as i32;
        set_i32(data, 216, data_len);
        let table_offset = data.len();
        let strings_offset = table_offset + self.texture_dirs.len() * 4;
        let mut table = vec![0u8; self.texture_dirs.len() * 4];
        let mut names = Vec::new();
        for (index, dir) in self.texture_dirs.iter().enumerate() {
            let position = strings_offset + push_name(&mut names, dir);
            set_i32(&mut table, index * 4, position as i32);
        }
        data.extend(table);
        data.extend(names);
    }

    fn write_animations(&self, data: &mut Vec<u8>) {
        set_i32(data, 180, self.animations.len() as i32);
        let data_len = data.len() as i32;
        set_i32(data, 184, data_len);
        let headers_len = self.animations.len() * 100;
        let mut region = vec![0u8; headers_len];
        let mut extra = Vec::new();
        for (index, animation) in self.animations.iter().enumerate() {
            let offset = index * 100;
            let name_position = headers_len + push_name(&mut extra, animation.name);
            set_i32(&mut region, offset + 4, (name_position - offset) as i32);
            set_f32(&mut region, offset + 8, animation.fps);
            set_i32(&mut region, offset + 12, animation.flags as i32);
            set_i32(&mut region, offset + 16, animation.frame_count);
            let records_position = headers_len + extra.len();
            extra.extend(&animation.records);
            // block 0, data follows the descriptor table
            set_i32(&mut region, offset + 56, (records_position - offset) as i32);
        }
        region.extend(extra);
        data.extend(region);
    }

    fn write_sequences(&self, data: &mut Vec<u8>) {
        set_i32(data, 188, self.sequences.len() as i32);
        let data_len = data.len() as i32;
        set_i32(data, 192, data_len);
        let headers_len = self.sequences.len() * 212;
        let mut region = vec![0u8; headers_len];
        let mut extra = Vec::new();
        for (index, sequence) in self.sequences.iter().enumerate() {
            let offset = index * 212;
            let label_position = headers_len + push_name(&mut extra, sequence.label);
            set_i32(&mut region, offset + 4, (label_position - offset) as i32);
            let activity_position = headers_len + push_name(&mut extra, "");
            set_i32(&mut region, offset + 8, (activity_position - offset) as i32);
            // single-entry blend table
            let table_position = headers_len + extra.len();
            extra.extend(sequence.animation.to_le_bytes());
            set_i32(&mut region, offset + 60, (table_position - offset) as i32);
        }
        region.extend(extra);
        data.extend(region);
    }

    fn write_includes(&self, data: &mut Vec<u8>) {
        set_i32(data, 336, self.includes.len() as i32);
        let data_len = data.len() as i32;
        set_i32(data, 340, data_len);
        let headers_len = self.includes.len() * 8;
        let mut region = vec![0u8; headers_len];
        let mut names = Vec::new();
        for (index, (label, file_name)) in self.includes.iter().enumerate() {
            let offset = index * 8;
            let label_position = headers_len + push_name(&mut names, label);
            set_i32(&mut region, offset, (label_position - offset) as i32);
            let file_position = headers_len + push_name(&mut names, file_name);
            set_i32(&mut region, offset + 4, (file_position - offset) as i32);
        }
        region.extend(names);
        data.extend(region);
    }
}

// ---------------------------------------------------------------------------
// vvd

#[derive(Clone, Copy)]
pub struct TestVertex {
    pub weights: [f32; 3],
    pub bones: [u8; 3],
    pub bone_count: u8,
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl TestVertex {
    pub fn at(position: [f32; 3]) -> Self {
        TestVertex {
            weights: [1.0, 0.0, 0.0],
            bones: [0; 3],
            bone_count: 1,
            position,
            normal: [0.0, 0.0, 1.0],
            uv: [0.0, 0.0],
        }
    }
}

/// Fixups are `(lod, source_vertex_id, vertex_count)` triples.
pub fn build_vvd(checksum: i32, vertices: &[TestVertex], fixups: &[(i32, i32, i32)]) -> Vec<u8> {
    let mut data = vec![0u8; 64];
    data[0..4].copy_from_slice(b"IDSV");
    set_i32(&mut data, 4, 4);
    set_i32(&mut data, 8, checksum);
    set_i32(&mut data, 12, 1); // lod count
    set_i32(&mut data, 16, vertices.len() as i32); // lod 0 vertex count
    set_i32(&mut data, 48, fixups.len() as i32);
    set_i32(&mut data, 52, 64);
    let vertex_index = 64 + fixups.len() * 12;
    set_i32(&mut data, 56, vertex_index as i32);
    set_i32(&mut data, 60, (vertex_index + vertices.len() * 48) as i32);

    for (lod, source, count) in fixups {
        data.extend(lod.to_le_bytes());
        data.extend(source.to_le_bytes());
        data.extend(count.to_le_bytes());
    }
    for vertex in vertices {
        for weight in vertex.weights {
            data.extend(weight.to_le_bytes());
        }
        data.extend(vertex.bones);
        data.push(vertex.bone_count);
        for component in vertex.position {
            data.extend(component.to_le_bytes());
        }
        for component in vertex.normal {
            data.extend(component.to_le_bytes());
        }
        for component in vertex.uv {
            data.extend(component.to_le_bytes());
        }
    }
    // tangent stream, parallel to the vertices
    for _ in vertices {
        for component in [1.0f32, 0.0, 0.0, 1.0] {
            data.extend(component.to_le_bytes());
        }
    }
    data
}

// ---------------------------------------------------------------------------
// vtx

pub const STRIP_IS_TRI_LIST: u8 = 0x01;
pub const STRIP_IS_TRI_STRIP: u8 = 0x02;

/// One body part, one model, one lod, one mesh, one strip group, one strip.
pub fn build_vtx(checksum: i32, orig_ids: &[u16], indices: &[u16], strip_flags: u8) -> Vec<u8> {
    build_vtx_parts(checksum, &[(orig_ids, indices, strip_flags)])
}

/// One body part with one single-mesh model per `(orig_ids, indices, flags)` entry.
pub fn build_vtx_parts(checksum: i32, models: &[(&[u16], &[u16], u8)]) -> Vec<u8> {
    let mut data = vec![0u8; 36];
    set_i32(&mut data, 0, 7); // version
    set_i32(&mut data, 16, checksum);
    set_i32(&mut data, 20, 1); // lod count
    set_i32(&mut data, 32, 36); // body part offset
    if models.is_empty() {
        return data;
    }
    set_i32(&mut data, 28, 1); // body part count

    // body part header
    let mut body_part = vec![0u8; 8];
    set_i32(&mut body_part, 0, models.len() as i32);
    set_i32(&mut body_part, 4, 8);
    data.extend(body_part);

    // model headers, each pointing past the remaining model headers to its own blob
    let mut blobs: Vec<Vec<u8>> = Vec::new();
    for (orig_ids, indices, flags) in models {
        blobs.push(model_blob(orig_ids, indices, *flags));
    }
    let mut blob_offset = models.len() * 8;
    let mut headers = vec![0u8; models.len() * 8];
    for (index, blob) in blobs.iter().enumerate() {
        let offset = index * 8;
        set_i32(&mut headers, offset, 1); // lod count
        set_i32(&mut headers, offset + 4, (blob_offset - offset) as i32);
        blob_offset += blob.len();
    }
    data.extend(headers);
    for blob in blobs {
        data.extend(blob);
    }
    data
}

/// Lod + mesh + strip group + strip for one model, offsets relative to the lod header.
fn model_blob(orig_ids: &[u16], indices: &[u16], strip_flags: u8) -> Vec<u8> {
    let lod = 0usize;
    let mesh = lod + 12;
    let strip_group = mesh + 9;
    let vertices = strip_group + 25;
    let index_data = vertices + orig_ids.len() * 9;
    let strip = index_data + indices.len() * 2;
    let mut data = vec![0u8; strip + 27];

    set_i32(&mut data, lod, 1); // mesh count
    set_i32(&mut data, lod + 4, (mesh - lod) as i32);

    set_i32(&mut data, mesh, 1); // strip group count
    set_i32(&mut data, mesh + 4, (strip_group - mesh) as i32);

    set_i32(&mut data, strip_group, orig_ids.len() as i32);
    set_i32(&mut data, strip_group + 4, (vertices - strip_group) as i32);
    set_i32(&mut data, strip_group + 8, indices.len() as i32);
    set_i32(&mut data, strip_group + 12, (index_data - strip_group) as i32);
    set_i32(&mut data, strip_group + 16, 1); // strip count
    set_i32(&mut data, strip_group + 20, (strip - strip_group) as i32);

    for (slot, orig_id) in orig_ids.iter().enumerate() {
        let offset = vertices + slot * 9;
        data[offset + 3] = 1; // bone count
        set_i16(&mut data, offset + 4, *orig_id as i16);
    }
    for (slot, index) in indices.iter().enumerate() {
        set_i16(&mut data, index_data + slot * 2, *index as i16);
    }

    set_i32(&mut data, strip, indices.len() as i32);
    set_i32(&mut data, strip + 4, 0); // index offset
    set_i32(&mut data, strip + 8, orig_ids.len() as i32);
    set_i32(&mut data, strip + 12, 0); // vertex offset
    data[strip + 18] = strip_flags;

    data
}

// ---------------------------------------------------------------------------
// phy

/// Build a legacy-style solid blob holding a single convex ledge over `points`
/// (ivp space, meters). Triangle edges index the points as a fan.
pub fn solid_blob(points: &[[f32; 3]]) -> Vec<u8> {
    let surface = 0usize;
    let node = surface + 48;
    let ledge = node + 28;
    let triangle_count = points.len().saturating_sub(2);
    let triangles = ledge + 16;
    let point_data = triangles + triangle_count * 16;
    let mut data = vec![0u8; point_data + points.len() * 16];

    set_i32(&mut data, surface + 32, node as i32); // ledge tree root
    data[44..48].copy_from_slice(b"IVPS");

    set_i32(&mut data, node, 0); // leaf
    set_i32(&mut data, node + 4, (ledge - node) as i32);

    set_i32(&mut data, ledge, (point_data - ledge) as i32);
    set_i16(&mut data, ledge + 12, triangle_count as i16);

    for slot in 0..triangle_count {
        let offset = triangles + slot * 16;
        for (edge, point) in [0usize, slot + 1, slot + 2].into_iter().enumerate() {
            set_i32(&mut data, offset + 4 + edge * 4, point as i32);
        }
    }
    for (slot, point) in points.iter().enumerate() {
        set_f32s(&mut data, point_data + slot * 16, point);
    }
    data
}

pub fn build_phy(solids: &[Vec<u8>], key_values: &str) -> Vec<u8> {
    let mut data = vec![0u8; 16];
    set_i32(&mut data, 0, 16);
    set_i32(&mut data, 8, solids.len() as i32);
    for solid in solids {
        data.extend((solid.len() as i32).to_le_bytes());
        data.extend(solid);
    }
    data.extend(key_values.as_bytes());
    data
}

/// A unit-ish tetrahedron in ivp space, large enough to pass the degeneracy filter.
pub fn tetrahedron() -> Vec<[f32; 3]> {
    vec![
        [0.0, 0.0, 0.0],
        [0.1, 0.0, 0.0],
        [0.0, 0.1, 0.0],
        [0.0, 0.0, 0.1],
    ]
}

// ---------------------------------------------------------------------------
// resolver

#[derive(Default)]
pub struct MapResolver {
    files: HashMap<String, Vec<u8>>,
}

impl MapResolver {
    pub fn with(mut self, path: &str, data: Vec<u8>) -> Self {
        self.files.insert(path.into(), data);
        self
    }
}

impl AssetResolver for MapResolver {
    fn exists(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    fn read(&self, path: &str) -> Option<Vec<u8>> {
        self.files.get(path).cloned()
    }
}

// half floats for raw position payloads
pub const HALF_1_0: [u8; 2] = [0x00, 0x3C];
pub const HALF_2_0: [u8; 2] = [0x00, 0x40];
pub const HALF_3_0: [u8; 2] = [0x00, 0x42];

/// A per-bone animation record with a raw half-float position payload.
pub fn raw_pos_record(bone: u8, next_offset: i16, position: [[u8; 2]; 3]) -> Vec<u8> {
    let mut record = vec![bone, RECORD_RAW_POS];
    record.extend(next_offset.to_le_bytes());
    for component in position {
        record.extend(component);
    }
    record
}
