pub mod raw;

pub use raw::{
    AnimationBlock, AnimationDescription, AnimationFlags, AnimationRecord, AnimationSection, Bone,
    BodyPart, Eyeball, IncludeModel, Sequence, SubMesh, SubModel, Texture,
};

use crate::{read_relative, read_relative_single, Readable};
use crate::ModelError;
use raw::header::{StudioHeader, FILETYPE_ID, MDL_VERSIONS};

type Result<T> = std::result::Result<T, ModelError>;

#[derive(Debug, Clone)]
pub struct Mdl {
    pub header: StudioHeader,
    pub bones: Vec<Bone>,
    pub body_parts: Vec<BodyPart>,
    pub textures: Vec<Texture>,
    pub texture_dirs: Vec<String>,
    pub sequences: Vec<Sequence>,
    pub animations: Vec<AnimationDescription>,
    pub include_models: Vec<IncludeModel>,
    pub animation_blocks: Vec<AnimationBlock>,
}

impl Mdl {
    pub fn read(data: &[u8]) -> Result<Self> {
        let header = StudioHeader::read(data)?;
        if header.id != FILETYPE_ID || !MDL_VERSIONS.contains(&header.version) {
            return Err(ModelError::NotAStudioModel {
                id: header.id,
                version: header.version,
            });
        }

        let texture_dirs = header
            .texture_dir_indexes()
            .map(|index| {
                let offset: i32 = crate::read_single(data, index)?;
                crate::read_single(data, offset)
            })
            .collect::<Result<_>>()?;

        // animation data offsets are descriptor-relative, so every descriptor keeps its
        // own position in the buffer
        let animations = header
            .local_animation_indexes()
            .map(|index| {
                read_relative_single::<AnimationDescription>(data, index).map(|mut description| {
                    description.offset = index;
                    description
                })
            })
            .collect::<Result<_>>()?;

        Ok(Mdl {
            bones: read_relative(data, header.bone_indexes())?,
            body_parts: read_relative(data, header.body_part_indexes())?,
            textures: read_relative(data, header.texture_indexes())?,
            texture_dirs,
            sequences: read_relative(data, header.local_sequence_indexes())?,
            animations,
            include_models: read_relative(data, header.include_model_indexes())?,
            animation_blocks: read_relative(data, header.animation_block_indexes())?,
            header,
        })
    }

    pub fn checksum(&self) -> i32 {
        self.header.checksum
    }

    pub fn root_lod(&self) -> i32 {
        self.header.root_lod as i32
    }
}
