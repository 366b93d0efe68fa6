mod animation;
mod compressed;
mod error;
mod keyvalues;
pub mod mdl;
mod mesh;
mod model;
pub mod phy;
mod physics;
mod resolver;
mod shared;
mod skeleton;
pub mod vtx;
pub mod vvd;

pub use animation::Animation;
pub use error::{ModelError, StringError};
pub use mesh::{EyeUniforms, Mesh, MeshMaterial, MeshVertex};
pub use model::{decode_model, decode_model_into, load_model, Model, ModelBuffers, ModelSink};
pub use physics::{Joint, JointKind, PhysicsBody};
pub use resolver::{AssetResolver, MaterialHandle, MaterialLoader};
pub use shared::{BoneTransform, BoundingBox, FixedString, Quaternion, RadianEuler, Transform3x4, Vector};
pub use skeleton::Skeleton;

use bytemuck::Pod;
use std::any::type_name;
use std::mem::size_of;

/// Types that can be decoded from the start of a byte buffer.
pub(crate) trait Readable: Sized {
    fn read(data: &[u8]) -> Result<Self, ModelError>;
}

impl<T: ReadableRelative> Readable for T {
    fn read(data: &[u8]) -> Result<Self, ModelError> {
        let bytes = data
            .get(..size_of::<T>())
            .ok_or(ModelError::Eof(size_of::<T>()))?;
        Ok(bytemuck::pod_read_unaligned(bytes))
    }
}

impl Readable for String {
    /// Null-terminated ascii
    fn read(data: &[u8]) -> Result<Self, ModelError> {
        let end = data
            .iter()
            .position(|byte| *byte == 0)
            .ok_or(StringError::NotNullTerminated)?;
        Ok(std::str::from_utf8(&data[..end])
            .map_err(StringError::from)?
            .into())
    }
}

/// Marker for pod structs that need no post-processing after reading.
pub(crate) trait ReadableRelative: Pod {}

impl ReadableRelative for i16 {}
impl ReadableRelative for u16 {}
impl ReadableRelative for i32 {}

/// Structs read as a fixed pod header followed by data indexed relative to the header start.
pub(crate) trait ReadRelative: Sized {
    type Header: Pod;

    fn read(data: &[u8], header: Self::Header) -> Result<Self, ModelError>;
}

impl<T: ReadableRelative> ReadRelative for T {
    type Header = T;

    fn read(_data: &[u8], header: Self::Header) -> Result<Self, ModelError> {
        Ok(header)
    }
}

/// Offsets as stored in the files, converted so that negative values fail the bounds check.
pub(crate) trait DataOffset: Copy {
    fn offset(self) -> usize;
}

impl DataOffset for i32 {
    fn offset(self) -> usize {
        usize::try_from(self).unwrap_or(usize::MAX)
    }
}

impl DataOffset for usize {
    fn offset(self) -> usize {
        self
    }
}

pub(crate) fn read_single<T: Readable, I: DataOffset>(
    data: &[u8],
    index: I,
) -> Result<T, ModelError> {
    let offset = index.offset();
    let data = data.get(offset..).ok_or(ModelError::OutOfBounds {
        data: type_name::<T>(),
        offset,
    })?;
    T::read(data)
}

pub(crate) fn read_relative_single<T: ReadRelative>(
    data: &[u8],
    index: usize,
) -> Result<T, ModelError> {
    let data = data.get(index..).ok_or(ModelError::OutOfBounds {
        data: type_name::<T::Header>(),
        offset: index,
    })?;
    let bytes = data
        .get(..size_of::<T::Header>())
        .ok_or(ModelError::Eof(size_of::<T::Header>()))?;
    let header = bytemuck::pod_read_unaligned(bytes);
    T::read(data, header)
}

pub(crate) fn read_relative<T: ReadRelative, I: IntoIterator<Item = usize>>(
    data: &[u8],
    indexes: I,
) -> Result<Vec<T>, ModelError> {
    indexes
        .into_iter()
        .map(|index| read_relative_single(data, index))
        .collect()
}

/// Byte offsets for `count` structs of `size` bytes starting at `offset`.
pub(crate) fn index_range(offset: i32, count: i32, size: usize) -> impl Iterator<Item = usize> {
    let offset = usize::try_from(offset).unwrap_or(usize::MAX);
    (0..count.max(0) as usize).map(move |i| offset.saturating_add(i * size))
}
