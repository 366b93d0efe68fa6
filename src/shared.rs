use crate::{ModelError, StringError};
use arrayvec::ArrayString;
use bytemuck::{Pod, Zeroable};
use cgmath::{InnerSpace, Quaternion as CgQuaternion, Rotation, Vector3};
use std::fmt;
use std::fmt::{Display, Formatter};
use std::ops::{Add, Mul, Sub};

#[derive(Debug, Clone, Copy, Default, PartialEq, Zeroable, Pod)]
#[repr(C)]
pub struct Vector {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector {
    pub fn iter(&self) -> impl Iterator<Item = f32> {
        [self.x, self.y, self.z].into_iter()
    }
}

impl From<Vector> for [f32; 3] {
    fn from(vector: Vector) -> Self {
        [vector.x, vector.y, vector.z]
    }
}

impl From<[f32; 3]> for Vector {
    fn from(vector: [f32; 3]) -> Self {
        Vector {
            x: vector[0],
            y: vector[1],
            z: vector[2],
        }
    }
}

impl From<Vector> for Vector3<f32> {
    fn from(vector: Vector) -> Self {
        Vector3::new(vector.x, vector.y, vector.z)
    }
}

impl From<Vector3<f32>> for Vector {
    fn from(vector: Vector3<f32>) -> Self {
        Vector {
            x: vector.x,
            y: vector.y,
            z: vector.z,
        }
    }
}

impl Add<Vector> for Vector {
    type Output = Vector;

    fn add(self, rhs: Vector) -> Self::Output {
        Vector {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
            z: self.z + rhs.z,
        }
    }
}

impl Sub<Vector> for Vector {
    type Output = Vector;

    fn sub(self, rhs: Vector) -> Self::Output {
        Vector {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
            z: self.z - rhs.z,
        }
    }
}

impl Mul<f32> for Vector {
    type Output = Vector;

    fn mul(self, rhs: f32) -> Self::Output {
        Vector {
            x: self.x * rhs,
            y: self.y * rhs,
            z: self.z * rhs,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Zeroable, Pod)]
#[repr(C)]
pub struct Quaternion {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Default for Quaternion {
    fn default() -> Self {
        Quaternion {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            w: 1.0,
        }
    }
}

impl From<Quaternion> for CgQuaternion<f32> {
    fn from(q: Quaternion) -> Self {
        CgQuaternion::new(q.w, q.x, q.y, q.z)
    }
}

impl From<CgQuaternion<f32>> for Quaternion {
    fn from(q: CgQuaternion<f32>) -> Self {
        Quaternion {
            x: q.v.x,
            y: q.v.y,
            z: q.v.z,
            w: q.s,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Zeroable, Pod)]
#[repr(C)]
pub struct RadianEuler {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Add<RadianEuler> for RadianEuler {
    type Output = RadianEuler;

    fn add(self, rhs: RadianEuler) -> Self::Output {
        RadianEuler {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
            z: self.z + rhs.z,
        }
    }
}

impl From<RadianEuler> for Quaternion {
    fn from(euler: RadianEuler) -> Self {
        let (sx, cx) = (euler.x * 0.5).sin_cos();
        let (sy, cy) = (euler.y * 0.5).sin_cos();
        let (sz, cz) = (euler.z * 0.5).sin_cos();
        Quaternion {
            x: sx * cy * cz - cx * sy * sz,
            y: cx * sy * cz + sx * cy * sz,
            z: cx * cy * sz - sx * sy * cz,
            w: cx * cy * cz + sx * sy * sz,
        }
    }
}

/// Row-major 3x4 bone matrix as stored in the file.
#[derive(Debug, Clone, Copy, Zeroable, Pod)]
#[repr(C)]
pub struct Transform3x4(pub [[f32; 4]; 3]);

/// A rigid transform, position plus unit rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoneTransform {
    pub position: Vector,
    pub rotation: Quaternion,
}

impl Default for BoneTransform {
    fn default() -> Self {
        BoneTransform {
            position: Vector::default(),
            rotation: Quaternion::default(),
        }
    }
}

impl BoneTransform {
    pub fn new(position: Vector, rotation: Quaternion) -> Self {
        BoneTransform { position, rotation }
    }

    /// `self ∘ local`: apply `local` in the space of `self`.
    pub fn compose(&self, local: &BoneTransform) -> BoneTransform {
        let rotation = CgQuaternion::from(self.rotation);
        let rotated = rotation.rotate_vector(Vector3::from(local.position));
        BoneTransform {
            position: self.position + Vector::from(rotated),
            rotation: Quaternion::from(rotation * CgQuaternion::from(local.rotation)),
        }
    }

    pub fn inverse(&self) -> BoneTransform {
        let rotation = CgQuaternion::from(self.rotation).invert();
        let position = rotation.rotate_vector(-Vector3::from(self.position));
        BoneTransform {
            position: Vector::from(position),
            rotation: Quaternion::from(rotation),
        }
    }

    pub fn apply(&self, point: Vector) -> Vector {
        let rotated = CgQuaternion::from(self.rotation).rotate_vector(Vector3::from(point));
        self.position + Vector::from(rotated)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Vector,
    pub max: Vector,
}

impl BoundingBox {
    pub fn extend(&mut self, point: Vector) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.min.z = self.min.z.min(point.z);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
        self.max.z = self.max.z.max(point.z);
    }

    pub fn size(&self) -> Vector {
        self.max - self.min
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        BoundingBox {
            min: Vector {
                x: f32::INFINITY,
                y: f32::INFINITY,
                z: f32::INFINITY,
            },
            max: Vector {
                x: f32::NEG_INFINITY,
                y: f32::NEG_INFINITY,
                z: f32::NEG_INFINITY,
            },
        }
    }
}

impl FromIterator<Vector> for BoundingBox {
    fn from_iter<T: IntoIterator<Item = Vector>>(iter: T) -> Self {
        let mut bounds = BoundingBox::default();
        for point in iter {
            bounds.extend(point);
        }
        bounds
    }
}

pub(crate) fn normalize(vector: Vector3<f32>) -> Vector3<f32> {
    let length = vector.magnitude();
    if length > 0.0 {
        vector / length
    } else {
        vector
    }
}

/// Fixed length, null-terminated string
#[derive(Debug, Clone)]
pub struct FixedString<const LEN: usize>(ArrayString<LEN>);

impl<const LEN: usize> TryFrom<[u8; LEN]> for FixedString<LEN> {
    type Error = ModelError;

    fn try_from(name_buf: [u8; LEN]) -> Result<Self, Self::Error> {
        use std::str;

        let zero_pos = name_buf
            .iter()
            .position(|c| *c == 0)
            .ok_or(StringError::NotNullTerminated)?;
        let name = &name_buf[..zero_pos];
        Ok(FixedString(
            ArrayString::from(str::from_utf8(name).map_err(StringError::NonUTF8)?).unwrap(),
        ))
    }
}

impl<const N: usize> AsRef<str> for FixedString<N> {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl<const N: usize> FixedString<N> {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl<const LEN: usize> Display for FixedString<LEN> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}
