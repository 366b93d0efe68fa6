pub mod raw;
mod surface;

use crate::{read_single, ModelError, Readable, Vector};
pub use raw::{PhyHeader, IVP_TO_SOURCE};
use tracing::warn;

type Result<T> = std::result::Result<T, ModelError>;

pub const MAX_SOLIDS: i32 = 128;

/// The collision data of a model: one solid per simulated part plus the textual
/// ragdoll description trailing the solids.
#[derive(Debug, Clone)]
pub struct Phy {
    pub header: PhyHeader,
    pub solids: Vec<Solid>,
    pub key_values: String,
}

/// The convex decomposition of a single solid.
///
/// A solid that failed to decode keeps its place in the list with no hulls so that
/// the ragdoll description indices stay aligned.
#[derive(Debug, Clone, Default)]
pub struct Solid {
    pub hulls: Vec<ConvexHull>,
}

#[derive(Debug, Clone)]
pub struct ConvexHull {
    pub points: Vec<Vector>,
}

impl Phy {
    pub fn read(data: &[u8]) -> Result<Self> {
        let header = PhyHeader::read(data)?;
        if header.header_size != 16 {
            return Err(ModelError::OutOfBounds {
                data: "phy header",
                offset: 0,
            });
        }
        if !(1..=MAX_SOLIDS).contains(&header.solid_count) {
            return Err(ModelError::OutOfBounds {
                data: "phy solid count",
                offset: 8,
            });
        }

        let mut offset = header.header_size as usize;
        let mut solids = Vec::with_capacity(header.solid_count as usize);
        for solid in 0..header.solid_count {
            let size: i32 = read_single(data, offset)?;
            let size = usize::try_from(size).map_err(|_| ModelError::OutOfBounds {
                data: "phy solid size",
                offset,
            })?;
            let blob = data
                .get(offset + 4..offset + 4 + size)
                .ok_or(ModelError::OutOfBounds {
                    data: "phy solid",
                    offset,
                })?;
            match surface::read_solid(blob) {
                Ok(hulls) => solids.push(Solid { hulls }),
                Err(error) => {
                    warn!(solid, %error, "skipping unreadable physics solid");
                    solids.push(Solid::default());
                }
            }
            offset += 4 + size;
        }

        let key_values = String::from_utf8_lossy(data.get(offset..).unwrap_or_default())
            .trim_end_matches('\0')
            .to_string();

        Ok(Phy {
            header,
            solids,
            key_values,
        })
    }
}
