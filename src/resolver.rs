/// Source of asset bytes, paths are forward-slashed, lowercase and relative to the
/// mount root.
///
/// The decoder consults the resolver for include models and material existence
/// checks, re-entrantly during a decode, so implementations must stay callable from
/// multiple concurrent decodes.
pub trait AssetResolver {
    fn exists(&self, path: &str) -> bool;
    fn read(&self, path: &str) -> Option<Vec<u8>>;
}

impl<R: AssetResolver + ?Sized> AssetResolver for &R {
    fn exists(&self, path: &str) -> bool {
        (**self).exists(path)
    }

    fn read(&self, path: &str) -> Option<Vec<u8>> {
        (**self).read(path)
    }
}

/// A resolver with no assets, for models that are known to be self contained.
impl AssetResolver for () {
    fn exists(&self, _path: &str) -> bool {
        false
    }

    fn read(&self, _path: &str) -> Option<Vec<u8>> {
        None
    }
}

/// Opaque handle of a loaded material, meaningful only to the loader that returned it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialHandle(pub u32);

/// Turns extension-less logical material paths (`materials/<dir>/<name>`) into
/// handles. Mount prefixes and material file extensions are the loader's concern.
pub trait MaterialLoader {
    fn load(&mut self, path: &str) -> Option<MaterialHandle>;
}

/// A loader that loads nothing, meshes keep an empty material.
impl MaterialLoader for () {
    fn load(&mut self, _path: &str) -> Option<MaterialHandle> {
        None
    }
}
