// ==============================================================================
// Intermediate Representation Pass-Through
// ==============================================================================
//
// The IR binary format belongs entirely to the external generator; this crate
// never interprets its contents. An `Ir` is a base name (the source schema's
// file stem, which names the `.sbeir` cache file) plus the opaque bytes. The
// only validation applied is an is-empty check, since no generator run ever
// produces a zero-byte cache.

use std::fs;
use std::path::{Path, PathBuf};

use miette::Context;

use crate::error::EmptyIrCache;

/// Cache-file extension for serialized intermediate representations.
pub(crate) const IR_EXTENSION: &str = "sbeir";

/// An intermediate representation obtained from the generator or from a cache
/// file, held as opaque bytes.
#[derive(Debug)]
pub(crate) struct Ir {
    name: String,
    bytes: Vec<u8>,
}

impl Ir {
    /// Load an IR cache file.
    ///
    /// The base name is taken from the file stem, so `car.sbeir` round-trips
    /// back to `car.sbeir` when re-encoded.
    pub(crate) fn read_cache(path: &Path) -> miette::Result<Ir> {
        let bytes = fs::read(path)
            .map_err(|e| miette::miette!("{e}"))
            .wrap_err_with(|| format!("read IR cache {}", path.display()))?;
        if bytes.is_empty() {
            return Err(EmptyIrCache {
                path: path.to_path_buf(),
            }
            .into());
        }
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Ir { name, bytes })
    }

    /// Serialize this IR to `<name>.sbeir` under `dir`, returning the path
    /// written.
    pub(crate) fn write_cache(&self, dir: &Path) -> miette::Result<PathBuf> {
        let path = dir.join(format!("{}.{IR_EXTENSION}", self.name));
        fs::write(&path, &self.bytes)
            .map_err(|e| miette::miette!("{e}"))
            .wrap_err_with(|| format!("write IR cache {}", path.display()))?;
        Ok(path)
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_round_trips_name_and_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("car.sbeir");
        fs::write(&path, b"opaque ir bytes").unwrap();

        let ir = Ir::read_cache(&path).unwrap();
        assert_eq!(ir.name(), "car");

        let out = tempfile::tempdir().unwrap();
        let written = ir.write_cache(out.path()).unwrap();
        assert_eq!(written.file_name().unwrap(), "car.sbeir");
        assert_eq!(fs::read(&written).unwrap(), b"opaque ir bytes");
    }

    #[test]
    fn empty_cache_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.sbeir");
        fs::write(&path, b"").unwrap();

        let err = Ir::read_cache(&path).unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn missing_cache_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.sbeir");
        let err = Ir::read_cache(&path).unwrap_err();
        assert!(format!("{err:?}").contains("absent.sbeir"));
    }
}
