//! Locating recording files.

use std::path::{Path, PathBuf};

use log::debug;

use crate::config::recordings_dir;

/// Extension tried when a recording is given without one
pub const RECORDING_EXTENSION: &str = "json";

/// Find the file meant by `name`.
///
/// An existing path is used as is. Otherwise `name` and `name.json` are
/// looked up in the recordings directory. If nothing matches, `name` is
/// returned unchanged so the caller reports the path the user typed.
pub fn resolve_recording_path(name: &Path) -> PathBuf {
    match recordings_dir() {
        Some(dir) => resolve_in(name, &dir),
        None => name.to_owned(),
    }
}

fn resolve_in(name: &Path, base_dir: &Path) -> PathBuf {
    if name.exists() || name.is_absolute() {
        return name.to_owned();
    }

    let mut candidates = vec![base_dir.join(name)];
    if name.extension().is_none() {
        candidates.push(base_dir.join(name).with_extension(RECORDING_EXTENSION));
    }

    for candidate in candidates {
        if candidate.is_file() {
            debug!("Resolved {} to {}", name.display(), candidate.display());
            return candidate;
        }
    }
    name.to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_existing_path_wins() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("power.json");
        fs::write(&path, "{}").unwrap();
        assert_eq!(resolve_in(&path, Path::new("/nonexistent")), path);
    }

    #[test]
    fn test_bare_name_found_in_base_dir() {
        let base = tempdir().unwrap();
        fs::write(base.path().join("power.json"), "{}").unwrap();

        assert_eq!(
            resolve_in(Path::new("power"), base.path()),
            base.path().join("power.json")
        );
        assert_eq!(
            resolve_in(Path::new("power.json"), base.path()),
            base.path().join("power.json")
        );
    }

    #[test]
    fn test_unknown_name_unchanged() {
        let base = tempdir().unwrap();
        assert_eq!(
            resolve_in(Path::new("missing"), base.path()),
            PathBuf::from("missing")
        );
    }
}
