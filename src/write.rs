use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use xxhash_rust::xxh3::xxh3_64;

#[derive(Error, Debug)]
pub enum WriteError {
    #[error("I/O error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} changed on disk while it was being processed")]
    ConcurrentModification { path: PathBuf },
}

impl WriteError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        WriteError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// xxh3 fingerprint of file contents.
pub fn fingerprint(content: &[u8]) -> u64 {
    xxh3_64(content)
}

/// Replace `path` with `content` if the file still hashes to `expected`.
///
/// Guards against another process editing the file between our read and
/// our write.
pub fn write_if_unchanged(path: &Path, expected: u64, content: &[u8]) -> Result<(), WriteError> {
    let current = fs::read(path).map_err(|err| WriteError::io(path, err))?;
    if fingerprint(&current) != expected {
        return Err(WriteError::ConcurrentModification {
            path: path.to_path_buf(),
        });
    }
    atomic_write(path, content)
}

/// Atomic file write: tempfile + fsync + rename.
///
/// The temp file lives in the target's directory so the rename never crosses
/// filesystems. It is removed when dropped on any error path.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<(), WriteError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = tempfile::NamedTempFile::new_in(parent).map_err(|err| WriteError::io(path, err))?;
    temp.write_all(content)
        .map_err(|err| WriteError::io(path, err))?;

    if let Ok(metadata) = fs::metadata(path) {
        temp.as_file()
            .set_permissions(metadata.permissions())
            .map_err(|err| WriteError::io(path, err))?;
    }

    temp.as_file()
        .sync_all()
        .map_err(|err| WriteError::io(path, err))?;
    temp.persist(path)
        .map_err(|err| WriteError::io(path, err.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atomic_write_replaces_contents() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("workflow.md");
        fs::write(&file, "old").unwrap();

        atomic_write(&file, b"new").unwrap();

        assert_eq!(fs::read_to_string(&file).unwrap(), "new");
        let leftovers: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(leftovers.len(), 1);
    }

    #[test]
    fn refuses_to_overwrite_concurrent_change() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("workflow.md");
        fs::write(&file, "original").unwrap();
        let expected = fingerprint(b"original");

        fs::write(&file, "edited elsewhere").unwrap();
        let err = write_if_unchanged(&file, expected, b"ours").unwrap_err();

        assert!(matches!(err, WriteError::ConcurrentModification { .. }));
        assert_eq!(fs::read_to_string(&file).unwrap(), "edited elsewhere");
    }

    #[cfg(unix)]
    #[test]
    fn keeps_file_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("workflow.md");
        fs::write(&file, "x").unwrap();
        fs::set_permissions(&file, fs::Permissions::from_mode(0o640)).unwrap();

        write_if_unchanged(&file, fingerprint(b"x"), b"y").unwrap();

        let mode = fs::metadata(&file).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o640);
    }
}
