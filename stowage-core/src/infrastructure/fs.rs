// stowage-core/src/infrastructure/fs.rs

use crate::infrastructure::error::InfrastructureError;
use std::io::Write;
use std::path::Path;

/// Write content to a file atomically using a temporary file.
///
/// Missing parent directories are created first. The temporary file lives in
/// the target directory so the final rename never crosses filesystems; readers
/// see either the previous file or the complete new one.
pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(
    path: P,
    content: C,
) -> Result<(), InfrastructureError> {
    let path = path.as_ref();
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let mut temp_file = tempfile::NamedTempFile::new_in(parent).map_err(InfrastructureError::Io)?;

    temp_file
        .write_all(content.as_ref())
        .map_err(InfrastructureError::Io)?;

    temp_file
        .persist(path)
        .map_err(|e| InfrastructureError::Io(e.error))?;

    Ok(())
}

/// Fails with `FileNotFound` unless `path` is an existing regular file.
pub fn require_file(path: &Path) -> Result<(), InfrastructureError> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() => Ok(()),
        Ok(_) => Err(InfrastructureError::FileNotFound(path.to_path_buf())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(InfrastructureError::FileNotFound(path.to_path_buf()))
        }
        Err(e) => Err(InfrastructureError::Io(e)),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_atomic_write_creates_parents() -> Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("data").join("data.jsonl");

        atomic_write(&file_path, "{\"a\":1}\n")?;

        assert_eq!(fs::read_to_string(file_path)?, "{\"a\":1}\n");
        Ok(())
    }

    #[test]
    fn test_atomic_write_overwrites_existing() -> Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("data.jsonl");

        atomic_write(&file_path, "first run")?;
        atomic_write(&file_path, "second run")?;

        assert_eq!(fs::read_to_string(file_path)?, "second run");
        Ok(())
    }

    #[test]
    fn test_require_file() -> Result<()> {
        let dir = tempdir()?;
        let missing = dir.path().join("missing.csv");
        assert!(matches!(
            require_file(&missing),
            Err(InfrastructureError::FileNotFound(_))
        ));
        // A directory is not a loadable file either
        assert!(require_file(dir.path()).is_err());

        fs::write(&missing, "id\n1\n")?;
        require_file(&missing)?;
        Ok(())
    }
}
