//! Durable file replacement shared by the stores.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Replace `path` with `contents` so that readers see either the old file or
/// the new one, never a truncated mix.
///
/// The bytes go to a sibling temp file which is fsynced and then renamed over
/// the target. The parent directory is created if missing.
pub fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let temp_path = temp_sibling(path);
    let result = (|| {
        let mut temp = OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(&temp_path)?;
        temp.write_all(contents)?;
        temp.sync_all()?;
        fs::rename(&temp_path, path)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_atomic_replaces_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("logs.jsonl");

        write_atomic(&path, b"one\n").unwrap();
        write_atomic(&path, b"two\n").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "two\n");
        assert!(!dir.path().join("sub").join("logs.jsonl.tmp").exists());
    }
}
