//! Hash-gated atomic writer for generated emails.
//!
//! ## `write_document` protocol
//!
//! 1. Check the output directory exists.
//! 2. SHA-256 hash the rendered bytes.
//! 3. Compare with the hash of the file already on disk → skip if identical.
//! 4. Write to `<path>.grantmail.tmp`.
//! 5. Rename to final path (atomic on POSIX).

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use grantmail_core::config::is_unset;

use crate::error::{io_err, MergeError};

/// Suffix of every generated file.
pub const OUTPUT_SUFFIX: &str = " - Email.docx";

// ---------------------------------------------------------------------------
// Write result
// ---------------------------------------------------------------------------

/// Outcome of an individual file write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteResult {
    /// File was written (content changed or did not previously exist).
    Written { path: PathBuf },
    /// File was skipped: the file on disk already has these exact bytes.
    Unchanged { path: PathBuf },
    /// `--dry-run` mode: the file *would* have been written.
    WouldWrite { path: PathBuf },
}

impl WriteResult {
    pub fn path(&self) -> &Path {
        match self {
            WriteResult::Written { path }
            | WriteResult::Unchanged { path }
            | WriteResult::WouldWrite { path } => path,
        }
    }
}

// ---------------------------------------------------------------------------
// Paths
// ---------------------------------------------------------------------------

/// `<output_dir>/<name> - Email.docx`.
///
/// Path separators in `name` become `-` so the file always lands directly in
/// `output_dir`.
pub fn output_path(output_dir: &Path, name: &str) -> PathBuf {
    let stem: String = name
        .chars()
        .map(|c| if c == '/' || c == '\\' { '-' } else { c })
        .collect();
    output_dir.join(format!("{stem}{OUTPUT_SUFFIX}"))
}

fn tmp_path(path: &Path) -> PathBuf {
    PathBuf::from(format!("{}.grantmail.tmp", path.display()))
}

fn digest(bytes: &[u8]) -> String {
    let mut h = Sha256::new();
    h.update(bytes);
    hex::encode(h.finalize())
}

// ---------------------------------------------------------------------------
// write_document
// ---------------------------------------------------------------------------

/// Write one generated email for `name` into `output_dir`.
pub fn write_document(
    output_dir: &Path,
    name: &str,
    bytes: &[u8],
    dry_run: bool,
) -> Result<WriteResult, MergeError> {
    if is_unset(output_dir) {
        return Err(MergeError::OutputUnwritable {
            path: output_dir.to_path_buf(),
            reason: "no output folder selected".to_string(),
        });
    }
    if !output_dir.is_dir() {
        return Err(MergeError::OutputUnwritable {
            path: output_dir.to_path_buf(),
            reason: "output folder does not exist or is not a directory".to_string(),
        });
    }

    let path = output_path(output_dir, name);
    write_with_tmp(&path, bytes, dry_run, &tmp_path(&path))
}

fn write_with_tmp(
    path: &Path,
    bytes: &[u8],
    dry_run: bool,
    tmp: &Path,
) -> Result<WriteResult, MergeError> {
    let new_hash = digest(bytes);
    if path.is_file() {
        let existing = std::fs::read(path).map_err(|e| io_err(path, e))?;
        if digest(&existing) == new_hash {
            tracing::debug!("unchanged: {}", path.display());
            return Ok(WriteResult::Unchanged {
                path: path.to_path_buf(),
            });
        }
    }

    if dry_run {
        tracing::info!("[dry-run] would write: {}", path.display());
        return Ok(WriteResult::WouldWrite {
            path: path.to_path_buf(),
        });
    }

    if let Err(e) = std::fs::write(tmp, bytes) {
        let _ = std::fs::remove_file(tmp);
        return Err(io_err(path, e));
    }
    if let Err(e) = std::fs::rename(tmp, path) {
        let _ = std::fs::remove_file(tmp);
        return Err(io_err(path, e));
    }

    tracing::info!("wrote: {}", path.display());
    Ok(WriteResult::Written {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::{Duration, SystemTime};

    use filetime::{set_file_mtime, FileTime};
    use tempfile::TempDir;

    #[test]
    fn output_path_uses_name_and_suffix() {
        let p = output_path(Path::new("/out"), "Jane Doe");
        assert_eq!(p, PathBuf::from("/out/Jane Doe - Email.docx"));
    }

    #[test]
    fn output_path_neutralizes_separators() {
        let p = output_path(Path::new("/out"), "../etc\\passwd");
        assert_eq!(p, PathBuf::from("/out/..-etc-passwd - Email.docx"));
        assert_eq!(p.parent(), Some(Path::new("/out")));
    }

    #[test]
    fn first_write_returns_written() {
        let tmp = TempDir::new().unwrap();
        let result = write_document(tmp.path(), "Jane Doe", b"hello", false).unwrap();
        assert!(matches!(result, WriteResult::Written { .. }));
        assert_eq!(fs::read(result.path()).unwrap(), b"hello");
    }

    #[test]
    fn second_write_same_bytes_returns_unchanged_and_keeps_mtime() {
        let tmp = TempDir::new().unwrap();
        let first = write_document(tmp.path(), "Jane Doe", b"same", false).unwrap();

        let old = FileTime::from_system_time(SystemTime::now() - Duration::from_secs(3600));
        set_file_mtime(first.path(), old).unwrap();

        let second = write_document(tmp.path(), "Jane Doe", b"same", false).unwrap();
        assert!(matches!(second, WriteResult::Unchanged { .. }));
        let mtime = FileTime::from_last_modification_time(&fs::metadata(second.path()).unwrap());
        assert_eq!(mtime, old, "unchanged file must not be rewritten");
    }

    #[test]
    fn changed_bytes_return_written() {
        let tmp = TempDir::new().unwrap();
        write_document(tmp.path(), "Jane Doe", b"v1", false).unwrap();
        let result = write_document(tmp.path(), "Jane Doe", b"v2", false).unwrap();
        assert!(matches!(result, WriteResult::Written { .. }));
        assert_eq!(fs::read(result.path()).unwrap(), b"v2");
    }

    #[test]
    fn dry_run_does_not_write_file() {
        let tmp = TempDir::new().unwrap();
        let result = write_document(tmp.path(), "Jane Doe", b"content", true).unwrap();
        assert!(matches!(result, WriteResult::WouldWrite { .. }));
        assert!(!result.path().exists(), "dry-run must not create files");
    }

    #[test]
    fn tmp_file_removed_after_write() {
        let tmp = TempDir::new().unwrap();
        let result = write_document(tmp.path(), "Jane Doe", b"data", false).unwrap();
        assert!(!tmp_path(result.path()).exists(), ".grantmail.tmp must be cleaned up");
    }

    #[test]
    fn unset_output_dir_is_unwritable() {
        let err = write_document(Path::new(""), "Jane Doe", b"x", false).unwrap_err();
        assert!(matches!(err, MergeError::OutputUnwritable { .. }));
        assert!(err.to_string().contains("no output folder selected"));
    }

    #[test]
    fn missing_output_dir_is_unwritable_and_not_created() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("nope");
        let err = write_document(&missing, "Jane Doe", b"x", false).unwrap_err();
        assert!(matches!(err, MergeError::OutputUnwritable { .. }));
        assert!(!missing.exists());
    }

    #[test]
    fn file_as_output_dir_is_unwritable() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("plain.txt");
        fs::write(&file, "x").unwrap();
        let err = write_document(&file, "Jane Doe", b"x", false).unwrap_err();
        assert!(matches!(err, MergeError::OutputUnwritable { .. }));
    }

    #[test]
    #[cfg(unix)]
    fn rename_failure_leaves_original_and_cleans_tmp() {
        use std::os::unix::fs::PermissionsExt;

        let root = TempDir::new().unwrap();
        let readonly_dir = root.path().join("readonly");
        fs::create_dir_all(&readonly_dir).unwrap();

        let path = output_path(&readonly_dir, "Jane Doe");
        fs::write(&path, "original").unwrap();

        let mut perms = fs::metadata(&readonly_dir).unwrap().permissions();
        perms.set_mode(0o555);
        fs::set_permissions(&readonly_dir, perms).unwrap();

        let tmp_dir = TempDir::new().unwrap();
        let tmp = tmp_dir.path().join("Jane Doe - Email.docx.grantmail.tmp");

        let result = write_with_tmp(&path, b"new content", false, &tmp);

        let mut perms = fs::metadata(&readonly_dir).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&readonly_dir, perms).unwrap();

        // Root ignores directory permissions; only assert when the rename failed.
        if let Err(err) = result {
            assert!(matches!(err, MergeError::OutputUnwritable { .. }));
            assert_eq!(fs::read_to_string(&path).unwrap(), "original");
            assert!(!tmp.exists(), ".grantmail.tmp should be cleaned up");
        }
    }
}
