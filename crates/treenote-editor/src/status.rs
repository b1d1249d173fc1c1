//! File status taxonomy shared by load, save, and autosave (`spec.md` §6),
//! grounded on the teacher's `OpenFileResult`/`WriteFileResult` split in
//! `core-actions::io_ops` — one small enum per outcome rather than a bare
//! `anyhow::Error`, so the host can branch on *why* without string-matching.

use std::io::ErrorKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    None,
    DoesNotExist,
    IsDirectory,
    IsDeviceFile,
    IsInvalidFile,
    IsUnreadable,
    IsUnwritable,
    UnknownError,
}

impl FileStatus {
    /// Classifies an I/O failure from opening or reading `path` for load.
    pub(crate) fn from_read_error(err: &std::io::Error, path: &std::path::Path) -> Self {
        if path.is_dir() {
            return FileStatus::IsDirectory;
        }
        match err.kind() {
            ErrorKind::NotFound => FileStatus::DoesNotExist,
            ErrorKind::PermissionDenied => FileStatus::IsUnreadable,
            _ => classify_metadata(path).unwrap_or(FileStatus::UnknownError),
        }
    }

    /// Classifies an I/O failure from writing to `path` for save/autosave.
    pub(crate) fn from_write_error(err: &std::io::Error, path: &std::path::Path) -> Self {
        match err.kind() {
            ErrorKind::PermissionDenied => FileStatus::IsUnwritable,
            ErrorKind::NotFound => FileStatus::DoesNotExist,
            _ => classify_metadata(path).unwrap_or(FileStatus::IsUnwritable),
        }
    }
}

#[cfg(unix)]
fn classify_metadata(path: &std::path::Path) -> Option<FileStatus> {
    use std::os::unix::fs::FileTypeExt;
    let meta = std::fs::symlink_metadata(path).ok()?;
    let ty = meta.file_type();
    if ty.is_dir() {
        Some(FileStatus::IsDirectory)
    } else if ty.is_char_device() || ty.is_block_device() || ty.is_fifo() || ty.is_socket() {
        Some(FileStatus::IsDeviceFile)
    } else {
        None
    }
}

#[cfg(not(unix))]
fn classify_metadata(path: &std::path::Path) -> Option<FileStatus> {
    let meta = std::fs::symlink_metadata(path).ok()?;
    if meta.file_type().is_dir() {
        Some(FileStatus::IsDirectory)
    } else {
        None
    }
}
