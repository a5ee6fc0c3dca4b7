//! Per-format extractors and the filesystem side they share.
//!
//! # Platform Behavior
//!
//! **Unix**: entry mode bits are applied to created files and directories.
//!
//! **Windows (non-Unix)**: mode bits are ignored; only timestamps are applied.

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;

use filetime::FileTime;
use tracing::debug;

use crate::diagnostics::Warning;
use crate::entry::EntryDescriptor;
use crate::error::{Error, Result};
use crate::options::UnpackOptions;

mod tar;
mod zip;

pub use tar::untar;
pub use zip::{unzip, unzip_seekable, unzip_stream};

/// Create `path` and any missing ancestors.
///
/// The owner always keeps `rwx` so later entries can be written inside.
pub(crate) fn create_dir(path: &Path, mode: u32) -> io::Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(mode | 0o700);
    }
    #[cfg(not(unix))]
    let _ = mode;
    builder.create(path)
}

fn ensure_parent(target: &Path, mode: u32) -> io::Result<()> {
    match target.parent() {
        Some(parent) if fs::symlink_metadata(parent).is_err() => create_dir(parent, mode),
        _ => Ok(()),
    }
}

/// Create a directory entry at `target` with the entry's recorded mode.
pub(crate) fn write_dir(entry: &EntryDescriptor, target: &Path, options: &UnpackOptions) -> Result<()> {
    let mode = entry.mode.unwrap_or(options.dir_mode);
    create_dir(target, mode).map_err(|e| Error::extract(&entry.name, e))?;
    debug!(entry = %entry.name, target = %target.display(), "created directory");
    Ok(())
}

/// Write a file entry's body to `target`, then apply its metadata.
///
/// With `exact` set, exactly that many bytes must be copied. The handle is
/// closed before metadata is applied and before this returns.
pub(crate) fn write_file<R: Read + ?Sized>(
    entry: &EntryDescriptor,
    target: &Path,
    reader: &mut R,
    exact: bool,
    options: &UnpackOptions,
) -> Result<u64> {
    ensure_parent(target, options.dir_mode).map_err(|e| Error::extract(&entry.name, e))?;

    let mut file = File::create(target).map_err(|e| Error::extract(&entry.name, e))?;
    let copied = if exact {
        io::copy(&mut reader.take(entry.size), &mut file)
    } else {
        io::copy(reader, &mut file)
    }
    .map_err(|e| Error::extract(&entry.name, e))?;
    drop(file);

    if exact && copied != entry.size {
        return Err(Error::extract(
            &entry.name,
            io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("copied {copied} of {} declared bytes", entry.size),
            ),
        ));
    }

    apply_metadata(entry, target, options);
    debug!(entry = %entry.name, target = %target.display(), bytes = copied, "extracted file");
    Ok(copied)
}

/// Best-effort mode and mtime; failures become warnings.
pub(crate) fn apply_metadata(entry: &EntryDescriptor, target: &Path, options: &UnpackOptions) {
    if options.preserve_permissions {
        if let Some(mode) = entry.mode {
            if let Err(source) = set_mode(target, mode) {
                options.warn(Warning::Permissions {
                    path: target.to_path_buf(),
                    source,
                });
            }
        }
    }

    if options.preserve_mtime {
        if let Some(mtime) = entry.mtime {
            let mtime = FileTime::from_unix_time(mtime, 0);
            if let Err(source) = filetime::set_file_times(target, FileTime::now(), mtime) {
                options.warn(Warning::Timestamps {
                    path: target.to_path_buf(),
                    source,
                });
            }
        }
    }
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> io::Result<()> { Ok(()) }
