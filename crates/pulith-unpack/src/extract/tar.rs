use std::io::Read;
use std::path::{Path, PathBuf};

use tar::EntryType;
use tracing::debug;

use super::{create_dir, write_dir, write_file};
use crate::diagnostics::Warning;
use crate::entry::EntryDescriptor;
use crate::error::{Error, Result};
use crate::options::UnpackOptions;

/// Name git gives the global pax header carrying the commit id.
const PAX_GLOBAL_HEADER: &str = "pax_global_header";

/// Which top-level directory the archive unpacked into, if exactly one.
///
/// Threaded through the entry loop: the first top-level directory entry
/// names the candidate, and any entry outside it makes the archive
/// multi-root, which resolves to the destination itself.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Root {
    Pending,
    Single { name: String, declared: bool },
    Multiple,
}

impl Root {
    fn observe(&self, sanitized: &str, is_dir: bool) -> Self {
        if sanitized == "." {
            return self.clone();
        }
        let (top, nested) = match sanitized.split_once('/') {
            Some((top, _)) => (top, true),
            None => (sanitized, false),
        };
        let declares_top = is_dir && !nested;

        match self {
            Self::Pending => Self::Single {
                name: top.to_string(),
                declared: declares_top,
            },
            Self::Single { name, declared } if name == top => Self::Single {
                name: name.clone(),
                declared: *declared || declares_top,
            },
            Self::Single { .. } | Self::Multiple => Self::Multiple,
        }
    }

    fn resolve(&self, dest: &Path) -> PathBuf {
        match self {
            Self::Single {
                name,
                declared: true,
            } => dest.join(name),
            _ => dest.to_path_buf(),
        }
    }
}

/// Unpack a TAR stream into `dest`.
///
/// Returns the single top-level directory the archive unpacked into, or
/// `dest` for archives with several top-level entries or no directory
/// entries. On failure the error is [`Error::Partial`] carrying the root
/// known so far; entries already written stay on disk.
pub fn untar<R: Read>(reader: R, dest: &Path, options: &UnpackOptions) -> Result<PathBuf> {
    create_dir(dest, options.dir_mode).map_err(|e| Error::from(e).partial(dest.to_path_buf()))?;

    let mut archive = tar::Archive::new(reader);
    let entries = archive
        .entries()
        .map_err(|e| Error::extract("archive header", e).partial(dest.to_path_buf()))?;

    let mut root = Root::Pending;
    for (index, entry) in entries.enumerate() {
        let mut entry = entry.map_err(|e| {
            Error::extract(format!("header of entry #{index}"), e).partial(root.resolve(dest))
        })?;
        root = untar_entry(&root, &mut entry, dest, options)
            .map_err(|e| e.partial(root.resolve(dest)))?;
    }

    let root = root.resolve(dest);
    debug!(root = %root.display(), "unpacked tar archive");
    Ok(root)
}

fn untar_entry<R: Read>(
    root: &Root,
    entry: &mut tar::Entry<'_, R>,
    dest: &Path,
    options: &UnpackOptions,
) -> Result<Root> {
    let name = String::from_utf8_lossy(&entry.path_bytes()).into_owned();
    let header = entry.header();
    let kind = header.entry_type();

    if name == PAX_GLOBAL_HEADER || kind.is_pax_global_extensions() {
        debug!(entry = %name, "skipping global pax header");
        return Ok(root.clone());
    }

    let descriptor = EntryDescriptor {
        name,
        size: entry.size(),
        mode: None,
        mtime: header.mtime().ok().and_then(|t| i64::try_from(t).ok()),
        is_dir: kind.is_dir(),
    }
    .with_mode(header.mode().ok());

    let sanitized = descriptor.sanitized_name(options.strip_volume_prefix);
    let target = dest.join(&sanitized);

    if descriptor.is_dir {
        write_dir(&descriptor, &target, options)?;
        return Ok(root.observe(&sanitized, true));
    }

    if !(kind.is_file() || kind == EntryType::Continuous) {
        options.warn(Warning::SkippedEntry {
            entry: descriptor.name,
            reason: skip_reason(kind),
        });
        return Ok(root.clone());
    }

    write_file(&descriptor, &target, entry, false, options)?;
    Ok(root.observe(&sanitized, false))
}

fn skip_reason(kind: EntryType) -> &'static str {
    match kind {
        EntryType::Symlink => "symbolic links are not extracted",
        EntryType::Link => "hard links are not extracted",
        EntryType::Char | EntryType::Block => "device nodes are not extracted",
        EntryType::Fifo => "fifos are not extracted",
        _ => "unsupported entry type",
    }
}
