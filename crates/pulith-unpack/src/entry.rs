use std::path::{Path, PathBuf};

use crate::sanitize::sanitize_with;

/// Metadata of one archive member, as declared by the archive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryDescriptor {
    /// Raw declared path. Attacker controlled until sanitized.
    pub name:   String,
    pub size:   u64,
    pub mode:   Option<u32>,
    /// Modification time in seconds since the Unix epoch.
    pub mtime:  Option<i64>,
    pub is_dir: bool,
}

impl EntryDescriptor {
    pub fn file(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
            mode: None,
            mtime: None,
            is_dir: false,
        }
    }

    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            is_dir: true,
            ..Self::file(name, 0)
        }
    }

    pub fn with_mode(mut self, mode: Option<u32>) -> Self {
        self.mode = mode.map(|m| m & 0o7777);
        self
    }

    pub fn with_mtime(mut self, mtime: Option<i64>) -> Self {
        self.mtime = mtime;
        self
    }

    pub fn sanitized_name(&self, strip_volume_prefix: bool) -> String {
        sanitize_with(&self.name, strip_volume_prefix)
    }

    /// Location of this entry under `dest`.
    pub fn target(&self, dest: &Path, strip_volume_prefix: bool) -> PathBuf {
        dest.join(self.sanitized_name(strip_volume_prefix))
    }
}
