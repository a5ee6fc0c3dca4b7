use std::io;
use std::path::{Path, PathBuf};

use crate::format::Compression;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("failed to read stream: {0}")]
    Read(#[source] io::Error),

    #[error("failed to initialize {kind} decoder: {source}")]
    DecodeInit { kind: Compression, source: io::Error },

    #[error("{0} support is not compiled in")]
    UnsupportedCompression(Compression),

    #[error("unreadable zip archive: {source}")]
    Archive {
        #[from]
        source: zip::result::ZipError,
    },

    #[error("failed to extract '{entry}': {source}")]
    Extract { entry: String, source: io::Error },

    #[error("extraction into '{}' stopped: {source}", .root.display())]
    Partial { root: PathBuf, source: Box<Error> },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    pub(crate) fn extract(entry: impl Into<String>, source: io::Error) -> Self {
        Self::Extract {
            entry: entry.into(),
            source,
        }
    }

    pub(crate) fn partial(self, root: PathBuf) -> Self {
        match self {
            Self::Partial { source, .. } => Self::Partial { root, source },
            other => Self::Partial {
                root,
                source: Box::new(other),
            },
        }
    }

    /// Root directory reached before a TAR extraction failed, if any.
    pub fn partial_root(&self) -> Option<&Path> {
        match self {
            Self::Partial { root, .. } => Some(root),
            _ => None,
        }
    }

    /// Declared name of the entry that failed, if the failure was entry-specific.
    pub fn entry(&self) -> Option<&str> {
        match self {
            Self::Extract { entry, .. } => Some(entry),
            Self::Partial { source, .. } => source.entry(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
