use std::io;
use std::path::PathBuf;

/// Non-fatal problem encountered while extracting.
#[derive(Debug, thiserror::Error)]
pub enum Warning {
    #[error("failed setting file permissions for '{}': {source}", .path.display())]
    Permissions { path: PathBuf, source: io::Error },

    #[error("failed setting file atime and mtime for '{}': {source}", .path.display())]
    Timestamps { path: PathBuf, source: io::Error },

    #[error("skipped '{entry}': {reason}")]
    SkippedEntry { entry: String, reason: &'static str },
}

/// Sink for best-effort warnings raised during extraction.
pub trait Diagnostics: Send + Sync {
    fn warn(&self, warning: &Warning);
}

/// Forwards warnings to `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn warn(&self, warning: &Warning) { tracing::warn!("{warning}") }
}

impl<F> Diagnostics for F
where
    F: Fn(&Warning) + Send + Sync,
{
    fn warn(&self, warning: &Warning) { self(warning) }
}
