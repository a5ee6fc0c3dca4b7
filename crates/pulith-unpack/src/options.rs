use std::sync::Arc;

use crate::diagnostics::{Diagnostics, TracingDiagnostics, Warning};

/// Prefix of the temporary destination created when none is given.
pub const DEFAULT_TEMP_PREFIX: &str = "unpackit-";

/// Mode for directories created implicitly (destination root, missing parents).
pub const DEFAULT_DIR_MODE: u32 = 0o740;

#[derive(Clone)]
pub struct UnpackOptions {
    pub strip_volume_prefix:  bool,
    pub temp_prefix:          &'static str,
    pub dir_mode:             u32,
    pub preserve_permissions: bool,
    pub preserve_mtime:       bool,
    pub diagnostics:          Arc<dyn Diagnostics>,
}

impl Default for UnpackOptions {
    fn default() -> Self {
        Self {
            strip_volume_prefix:  true,
            temp_prefix:          DEFAULT_TEMP_PREFIX,
            dir_mode:             DEFAULT_DIR_MODE,
            preserve_permissions: true,
            preserve_mtime:       true,
            diagnostics:          Arc::new(TracingDiagnostics),
        }
    }
}

impl UnpackOptions {
    pub fn strip_volume_prefix(mut self, strip: bool) -> Self {
        self.strip_volume_prefix = strip;
        self
    }

    pub fn temp_prefix(mut self, prefix: &'static str) -> Self {
        self.temp_prefix = prefix;
        self
    }

    pub fn dir_mode(mut self, mode: u32) -> Self {
        self.dir_mode = mode;
        self
    }

    pub fn preserve_permissions(mut self, preserve: bool) -> Self {
        self.preserve_permissions = preserve;
        self
    }

    pub fn preserve_mtime(mut self, preserve: bool) -> Self {
        self.preserve_mtime = preserve;
        self
    }

    pub fn diagnostics(mut self, sink: Arc<dyn Diagnostics>) -> Self {
        self.diagnostics = sink;
        self
    }

    pub(crate) fn warn(&self, warning: Warning) { self.diagnostics.warn(&warning) }
}

impl std::fmt::Debug for UnpackOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnpackOptions")
            .field("strip_volume_prefix", &self.strip_volume_prefix)
            .field("temp_prefix", &self.temp_prefix)
            .field("dir_mode", &format_args!("{:o}", self.dir_mode))
            .field("preserve_permissions", &self.preserve_permissions)
            .field("preserve_mtime", &self.preserve_mtime)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn unpack_options_default() {
        let options = UnpackOptions::default();
        assert!(options.strip_volume_prefix);
        assert_eq!(options.temp_prefix, "unpackit-");
        assert_eq!(options.dir_mode, 0o740);
        assert!(options.preserve_permissions);
        assert!(options.preserve_mtime);
    }

    #[test]
    fn unpack_options_builder_pattern() {
        let options = UnpackOptions::default()
            .strip_volume_prefix(false)
            .temp_prefix("custom-")
            .dir_mode(0o700)
            .preserve_permissions(false)
            .preserve_mtime(false);

        assert!(!options.strip_volume_prefix);
        assert_eq!(options.temp_prefix, "custom-");
        assert_eq!(options.dir_mode, 0o700);
        assert!(!options.preserve_permissions);
        assert!(!options.preserve_mtime);
    }

    #[test]
    fn unpack_options_custom_diagnostics() {
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = Arc::clone(&counter);

        let options = UnpackOptions::default().diagnostics(Arc::new(move |_: &Warning| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        }));

        options.warn(Warning::SkippedEntry {
            entry: "dev/null".into(),
            reason: "device node",
        });
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn debug_prints_mode_in_octal() {
        let rendered = format!("{:?}", UnpackOptions::default());
        assert!(rendered.contains("dir_mode: 740"));
    }
}
