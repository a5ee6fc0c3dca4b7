//! Format-sniffing archive extraction.
//!
//! A payload is classified by magic bytes, unwrapped from an optional gzip,
//! bzip2 or xz layer, and extracted as ZIP or TAR into a destination
//! directory. Anything that is not an archive is written verbatim.
//!
//! # Architecture
//!
//! - `peek.rs` - Buffered reader with non-consuming lookahead
//! - `format.rs` - Magic-byte detection
//! - `codec.rs` - Decompression adapters
//! - `sanitize.rs` - Entry name sanitization (zip-slip prevention)
//! - `extract/` - ZIP and TAR extractors
//! - `unpack.rs` - Detection pipeline
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! let root = pulith_unpack::unpack_path("tool.tar.gz", Some(Path::new("out")))?;
//! println!("unpacked into {}", root.display());
//! # Ok::<(), pulith_unpack::Error>(())
//! ```

pub use codec::{bunzip2, bunzip2_stream, gunzip, gunzip_stream, unxz, unxz_stream, Decoder, FileStream};
pub use diagnostics::{Diagnostics, TracingDiagnostics, Warning};
pub use entry::EntryDescriptor;
pub use error::{Error, Result};
pub use extract::{untar, unzip, unzip_seekable, unzip_stream};
pub use format::{detect, detect_bytes, Compression, FormatTag, SNIFF_WINDOW, TAR_MAGIC_OFFSET};
pub use options::{UnpackOptions, DEFAULT_DIR_MODE, DEFAULT_TEMP_PREFIX};
pub use peek::PeekReader;
pub use sanitize::{sanitize, sanitize_with};
pub use unpack::{unpack, unpack_path, unpack_stream, Unpacker, UNKNOWN_PACK};

pub mod codec;
mod diagnostics;
mod entry;
mod error;
mod extract;
pub mod format;
mod options;
mod peek;
mod sanitize;
mod unpack;
