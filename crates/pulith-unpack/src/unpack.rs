use std::fs::{self, File};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::codec;
use crate::error::{Error, Result};
use crate::extract::{self, create_dir};
use crate::format::{self, Compression, FormatTag, TAR_MAGIC_OFFSET};
use crate::options::UnpackOptions;
use crate::peek::PeekReader;

/// File name used when the payload is not a recognized archive.
pub const UNKNOWN_PACK: &str = "unknown-pack";

/// Format-sniffing extraction pipeline.
///
/// Detects an optional compression layer, then an archive layer, and
/// dispatches to the matching extractor. Payloads that are not archives are
/// written verbatim as [`UNKNOWN_PACK`].
#[derive(Clone, Debug, Default)]
pub struct Unpacker {
    options: UnpackOptions,
}

impl Unpacker {
    pub fn new(options: UnpackOptions) -> Self { Self { options } }

    /// Unpack the file at `path`. See [`Unpacker::unpack`].
    pub fn unpack_path(&self, path: impl AsRef<Path>, dest: Option<&Path>) -> Result<PathBuf> {
        let path = path.as_ref();
        let metadata = fs::metadata(path).map_err(|e| {
            Error::InvalidInput(format!("cannot open '{}': {e}", path.display()))
        })?;
        if !metadata.is_file() {
            return Err(Error::InvalidInput(format!(
                "'{}' is not a regular file",
                path.display()
            )));
        }
        let mut file = File::open(path)?;
        self.unpack(&mut file, dest)
    }

    /// Unpack an open file from its current position.
    ///
    /// Without a destination (or with an empty one) a fresh temporary
    /// directory is created and handed to the caller. If extraction fails
    /// before anything is known about the output, that directory is removed
    /// again; a TAR failure keeps it and reports it via
    /// [`Error::partial_root`]. ZIP files are read through the seekable handle
    /// instead of being buffered.
    pub fn unpack(&self, file: &mut File, dest: Option<&Path>) -> Result<PathBuf> {
        let (dest, temporary) = self.prepare_destination(dest)?;
        let result = self.unpack_file(file, &dest);
        if let (true, Err(err)) = (temporary, &result) {
            discard_temporary(&dest, err);
        }
        result
    }

    /// Unpack a stream into `dest`, which is created if missing.
    ///
    /// ZIP payloads are buffered in memory first.
    pub fn unpack_stream<R: Read>(&self, reader: R, dest: &Path) -> Result<PathBuf> {
        self.unpack_peekable(PeekReader::new(reader), dest)
    }

    pub fn untar<R: Read>(&self, reader: R, dest: &Path) -> Result<PathBuf> {
        extract::untar(reader, dest, &self.options)
    }

    pub fn unzip(&self, file: &File, dest: &Path) -> Result<PathBuf> {
        extract::unzip(file, dest, &self.options)
    }

    pub fn unzip_stream<R: Read>(&self, reader: R, dest: &Path) -> Result<PathBuf> {
        extract::unzip_stream(reader, dest, &self.options)
    }

    fn unpack_file(&self, file: &mut File, dest: &Path) -> Result<PathBuf> {
        let start = file.stream_position()?;
        let mut reader = PeekReader::new(&mut *file);
        match format::detect(&mut reader, 0)? {
            FormatTag::Zip => {
                drop(reader);
                file.seek(SeekFrom::Start(start))?;
                extract::unzip(file, dest, &self.options)
            }
            FormatTag::Gzip | FormatTag::Bzip2 | FormatTag::Xz | FormatTag::Tar | FormatTag::Unknown => {
                self.unpack_peekable(reader, dest)
            }
        }
    }

    fn unpack_peekable<R: Read>(&self, mut reader: PeekReader<R>, dest: &Path) -> Result<PathBuf> {
        let outer = format::detect(&mut reader, 0)?;
        debug!(format = %outer, dest = %dest.display(), "unpacking stream");

        match outer {
            FormatTag::Zip => extract::unzip_stream(reader, dest, &self.options),
            FormatTag::Gzip => self.unpack_layer(codec::wrap(reader, Compression::Gzip)?, dest),
            FormatTag::Bzip2 => self.unpack_layer(codec::wrap(reader, Compression::Bzip2)?, dest),
            FormatTag::Xz => self.unpack_layer(codec::wrap(reader, Compression::Xz)?, dest),
            FormatTag::Tar | FormatTag::Unknown => self.unpack_layer(reader, dest),
        }
    }

    /// Archive layer: TAR, or the verbatim fallback.
    fn unpack_layer<R: Read>(&self, mut reader: PeekReader<R>, dest: &Path) -> Result<PathBuf> {
        match format::detect(&mut reader, TAR_MAGIC_OFFSET)? {
            FormatTag::Tar => extract::untar(reader, dest, &self.options),
            FormatTag::Unknown | FormatTag::Zip | FormatTag::Gzip | FormatTag::Bzip2 | FormatTag::Xz => {
                self.write_verbatim(reader, dest)
            }
        }
    }

    fn write_verbatim<R: Read>(&self, mut reader: PeekReader<R>, dest: &Path) -> Result<PathBuf> {
        create_dir(dest, self.options.dir_mode)?;
        let target = dest.join(UNKNOWN_PACK);

        let mut file = File::create(&target).map_err(|e| Error::extract(UNKNOWN_PACK, e))?;
        let copied = io::copy(&mut reader, &mut file).map_err(|e| Error::extract(UNKNOWN_PACK, e))?;
        drop(file);

        debug!(target = %target.display(), bytes = copied, "wrote unrecognized payload verbatim");
        Ok(dest.to_path_buf())
    }

    /// Returns the destination and whether it is a temporary directory.
    fn prepare_destination(&self, dest: Option<&Path>) -> Result<(PathBuf, bool)> {
        match dest {
            Some(dest) if !dest.as_os_str().is_empty() => {
                create_dir(dest, self.options.dir_mode)?;
                Ok((dest.to_path_buf(), false))
            }
            _ => {
                let temp_dir = tempfile::Builder::new()
                    .prefix(self.options.temp_prefix)
                    .tempdir()?
                    .keep();
                debug!(dest = %temp_dir.display(), "created temporary destination");
                Ok((temp_dir, true))
            }
        }
    }
}

fn discard_temporary(dest: &Path, err: &Error) {
    if err.partial_root().is_some() {
        return;
    }
    match fs::remove_dir_all(dest) {
        Ok(()) => debug!(dest = %dest.display(), "removed temporary destination after failure"),
        Err(e) => warn!(dest = %dest.display(), error = %e, "failed to remove temporary destination"),
    }
}

/// Unpack the file at `path` with default options.
pub fn unpack_path(path: impl AsRef<Path>, dest: Option<&Path>) -> Result<PathBuf> {
    Unpacker::default().unpack_path(path, dest)
}

/// Unpack an open file with default options.
pub fn unpack(file: &mut File, dest: Option<&Path>) -> Result<PathBuf> {
    Unpacker::default().unpack(file, dest)
}

/// Unpack a stream with default options.
pub fn unpack_stream<R: Read>(reader: R, dest: &Path) -> Result<PathBuf> {
    Unpacker::default().unpack_stream(reader, dest)
}
