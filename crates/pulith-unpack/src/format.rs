use std::fmt;
use std::io::Read;

use tracing::debug;

use crate::error::{Error, Result};
use crate::peek::PeekReader;

/// Byte offset of the `ustar` magic inside a TAR header block.
pub const TAR_MAGIC_OFFSET: usize = 257;

/// Number of bytes compared at the sniffing offset.
pub const SNIFF_WINDOW: usize = 6;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FormatTag {
    #[default]
    Unknown,
    Zip,
    Gzip,
    Bzip2,
    Xz,
    Tar,
}

impl fmt::Display for FormatTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unknown => "unknown",
            Self::Zip => "zip",
            Self::Gzip => "gzip",
            Self::Bzip2 => "bzip2",
            Self::Xz => "xz",
            Self::Tar => "tar",
        })
    }
}

/// Single-stream compression codec wrapped around an archive or a raw payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Compression {
    Gzip,
    Bzip2,
    Xz,
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Gzip => "gzip",
            Self::Bzip2 => "bzip2",
            Self::Xz => "xz",
        })
    }
}

/// Classify a window of bytes taken at the sniffing offset.
///
/// Precedence is TAR, ZIP, GZIP, BZIP2, XZ; anything else is `Unknown`.
pub fn detect_bytes(window: &[u8]) -> FormatTag {
    match window {
        [0x75, 0x73, 0x74, 0x61, 0x72, ..] => FormatTag::Tar,
        [0x50, 0x4B, 0x03, 0x04, ..] => FormatTag::Zip,
        [0x1F, 0x8B, ..] => FormatTag::Gzip,
        [0x42, 0x5A, ..] => FormatTag::Bzip2,
        [0xFD, 0x37, 0x7A, 0x58, 0x5A, 0x00, ..] => FormatTag::Xz,
        _ => FormatTag::Unknown,
    }
}

/// Sniff the format of `reader` at `offset` without advancing it.
///
/// Needs `offset + SNIFF_WINDOW` bytes; a shorter stream is a read error,
/// while an unrecognized window is `FormatTag::Unknown`.
pub fn detect<R: Read>(reader: &mut PeekReader<R>, offset: usize) -> Result<FormatTag> {
    let header = reader.peek(offset + SNIFF_WINDOW).map_err(Error::Read)?;
    let tag = detect_bytes(&header[offset..]);
    debug!(offset, %tag, "sniffed stream");
    Ok(tag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Cursor};

    use quickcheck_macros::quickcheck;

    fn tar_block() -> Vec<u8> {
        let mut block = vec![0u8; 512];
        block[..8].copy_from_slice(b"file.txt");
        block[TAR_MAGIC_OFFSET..TAR_MAGIC_OFFSET + 6].copy_from_slice(b"ustar\0");
        block
    }

    #[test]
    fn detect_zip_format() {
        let zip_header = [0x50, 0x4B, 0x03, 0x04, 0x14, 0x00, 0x00, 0x00];
        assert_eq!(detect_bytes(&zip_header), FormatTag::Zip);
    }

    #[test]
    fn detect_gzip_format() {
        let gz_header = [0x1F, 0x8B, 0x08, 0x00, 0x00, 0x00];
        assert_eq!(detect_bytes(&gz_header), FormatTag::Gzip);
    }

    #[test]
    fn detect_bzip2_format() {
        assert_eq!(detect_bytes(b"BZh91AY"), FormatTag::Bzip2);
    }

    #[test]
    fn detect_xz_format() {
        let xz_header = [0xFD, 0x37, 0x7A, 0x58, 0x5A, 0x00, 0x00, 0x04];
        assert_eq!(detect_bytes(&xz_header), FormatTag::Xz);
    }

    #[test]
    fn detect_unknown_format() {
        let random_data = [0xDE, 0xAD, 0xBE, 0xEF, 0x00, 0x00];
        assert_eq!(detect_bytes(&random_data), FormatTag::Unknown);
    }

    #[test]
    fn detect_tar_at_header_offset() {
        let mut reader = PeekReader::new(Cursor::new(tar_block()));
        assert_eq!(detect(&mut reader, 0).unwrap(), FormatTag::Unknown);
        assert_eq!(detect(&mut reader, TAR_MAGIC_OFFSET).unwrap(), FormatTag::Tar);
    }

    #[test]
    fn detect_gzip_from_reader() {
        let mut data = vec![0x1F, 0x8B, 0x08, 0x00];
        data.resize(32, 0);
        let mut reader = PeekReader::new(Cursor::new(data));
        assert_eq!(detect(&mut reader, 0).unwrap(), FormatTag::Gzip);
    }

    #[test]
    fn detect_zip_from_reader() {
        let mut data = vec![0x50, 0x4B, 0x03, 0x04];
        data.resize(32, 0);
        let mut reader = PeekReader::new(Cursor::new(data));
        assert_eq!(detect(&mut reader, 0).unwrap(), FormatTag::Zip);
    }

    #[test]
    fn detect_short_stream_is_read_error() {
        let mut reader = PeekReader::new(Cursor::new(vec![0x1F, 0x8B]));
        let err = detect(&mut reader, 0).unwrap_err();
        assert!(matches!(err, Error::Read(ref e) if e.kind() == io::ErrorKind::UnexpectedEof));
    }

    #[test]
    fn detect_truncated_tar_header_is_read_error() {
        let mut reader = PeekReader::new(Cursor::new(vec![0u8; 260]));
        assert!(matches!(detect(&mut reader, TAR_MAGIC_OFFSET), Err(Error::Read(_))));
    }

    #[test]
    fn detect_leaves_stream_untouched() {
        let data = tar_block();
        let mut reader = PeekReader::new(Cursor::new(data.clone()));
        detect(&mut reader, TAR_MAGIC_OFFSET).unwrap();
        let mut rest = Vec::new();
        reader.read_to_end(&mut rest).unwrap();
        assert_eq!(rest, data);
    }

    #[quickcheck]
    fn detect_is_repeatable(data: Vec<u8>, offset: u8) -> bool {
        let offset = offset as usize;
        let mut reader = PeekReader::new(Cursor::new(data.clone()));
        let first = detect(&mut reader, offset).ok();
        let second = detect(&mut reader, offset).ok();

        let mut rest = Vec::new();
        reader.read_to_end(&mut rest).unwrap();
        first == second && rest == data
    }
}
