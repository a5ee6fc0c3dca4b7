//! Decompression layer.
//!
//! Each codec is a black box with a streaming `Read` interface; this module
//! only picks the right one and validates its header before handing it out.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};

use tracing::debug;

use crate::error::{Error, Result};
use crate::format::Compression;
use crate::peek::PeekReader;

/// Decoder wrapper over the supported compression codecs.
pub enum Decoder<R: Read> {
    Gzip(Box<flate2::read::MultiGzDecoder<R>>),
    #[cfg(feature = "bzip2")]
    Bzip2(Box<bzip2::read::MultiBzDecoder<R>>),
    #[cfg(feature = "xz")]
    Xz(Box<xz2::read::XzDecoder<R>>),
}

impl<R: Read> Decoder<R> {
    pub fn kind(&self) -> Compression {
        match self {
            Self::Gzip(_) => Compression::Gzip,
            #[cfg(feature = "bzip2")]
            Self::Bzip2(_) => Compression::Bzip2,
            #[cfg(feature = "xz")]
            Self::Xz(_) => Compression::Xz,
        }
    }
}

impl<R: Read> Read for Decoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self {
            Self::Gzip(d) => d.read(buf),
            #[cfg(feature = "bzip2")]
            Self::Bzip2(d) => d.read(buf),
            #[cfg(feature = "xz")]
            Self::Xz(d) => d.read(buf),
        }
    }
}

impl Compression {
    /// Create a lazy decoder for this codec. No bytes are read yet.
    pub fn decoder<R: Read>(self, reader: R) -> Result<Decoder<R>> {
        match self {
            Self::Gzip => Ok(Decoder::Gzip(Box::new(
                flate2::read::MultiGzDecoder::new(reader),
            ))),
            #[cfg(feature = "bzip2")]
            Self::Bzip2 => Ok(Decoder::Bzip2(Box::new(
                bzip2::read::MultiBzDecoder::new(reader),
            ))),
            #[cfg(not(feature = "bzip2"))]
            Self::Bzip2 => Err(Error::UnsupportedCompression(self)),
            #[cfg(feature = "xz")]
            Self::Xz => Ok(Decoder::Xz(Box::new(
                xz2::read::XzDecoder::new_multi_decoder(reader),
            ))),
            #[cfg(not(feature = "xz"))]
            Self::Xz => Err(Error::UnsupportedCompression(self)),
        }
    }
}

/// Wrap `reader` in the decoder for `kind`.
///
/// The first decoded block is pulled eagerly so a corrupt header surfaces
/// here as [`Error::DecodeInit`] rather than on some later read.
pub fn wrap<R: Read>(reader: R, kind: Compression) -> Result<PeekReader<Decoder<R>>> {
    let mut decoded = PeekReader::new(kind.decoder(reader)?);
    let primed = decoded
        .fill_buf()
        .map_err(|source| Error::DecodeInit { kind, source })?
        .len();
    debug!(%kind, primed, "opened decompression layer");
    Ok(decoded)
}

pub type FileStream<R = BufReader<File>> = PeekReader<Decoder<R>>;

/// Decompress a gzip file.
pub fn gunzip(file: File) -> Result<FileStream> { gunzip_stream(BufReader::new(file)) }

/// Decompress a gzip stream.
pub fn gunzip_stream<R: Read>(reader: R) -> Result<FileStream<R>> {
    wrap(reader, Compression::Gzip)
}

/// Decompress a bzip2 file.
pub fn bunzip2(file: File) -> Result<FileStream> { bunzip2_stream(BufReader::new(file)) }

/// Decompress a bzip2 stream.
pub fn bunzip2_stream<R: Read>(reader: R) -> Result<FileStream<R>> {
    wrap(reader, Compression::Bzip2)
}

/// Decompress an xz file.
pub fn unxz(file: File) -> Result<FileStream> { unxz_stream(BufReader::new(file)) }

/// Decompress an xz stream.
pub fn unxz_stream<R: Read>(reader: R) -> Result<FileStream<R>> { wrap(reader, Compression::Xz) }

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder =
            flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn gzip_round_trip() {
        let mut stream = gunzip_stream(Cursor::new(gzip(b"hello gzip"))).unwrap();
        assert_eq!(stream.get_ref().kind(), Compression::Gzip);
        let mut out = String::new();
        stream.read_to_string(&mut out).unwrap();
        assert_eq!(out, "hello gzip");
    }

    #[test]
    fn gzip_concatenated_members() {
        let mut data = gzip(b"first ");
        data.extend(gzip(b"second"));
        let mut out = String::new();
        gunzip_stream(Cursor::new(data))
            .unwrap()
            .read_to_string(&mut out)
            .unwrap();
        assert_eq!(out, "first second");
    }

    #[test]
    fn gzip_corrupt_header_fails_on_wrap() {
        let data = vec![0x1F, 0x8B, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
        let err = gunzip_stream(Cursor::new(data)).err().unwrap();
        assert!(matches!(err, Error::DecodeInit { kind: Compression::Gzip, .. }));
    }

    #[cfg(feature = "bzip2")]
    #[test]
    fn bzip2_round_trip() {
        let mut encoder =
            bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::default());
        encoder.write_all(b"hello bzip2").unwrap();
        let data = encoder.finish().unwrap();

        let mut out = String::new();
        bunzip2_stream(Cursor::new(data))
            .unwrap()
            .read_to_string(&mut out)
            .unwrap();
        assert_eq!(out, "hello bzip2");
    }

    #[cfg(feature = "bzip2")]
    #[test]
    fn bzip2_corrupt_header_fails_on_wrap() {
        let data = b"BZx9 definitely not bzip2".to_vec();
        let err = bunzip2_stream(Cursor::new(data)).err().unwrap();
        assert!(matches!(err, Error::DecodeInit { kind: Compression::Bzip2, .. }));
    }

    #[cfg(feature = "xz")]
    #[test]
    fn xz_round_trip() {
        let mut encoder = xz2::write::XzEncoder::new(Vec::new(), 6);
        encoder.write_all(b"hello xz").unwrap();
        let data = encoder.finish().unwrap();

        let mut out = String::new();
        unxz_stream(Cursor::new(data))
            .unwrap()
            .read_to_string(&mut out)
            .unwrap();
        assert_eq!(out, "hello xz");
    }

    #[cfg(feature = "xz")]
    #[test]
    fn xz_corrupt_header_fails_on_wrap() {
        let mut data = vec![0xFD, 0x37, 0x7A, 0x58, 0x5A, 0x00];
        data.extend_from_slice(&[0xAB; 32]);
        let err = unxz_stream(Cursor::new(data)).err().unwrap();
        assert!(matches!(err, Error::DecodeInit { kind: Compression::Xz, .. }));
    }

    #[test]
    fn empty_gzip_payload_is_not_an_error() {
        let mut stream = gunzip_stream(Cursor::new(gzip(b""))).unwrap();
        let mut out = Vec::new();
        stream.read_to_end(&mut out).unwrap();
        assert!(out.is_empty());
    }
}
