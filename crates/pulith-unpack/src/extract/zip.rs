use std::fs::File;
use std::io::{self, Cursor, Read, Seek};
use std::path::{Path, PathBuf};

use tracing::debug;
use zip::extra_fields::ExtraField;

use super::{create_dir, write_dir, write_file};
use crate::entry::EntryDescriptor;
use crate::error::{Error, Result};
use crate::options::UnpackOptions;

/// Unpack a ZIP file through its seekable handle; nothing is buffered.
pub fn unzip(file: &File, dest: &Path, options: &UnpackOptions) -> Result<PathBuf> {
    unzip_seekable(file, dest, options)
}

/// Unpack a ZIP stream.
///
/// The central directory sits at the end of the archive, so the whole
/// stream is read into memory before extraction starts.
pub fn unzip_stream<R: Read>(mut reader: R, dest: &Path, options: &UnpackOptions) -> Result<PathBuf> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data).map_err(Error::Read)?;
    debug!(bytes = data.len(), "buffered zip stream");
    unzip_seekable(Cursor::new(data), dest, options)
}

/// Unpack a ZIP archive from any seekable source, in central directory order.
pub fn unzip_seekable<R: Read + Seek>(reader: R, dest: &Path, options: &UnpackOptions) -> Result<PathBuf> {
    create_dir(dest, options.dir_mode)?;
    let mut archive = zip::ZipArchive::new(reader)?;

    for index in 0..archive.len() {
        let mut file = archive
            .by_index(index)
            .map_err(|e| Error::extract(format!("entry #{index}"), io::Error::from(e)))?;
        let modified = extended_mtime(file.extra_data_fields())
            .or_else(|| file.last_modified().and_then(to_unix_seconds));

        let descriptor = EntryDescriptor {
            name: file.name().to_string(),
            size: file.size(),
            mode: None,
            mtime: modified,
            is_dir: file.is_dir(),
        }
        .with_mode(file.unix_mode());

        let target = descriptor.target(dest, options.strip_volume_prefix);
        if descriptor.is_dir {
            write_dir(&descriptor, &target, options)?;
        } else {
            write_file(&descriptor, &target, &mut file, true, options)?;
        }
    }

    debug!(entries = archive.len(), dest = %dest.display(), "unpacked zip archive");
    Ok(dest.to_path_buf())
}

/// Unix mtime from an Info-ZIP extended timestamp field (0x5455), if any.
fn extended_mtime<'a>(mut fields: impl Iterator<Item = &'a ExtraField>) -> Option<i64> {
    fields.find_map(|field| match field {
        ExtraField::ExtendedTimestamp(stamp) => stamp.mod_time().map(i64::from),
        _ => None,
    })
}

/// MS-DOS timestamps carry no zone; they are read as UTC.
fn to_unix_seconds(stamp: zip::DateTime) -> Option<i64> {
    let date = chrono::NaiveDate::from_ymd_opt(
        i32::from(stamp.year()),
        u32::from(stamp.month()),
        u32::from(stamp.day()),
    )?;
    let time = date.and_hms_opt(
        u32::from(stamp.hour()),
        u32::from(stamp.minute()),
        u32::from(stamp.second()),
    )?;
    Some(time.and_utc().timestamp())
}
