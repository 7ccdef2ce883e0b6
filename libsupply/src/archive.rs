//! Extraction of dependency archives.
//!
//! Dependencies are distributed either as gzipped tarballs or as zip files. The format is
//! detected from the leading magic bytes rather than the file name, since downloaded files are
//! stored under names chosen by the caller.

use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io::{self, Read, Seek};
use std::path::Path;
use tar::Archive;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ArchiveFormat {
    TarGz,
    Zip,
}

#[derive(thiserror::Error, Debug)]
pub enum ArchiveError {
    #[error("I/O error while extracting archive: {0}")]
    IoError(#[from] io::Error),

    #[error("Invalid zip archive: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("Unsupported archive format, expected a gzipped tarball or a zip file")]
    UnsupportedFormat,
}

/// Extracts the archive at `archive_path` into `destination`, creating it if necessary.
///
/// Existing files in `destination` are overwritten by files from the archive.
pub fn extract(
    archive_path: impl AsRef<Path>,
    destination: impl AsRef<Path>,
) -> Result<ArchiveFormat, ArchiveError> {
    let mut file = File::open(archive_path.as_ref())?;
    let format = detect_format(&mut file)?;

    fs::create_dir_all(destination.as_ref())?;

    match format {
        ArchiveFormat::TarGz => decompress_tarball(&mut file, destination)?,
        ArchiveFormat::Zip => unzip(&mut file, destination)?,
    }

    Ok(format)
}

// Decompresses and untars a given .tar.gz file to the given directory.
fn decompress_tarball(
    tarball: &mut File,
    destination: impl AsRef<Path>,
) -> Result<(), io::Error> {
    tarball.rewind()?;
    let mut archive = Archive::new(GzDecoder::new(tarball));
    archive.unpack(destination)
}

// Extracts a given .zip file to the given directory.
fn unzip(
    zip_file: &mut File,
    destination: impl AsRef<Path>,
) -> Result<(), zip::result::ZipError> {
    zip_file.rewind()?;
    zip::ZipArchive::new(zip_file)?.extract(destination)
}

fn detect_format(file: &mut File) -> Result<ArchiveFormat, ArchiveError> {
    let mut magic = Vec::with_capacity(4);
    file.by_ref().take(4).read_to_end(&mut magic)?;

    match magic.as_slice() {
        [0x1f, 0x8b, ..] => Ok(ArchiveFormat::TarGz),
        [b'P', b'K', 0x03, 0x04] | [b'P', b'K', 0x05, 0x06] => Ok(ArchiveFormat::Zip),
        _ => Err(ArchiveError::UnsupportedFormat),
    }
}
