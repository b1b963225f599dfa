//! Archive extraction for compiler tarballs.
//!
//! The format is chosen by the URL basename suffix, never by sniffing
//! magic bytes: ziglang.org publishes `.tar.xz` everywhere except Windows,
//! which gets `.zip`.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tar::Archive;
use tracing::debug;
use xz2::read::XzDecoder;
use zigup_core::Error;

/// Supported archive formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    TarXz,
    Zip,
}

impl ArchiveKind {
    /// The suffix this kind strips from a basename.
    fn suffix(self) -> &'static str {
        match self {
            ArchiveKind::TarXz => ".tar.xz",
            ArchiveKind::Zip => ".zip",
        }
    }

    /// Classify an archive by its basename.
    pub fn from_basename(basename: &str) -> Result<Self, Error> {
        if basename.ends_with(".tar.xz") {
            Ok(ArchiveKind::TarXz)
        } else if basename.ends_with(".zip") {
            Ok(ArchiveKind::Zip)
        } else {
            Err(Error::UnknownArchiveExtension {
                basename: basename.to_string(),
            })
        }
    }
}

/// The final path segment of a URL.
pub fn url_basename(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}

/// The archive's internal top-level directory: the basename without its
/// archive extension.
pub fn archive_root_name(basename: &str, kind: ArchiveKind) -> &str {
    basename.strip_suffix(kind.suffix()).unwrap_or(basename)
}

/// Extract `archive` into `dest`.
///
/// Both extractors stream from a file opened by path, so the archive can be
/// deleted by path afterwards.
pub fn extract(archive: &Path, dest: &Path, kind: ArchiveKind) -> Result<(), Error> {
    debug!("Extracting {} to {}", archive.display(), dest.display());
    let file = File::open(archive)
        .map_err(|e| Error::io("failed to open archive", archive, e))?;

    match kind {
        ArchiveKind::TarXz => {
            let decoder = XzDecoder::new(BufReader::new(file));
            Archive::new(decoder)
                .unpack(dest)
                .map_err(|e| Error::io("failed to extract archive", archive, e))?;
        }
        ArchiveKind::Zip => {
            let mut zip = zip::ZipArchive::new(file)
                .map_err(|e| Error::parse_at(format!("not a zip archive: {e}"), archive))?;
            zip.extract(dest)
                .map_err(|e| Error::parse_at(format!("failed to extract zip: {e}"), archive))?;
        }
    }
    Ok(())
}
