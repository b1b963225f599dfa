//! Launcher-image splicing for platforms without usable symlinks.
//!
//! The launcher executable embeds a marker byte sequence followed by a
//! null-terminated path buffer. Writing a default pointer means copying the
//! launcher image with the target path spliced into that buffer; reading
//! means finding the marker and reading back to the null.

use std::path::{Path, PathBuf};
use zigup_core::Error;

/// Marker preceding the embedded target-path buffer.
pub const MARKER: &[u8] = b"!!!THIS MARKS THE zig_exe_string MEMORY!!#";

/// Longest target path the buffer can hold.
pub const MAX_TARGET_LEN: usize = 4096;

/// Buffer size: the path plus its null terminator.
pub const TARGET_BUF_LEN: usize = MAX_TARGET_LEN + 1;

fn corrupt(detail: &str) -> Error {
    Error::parse(format!("launcher image is corrupt: {detail}"))
}

/// Offset of the path buffer: just past the unique marker.
///
/// Zero markers means the image is not a launcher; more than one means the
/// build embedded the marker twice and splicing would be ambiguous.
pub fn payload_offset(image: &[u8]) -> Result<usize, Error> {
    let mut offsets = Vec::new();
    let mut from = 0;
    while from + MARKER.len() <= image.len() {
        match image[from..]
            .windows(MARKER.len())
            .position(|w| w == MARKER)
        {
            Some(pos) => {
                offsets.push(from + pos + MARKER.len());
                from += pos + 1;
            }
            None => break,
        }
    }
    match offsets.as_slice() {
        [] => Err(corrupt("marker not found")),
        [offset] => Ok(*offset),
        _ => Err(corrupt("marker appears more than once")),
    }
}

/// Produce a copy of `image` with `target` spliced into the path buffer.
pub fn splice_target(image: &[u8], target: &Path) -> Result<Vec<u8>, Error> {
    let offset = payload_offset(image)?;
    if image.len() < offset + TARGET_BUF_LEN {
        return Err(corrupt("image truncated after marker"));
    }

    let target_str = target.to_str().ok_or_else(|| {
        Error::parse(format!("target path is not valid UTF-8: {}", target.display()))
    })?;
    let target_bytes = target_str.as_bytes();
    if target_bytes.len() > MAX_TARGET_LEN {
        return Err(Error::parse(format!(
            "target path longer than {} bytes: {}",
            MAX_TARGET_LEN,
            target.display()
        )));
    }

    let mut out = Vec::with_capacity(image.len());
    out.extend_from_slice(&image[..offset]);
    out.extend_from_slice(target_bytes);
    out.resize(offset + TARGET_BUF_LEN, 0);
    out.extend_from_slice(&image[offset + TARGET_BUF_LEN..]);
    Ok(out)
}

/// Read the spliced target path back out of a launcher image.
pub fn read_target(image: &[u8]) -> Result<PathBuf, Error> {
    let offset = payload_offset(image)?;
    let payload = image
        .get(offset..offset + TARGET_BUF_LEN)
        .ok_or_else(|| corrupt("payload shorter than the path buffer"))?;
    let nul = payload
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| corrupt("path buffer is not null-terminated"))?;
    let target = std::str::from_utf8(&payload[..nul])
        .map_err(|_| corrupt("target path is not valid UTF-8"))?;
    if target.is_empty() {
        return Err(corrupt("empty target path"));
    }
    Ok(PathBuf::from(target))
}

/// Build a synthetic launcher image, for tests and the pointer round-trip.
#[doc(hidden)]
pub fn synthetic_image(prefix: &[u8], suffix: &[u8]) -> Vec<u8> {
    let mut image = Vec::new();
    image.extend_from_slice(prefix);
    image.extend_from_slice(MARKER);
    image.resize(image.len() + TARGET_BUF_LEN, 0);
    image.extend_from_slice(suffix);
    image
}
