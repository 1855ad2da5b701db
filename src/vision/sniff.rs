// Image MIME sniffing from magic bytes
// Author: kelexine (https://github.com/kelexine)

use super::models::ImageFormat;

/// MIME type used when neither the bytes nor the fallback say anything useful.
pub const DEFAULT_MIME: &str = "image/png";

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";
const JPEG_SOI: &[u8] = b"\xFF\xD8\xFF";

const HEIC_BRANDS: [&[u8]; 6] = [b"heic", b"heix", b"hevc", b"hevx", b"heim", b"heis"];
const HEIF_BRANDS: [&[u8]; 2] = [b"mif1", b"msf1"];

/// Classify an image by its leading bytes.
///
/// Leading ASCII whitespace is ignored (it only matters for SVG/XML text).
/// Signatures are checked in a fixed order and the first match wins.
pub fn detect_format(data: &[u8]) -> Option<ImageFormat> {
    let start = data
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(data.len());
    let data = &data[start..];

    if data.starts_with(PNG_SIGNATURE) {
        Some(ImageFormat::Png)
    } else if data.starts_with(JPEG_SOI) {
        Some(ImageFormat::Jpeg)
    } else if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        Some(ImageFormat::Gif)
    } else if data.starts_with(b"BM") {
        Some(ImageFormat::Bmp)
    } else if data.starts_with(b"II*\0") || data.starts_with(b"MM\0*") {
        Some(ImageFormat::Tiff)
    } else if is_webp(data) {
        Some(ImageFormat::WebP)
    } else if starts_with_ignore_case(data, b"<svg") || starts_with_ignore_case(data, b"<?xml") {
        Some(ImageFormat::Svg)
    } else {
        detect_iso_bmff(data)
    }
}

/// Sniff the MIME type of `data`.
///
/// Never fails: with no recognised signature the `fallback` is used if it is
/// a well-formed `image/*` type, otherwise [`DEFAULT_MIME`].
pub fn sniff(data: &[u8], fallback: &str) -> String {
    if let Some(format) = detect_format(data) {
        return format.mime_type().to_string();
    }

    normalize_image_mime(fallback).unwrap_or_else(|| DEFAULT_MIME.to_string())
}

/// Narrow check used to recognise bytes that are unmistakably an image
/// (PNG, JPEG, WEBP, GIF) after an extra base64 decode.
pub fn has_image_magic(data: &[u8]) -> bool {
    data.starts_with(PNG_SIGNATURE)
        || data.starts_with(JPEG_SOI)
        || is_webp(data)
        || data.starts_with(b"GIF87a")
        || data.starts_with(b"GIF89a")
}

/// Lowercase an `image/<subtype>` string and drop parameters.
///
/// Returns `None` for anything that is not an image type.
pub fn normalize_image_mime(mime: &str) -> Option<String> {
    let essence = mime.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
    let subtype = essence.strip_prefix("image/")?;

    let valid = !subtype.is_empty()
        && subtype
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));

    valid.then_some(essence)
}

fn is_webp(data: &[u8]) -> bool {
    data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP"
}

// HEIC/HEIF live in an ISO-BMFF container: [size:4]["ftyp"][brand:4]
fn detect_iso_bmff(data: &[u8]) -> Option<ImageFormat> {
    if data.len() < 12 || &data[4..8] != b"ftyp" {
        return None;
    }
    let brand = &data[8..12];
    if HEIC_BRANDS.contains(&brand) {
        Some(ImageFormat::Heic)
    } else if HEIF_BRANDS.contains(&brand) {
        Some(ImageFormat::Heif)
    } else {
        None
    }
}

fn starts_with_ignore_case(data: &[u8], prefix: &[u8]) -> bool {
    data.len() >= prefix.len() && data[..prefix.len()].eq_ignore_ascii_case(prefix)
}
