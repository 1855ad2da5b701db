// Caller image normalization: data URLs / base64 -> bytes -> rasters
// Author: kelexine (https://github.com/kelexine)

use super::models::{
    validate_image_size, DecodeOutcome, DecodedRaster, NormalizedInput, RawImageBytes,
};
use super::sniff::{detect_format, sniff};
use crate::error::{RelayError, Result};
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use bytes::Bytes;
use image::{DynamicImage, ImageOutputFormat};
use std::io::Cursor;
use tracing::debug;

const LENIENT_CONFIG: GeneralPurposeConfig = GeneralPurposeConfig::new()
    .with_decode_padding_mode(DecodePaddingMode::Indifferent)
    .with_decode_allow_trailing_bits(true);

/// Standard alphabet, padding optional.
const LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT_CONFIG);

/// URL-safe alphabet, padding optional.
const LENIENT_URL_SAFE: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT_CONFIG);

const DATA_URL_SCHEME: &str = "data:";

/// Decode base64 ignoring embedded whitespace and missing padding.
///
/// The URL-safe alphabet is tried when the standard one fails; the error
/// reported is the one from the standard alphabet.
pub fn decode_base64_lenient(input: &[u8]) -> std::result::Result<Vec<u8>, base64::DecodeError> {
    let compact: Vec<u8> = input
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();

    LENIENT
        .decode(&compact)
        .or_else(|err| LENIENT_URL_SAFE.decode(&compact).map_err(|_| err))
}

/// Split a data URL into its claimed MIME type and payload.
///
/// Strings without the `data:` scheme are returned unchanged as payload.
pub fn split_data_url(input: &str) -> (Option<String>, &str) {
    let trimmed = input.trim_start();
    let is_data_url = trimmed
        .get(..DATA_URL_SCHEME.len())
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case(DATA_URL_SCHEME));

    if !is_data_url {
        return (None, input);
    }

    match trimmed.split_once(',') {
        Some((header, payload)) => {
            let mime = header[DATA_URL_SCHEME.len()..]
                .split(';')
                .next()
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(str::to_string);
            (mime, payload)
        }
        None => (None, input),
    }
}

/// Turn a caller-supplied data URL or bare base64 string into bytes.
///
/// Never fails. When the payload is not valid base64 the literal UTF-8 bytes
/// of the whole input are returned and the outcome says so; the downstream
/// sniff or raster decode is where such input gets rejected.
pub fn decode_to_bytes(input: &str) -> NormalizedInput {
    let (claimed_mime, payload) = split_data_url(input);

    match decode_base64_lenient(payload.as_bytes()) {
        Ok(bytes) => NormalizedInput {
            image: RawImageBytes::new(bytes, claimed_mime),
            outcome: DecodeOutcome::Decoded,
        },
        Err(e) => {
            debug!("Input is not valid base64 ({}), using literal bytes", e);
            NormalizedInput {
                image: RawImageBytes::new(input.as_bytes().to_vec(), claimed_mime),
                outcome: DecodeOutcome::LiteralFallback,
            }
        }
    }
}

/// Decode a caller image all the way to a raster.
///
/// Fails with [`RelayError::ImageDecode`] when the bytes are not a format the
/// raster decoder understands; callers recover by dropping the image.
pub fn decode_to_image(input: &str) -> Result<DecodedRaster> {
    let normalized = decode_to_bytes(input);
    let raw = normalized.image;

    validate_image_size(raw.bytes.len()).map_err(RelayError::ImageDecode)?;

    let format = image::guess_format(&raw.bytes)
        .map_err(|e| RelayError::ImageDecode(format!("Unrecognized image format: {}", e)))?;
    let image = image::load_from_memory_with_format(&raw.bytes, format)
        .map_err(|e| RelayError::ImageDecode(format!("Failed to decode {:?} image: {}", format, e)))?;

    debug!(
        "Decoded {:?} raster {}x{} ({} bytes)",
        format,
        image.width(),
        image.height(),
        raw.bytes.len()
    );

    // Formats the sniffer cannot label (ICO, TGA, PNM) go upstream as PNG
    if detect_format(&raw.bytes).is_none() {
        debug!("Re-encoding {:?} raster as PNG", format);
        let bytes = encode_png(&image)?;
        return Ok(DecodedRaster {
            image,
            bytes,
            mime: "image/png".to_string(),
        });
    }

    let mime = sniff(&raw.bytes, raw.claimed_mime.as_deref().unwrap_or(""));
    Ok(DecodedRaster {
        image,
        bytes: raw.bytes,
        mime,
    })
}

/// Decode a painted overlay and re-encode it as an RGBA PNG.
///
/// Masks are always handled as transparent rasters, whatever format the
/// browser sent.
pub fn decode_mask(input: &str) -> Result<DecodedRaster> {
    let raster = decode_to_image(input)?;
    let image = DynamicImage::ImageRgba8(raster.image.to_rgba8());
    let bytes = encode_png(&image)?;

    Ok(DecodedRaster {
        image,
        bytes,
        mime: "image/png".to_string(),
    })
}

fn encode_png(image: &DynamicImage) -> Result<Bytes> {
    let mut buf = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buf), ImageOutputFormat::Png)
        .map_err(|e| RelayError::ImageDecode(format!("Failed to encode PNG: {}", e)))?;
    Ok(buf.into())
}

/// Build a `data:<mime>;base64,<payload>` URL.
pub fn encode_data_url(bytes: &[u8], mime: &str) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn png_bytes() -> Vec<u8> {
        let img = RgbaImage::from_pixel(3, 2, Rgba([200, 10, 10, 255]));
        let mut buf = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), ImageOutputFormat::Png)
            .unwrap();
        buf
    }

    fn jpeg_bytes() -> Vec<u8> {
        let img = image::RgbImage::from_pixel(4, 4, image::Rgb([0, 120, 255]));
        let mut buf = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buf), ImageOutputFormat::Jpeg(90))
            .unwrap();
        buf
    }

    #[test]
    fn test_data_url_is_stripped() {
        let png = png_bytes();
        let url = encode_data_url(&png, "image/png");

        let normalized = decode_to_bytes(&url);
        assert_eq!(normalized.outcome, DecodeOutcome::Decoded);
        assert_eq!(normalized.image.bytes.as_ref(), png.as_slice());
        assert_eq!(normalized.image.claimed_mime.as_deref(), Some("image/png"));
    }

    #[test]
    fn test_bare_base64_and_embedded_newlines() {
        let encoded = STANDARD.encode(b"hello schematic world");
        let wrapped: String = encoded
            .as_bytes()
            .chunks(8)
            .map(|c| std::str::from_utf8(c).unwrap())
            .collect::<Vec<_>>()
            .join("\n");

        let normalized = decode_to_bytes(&wrapped);
        assert_eq!(normalized.outcome, DecodeOutcome::Decoded);
        assert_eq!(normalized.image.bytes.as_ref(), b"hello schematic world");
        assert_eq!(normalized.image.claimed_mime, None);
    }

    #[test]
    fn test_missing_padding_is_tolerated() {
        // "ab" -> "YWI=" without the pad
        let normalized = decode_to_bytes("YWI");
        assert_eq!(normalized.outcome, DecodeOutcome::Decoded);
        assert_eq!(normalized.image.bytes.as_ref(), b"ab");
    }

    #[test]
    fn test_invalid_base64_falls_back_to_literal_bytes() {
        let input = "data:image/png;base64,not base64 at all!!";
        let normalized = decode_to_bytes(input);
        assert_eq!(normalized.outcome, DecodeOutcome::LiteralFallback);
        assert_eq!(normalized.image.bytes.as_ref(), input.as_bytes());
        assert_eq!(normalized.image.claimed_mime.as_deref(), Some("image/png"));
    }

    #[test]
    fn test_data_url_without_comma_is_left_alone() {
        let (mime, payload) = split_data_url("data:image/png;base64");
        assert_eq!(mime, None);
        assert_eq!(payload, "data:image/png;base64");
    }

    #[test]
    fn test_decode_to_image_png_and_jpeg() {
        let png = decode_to_image(&encode_data_url(&png_bytes(), "image/jpeg")).unwrap();
        assert_eq!(png.mime, "image/png");
        assert_eq!((png.image.width(), png.image.height()), (3, 2));

        let jpeg = decode_to_image(&STANDARD.encode(jpeg_bytes())).unwrap();
        assert_eq!(jpeg.mime, "image/jpeg");
    }

    #[test]
    fn test_decode_to_image_rejects_non_raster() {
        let err = decode_to_image(&STANDARD.encode(b"just some text")).unwrap_err();
        assert!(matches!(err, RelayError::ImageDecode(_)));

        let err = decode_to_image("%%% garbage %%%").unwrap_err();
        assert!(matches!(err, RelayError::ImageDecode(_)));
    }

    #[test]
    fn test_unlabelled_raster_is_sent_as_png() {
        use image::codecs::pnm::{PnmSubtype, SampleEncoding};

        let img = image::RgbImage::from_pixel(5, 3, image::Rgb([10, 200, 30]));
        let mut pnm = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(
                &mut Cursor::new(&mut pnm),
                ImageOutputFormat::Pnm(PnmSubtype::Pixmap(SampleEncoding::Binary)),
            )
            .unwrap();
        assert!(detect_format(&pnm).is_none());

        let raster = decode_to_image(&encode_data_url(&pnm, "image/x-portable-pixmap")).unwrap();
        assert_eq!(raster.mime, "image/png");
        assert!(raster.bytes.starts_with(b"\x89PNG\r\n\x1a\n"));
        assert_eq!((raster.image.width(), raster.image.height()), (5, 3));
        assert!(image::load_from_memory(&raster.bytes).is_ok());
    }

    #[test]
    fn test_mask_is_reencoded_as_rgba_png() {
        let mask = decode_mask(&STANDARD.encode(jpeg_bytes())).unwrap();
        assert_eq!(mask.mime, "image/png");
        assert!(mask.bytes.starts_with(b"\x89PNG\r\n\x1a\n"));
        assert!(mask.image.color().has_alpha());
    }
}
