//! Photo payload decoding

use std::sync::Arc;

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine as _;
use bytes::Bytes;

use super::Avatar;
use crate::error::{AvatarError, AvatarResult};

/// Standard alphabet, padding optional. Input is pre-filtered to the alphabet.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Decode a vCard `PHOTO` value, ignoring anything outside the base64 alphabet.
///
/// vCards commonly wrap the payload across lines, so whitespace and other
/// stray characters are dropped rather than rejected.
pub fn decode_photo(encoded: &str) -> AvatarResult<Bytes> {
    let cleaned: String = encoded
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '+' || *c == '/')
        .collect();
    if cleaned.is_empty() {
        return Err(AvatarError::EmptyPayload);
    }

    let decoded = LENIENT.decode(cleaned.as_bytes())?;
    if decoded.is_empty() {
        return Err(AvatarError::EmptyPayload);
    }
    Ok(Bytes::from(decoded))
}

impl Avatar {
    /// Decode raw image bytes (PNG, JPEG, GIF, ...).
    pub fn from_bytes(data: Bytes) -> AvatarResult<Self> {
        if data.is_empty() {
            return Err(AvatarError::EmptyPayload);
        }
        let image = image::load_from_memory(&data)?;
        Ok(Self {
            data,
            image: Arc::new(image),
        })
    }
}

#[cfg(test)]
pub(crate) fn png_fixture(width: u32, height: u32) -> Vec<u8> {
    use std::io::Cursor;

    let buffer = image::RgbaImage::from_pixel(width, height, image::Rgba([200, 40, 90, 255]));
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgba8(buffer)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}
