// Avatar image pipeline
// Validates uploads and canonicalizes them to a fixed-size PNG before storage

use crate::error::ApiError;
use image::{imageops::FilterType, ImageFormat};
use std::io::Cursor;

/// Upload size ceiling in bytes, checked before any decoding happens
pub const MAX_AVATAR_BYTES: usize = 1_000_000;

/// Every stored avatar is a square of this many pixels per side
pub const AVATAR_DIMENSION: u32 = 250;

const ALLOWED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Validates an avatar upload by filename extension and byte size
///
/// The extension check is the documented upload contract; payloads that pass
/// it but are not actually images still fail later in [`canonicalize`].
pub fn validate_upload(filename: &str, size: usize) -> Result<(), ApiError> {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();

    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(ApiError::BadRequest(
            "Please upload an image (jpg, jpeg or png)".to_string(),
        ));
    }

    if size > MAX_AVATAR_BYTES {
        return Err(ApiError::BadRequest(format!(
            "Image must be at most {} bytes",
            MAX_AVATAR_BYTES
        )));
    }

    Ok(())
}

/// Decodes an accepted upload and re-encodes it as a 250x250 PNG
///
/// The output is deterministic for a given input, so re-uploading the same
/// file always produces an identical blob.
pub fn canonicalize(bytes: &[u8]) -> Result<Vec<u8>, ApiError> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|e| ApiError::BadRequest(format!("Uploaded file is not a valid image: {}", e)))?;

    let resized = decoded.resize_exact(AVATAR_DIMENSION, AVATAR_DIMENSION, FilterType::Triangle);

    let mut out = Cursor::new(Vec::new());
    resized
        .write_to(&mut out, ImageFormat::Png)
        .map_err(|e| ApiError::InternalError(format!("Failed to encode avatar: {}", e)))?;

    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, RgbImage};

    fn sample_png(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::new(width, height));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_accepts_allowed_extensions() {
        assert!(validate_upload("me.jpg", 100).is_ok());
        assert!(validate_upload("me.jpeg", 100).is_ok());
        assert!(validate_upload("me.png", 100).is_ok());
        assert!(validate_upload("ME.PNG", 100).is_ok());
    }

    #[test]
    fn test_rejects_other_extensions() {
        assert!(validate_upload("me.gif", 100).is_err());
        assert!(validate_upload("me.pdf", 100).is_err());
        assert!(validate_upload("me", 100).is_err());
        assert!(validate_upload("me.png.exe", 100).is_err());
    }

    #[test]
    fn test_rejects_oversized_upload() {
        assert!(validate_upload("me.png", MAX_AVATAR_BYTES).is_ok());
        assert!(validate_upload("me.png", MAX_AVATAR_BYTES + 1).is_err());
    }

    #[test]
    fn test_canonicalize_resizes_to_square_png() {
        let input = sample_png(30, 17);
        let output = canonicalize(&input).unwrap();

        let decoded = image::load_from_memory(&output).unwrap();
        assert_eq!(decoded.width(), AVATAR_DIMENSION);
        assert_eq!(decoded.height(), AVATAR_DIMENSION);
        assert_eq!(
            image::guess_format(&output).unwrap(),
            ImageFormat::Png
        );
    }

    #[test]
    fn test_canonicalize_is_deterministic() {
        let input = sample_png(10, 10);
        assert_eq!(canonicalize(&input).unwrap(), canonicalize(&input).unwrap());
    }

    #[test]
    fn test_canonicalize_rejects_non_image_bytes() {
        let err = canonicalize(b"definitely not an image").unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
    }
}
