//! Image conversion
//!
//! Turns a base64 image into a single-channel grayscale PNG.

use std::io::Cursor;

use image::{DynamicImage, GenericImageView, ImageFormat};

use crate::error::{ImageError, Result};
use crate::utils::{decode_base64, encode_base64};

/// MIME type of every converted image
pub const PNG_MIME: &str = "image/png";

/// Convert a base64-encoded image to a base64-encoded grayscale PNG
pub fn to_grayscale_png(data: &str) -> Result<String> {
    let bytes = decode_base64("puch_image_data", data).map_err(|e| ImageError::Decode {
        message: e.to_string(),
    })?;
    let png = grayscale_png_bytes(&bytes)?;
    Ok(encode_base64(&png))
}

/// Convert raw image bytes to grayscale PNG bytes
pub fn grayscale_png_bytes(bytes: &[u8]) -> Result<Vec<u8>> {
    let image = image::load_from_memory(bytes).map_err(|e| ImageError::Decode {
        message: e.to_string(),
    })?;

    let luma = DynamicImage::ImageLuma8(image.to_luma8());
    tracing::debug!(
        width = luma.width(),
        height = luma.height(),
        "Converted image to grayscale"
    );

    let mut out = Cursor::new(Vec::new());
    luma.write_to(&mut out, ImageFormat::Png)
        .map_err(|e| ImageError::Encode {
            message: e.to_string(),
        })?;
    Ok(out.into_inner())
}
