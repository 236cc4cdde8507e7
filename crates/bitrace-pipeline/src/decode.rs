//! Image decoding.
//!
//! Accepts raw image bytes (PNG, JPEG, BMP, WebP) and produces a
//! single-channel grayscale image. Pixels are not thresholded here;
//! [`Bitmap::from_gray`](crate::Bitmap::from_gray) rejects anything that
//! is not pure black or pure white.

use image::GrayImage;

use crate::types::PipelineError;

/// Decode raw image bytes into a grayscale raster.
///
/// Colour inputs are reduced with the `image` crate's luminance
/// conversion, which maps pure black and pure white to 0 and 255.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if `bytes` is empty.
/// Returns [`PipelineError::ImageDecode`] if the image format is
/// unrecognized or the data is corrupt.
#[must_use = "returns the decoded grayscale image"]
pub fn decode_gray(bytes: &[u8]) -> Result<GrayImage, PipelineError> {
    if bytes.is_empty() {
        return Err(PipelineError::EmptyInput);
    }

    let img = image::load_from_memory(bytes)?;
    Ok(img.to_luma8())
}
