//! Two-valued raster the tracer walks.

use image::GrayImage;

use crate::types::{Dimensions, PipelineError};

/// A rectangular grid of foreground/background pixels.
///
/// Lookups outside the grid report background, so boundary walks never
/// need to special-case the image border.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    pixels: Vec<bool>,
}

impl Bitmap {
    /// Build a bitmap from row-major foreground flags.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidBitmap`] if either dimension is
    /// zero, the dimensions exceed the signed vertex grid, or
    /// `pixels.len()` does not equal `width * height`.
    pub fn new(width: u32, height: u32, pixels: Vec<bool>) -> Result<Self, PipelineError> {
        if width == 0 || height == 0 {
            return Err(PipelineError::InvalidBitmap(format!(
                "dimensions must be non-zero, got {width}x{height}"
            )));
        }
        if i32::try_from(width).is_err() || i32::try_from(height).is_err() {
            return Err(PipelineError::InvalidBitmap(format!(
                "dimensions {width}x{height} are too large"
            )));
        }
        let expected = u64::from(width) * u64::from(height);
        if pixels.len() as u64 != expected {
            return Err(PipelineError::InvalidBitmap(format!(
                "expected {expected} pixels, got {}",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Build a bitmap from a strictly black-and-white grayscale image.
    ///
    /// Black (0) is foreground unless `invert` is set, in which case
    /// white (255) is.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidBitmap`] if the image is empty or
    /// contains any value other than 0 and 255.
    pub fn from_gray(image: &GrayImage, invert: bool) -> Result<Self, PipelineError> {
        let (width, height) = image.dimensions();
        let mut pixels = Vec::with_capacity(image.as_raw().len());
        for (x, y, pixel) in image.enumerate_pixels() {
            let value = pixel.0[0];
            match value {
                0 => pixels.push(!invert),
                255 => pixels.push(invert),
                _ => {
                    return Err(PipelineError::InvalidBitmap(format!(
                        "pixel ({x}, {y}) has value {value}; only 0 and 255 are allowed"
                    )));
                }
            }
        }
        Self::new(width, height, pixels)
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Width and height as [`Dimensions`].
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.width,
            height: self.height,
        }
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let x = u32::try_from(x).ok()?;
        let y = u32::try_from(y).ok()?;
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    /// Whether pixel `(x, y)` is foreground. Off-grid pixels are background.
    #[must_use]
    pub fn is_foreground(&self, x: i32, y: i32) -> bool {
        self.index(x, y).is_some_and(|i| self.pixels[i])
    }

    /// Number of foreground pixels.
    #[must_use]
    pub fn foreground_count(&self) -> usize {
        self.pixels.iter().filter(|&&p| p).count()
    }

    /// Flip every pixel of row `y` from column `x` through the right edge.
    ///
    /// Rows and columns outside the grid are ignored.
    pub(crate) fn invert_row_from(&mut self, x: i32, y: i32) {
        let Some(start) = self.index(x.max(0), y) else {
            return;
        };
        let row_end = (start / self.width as usize + 1) * self.width as usize;
        for pixel in &mut self.pixels[start..row_end] {
            *pixel = !*pixel;
        }
    }

    /// Parse ASCII art: `#` is foreground, anything else background.
    #[cfg(test)]
    #[allow(clippy::panic)]
    pub(crate) fn from_art(rows: &[&str]) -> Self {
        let height = u32::try_from(rows.len()).unwrap_or(0);
        let width = rows
            .first()
            .map_or(0, |r| u32::try_from(r.len()).unwrap_or(0));
        let pixels = rows
            .iter()
            .flat_map(|r| r.bytes().map(|b| b == b'#'))
            .collect();
        match Self::new(width, height, pixels) {
            Ok(bitmap) => bitmap,
            Err(err) => panic!("bad test art: {err}"),
        }
    }
}
