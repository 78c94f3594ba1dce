//! Figure measurement
//!
//! Decodes image data once, picks the drawn size from the size class and
//! the layout limits, and resamples sources that are far denser than the
//! print resolution. Both renderers draw from the same [`PreparedFigure`].

use std::io::Cursor;

use image::{GenericImageView, ImageFormat};
use thiserror::Error;

use crate::block::ImageBlock;
use crate::layout::Layout;
use crate::units::{Twips, TWIPS_PER_INCH};

/// Why an image block could not be drawn
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FigureError {
    /// No image bytes were supplied or they failed base64 decoding
    #[error("empty image data")]
    Empty,

    /// The bytes are not a PNG or JPEG image
    #[error("unsupported image format: {0}")]
    Unsupported(String),

    /// The image could not be decoded
    #[error("corrupt image data: {0}")]
    Decode(String),

    /// Re-encoding a resampled image failed
    #[error("image encoding failed: {0}")]
    Encode(String),
}

/// Encoded image format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FigureFormat {
    Png,
    Jpeg,
}

impl FigureFormat {
    /// File extension used inside packages
    pub fn extension(self) -> &'static str {
        match self {
            FigureFormat::Png => "png",
            FigureFormat::Jpeg => "jpeg",
        }
    }

    /// MIME type
    pub fn mime(self) -> &'static str {
        match self {
            FigureFormat::Png => "image/png",
            FigureFormat::Jpeg => "image/jpeg",
        }
    }
}

/// An image ready to be placed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedFigure {
    /// Encoded bytes to embed
    pub data: Vec<u8>,
    pub format: FigureFormat,
    /// Drawn width
    pub width: Twips,
    /// Drawn height
    pub height: Twips,
    /// Pixel size of `data`
    pub pixels: (u32, u32),
    /// Whether `data` was resampled from the source
    pub resampled: bool,
}

/// Measure an image block against the layout
pub fn prepare_figure(block: &ImageBlock, layout: &Layout) -> Result<PreparedFigure, FigureError> {
    if block.data.is_empty() {
        return Err(FigureError::Empty);
    }

    let format = match image::guess_format(&block.data) {
        Ok(ImageFormat::Png) => FigureFormat::Png,
        Ok(ImageFormat::Jpeg) => FigureFormat::Jpeg,
        Ok(other) => return Err(FigureError::Unsupported(format!("{:?}", other))),
        Err(_) => return Err(FigureError::Unsupported("unrecognized".to_string())),
    };

    let decoded =
        image::load_from_memory(&block.data).map_err(|e| FigureError::Decode(e.to_string()))?;
    let (px_width, px_height) = decoded.dimensions();
    if px_width == 0 || px_height == 0 {
        return Err(FigureError::Decode("zero-sized image".to_string()));
    }

    let (width, height) = drawn_size(layout, block, px_width, px_height);

    let max_pixels = pixel_budget(width, layout.figure.max_dpi);
    if px_width > max_pixels {
        let target_height = ((px_height as u64 * max_pixels as u64) / px_width as u64).max(1) as u32;
        let resized = decoded.resize(
            max_pixels,
            target_height,
            image::imageops::FilterType::Triangle,
        );
        let mut data = Vec::new();
        resized
            .write_to(&mut Cursor::new(&mut data), ImageFormat::Png)
            .map_err(|e| FigureError::Encode(e.to_string()))?;
        log::debug!(
            "Resampled figure from {}x{} to {}x{}",
            px_width,
            px_height,
            resized.width(),
            resized.height()
        );
        return Ok(PreparedFigure {
            data,
            format: FigureFormat::Png,
            width,
            height,
            pixels: (resized.width(), resized.height()),
            resampled: true,
        });
    }

    Ok(PreparedFigure {
        data: block.data.clone(),
        format,
        width,
        height,
        pixels: (px_width, px_height),
        resampled: false,
    })
}

/// Drawn size for a source of the given pixel dimensions
///
/// Width comes from the size class; height follows the aspect ratio and is
/// capped, shrinking the width to match when the cap applies.
fn drawn_size(layout: &Layout, block: &ImageBlock, px_width: u32, px_height: u32) -> (Twips, Twips) {
    let width = layout.figure_width(block.size);
    let height = width.scale(px_height as i64, px_width as i64);
    if height > layout.figure.max_height {
        let height = layout.figure.max_height;
        (height.scale(px_width as i64, px_height as i64), height)
    } else {
        (width, height)
    }
}

fn pixel_budget(width: Twips, dpi: u32) -> u32 {
    let pixels = (width.get() * dpi as i64 + TWIPS_PER_INCH - 1) / TWIPS_PER_INCH;
    pixels.max(1) as u32
}
