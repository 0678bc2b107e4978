//! Captured frames
//!
//! A [`Frame`] is an immutable RGBA8 snapshot. Pixel data sits behind an
//! `Arc` so the store can lend frames to an encode snapshot or a preview
//! without copying pixels; the buffer is released when the last holder drops.

use crate::result::{CaptureError, CaptureResult};
use image::{imageops::FilterType, DynamicImage, RgbaImage};
use std::sync::Arc;

/// Bytes per RGBA8 pixel
pub const BYTES_PER_PIXEL: usize = 4;

/// One captured image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    data: Arc<[u8]>,
    index: u64,
}

impl Frame {
    /// Create a frame from row-major RGBA data
    ///
    /// # Errors
    ///
    /// Returns error if a dimension is zero or `data.len() != width * height * 4`
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> CaptureResult<Self> {
        if width == 0 || height == 0 {
            return Err(CaptureError::invalid_frame(format!(
                "dimensions must be positive, got {width}x{height}"
            )));
        }

        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|px| px.checked_mul(BYTES_PER_PIXEL))
            .ok_or_else(|| CaptureError::invalid_frame("frame dimensions overflow"))?;
        if data.len() != expected {
            return Err(CaptureError::invalid_frame(format!(
                "expected {expected} bytes for {width}x{height} RGBA, got {}",
                data.len()
            )));
        }

        Ok(Self {
            width,
            height,
            data: data.into(),
            index: 0,
        })
    }

    /// Create a frame filled with a single RGBA color
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> CaptureResult<Self> {
        let pixels = (width as usize) * (height as usize);
        Self::new(width, height, rgba.repeat(pixels))
    }

    /// Create a frame from an `image` buffer
    pub fn from_rgba_image(img: RgbaImage) -> CaptureResult<Self> {
        let (width, height) = img.dimensions();
        Self::new(width, height, img.into_raw())
    }

    /// Frame width in pixels
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Frame height in pixels
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row-major RGBA pixel data
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Capture index assigned by the store on admission
    #[must_use]
    pub fn index(&self) -> u64 {
        self.index
    }

    /// RGBA value at (x, y)
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = ((y as usize) * (self.width as usize) + x as usize) * BYTES_PER_PIXEL;
        let px = self.data.get(offset..offset + BYTES_PER_PIXEL)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    pub(crate) fn with_index(mut self, index: u64) -> Self {
        self.index = index;
        self
    }

    /// Copy the pixels into an `image` buffer
    pub fn to_rgba_image(&self) -> CaptureResult<RgbaImage> {
        RgbaImage::from_raw(self.width, self.height, self.data.to_vec())
            .ok_or_else(|| CaptureError::invalid_frame("Invalid frame data dimensions"))
    }

    /// Scale the frame by `ratio` (0, 1], never below 1x1
    ///
    /// A ratio of 1 returns the frame as is, sharing its buffer.
    pub fn resized(&self, ratio: f32) -> CaptureResult<Self> {
        if !(ratio > 0.0 && ratio <= 1.0) {
            return Err(CaptureError::invalid_frame(format!(
                "resize ratio must be in (0, 1], got {ratio}"
            )));
        }

        let width = ((self.width as f32 * ratio).round() as u32).max(1);
        let height = ((self.height as f32 * ratio).round() as u32).max(1);
        if width == self.width && height == self.height {
            return Ok(self.clone());
        }

        self.resized_exact(width, height)
    }

    /// Scale the frame to exact dimensions
    pub fn resized_exact(&self, width: u32, height: u32) -> CaptureResult<Self> {
        if width == self.width && height == self.height {
            return Ok(self.clone());
        }

        let img = DynamicImage::ImageRgba8(self.to_rgba_image()?);
        let resized = img.resize_exact(width, height, FilterType::Triangle);

        let mut frame = Self::new(width, height, resized.to_rgba8().into_raw())?;
        frame.index = self.index;
        Ok(frame)
    }
}
