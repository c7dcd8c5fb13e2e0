//! Packed pixel buffers handed to encoders.

use crate::error::{MediaEncError, Result};
use serde::{Deserialize, Serialize};

/// Pixel format enumeration. All formats are packed into a single plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PixelFormat {
    /// 8-bit RGBA (32 bits per pixel)
    #[default]
    Rgba8,
    /// 8-bit BGRA (32 bits per pixel)
    Bgra8,
    /// 8-bit RGB (24 bits per pixel)
    Rgb8,
}

impl PixelFormat {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Rgba8 | Self::Bgra8 => 4,
            Self::Rgb8 => 3,
        }
    }

    /// Tightly packed size of a frame in this format.
    pub fn frame_size(self, width: u32, height: u32) -> usize {
        width as usize * height as usize * self.bytes_per_pixel()
    }
}

/// A video frame in CPU memory.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    format: PixelFormat,
    width: u32,
    height: u32,
    /// Bytes per row (may include padding)
    stride: usize,
    data: Vec<u8>,
}

impl FrameBuffer {
    /// Create a zeroed frame buffer with the given dimensions and format.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        // Align stride to 64 bytes
        let min_stride = width as usize * format.bytes_per_pixel();
        let stride = (min_stride + 63) & !63;
        Self {
            format,
            width,
            height,
            stride,
            data: vec![0u8; stride * height as usize],
        }
    }

    /// Wrap caller-provided pixel data.
    ///
    /// Fails if `stride` is narrower than one row of pixels or `data` is
    /// shorter than `stride * height`.
    pub fn from_raw(
        width: u32,
        height: u32,
        stride: usize,
        format: PixelFormat,
        data: Vec<u8>,
    ) -> Result<Self> {
        let min_stride = (width as usize)
            .checked_mul(format.bytes_per_pixel())
            .ok_or_else(|| {
                MediaEncError::InvalidArgument(format!("{width}px {format:?} row is too large"))
            })?;
        if stride < min_stride {
            return Err(MediaEncError::InvalidArgument(format!(
                "stride {stride} is smaller than a {width}px {format:?} row ({min_stride} bytes)"
            )));
        }
        let required = stride.checked_mul(height as usize).ok_or_else(|| {
            MediaEncError::InvalidArgument(format!(
                "stride {stride} over {height} rows overflows the address space"
            ))
        })?;
        if data.len() < required {
            return Err(MediaEncError::InvalidArgument(format!(
                "pixel data is {} bytes, {width}x{height} with stride {stride} needs {required}",
                data.len()
            )));
        }
        Ok(Self {
            format,
            width,
            height,
            stride,
            data,
        })
    }

    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get a row of pixel data, without padding.
    #[inline]
    pub fn row(&self, y: u32) -> &[u8] {
        let start = y as usize * self.stride;
        let end = start + self.width as usize * self.format.bytes_per_pixel();
        &self.data[start..end]
    }

    /// Get a mutable row of pixel data, without padding.
    #[inline]
    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        let start = y as usize * self.stride;
        let end = start + self.width as usize * self.format.bytes_per_pixel();
        &mut self.data[start..end]
    }

    /// Copy into a tightly packed RGBA8 buffer.
    pub fn to_packed_rgba8(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(PixelFormat::Rgba8.frame_size(self.width, self.height));
        for y in 0..self.height {
            let row = self.row(y);
            match self.format {
                PixelFormat::Rgba8 => out.extend_from_slice(row),
                PixelFormat::Bgra8 => {
                    for px in row.chunks_exact(4) {
                        out.extend_from_slice(&[px[2], px[1], px[0], px[3]]);
                    }
                }
                PixelFormat::Rgb8 => {
                    for px in row.chunks_exact(3) {
                        out.extend_from_slice(&[px[0], px[1], px[2], 255]);
                    }
                }
            }
        }
        out
    }

    /// Create a test pattern frame (color bars).
    pub fn test_pattern(width: u32, height: u32) -> Self {
        const COLORS: [[u8; 4]; 8] = [
            [255, 255, 255, 255], // White
            [255, 255, 0, 255],   // Yellow
            [0, 255, 255, 255],   // Cyan
            [0, 255, 0, 255],     // Green
            [255, 0, 255, 255],   // Magenta
            [255, 0, 0, 255],     // Red
            [0, 0, 255, 255],     // Blue
            [0, 0, 0, 255],       // Black
        ];

        let mut frame = Self::new(width, height, PixelFormat::Rgba8);
        for y in 0..height {
            let row = frame.row_mut(y);
            for x in 0..width {
                let i = x as usize * 4;
                let bar = (x as u64 * 8 / width as u64) as usize;
                row[i..i + 4].copy_from_slice(&COLORS[bar]);
            }
        }
        frame
    }
}
