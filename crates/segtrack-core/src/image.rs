//! Raster containers
//!
//! `GrayImage` is the 8-bit input raster consumed by the sweeps: small
//! values are stroke, large values are background. `LabelImage` is the
//! 16-bit raster segments are rendered into when the postprocessor needs
//! to measure how much two segment sets overlap.
//!
//! Both store samples row-major with no padding.

use crate::error::{Error, Result};

/// 8-bit grayscale raster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrayImage {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl GrayImage {
    /// Create an image filled with a constant value
    ///
    /// # Arguments
    ///
    /// * `width` - Number of columns
    /// * `height` - Number of rows
    /// * `value` - Fill value
    pub fn new(width: usize, height: usize, value: u8) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    /// Wrap an existing row-major sample buffer
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimension`] when `width * height` overflows,
    /// [`Error::BufferSize`] when `data.len() != width * height`.
    pub fn from_vec(width: usize, height: usize, data: Vec<u8>) -> Result<Self> {
        let expected = width
            .checked_mul(height)
            .ok_or(Error::InvalidDimension { width, height })?;
        if data.len() != expected {
            return Err(Error::BufferSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// True when the image holds no sample
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Sample at (x, y), `None` outside the raster
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        if x < self.width && y < self.height {
            Some(self.data[y * self.width + x])
        } else {
            None
        }
    }

    /// Set the sample at (x, y); out-of-bounds writes are ignored
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: u8) {
        if x < self.width && y < self.height {
            self.data[y * self.width + x] = value;
        }
    }

    /// Borrow row `y`
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    pub fn row(&self, y: usize) -> &[u8] {
        let start = y * self.width;
        &self.data[start..start + self.width]
    }

    /// Iterate over the rows from top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        // chunks_exact(0) panics, a zero-width image simply has empty rows
        let width = self.width.max(1);
        self.data
            .chunks_exact(width)
            .take(if self.width == 0 { 0 } else { self.height })
    }

    /// Swap the two axes
    ///
    /// Columns of `self` become rows of the result, so a column sweep can
    /// read contiguous memory.
    pub fn transpose(&self) -> GrayImage {
        let mut data = vec![0u8; self.data.len()];
        for y in 0..self.height {
            let row = self.row(y);
            for (x, &v) in row.iter().enumerate() {
                data[x * self.height + y] = v;
            }
        }
        GrayImage {
            width: self.height,
            height: self.width,
            data,
        }
    }

    /// Invert every sample (`255 - v`)
    pub fn invert(&self) -> GrayImage {
        GrayImage {
            width: self.width,
            height: self.height,
            data: self.data.iter().map(|&v| 255 - v).collect(),
        }
    }
}

/// 16-bit label raster, 0 is background
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelImage {
    width: usize,
    height: usize,
    data: Vec<u16>,
}

impl LabelImage {
    /// Create an empty (all background) label image
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height],
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Label at (x, y), 0 outside the raster
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u16 {
        if x < self.width && y < self.height {
            self.data[y * self.width + x]
        } else {
            0
        }
    }

    /// Set the label at (x, y); out-of-bounds writes are ignored
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, label: u16) {
        if x < self.width && y < self.height {
            self.data[y * self.width + x] = label;
        }
    }

    /// Number of non-background pixels
    pub fn count_foreground(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0).count()
    }
}
