//! Synthetic test images
//!
//! Strokes are painted on a white background so every regression test can
//! describe its input geometrically instead of loading image files.

use segtrack_core::GrayImage;

/// Background value of a fresh canvas
pub const WHITE: u8 = 255;

/// Stroke value used by the stroke helpers
pub const BLACK: u8 = 0;

/// Builder for synthetic grayscale images
#[derive(Debug, Clone)]
pub struct Canvas {
    image: GrayImage,
}

impl Canvas {
    /// Create a white canvas
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            image: GrayImage::new(width, height, WHITE),
        }
    }

    /// Fill the inclusive rectangle [x0, x1] x [y0, y1], clipped to the canvas
    pub fn fill_rect(mut self, x0: usize, y0: usize, x1: usize, y1: usize, value: u8) -> Self {
        for y in y0..=y1.min(self.image.height().saturating_sub(1)) {
            for x in x0..=x1.min(self.image.width().saturating_sub(1)) {
                self.image.set(x, y, value);
            }
        }
        self
    }

    /// Paint a black vertical stroke covering columns `x0..x0 + thickness`
    /// on rows `y0..=y1`
    pub fn vertical_stroke(self, x0: usize, thickness: usize, y0: usize, y1: usize) -> Self {
        if thickness == 0 {
            return self;
        }
        self.fill_rect(x0, y0, x0 + thickness - 1, y1, BLACK)
    }

    /// Paint a black horizontal stroke covering rows `y0..y0 + thickness`
    /// on columns `x0..=x1`
    pub fn horizontal_stroke(self, y0: usize, thickness: usize, x0: usize, x1: usize) -> Self {
        if thickness == 0 {
            return self;
        }
        self.fill_rect(x0, y0, x1, y0 + thickness - 1, BLACK)
    }

    /// Paint a black stroke drifting by `slope` pixels per row
    ///
    /// Row `y` covers columns starting at `round(x0 + slope * (y - y0))`.
    pub fn slanted_stroke(mut self, x0: f32, slope: f32, thickness: usize, y0: usize, y1: usize) -> Self {
        for y in y0..=y1 {
            let start = (x0 + slope * (y - y0) as f32).round();
            if start < 0.0 {
                continue;
            }
            for dx in 0..thickness {
                self.image.set(start as usize + dx, y, BLACK);
            }
        }
        self
    }

    /// Borrow the image painted so far
    pub fn image(&self) -> &GrayImage {
        &self.image
    }

    /// Finish the canvas
    pub fn build(self) -> GrayImage {
        self.image
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strokes() {
        let img = Canvas::new(10, 8)
            .vertical_stroke(2, 3, 1, 4)
            .horizontal_stroke(6, 1, 0, 20)
            .build();
        assert_eq!(img.get(2, 1), Some(BLACK));
        assert_eq!(img.get(4, 4), Some(BLACK));
        assert_eq!(img.get(5, 4), Some(WHITE));
        assert_eq!(img.get(2, 5), Some(WHITE));
        assert_eq!(img.row(6), &[BLACK; 10]);
    }

    #[test]
    fn test_slanted_stroke() {
        let img = Canvas::new(20, 5).slanted_stroke(2.0, 1.0, 2, 0, 4).build();
        assert_eq!(img.get(2, 0), Some(BLACK));
        assert_eq!(img.get(7, 4), Some(BLACK));
        assert_eq!(img.get(2, 4), Some(WHITE));
    }
}
