//! Packed 3-channel 8-bit image buffer.

/// A row-major, 3-channel, 8-bit image.
///
/// Pixel `(col, row)` occupies bytes `3 * (row * width + col) .. + 3`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbImage {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl RgbImage {
    /// Wrap a raw pixel buffer.
    ///
    /// # Panics
    ///
    /// Panics if `data.len() != width * height * 3`. A malformed frame is a
    /// contract violation by the acquisition layer, not a runtime condition.
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> Self {
        assert_eq!(
            data.len(),
            width * height * 3,
            "image buffer of {} bytes does not match {width}x{height}x3",
            data.len()
        );
        Self { width, height, data }
    }

    /// An all-black image.
    pub fn blank(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height * 3],
        }
    }

    /// An image filled with a single colour.
    pub fn filled(width: usize, height: usize, rgb: [u8; 3]) -> Self {
        let mut data = Vec::with_capacity(width * height * 3);
        for _ in 0..width * height {
            data.extend_from_slice(&rgb);
        }
        Self { width, height, data }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Return the pixel at `(col, row)`.
    pub fn pixel(&self, col: usize, row: usize) -> [u8; 3] {
        let i = self.offset(col, row);
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    /// Overwrite the pixel at `(col, row)`.
    pub fn set_pixel(&mut self, col: usize, row: usize, rgb: [u8; 3]) {
        let i = self.offset(col, row);
        self.data[i..i + 3].copy_from_slice(&rgb);
    }

    /// Iterate over pixels in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = [u8; 3]> + '_ {
        self.data.chunks_exact(3).map(|p| [p[0], p[1], p[2]])
    }

    /// The raw packed bytes.
    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    fn offset(&self, col: usize, row: usize) -> usize {
        debug_assert!(col < self.width && row < self.height);
        3 * (row * self.width + col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get_pixel() {
        let mut img = RgbImage::blank(4, 3);
        img.set_pixel(2, 1, [10, 20, 30]);
        assert_eq!(img.pixel(2, 1), [10, 20, 30]);
        assert_eq!(img.pixel(1, 2), [0, 0, 0]);
        assert_eq!(img.as_raw()[3 * (4 + 2)], 10);
    }

    #[test]
    fn filled_image_is_uniform() {
        let img = RgbImage::filled(5, 2, [200, 180, 170]);
        assert_eq!(img.pixels().count(), 10);
        assert!(img.pixels().all(|p| p == [200, 180, 170]));
    }

    #[test]
    #[should_panic(expected = "does not match")]
    fn wrong_buffer_length_panics() {
        let _ = RgbImage::new(2, 2, vec![0; 11]);
    }
}
