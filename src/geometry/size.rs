//! Image dimensions used by raster conversions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Height and width of an image in pixels, in that order.
///
/// The order follows the RLE `size` field (`[H, W]`), not the
/// `width x height` convention used for image records.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageSize {
    pub height: u32,
    pub width: u32,
}

impl ImageSize {
    #[inline]
    pub fn new(height: u32, width: u32) -> Self {
        Self { height, width }
    }

    /// Total number of pixels (`H * W`).
    #[inline]
    pub fn pixel_count(&self) -> u64 {
        self.height as u64 * self.width as u64
    }
}

impl fmt::Debug for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ImageSize({}x{})", self.height, self.width)
    }
}

impl From<[u32; 2]> for ImageSize {
    fn from([height, width]: [u32; 2]) -> Self {
        Self::new(height, width)
    }
}

impl From<ImageSize> for [u32; 2] {
    fn from(size: ImageSize) -> Self {
        [size.height, size.width]
    }
}
