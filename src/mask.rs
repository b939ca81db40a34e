use image::{GrayImage, Luma};

/// Pixel value used for ridge (foreground) pixels when a mask is viewed as an image.
pub const FOREGROUND: u8 = 255;
pub const BACKGROUND: u8 = 0;

/// Two-valued ridge / non-ridge grid backed by a grayscale buffer holding 0 or 255.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BinaryMask {
    image: GrayImage,
}

/// A [`BinaryMask`] thinned to one-pixel-wide ridge lines.
pub type SkeletonMask = BinaryMask;

impl BinaryMask {
    /// An all-background mask.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: GrayImage::new(width, height),
        }
    }

    /// Any non-zero pixel becomes foreground.
    pub fn from_gray(mut image: GrayImage) -> Self {
        for p in image.pixels_mut() {
            p.0[0] = if p.0[0] > 0 { FOREGROUND } else { BACKGROUND };
        }
        Self { image }
    }

    /// Builds a mask from row-major booleans. Returns `None` if the length does not match.
    pub fn from_bools(width: u32, height: u32, values: &[bool]) -> Option<Self> {
        if values.len() != (width as usize) * (height as usize) {
            return None;
        }
        let raw = values
            .iter()
            .map(|&v| if v { FOREGROUND } else { BACKGROUND })
            .collect();
        GrayImage::from_raw(width, height, raw).map(|image| Self { image })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn get(&self, x: u32, y: u32) -> bool {
        self.image.get_pixel(x, y).0[0] != BACKGROUND
    }

    pub fn set(&mut self, x: u32, y: u32, value: bool) {
        let v = if value { FOREGROUND } else { BACKGROUND };
        self.image.put_pixel(x, y, Luma([v]));
    }

    /// Number of foreground pixels.
    pub fn count(&self) -> usize {
        self.image.as_raw().iter().filter(|&&p| p != BACKGROUND).count()
    }

    /// Number of foreground pixels in columns `start..end`.
    pub fn count_in_columns(&self, start: u32, end: u32) -> usize {
        let end = end.min(self.width());
        let mut count = 0;
        for y in 0..self.height() {
            for x in start..end {
                if self.get(x, y) {
                    count += 1;
                }
            }
        }
        count
    }

    pub fn as_image(&self) -> &GrayImage {
        &self.image
    }

    pub fn into_image(self) -> GrayImage {
        self.image
    }
}
