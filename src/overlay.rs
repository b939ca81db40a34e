use image::{GrayImage, Rgb, RgbImage};

use crate::minutiae::{Minutia, MinutiaKind};

/// At most this many minutiae are drawn.
pub const MAX_MARKERS: usize = 100;
/// Half the side of the square marker, in pixels.
pub const MARKER_RADIUS: u32 = 3;

const ENDING_COLOUR: Rgb<u8> = Rgb([255, 0, 0]);
const BIFURCATION_COLOUR: Rgb<u8> = Rgb([0, 200, 0]);

/// Colour copy of `background` with a hollow square around each of the first
/// [`MAX_MARKERS`] minutiae: red for ridge endings, green for bifurcations.
pub fn draw_minutiae(background: &GrayImage, minutiae: &[Minutia]) -> RgbImage {
    let mut img = RgbImage::from_fn(background.width(), background.height(), |x, y| {
        let v = background.get_pixel(x, y).0[0];
        Rgb([v, v, v])
    });
    for m in minutiae.iter().take(MAX_MARKERS) {
        let colour = match m.kind {
            MinutiaKind::RidgeEnding => ENDING_COLOUR,
            MinutiaKind::Bifurcation => BIFURCATION_COLOUR,
        };
        mark(&mut img, m.x, m.y, MARKER_RADIUS, colour);
    }
    img
}

/// Outlines a square of half-side `r` centred on (x, y), clipped to the image.
pub fn mark(img: &mut RgbImage, x: u32, y: u32, r: u32, colour: Rgb<u8>) {
    let (x, y, r) = (x as i64, y as i64, r as i64);
    let (width, height) = (img.width() as i64, img.height() as i64);
    let xmin = (x - r).max(0);
    let xmax = (x + r).min(width - 1);
    let ymin = (y - r).max(0);
    let ymax = (y + r).min(height - 1);
    for j in xmin..=xmax {
        for k in ymin..=ymax {
            if j == x - r || j == x + r || k == y - r || k == y + r {
                img.put_pixel(j as u32, k as u32, colour);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn marks_are_coloured_by_kind() {
        let background = GrayImage::from_pixel(20, 20, Luma([50]));
        let minutiae = [
            Minutia::new(5, 5, MinutiaKind::RidgeEnding),
            Minutia::new(14, 14, MinutiaKind::Bifurcation),
        ];
        let img = draw_minutiae(&background, &minutiae);

        assert_eq!(img.dimensions(), (20, 20));
        assert_eq!(*img.get_pixel(2, 5), ENDING_COLOUR);
        assert_eq!(*img.get_pixel(17, 14), BIFURCATION_COLOUR);
        // Centres and untouched pixels keep the background.
        assert_eq!(*img.get_pixel(5, 5), Rgb([50, 50, 50]));
        assert_eq!(*img.get_pixel(10, 10), Rgb([50, 50, 50]));
    }

    #[test]
    fn marks_near_the_edge_are_clipped() {
        let mut img = RgbImage::new(4, 4);
        mark(&mut img, 0, 3, 3, ENDING_COLOUR);
        // Left and bottom edges of the square fall outside; the top edge at y = 0 and the
        // right edge at x = 3 are drawn.
        assert_eq!(*img.get_pixel(3, 3), ENDING_COLOUR);
        assert_eq!(*img.get_pixel(0, 0), ENDING_COLOUR);
        assert_eq!(*img.get_pixel(1, 2), Rgb([0, 0, 0]));
        assert_eq!(*img.get_pixel(0, 2), Rgb([0, 0, 0]));
    }

    #[test]
    fn marker_count_is_capped() {
        let background = GrayImage::new(400, 400);
        let minutiae: Vec<Minutia> = (0..150)
            .map(|i| Minutia::new(10 + 20 * (i % 15), 10 + 20 * (i / 15), MinutiaKind::RidgeEnding))
            .collect();
        let img = draw_minutiae(&background, &minutiae);
        // The 100th marker sits at (190, 130); the 101st would be at (210, 130).
        let drawn = |m: &Minutia| *img.get_pixel(m.x - MARKER_RADIUS, m.y) == ENDING_COLOUR;
        assert!(drawn(&minutiae[99]));
        assert!(!drawn(&minutiae[100]));
    }
}
