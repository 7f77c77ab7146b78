//! Polygon rings: validation, shoelace area, bounds and scanline fill.
//!
//! A ring is a flat `[x0, y0, x1, y1, ...]` sequence of at least three
//! vertices. The closing edge from the last vertex back to the first is
//! implicit.

use super::mask::Mask;
use super::Polygons;
use crate::error::GeometryError;

/// Checks that every ring has an even length of at least 6 and only
/// finite coordinates.
pub fn validate(rings: &[Vec<f64>]) -> Result<(), GeometryError> {
    for (ring_idx, ring) in rings.iter().enumerate() {
        if ring.len() % 2 != 0 {
            return Err(GeometryError::OddRingLength {
                ring: ring_idx,
                len: ring.len(),
            });
        }
        if ring.len() < 6 {
            return Err(GeometryError::RingTooShort {
                ring: ring_idx,
                len: ring.len(),
            });
        }
        if let Some((index, value)) = ring.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(GeometryError::NonFinite {
                index,
                value: *value,
            });
        }
    }
    Ok(())
}

/// Unsigned shoelace area of a single ring.
pub fn ring_area(ring: &[f64]) -> f64 {
    let n = ring.len() / 2;
    let mut twice_area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        let (x0, y0) = (ring[2 * i], ring[2 * i + 1]);
        let (x1, y1) = (ring[2 * j], ring[2 * j + 1]);
        twice_area += x0 * y1 - x1 * y0;
    }
    twice_area.abs() / 2.0
}

/// Sum of the unsigned ring areas.
pub fn area(rings: &[Vec<f64>]) -> f64 {
    rings.iter().map(|ring| ring_area(ring)).sum()
}

/// Minimal XYWH box covering every vertex, or `None` when there are no
/// vertices. The box may have zero width or height for collinear input.
pub fn bounds(rings: &[Vec<f64>]) -> Option<[f64; 4]> {
    let mut points = rings
        .iter()
        .flat_map(|ring| ring.chunks_exact(2))
        .map(|pt| (pt[0], pt[1]));

    let (x, y) = points.next()?;
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (x, y, x, y);
    for (x, y) in points {
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }

    Some([min_x, min_y, max_x - min_x, max_y - min_y])
}

/// Fills every pixel whose centre lies inside any ring (even-odd rule per
/// ring, union across rings). Pixels already set in `mask` stay set.
pub fn rasterize_into(rings: &[Vec<f64>], mask: &mut Mask) {
    let (height, width) = (mask.height(), mask.width());
    let mut crossings: Vec<f64> = Vec::new();

    for ring in rings {
        let n = ring.len() / 2;
        if n < 3 {
            continue;
        }

        for row in 0..height {
            let yc = row as f64 + 0.5;
            crossings.clear();

            for i in 0..n {
                let j = (i + 1) % n;
                let (x0, y0) = (ring[2 * i], ring[2 * i + 1]);
                let (x1, y1) = (ring[2 * j], ring[2 * j + 1]);
                // Half-open on y so a vertex on the scanline counts once.
                if (y0 <= yc) != (y1 <= yc) {
                    let t = (yc - y0) / (y1 - y0);
                    crossings.push(x0 + t * (x1 - x0));
                }
            }
            crossings.sort_by(f64::total_cmp);

            for span in crossings.chunks_exact(2) {
                // Column c is inside when span[0] <= c + 0.5 < span[1].
                let first = (span[0] - 0.5).ceil().max(0.0);
                let last = (span[1] - 0.5).ceil().min(width as f64);
                if first >= last {
                    continue;
                }
                for col in first as u32..last as u32 {
                    mask.set(row, col, true);
                }
            }
        }
    }
}

/// Rasterizes `rings` onto a fresh mask of the given size.
pub fn to_mask(rings: &Polygons, size: super::ImageSize) -> Mask {
    let mut mask = Mask::new(size);
    rasterize_into(rings, &mut mask);
    mask
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::ImageSize;

    fn square() -> Polygons {
        vec![vec![0.0, 0.0, 100.0, 0.0, 100.0, 100.0, 0.0, 100.0]]
    }

    #[test]
    fn test_validate_rejects_odd_and_short_rings() {
        assert_eq!(
            validate(&[vec![0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0]]),
            Err(GeometryError::OddRingLength { ring: 0, len: 7 })
        );
        assert_eq!(
            validate(&[vec![0.0, 0.0, 1.0, 0.0, 1.0, 1.0], vec![0.0, 0.0, 1.0, 1.0]]),
            Err(GeometryError::RingTooShort { ring: 1, len: 4 })
        );
        assert!(validate(&square()).is_ok());
    }

    #[test]
    fn test_validate_rejects_nan() {
        let err = validate(&[vec![0.0, 0.0, f64::NAN, 0.0, 1.0, 1.0]]);
        assert!(matches!(err, Err(GeometryError::NonFinite { index: 2, .. })));
    }

    #[test]
    fn test_shoelace_area() {
        assert_eq!(area(&square()), 10000.0);
        // Triangle with legs 20: area 200, independent of winding.
        assert_eq!(ring_area(&[110.0, 110.0, 130.0, 130.0, 110.0, 130.0]), 200.0);
        assert_eq!(ring_area(&[110.0, 130.0, 130.0, 130.0, 110.0, 110.0]), 200.0);
    }

    #[test]
    fn test_area_sums_rings() {
        let rings = vec![
            vec![0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0],
            vec![5.0, 5.0, 7.0, 5.0, 7.0, 7.0, 5.0, 7.0],
        ];
        assert_eq!(area(&rings), 5.0);
    }

    #[test]
    fn test_bounds() {
        assert_eq!(bounds(&square()), Some([0.0, 0.0, 100.0, 100.0]));
        assert_eq!(
            bounds(&[vec![110.0, 110.0, 130.0, 130.0, 110.0, 130.0]]),
            Some([110.0, 110.0, 20.0, 20.0])
        );
        assert_eq!(bounds(&[]), None);
    }

    #[test]
    fn test_square_fills_whole_image() {
        let mask = to_mask(&square(), ImageSize::new(100, 100));
        assert_eq!(mask, Mask::full(ImageSize::new(100, 100)));
    }

    #[test]
    fn test_rasterize_uses_pixel_centres() {
        // Covers centres (0.5..=2.5, 1.5) only: a 3x1 strip on row 1.
        let rings = vec![vec![0.2, 1.2, 2.9, 1.2, 2.9, 1.9, 0.2, 1.9]];
        let mask = to_mask(&rings, ImageSize::new(4, 4));
        assert_eq!(mask.area(), 3);
        assert!(mask.get(1, 0) && mask.get(1, 1) && mask.get(1, 2));
        assert!(!mask.get(1, 3));
    }

    #[test]
    fn test_rasterize_clips_to_image() {
        let rings = vec![vec![-5.0, -5.0, 2.0, -5.0, 2.0, 2.0, -5.0, 2.0]];
        let mask = to_mask(&rings, ImageSize::new(4, 4));
        assert_eq!(mask.area(), 4);
        assert_eq!(mask.bounds(), Some([0.0, 0.0, 2.0, 2.0]));
    }

    #[test]
    fn test_rings_combine_by_union() {
        let rings = vec![
            vec![0.0, 0.0, 2.0, 0.0, 2.0, 2.0, 0.0, 2.0],
            vec![1.0, 1.0, 3.0, 1.0, 3.0, 3.0, 1.0, 3.0],
        ];
        let mask = to_mask(&rings, ImageSize::new(4, 4));
        assert_eq!(mask.area(), 7);
    }
}
