//! Boolean raster masks and boundary tracing.

use std::collections::VecDeque;

use super::size::ImageSize;
use super::Polygons;
use crate::error::GeometryError;

/// An H×W raster of foreground/background pixels, stored row-major.
#[derive(Clone, PartialEq, Eq)]
pub struct Mask {
    size: ImageSize,
    pixels: Vec<bool>,
}

impl Mask {
    /// Creates an all-background mask.
    pub fn new(size: ImageSize) -> Self {
        Self {
            size,
            pixels: vec![false; size.pixel_count() as usize],
        }
    }

    /// Creates an all-foreground mask.
    pub fn full(size: ImageSize) -> Self {
        Self {
            size,
            pixels: vec![true; size.pixel_count() as usize],
        }
    }

    /// Wraps a row-major pixel buffer.
    ///
    /// # Errors
    /// Returns [`GeometryError::MaskSize`] if `pixels.len() != H * W`.
    pub fn from_vec(size: ImageSize, pixels: Vec<bool>) -> Result<Self, GeometryError> {
        if pixels.len() as u64 != size.pixel_count() {
            return Err(GeometryError::MaskSize {
                len: pixels.len(),
                height: size.height,
                width: size.width,
            });
        }
        Ok(Self { size, pixels })
    }

    /// Builds a mask by evaluating `f(row, col)` for every pixel.
    pub fn from_fn(size: ImageSize, mut f: impl FnMut(u32, u32) -> bool) -> Self {
        let mut pixels = Vec::with_capacity(size.pixel_count() as usize);
        for row in 0..size.height {
            for col in 0..size.width {
                pixels.push(f(row, col));
            }
        }
        Self { size, pixels }
    }

    #[inline]
    pub fn size(&self) -> ImageSize {
        self.size
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.size.height
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.size.width
    }

    /// Row-major pixel buffer.
    #[inline]
    pub fn pixels(&self) -> &[bool] {
        &self.pixels
    }

    /// Returns the pixel at `(row, col)`; out-of-range pixels are background.
    #[inline]
    pub fn get(&self, row: u32, col: u32) -> bool {
        row < self.size.height && col < self.size.width && self.pixels[self.index(row, col)]
    }

    #[inline]
    pub fn set(&mut self, row: u32, col: u32, value: bool) {
        let idx = self.index(row, col);
        self.pixels[idx] = value;
    }

    #[inline]
    fn index(&self, row: u32, col: u32) -> usize {
        row as usize * self.size.width as usize + col as usize
    }

    /// Number of foreground pixels.
    pub fn area(&self) -> u64 {
        self.pixels.iter().filter(|&&p| p).count() as u64
    }

    /// Minimal XYWH box covering every foreground pixel, or `None` for an
    /// empty mask.
    pub fn bounds(&self) -> Option<[f64; 4]> {
        let (mut min_row, mut min_col) = (u32::MAX, u32::MAX);
        let (mut max_row, mut max_col) = (0u32, 0u32);
        let mut any = false;

        for row in 0..self.size.height {
            for col in 0..self.size.width {
                if self.pixels[self.index(row, col)] {
                    any = true;
                    min_row = min_row.min(row);
                    max_row = max_row.max(row);
                    min_col = min_col.min(col);
                    max_col = max_col.max(col);
                }
            }
        }

        any.then(|| {
            [
                min_col as f64,
                min_row as f64,
                (max_col - min_col + 1) as f64,
                (max_row - min_row + 1) as f64,
            ]
        })
    }

    /// Traces every 4-connected foreground component into one ring.
    ///
    /// Rings follow pixel edges, so their vertices sit on pixel corners. The
    /// outer boundary runs clockwise from the top-left corner of the
    /// component's first pixel. Each hole (an 8-connected background region
    /// the component encloses) is traced the opposite way and spliced in
    /// through an axis-aligned bridge walked once in each direction. The
    /// even-odd rule then rasterizes every ring back to exactly its
    /// component, and its shoelace area equals the pixel count. Components
    /// come out in row-major order of their first pixel.
    pub fn to_polygons(&self) -> Polygons {
        let foreground = self.label_components(true, &FOUR_NEIGHBORS);
        let background = self.label_components(false, &EIGHT_NEIGHBORS);

        let mut holes: Vec<Vec<(u32, u32)>> = vec![Vec::new(); foreground.firsts.len()];
        for (label, &(row, col)) in background.firsts.iter().enumerate() {
            if background.touches_border[label] {
                continue;
            }
            // The pixel above an enclosed region's first pixel belongs to the
            // component around it.
            let Some(above) = row.checked_sub(1) else {
                continue;
            };
            if let Some(owner) = foreground.labels[self.index(above, col)] {
                holes[owner].push((row, col));
            }
        }

        let rings: Polygons = foreground
            .firsts
            .iter()
            .zip(&holes)
            .map(|(&(row, col), enclosed)| {
                let outer = self.trace_boundary((col as i64, row as i64, Direction::Right));
                enclosed.iter().fold(outer, |ring, &(hole_row, hole_col)| {
                    let hole =
                        self.trace_boundary((hole_col as i64, hole_row as i64, Direction::Down));
                    splice_hole(ring, &hole)
                })
            })
            .collect();

        tracing::trace!(
            rings = rings.len(),
            holes = holes.iter().map(Vec::len).sum::<usize>(),
            "traced mask boundaries"
        );
        rings
    }

    /// Labels the connected regions of pixels equal to `value`, scanning in
    /// row-major order so labels follow the order of each region's first
    /// pixel.
    fn label_components(&self, value: bool, neighbors: &[(i64, i64)]) -> Components {
        let mut components = Components {
            labels: vec![None; self.pixels.len()],
            firsts: Vec::new(),
            touches_border: Vec::new(),
        };
        let mut queue = VecDeque::new();

        for row in 0..self.size.height {
            for col in 0..self.size.width {
                let idx = self.index(row, col);
                if self.pixels[idx] != value || components.labels[idx].is_some() {
                    continue;
                }
                let label = components.firsts.len();
                let mut touches_border = false;
                components.labels[idx] = Some(label);
                queue.push_back((row, col));

                while let Some((r, c)) = queue.pop_front() {
                    for &(dr, dc) in neighbors {
                        let (nr, nc) = (r as i64 + dr, c as i64 + dc);
                        let (Ok(nr), Ok(nc)) = (u32::try_from(nr), u32::try_from(nc)) else {
                            touches_border = true;
                            continue;
                        };
                        if nr >= self.size.height || nc >= self.size.width {
                            touches_border = true;
                            continue;
                        }
                        let n_idx = self.index(nr, nc);
                        if self.pixels[n_idx] == value && components.labels[n_idx].is_none() {
                            components.labels[n_idx] = Some(label);
                            queue.push_back((nr, nc));
                        }
                    }
                }

                components.firsts.push((row, col));
                components.touches_border.push(touches_border);
            }
        }

        components
    }

    /// Foreground test on signed pixel coordinates (`x` = column, `y` = row).
    fn is_foreground(&self, x: i64, y: i64) -> bool {
        match (u32::try_from(x), u32::try_from(y)) {
            (Ok(col), Ok(row)) => self.get(row, col),
            _ => false,
        }
    }

    /// True if the pixel edge leaving corner `(x, y)` in direction `dir`
    /// separates a foreground pixel (on its right) from background.
    fn is_boundary_edge(&self, x: i64, y: i64, dir: Direction) -> bool {
        let (inside, outside) = match dir {
            Direction::Right => ((x, y), (x, y - 1)),
            Direction::Down => ((x - 1, y), (x, y)),
            Direction::Left => ((x - 1, y - 1), (x - 1, y)),
            Direction::Up => ((x, y - 1), (x - 1, y - 1)),
        };
        self.is_foreground(inside.0, inside.1) && !self.is_foreground(outside.0, outside.1)
    }

    /// Follows a boundary cycle with foreground on the right until it comes
    /// back to `start`, which must be a corner of that cycle. Outer
    /// boundaries start on the top edge of a component's first pixel and run
    /// clockwise; hole boundaries start down the left edge of the hole's
    /// first pixel and run counter-clockwise. Turning right first at shared
    /// corners keeps diagonal foreground neighbours apart, matching
    /// 4-connectivity.
    fn trace_boundary(&self, start: (i64, i64, Direction)) -> Vec<f64> {
        let (mut x, mut y, mut dir) = start;
        let mut ring = vec![x as f64, y as f64];

        loop {
            let (dx, dy) = dir.delta();
            let (nx, ny) = (x + dx, y + dy);

            let Some(next) = [dir.turn_right(), dir, dir.turn_left()]
                .into_iter()
                .find(|&candidate| self.is_boundary_edge(nx, ny, candidate))
            else {
                break;
            };

            if (nx, ny, next) == start {
                break;
            }
            if next != dir {
                ring.push(nx as f64);
                ring.push(ny as f64);
            }
            (x, y, dir) = (nx, ny, next);
        }

        ring
    }
}

const FOUR_NEIGHBORS: [(i64, i64); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
const EIGHT_NEIGHBORS: [(i64, i64); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Connected regions of one pixel value.
struct Components {
    labels: Vec<Option<usize>>,
    /// First pixel `(row, col)` of each region, in row-major order.
    firsts: Vec<(u32, u32)>,
    touches_border: Vec<bool>,
}

/// Joins `hole` into `ring` with a bridge from the ring's first vertex to
/// the hole's first vertex: horizontal along the ring's top row, then
/// vertical. Both legs are walked there and back, so they cancel in the
/// shoelace sum and cross every scanline an even number of times.
fn splice_hole(mut ring: Vec<f64>, hole: &[f64]) -> Vec<f64> {
    let (start_x, start_y) = (ring[0], ring[1]);
    let (hole_x, hole_y) = (hole[0], hole[1]);
    let elbow = [hole_x, start_y];

    push_vertex(&mut ring, [start_x, start_y]);
    push_vertex(&mut ring, elbow);
    for vertex in hole.chunks_exact(2) {
        push_vertex(&mut ring, [vertex[0], vertex[1]]);
    }
    push_vertex(&mut ring, [hole_x, hole_y]);
    push_vertex(&mut ring, elbow);
    // The implicit closing edge runs from the elbow back to the ring start.
    if ring.len() > 2 && ring[ring.len() - 2..] == [start_x, start_y] {
        ring.truncate(ring.len() - 2);
    }
    ring
}

/// Appends a vertex unless it repeats the previous one.
fn push_vertex(ring: &mut Vec<f64>, vertex: [f64; 2]) {
    if ring[ring.len() - 2..] != vertex {
        ring.extend_from_slice(&vertex);
    }
}

impl std::fmt::Debug for Mask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mask")
            .field("height", &self.size.height)
            .field("width", &self.size.width)
            .field("area", &self.area())
            .finish()
    }
}

/// Travel direction along pixel edges, in image coordinates (y grows down).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Direction {
    Right,
    Down,
    Left,
    Up,
}

impl Direction {
    fn delta(self) -> (i64, i64) {
        match self {
            Direction::Right => (1, 0),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Up => (0, -1),
        }
    }

    fn turn_right(self) -> Self {
        match self {
            Direction::Right => Direction::Down,
            Direction::Down => Direction::Left,
            Direction::Left => Direction::Up,
            Direction::Up => Direction::Right,
        }
    }

    fn turn_left(self) -> Self {
        match self {
            Direction::Right => Direction::Up,
            Direction::Up => Direction::Left,
            Direction::Left => Direction::Down,
            Direction::Down => Direction::Right,
        }
    }
}
