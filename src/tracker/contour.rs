//! External contour extraction from a binary mask.
//!
//! Each 8-connected foreground component that is not nested inside a hole
//! of another component yields one contour: its outer border, with
//! straight runs compressed to their end points.

use imageproc::contours::{self, BorderType};
use nalgebra::Point2;

use super::Mask;

/// Closed boundary polygon of a foreground region, vertices at pixel centres.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contour {
    points: Vec<Point2<i32>>,
}

/// Spatial moments up to first order.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Moments {
    pub m00: f64,
    pub m10: f64,
    pub m01: f64,
}

impl Moments {
    /// Area-weighted centre, or `None` for a zero-area (degenerate) region.
    pub fn centroid(&self) -> Option<Point2<f64>> {
        if self.m00.abs() <= f64::EPSILON {
            return None;
        }
        Some(Point2::new(self.m10 / self.m00, self.m01 / self.m00))
    }
}

impl Contour {
    pub fn new(points: Vec<Point2<i32>>) -> Self {
        Self { points }
    }

    /// Vertices in border-following order; `x` is the column, `y` the row.
    pub fn points(&self) -> &[Point2<i32>] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Enclosed polygon area. Zero for single pixels and one-pixel-wide lines.
    pub fn area(&self) -> f64 {
        self.moments().m00
    }

    /// Polygon moments via Green's theorem, oriented so that `m00 >= 0`.
    pub fn moments(&self) -> Moments {
        let n = self.points.len();
        if n < 3 {
            return Moments::default();
        }

        let mut a00 = 0.0;
        let mut a10 = 0.0;
        let mut a01 = 0.0;
        let mut prev = self.points[n - 1];
        for &cur in &self.points {
            let (x0, y0) = (prev.x as f64, prev.y as f64);
            let (x1, y1) = (cur.x as f64, cur.y as f64);
            let dxy = x0 * y1 - x1 * y0;
            a00 += dxy;
            a10 += dxy * (x0 + x1);
            a01 += dxy * (y0 + y1);
            prev = cur;
        }

        let sign = if a00 < 0.0 { -1.0 } else { 1.0 };
        Moments {
            m00: sign * a00 * 0.5,
            m10: sign * a10 / 6.0,
            m01: sign * a01 / 6.0,
        }
    }
}

/// Extract the external contours of `mask`, in raster order of each
/// component's top-left pixel.
pub fn find_external_contours(mask: &Mask) -> Vec<Contour> {
    if mask.width() == 0 || mask.height() == 0 {
        return Vec::new();
    }

    contours::find_contours::<i32>(mask)
        .into_iter()
        .filter(|c| matches!(c.border_type, BorderType::Outer) && c.parent.is_none())
        .map(|c| {
            let points = c.points.iter().map(|p| Point2::new(p.x, p.y)).collect();
            Contour::new(compress_runs(points))
        })
        .collect()
}

/// Drop vertices in the middle of straight runs.
fn compress_runs(points: Vec<Point2<i32>>) -> Vec<Point2<i32>> {
    let n = points.len();
    if n < 3 {
        return points;
    }
    (0..n)
        .filter(|&i| {
            let prev = points[(i + n - 1) % n];
            let next = points[(i + 1) % n];
            points[i] - prev != next - points[i]
        })
        .map(|i| points[i])
        .collect()
}
