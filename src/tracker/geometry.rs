//! Minimum enclosing circle and supporting planar geometry.

use nalgebra::Point2;

const CONTAINS_EPS: f64 = 1e-7;

/// Circle in pixel coordinates (`x` = column, `y` = row).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: Point2<f64>,
    pub radius: f64,
}

impl Circle {
    #[inline]
    pub fn new(center: Point2<f64>, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Smallest circle through two points (they lie on a diameter).
    fn from_diameter(a: Point2<f64>, b: Point2<f64>) -> Self {
        let center = nalgebra::center(&a, &b);
        Self::new(center, (a - center).norm())
    }

    /// Circle through three points; falls back to the widest pair when they are collinear.
    fn circumscribe(a: Point2<f64>, b: Point2<f64>, c: Point2<f64>) -> Self {
        let ab = b - a;
        let ac = c - a;
        let d = 2.0 * (ab.x * ac.y - ab.y * ac.x);
        if d.abs() < 1e-12 {
            return [
                Self::from_diameter(a, b),
                Self::from_diameter(a, c),
                Self::from_diameter(b, c),
            ]
            .into_iter()
            .fold(Self::from_diameter(a, b), |best, cand| {
                if cand.radius > best.radius { cand } else { best }
            });
        }
        let ab2 = ab.norm_squared();
        let ac2 = ac.norm_squared();
        let ux = (ac.y * ab2 - ab.y * ac2) / d;
        let uy = (ab.x * ac2 - ac.x * ab2) / d;
        let center = Point2::new(a.x + ux, a.y + uy);
        Self::new(center, (a - center).norm())
    }

    /// Whether `p` lies inside or on the circle, up to a small tolerance.
    #[inline]
    pub fn contains(&self, p: &Point2<f64>) -> bool {
        (p - self.center).norm() <= self.radius + CONTAINS_EPS * self.radius.max(1.0)
    }
}

fn cross(o: &Point2<f64>, a: &Point2<f64>, b: &Point2<f64>) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

/// Convex hull by Andrew's monotone chain, counterclockwise, without collinear points.
pub(crate) fn convex_hull(points: &[Point2<f64>]) -> Vec<Point2<f64>> {
    let mut pts = points.to_vec();
    pts.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    pts.dedup();
    if pts.len() < 3 {
        return pts;
    }

    let mut hull: Vec<Point2<f64>> = Vec::with_capacity(2 * pts.len());
    for p in pts.iter() {
        while hull.len() >= 2 && cross(&hull[hull.len() - 2], &hull[hull.len() - 1], p) <= 0.0 {
            hull.pop();
        }
        hull.push(*p);
    }
    let lower_len = hull.len() + 1;
    for p in pts.iter().rev().skip(1) {
        while hull.len() >= lower_len
            && cross(&hull[hull.len() - 2], &hull[hull.len() - 1], p) <= 0.0
        {
            hull.pop();
        }
        hull.push(*p);
    }
    hull.pop();
    hull
}

/// Smallest circle containing every point, or `None` for an empty set.
///
/// The points are first reduced to their convex hull; the incremental
/// Welzl construction then runs on the hull vertices.
pub fn min_enclosing_circle(points: &[Point2<f64>]) -> Option<Circle> {
    let hull = convex_hull(points);
    let (&first, rest) = hull.split_first()?;

    let mut circle = Circle::new(first, 0.0);
    for (i, &p) in rest.iter().enumerate() {
        if circle.contains(&p) {
            continue;
        }
        circle = Circle::new(p, 0.0);
        for (j, &q) in hull[..=i].iter().enumerate() {
            if circle.contains(&q) {
                continue;
            }
            circle = Circle::from_diameter(p, q);
            for &r in &hull[..j] {
                if !circle.contains(&r) {
                    circle = Circle::circumscribe(p, q, r);
                }
            }
        }
    }
    Some(circle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_empty_and_single() {
        assert!(min_enclosing_circle(&[]).is_none());
        let c = min_enclosing_circle(&[Point2::new(3.0, 4.0)]).unwrap();
        assert_eq!(c.center, Point2::new(3.0, 4.0));
        assert_eq!(c.radius, 0.0);
    }

    #[test]
    fn test_two_points() {
        let c = min_enclosing_circle(&[Point2::new(0.0, 0.0), Point2::new(4.0, 0.0)]).unwrap();
        assert_relative_eq!(c.center.x, 2.0);
        assert_relative_eq!(c.center.y, 0.0);
        assert_relative_eq!(c.radius, 2.0);
    }

    #[test]
    fn test_square_corners() {
        let pts = [
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(2.0, 2.0),
            Point2::new(0.0, 2.0),
            Point2::new(1.0, 1.0),
        ];
        let c = min_enclosing_circle(&pts).unwrap();
        assert_relative_eq!(c.center.x, 1.0, epsilon = 1e-9);
        assert_relative_eq!(c.center.y, 1.0, epsilon = 1e-9);
        assert_relative_eq!(c.radius, 2f64.sqrt(), epsilon = 1e-9);
    }

    #[test]
    fn test_obtuse_triangle_uses_longest_side() {
        let pts = [
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(5.0, 1.0),
        ];
        let c = min_enclosing_circle(&pts).unwrap();
        assert_relative_eq!(c.radius, 5.0, epsilon = 1e-9);
        assert_relative_eq!(c.center.x, 5.0, epsilon = 1e-9);
    }

    #[test]
    fn test_collinear_points() {
        let pts = [
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(3.0, 3.0),
        ];
        let c = min_enclosing_circle(&pts).unwrap();
        assert_relative_eq!(c.radius, 18f64.sqrt() / 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_encloses_all_points() {
        let pts: Vec<_> = (0..50)
            .map(|i| {
                let t = i as f64 * 0.7;
                Point2::new(10.0 + 7.0 * t.cos() + (i % 3) as f64, 5.0 + 4.0 * t.sin())
            })
            .collect();
        let c = min_enclosing_circle(&pts).unwrap();
        assert!(pts.iter().all(|p| c.contains(p)));
    }

    #[test]
    fn test_convex_hull_drops_interior() {
        let pts = [
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(2.0, 2.0),
            Point2::new(0.0, 2.0),
        ];
        let hull = convex_hull(&pts);
        assert_eq!(hull.len(), 4);
        assert!(!hull.contains(&Point2::new(1.0, 1.0)));
        assert!(!hull.contains(&Point2::new(1.0, 0.0)));
    }
}
