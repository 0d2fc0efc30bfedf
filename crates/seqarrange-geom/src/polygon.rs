//! Closed 2D polygons.

use geo::{ConvexHull, Coord, LineString};
use serde::{Deserialize, Serialize};

use crate::bbox::BoundingBox;
use crate::{cross, Point2, Tolerance, Vec2};

/// A 2D polygon (closed contour, last point joins the first).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Polygon {
    /// Vertices of the polygon in order.
    pub points: Vec<Point2>,
}

impl Polygon {
    /// Create a new polygon from points.
    pub fn new(points: Vec<Point2>) -> Self {
        Self { points }
    }

    /// Create a polygon from `(x, y)` pairs.
    pub fn from_coords(coords: &[(f64, f64)]) -> Self {
        Self::new(coords.iter().map(|&(x, y)| Point2::new(x, y)).collect())
    }

    /// Axis-aligned rectangle `[x0, x1] × [y0, y1]`, counter-clockwise.
    pub fn rectangle(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        BoundingBox::from_extents(x0, y0, x1, y1).to_polygon()
    }

    /// Check if the polygon is empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Signed area of the polygon.
    /// Positive for counter-clockwise, negative for clockwise.
    pub fn signed_area(&self) -> f64 {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }
        let mut area = 0.0;
        for i in 0..n {
            let j = (i + 1) % n;
            area += self.points[i].x * self.points[j].y;
            area -= self.points[j].x * self.points[i].y;
        }
        area / 2.0
    }

    /// Unsigned area.
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// Is the polygon counter-clockwise?
    pub fn is_ccw(&self) -> bool {
        self.signed_area() > 0.0
    }

    /// Fewer than three vertices or no enclosed area.
    pub fn is_degenerate(&self) -> bool {
        self.points.len() < 3 || self.area() < Tolerance::DEFAULT.area
    }

    /// Reverse the winding order.
    pub fn reverse(&mut self) {
        self.points.reverse();
    }

    /// Ensure counter-clockwise winding.
    pub fn ensure_ccw(&mut self) {
        if !self.is_ccw() {
            self.reverse();
        }
    }

    /// Bounding box, or `None` for an empty polygon.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(&self.points)
    }

    /// The polygon moved by `offset`.
    pub fn translated(&self, offset: &Vec2) -> Self {
        Self::new(self.points.iter().map(|p| p + offset).collect())
    }

    /// Is the polygon convex (any winding, collinear vertices allowed)?
    pub fn is_convex(&self) -> bool {
        let n = self.points.len();
        if n < 3 {
            return false;
        }
        let eps = Tolerance::DEFAULT.area;
        let mut sign = 0.0;
        for i in 0..n {
            let c = cross(
                &self.points[i],
                &self.points[(i + 1) % n],
                &self.points[(i + 2) % n],
            );
            if c.abs() <= eps {
                continue;
            }
            if sign == 0.0 {
                sign = c.signum();
            } else if c.signum() != sign {
                return false;
            }
        }
        sign != 0.0
    }

    /// Convex hull of the vertices.
    pub fn convex_hull(&self) -> Polygon {
        Polygon::new(convex_hull(&self.points))
    }
}

/// Convex hull of a point set.
///
/// Returns the hull counter-clockwise without collinear vertices. Inputs
/// with fewer than three distinct points are returned deduplicated; other
/// degenerate inputs yield fewer than three points.
pub fn convex_hull(points: &[Point2]) -> Vec<Point2> {
    let mut pts: Vec<Point2> = points.to_vec();
    pts.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    let tol = Tolerance::DEFAULT;
    pts.dedup_by(|a, b| tol.points_equal(a, b));

    if pts.len() < 3 {
        return pts;
    }

    let coords: Vec<Coord<f64>> = pts.iter().map(|p| Coord { x: p.x, y: p.y }).collect();
    let hull = LineString::from(coords).convex_hull();

    // Exterior ring is closed; drop the repeated first point.
    let ring = hull.exterior();
    let ring: Vec<Point2> = ring
        .coords()
        .take(ring.0.len().saturating_sub(1))
        .map(|c| Point2::new(c.x, c.y))
        .collect();

    let n = ring.len();
    let mut poly = Polygon::new(
        (0..n)
            .filter(|&i| cross(&ring[(i + n - 1) % n], &ring[i], &ring[(i + 1) % n]).abs() > tol.area)
            .map(|i| ring[i])
            .collect(),
    );
    poly.ensure_ccw();
    poly.points
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square(size: f64) -> Polygon {
        Polygon::rectangle(0.0, 0.0, size, size)
    }

    #[test]
    fn test_polygon_area() {
        let sq = square(1.0);
        assert_relative_eq!(sq.signed_area(), 1.0);
        assert!(sq.is_ccw());

        let mut cw = sq.clone();
        cw.reverse();
        assert_relative_eq!(cw.signed_area(), -1.0);
        cw.ensure_ccw();
        assert!(cw.is_ccw());
    }

    #[test]
    fn test_convex_hull_drops_interior_and_collinear() {
        let pts = vec![
            Point2::new(0.0, 0.0),
            Point2::new(5.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 10.0),
            Point2::new(5.0, 5.0),
            Point2::new(0.0, 10.0),
        ];
        let hull = convex_hull(&pts);
        assert_eq!(hull.len(), 4);
        assert!(hull.contains(&Point2::new(10.0, 10.0)));
        assert!(!hull.contains(&Point2::new(5.0, 0.0)));
        let poly = Polygon::new(hull);
        assert!(poly.is_ccw());
        assert_relative_eq!(poly.area(), 100.0);
    }

    #[test]
    fn test_convex_hull_of_degenerate_input() {
        assert!(convex_hull(&[]).is_empty());
        let twice = [Point2::new(1.0, 1.0), Point2::new(1.0, 1.0)];
        assert_eq!(convex_hull(&twice).len(), 1);
        let line = [Point2::new(0.0, 0.0), Point2::new(1.0, 1.0), Point2::new(2.0, 2.0)];
        assert!(convex_hull(&line).len() < 3);
    }

    #[test]
    fn test_is_convex() {
        assert!(square(3.0).is_convex());
        let l_shape = Polygon::from_coords(&[
            (0.0, 0.0),
            (10.0, 0.0),
            (10.0, 4.0),
            (4.0, 4.0),
            (4.0, 10.0),
            (0.0, 10.0),
        ]);
        assert!(!l_shape.is_convex());
        assert_relative_eq!(l_shape.convex_hull().area(), 100.0 - 18.0);
    }

    #[test]
    fn test_translated_and_degenerate() {
        let moved = square(2.0).translated(&Vec2::new(3.0, -1.0));
        let bbox = moved.bounding_box().unwrap();
        assert_relative_eq!(bbox.min.x, 3.0);
        assert_relative_eq!(bbox.min.y, -1.0);
        assert!(Polygon::from_coords(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)]).is_degenerate());
        assert!(Polygon::default().is_degenerate());
    }

    #[test]
    fn test_serde_round_trip_keeps_points() {
        let sq = square(4.0);
        let json = serde_json::to_string(&sq).unwrap();
        let back: Polygon = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sq);
    }
}
