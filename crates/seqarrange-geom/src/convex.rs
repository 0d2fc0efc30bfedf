//! Convex pieces and their overlap tests.
//!
//! Every shape the arranger reasons about is a union of convex pieces:
//! a box, a single hull, or the triangles of an exact outline. Overlap is
//! decided with the separating-axis theorem; pieces that only touch do not
//! overlap.

use serde::{Deserialize, Serialize};

use crate::bbox::BoundingBox;
use crate::polygon::{convex_hull, Polygon};
use crate::{Point2, Tolerance, Vec2};

/// A convex polygon (counter-clockwise) with its cached bounding box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvexPiece {
    points: Vec<Point2>,
    bbox: BoundingBox,
}

impl ConvexPiece {
    /// Convex hull of `points` as a piece, `None` if it has no area.
    pub fn from_points(points: &[Point2]) -> Option<Self> {
        let hull = convex_hull(points);
        if hull.len() < 3 {
            return None;
        }
        let bbox = BoundingBox::from_points(&hull)?;
        Some(Self { points: hull, bbox })
    }

    /// The rectangle of a bounding box as a piece.
    pub fn from_box(bbox: &BoundingBox) -> Self {
        Self {
            points: bbox.to_polygon().points,
            bbox: *bbox,
        }
    }

    /// Hull vertices, counter-clockwise.
    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    /// Cached bounding box.
    pub fn bounding_box(&self) -> &BoundingBox {
        &self.bbox
    }

    /// The piece as a plain polygon.
    pub fn to_polygon(&self) -> Polygon {
        Polygon::new(self.points.clone())
    }

    /// Does this piece overlap `other` translated by `offset`?
    pub fn overlaps(&self, other: &ConvexPiece, offset: &Vec2) -> bool {
        if !self.bbox.overlaps_offset(&other.bbox, offset) {
            return false;
        }
        !has_separating_axis(&self.points, &other.points, offset)
            && !has_separating_axis(&other.points, &self.points, &-offset)
    }
}

/// Is one of `a`'s edge normals a separating axis between `a` and `b + offset`?
fn has_separating_axis(a: &[Point2], b: &[Point2], offset: &Vec2) -> bool {
    let n = a.len();
    let eps = Tolerance::DEFAULT.linear;
    for i in 0..n {
        let p = a[i];
        let q = a[(i + 1) % n];
        let edge = q - p;
        let len = edge.norm();
        if len < eps {
            continue;
        }
        // Outward normal of a counter-clockwise edge
        let normal = Vec2::new(edge.y, -edge.x) / len;

        let a_max = a
            .iter()
            .map(|v| v.coords.dot(&normal))
            .fold(f64::NEG_INFINITY, f64::max);
        let b_min = b
            .iter()
            .map(|v| (v.coords + offset).dot(&normal))
            .fold(f64::INFINITY, f64::min);

        if b_min >= a_max - eps {
            return true;
        }
    }
    false
}

/// Minkowski sum of two convex pieces.
pub fn minkowski_sum(a: &ConvexPiece, b: &ConvexPiece) -> ConvexPiece {
    let mut sums = Vec::with_capacity(a.points.len() * b.points.len());
    for p in &a.points {
        for q in &b.points {
            sums.push(p + q.coords);
        }
    }
    // The sum of two pieces with area always has area.
    ConvexPiece::from_points(&sums).unwrap_or_else(|| {
        let bbox = a.bbox.minkowski_sum(&b.bbox);
        ConvexPiece::from_box(&bbox)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> ConvexPiece {
        ConvexPiece::from_box(&BoundingBox::from_extents(x0, y0, x1, y1))
    }

    fn triangle(coords: &[(f64, f64)]) -> ConvexPiece {
        let pts: Vec<Point2> = coords.iter().map(|&(x, y)| Point2::new(x, y)).collect();
        ConvexPiece::from_points(&pts).unwrap()
    }

    #[test]
    fn test_overlap_with_offset() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let b = rect(0.0, 0.0, 5.0, 5.0);
        assert!(a.overlaps(&b, &Vec2::new(2.0, 2.0)));
        assert!(!a.overlaps(&b, &Vec2::new(10.0, 0.0)));
        assert!(!a.overlaps(&b, &Vec2::new(20.0, 20.0)));
    }

    #[test]
    fn test_diagonal_separation_needs_sat() {
        // Bounding boxes overlap but the hypotenuse separates the triangles.
        let a = triangle(&[(0.0, 0.0), (10.0, 0.0), (0.0, 10.0)]);
        let b = triangle(&[(10.0, 10.0), (10.0, 4.0), (4.0, 10.0)]);
        assert!(a.bounding_box().overlaps(b.bounding_box()));
        assert!(!a.overlaps(&b, &Vec2::zeros()));
        assert!(a.overlaps(&b, &Vec2::new(-3.0, -3.0)));
    }

    #[test]
    fn test_minkowski_sum_of_squares() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let b = rect(-1.0, -1.0, 1.0, 1.0);
        let sum = minkowski_sum(&a, &b);
        assert_relative_eq!(sum.to_polygon().area(), 144.0);
        assert_eq!(sum.points().len(), 4);
        assert_relative_eq!(sum.bounding_box().min.x, -1.0);
    }

    #[test]
    fn test_degenerate_points_rejected() {
        let line = [Point2::new(0.0, 0.0), Point2::new(1.0, 1.0), Point2::new(2.0, 2.0)];
        assert!(ConvexPiece::from_points(&line).is_none());
    }
}
