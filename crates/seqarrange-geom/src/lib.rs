#![warn(missing_docs)]

//! 2D geometry primitives for the sequential-print arranger.
//!
//! Thin wrappers around nalgebra providing the planar types the
//! arranger works with: points, vectors, polygons, axis-aligned boxes,
//! convex pieces with overlap tests, and height-keyed shape maps.
//! All lengths are millimetres.

use nalgebra::Vector2;

pub mod bbox;
pub mod convex;
pub mod decimate;
pub mod error;
pub mod height_map;
pub mod polygon;
pub mod triangulate;

pub use bbox::BoundingBox;
pub use convex::{minkowski_sum, ConvexPiece};
pub use decimate::decimate_conservative;
pub use error::{GeomError, Result};
pub use height_map::HeightMap;
pub use polygon::{convex_hull, Polygon};
pub use triangulate::triangulate;

/// A point in the plate plane.
pub type Point2 = nalgebra::Point2<f64>;

/// A vector (translation) in the plate plane.
pub type Vec2 = Vector2<f64>;

/// Tolerance constants for geometric comparisons.
#[derive(Debug, Clone, Copy)]
pub struct Tolerance {
    /// Linear distance tolerance in mm.
    pub linear: f64,
    /// Area tolerance in mm².
    pub area: f64,
}

impl Tolerance {
    /// Default tolerances (1e-6 mm linear, 1e-9 mm² area).
    pub const DEFAULT: Self = Self {
        linear: 1e-6,
        area: 1e-9,
    };

    /// Check if two points are coincident within tolerance.
    pub fn points_equal(&self, a: &Point2, b: &Point2) -> bool {
        (a - b).norm() < self.linear
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Z component of `(a - o) × (b - o)`.
///
/// Positive when `o → a → b` turns counter-clockwise.
#[inline]
pub fn cross(o: &Point2, a: &Point2, b: &Point2) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cross_orientation() {
        let o = Point2::origin();
        let a = Point2::new(1.0, 0.0);
        let b = Point2::new(0.0, 1.0);
        assert!(cross(&o, &a, &b) > 0.0);
        assert!(cross(&o, &b, &a) < 0.0);
        assert_eq!(cross(&o, &a, &Point2::new(2.0, 0.0)), 0.0);
    }

    #[test]
    fn test_tolerance_points_equal() {
        let tol = Tolerance::DEFAULT;
        let a = Point2::new(1.0, 2.0);
        assert!(tol.points_equal(&a, &Point2::new(1.0 + 1e-7, 2.0)));
        assert!(!tol.points_equal(&a, &Point2::new(1.001, 2.0)));
    }
}
