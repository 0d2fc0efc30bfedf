//! Axis-aligned bounding boxes.

use serde::{Deserialize, Serialize};

use crate::polygon::Polygon;
use crate::{Point2, Tolerance, Vec2};

/// An axis-aligned rectangle given by its min and max corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Lower-left corner.
    pub min: Point2,
    /// Upper-right corner.
    pub max: Point2,
}

impl BoundingBox {
    /// Create a box from its corners.
    pub fn new(min: Point2, max: Point2) -> Self {
        Self { min, max }
    }

    /// Box spanning `[x0, x1] × [y0, y1]`.
    pub fn from_extents(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            min: Point2::new(x0.min(x1), y0.min(y1)),
            max: Point2::new(x0.max(x1), y0.max(y1)),
        }
    }

    /// Smallest box containing all points, or `None` for an empty input.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point2>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        let mut bbox = Self::new(first, first);
        for p in iter {
            bbox.include(p);
        }
        Some(bbox)
    }

    /// Grow the box to contain `p`.
    pub fn include(&mut self, p: &Point2) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
    }

    /// Smallest box containing both boxes.
    pub fn union(&self, other: &BoundingBox) -> Self {
        Self {
            min: Point2::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Point2::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    /// The box moved by `offset`.
    pub fn translated(&self, offset: &Vec2) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// Width along X.
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// Height along Y.
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Enclosed area.
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Center point.
    pub fn center(&self) -> Point2 {
        Point2::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
        )
    }

    /// Do the interiors of the two boxes overlap?
    ///
    /// Boxes that merely touch along an edge do not overlap.
    pub fn overlaps(&self, other: &BoundingBox) -> bool {
        self.overlaps_offset(other, &Vec2::zeros())
    }

    /// Does this box overlap `other` translated by `offset`?
    pub fn overlaps_offset(&self, other: &BoundingBox, offset: &Vec2) -> bool {
        let eps = Tolerance::DEFAULT.linear;
        self.min.x < other.max.x + offset.x - eps
            && other.min.x + offset.x < self.max.x - eps
            && self.min.y < other.max.y + offset.y - eps
            && other.min.y + offset.y < self.max.y - eps
    }

    /// Is `other` inside this box (boundary inclusive)?
    pub fn contains(&self, other: &BoundingBox) -> bool {
        let eps = Tolerance::DEFAULT.linear;
        other.min.x >= self.min.x - eps
            && other.min.y >= self.min.y - eps
            && other.max.x <= self.max.x + eps
            && other.max.y <= self.max.y + eps
    }

    /// Minkowski sum of two boxes.
    pub fn minkowski_sum(&self, other: &BoundingBox) -> Self {
        Self {
            min: Point2::new(self.min.x + other.min.x, self.min.y + other.min.y),
            max: Point2::new(self.max.x + other.max.x, self.max.y + other.max.y),
        }
    }

    /// The four corners as a counter-clockwise polygon.
    pub fn to_polygon(&self) -> Polygon {
        Polygon::new(vec![
            self.min,
            Point2::new(self.max.x, self.min.y),
            self.max,
            Point2::new(self.min.x, self.max.y),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_from_points() {
        let pts = [
            Point2::new(1.0, 5.0),
            Point2::new(-2.0, 3.0),
            Point2::new(4.0, -1.0),
        ];
        let bbox = BoundingBox::from_points(&pts).unwrap();
        assert_eq!(bbox.min, Point2::new(-2.0, -1.0));
        assert_eq!(bbox.max, Point2::new(4.0, 5.0));
        assert_relative_eq!(bbox.area(), 36.0);
        assert!(BoundingBox::from_points(&Vec::<Point2>::new()).is_none());
    }

    #[test]
    fn test_touching_boxes_do_not_overlap() {
        let a = BoundingBox::from_extents(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::from_extents(10.0, 0.0, 20.0, 10.0);
        assert!(!a.overlaps(&b));
        assert!(a.overlaps_offset(&b, &Vec2::new(-0.5, 0.0)));
        assert!(!a.overlaps_offset(&b, &Vec2::new(0.0, 10.0)));
    }

    #[test]
    fn test_minkowski_and_contains() {
        let a = BoundingBox::from_extents(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::from_extents(-1.0, -2.0, 1.0, 2.0);
        let sum = a.minkowski_sum(&b);
        assert_eq!(sum, BoundingBox::from_extents(-1.0, -2.0, 11.0, 12.0));
        assert!(sum.contains(&a));
        assert!(!a.contains(&sum));
        assert_relative_eq!(a.to_polygon().signed_area(), 100.0);
    }
}
