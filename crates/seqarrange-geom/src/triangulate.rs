//! Convex decomposition of simple polygons by ear clipping.

use crate::convex::ConvexPiece;
use crate::error::{GeomError, Result};
use crate::polygon::Polygon;
use crate::{cross, Point2, Tolerance};

/// Split a simple polygon into convex pieces.
///
/// A convex polygon comes back as a single piece; anything else is
/// ear-clipped into triangles.
pub fn triangulate(polygon: &Polygon) -> Result<Vec<ConvexPiece>> {
    if polygon.is_degenerate() {
        return Err(GeomError::DegeneratePolygon(format!(
            "{} vertices, area {:.3e}",
            polygon.len(),
            polygon.area()
        )));
    }

    if polygon.is_convex() {
        return Ok(ConvexPiece::from_points(&polygon.points).into_iter().collect());
    }

    let mut ring = cleaned_ring(polygon);
    let eps = Tolerance::DEFAULT.area;
    let mut pieces = Vec::with_capacity(ring.len().saturating_sub(2));

    while ring.len() > 3 {
        let n = ring.len();
        let mut clipped = false;

        for i in 0..n {
            let prev = ring[(i + n - 1) % n];
            let cur = ring[i];
            let next = ring[(i + 1) % n];

            if cross(&prev, &cur, &next) <= eps {
                continue; // reflex or flat
            }

            let blocked = ring.iter().enumerate().any(|(j, p)| {
                j != i
                    && j != (i + n - 1) % n
                    && j != (i + 1) % n
                    && point_in_triangle(p, &prev, &cur, &next)
            });
            if blocked {
                continue;
            }

            if let Some(piece) = ConvexPiece::from_points(&[prev, cur, next]) {
                pieces.push(piece);
            }
            ring.remove(i);
            clipped = true;
            break;
        }

        if !clipped {
            return Err(GeomError::TriangulationFailed(pieces.len()));
        }
    }

    if let Some(piece) = ConvexPiece::from_points(&ring) {
        pieces.push(piece);
    }
    Ok(pieces)
}

/// Counter-clockwise vertex ring without repeated or collinear vertices.
fn cleaned_ring(polygon: &Polygon) -> Vec<Point2> {
    let mut poly = polygon.clone();
    poly.ensure_ccw();

    let tol = Tolerance::DEFAULT;
    let mut ring: Vec<Point2> = Vec::with_capacity(poly.len());
    for p in &poly.points {
        if ring.last().map_or(true, |last| !tol.points_equal(last, p)) {
            ring.push(*p);
        }
    }
    while ring.len() > 1 && tol.points_equal(&ring[0], &ring[ring.len() - 1]) {
        ring.pop();
    }

    let mut i = 0;
    while ring.len() > 3 && i < ring.len() {
        let n = ring.len();
        let c = cross(&ring[(i + n - 1) % n], &ring[i], &ring[(i + 1) % n]);
        if c.abs() <= tol.area {
            ring.remove(i);
        } else {
            i += 1;
        }
    }
    ring
}

/// Is `p` inside or on the boundary of the counter-clockwise triangle `abc`?
fn point_in_triangle(p: &Point2, a: &Point2, b: &Point2, c: &Point2) -> bool {
    let eps = Tolerance::DEFAULT.area;
    cross(a, b, p) >= -eps && cross(b, c, p) >= -eps && cross(c, a, p) >= -eps
}
