//! Conservative polygon decimation.
//!
//! The arranger's fast passes work on simplified outlines. Simplification
//! must never shrink an outline, otherwise a placement accepted on the
//! simplified shape could collide on the real one. The decimated shape is
//! therefore a convex polygon with fewer vertices that contains the input.

use crate::polygon::{convex_hull, Polygon};
use crate::{cross, Point2, Tolerance, Vec2};

/// Decimate `polygon` into a convex outline containing it.
///
/// Hull vertices closer than `tolerance` to the chord of their neighbours
/// are dropped, then the remaining hull is pushed outward far enough to
/// cover every dropped vertex. A non-positive tolerance yields the plain
/// convex hull.
pub fn decimate_conservative(polygon: &Polygon, tolerance: f64) -> Polygon {
    let hull = convex_hull(&polygon.points);
    if tolerance <= 0.0 || hull.len() <= 3 {
        return Polygon::new(hull);
    }

    // Walk the hull keeping a vertex only when the chord from the last kept
    // vertex would pass farther than `tolerance` from a skipped one.
    let n = hull.len();
    let mut kept = vec![0usize];
    let mut anchor = 0;
    while anchor < n {
        let mut end = anchor + 1;
        while end < n
            && (anchor + 1..=end)
                .all(|k| distance_to_line(&hull[k], &hull[anchor], &hull[(end + 1) % n]) < tolerance)
        {
            end += 1;
        }
        if end >= n {
            break;
        }
        kept.push(end);
        anchor = end;
    }

    if kept.len() < 3 || kept.len() == n {
        return Polygon::new(hull);
    }
    let simplified: Vec<Point2> = kept.iter().map(|&i| hull[i]).collect();

    let spill = hull
        .iter()
        .map(|v| max_edge_excess(&simplified, v))
        .fold(0.0, f64::max);

    if spill <= Tolerance::DEFAULT.linear {
        return Polygon::new(simplified);
    }
    Polygon::new(offset_convex(&simplified, spill))
}

/// Perpendicular distance from `p` to the infinite line through `a` and `b`.
fn distance_to_line(p: &Point2, a: &Point2, b: &Point2) -> f64 {
    let len = (b - a).norm();
    if len < Tolerance::DEFAULT.linear {
        return (p - a).norm();
    }
    cross(a, b, p).abs() / len
}

/// Largest signed distance of `p` outside any edge line of a CCW convex ring.
fn max_edge_excess(ring: &[Point2], p: &Point2) -> f64 {
    let n = ring.len();
    (0..n)
        .filter_map(|i| {
            let (normal, c) = outward_line(&ring[i], &ring[(i + 1) % n])?;
            Some(p.coords.dot(&normal) - c)
        })
        .fold(f64::NEG_INFINITY, f64::max)
}

/// Unit outward normal `n` and offset `c` with `n·x = c` on the edge `a → b`.
fn outward_line(a: &Point2, b: &Point2) -> Option<(Vec2, f64)> {
    let edge = b - a;
    let len = edge.norm();
    if len < Tolerance::DEFAULT.linear {
        return None;
    }
    let normal = Vec2::new(edge.y, -edge.x) / len;
    Some((normal, a.coords.dot(&normal)))
}

/// Mitered outward offset of a CCW convex ring by `distance`.
fn offset_convex(ring: &[Point2], distance: f64) -> Vec<Point2> {
    let n = ring.len();
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let a = ring[i];
        let b = ring[(i + 1) % n];
        let c = ring[(i + 2) % n];
        let (Some((n1, c1)), Some((n2, c2))) = (outward_line(&a, &b), outward_line(&b, &c)) else {
            out.push(b);
            continue;
        };
        let (c1, c2) = (c1 + distance, c2 + distance);
        let det = n1.x * n2.y - n1.y * n2.x;
        if det.abs() < 1e-12 {
            out.push(b + n1 * distance);
            continue;
        }
        let x = (c1 * n2.y - n1.y * c2) / det;
        let y = (n1.x * c2 - c1 * n2.x) / det;
        out.push(Point2::new(x, y));
    }
    // Keep the vertex that closes edge (n-1 → 0) first, matching input order.
    out.rotate_right(1);
    out
}
