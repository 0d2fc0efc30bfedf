//! Unreachable-zone construction.
//!
//! When the nozzle deposits material of an object, the extruder assembly
//! sweeps the Minkowski sum of that object's cross-section and each
//! extruder slice. Nothing printed earlier may reach into that sweep at
//! the slice's height. Zones are built at three precisions:
//!
//! - [`Precision::Box`]: bounding boxes only; cheapest and coarsest.
//! - [`Precision::Convex`]: convex hulls, with gantry slices still boxed.
//! - [`Precision::Exact`]: outlines decomposed into convex pieces.
//!
//! Coarser zones always contain finer ones, so a placement proven safe at
//! a coarse level is safe at every finer level.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use seqarrange_geom::{
    decimate_conservative, minkowski_sum, triangulate, BoundingBox, ConvexPiece, HeightMap,
    Polygon, Vec2,
};
use tracing::debug;

use crate::config::{DecimationPrecision, SolverConfiguration};
use crate::error::{Result, SequentialError};
use crate::object::ObjectToPrint;
use crate::printer::PrinterGeometry;

/// Approximation level of zones and outlines, coarse to fine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Precision {
    /// Axis-aligned bounding boxes.
    Box,
    /// Convex hulls (box slices stay boxes).
    Convex,
    /// Exact outlines as convex pieces.
    Exact,
}

impl Precision {
    /// Levels the search may escalate through for a decimation setting.
    pub fn ladder(decimation: DecimationPrecision) -> &'static [Precision] {
        match decimation {
            DecimationPrecision::Low => &[Precision::Box, Precision::Convex],
            DecimationPrecision::High => &[Precision::Box, Precision::Convex, Precision::Exact],
        }
    }
}

/// A union of convex pieces.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Shape {
    pieces: Vec<ConvexPiece>,
    bbox: Option<BoundingBox>,
}

impl Shape {
    /// Shape made of the given pieces.
    pub fn from_pieces(pieces: Vec<ConvexPiece>) -> Self {
        let bbox = pieces
            .iter()
            .map(|p| *p.bounding_box())
            .reduce(|a, b| a.union(&b));
        Self { pieces, bbox }
    }

    /// Approximate an outline at `precision`.
    ///
    /// Box and Convex outlines are decimated with `tolerance` first; the
    /// result always contains the input.
    pub fn approximate(polygon: &Polygon, precision: Precision, tolerance: f64) -> Result<Self> {
        if polygon.is_degenerate() {
            return Err(SequentialError::InvalidGeometry(format!(
                "cannot approximate a degenerate outline with {} vertices",
                polygon.len()
            )));
        }
        let pieces = match precision {
            Precision::Box => {
                let outline = decimate_conservative(polygon, tolerance);
                outline
                    .bounding_box()
                    .map(|bbox| ConvexPiece::from_box(&bbox))
                    .into_iter()
                    .collect()
            }
            Precision::Convex => {
                let outline = decimate_conservative(polygon, tolerance);
                ConvexPiece::from_points(&outline.points).into_iter().collect()
            }
            Precision::Exact => triangulate(polygon)?,
        };
        Ok(Self::from_pieces(pieces))
    }

    /// Union of the approximations of several outlines.
    pub fn approximate_all(polygons: &[Polygon], precision: Precision, tolerance: f64) -> Result<Self> {
        let mut pieces = Vec::new();
        for polygon in polygons {
            pieces.extend(Self::approximate(polygon, precision, tolerance)?.pieces);
        }
        Ok(Self::from_pieces(pieces))
    }

    /// Convex pieces making up the shape.
    pub fn pieces(&self) -> &[ConvexPiece] {
        &self.pieces
    }

    /// Bounding box, `None` for an empty shape.
    pub fn bounding_box(&self) -> Option<&BoundingBox> {
        self.bbox.as_ref()
    }

    /// Check if the shape has no pieces.
    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    /// Minkowski sum, piece by piece.
    pub fn minkowski(&self, other: &Shape) -> Shape {
        let mut pieces = Vec::with_capacity(self.pieces.len() * other.pieces.len());
        for a in &self.pieces {
            for b in &other.pieces {
                pieces.push(minkowski_sum(a, b));
            }
        }
        Shape::from_pieces(pieces)
    }

    /// Does this shape overlap `other` translated by `offset`?
    pub fn overlaps(&self, other: &Shape, offset: &Vec2) -> bool {
        let (Some(a), Some(b)) = (&self.bbox, &other.bbox) else {
            return false;
        };
        if !a.overlaps_offset(b, offset) {
            return false;
        }
        self.pieces
            .iter()
            .any(|p| other.pieces.iter().any(|q| p.overlaps(q, offset)))
    }
}

/// Extruder slices approximated at one precision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneSet {
    precision: Precision,
    slices: HeightMap<Shape>,
}

impl ZoneSet {
    /// Approximate every extruder slice of `geometry` at `precision`.
    pub fn build(geometry: &PrinterGeometry, precision: Precision) -> Result<Self> {
        let slices = geometry.extruder_slices.try_map(|height, polygons| {
            let level = match precision {
                Precision::Convex if geometry.is_box_height(height) => Precision::Box,
                other => other,
            };
            Shape::approximate_all(polygons, level, 0.0)
        })?;
        debug!(
            "Built {:?} zone set with {} slices",
            precision,
            slices.len()
        );
        Ok(Self { precision, slices })
    }

    /// Precision of this set.
    pub fn precision(&self) -> Precision {
        self.precision
    }

    /// Slice shapes keyed by height above the nozzle tip.
    pub fn slices(&self) -> &HeightMap<Shape> {
        &self.slices
    }
}

/// All zone sets needed by one run, with the plate they apply to.
#[derive(Debug, Clone)]
pub struct ExtruderZones {
    plate: BoundingBox,
    sets: Vec<ZoneSet>,
}

impl ExtruderZones {
    /// Build one zone set per level of the configured escalation ladder.
    pub fn build(config: &SolverConfiguration, geometry: &PrinterGeometry) -> Result<Self> {
        geometry.validate()?;
        let sets = Precision::ladder(config.decimation_precision)
            .iter()
            .map(|&precision| ZoneSet::build(geometry, precision))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            plate: BoundingBox::from_extents(0.0, 0.0, geometry.x_size, geometry.y_size),
            sets,
        })
    }

    /// Zone sets ordered coarse to fine.
    pub fn sets(&self) -> &[ZoneSet] {
        &self.sets
    }

    /// Finest precision available.
    pub fn ceiling(&self) -> Precision {
        self.sets
            .last()
            .map_or(Precision::Box, ZoneSet::precision)
    }

    /// The printable plate area.
    pub fn plate(&self) -> &BoundingBox {
        &self.plate
    }
}

/// Build the convex and box zone sets of a printer.
///
/// Returns `(convex, box)`.
pub fn setup_extruder_unreachable_zones(
    config: &SolverConfiguration,
    geometry: &PrinterGeometry,
) -> Result<(ZoneSet, ZoneSet)> {
    config.validate()?;
    geometry.validate()?;
    Ok((
        ZoneSet::build(geometry, Precision::Convex)?,
        ZoneSet::build(geometry, Precision::Box)?,
    ))
}

/// One cross-section of a prepared object and the zones it induces.
#[derive(Debug, Clone)]
pub struct PreparedSection {
    /// Approximated cross-section.
    pub shape: Shape,
    /// `shape ⊕ slice` for every slice of the zone set, in slice order.
    pub zones: Vec<Shape>,
}

/// An object approximated at one precision, ready for collision tests.
#[derive(Debug, Clone)]
pub struct PreparedObject {
    /// Object identifier.
    pub id: i32,
    /// Height of the finished object.
    pub total_height: f64,
    /// Approximated sections keyed by height.
    pub sections: HeightMap<PreparedSection>,
    /// Box around every section, local frame.
    pub footprint: BoundingBox,
    /// Box around every zone, local frame.
    pub reach: BoundingBox,
}

impl PreparedObject {
    /// Approximate `object` at the zone set's precision.
    pub fn prepare(object: &ObjectToPrint, zones: &ZoneSet, tolerance: f64) -> Result<Self> {
        object.validate()?;
        let precision = zones.precision();
        let sections = object.sections().try_map(|_, polygon| {
            let shape = Shape::approximate(polygon, precision, tolerance)?;
            let induced = zones
                .slices()
                .iter()
                .map(|(_, slice)| shape.minkowski(slice))
                .collect();
            Ok::<_, SequentialError>(PreparedSection {
                shape,
                zones: induced,
            })
        })?;

        let footprint = union_boxes(sections.iter().filter_map(|(_, s)| s.shape.bounding_box()))
            .ok_or_else(|| SequentialError::InvalidObject {
                id: object.id,
                reason: "empty footprint".into(),
            })?;
        let reach = union_boxes(
            sections
                .iter()
                .flat_map(|(_, s)| s.zones.iter().filter_map(Shape::bounding_box)),
        )
        .map_or(footprint, |r| r.union(&footprint));

        Ok(Self {
            id: object.id,
            total_height: object.total_height,
            sections,
            footprint,
            reach,
        })
    }
}

fn union_boxes<'a>(boxes: impl Iterator<Item = &'a BoundingBox>) -> Option<BoundingBox> {
    boxes.copied().reduce(|a, b| a.union(&b))
}

/// Prepare every object at one precision, in parallel.
pub fn prepare_objects(
    objects: &[ObjectToPrint],
    zones: &ZoneSet,
    tolerance: f64,
) -> Result<Vec<PreparedObject>> {
    objects
        .par_iter()
        .map(|object| PreparedObject::prepare(object, zones, tolerance))
        .collect()
}
