//! Printability checking.
//!
//! A plate is printable when, for every pair of objects where `earlier`
//! precedes `later` in print order, no unreachable zone of `later` meets
//! material of `earlier` that already stands at the zone's height, no two
//! footprints overlap at a common height, and every footprint lies on the
//! plate.

use std::collections::{HashMap, HashSet};

use seqarrange_geom::{BoundingBox, Vec2};
use tracing::debug;

use crate::config::SolverConfiguration;
use crate::error::{Result, SequentialError};
use crate::object::{ObjectToPrint, ScheduledPlate};
use crate::printer::PrinterGeometry;
use crate::zones::{prepare_objects, ExtruderZones, Precision, PreparedObject, ZoneSet};

/// Does the extruder, printing `later` at `later_at`, sweep through
/// `earlier` standing at `earlier_at`?
///
/// Also reports footprints overlapping at a common height.
pub fn collides(
    zones: &ZoneSet,
    earlier: &PreparedObject,
    earlier_at: &Vec2,
    later: &PreparedObject,
    later_at: &Vec2,
) -> bool {
    let offset = earlier_at - later_at;
    if !later.reach.overlaps_offset(&earlier.footprint, &offset) {
        return false;
    }

    let top = earlier.total_height;
    for (start, end, section) in later.sections.spans(later.total_height) {
        if earlier
            .sections
            .overlapping(start, end, top)
            .any(|(_, _, other)| section.shape.overlaps(&other.shape, &offset))
        {
            return true;
        }

        let slices = zones.slices().spans(f64::INFINITY);
        for ((rel_lo, rel_hi, _), zone) in slices.zip(&section.zones) {
            let lo = start + rel_lo;
            if lo >= top {
                break;
            }
            let hi = end + rel_hi;
            if earlier
                .sections
                .overlapping(lo, hi, top)
                .any(|(_, _, other)| zone.overlaps(&other.shape, &offset))
            {
                return true;
            }
        }
    }
    false
}

/// Objects prepared at every level of a zone ladder.
#[derive(Debug)]
pub struct Evaluator<'a> {
    zones: &'a ExtruderZones,
    levels: Vec<Vec<PreparedObject>>,
    extents: Vec<BoundingBox>,
}

impl<'a> Evaluator<'a> {
    /// Prepare `objects` for every zone set of `zones`.
    ///
    /// Box and Convex outlines are decimated with `tolerance`; Exact
    /// outlines are never decimated.
    pub fn new(zones: &'a ExtruderZones, objects: &[ObjectToPrint], tolerance: f64) -> Result<Self> {
        let levels = zones
            .sets()
            .iter()
            .map(|set| {
                let tolerance = match set.precision() {
                    Precision::Exact => 0.0,
                    Precision::Box | Precision::Convex => tolerance,
                };
                prepare_objects(objects, set, tolerance)
            })
            .collect::<Result<Vec<_>>>()?;

        let extents = objects
            .iter()
            .map(|object| {
                object
                    .pgns_at_height
                    .iter()
                    .filter_map(|(_, polygon)| polygon.bounding_box())
                    .reduce(|a, b| a.union(&b))
                    .ok_or_else(|| SequentialError::InvalidObject {
                        id: object.id,
                        reason: "no cross-sections".into(),
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            zones,
            levels,
            extents,
        })
    }

    /// Number of precision levels.
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Precision of a level.
    pub fn precision(&self, level: usize) -> Option<Precision> {
        self.zones.sets().get(level).map(ZoneSet::precision)
    }

    /// Exact bounding box of an object, local frame.
    pub fn extent(&self, object: usize) -> &BoundingBox {
        &self.extents[object]
    }

    /// Does the object lie on the plate when placed at `at`?
    pub fn fits_plate(&self, object: usize, at: &Vec2) -> bool {
        self.zones
            .plate()
            .contains(&self.extents[object].translated(at))
    }

    /// Can `later` be printed after `earlier`?
    ///
    /// Levels `0..=upto` are tried coarse to fine and the pair is accepted
    /// as soon as one of them proves it safe.
    pub fn compatible(
        &self,
        upto: usize,
        earlier: usize,
        earlier_at: &Vec2,
        later: usize,
        later_at: &Vec2,
    ) -> bool {
        self.zones
            .sets()
            .iter()
            .zip(&self.levels)
            .take(upto + 1)
            .any(|(set, prepared)| {
                !collides(
                    set,
                    &prepared[earlier],
                    earlier_at,
                    &prepared[later],
                    later_at,
                )
            })
    }

    /// First offending pair of a plate given as `(object, placement)` in
    /// print order, or the object itself when it leaves the plate.
    pub fn first_conflict(&self, upto: usize, plate: &[(usize, Vec2)]) -> Option<(usize, usize)> {
        for (i, (later, later_at)) in plate.iter().enumerate() {
            if !self.fits_plate(*later, later_at) {
                return Some((*later, *later));
            }
            for (earlier, earlier_at) in &plate[..i] {
                if !self.compatible(upto, *earlier, earlier_at, *later, later_at) {
                    return Some((*earlier, *later));
                }
            }
        }
        None
    }
}

/// Check a complete plan.
///
/// Never fails: malformed input (unknown or repeated ids, invalid
/// configuration, geometry or objects) is reported as not printable.
pub fn is_printable(
    config: &SolverConfiguration,
    geometry: &PrinterGeometry,
    objects: &[ObjectToPrint],
    plates: &[ScheduledPlate],
) -> bool {
    match verify(config, geometry, objects, plates) {
        Ok(printable) => printable,
        Err(err) => {
            debug!("Plan rejected: {err}");
            false
        }
    }
}

fn verify(
    config: &SolverConfiguration,
    geometry: &PrinterGeometry,
    objects: &[ObjectToPrint],
    plates: &[ScheduledPlate],
) -> Result<bool> {
    config.validate()?;
    let index = index_objects(objects)?;

    let mut seen = HashSet::new();
    let mut resolved = Vec::with_capacity(plates.len());
    for plate in plates {
        let mut placed = Vec::with_capacity(plate.len());
        for scheduled in &plate.scheduled_objects {
            let Some(&i) = index.get(&scheduled.id) else {
                debug!("Plan references unknown object {}", scheduled.id);
                return Ok(false);
            };
            if !seen.insert(scheduled.id) {
                debug!("Object {} is scheduled more than once", scheduled.id);
                return Ok(false);
            }
            if !(scheduled.x.is_finite() && scheduled.y.is_finite()) {
                debug!("Object {} has a non-finite placement", scheduled.id);
                return Ok(false);
            }
            placed.push((i, Vec2::new(scheduled.x, scheduled.y)));
        }
        resolved.push(placed);
    }

    let zones = ExtruderZones::build(config, geometry)?;
    let evaluator = Evaluator::new(&zones, objects, 0.0)?;
    let ceiling = evaluator.level_count().saturating_sub(1);

    for (p, placed) in resolved.iter().enumerate() {
        if let Some((earlier, later)) = evaluator.first_conflict(ceiling, placed) {
            if earlier == later {
                debug!("Object {} leaves plate {p}", objects[later].id);
            } else {
                debug!(
                    "Printing object {} after object {} on plate {p} collides",
                    objects[later].id, objects[earlier].id
                );
            }
            return Ok(false);
        }
    }
    Ok(true)
}

/// Map ids to input positions, rejecting duplicates.
pub(crate) fn index_objects(objects: &[ObjectToPrint]) -> Result<HashMap<i32, usize>> {
    let mut index = HashMap::with_capacity(objects.len());
    for (i, object) in objects.iter().enumerate() {
        if index.insert(object.id, i).is_some() {
            return Err(SequentialError::InvalidObject {
                id: object.id,
                reason: "duplicate id".into(),
            });
        }
    }
    Ok(index)
}
