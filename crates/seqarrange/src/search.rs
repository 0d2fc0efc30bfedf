//! Arrangement search.
//!
//! Objects are admitted to plates a group at a time. For each group the
//! search grows a placement bound from the plate centre, escalates zone
//! precision inside each bound and tries a handful of print orders; each
//! object of an order greedily takes the densest feasible grid position.
//! Groups that do not fit are split, then deferred to the next plate.

use std::collections::VecDeque;

use seqarrange_geom::{BoundingBox, Vec2};
use tracing::{debug, info, warn};

use crate::checker::{index_objects, Evaluator};
use crate::config::SolverConfiguration;
use crate::error::{Result, SequentialError};
use crate::object::{ObjectToPrint, ScheduledObject, ScheduledPlate};
use crate::progress::{Deadline, ProgressReporter};
use crate::zones::ExtruderZones;

/// Print orders tried per admission attempt.
pub const MAX_ORDER_CANDIDATES: usize = 24;

/// Progress reported once every object has a lone placement.
const LONE_PASS_PROGRESS: f64 = 20.0;
/// Progress reported once every object is on a plate.
const PLACEMENT_PROGRESS: f64 = 95.0;

const EPSILON: f64 = 1e-9;

/// Objects that must be printed back to back, in input order.
#[derive(Debug, Clone)]
struct Unit {
    members: Vec<usize>,
    height: f64,
}

/// A unit placed on a plate.
#[derive(Debug, Clone)]
struct Commit {
    unit: usize,
    placements: Vec<(usize, Vec2)>,
}

/// The deadline passed during a search step.
#[derive(Debug, Clone, Copy)]
struct Expired;

type Step<T> = std::result::Result<T, Expired>;

/// Scheduling state of one run.
pub struct Arranger<'a> {
    config: &'a SolverConfiguration,
    zones: &'a ExtruderZones,
    objects: &'a [ObjectToPrint],
    evaluator: Evaluator<'a>,
    units: Vec<Unit>,
    bounds: Vec<BoundingBox>,
}

impl<'a> Arranger<'a> {
    /// Validate the input and prepare every object at every precision.
    pub fn new(
        config: &'a SolverConfiguration,
        zones: &'a ExtruderZones,
        objects: &'a [ObjectToPrint],
    ) -> Result<Self> {
        config.validate()?;
        index_objects(objects)?;
        let evaluator = Evaluator::new(zones, objects, config.decimation_tolerance())?;
        Ok(Self {
            config,
            zones,
            objects,
            evaluator,
            units: build_units(objects),
            bounds: refinement_bounds(config, zones.plate()),
        })
    }

    /// Place every object, returning plates in print order.
    pub fn arrange(&self, progress: &mut ProgressReporter<'_>) -> Result<Vec<ScheduledPlate>> {
        let deadline = Deadline::new(self.config.timeout()?);
        info!(
            "Arranging {} objects in {} units, precision ceiling {:?}",
            self.objects.len(),
            self.units.len(),
            self.zones.ceiling()
        );

        let lone = self.lone_placements(&deadline, progress)?;
        let plates = self.fill_plates(&lone, &deadline, progress);
        if cfg!(debug_assertions) {
            let conflicts = self.verify(&plates)?;
            debug_assert!(
                conflicts.is_empty(),
                "arranged plates fail verification: {conflicts:?}"
            );
        }

        info!(
            "Arranged {} objects on {} plates in {} ms",
            self.objects.len(),
            plates.len(),
            deadline.elapsed_ms()
        );
        Ok(plates.iter().map(|plate| self.to_scheduled(plate)).collect())
    }

    /// Place every unit alone on an empty plate.
    fn lone_placements(
        &self,
        deadline: &Deadline,
        progress: &mut ProgressReporter<'_>,
    ) -> Result<Vec<Commit>> {
        let full = self.full_bound();
        let ceiling = self.evaluator.level_count().saturating_sub(1);

        let mut lone = Vec::with_capacity(self.units.len());
        for (index, unit) in self.units.iter().enumerate() {
            if deadline.expired() {
                return Err(SequentialError::Timeout {
                    elapsed_ms: deadline.elapsed_ms(),
                });
            }
            let commit = self
                .place_in_order(&[], &[index], &full, ceiling)
                .and_then(|mut commits| commits.pop())
                .ok_or_else(|| SequentialError::ObjectDoesNotFit {
                    id: self.objects[unit.members[0]].id,
                })?;
            lone.push(commit);
            progress.report_fraction(index + 1, self.units.len(), 0.0, LONE_PASS_PROGRESS);
        }
        Ok(lone)
    }

    fn fill_plates(
        &self,
        lone: &[Commit],
        deadline: &Deadline,
        progress: &mut ProgressReporter<'_>,
    ) -> Vec<Vec<Commit>> {
        let mut plates = Vec::new();
        let mut current: Vec<Commit> = Vec::new();
        let mut pending: VecDeque<usize> = (0..self.units.len()).collect();
        let mut deferred: Vec<usize> = Vec::new();

        while !pending.is_empty() || !deferred.is_empty() {
            if pending.is_empty() {
                debug!(
                    "Closing plate {} with {} units, {} deferred",
                    plates.len(),
                    current.len(),
                    deferred.len()
                );
                plates.push(std::mem::take(&mut current));
                pending.extend(deferred.drain(..));
            }

            let group = self.next_group(&mut pending);
            debug!("Admitting units {:?} to plate {}", group, plates.len());
            match self.admit_group(&mut current, &group, lone, deadline) {
                Ok(rejected) => deferred.extend(rejected),
                Err(Expired) => {
                    let mut remaining: Vec<usize> = group
                        .into_iter()
                        .chain(pending)
                        .chain(deferred)
                        .collect();
                    remaining.sort_unstable();
                    warn!(
                        "Time budget exhausted after {} ms, {} units go on plates of their own",
                        deadline.elapsed_ms(),
                        remaining.len()
                    );
                    if !current.is_empty() {
                        plates.push(current);
                    }
                    plates.extend(remaining.into_iter().map(|unit| vec![lone[unit].clone()]));
                    return plates;
                }
            }

            let done = self.units.len() - pending.len() - deferred.len();
            progress.report_fraction(
                done,
                self.units.len(),
                LONE_PASS_PROGRESS,
                PLACEMENT_PROGRESS,
            );
        }

        if !current.is_empty() {
            plates.push(current);
        }
        plates
    }

    /// Take the next group of units, at most `object_group_size` objects
    /// but always at least one unit.
    fn next_group(&self, pending: &mut VecDeque<usize>) -> Vec<usize> {
        let limit = self
            .config
            .object_group_size
            .min(self.config.fixed_object_grouping_limit)
            .max(1);
        let mut group = Vec::new();
        let mut count = 0;
        while let Some(&unit) = pending.front() {
            let size = self.units[unit].members.len();
            if !group.is_empty() && count + size > limit {
                break;
            }
            pending.pop_front();
            group.push(unit);
            count += size;
        }
        group
    }

    /// Admit a group, falling back to its units one by one. Returns the
    /// units left for the next plate.
    fn admit_group(
        &self,
        current: &mut Vec<Commit>,
        group: &[usize],
        lone: &[Commit],
        deadline: &Deadline,
    ) -> Step<Vec<usize>> {
        if self.admit(current, group, deadline)? {
            return Ok(Vec::new());
        }

        let mut rejected = Vec::new();
        for &unit in group {
            let admitted = group.len() > 1 && self.admit(current, &[unit], deadline)?;
            if admitted {
                continue;
            }
            if current.is_empty() {
                debug!("Unit {unit} opens a plate at its lone placement");
                current.push(lone[unit].clone());
            } else {
                rejected.push(unit);
            }
        }
        Ok(rejected)
    }

    /// Append `batch` to the plate, releasing the last committed units for
    /// re-placement when the plate as it stands has no room.
    fn admit(&self, current: &mut Vec<Commit>, batch: &[usize], deadline: &Deadline) -> Step<bool> {
        let fixed = flatten(current);
        if let Some(commits) = self.search(&fixed, batch, deadline)? {
            current.extend(commits);
            return Ok(true);
        }

        let released = self.release_count(current, batch);
        if released == 0 {
            return Ok(false);
        }
        let keep = current.len() - released;
        let units: Vec<usize> = current[keep..]
            .iter()
            .map(|commit| commit.unit)
            .chain(batch.iter().copied())
            .collect();
        debug!("Releasing {released} committed units to admit {:?}", batch);
        let fixed = flatten(&current[..keep]);
        if let Some(commits) = self.search(&fixed, &units, deadline)? {
            current.truncate(keep);
            current.extend(commits);
            return Ok(true);
        }
        Ok(false)
    }

    /// Number of trailing committed units to release, within the grouping cap.
    fn release_count(&self, current: &[Commit], batch: &[usize]) -> usize {
        let batch_objects: usize = batch.iter().map(|&u| self.units[u].members.len()).sum();
        let mut released = self.config.temporal_spread.min(current.len());
        while released > 0 {
            let released_objects: usize = current[current.len() - released..]
                .iter()
                .map(|commit| commit.placements.len())
                .sum();
            if released_objects + batch_objects <= self.config.fixed_object_grouping_limit {
                break;
            }
            released -= 1;
        }
        released
    }

    /// Place `batch` after `fixed`: bounds grow, precision escalates inside
    /// each bound, orders are tried inside each precision.
    fn search(
        &self,
        fixed: &[(usize, Vec2)],
        batch: &[usize],
        deadline: &Deadline,
    ) -> Step<Option<Vec<Commit>>> {
        let orders = self.order_candidates(batch);
        for (refine, bound) in self.bounds.iter().enumerate() {
            if deadline.expired() {
                return Err(Expired);
            }
            for level in 0..self.evaluator.level_count() {
                for order in &orders {
                    if deadline.expired() {
                        return Err(Expired);
                    }
                    if let Some(commits) = self.place_in_order(fixed, order, bound, level) {
                        debug!(
                            "Placed units {:?} in bound {:.0} x {:.0} (refine {refine}) at {:?}",
                            order,
                            bound.width(),
                            bound.height(),
                            self.evaluator.precision(level)
                        );
                        return Ok(Some(commits));
                    }
                }
            }
        }
        Ok(None)
    }

    /// Greedily place the units of `order`, in that print order, after
    /// `fixed`.
    fn place_in_order(
        &self,
        fixed: &[(usize, Vec2)],
        order: &[usize],
        bound: &BoundingBox,
        level: usize,
    ) -> Option<Vec<Commit>> {
        let mut placed = fixed.to_vec();
        let mut extent = fixed
            .iter()
            .map(|(object, at)| self.evaluator.extent(*object).translated(at))
            .reduce(|a, b| a.union(&b));

        let mut commits = Vec::with_capacity(order.len());
        for &unit in order {
            let mut placements = Vec::with_capacity(self.units[unit].members.len());
            for &object in &self.units[unit].members {
                let at = self.best_position(&placed, extent.as_ref(), object, bound, level)?;
                let moved = self.evaluator.extent(object).translated(&at);
                extent = Some(extent.map_or(moved, |e| e.union(&moved)));
                placed.push((object, at));
                placements.push((object, at));
            }
            commits.push(Commit { unit, placements });
        }
        Some(commits)
    }

    /// Feasible grid position with the smallest plate extent, then lowest
    /// `y`, then lowest `x`.
    fn best_position(
        &self,
        placed: &[(usize, Vec2)],
        extent: Option<&BoundingBox>,
        object: usize,
        bound: &BoundingBox,
        level: usize,
    ) -> Option<Vec2> {
        let own = self.evaluator.extent(object);
        let step = self.config.placement_grid_step;
        let xs = axis_candidates(bound.min.x - own.min.x, bound.max.x - own.max.x, step);
        let ys = axis_candidates(bound.min.y - own.min.y, bound.max.y - own.max.y, step);

        let mut candidates: Vec<(i64, Vec2)> = xs
            .iter()
            .flat_map(|&x| ys.iter().map(move |&y| Vec2::new(x, y)))
            .map(|at| {
                let moved = own.translated(&at);
                let area = extent.map_or(moved, |e| e.union(&moved)).area();
                ((area * 1e3).round() as i64, at)
            })
            .collect();
        candidates.sort_by(|(area_a, a), (area_b, b)| {
            area_a
                .cmp(area_b)
                .then(a.y.total_cmp(&b.y))
                .then(a.x.total_cmp(&b.x))
        });

        candidates.into_iter().map(|(_, at)| at).find(|at| {
            self.evaluator.fits_plate(object, at)
                && placed.iter().all(|(earlier, earlier_at)| {
                    self.evaluator
                        .compatible(level, *earlier, earlier_at, object, at)
                })
        })
    }

    /// Height-ascending order, input order, then further permutations.
    fn order_candidates(&self, batch: &[usize]) -> Vec<Vec<usize>> {
        let mut input = batch.to_vec();
        input.sort_unstable();

        let mut by_height = input.clone();
        by_height.sort_by(|a, b| self.units[*a].height.total_cmp(&self.units[*b].height));

        let mut orders = vec![by_height];
        if !orders.contains(&input) {
            orders.push(input.clone());
        }
        let mut permutation = input;
        while orders.len() < MAX_ORDER_CANDIDATES && next_permutation(&mut permutation) {
            if !orders.contains(&permutation) {
                orders.push(permutation.clone());
            }
        }
        orders
    }

    fn full_bound(&self) -> BoundingBox {
        self.bounds
            .last()
            .copied()
            .unwrap_or(*self.zones.plate())
    }

    /// Re-check the result with undecimated outlines.
    ///
    /// Returns `(plate, earlier id, later id)` for every plate holding a
    /// conflict. Debug builds run this after every arrangement.
    fn verify(&self, plates: &[Vec<Commit>]) -> Result<Vec<(usize, i32, i32)>> {
        let exact = Evaluator::new(self.zones, self.objects, 0.0)?;
        let ceiling = exact.level_count().saturating_sub(1);
        Ok(plates
            .iter()
            .enumerate()
            .filter_map(|(index, plate)| {
                exact
                    .first_conflict(ceiling, &flatten(plate))
                    .map(|(earlier, later)| (index, self.objects[earlier].id, self.objects[later].id))
            })
            .collect())
    }

    fn to_scheduled(&self, plate: &[Commit]) -> ScheduledPlate {
        ScheduledPlate::new(
            plate
                .iter()
                .flat_map(|commit| &commit.placements)
                .map(|(object, at)| ScheduledObject::new(self.objects[*object].id, at.x, at.y))
                .collect(),
        )
    }
}

/// Chain objects glued to their successor into units.
fn build_units(objects: &[ObjectToPrint]) -> Vec<Unit> {
    let mut units: Vec<Unit> = Vec::new();
    let mut extend_last = false;
    for (index, object) in objects.iter().enumerate() {
        match units.last_mut() {
            Some(unit) if extend_last => {
                unit.members.push(index);
                unit.height = unit.height.max(object.total_height);
            }
            _ => units.push(Unit {
                members: vec![index],
                height: object.total_height,
            }),
        }
        extend_last = object.glued_to_next;
    }
    units
}

fn flatten(commits: &[Commit]) -> Vec<(usize, Vec2)> {
    commits
        .iter()
        .flat_map(|commit| commit.placements.iter().copied())
        .collect()
}

/// Placement bounds centred on the plate, growing to the full plate.
fn refinement_bounds(config: &SolverConfiguration, plate: &BoundingBox) -> Vec<BoundingBox> {
    let max_w = config.x_plate_bounding_box_size.min(plate.width());
    let max_h = config.y_plate_bounding_box_size.min(plate.height());

    let mut sizes: Vec<(f64, f64)> = Vec::new();
    for refine in 0..config.max_refines {
        let edge = config.minimum_bounding_box_size
            + refine as f64 * config.bounding_box_size_optimization_step;
        let size = (edge.min(max_w), edge.min(max_h));
        if size == (max_w, max_h) {
            break;
        }
        if sizes.last() != Some(&size) {
            sizes.push(size);
        }
    }
    sizes.push((max_w, max_h));

    let center = plate.center();
    sizes
        .into_iter()
        .map(|(w, h)| {
            BoundingBox::from_extents(
                center.x - w / 2.0,
                center.y - h / 2.0,
                center.x + w / 2.0,
                center.y + h / 2.0,
            )
        })
        .collect()
}

/// Grid from `lo` to `hi` with pitch `step`; `hi` is always included.
fn axis_candidates(lo: f64, hi: f64, step: f64) -> Vec<f64> {
    if hi < lo - EPSILON {
        return Vec::new();
    }
    let hi = hi.max(lo);
    let count = ((hi - lo) / step).floor() as usize;
    let mut values: Vec<f64> = (0..=count).map(|i| lo + i as f64 * step).collect();
    if values.last().is_some_and(|last| hi - last > EPSILON) {
        values.push(hi);
    }
    values
}

/// Advance to the next lexicographic permutation; `false` after the last.
fn next_permutation(values: &mut [usize]) -> bool {
    let Some(pivot) = values.windows(2).rposition(|w| w[0] < w[1]) else {
        return false;
    };
    let Some(successor) = values.iter().rposition(|&v| v > values[pivot]) else {
        return false;
    };
    values.swap(pivot, successor);
    values[pivot + 1..].reverse();
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::is_printable;
    use crate::printer::PrinterGeometry;
    use approx::assert_relative_eq;
    use seqarrange_geom::Polygon;
    use std::time::Duration;

    /// 100 × 100 plate whose carriage, from 10 mm up, covers everything.
    fn printer() -> PrinterGeometry {
        PrinterGeometry::new(100.0, 100.0)
            .with_convex_slice(0.0, vec![Polygon::rectangle(-2.0, -2.0, 2.0, 2.0)])
            .with_box_slice(
                10.0,
                vec![Polygon::rectangle(-1000.0, -1000.0, 1000.0, 1000.0)],
            )
    }

    fn square(id: i32, height: f64) -> ObjectToPrint {
        ObjectToPrint::prism(id, height, Polygon::rectangle(0.0, 0.0, 10.0, 10.0))
    }

    fn arrange(config: &SolverConfiguration, objects: &[ObjectToPrint]) -> Result<Vec<ScheduledPlate>> {
        let zones = ExtruderZones::build(config, &printer())?;
        let arranger = Arranger::new(config, &zones, objects)?;
        arranger.arrange(&mut ProgressReporter::silent())
    }

    #[test]
    fn test_units_follow_glue() {
        let objects = [
            square(1, 5.0).glued(),
            square(2, 8.0),
            square(3, 3.0),
            square(4, 4.0).glued(),
        ];
        let units = build_units(&objects);
        assert_eq!(units.len(), 3);
        assert_eq!(units[0].members, vec![0, 1]);
        assert_relative_eq!(units[0].height, 8.0);
        assert_eq!(units[1].members, vec![2]);
        // Trailing glue has nothing to attach to.
        assert_eq!(units[2].members, vec![3]);
    }

    #[test]
    fn test_next_permutation() {
        let mut values = vec![0, 1, 2];
        let mut seen = vec![values.clone()];
        while next_permutation(&mut values) {
            seen.push(values.clone());
        }
        assert_eq!(seen.len(), 6);
        assert_eq!(seen[1], vec![0, 2, 1]);
        assert_eq!(seen[5], vec![2, 1, 0]);
        assert!(!next_permutation(&mut []));
    }

    #[test]
    fn test_axis_candidates() {
        assert_eq!(axis_candidates(0.0, 10.0, 5.0), vec![0.0, 5.0, 10.0]);
        assert_eq!(axis_candidates(0.0, 12.0, 5.0), vec![0.0, 5.0, 10.0, 12.0]);
        assert_eq!(axis_candidates(3.0, 3.0, 5.0), vec![3.0]);
        assert!(axis_candidates(3.0, 1.0, 5.0).is_empty());
    }

    #[test]
    fn test_refinement_bounds_grow_to_plate() {
        let config = SolverConfiguration::from_printer_geometry(&printer());
        let plate = BoundingBox::from_extents(0.0, 0.0, 100.0, 100.0);
        let bounds = refinement_bounds(&config, &plate);
        let widths: Vec<f64> = bounds.iter().map(BoundingBox::width).collect();
        assert_eq!(widths, vec![50.0, 75.0, 100.0]);
        assert_relative_eq!(bounds[0].min.x, 25.0);
        assert_eq!(bounds[2], plate);

        let none = SolverConfiguration {
            max_refines: 0,
            ..config
        };
        assert_eq!(refinement_bounds(&none, &plate), vec![plate]);
    }

    #[test]
    fn test_orders_start_height_ascending() {
        let config = SolverConfiguration::from_printer_geometry(&printer());
        let zones = ExtruderZones::build(&config, &printer()).unwrap();
        let objects: Vec<ObjectToPrint> = (0..5)
            .map(|i| square(i, 20.0 - f64::from(i)))
            .collect();
        let arranger = Arranger::new(&config, &zones, &objects).unwrap();

        let orders = arranger.order_candidates(&[0, 1, 2, 3, 4]);
        assert_eq!(orders[0], vec![4, 3, 2, 1, 0]);
        assert_eq!(orders[1], vec![0, 1, 2, 3, 4]);
        assert_eq!(orders.len(), MAX_ORDER_CANDIDATES);

        let single = arranger.order_candidates(&[2]);
        assert_eq!(single, vec![vec![2]]);
    }

    #[test]
    fn test_short_object_printed_before_tall() {
        let config = SolverConfiguration::from_printer_geometry(&printer());
        let objects = [square(1, 30.0), square(2, 5.0)];
        let plates = arrange(&config, &objects).unwrap();
        assert_eq!(plates.len(), 1);
        assert_eq!(plates[0].ids(), vec![2, 1]);
        assert!(is_printable(&config, &printer(), &objects, &plates));
    }

    #[test]
    fn test_temporal_spread_reorders_committed_units() {
        let mut config = SolverConfiguration::from_printer_geometry(&printer());
        config.set_object_group_size(1);
        let objects = [square(1, 30.0), square(2, 5.0)];

        let plates = arrange(&config, &objects).unwrap();
        assert_eq!(plates.len(), 1);
        assert_eq!(plates[0].ids(), vec![2, 1]);

        config.set_temporal_spread(0);
        let plates = arrange(&config, &objects).unwrap();
        assert_eq!(plates.len(), 2);
        assert_eq!(plates[0].ids(), vec![1]);
        assert_eq!(plates[1].ids(), vec![2]);
        assert!(is_printable(&config, &printer(), &objects, &plates));
    }

    #[test]
    fn test_oversized_object_does_not_fit() {
        let config = SolverConfiguration::from_printer_geometry(&printer());
        let objects = [
            square(1, 5.0),
            ObjectToPrint::prism(7, 5.0, Polygon::rectangle(0.0, 0.0, 120.0, 10.0)),
        ];
        assert_eq!(
            arrange(&config, &objects),
            Err(SequentialError::ObjectDoesNotFit { id: 7 })
        );
    }

    #[test]
    fn test_expired_before_lone_pass_times_out() {
        let config = SolverConfiguration::from_printer_geometry(&printer());
        let zones = ExtruderZones::build(&config, &printer()).unwrap();
        let objects = [square(1, 5.0)];
        let arranger = Arranger::new(&config, &zones, &objects).unwrap();
        let result = arranger.lone_placements(
            &Deadline::new(Duration::ZERO),
            &mut ProgressReporter::silent(),
        );
        assert!(matches!(result, Err(SequentialError::Timeout { .. })));
    }

    #[test]
    fn test_expiry_after_lone_pass_degrades() {
        let config = SolverConfiguration::from_printer_geometry(&printer());
        let zones = ExtruderZones::build(&config, &printer()).unwrap();
        let objects = [square(1, 5.0).glued(), square(2, 5.0), square(3, 5.0)];
        let arranger = Arranger::new(&config, &zones, &objects).unwrap();
        let mut progress = ProgressReporter::silent();

        let lone = arranger
            .lone_placements(&Deadline::new(Duration::from_secs(60)), &mut progress)
            .unwrap();
        let plates = arranger.fill_plates(&lone, &Deadline::new(Duration::ZERO), &mut progress);
        let ids: Vec<Vec<i32>> = plates
            .iter()
            .map(|plate| arranger.to_scheduled(plate).ids())
            .collect();
        assert_eq!(ids, vec![vec![1, 2], vec![3]]);
    }

    #[test]
    fn test_high_precision_fills_pocket() {
        // A 4 mm pin fits only inside the pocket of a U that covers the
        // whole plate; its convex hull leaves no room at all.
        let geometry = PrinterGeometry::new(30.0, 30.0)
            .with_convex_slice(0.0, vec![Polygon::rectangle(-1.0, -1.0, 1.0, 1.0)]);
        let u_shape = ObjectToPrint::prism(
            1,
            3.0,
            Polygon::from_coords(&[
                (0.0, 0.0),
                (30.0, 0.0),
                (30.0, 30.0),
                (22.0, 30.0),
                (22.0, 8.0),
                (8.0, 8.0),
                (8.0, 30.0),
                (0.0, 30.0),
            ]),
        );
        let pin = ObjectToPrint::prism(2, 3.0, Polygon::rectangle(0.0, 0.0, 4.0, 4.0));
        let objects = [u_shape, pin];
        let run = |config: &SolverConfiguration| {
            let zones = ExtruderZones::build(config, &geometry).unwrap();
            Arranger::new(config, &zones, &objects)
                .unwrap()
                .arrange(&mut ProgressReporter::silent())
                .unwrap()
        };

        let mut low = SolverConfiguration::from_printer_geometry(&geometry);
        let plates = run(&low);
        assert_eq!(plates.len(), 2);

        let mut high = low.clone();
        high.set_decimation_precision(crate::config::DecimationPrecision::High);
        let plates = run(&high);
        assert_eq!(plates.len(), 1);
        assert_eq!(plates[0].ids(), vec![1, 2]);
        let pin_at = &plates[0].scheduled_objects[1];
        assert!(pin_at.x >= 9.0 && pin_at.x + 4.0 <= 21.0);
        assert!(pin_at.y >= 9.0);
        assert!(is_printable(&high, &geometry, &objects, &plates));

        low.set_decimation_precision(crate::config::DecimationPrecision::Low);
        assert!(!is_printable(&low, &geometry, &objects, &plates));
    }

    #[test]
    fn test_verify_reports_conflicting_plate() {
        let config = SolverConfiguration::from_printer_geometry(&printer());
        let zones = ExtruderZones::build(&config, &printer()).unwrap();
        let objects = [square(1, 5.0), square(2, 5.0), square(3, 5.0)];
        let arranger = Arranger::new(&config, &zones, &objects).unwrap();
        let commit = |unit: usize, x: f64, y: f64| Commit {
            unit,
            placements: vec![(unit, Vec2::new(x, y))],
        };

        let clean = vec![vec![commit(0, 0.0, 0.0)], vec![commit(1, 0.0, 0.0)]];
        assert!(arranger.verify(&clean).unwrap().is_empty());

        let overlapping = vec![
            vec![commit(0, 0.0, 0.0)],
            vec![commit(1, 20.0, 20.0), commit(2, 25.0, 25.0)],
        ];
        assert_eq!(arranger.verify(&overlapping).unwrap(), vec![(1, 2, 3)]);
    }

    #[test]
    fn test_no_objects_no_plates() {
        let config = SolverConfiguration::from_printer_geometry(&printer());
        assert_eq!(arrange(&config, &[]).unwrap(), Vec::new());
    }
}
