//! Printer geometry: plate size and the extruder assembly's footprint.

use serde::{Deserialize, Serialize};
use seqarrange_geom::{HeightMap, Polygon};

use crate::error::{Result, SequentialError};

/// Plate size and extruder assembly shape, as seen by the arranger.
///
/// Each extruder slice is the assembly's footprint, relative to the nozzle
/// tip at the origin, from its key height up to the next key; the topmost
/// slice extends upward without bound. Slices listed in `box_heights` are
/// approximated by their bounding box (long gantry parts), slices in
/// `convex_heights` by their convex hull.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrinterGeometry {
    /// Plate width along X (mm).
    pub x_size: f64,
    /// Plate depth along Y (mm).
    pub y_size: f64,
    /// Heights whose slices are convex-hull approximated, ascending.
    pub convex_heights: Vec<f64>,
    /// Heights whose slices are bounding-box approximated, ascending.
    pub box_heights: Vec<f64>,
    /// Extruder assembly footprint per height above the nozzle tip.
    pub extruder_slices: HeightMap<Vec<Polygon>>,
}

impl PrinterGeometry {
    /// Plate of the given size with no extruder slices yet.
    pub fn new(x_size: f64, y_size: f64) -> Self {
        Self {
            x_size,
            y_size,
            convex_heights: Vec::new(),
            box_heights: Vec::new(),
            extruder_slices: HeightMap::new(),
        }
    }

    /// Add a slice approximated by convex hulls.
    pub fn with_convex_slice(mut self, height: f64, polygons: Vec<Polygon>) -> Self {
        insert_sorted(&mut self.convex_heights, height);
        self.box_heights.retain(|h| *h != height);
        self.extruder_slices.insert(height, polygons);
        self
    }

    /// Add a slice approximated by bounding boxes.
    pub fn with_box_slice(mut self, height: f64, polygons: Vec<Polygon>) -> Self {
        insert_sorted(&mut self.box_heights, height);
        self.convex_heights.retain(|h| *h != height);
        self.extruder_slices.insert(height, polygons);
        self
    }

    /// Is the slice at `height` bounding-box approximated?
    pub fn is_box_height(&self, height: f64) -> bool {
        self.box_heights
            .binary_search_by(|h| h.total_cmp(&height))
            .is_ok()
    }

    /// Plate bounding box size per axis.
    pub fn plate_bounding_box_size(&self) -> (f64, f64) {
        (self.x_size, self.y_size)
    }

    /// Plate bounding box size as a single square edge (the larger axis).
    pub fn plate_bounding_box_size_max(&self) -> f64 {
        self.x_size.max(self.y_size)
    }

    /// Check that the geometry can drive a solver run.
    pub fn validate(&self) -> Result<()> {
        if !(self.x_size.is_finite() && self.x_size > 0.0)
            || !(self.y_size.is_finite() && self.y_size > 0.0)
        {
            return Err(SequentialError::InvalidGeometry(format!(
                "plate size must be positive, got {} x {}",
                self.x_size, self.y_size
            )));
        }
        if self.extruder_slices.is_empty() {
            return Err(SequentialError::InvalidGeometry(
                "extruder has no slices".into(),
            ));
        }
        for (height, polygons) in self.extruder_slices.iter() {
            if !height.is_finite() || height < 0.0 {
                return Err(SequentialError::InvalidGeometry(format!(
                    "extruder slice height {height} must be finite and non-negative"
                )));
            }
            if polygons.iter().any(Polygon::is_degenerate) {
                return Err(SequentialError::InvalidGeometry(format!(
                    "extruder slice at {height} mm has a degenerate polygon"
                )));
            }
        }
        if let Some(h) = self
            .convex_heights
            .iter()
            .find(|h| self.is_box_height(**h))
        {
            return Err(SequentialError::InvalidGeometry(format!(
                "height {h} listed as both convex and box"
            )));
        }
        Ok(())
    }

    /// Approximate geometry of a 250 × 210 mm bed-slinger.
    ///
    /// Nozzle and hotend are convex slices; the extruder body with its fan
    /// and the X-axis gantry, which spans the whole plate width, are box
    /// slices.
    pub fn generic() -> Self {
        let (x_size, y_size) = (250.0, 210.0);
        Self::new(x_size, y_size)
            .with_convex_slice(0.0, vec![Polygon::rectangle(-0.5, -0.5, 0.5, 0.5)])
            .with_convex_slice(
                3.0,
                vec![Polygon::from_coords(&[
                    (-10.0, -8.0),
                    (10.0, -8.0),
                    (14.0, 0.0),
                    (10.0, 12.0),
                    (-10.0, 12.0),
                    (-14.0, 0.0),
                ])],
            )
            .with_box_slice(11.0, vec![Polygon::rectangle(-30.0, -25.0, 35.0, 40.0)])
            .with_box_slice(
                18.0,
                vec![
                    Polygon::rectangle(-30.0, -25.0, 35.0, 40.0),
                    Polygon::rectangle(-x_size - 50.0, -8.0, x_size + 50.0, 20.0),
                ],
            )
    }
}

fn insert_sorted(heights: &mut Vec<f64>, height: f64) {
    if let Err(i) = heights.binary_search_by(|h| h.total_cmp(&height)) {
        heights.insert(i, height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generic_is_valid() {
        let g = PrinterGeometry::generic();
        assert!(g.validate().is_ok());
        assert_eq!(g.convex_heights, vec![0.0, 3.0]);
        assert_eq!(g.box_heights, vec![11.0, 18.0]);
        assert!(g.is_box_height(18.0));
        assert!(!g.is_box_height(3.0));
        assert_eq!(g.plate_bounding_box_size(), (250.0, 210.0));
        assert_eq!(g.plate_bounding_box_size_max(), 250.0);
    }

    #[test]
    fn test_reclassified_slice_moves_between_sets() {
        let g = PrinterGeometry::new(100.0, 100.0)
            .with_convex_slice(5.0, vec![Polygon::rectangle(0.0, 0.0, 1.0, 1.0)])
            .with_box_slice(5.0, vec![Polygon::rectangle(0.0, 0.0, 2.0, 2.0)]);
        assert!(g.convex_heights.is_empty());
        assert_eq!(g.box_heights, vec![5.0]);
        assert_eq!(g.extruder_slices.len(), 1);
    }

    #[test]
    fn test_validate_rejects_bad_input() {
        assert!(matches!(
            PrinterGeometry::new(0.0, 100.0).validate(),
            Err(SequentialError::InvalidGeometry(_))
        ));
        // No slices
        assert!(PrinterGeometry::new(100.0, 100.0).validate().is_err());
        let degenerate = PrinterGeometry::new(100.0, 100.0).with_convex_slice(
            0.0,
            vec![Polygon::from_coords(&[(0.0, 0.0), (1.0, 0.0)])],
        );
        assert!(degenerate.validate().is_err());
    }
}
