//! Objects to arrange and the schedules produced for them.

use serde::{Deserialize, Serialize};
use seqarrange_geom::{HeightMap, Polygon};

use crate::error::{Result, SequentialError};

/// One object to be printed, described by its horizontal cross-sections.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ObjectToPrint {
    /// Caller-chosen identifier, unique within a run.
    pub id: i32,
    /// The next object in the input must be printed right after this one.
    pub glued_to_next: bool,
    /// Height of the finished object (mm).
    pub total_height: f64,
    /// Cross-section outline from each height up to the next, in the
    /// object's local frame; heights strictly increasing.
    pub pgns_at_height: Vec<(f64, Polygon)>,
}

impl ObjectToPrint {
    /// Object with a single constant cross-section.
    pub fn prism(id: i32, height: f64, outline: Polygon) -> Self {
        Self {
            id,
            glued_to_next: false,
            total_height: height,
            pgns_at_height: vec![(0.0, outline)],
        }
    }

    /// Mark this object as glued to the next one.
    pub fn glued(mut self) -> Self {
        self.glued_to_next = true;
        self
    }

    /// Cross-sections as a height map.
    pub fn sections(&self) -> HeightMap<Polygon> {
        self.pgns_at_height.iter().cloned().collect()
    }

    /// Check the section stack.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| SequentialError::InvalidObject {
            id: self.id,
            reason,
        };

        if !(self.total_height.is_finite() && self.total_height > 0.0) {
            return Err(invalid(format!(
                "total height must be positive, got {}",
                self.total_height
            )));
        }
        if self.pgns_at_height.is_empty() {
            return Err(invalid("no cross-sections".into()));
        }

        let mut previous = f64::NEG_INFINITY;
        for (height, polygon) in &self.pgns_at_height {
            if !height.is_finite() || *height < 0.0 {
                return Err(invalid(format!("section height {height} out of range")));
            }
            if *height <= previous {
                return Err(invalid(format!(
                    "section heights not strictly increasing at {height}"
                )));
            }
            if *height >= self.total_height {
                return Err(invalid(format!(
                    "section at {height} is not below total height {}",
                    self.total_height
                )));
            }
            if polygon.is_degenerate() {
                return Err(invalid(format!("degenerate section at {height}")));
            }
            previous = *height;
        }
        Ok(())
    }
}

/// An object placed on a plate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduledObject {
    /// Identifier of the placed object.
    pub id: i32,
    /// Translation along X (mm).
    pub x: f64,
    /// Translation along Y (mm).
    pub y: f64,
}

impl ScheduledObject {
    /// Create a placement.
    pub fn new(id: i32, x: f64, y: f64) -> Self {
        Self { id, x, y }
    }
}

/// One plate: objects in print order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScheduledPlate {
    /// Placed objects; position in the vector is print order.
    pub scheduled_objects: Vec<ScheduledObject>,
}

impl ScheduledPlate {
    /// Plate from placements in print order.
    pub fn new(scheduled_objects: Vec<ScheduledObject>) -> Self {
        Self { scheduled_objects }
    }

    /// Object ids in print order.
    pub fn ids(&self) -> Vec<i32> {
        self.scheduled_objects.iter().map(|o| o.id).collect()
    }

    /// Check if the plate holds no objects.
    pub fn is_empty(&self) -> bool {
        self.scheduled_objects.is_empty()
    }

    /// Number of placed objects.
    pub fn len(&self) -> usize {
        self.scheduled_objects.len()
    }
}
