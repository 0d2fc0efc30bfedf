//! Solver configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SequentialError};
use crate::printer::PrinterGeometry;

/// How coarsely outlines are simplified, and how far precision may escalate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DecimationPrecision {
    /// Coarse outlines; escalation stops at convex hulls.
    #[default]
    Low,
    /// Fine outlines; escalation may reach exact outlines.
    High,
}

/// Tunable parameters of a scheduling run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfiguration {
    /// Growth of the placement bound per refinement (mm).
    pub bounding_box_size_optimization_step: f64,
    /// Placement bound of the first refinement (mm).
    pub minimum_bounding_box_size: f64,
    /// Largest placement bound along X (mm).
    pub x_plate_bounding_box_size: f64,
    /// Largest placement bound along Y (mm).
    pub y_plate_bounding_box_size: f64,
    /// Maximum number of bound refinements per admission.
    pub max_refines: usize,
    /// Objects admitted to a plate together.
    pub object_group_size: usize,
    /// Hard cap on objects searched at once, released ones included.
    pub fixed_object_grouping_limit: usize,
    /// Committed units released for re-placement when admission fails.
    pub temporal_spread: usize,
    /// Outline simplification level.
    pub decimation_precision: DecimationPrecision,
    /// Wall-clock budget: bare milliseconds or a `ms`/`s`/`m` suffix.
    pub optimization_timeout: String,
    /// Pitch of the candidate placement grid (mm).
    pub placement_grid_step: f64,
}

impl Default for SolverConfiguration {
    fn default() -> Self {
        Self {
            bounding_box_size_optimization_step: 25.0,
            minimum_bounding_box_size: 50.0,
            x_plate_bounding_box_size: 250.0,
            y_plate_bounding_box_size: 210.0,
            max_refines: 8,
            object_group_size: 4,
            fixed_object_grouping_limit: 8,
            temporal_spread: 2,
            decimation_precision: DecimationPrecision::Low,
            optimization_timeout: "8000".into(),
            placement_grid_step: 5.0,
        }
    }
}

impl SolverConfiguration {
    /// Default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Default configuration sized to a printer's plate.
    pub fn from_printer_geometry(printer_geometry: &PrinterGeometry) -> Self {
        let mut config = Self::default();
        config.setup(printer_geometry);
        config
    }

    /// Derive the plate bounding box from the printer.
    pub fn setup(&mut self, printer_geometry: &PrinterGeometry) {
        let (x, y) = printer_geometry.plate_bounding_box_size();
        self.x_plate_bounding_box_size = x;
        self.y_plate_bounding_box_size = y;
    }

    /// Set the decimation precision.
    pub fn set_decimation_precision(&mut self, decimation_precision: DecimationPrecision) {
        self.decimation_precision = decimation_precision;
    }

    /// Set the group size, raising the grouping limit to match if needed.
    pub fn set_object_group_size(&mut self, object_group_size: usize) {
        self.object_group_size = object_group_size;
        self.fixed_object_grouping_limit = self.fixed_object_grouping_limit.max(object_group_size);
    }

    /// Set the number of committed units released on failed admission.
    pub fn set_temporal_spread(&mut self, temporal_spread: usize) {
        self.temporal_spread = temporal_spread;
    }

    /// Set the refinement cap.
    pub fn set_max_refines(&mut self, max_refines: usize) {
        self.max_refines = max_refines;
    }

    /// Set the time budget, validating its syntax.
    pub fn set_optimization_timeout(&mut self, timeout: &str) -> Result<()> {
        parse_duration(timeout)?;
        self.optimization_timeout = timeout.trim().to_string();
        Ok(())
    }

    /// Outline simplification tolerance (mm) for a precision level.
    pub fn convert_decimation_precision_to_tolerance(precision: DecimationPrecision) -> f64 {
        match precision {
            DecimationPrecision::Low => 0.4,
            DecimationPrecision::High => 0.1,
        }
    }

    /// Tolerance for this configuration's precision.
    pub fn decimation_tolerance(&self) -> f64 {
        Self::convert_decimation_precision_to_tolerance(self.decimation_precision)
    }

    /// Parsed time budget.
    pub fn timeout(&self) -> Result<Duration> {
        parse_duration(&self.optimization_timeout)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        let positive = |name: &str, v: f64| {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(SequentialError::InvalidConfiguration(format!(
                    "{name} must be positive, got {v}"
                )))
            }
        };
        positive(
            "bounding_box_size_optimization_step",
            self.bounding_box_size_optimization_step,
        )?;
        positive("minimum_bounding_box_size", self.minimum_bounding_box_size)?;
        positive("x_plate_bounding_box_size", self.x_plate_bounding_box_size)?;
        positive("y_plate_bounding_box_size", self.y_plate_bounding_box_size)?;
        positive("placement_grid_step", self.placement_grid_step)?;

        if self.object_group_size == 0 {
            return Err(SequentialError::InvalidConfiguration(
                "object_group_size must be at least 1".into(),
            ));
        }
        if self.fixed_object_grouping_limit < self.object_group_size {
            return Err(SequentialError::InvalidConfiguration(format!(
                "fixed_object_grouping_limit ({}) is below object_group_size ({})",
                self.fixed_object_grouping_limit, self.object_group_size
            )));
        }
        self.timeout()?;
        Ok(())
    }
}

/// Parse a textual duration: `"8000"` (ms), `"250ms"`, `"8s"`, `"1.5s"`, `"2m"`.
pub fn parse_duration(text: &str) -> Result<Duration> {
    let text = text.trim();
    let invalid = || SequentialError::InvalidConfiguration(format!("invalid timeout {text:?}"));

    let split = text
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(text.len());
    let (number, unit) = text.split_at(split);
    let value: f64 = number.parse().map_err(|_| invalid())?;

    let millis = match unit.trim() {
        "" | "ms" => value,
        "s" => value * 1000.0,
        "m" | "min" => value * 60_000.0,
        _ => return Err(invalid()),
    };
    if !millis.is_finite() || millis <= 0.0 {
        return Err(invalid());
    }
    Duration::try_from_secs_f64(millis / 1000.0).map_err(|_| invalid())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("8000").unwrap(), Duration::from_millis(8000));
        assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
        assert_eq!(parse_duration(" 8s ").unwrap(), Duration::from_secs(8));
        assert_eq!(parse_duration("1.5s").unwrap(), Duration::from_millis(1500));
        assert_eq!(parse_duration("2m").unwrap(), Duration::from_secs(120));
        assert!(parse_duration("").is_err());
        assert!(parse_duration("0").is_err());
        assert!(parse_duration("fast").is_err());
        assert!(parse_duration("5h").is_err());
        assert!(parse_duration("99999999999999999999999").is_err());
        assert!(parse_duration("1e400").is_err());
    }

    #[test]
    fn test_validate_rejects_unrepresentable_timeout() {
        let mut config = SolverConfiguration::new();
        assert!(config.set_optimization_timeout("99999999999999999999999").is_err());
        config.optimization_timeout = "99999999999999999999999".into();
        assert!(matches!(
            config.validate(),
            Err(SequentialError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_setup_from_printer() {
        let config = SolverConfiguration::from_printer_geometry(&PrinterGeometry::new(300.0, 180.0));
        assert_eq!(config.x_plate_bounding_box_size, 300.0);
        assert_eq!(config.y_plate_bounding_box_size, 180.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_setters() {
        let mut config = SolverConfiguration::new();
        config.set_object_group_size(12);
        assert_eq!(config.fixed_object_grouping_limit, 12);
        config.set_decimation_precision(DecimationPrecision::High);
        assert_eq!(config.decimation_tolerance(), 0.1);
        assert!(config.set_optimization_timeout("nonsense").is_err());
        assert_eq!(config.optimization_timeout, "8000");
        config.set_optimization_timeout("3s").unwrap();
        assert_eq!(config.timeout().unwrap(), Duration::from_secs(3));
    }

    #[test]
    fn test_validate_rejects_zero_group() {
        let config = SolverConfiguration {
            object_group_size: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SequentialError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: SolverConfiguration =
            serde_json::from_str(r#"{"decimation_precision":"High","optimization_timeout":"2s"}"#)
                .unwrap();
        assert_eq!(config.decimation_precision, DecimationPrecision::High);
        assert_eq!(config.object_group_size, 4);
        assert_eq!(config.timeout().unwrap(), Duration::from_secs(2));
    }
}
