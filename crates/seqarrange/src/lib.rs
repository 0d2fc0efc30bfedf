#![warn(missing_docs)]

//! Sequential-print arrangement for FDM printers.
//!
//! When a printer finishes objects one at a time, the extruder assembly
//! travels above everything printed so far. This crate checks whether a
//! given order and placement of objects keeps the assembly clear of
//! finished objects, and searches for a safe order, placement and split
//! into plates when asked.
//!
//! # Example
//!
//! ```ignore
//! use seqarrange::{
//!     check_scheduled_objects_for_sequential_printability,
//!     schedule_objects_for_sequential_print, ObjectToPrint, PrinterGeometry,
//!     SolverConfiguration,
//! };
//! use seqarrange_geom::Polygon;
//!
//! let printer = PrinterGeometry::generic();
//! let config = SolverConfiguration::from_printer_geometry(&printer);
//! let objects = vec![
//!     ObjectToPrint::prism(1, 20.0, Polygon::rectangle(0.0, 0.0, 30.0, 30.0)),
//!     ObjectToPrint::prism(2, 8.0, Polygon::rectangle(0.0, 0.0, 15.0, 40.0)),
//! ];
//!
//! let plates = schedule_objects_for_sequential_print(&config, &printer, &objects, None)?;
//! assert!(check_scheduled_objects_for_sequential_printability(
//!     &config, &printer, &objects, &plates
//! ));
//! ```

pub mod checker;
pub mod config;
pub mod error;
pub mod object;
pub mod printer;
pub mod progress;
pub mod search;
pub mod zones;

pub use checker::{is_printable, Evaluator};
pub use config::{parse_duration, DecimationPrecision, SolverConfiguration};
pub use error::{Result, SequentialError};
pub use object::{ObjectToPrint, ScheduledObject, ScheduledPlate};
pub use printer::PrinterGeometry;
pub use progress::{Deadline, ProgressReporter};
pub use search::{Arranger, MAX_ORDER_CANDIDATES};
pub use zones::{
    setup_extruder_unreachable_zones, ExtruderZones, Precision, PreparedObject, Shape, ZoneSet,
};

/// Check that printing `plates` in order never drives the extruder
/// assembly through a finished object.
///
/// Never fails; malformed input is reported as `false`.
pub fn check_scheduled_objects_for_sequential_printability(
    solver_configuration: &SolverConfiguration,
    printer_geometry: &PrinterGeometry,
    objects_to_print: &[ObjectToPrint],
    scheduled_plates: &[ScheduledPlate],
) -> bool {
    is_printable(
        solver_configuration,
        printer_geometry,
        objects_to_print,
        scheduled_plates,
    )
}

/// Find a safe order and placement for every object, over as many plates
/// as needed.
///
/// Fails with [`SequentialError::ObjectDoesNotFit`] when an object cannot
/// be printed even alone, and with [`SequentialError::Timeout`] when the
/// time budget runs out before every object could be placed alone.
pub fn schedule_objects_for_sequential_print(
    solver_configuration: &SolverConfiguration,
    printer_geometry: &PrinterGeometry,
    objects_to_print: &[ObjectToPrint],
    progress: Option<&mut dyn FnMut(u8)>,
) -> Result<Vec<ScheduledPlate>> {
    let mut scheduled_plates = Vec::new();
    schedule_objects_for_sequential_print_into(
        solver_configuration,
        printer_geometry,
        objects_to_print,
        &mut scheduled_plates,
        progress,
    )?;
    Ok(scheduled_plates)
}

/// [`schedule_objects_for_sequential_print`] writing into `scheduled_plates`.
///
/// Previous contents are discarded; on error the vector is left empty.
pub fn schedule_objects_for_sequential_print_into(
    solver_configuration: &SolverConfiguration,
    printer_geometry: &PrinterGeometry,
    objects_to_print: &[ObjectToPrint],
    scheduled_plates: &mut Vec<ScheduledPlate>,
    progress: Option<&mut dyn FnMut(u8)>,
) -> Result<()> {
    scheduled_plates.clear();
    solver_configuration.validate()?;
    let zones = ExtruderZones::build(solver_configuration, printer_geometry)?;
    schedule_objects_with_zones(
        solver_configuration,
        &zones,
        objects_to_print,
        scheduled_plates,
        progress,
    )?;
    Ok(())
}

/// Schedule against zones built once by the caller.
///
/// Replaces the contents of `scheduled_plates` and returns the number of
/// plates used.
pub fn schedule_objects_with_zones(
    solver_configuration: &SolverConfiguration,
    zones: &ExtruderZones,
    objects_to_print: &[ObjectToPrint],
    scheduled_plates: &mut Vec<ScheduledPlate>,
    progress: Option<&mut dyn FnMut(u8)>,
) -> Result<usize> {
    scheduled_plates.clear();
    let mut reporter = ProgressReporter::new(progress);
    let arranger = Arranger::new(solver_configuration, zones, objects_to_print)?;
    scheduled_plates.extend(arranger.arrange(&mut reporter)?);
    reporter.finish();
    Ok(scheduled_plates.len())
}
