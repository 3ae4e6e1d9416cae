//! Delimited text output of sweep results
use std::fs::File;
use std::io::Write;
use std::path::Path;

use log::info;
use serde::Serialize;
use thiserror::Error;

use crate::optimize::OptimizationStatus;
use crate::perturbation::PerturbationKind;
use crate::sweep::{LabeledSweep, SweepResult};

const SWEEP_HEADER: [&str; 3] = ["parameter", "objective_value", "status"];
const COMPOSITE_HEADER: [&str; 5] = [
    "group",
    "perturbation",
    "parameter",
    "objective_value",
    "status",
];

/// One row of a composite sweep table
#[derive(Serialize)]
struct CompositeRecord<'a> {
    group: &'a str,
    perturbation: PerturbationKind,
    parameter: f64,
    objective_value: f64,
    status: OptimizationStatus,
}

/// Headers are written explicitly so an empty sweep still produces a header line
fn headerless_writer<W: Write>(writer: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer)
}

impl SweepResult {
    /// Write the sweep as `parameter,objective_value,status` rows, in sweep order
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), TableError> {
        let mut writer = headerless_writer(writer);
        writer.write_record(SWEEP_HEADER)?;
        for point in self {
            writer.serialize(point)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn save_csv<P: AsRef<Path>>(&self, path: P) -> Result<(), TableError> {
        let file = File::create(path.as_ref())?;
        self.write_csv(file)?;
        info!("Sweep written to {}", path.as_ref().display());
        Ok(())
    }
}

/// Write labelled sweeps as one table, prefixing every row with its group and perturbation
pub fn write_composite_csv<W: Write>(sweeps: &[LabeledSweep], writer: W) -> Result<(), TableError> {
    let mut writer = headerless_writer(writer);
    writer.write_record(COMPOSITE_HEADER)?;
    for sweep in sweeps {
        for point in &sweep.result {
            writer.serialize(CompositeRecord {
                group: &sweep.group,
                perturbation: sweep.kind,
                parameter: point.parameter,
                objective_value: point.objective_value,
                status: point.status,
            })?;
        }
    }
    writer.flush()?;
    Ok(())
}

pub fn save_composite_csv<P: AsRef<Path>>(sweeps: &[LabeledSweep], path: P) -> Result<(), TableError> {
    let file = File::create(path.as_ref())?;
    write_composite_csv(sweeps, file)?;
    info!("Composite sweep written to {}", path.as_ref().display());
    Ok(())
}

#[derive(Error, Debug)]
pub enum TableError {
    #[error("Unable to write csv record: {0}")]
    Csv(#[from] csv::Error),
    #[error("Unable to write table: {0}")]
    Io(#[from] std::io::Error),
}
