use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::analysis::StepResponse;
use crate::config::LoopConfig;
use crate::error::Result;

/// Run summary: the loop that was simulated and how it responded.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary<'a> {
    pub config: &'a LoopConfig,
    pub samples: usize,
    pub response: &'a StepResponse,
}

/// Write the run summary as pretty-printed JSON.
pub fn write_summary<W: Write>(
    writer: &mut W,
    config: &LoopConfig,
    samples: usize,
    response: &StepResponse,
) -> Result<()> {
    let summary = RunSummary { config, samples, response };
    serde_json::to_writer_pretty(&mut *writer, &summary)?;
    writeln!(writer)?;
    Ok(())
}

/// Write the run summary JSON to a file.
pub fn write_summary_file(
    path: impl AsRef<Path>,
    config: &LoopConfig,
    samples: usize,
    response: &StepResponse,
) -> Result<()> {
    let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
    write_summary(&mut file, config, samples, response)?;
    file.flush()?;
    Ok(())
}
