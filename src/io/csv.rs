use std::io::{self, Write};
use std::path::Path;

use crate::sim::Sample;

/// Write closed-loop samples in CSV format.
///
/// Columns: time, setpoint, feedback, output
pub fn write_samples<W: Write>(writer: &mut W, samples: &[Sample]) -> io::Result<()> {
    writeln!(writer, "time,setpoint,feedback,output")?;

    for s in samples {
        writeln!(
            writer,
            "{:.4},{:.6},{:.6},{:.6}",
            s.time, s.setpoint, s.feedback, s.output,
        )?;
    }

    Ok(())
}

/// Write samples to a CSV file at the given path.
pub fn write_samples_file(path: impl AsRef<Path>, samples: &[Sample]) -> io::Result<()> {
    let mut file = io::BufWriter::new(std::fs::File::create(path)?);
    write_samples(&mut file, samples)?;
    file.flush()
}
