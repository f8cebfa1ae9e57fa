use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::Path,
};

use speckle_synth::{GroundTruth, GroundTruthMove};

use crate::error::IoError;

/// Read a ground-truth log.
///
/// # Errors
///
/// An error if the file cannot be read or a line does not parse.
pub fn read_ground_truth(file_path: impl AsRef<Path>) -> Result<GroundTruth, IoError> {
    let file_path = file_path.as_ref();
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }
    let text = fs::read_to_string(file_path)?;
    Ok(GroundTruth::parse(&text)?)
}

/// Streams a ground-truth log to a file, one record per generated frame.
///
/// # Examples
///
/// ```no_run
/// use speckle_io::ground_truth::GroundTruthWriter;
/// use speckle_synth::GroundTruthMove;
///
/// let mut writer = GroundTruthWriter::create("moves.txt", 10).unwrap();
/// writer.write_move(&GroundTruthMove { x: 0.3, y: -1.1, rotation: None }).unwrap();
/// writer.finish().unwrap();
/// ```
pub struct GroundTruthWriter {
    writer: BufWriter<File>,
    count: usize,
}

impl GroundTruthWriter {
    /// Create the file and write the `scale` header line.
    pub fn create(file_path: impl AsRef<Path>, scale: u32) -> Result<Self, IoError> {
        let mut writer = BufWriter::new(File::create(file_path)?);
        writeln!(writer, "{scale}")?;
        Ok(Self { writer, count: 0 })
    }

    /// Append one record.
    pub fn write_move(&mut self, record: &GroundTruthMove) -> Result<(), IoError> {
        writeln!(self.writer, "{record}")?;
        self.count += 1;
        Ok(())
    }

    /// Number of records written so far.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns true if no record was written yet.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Flush the remaining buffered records.
    pub fn finish(mut self) -> Result<(), IoError> {
        self.writer.flush()?;
        log::debug!("wrote {} ground-truth records", self.count);
        Ok(())
    }
}
