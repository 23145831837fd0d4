//! FASTA export in the index builder's expected input shape

use crate::record::SequenceRecord;
use arca_core::ArcaError;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write a record set as plain-text FASTA, one entry per record: a
/// `>`-prefixed version-tag header line followed by the raw sequence
/// line. This exact shape is the build tool's input contract.
pub fn write_fasta<P: AsRef<Path>>(path: P, records: &[SequenceRecord]) -> Result<(), ArcaError> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    write_fasta_to_writer(&mut writer, records)?;
    writer.flush()?;
    Ok(())
}

fn write_fasta_to_writer<W: Write>(
    writer: &mut W,
    records: &[SequenceRecord],
) -> Result<(), ArcaError> {
    for record in records {
        writeln!(writer, ">{}", record.version)?;
        writeln!(writer, "{}", record.sequence)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_export_shape() {
        let records = vec![
            SequenceRecord::new("AB1", "AB1.1").with_sequence("ACGT"),
            SequenceRecord::new("CD2", "CD2.3").with_sequence("TTGGAA"),
        ];

        let mut buffer = Vec::new();
        write_fasta_to_writer(&mut buffer, &records).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text, ">AB1.1\nACGT\n>CD2.3\nTTGGAA\n");
    }

    #[test]
    fn test_export_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("database.fasta");

        let records = vec![SequenceRecord::new("AB1", "AB1.1").with_sequence("ACGT")];
        write_fasta(&path, &records).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, ">AB1.1\nACGT\n");
    }
}
