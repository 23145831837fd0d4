//! Flat-file formats spoken by the registry and the index builder

pub mod fasta;
pub mod genbank;
