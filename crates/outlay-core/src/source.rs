//! CSV transaction source
//!
//! Reads exported transaction files with a `date,amount,description,category`
//! header into raw records. Parsing is strict: one bad line fails the read
//! with the line number, matching the normalization boundary's no-silent-drop
//! rule. Deduplication is the caller's responsibility.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::RawTransaction;

/// Read raw transactions from any CSV reader
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<RawTransaction>> {
    let mut rdr = ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut out = Vec::new();
    for (i, record) in rdr.deserialize::<RawTransaction>().enumerate() {
        // Line 1 is the header, so data starts at line 2
        let tx = record
            .map_err(|e| Error::MalformedRecord(format!("CSV line {}: {}", i + 2, e)))?;
        out.push(tx);
    }

    debug!(records = out.len(), "Read transaction CSV");
    Ok(out)
}

/// Read raw transactions from a CSV file on disk
pub fn read_csv_file<P: AsRef<Path>>(path: P) -> Result<Vec<RawTransaction>> {
    let file = File::open(path.as_ref())?;
    read_csv(file)
}
