//! Tabular decoder: strict CSV parsing with a deterministic text render.

use crate::registry::Decoder;
use chinwag_core::attachment::{NormalizedContent, UploadedFile};
use chinwag_core::error::IngestError;

/// Parses CSV into rows and renders them as a pipe-separated table, one
/// record per line. Parsing is strict: ragged rows fail with the csv
/// crate's diagnostic (which names the offending record) rather than a
/// generic message.
pub struct CsvDecoder;

impl Decoder for CsvDecoder {
    fn extensions(&self) -> &'static [&'static str] {
        &["csv"]
    }

    fn decode(&self, file: &UploadedFile) -> Result<NormalizedContent, IngestError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(false)
            .from_reader(file.bytes.as_slice());

        let mut lines = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| IngestError::Malformed {
                name: file.name.clone(),
                diagnostic: e.to_string(),
            })?;
            lines.push(record.iter().collect::<Vec<_>>().join(" | "));
        }

        Ok(NormalizedContent::Text(lines.join("\n")))
    }
}
