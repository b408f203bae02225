//! Text-to-table parsing of results exports.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use tms_model::ParsedTable;

use crate::delimiter::Delimiter;
use crate::error::{IngestError, Result};

/// Maximum export size accepted by [`read_table`] (50 MB).
pub const MAX_EXPORT_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// Parses delimited text into headers and one map per data row.
///
/// Headers are trimmed and stripped of a UTF-8 BOM; columns with an empty
/// header are dropped. Cell values are passed through verbatim, missing
/// trailing cells become empty strings. Lines that are blank in every
/// column are skipped.
pub fn parse_table(text: &str, delimiter: Delimiter) -> Result<ParsedTable> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let delimiter_byte = delimiter.resolve(text);

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter_byte)
        .from_reader(text.as_bytes());

    let mut records = reader.records();
    let header_record = loop {
        match records.next() {
            Some(record) => {
                let record = record?;
                if record.iter().any(|value| !value.trim().is_empty()) {
                    break record;
                }
            }
            None => return Err(IngestError::MissingHeader),
        }
    };

    let mut seen = BTreeSet::new();
    let mut columns: Vec<(usize, String)> = Vec::with_capacity(header_record.len());
    for (idx, raw) in header_record.iter().enumerate() {
        let header = raw.trim().to_string();
        if header.is_empty() {
            tracing::debug!(column = idx, "Dropping column without header");
            continue;
        }
        if !seen.insert(header.clone()) {
            return Err(IngestError::DuplicateHeader { header });
        }
        columns.push((idx, header));
    }

    let mut rows = Vec::new();
    for record in records {
        let record = record?;
        if record.iter().all(|value| value.trim().is_empty()) {
            continue;
        }
        if record.len() > header_record.len() {
            tracing::warn!(
                line = record.position().map(csv::Position::line),
                expected = header_record.len(),
                found = record.len(),
                "Row has more cells than headers; extra cells ignored"
            );
        }
        let data: BTreeMap<String, String> = columns
            .iter()
            .map(|(idx, header)| (header.clone(), record.get(*idx).unwrap_or("").to_string()))
            .collect();
        rows.push(data);
    }

    tracing::debug!(
        headers = columns.len(),
        rows = rows.len(),
        delimiter = %char::from(delimiter_byte).escape_default(),
        "Parsed results export"
    );

    Ok(ParsedTable {
        headers: columns.into_iter().map(|(_, header)| header).collect(),
        rows,
    })
}

/// Reads and parses an export file.
pub fn read_table(path: &Path, delimiter: Delimiter) -> Result<ParsedTable> {
    check_file_size(path, MAX_EXPORT_FILE_SIZE)?;
    let text = read_text(path)?;
    parse_table(&text, delimiter)
}

/// Check the file size against `max_size`.
pub fn check_file_size(path: &Path, max_size: u64) -> Result<()> {
    let metadata = std::fs::metadata(path).map_err(|e| map_io_error(path, e))?;

    if metadata.len() > max_size {
        return Err(IngestError::FileTooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            max_size,
        });
    }

    Ok(())
}

/// Reads the file as UTF-8, rejecting UTF-16 exports.
fn read_text(path: &Path) -> Result<String> {
    let mut file = File::open(path).map_err(|e| map_io_error(path, e))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|e| map_io_error(path, e))?;

    if bytes.starts_with(&[0xFF, 0xFE]) {
        return Err(IngestError::UnsupportedEncoding {
            path: path.to_path_buf(),
            encoding: "UTF-16 LE",
        });
    }
    if bytes.starts_with(&[0xFE, 0xFF]) {
        return Err(IngestError::UnsupportedEncoding {
            path: path.to_path_buf(),
            encoding: "UTF-16 BE",
        });
    }

    String::from_utf8(bytes).map_err(|_| IngestError::UnsupportedEncoding {
        path: path.to_path_buf(),
        encoding: "non-UTF-8",
    })
}

fn map_io_error(path: &Path, err: std::io::Error) -> IngestError {
    if err.kind() == std::io::ErrorKind::NotFound {
        IngestError::FileNotFound {
            path: path.to_path_buf(),
        }
    } else {
        IngestError::FileRead {
            path: path.to_path_buf(),
            source: err,
        }
    }
}
