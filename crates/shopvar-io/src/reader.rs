//! Reading source rows from CSV and spreadsheet files.

use std::borrow::Cow;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use calamine::{open_workbook_auto, Reader};
use csv::{ByteRecord, ReaderBuilder, Trim};
use shopvar_core::{normalize_header, IssueKind, SourceRow, ValidationIssue};

use crate::columns::{ColumnMap, SourceField};
use crate::error::IngestError;

const SPREADSHEET_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Rows read from one source, plus the problems met on the way.
#[derive(Debug, Clone, Default)]
pub struct Ingest {
    pub rows: Vec<SourceRow>,
    /// Row-level problems that did not stop the read: replaced bytes,
    /// unreadable records.
    pub issues: Vec<ValidationIssue>,
}

/// Reads a CSV or spreadsheet file into source rows. Spreadsheets are
/// recognized by extension; only their first sheet is read.
///
/// # Errors
///
/// Returns [`IngestError::Io`] if a CSV file cannot be opened,
/// [`IngestError::Spreadsheet`] if a workbook cannot be read, and the errors
/// of [`read_source_rows`].
pub fn read_source_file(path: &Path) -> Result<Ingest, IngestError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    let ingest = if extension
        .as_deref()
        .is_some_and(|e| SPREADSHEET_EXTENSIONS.contains(&e))
    {
        read_spreadsheet(path)?
    } else {
        let file = File::open(path).map_err(|source| IngestError::Io {
            path: path.display().to_string(),
            source,
        })?;
        read_source_rows(file)?
    };
    tracing::info!(
        path = %path.display(),
        rows = ingest.rows.len(),
        issues = ingest.issues.len(),
        "read source rows"
    );
    Ok(ingest)
}

/// Reads source rows from CSV text with a header row.
///
/// Bytes that are not valid UTF-8 are replaced with U+FFFD and reported.
/// A record the CSV parser rejects is skipped and reported; the rest of the
/// file is still read. Row indices count data records, so skipped and blank
/// records still take an index.
///
/// # Errors
///
/// Returns [`IngestError::MissingHeader`] when the input has no header row and
/// [`IngestError::Csv`] when the underlying reader fails.
pub fn read_source_rows<R: Read>(reader: R) -> Result<Ingest, IngestError> {
    let mut csv_reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .byte_headers()?
        .iter()
        .map(|h| String::from_utf8_lossy(h).into_owned())
        .collect();

    let mut issues = Vec::new();
    let mut records = Vec::new();
    let mut record = ByteRecord::new();
    let mut index = 0usize;
    loop {
        match csv_reader.read_byte_record(&mut record) {
            Ok(false) => break,
            Ok(true) => {
                let (cells, lossy) = decode(&record);
                if lossy {
                    tracing::warn!(row = index, "replaced invalid UTF-8 in source row");
                    issues.push(ValidationIssue::row(
                        index,
                        IssueKind::ParseIssue,
                        "invalid UTF-8 replaced",
                    ));
                }
                records.push((index, cells));
            }
            Err(err) if matches!(err.kind(), csv::ErrorKind::Io(_)) => return Err(err.into()),
            Err(err) => {
                tracing::warn!(row = index, error = %err, "skipping unreadable source row");
                issues.push(ValidationIssue::row(
                    index,
                    IssueKind::ParseIssue,
                    format!("unreadable record: {err}"),
                ));
            }
        }
        index += 1;
    }

    let mut ingest = assemble(&headers, records)?;
    issues.append(&mut ingest.issues);
    ingest.issues = issues;
    Ok(ingest)
}

fn decode(record: &ByteRecord) -> (Vec<String>, bool) {
    let mut lossy = false;
    let cells = record
        .iter()
        .map(|field| match String::from_utf8_lossy(field) {
            Cow::Borrowed(text) => text.to_string(),
            Cow::Owned(text) => {
                lossy = true;
                text
            }
        })
        .collect();
    (cells, lossy)
}

fn read_spreadsheet(path: &Path) -> Result<Ingest, IngestError> {
    let failed = |reason: String| IngestError::Spreadsheet {
        path: path.display().to_string(),
        reason,
    };

    let mut workbook = open_workbook_auto(path).map_err(|e| failed(e.to_string()))?;
    let Some(sheet) = workbook.sheet_names().first().cloned() else {
        return Err(IngestError::MissingHeader);
    };
    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| failed(e.to_string()))?;
    tracing::debug!(sheet = %sheet, rows = range.height(), "reading first sheet");

    let mut grid = range
        .rows()
        .map(|cells| cells.iter().map(|c| c.to_string().trim().to_string()).collect::<Vec<_>>());
    let headers = grid.next().ok_or(IngestError::MissingHeader)?;
    assemble(&headers, grid.enumerate().collect())
}

/// Maps the columns and turns non-blank records into rows.
fn assemble(headers: &[String], records: Vec<(usize, Vec<String>)>) -> Result<Ingest, IngestError> {
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(IngestError::MissingHeader);
    }

    let sample: Vec<Vec<String>> = records.iter().map(|(_, cells)| cells.clone()).collect();
    let columns = ColumnMap::detect(headers, &sample);
    if !columns.unmapped().is_empty() {
        let names: Vec<&str> = columns.unmapped().iter().map(|(_, h)| h.as_str()).collect();
        tracing::debug!(columns = ?names, "keeping unrecognized columns as details");
    }
    for required in [SourceField::Title, SourceField::Price] {
        if !columns.contains(required) {
            tracing::warn!(field = ?required, "no column found; every row will be excluded");
        }
    }

    let rows = records
        .into_iter()
        .filter(|(_, cells)| cells.iter().any(|c| !c.trim().is_empty()))
        .map(|(index, cells)| to_source_row(index, &cells, &columns))
        .collect();
    Ok(Ingest {
        rows,
        issues: Vec::new(),
    })
}

fn to_source_row(index: usize, record: &[String], columns: &ColumnMap) -> SourceRow {
    let at = |pos: usize| -> Option<String> {
        record
            .get(pos)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };
    let cell = |field: SourceField| columns.position(field).and_then(at);

    let mut row = SourceRow {
        index,
        title: cell(SourceField::Title),
        description: cell(SourceField::Description),
        colors: cell(SourceField::Colors),
        sizes: cell(SourceField::Sizes),
        sku: cell(SourceField::Sku),
        price: cell(SourceField::Price),
        compare_price: cell(SourceField::ComparePrice),
        product_category: cell(SourceField::ProductCategory),
        product_type: cell(SourceField::ProductType),
        published: cell(SourceField::Published),
        ..SourceRow::default()
    };
    for (field, pos) in columns.fields() {
        if let (Some(key), Some(value)) = (field.detail_key(), at(pos)) {
            row.details.insert(key.to_string(), value);
        }
    }
    for (pos, header) in columns.unmapped() {
        if let Some(value) = at(*pos) {
            row.details.entry(normalize_header(header)).or_insert(value);
        }
    }
    row
}
