use std::collections::HashSet;
use std::fs;
use std::io::Read;
use std::path::Path;

use strata_alloc::CovariateSpec;
use strata_core::errors::{ErrorInfo, StrataError};
use strata_core::{AttributeValue, SubjectId, SubjectRecord};

/// Column holding subject identifiers; rows without one are numbered.
pub const ID_COLUMN: &str = "id";

fn csv_error(err: csv::Error) -> StrataError {
    StrataError::Serde(ErrorInfo::new("csv_read", err.to_string()))
}

/// Reads a cohort from CSV: one row per subject, one column per attribute.
///
/// Empty cells are treated as uncaptured attributes. Cells that parse as
/// numbers become numeric values, everything else is text. Subject ids must
/// be unique within the cohort.
pub fn read_cohort<R: Read>(reader: R) -> Result<Vec<SubjectRecord>, StrataError> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers = reader.headers().map_err(csv_error)?.clone();
    let mut subjects = Vec::new();
    let mut seen = HashSet::new();
    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(csv_error)?;
        let mut subject = SubjectRecord::new(row.to_string());
        for (header, cell) in headers.iter().zip(record.iter()) {
            if header == ID_COLUMN {
                if !cell.is_empty() {
                    subject.id = SubjectId::new(cell);
                }
            } else if !cell.is_empty() {
                subject = subject.with_attribute(header, parse_cell(cell));
            }
        }
        if !seen.insert(subject.id.clone()) {
            return Err(StrataError::Serde(
                ErrorInfo::new("duplicate-subject-id", "subject id appears more than once")
                    .with_context("id", subject.id.as_str())
                    .with_context("row", row.to_string()),
            ));
        }
        subjects.push(subject);
    }
    Ok(subjects)
}

/// Reads a cohort CSV from disk.
pub fn load_cohort(path: &Path) -> Result<Vec<SubjectRecord>, StrataError> {
    let file = fs::File::open(path).map_err(|err| {
        StrataError::Serde(
            ErrorInfo::new("cohort-open", err.to_string())
                .with_context("path", path.display().to_string()),
        )
    })?;
    read_cohort(file)
}

/// Reads a covariate specification YAML file from disk.
pub fn load_spec(path: &Path) -> Result<CovariateSpec, StrataError> {
    let bytes = fs::read(path).map_err(|err| {
        StrataError::Serde(
            ErrorInfo::new("spec-open", err.to_string())
                .with_context("path", path.display().to_string()),
        )
    })?;
    CovariateSpec::from_yaml(&bytes)
}

/// Codes written with a leading zero, such as `02139`, stay text so the
/// zero is not lost.
fn parse_cell(cell: &str) -> AttributeValue {
    match cell.parse::<f64>() {
        Ok(number) if number.is_finite() && !has_leading_zero(cell) => {
            AttributeValue::Number(number)
        }
        _ => AttributeValue::Text(cell.to_string()),
    }
}

fn has_leading_zero(cell: &str) -> bool {
    let digits = cell.trim_start_matches(|c: char| c == '+' || c == '-').as_bytes();
    digits.len() > 1 && digits[0] == b'0' && digits[1].is_ascii_digit()
}
