//! Loading an uploaded workbook into a [`Table`]: plain parse first, then
//! password decryption when the plain parse fails.

use crate::adapters::decrypt::{decrypt_package, DecryptError};
use crate::domain::model::{CellValue, Table};
use crate::utils::error::{LedgerError, Result};
use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use chrono::{NaiveDate, NaiveDateTime};
use std::io::Cursor;
use thiserror::Error;

/// First stage: reading the bytes as an unencrypted workbook.
#[derive(Error, Debug)]
pub enum ParseFailure {
    /// The bytes are not a workbook calamine can open.
    #[error("unreadable workbook: {0}")]
    Unreadable(String),

    /// The workbook opened but holds no usable table.
    #[error("{0}")]
    Content(String),
}

/// Second stage: decrypting and then reading the decrypted workbook.
#[derive(Error, Debug)]
pub enum DecryptionFailure {
    #[error(transparent)]
    Decrypt(#[from] DecryptError),

    #[error("decrypted content is not a workbook: {0}")]
    Parse(#[from] ParseFailure),
}

/// Reads `bytes` as a workbook, decrypting with `password` when the file is
/// not a plain spreadsheet.
pub fn load(bytes: &[u8], password: Option<&str>, label: &str, sheet: Option<&str>) -> Result<Table> {
    match parse_workbook(bytes, sheet) {
        Ok(table) => {
            tracing::debug!("📄 '{}' read as an unencrypted workbook", label);
            return Ok(table);
        }
        Err(ParseFailure::Content(message)) => {
            return Err(LedgerError::ParseFailure {
                label: label.to_string(),
                message,
            })
        }
        Err(failure @ ParseFailure::Unreadable(_)) => {
            tracing::debug!("'{}' is not a plain workbook ({}), trying decryption", label, failure);
        }
    }

    let password = match password {
        Some(password) if !password.trim().is_empty() => password,
        _ => {
            return Err(LedgerError::MissingPassword {
                label: label.to_string(),
            })
        }
    };

    let table = decrypt_workbook(bytes, password, sheet).map_err(|failure| {
        LedgerError::DecryptionFailed {
            label: label.to_string(),
            reason: failure.to_string(),
        }
    })?;
    tracing::info!("🔓 Decrypted '{}'", label);
    Ok(table)
}

pub fn decrypt_workbook(
    bytes: &[u8],
    password: &str,
    sheet: Option<&str>,
) -> std::result::Result<Table, DecryptionFailure> {
    let decrypted = decrypt_package(bytes, password)?;
    Ok(parse_workbook(&decrypted, sheet)?)
}

/// Parses the first worksheet (or `sheet`) with its first row as header.
pub fn parse_workbook(bytes: &[u8], sheet: Option<&str>) -> std::result::Result<Table, ParseFailure> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| ParseFailure::Unreadable(e.to_string()))?;

    let sheet_names = workbook.sheet_names();
    let sheet_name = match sheet {
        Some(name) => sheet_names
            .iter()
            .find(|candidate| candidate.as_str() == name)
            .cloned()
            .ok_or_else(|| ParseFailure::Content(format!("worksheet '{}' not found", name)))?,
        None => sheet_names
            .first()
            .cloned()
            .ok_or_else(|| ParseFailure::Content("workbook has no worksheets".to_string()))?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| ParseFailure::Content(format!("worksheet '{}': {}", sheet_name, e)))?;

    range_to_table(&range)
        .ok_or_else(|| ParseFailure::Content(format!("worksheet '{}' is empty", sheet_name)))
}

fn range_to_table(range: &Range<Data>) -> Option<Table> {
    let mut rows = range.rows();
    let header_row = rows.next()?;

    let headers = header_row
        .iter()
        .enumerate()
        .map(|(index, cell)| {
            convert_cell(cell)
                .as_text()
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| format!("Unnamed: {}", index))
        })
        .collect();

    let rows = rows
        .map(|row| row.iter().map(convert_cell).collect())
        .collect();

    Some(Table::new(headers, rows))
}

fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Int(value) => CellValue::Int(*value),
        Data::Float(value) => CellValue::Float(*value),
        Data::String(value) => CellValue::Text(value.clone()),
        Data::Bool(value) => CellValue::Bool(*value),
        Data::DateTime(value) => value
            .as_datetime()
            .map(CellValue::DateTime)
            .unwrap_or(CellValue::Float(value.as_f64())),
        Data::DateTimeIso(value) => parse_iso_datetime(value)
            .map(CellValue::DateTime)
            .unwrap_or_else(|| CellValue::Text(value.clone())),
        Data::DurationIso(value) => CellValue::Text(value.clone()),
        _ => CellValue::Empty,
    }
}

fn parse_iso_datetime(value: &str) -> Option<NaiveDateTime> {
    value
        .parse::<NaiveDateTime>()
        .ok()
        .or_else(|| {
            value
                .parse::<NaiveDate>()
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}
