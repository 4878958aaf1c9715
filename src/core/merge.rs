use crate::core::extract::{extract_code, normalize_code};
use crate::domain::model::{CellValue, ColumnMapping, LedgerRow, MergedRow, MergedTable, PriceRow, Table};
use crate::utils::error::{LedgerError, Result};
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashMap;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d", "%Y%m%d"];
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%Y.%m.%d %H:%M:%S",
];

/// Left-joins prices onto the ledger by extracted product code.
///
/// Produces exactly one row per ledger row. When the price list repeats a
/// code the first occurrence is used.
pub fn merge(ledger: &Table, price: &Table, columns: &ColumnMapping) -> Result<MergedTable> {
    let ledger_rows = ledger_rows(ledger, columns)?;
    let price_index = price_index(price_rows(price, columns)?);

    let mut with_code = 0usize;
    let mut matched = 0usize;
    let rows: Vec<MergedRow> = ledger_rows
        .into_iter()
        .map(|row| {
            let price = row.code.as_ref().and_then(|code| {
                with_code += 1;
                price_index.get(code).copied()
            });
            if price.is_some() {
                matched += 1;
            }
            MergedRow::from_ledger(row, price.flatten())
        })
        .collect();

    tracing::info!(
        "🔗 Merged {} ledger rows: {} with a code, {} matched a price",
        rows.len(),
        with_code,
        matched
    );

    Ok(MergedTable { rows })
}

pub fn ledger_rows(ledger: &Table, columns: &ColumnMapping) -> Result<Vec<LedgerRow>> {
    let division = require_column(ledger, "ledger", &columns.division)?;
    let order_date = require_column(ledger, "ledger", &columns.order_date)?;
    let category = require_column(ledger, "ledger", &columns.category)?;
    let vendor = require_column(ledger, "ledger", &columns.vendor)?;
    let product_name = require_column(ledger, "ledger", &columns.product_name)?;

    let rows = (0..ledger.len())
        .map(|row| {
            let product = ledger.cell(row, product_name).as_text();
            let code = product
                .as_deref()
                .and_then(extract_code)
                .and_then(|code| normalize_code(&code));
            LedgerRow {
                division: ledger.cell(row, division).as_text(),
                order_date: coerce_date(ledger.cell(row, order_date)),
                category: ledger.cell(row, category).as_text(),
                vendor: ledger.cell(row, vendor).as_text(),
                product_name: product,
                code,
            }
        })
        .collect();

    Ok(rows)
}

/// Price rows with a usable code; rows with a blank code are dropped.
pub fn price_rows(price: &Table, columns: &ColumnMapping) -> Result<Vec<PriceRow>> {
    let code = require_column(price, "price list", &columns.code)?;
    let amount = require_column(price, "price list", &columns.price_including_tax)?;

    Ok((0..price.len())
        .filter_map(|row| {
            let code = price.cell(row, code).as_text().and_then(|c| normalize_code(&c))?;
            Some(PriceRow {
                code,
                price_including_tax: coerce_price(price.cell(row, amount)),
            })
        })
        .collect())
}

fn price_index(rows: Vec<PriceRow>) -> HashMap<String, Option<f64>> {
    let mut index = HashMap::with_capacity(rows.len());
    let mut duplicates = 0usize;
    for row in rows {
        if index.contains_key(&row.code) {
            duplicates += 1;
            continue;
        }
        index.insert(row.code, row.price_including_tax);
    }
    if duplicates > 0 {
        tracing::warn!(
            "⚠️ Price list repeats {} code(s); the first price per code is used",
            duplicates
        );
    }
    index
}

fn require_column(table: &Table, table_label: &str, name: &str) -> Result<usize> {
    table
        .column_index(name)
        .ok_or_else(|| LedgerError::MergeFailure {
            message: format!("column '{}' not found in the {} table", name, table_label),
        })
}

/// Order dates as `YYYY-MM-DD`; anything unparseable becomes `None`.
pub fn coerce_date(cell: &CellValue) -> Option<String> {
    let date = match cell {
        CellValue::DateTime(value) => Some(value.date()),
        CellValue::Text(text) => parse_date_text(text),
        CellValue::Int(value) => parse_compact_date(*value),
        CellValue::Float(value) if value.fract() == 0.0 => parse_compact_date(*value as i64),
        _ => None,
    }?;
    Some(date.format("%Y-%m-%d").to_string())
}

fn parse_date_text(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    // "2024. 3. 5." style
    let compacted: String = text.trim_end_matches('.').split_whitespace().collect();

    for candidate in [text, compacted.as_str()] {
        if let Some(date) = DATE_FORMATS
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(candidate, format).ok())
        {
            return Some(date);
        }
        if let Some(datetime) = DATETIME_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(candidate, format).ok())
        {
            return Some(datetime.date());
        }
    }
    None
}

fn parse_compact_date(value: i64) -> Option<NaiveDate> {
    if !(10_000_101..=99_991_231).contains(&value) {
        return None;
    }
    NaiveDate::from_ymd_opt(
        (value / 10_000) as i32,
        ((value / 100) % 100) as u32,
        (value % 100) as u32,
    )
}

fn coerce_price(cell: &CellValue) -> Option<f64> {
    match cell {
        CellValue::Int(value) => Some(*value as f64),
        CellValue::Float(value) => Some(*value),
        CellValue::Text(text) => {
            let cleaned: String = text
                .chars()
                .filter(|c| !matches!(c, ',' | '₩' | '원') && !c.is_whitespace())
                .collect();
            cleaned.parse().ok()
        }
        _ => None,
    }
}
