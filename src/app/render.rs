use crate::domain::model::{MergedRow, SearchResult, MERGED_COLUMNS};
use crate::utils::error::Result;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum OutputFormat {
    Tsv,
    Csv,
    Json,
}

pub fn render_rows<W: Write>(writer: W, rows: &[MergedRow], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Tsv => write_delimited(writer, rows, b'\t'),
        OutputFormat::Csv => write_delimited(writer, rows, b','),
        OutputFormat::Json => {
            let mut writer = writer;
            serde_json::to_writer_pretty(&mut writer, rows)?;
            writeln!(writer)?;
            Ok(())
        }
    }
}

/// Writes the match count line followed by the (capped) matching rows.
pub fn render_search<W: Write>(
    mut writer: W,
    result: &SearchResult,
    format: OutputFormat,
) -> Result<()> {
    if format == OutputFormat::Json {
        serde_json::to_writer_pretty(&mut writer, result)?;
        writeln!(writer)?;
        return Ok(());
    }

    write!(writer, "🔎 {} results found", result.total_matches)?;
    if result.truncated {
        write!(writer, " (showing first {})", result.rows.len())?;
    }
    writeln!(writer)?;
    render_rows(writer, &result.rows, format)
}

fn write_delimited<W: Write>(writer: W, rows: &[MergedRow], delimiter: u8) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);

    csv_writer.write_record(MERGED_COLUMNS)?;
    for row in rows {
        let price = row.price_including_tax.map(format_price).unwrap_or_default();
        csv_writer.write_record([
            row.division.as_deref().unwrap_or_default(),
            row.order_date.as_deref().unwrap_or_default(),
            row.category.as_deref().unwrap_or_default(),
            row.vendor.as_deref().unwrap_or_default(),
            row.product_name.as_deref().unwrap_or_default(),
            row.code.as_deref().unwrap_or_default(),
            price.as_str(),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}

fn format_price(price: f64) -> String {
    if price.fract() == 0.0 && price.abs() < 1e15 {
        format!("{}", price as i64)
    } else {
        price.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(product: &str, code: Option<&str>, price: Option<f64>) -> MergedRow {
        MergedRow {
            division: Some("매출".to_string()),
            order_date: Some("2024-03-05".to_string()),
            category: None,
            vendor: Some("거래처A".to_string()),
            product_name: Some(product.to_string()),
            code: code.map(str::to_string),
            price_including_tax: price,
        }
    }

    #[test]
    fn test_tsv_rendering() {
        let mut output = Vec::new();
        render_rows(
            &mut output,
            &[row("선반(ABC)", Some("ABC"), Some(11000.0))],
            OutputFormat::Tsv,
        )
        .unwrap();

        let text = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], MERGED_COLUMNS.join("\t"));
        assert_eq!(lines[1], "매출\t2024-03-05\t\t거래처A\t선반(ABC)\tABC\t11000");
    }

    #[test]
    fn test_csv_quotes_commas() {
        let mut output = Vec::new();
        render_rows(&mut output, &[row("a, b", None, None)], OutputFormat::Csv).unwrap();
        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("\"a, b\""));
    }

    #[test]
    fn test_search_count_line() {
        let result = SearchResult {
            keyword: "abc".to_string(),
            total_matches: 3,
            rows: vec![row("선반(ABC)", Some("ABC"), Some(1.5))],
            truncated: true,
        };
        let mut output = Vec::new();
        render_search(&mut output, &result, OutputFormat::Tsv).unwrap();

        let text = String::from_utf8(output).unwrap();
        assert!(text.starts_with("🔎 3 results found (showing first 1)"));
        assert!(text.contains("\t1.5"));
    }

    #[test]
    fn test_json_rendering_uses_null_for_missing_price() {
        let mut output = Vec::new();
        render_rows(&mut output, &[row("x", None, None)], OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&output).unwrap();
        assert!(value[0]["price_including_tax"].is_null());
        assert_eq!(value[0]["product_name"], "x");
    }
}
