use crate::domain::model::{MergedTable, SearchResult};

/// Display cap for search results.
pub const DEFAULT_MAX_DISPLAY_ROWS: usize = 500;

/// Case-insensitive literal substring search over product name and code.
///
/// Rows whose compared field is empty are skipped for that field. Order is
/// preserved; `total_matches` counts every match even past `max_rows`.
pub fn search(table: &MergedTable, keyword: &str, max_rows: usize) -> SearchResult {
    let needle = keyword.to_lowercase();
    let contains = |field: &Option<String>| {
        field
            .as_deref()
            .map(|value| value.to_lowercase().contains(&needle))
            .unwrap_or(false)
    };

    let mut total_matches = 0usize;
    let mut rows = Vec::new();
    for row in &table.rows {
        if contains(&row.product_name) || contains(&row.code) {
            total_matches += 1;
            if rows.len() < max_rows {
                rows.push(row.clone());
            }
        }
    }

    tracing::debug!(
        "🔎 Search '{}' matched {} rows (showing {})",
        keyword,
        total_matches,
        rows.len()
    );

    SearchResult {
        keyword: keyword.to_string(),
        truncated: total_matches > rows.len(),
        total_matches,
        rows,
    }
}
