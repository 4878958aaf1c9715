use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A single cell as read from a worksheet.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl CellValue {
    /// Text rendering of the cell; `None` for empty cells.
    ///
    /// Whole floats print without a fractional part so that numeric codes such
    /// as `12345.0` compare equal to the text `12345`.
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Empty => None,
            CellValue::Text(text) if text.is_empty() => None,
            CellValue::Text(text) => Some(text.clone()),
            CellValue::Int(value) => Some(value.to_string()),
            CellValue::Float(value) if value.fract() == 0.0 && value.abs() < 1e15 => {
                Some(format!("{}", *value as i64))
            }
            CellValue::Float(value) => Some(value.to_string()),
            CellValue::Bool(value) => Some(value.to_string()),
            CellValue::DateTime(value) => Some(value.to_string()),
        }
    }
}

/// Header row plus data rows of one worksheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self { headers, rows }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell at `(row, column)`, treating short rows as padded with empties.
    pub fn cell(&self, row: usize, column: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .unwrap_or(&CellValue::Empty)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Ledger,
    Price,
}

/// A file handed in by the user together with the password typed for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub kind: UploadKind,
    pub label: String,
    pub path: String,
    pub password: Option<String>,
}

impl Upload {
    pub fn ledger(path: impl Into<String>, password: Option<String>) -> Self {
        Self::new(UploadKind::Ledger, "ledger", path, password)
    }

    pub fn price(path: impl Into<String>, password: Option<String>) -> Self {
        Self::new(UploadKind::Price, "price list", path, password)
    }

    pub fn new(
        kind: UploadKind,
        label: impl Into<String>,
        path: impl Into<String>,
        password: Option<String>,
    ) -> Self {
        Self {
            kind,
            label: label.into(),
            path: path.into(),
            password,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSet {
    pub ledger: Upload,
    pub price: Upload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerRow {
    pub division: Option<String>,
    pub order_date: Option<String>,
    pub category: Option<String>,
    pub vendor: Option<String>,
    pub product_name: Option<String>,
    pub code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRow {
    pub code: String,
    pub price_including_tax: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedRow {
    pub division: Option<String>,
    pub order_date: Option<String>,
    pub category: Option<String>,
    pub vendor: Option<String>,
    pub product_name: Option<String>,
    pub code: Option<String>,
    pub price_including_tax: Option<f64>,
}

impl MergedRow {
    pub fn from_ledger(row: LedgerRow, price_including_tax: Option<f64>) -> Self {
        Self {
            division: row.division,
            order_date: row.order_date,
            category: row.category,
            vendor: row.vendor,
            product_name: row.product_name,
            code: row.code,
            price_including_tax,
        }
    }
}

/// Source header names for the columns the merge reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMapping {
    pub division: String,
    pub order_date: String,
    pub category: String,
    pub vendor: String,
    pub product_name: String,
    pub code: String,
    pub price_including_tax: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            division: "구분".to_string(),
            order_date: "주문자".to_string(),
            category: "분류".to_string(),
            vendor: "거래처".to_string(),
            product_name: "주문상품명".to_string(),
            code: "코드".to_string(),
            price_including_tax: "부가포함가".to_string(),
        }
    }
}

impl ColumnMapping {
    /// `(field, header)` pairs, used for validation messages.
    pub fn entries(&self) -> [(&'static str, &str); 7] {
        [
            ("division", &self.division),
            ("order_date", &self.order_date),
            ("category", &self.category),
            ("vendor", &self.vendor),
            ("product_name", &self.product_name),
            ("code", &self.code),
            ("price_including_tax", &self.price_including_tax),
        ]
    }
}

/// Output header labels, in projection order.
pub const MERGED_COLUMNS: [&str; 7] = [
    "division",
    "order_date",
    "category",
    "vendor",
    "product_name",
    "code",
    "price_including_tax",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MergedTable {
    pub rows: Vec<MergedRow>,
}

impl MergedTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub keyword: String,
    pub total_matches: usize,
    pub rows: Vec<MergedRow>,
    pub truncated: bool,
}
