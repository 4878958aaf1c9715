use crate::core::search::DEFAULT_MAX_DISPLAY_ROWS;
use crate::core::ConfigProvider;
use crate::domain::model::ColumnMapping;
use crate::utils::error::{LedgerError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_positive_number, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

static ENV_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid placeholder pattern"));

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub columns: ColumnMapping,
    pub ledger: WorkbookConfig,
    pub price: WorkbookConfig,
    pub display: DisplayConfig,
}

/// Per-workbook settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkbookConfig {
    pub sheet: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub max_rows: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            max_rows: DEFAULT_MAX_DISPLAY_ROWS,
        }
    }
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(LedgerError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| LedgerError::ConfigError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are
    /// left as written.
    fn substitute_env_vars(content: &str) -> String {
        ENV_PLACEHOLDER
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn validate_config(&self) -> Result<()> {
        for (field, header) in self.columns.entries() {
            validate_non_empty_string(&format!("columns.{}", field), header)?;
        }

        validate_positive_number("display.max_rows", self.display.max_rows, 1)?;

        for (field, sheet) in [
            ("ledger.sheet", &self.ledger.sheet),
            ("price.sheet", &self.price.sheet),
        ] {
            if let Some(sheet) = sheet {
                validate_non_empty_string(field, sheet)?;
            }
        }

        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn columns(&self) -> &ColumnMapping {
        &self.columns
    }

    fn ledger_sheet(&self) -> Option<&str> {
        self.ledger.sheet.as_deref()
    }

    fn price_sheet(&self) -> Option<&str> {
        self.price.sheet.as_deref()
    }

    fn max_display_rows(&self) -> usize {
        self.display.max_rows
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
