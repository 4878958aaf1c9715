pub mod toml_config;

#[cfg(feature = "cli")]
use crate::app::render::OutputFormat;
#[cfg(feature = "cli")]
use crate::domain::model::{Upload, UploadSet};
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{
    validate_file_extension, validate_path, validate_positive_number, Validate,
    SPREADSHEET_EXTENSIONS,
};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use toml_config::TomlConfig;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "ledger-merge")]
#[command(about = "Merge a (possibly encrypted) ledger workbook with a price list and search it")]
pub struct CliConfig {
    /// Ledger workbook (.xlsx), optionally password-protected
    #[arg(long)]
    pub ledger: String,

    /// Price list workbook (.xlsx)
    #[arg(long)]
    pub price: String,

    #[arg(long, env = "LEDGER_PASSWORD", hide_env_values = true)]
    pub ledger_password: Option<String>,

    #[arg(long, env = "PRICE_PASSWORD", hide_env_values = true)]
    pub price_password: Option<String>,

    /// Search the merged table for this keyword (repeatable)
    #[arg(short, long)]
    pub keyword: Vec<String>,

    /// Prompt for search keywords after merging
    #[arg(short, long)]
    pub interactive: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Tsv)]
    pub format: OutputFormat,

    /// Maximum rows shown per search result
    #[arg(long)]
    pub max_rows: Option<usize>,

    #[arg(long)]
    pub ledger_sheet: Option<String>,

    #[arg(long)]
    pub price_sheet: Option<String>,

    /// Do not print the full merged table
    #[arg(long)]
    pub skip_table: bool,

    /// Optional TOML file with column names, sheets and limits
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Loads the TOML file (if any) and applies command-line overrides.
    pub fn resolve(&self) -> Result<TomlConfig> {
        let mut config = match &self.config {
            Some(path) => TomlConfig::from_file(path)?,
            None => TomlConfig::default(),
        };

        if let Some(max_rows) = self.max_rows {
            config.display.max_rows = max_rows;
        }
        if let Some(sheet) = &self.ledger_sheet {
            config.ledger.sheet = Some(sheet.clone());
        }
        if let Some(sheet) = &self.price_sheet {
            config.price.sheet = Some(sheet.clone());
        }
        if let Some(password) = &self.ledger_password {
            config.ledger.password = Some(password.clone());
        }
        if let Some(password) = &self.price_password {
            config.price.password = Some(password.clone());
        }

        config.validate()?;
        Ok(config)
    }

    pub fn uploads(&self, config: &TomlConfig) -> UploadSet {
        UploadSet {
            ledger: Upload::ledger(self.ledger.clone(), config.ledger.password.clone()),
            price: Upload::price(self.price.clone(), config.price.password.clone()),
        }
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("ledger", &self.ledger)?;
        validate_file_extension("ledger", &self.ledger, SPREADSHEET_EXTENSIONS)?;
        validate_path("price", &self.price)?;
        validate_file_extension("price", &self.price, SPREADSHEET_EXTENSIONS)?;

        if let Some(max_rows) = self.max_rows {
            validate_positive_number("max_rows", max_rows, 1)?;
        }
        if let Some(path) = &self.config {
            validate_path("config", path)?;
        }
        Ok(())
    }
}
