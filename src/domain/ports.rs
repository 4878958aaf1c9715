use crate::domain::model::{ColumnMapping, MergedTable, Table, Upload};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn columns(&self) -> &ColumnMapping;
    /// Worksheet to read from the ledger; `None` means the first sheet.
    fn ledger_sheet(&self) -> Option<&str>;
    fn price_sheet(&self) -> Option<&str>;
    fn max_display_rows(&self) -> usize;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    /// Reads one upload into a table, decrypting it when needed.
    async fn extract(&self, upload: &Upload) -> Result<Table>;
    async fn transform(&self, ledger: Table, price: Table) -> Result<MergedTable>;
}
