use crate::adapters::workbook;
use crate::core::merge::merge;
use crate::core::{ConfigProvider, Pipeline, Storage};
use crate::domain::model::{MergedTable, Table, Upload, UploadKind};
use crate::utils::error::Result;

/// Reads uploads through a [`Storage`] and merges them with the configured
/// column names.
pub struct LedgerPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> LedgerPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    fn sheet_for(&self, kind: UploadKind) -> Option<&str> {
        match kind {
            UploadKind::Ledger => self.config.ledger_sheet(),
            UploadKind::Price => self.config.price_sheet(),
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for LedgerPipeline<S, C> {
    async fn extract(&self, upload: &Upload) -> Result<Table> {
        let bytes = self.storage.read_file(&upload.path).await?;
        tracing::debug!("Read {} bytes for {}", bytes.len(), upload.label);

        workbook::load(
            &bytes,
            upload.password.as_deref(),
            &upload.label,
            self.sheet_for(upload.kind),
        )
    }

    async fn transform(&self, ledger: Table, price: Table) -> Result<MergedTable> {
        merge(&ledger, &price, self.config.columns())
    }
}
