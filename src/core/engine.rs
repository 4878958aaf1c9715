use crate::core::search::search;
use crate::core::session::Session;
use crate::core::Pipeline;
use crate::domain::model::SearchResult;
use crate::utils::error::Result;

/// Runs submissions and searches against a [`Session`].
pub struct LedgerEngine<P: Pipeline> {
    pipeline: P,
    max_display_rows: usize,
}

impl<P: Pipeline> LedgerEngine<P> {
    pub fn new(pipeline: P, max_display_rows: usize) -> Self {
        Self {
            pipeline,
            max_display_rows,
        }
    }

    /// Reads, decrypts and merges the session's uploads, then commits the
    /// merged table. On error the session keeps its previous data.
    pub async fn submit(&self, session: &mut Session) -> Result<usize> {
        let uploads = session.uploads()?.clone();

        tracing::info!("📥 Reading {}...", uploads.ledger.label);
        let ledger = self.pipeline.extract(&uploads.ledger).await?;
        tracing::info!("📥 Read {} {} rows", ledger.len(), uploads.ledger.label);

        tracing::info!("📥 Reading {}...", uploads.price.label);
        let price = self.pipeline.extract(&uploads.price).await?;
        tracing::info!("📥 Read {} {} rows", price.len(), uploads.price.label);

        let merged = self.pipeline.transform(ledger, price).await?;
        let rows = merged.len();
        session.commit(merged);

        Ok(rows)
    }

    pub fn search<'s>(&self, session: &'s mut Session, keyword: &str) -> Result<&'s SearchResult> {
        let result = search(session.merged()?, keyword, self.max_display_rows);
        session.record_search(result)
    }
}
