pub mod engine;
pub mod extract;
pub mod merge;
pub mod pipeline;
pub mod search;
pub mod session;

pub use crate::domain::model::{MergedTable, SearchResult, Table};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
