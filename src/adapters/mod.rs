// Adapters layer: concrete implementations for external systems (files, workbooks, decryption).

pub mod decrypt;
pub mod storage;
pub mod workbook;
