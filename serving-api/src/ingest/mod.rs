//! Request body ingestion: CSV uploads and JSON records

pub mod records;
pub mod upload;
