//! CSV formats used by the bulk upload and download tools

pub mod export;
pub mod import;

pub use export::{export_filename, write_allocations_csv, ExportFormat};
pub use import::{parse_allocation_csv, parse_investor_csv, AllocationRow, InvestorRow, ParsedBatch};
