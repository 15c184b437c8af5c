// Workbook ingestion: xlsx/xlsm/xls/ods → SheetTable

pub mod error;
pub mod workbook;

pub use error::IoError;
pub use workbook::WorkbookFile;
