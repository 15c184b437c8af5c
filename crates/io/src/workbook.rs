//! Calamine-backed workbook reader. One-way conversion: worksheets become
//! the engine's `SheetTable` model; formulas arrive as their cached values.

use std::fmt;
use std::io::BufReader;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader, Sheets};
use stockdiff_recon::model::{CellValue, SheetTable};

use crate::error::IoError;

pub struct WorkbookFile {
    file_name: String,
    sheet_names: Vec<String>,
    workbook: Sheets<BufReader<std::fs::File>>,
}

// The calamine handle has no Debug impl, so derive is not available.
impl fmt::Debug for WorkbookFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkbookFile")
            .field("file_name", &self.file_name)
            .field("sheet_names", &self.sheet_names)
            .finish_non_exhaustive()
    }
}

impl WorkbookFile {
    /// Open an xlsx/xlsm/xls/ods workbook. Fails when the file cannot be
    /// parsed or has no sheets; the parser's message is kept verbatim.
    pub fn open(path: &Path) -> Result<Self, IoError> {
        let workbook = open_workbook_auto(path).map_err(|e| IoError::Open {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let sheet_names = workbook.sheet_names().to_vec();
        if sheet_names.is_empty() {
            return Err(IoError::NoSheets { path: path.display().to_string() });
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self { file_name, sheet_names, workbook })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn sheet_names(&self) -> &[String] {
        &self.sheet_names
    }

    /// Read one worksheet into a `SheetTable`. The first non-empty row is
    /// the header row; rows with no values at all are dropped.
    pub fn read_sheet(&mut self, sheet_name: &str) -> Result<SheetTable, IoError> {
        let range = self
            .workbook
            .worksheet_range(sheet_name)
            .map_err(|e| IoError::SheetRead { sheet: sheet_name.into(), message: e.to_string() })?;
        Ok(table_from_range(sheet_name, &range))
    }
}

fn table_from_range(sheet_name: &str, range: &Range<Data>) -> SheetTable {
    let mut rows_iter = range
        .rows()
        .map(|row| row.iter().map(cell_value).collect::<Vec<CellValue>>())
        .skip_while(|row| row.iter().all(|c| *c == CellValue::Empty));

    let headers: Vec<String> = match rows_iter.next() {
        Some(header_row) => header_row
            .iter()
            .map(|c| c.as_text().unwrap_or_default())
            .collect(),
        None => return SheetTable::from_rows(sheet_name, Vec::new(), Vec::new()),
    };

    let rows: Vec<Vec<CellValue>> = rows_iter
        .filter(|row| row.iter().any(|c| *c != CellValue::Empty))
        .collect();

    SheetTable::from_rows(sheet_name, headers, rows)
}

fn cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(n) => CellValue::Number(*n),
        Data::Int(n) => CellValue::Number(*n as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        // Cell errors (#REF!, #DIV/0!, ...) carry no usable value
        Data::Error(_) => CellValue::Empty,
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;

    fn write_fixture(path: &Path) {
        let mut workbook = Workbook::new();

        let sheet = workbook.add_worksheet();
        sheet.set_name("在庫").unwrap();
        sheet.write_string(0, 0, "JANコード").unwrap();
        sheet.write_string(0, 1, "個数").unwrap();
        sheet.write_number(1, 0, 4901234567890.0).unwrap();
        sheet.write_number(1, 1, 12.0).unwrap();
        sheet.write_string(2, 0, "4902").unwrap();
        sheet.write_string(2, 1, "n/a").unwrap();

        let master = workbook.add_worksheet();
        master.set_name("商品マスター").unwrap();
        master.write_string(0, 0, "JANコード").unwrap();
        master.write_string(0, 1, "商品名").unwrap();
        master.write_number(1, 0, 4901234567890.0).unwrap();
        master.write_string(1, 1, "りんごジュース").unwrap();

        workbook.save(path).unwrap();
    }

    #[test]
    fn open_lists_sheets_and_reads_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stock.xlsx");
        write_fixture(&path);

        let mut workbook = WorkbookFile::open(&path).unwrap();
        assert_eq!(workbook.file_name(), "stock.xlsx");
        assert_eq!(workbook.sheet_names(), ["在庫", "商品マスター"]);
        assert!(format!("{workbook:?}").contains("stock.xlsx"));

        let table = workbook.read_sheet("在庫").unwrap();
        assert_eq!(table.headers(), ["JANコード", "個数"]);
        assert_eq!(table.row_count(), 2);
        let keys = table.column("JANコード").unwrap();
        // Numeric barcode normalizes to its integer text form
        assert_eq!(keys[0].as_text().as_deref(), Some("4901234567890"));
        let quantities = table.column("個数").unwrap();
        assert_eq!(quantities[0].coerce_quantity(), 12);
        assert_eq!(quantities[1].coerce_quantity(), 0);
    }

    #[test]
    fn missing_file_reports_open_error() {
        let err = WorkbookFile::open(Path::new("/nonexistent/nope.xlsx")).unwrap_err();
        assert!(matches!(err, IoError::Open { .. }));
    }

    #[test]
    fn unknown_sheet_reports_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stock.xlsx");
        write_fixture(&path);

        let mut workbook = WorkbookFile::open(&path).unwrap();
        let err = workbook.read_sheet("ない").unwrap_err();
        assert!(matches!(err, IoError::SheetRead { .. }));
    }

    #[test]
    fn header_row_may_start_below_blank_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("padded.xlsx");

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name("data").unwrap();
        // Row 0 and 1 left entirely blank
        sheet.write_string(2, 0, "jan").unwrap();
        sheet.write_string(2, 1, "qty").unwrap();
        sheet.write_string(3, 0, "4901").unwrap();
        sheet.write_number(3, 1, 3.0).unwrap();
        workbook.save(&path).unwrap();

        let mut workbook = WorkbookFile::open(&path).unwrap();
        let table = workbook.read_sheet("data").unwrap();
        assert_eq!(table.headers(), ["jan", "qty"]);
        assert_eq!(table.row_count(), 1);
    }
}
