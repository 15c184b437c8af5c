//! CSV export of the relabeled comparison table.

use std::path::Path;

use stockdiff_recon::engine::ExportTable;

pub fn write_export_csv(table: &ExportTable, path: &Path) -> Result<(), String> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| format!("cannot write {}: {e}", path.display()))?;

    writer
        .write_record(&table.headers)
        .map_err(|e| e.to_string())?;
    for row in &table.rows {
        writer.write_record(row).map_err(|e| e.to_string())?;
    }
    writer.flush().map_err(|e| e.to_string())?;
    Ok(())
}
