//! Run orchestration: join each snapshot, collect per-file failures,
//! aggregate the survivors, derive summary and export views.

use crate::aggregate::aggregate;
use crate::config::ReconConfig;
use crate::error::ReconError;
use crate::join::join_sheets;
use crate::model::{
    AggregatedRow, ReconMeta, ReconResult, ReconSummary, SheetTable, SkippedFile, Snapshot,
    UNKNOWN_PRODUCT,
};

/// Both sheets of one uploaded workbook, already parsed.
#[derive(Debug)]
pub struct SnapshotSheets {
    pub quantity: SheetTable,
    pub master: SheetTable,
}

/// One chronological input. `sheets` is `Err` when the parsing collaborator
/// failed for this file; the error flows into the skipped list so the other
/// files still run.
#[derive(Debug)]
pub struct SnapshotInput {
    pub origin: String,
    pub sheets: Result<SnapshotSheets, ReconError>,
}

/// Run the full pipeline over parsed inputs, oldest→newest.
///
/// Per-file failures (read or join) never abort the run; they are collected
/// in `skipped`. Aggregation fails with `InsufficientSnapshots` when fewer
/// than two files survive.
pub fn run(config: &ReconConfig, inputs: Vec<SnapshotInput>) -> Result<ReconResult, ReconError> {
    let mut snapshots: Vec<Snapshot> = Vec::with_capacity(inputs.len());
    let mut skipped: Vec<SkippedFile> = Vec::new();

    for (pos, input) in inputs.into_iter().enumerate() {
        let outcome = input
            .sheets
            .and_then(|s| join_sheets(&s.quantity, &s.master, config));
        match outcome {
            Ok(rows) => snapshots.push(Snapshot {
                label: format!("#{} ({})", pos + 1, input.origin),
                origin: input.origin,
                rows,
            }),
            Err(e) => skipped.push(SkippedFile { origin: input.origin, reason: e.to_string() }),
        }
    }

    let rows = aggregate(&snapshots)?;
    let summary = compute_summary(&rows);

    Ok(ReconResult {
        meta: ReconMeta {
            config_name: config.name.clone(),
            snapshot_labels: snapshots.iter().map(|s| s.label.clone()).collect(),
            snapshot_origins: snapshots.iter().map(|s| s.origin.clone()).collect(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Local::now().to_rfc3339(),
        },
        summary,
        rows,
        skipped,
    })
}

/// Dashboard counts over the full (unfiltered) aggregated table.
pub fn compute_summary(rows: &[AggregatedRow]) -> ReconSummary {
    ReconSummary {
        total_products: rows.len(),
        increased: rows.iter().filter(|r| r.delta > 0).count(),
        decreased: rows.iter().filter(|r| r.delta < 0).count(),
        unchanged: rows.iter().filter(|r| r.delta == 0).count(),
        unregistered: rows.iter().filter(|r| r.product_name == UNKNOWN_PRODUCT).count(),
    }
}

// ---------------------------------------------------------------------------
// Export view
// ---------------------------------------------------------------------------

/// A finished, stringly-typed table for document export. Quantity columns
/// are relabeled: oldest → "previous", newest → "current", middle columns →
/// "interim-N".
#[derive(Debug, Clone)]
pub struct ExportTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// `snapshot_count` drives the header row, so a fully filtered-out result
/// still exports the same columns as a populated one.
pub fn export_table(rows: &[AggregatedRow], snapshot_count: usize) -> ExportTable {
    let mut headers = vec!["product".to_string(), "location".to_string()];
    for idx in 0..snapshot_count {
        headers.push(if idx == 0 {
            "previous".to_string()
        } else if idx == snapshot_count - 1 {
            "current".to_string()
        } else {
            format!("interim-{idx}")
        });
    }
    headers.push("delta".to_string());
    headers.push("decrease_rate".to_string());

    let rows = rows
        .iter()
        .map(|row| {
            let mut record = vec![row.product_name.clone(), row.location.clone()];
            record.extend(row.quantities.iter().map(|q| q.to_string()));
            record.push(row.delta.to_string());
            record.push(row.decrease_rate.clone());
            record
        })
        .collect();

    ExportTable { headers, rows }
}
