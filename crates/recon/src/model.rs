use serde::Serialize;

// ---------------------------------------------------------------------------
// Sentinels
// ---------------------------------------------------------------------------

/// Product name assigned to quantity rows whose key has no master match.
pub const UNKNOWN_PRODUCT: &str = "（不明：マスター未登録）";

/// Location value when no shelf/location could be resolved.
pub const NO_LOCATION: &str = "-";

/// Displayed decrease rate when the oldest quantity is too small to report.
pub const RATE_NOT_APPLICABLE: &str = "-";

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// A single parsed cell. Formula results arrive already cached as plain data.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl CellValue {
    /// Trimmed textual form, `None` for empty/blank cells.
    ///
    /// Whole numbers render without a fractional part so a barcode stored as
    /// a float on one sheet still equals the same barcode typed as text on
    /// another.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Empty => None,
            Self::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            Self::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    Some(format!("{}", *n as i64))
                } else {
                    Some(format!("{n}"))
                }
            }
            Self::Bool(b) => Some(if *b { "TRUE".into() } else { "FALSE".into() }),
        }
    }

    /// Coerce to a non-negative integer quantity; anything non-numeric is 0.
    pub fn coerce_quantity(&self) -> i64 {
        let n = match self {
            Self::Empty => 0.0,
            Self::Number(n) => *n,
            Self::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Self::Text(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        };
        if n.is_finite() && n > 0.0 {
            n.trunc() as i64
        } else {
            0
        }
    }
}

/// A parsed worksheet: ordered headers plus one value column per header.
///
/// Invariant: `columns.len() == headers.len()` and every column has the same
/// row count. Duplicate headers are kept; `column()` returns the first.
#[derive(Debug, Clone)]
pub struct SheetTable {
    name: String,
    headers: Vec<String>,
    columns: Vec<Vec<CellValue>>,
}

impl SheetTable {
    pub fn new(name: impl Into<String>, headers: Vec<String>, columns: Vec<Vec<CellValue>>) -> Self {
        debug_assert_eq!(headers.len(), columns.len());
        Self { name: name.into(), headers, columns }
    }

    /// Build from row-major data (header row already split off).
    /// Short rows are padded with empty cells.
    pub fn from_rows(
        name: impl Into<String>,
        headers: Vec<String>,
        rows: Vec<Vec<CellValue>>,
    ) -> Self {
        let width = headers.len();
        let mut columns: Vec<Vec<CellValue>> = vec![Vec::with_capacity(rows.len()); width];
        for row in rows {
            for (col_idx, column) in columns.iter_mut().enumerate() {
                column.push(row.get(col_idx).cloned().unwrap_or(CellValue::Empty));
            }
        }
        Self { name: name.into(), headers, columns }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map(|c| c.len()).unwrap_or(0)
    }

    /// Column values for an exact header match (first occurrence).
    pub fn column(&self, header: &str) -> Option<&[CellValue]> {
        let idx = self.headers.iter().position(|h| h == header)?;
        Some(&self.columns[idx])
    }
}

// ---------------------------------------------------------------------------
// Canonical per-snapshot rows
// ---------------------------------------------------------------------------

/// One de-duplicated (product, quantity, location) record within a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalRow {
    pub product_name: String,
    pub quantity: i64,
    pub location: String,
}

/// A point-in-time inventory extract, reduced to canonical rows.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    /// Position-and-origin label, e.g. "#2 (stock_0215.xlsx)".
    pub label: String,
    /// Origin file name; the history identity key is built from these.
    pub origin: String,
    pub rows: Vec<CanonicalRow>,
}

// ---------------------------------------------------------------------------
// Aggregated cross-snapshot rows
// ---------------------------------------------------------------------------

/// A cross-snapshot record: one quantity per snapshot plus derived metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedRow {
    pub product_name: String,
    pub location: String,
    /// One quantity per snapshot, chronological oldest→newest.
    pub quantities: Vec<i64>,
    /// Newest quantity minus oldest quantity.
    pub delta: i64,
    /// Display form: "12.5%" or the "-" sentinel when oldest ≤ 10.
    pub decrease_rate: String,
    /// Raw percentage used for threshold filtering; 0.0 when oldest ≤ 0.
    #[serde(skip_serializing)]
    pub decrease_rate_raw: f64,
    /// Absent (not merely zero) in the oldest snapshot.
    pub is_new: bool,
}

impl AggregatedRow {
    pub fn oldest_quantity(&self) -> i64 {
        self.quantities.first().copied().unwrap_or(0)
    }

    pub fn newest_quantity(&self) -> i64 {
        self.quantities.last().copied().unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// Summary + Result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconSummary {
    pub total_products: usize,
    pub increased: usize,
    pub decreased: usize,
    pub unchanged: usize,
    /// Rows joined under the unknown-product sentinel (master gaps).
    pub unregistered: usize,
}

/// A file that failed to parse or join; the rest of the run proceeds.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedFile {
    pub origin: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub config_name: String,
    pub snapshot_labels: Vec<String>,
    /// Origin file names of the surviving snapshots, oldest first.
    pub snapshot_origins: Vec<String>,
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconResult {
    pub meta: ReconMeta,
    pub summary: ReconSummary,
    pub rows: Vec<AggregatedRow>,
    pub skipped: Vec<SkippedFile>,
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

/// One recorded aggregation run. Rows are a deep copy owned by the entry;
/// later processing never mutates them.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    /// Ordered snapshot origin names; exact tuple equality deduplicates.
    pub identity_key: Vec<String>,
    pub timestamp: String,
    pub snapshot_count: usize,
    pub product_count: usize,
    pub rows: Vec<AggregatedRow>,
}
