use std::fmt;

use crate::columns::CanonicalField;

#[derive(Debug, Clone)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (empty candidate list, etc.).
    ConfigValidation(String),
    /// A required canonical column could not be resolved on a sheet.
    MissingColumn {
        sheet: String,
        field: CanonicalField,
        headers: Vec<String>,
    },
    /// The parsing collaborator failed; its message is surfaced verbatim.
    SheetRead { sheet: String, message: String },
    /// Fewer than two usable snapshots reached aggregation.
    InsufficientSnapshots { found: usize },
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::MissingColumn { sheet, field, headers } => {
                write!(
                    f,
                    "sheet '{sheet}': no {field} column matched (actual headers: {})",
                    headers.join(", ")
                )
            }
            Self::SheetRead { sheet, message } => {
                write!(f, "cannot read sheet '{sheet}': {message}")
            }
            Self::InsufficientSnapshots { found } => {
                write!(f, "need at least 2 usable snapshots, got {found}")
            }
        }
    }
}

impl std::error::Error for ReconError {}
