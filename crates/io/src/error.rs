use std::fmt;

#[derive(Debug, Clone)]
pub enum IoError {
    /// The workbook file could not be opened or parsed at all.
    Open { path: String, message: String },
    /// The workbook parsed but contains no sheets.
    NoSheets { path: String },
    /// One worksheet could not be read.
    SheetRead { sheet: String, message: String },
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open { path, message } => write!(f, "cannot open workbook '{path}': {message}"),
            Self::NoSheets { path } => write!(f, "workbook '{path}' contains no sheets"),
            Self::SheetRead { sheet, message } => {
                write!(f, "cannot read sheet '{sheet}': {message}")
            }
        }
    }
}

impl std::error::Error for IoError {}
