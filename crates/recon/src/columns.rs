//! Header auto-detection: ranked candidate lists against human-authored
//! column names, plus master-sheet name suggestion.

use std::fmt;

use serde::Serialize;

/// The canonical fields a sheet can contribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    Key,
    Quantity,
    ProductName,
    Location,
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key => write!(f, "key"),
            Self::Quantity => write!(f, "quantity"),
            Self::ProductName => write!(f, "product name"),
            Self::Location => write!(f, "location"),
        }
    }
}

/// Resolve a canonical field against the actual headers of a sheet.
///
/// Matching is case-insensitive and whitespace-trimmed. The FIRST candidate
/// in list order that matches any header wins, not the first header in sheet
/// order. Returns `None` when nothing matches; callers decide whether that
/// is fatal for their sheet.
pub fn resolve_column<'a>(headers: &'a [String], candidates: &[String]) -> Option<&'a str> {
    for candidate in candidates {
        let want = candidate.trim().to_lowercase();
        if let Some(header) = headers.iter().find(|h| h.trim().to_lowercase() == want) {
            return Some(header.as_str());
        }
    }
    None
}

/// First sheet whose name contains one of the master keywords,
/// case-insensitively. Callers fall back to the second sheet if one exists,
/// else the first.
pub fn suggest_master_sheet<'a>(sheet_names: &'a [String], keywords: &[String]) -> Option<&'a str> {
    for name in sheet_names {
        let lower = name.to_lowercase();
        if keywords.iter().any(|k| lower.contains(&k.to_lowercase())) {
            return Some(name.as_str());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReconConfig;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn quantity_candidates_match_japanese_header() {
        let config = ReconConfig::default();
        let h = headers(&["商品名", "在庫数", "棚番"]);
        assert_eq!(resolve_column(&h, &config.candidates.quantity), Some("在庫数"));
    }

    #[test]
    fn key_match_trims_and_ignores_case() {
        let config = ReconConfig::default();
        let h = headers(&["備考", " JAN ", "個数"]);
        assert_eq!(resolve_column(&h, &config.candidates.key), Some(" JAN "));
    }

    #[test]
    fn first_candidate_wins_over_sheet_order() {
        // "JAN" precedes "barcode" in the candidate list, so it wins even
        // though "barcode" comes first in the sheet.
        let config = ReconConfig::default();
        let h = headers(&["barcode", "JAN"]);
        assert_eq!(resolve_column(&h, &config.candidates.key), Some("JAN"));
    }

    #[test]
    fn unmatched_returns_none() {
        let config = ReconConfig::default();
        let h = headers(&["備考", "単価"]);
        assert_eq!(resolve_column(&h, &config.candidates.quantity), None);
    }

    #[test]
    fn master_sheet_suggestion() {
        let config = ReconConfig::default();
        let names = headers(&["在庫", "商品マスター", "メモ"]);
        assert_eq!(
            suggest_master_sheet(&names, &config.master_keywords),
            Some("商品マスター")
        );

        let names = headers(&["Sheet1", "Product Master"]);
        assert_eq!(
            suggest_master_sheet(&names, &config.master_keywords),
            Some("Product Master")
        );

        let names = headers(&["シート1", "シート2"]);
        assert_eq!(suggest_master_sheet(&names, &config.master_keywords), None);
    }
}
