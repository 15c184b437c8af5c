//! Declarative filter predicates over aggregated rows. Pure and
//! order-preserving; the three predicates compose with logical AND.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::model::AggregatedRow;

// ---------------------------------------------------------------------------
// Stock-level buckets
// ---------------------------------------------------------------------------

/// Bucket test against the NEWEST snapshot's quantity (plus the oldest
/// quantity and new-product flag for the classification buckets).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StockFilter {
    #[default]
    Any,
    /// Oldest quantity exactly 0, newest ≥ 1, and not a new product.
    Restocked,
    /// Absent from the oldest snapshot and newest ≥ 1.
    NewProduct,
    OutOfStock,
    Range1To9,
    Range10To19,
    Range20To29,
    Range30To39,
    Range40Plus,
}

impl StockFilter {
    pub fn matches(&self, row: &AggregatedRow) -> bool {
        let oldest = row.oldest_quantity();
        let newest = row.newest_quantity();
        match self {
            Self::Any => true,
            Self::Restocked => oldest == 0 && newest >= 1 && !row.is_new,
            Self::NewProduct => row.is_new && newest >= 1,
            Self::OutOfStock => newest == 0,
            Self::Range1To9 => (1..=9).contains(&newest),
            Self::Range10To19 => (10..=19).contains(&newest),
            Self::Range20To29 => (20..=29).contains(&newest),
            Self::Range30To39 => (30..=39).contains(&newest),
            Self::Range40Plus => newest >= 40,
        }
    }
}

impl fmt::Display for StockFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Any => "any",
            Self::Restocked => "restocked",
            Self::NewProduct => "new",
            Self::OutOfStock => "out-of-stock",
            Self::Range1To9 => "1-9",
            Self::Range10To19 => "10-19",
            Self::Range20To29 => "20-29",
            Self::Range30To39 => "30-39",
            Self::Range40Plus => "40-plus",
        };
        write!(f, "{s}")
    }
}

impl FromStr for StockFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "any" => Ok(Self::Any),
            "restocked" => Ok(Self::Restocked),
            "new" => Ok(Self::NewProduct),
            "out-of-stock" => Ok(Self::OutOfStock),
            "1-9" => Ok(Self::Range1To9),
            "10-19" => Ok(Self::Range10To19),
            "20-29" => Ok(Self::Range20To29),
            "30-39" => Ok(Self::Range30To39),
            "40-plus" => Ok(Self::Range40Plus),
            other => Err(format!(
                "unknown stock filter '{other}' (expected any, restocked, new, \
                 out-of-stock, 1-9, 10-19, 20-29, 30-39, 40-plus)"
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Decrease-rate thresholds
// ---------------------------------------------------------------------------

/// Minimum decrease-rate threshold, compared against the INTERNAL raw rate,
/// never the display sentinel. Rows with a non-positive baseline carry raw
/// 0.0 and so never satisfy a positive threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DecreaseFilter {
    #[default]
    Any,
    AtLeast10,
    AtLeast20,
    AtLeast30,
    AtLeast40,
    AtLeast50,
    AtLeast75,
}

impl DecreaseFilter {
    fn threshold(&self) -> Option<f64> {
        match self {
            Self::Any => None,
            Self::AtLeast10 => Some(10.0),
            Self::AtLeast20 => Some(20.0),
            Self::AtLeast30 => Some(30.0),
            Self::AtLeast40 => Some(40.0),
            Self::AtLeast50 => Some(50.0),
            Self::AtLeast75 => Some(75.0),
        }
    }

    pub fn matches(&self, row: &AggregatedRow) -> bool {
        match self.threshold() {
            None => true,
            Some(threshold) => row.decrease_rate_raw >= threshold,
        }
    }
}

impl fmt::Display for DecreaseFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.threshold() {
            None => write!(f, "any"),
            Some(threshold) => write!(f, "{}", threshold as i64),
        }
    }
}

impl FromStr for DecreaseFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "any" => Ok(Self::Any),
            "10" => Ok(Self::AtLeast10),
            "20" => Ok(Self::AtLeast20),
            "30" => Ok(Self::AtLeast30),
            "40" => Ok(Self::AtLeast40),
            "50" => Ok(Self::AtLeast50),
            "75" => Ok(Self::AtLeast75),
            other => Err(format!(
                "unknown decrease filter '{other}' (expected any, 10, 20, 30, 40, 50, 75)"
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Composition
// ---------------------------------------------------------------------------

/// The full filter set one interaction applies: text search, stock bucket,
/// decrease threshold.
#[derive(Debug, Clone, Default)]
pub struct FilterSpec {
    pub query: Option<String>,
    pub stock: StockFilter,
    pub decrease: DecreaseFilter,
}

impl FilterSpec {
    pub fn is_empty(&self) -> bool {
        self.query.as_deref().map_or(true, str::is_empty)
            && self.stock == StockFilter::Any
            && self.decrease == DecreaseFilter::Any
    }

    fn query_matches(&self, row: &AggregatedRow) -> bool {
        match self.query.as_deref() {
            None | Some("") => true,
            Some(query) => {
                let needle = query.to_lowercase();
                row.product_name.to_lowercase().contains(&needle)
                    || row.location.to_lowercase().contains(&needle)
            }
        }
    }

    /// Apply all predicates. Never reorders rows.
    pub fn apply(&self, rows: &[AggregatedRow]) -> Vec<AggregatedRow> {
        rows.iter()
            .filter(|row| {
                self.query_matches(row) && self.stock.matches(row) && self.decrease.matches(row)
            })
            .cloned()
            .collect()
    }
}
