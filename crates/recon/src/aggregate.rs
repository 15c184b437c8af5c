//! Cross-snapshot outer merge and derived metrics (delta, decrease rate,
//! new-product flag).

use std::collections::BTreeMap;

use crate::error::ReconError;
use crate::model::{AggregatedRow, Snapshot, NO_LOCATION, RATE_NOT_APPLICABLE};

/// Oldest quantities at or below this never get a displayed decrease rate;
/// near-zero baselines produce volatile percentages nobody can act on.
const RATE_BASELINE_FLOOR: i64 = 10;

struct RowAcc {
    /// Per-snapshot quantity; `None` = product absent from that snapshot.
    quantities: Vec<Option<i64>>,
    /// First non-sentinel location, scanning oldest→newest.
    location: Option<String>,
}

/// Merge canonical snapshots (chronological oldest→newest) into one row per
/// product name, union-joined across all snapshots.
///
/// `is_new` is decided against the oldest snapshot only, before absent
/// quantities are replaced with 0: a product first appearing in a middle
/// snapshot is new, a product present with quantity 0 is not.
pub fn aggregate(snapshots: &[Snapshot]) -> Result<Vec<AggregatedRow>, ReconError> {
    if snapshots.len() < 2 {
        return Err(ReconError::InsufficientSnapshots { found: snapshots.len() });
    }

    let count = snapshots.len();
    let mut merged: BTreeMap<String, RowAcc> = BTreeMap::new();

    for (idx, snapshot) in snapshots.iter().enumerate() {
        for row in &snapshot.rows {
            let acc = merged.entry(row.product_name.clone()).or_insert_with(|| RowAcc {
                quantities: vec![None; count],
                location: None,
            });
            let slot = &mut acc.quantities[idx];
            *slot = Some(slot.unwrap_or(0) + row.quantity);
            if acc.location.is_none() && row.location != NO_LOCATION {
                acc.location = Some(row.location.clone());
            }
        }
    }

    let mut rows: Vec<AggregatedRow> = merged
        .into_iter()
        .map(|(product_name, acc)| {
            let is_new = acc.quantities[0].is_none();
            let quantities: Vec<i64> = acc.quantities.iter().map(|q| q.unwrap_or(0)).collect();
            let oldest = quantities[0];
            let newest = quantities[count - 1];
            let (decrease_rate, decrease_rate_raw) = decrease_rate(oldest, newest);
            AggregatedRow {
                product_name,
                location: acc.location.unwrap_or_else(|| NO_LOCATION.to_string()),
                quantities,
                delta: newest - oldest,
                decrease_rate,
                decrease_rate_raw,
                is_new,
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        a.location
            .cmp(&b.location)
            .then_with(|| a.product_name.cmp(&b.product_name))
    });

    Ok(rows)
}

/// (display, raw) decrease rate. The raw value feeds threshold filtering
/// even when the display is the sentinel; it is 0.0 for a non-positive
/// baseline.
fn decrease_rate(oldest: i64, newest: i64) -> (String, f64) {
    let raw = if oldest <= 0 {
        0.0
    } else {
        (oldest - newest) as f64 / oldest as f64 * 100.0
    };
    let display = if oldest <= RATE_BASELINE_FLOOR {
        RATE_NOT_APPLICABLE.to_string()
    } else {
        format!("{raw:.1}%")
    };
    (display, raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CanonicalRow;

    fn snapshot(label: &str, rows: &[(&str, i64, &str)]) -> Snapshot {
        Snapshot {
            label: label.into(),
            origin: format!("{label}.xlsx"),
            rows: rows
                .iter()
                .map(|(name, quantity, location)| CanonicalRow {
                    product_name: name.to_string(),
                    quantity: *quantity,
                    location: location.to_string(),
                })
                .collect(),
        }
    }

    fn find<'a>(rows: &'a [AggregatedRow], name: &str) -> &'a AggregatedRow {
        rows.iter().find(|r| r.product_name == name).unwrap()
    }

    #[test]
    fn fewer_than_two_snapshots_rejected() {
        let err = aggregate(&[snapshot("s1", &[("A", 1, "-")])]).unwrap_err();
        assert!(matches!(err, ReconError::InsufficientSnapshots { found: 1 }));
    }

    #[test]
    fn delta_is_newest_minus_oldest() {
        let rows = aggregate(&[
            snapshot("s1", &[("A", 15, "-")]),
            snapshot("s2", &[("A", 40, "-")]),
            snapshot("s3", &[("A", 11, "-")]),
        ])
        .unwrap();
        let a = find(&rows, "A");
        assert_eq!(a.quantities, vec![15, 40, 11]);
        assert_eq!(a.delta, -4);
    }

    #[test]
    fn rate_sentinel_at_or_below_floor() {
        let rows = aggregate(&[
            snapshot("s1", &[("A", 10, "-"), ("B", 11, "-")]),
            snapshot("s2", &[("A", 1, "-"), ("B", 22, "-")]),
        ])
        .unwrap();
        let a = find(&rows, "A");
        assert_eq!(a.decrease_rate, RATE_NOT_APPLICABLE);
        assert!((a.decrease_rate_raw - 90.0).abs() < 1e-9);

        // Above the floor the rate displays even when negative (restock)
        let b = find(&rows, "B");
        assert_eq!(b.decrease_rate, "-100.0%");
    }

    #[test]
    fn rate_sentinel_even_when_newest_exceeds_oldest() {
        let rows = aggregate(&[
            snapshot("s1", &[("A", 5, "-")]),
            snapshot("s2", &[("A", 50, "-")]),
        ])
        .unwrap();
        assert_eq!(find(&rows, "A").decrease_rate, RATE_NOT_APPLICABLE);
    }

    #[test]
    fn absent_in_oldest_is_new_zero_is_not() {
        let rows = aggregate(&[
            snapshot("s1", &[("B", 0, "-")]),
            snapshot("s2", &[("B", 2, "-"), ("C", 7, "-")]),
        ])
        .unwrap();
        assert!(!find(&rows, "B").is_new);
        let c = find(&rows, "C");
        assert!(c.is_new);
        assert_eq!(c.quantities, vec![0, 7]);
        assert_eq!(c.delta, 7);
    }

    #[test]
    fn middle_only_product_counts_as_new() {
        // Newness is relative to the oldest snapshot only, not per-gap.
        let rows = aggregate(&[
            snapshot("s1", &[("A", 1, "-")]),
            snapshot("s2", &[("M", 3, "-")]),
            snapshot("s3", &[("A", 1, "-")]),
        ])
        .unwrap();
        let m = find(&rows, "M");
        assert!(m.is_new);
        assert_eq!(m.quantities, vec![0, 3, 0]);
    }

    #[test]
    fn location_first_non_sentinel_oldest_first() {
        let rows = aggregate(&[
            snapshot("s1", &[("A", 1, "-")]),
            snapshot("s2", &[("A", 1, "B-2")]),
            snapshot("s3", &[("A", 1, "C-3")]),
        ])
        .unwrap();
        assert_eq!(find(&rows, "A").location, "B-2");
    }

    #[test]
    fn sorted_by_location_then_name() {
        let rows = aggregate(&[
            snapshot("s1", &[("ぶどう", 1, "B-1"), ("りんご", 1, "A-1"), ("みかん", 1, "A-1")]),
            snapshot("s2", &[("ぶどう", 1, "B-1"), ("りんご", 1, "A-1"), ("みかん", 1, "A-1")]),
        ])
        .unwrap();
        let order: Vec<&str> = rows.iter().map(|r| r.product_name.as_str()).collect();
        assert_eq!(order, vec!["みかん", "りんご", "ぶどう"]);
    }
}
