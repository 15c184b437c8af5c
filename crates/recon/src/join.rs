//! Per-snapshot join: quantity sheet left-joined to the master/lookup sheet
//! by key, then grouped by resolved product name.

use std::collections::{BTreeMap, HashMap};

use crate::columns::{resolve_column, CanonicalField};
use crate::config::ReconConfig;
use crate::error::ReconError;
use crate::model::{CanonicalRow, SheetTable, NO_LOCATION, UNKNOWN_PRODUCT};

fn missing(sheet: &SheetTable, field: CanonicalField) -> ReconError {
    ReconError::MissingColumn {
        sheet: sheet.name().to_string(),
        field,
        headers: sheet.headers().to_vec(),
    }
}

/// Join one snapshot's quantity sheet against its master sheet.
///
/// The quantity sheet drives the join: every quantity row with a key
/// survives, with the `UNKNOWN_PRODUCT` sentinel when the master has no
/// entry for its key. Rows are then grouped by resolved product name,
/// summing quantities; distinct keys sharing one product name collapse
/// into a single row on purpose.
pub fn join_sheets(
    quantity_sheet: &SheetTable,
    master_sheet: &SheetTable,
    config: &ReconConfig,
) -> Result<Vec<CanonicalRow>, ReconError> {
    let candidates = &config.candidates;

    let q_key_col = resolve_column(quantity_sheet.headers(), &candidates.key)
        .ok_or_else(|| missing(quantity_sheet, CanonicalField::Key))?;
    let q_qty_col = resolve_column(quantity_sheet.headers(), &candidates.quantity)
        .ok_or_else(|| missing(quantity_sheet, CanonicalField::Quantity))?;
    let q_loc_col = resolve_column(quantity_sheet.headers(), &candidates.location);

    let m_key_col = resolve_column(master_sheet.headers(), &candidates.key)
        .ok_or_else(|| missing(master_sheet, CanonicalField::Key))?;
    let m_name_col = resolve_column(master_sheet.headers(), &candidates.product_name)
        .ok_or_else(|| missing(master_sheet, CanonicalField::ProductName))?;
    let m_loc_col = resolve_column(master_sheet.headers(), &candidates.location);

    // Master lookup: key → (product name, location), first occurrence wins.
    let m_keys = master_sheet.column(m_key_col).unwrap_or(&[]);
    let m_names = master_sheet.column(m_name_col).unwrap_or(&[]);
    let m_locs = m_loc_col.and_then(|c| master_sheet.column(c));

    let mut master: HashMap<String, (String, Option<String>)> = HashMap::new();
    for row in 0..master_sheet.row_count() {
        let key = match m_keys.get(row).and_then(|c| c.as_text()) {
            Some(k) => k,
            None => continue,
        };
        let name = match m_names.get(row).and_then(|c| c.as_text()) {
            Some(n) => n,
            None => continue,
        };
        let location = m_locs.and_then(|col| col.get(row)).and_then(|c| c.as_text());
        master.entry(key).or_insert((name, location));
    }

    let q_keys = quantity_sheet.column(q_key_col).unwrap_or(&[]);
    let q_qtys = quantity_sheet.column(q_qty_col).unwrap_or(&[]);
    let q_locs = q_loc_col.and_then(|c| quantity_sheet.column(c));

    // product name → (summed quantity, location)
    let mut grouped: BTreeMap<String, (i64, String)> = BTreeMap::new();

    for row in 0..quantity_sheet.row_count() {
        let key = match q_keys.get(row).and_then(|c| c.as_text()) {
            Some(k) => k,
            None => continue,
        };
        let quantity = q_qtys.get(row).map(|c| c.coerce_quantity()).unwrap_or(0);

        let (product_name, master_location) = match master.get(&key) {
            Some((name, loc)) => (name.clone(), loc.clone()),
            None => (UNKNOWN_PRODUCT.to_string(), None),
        };

        // Quantity-sheet location wins over the master's when both exist.
        let location = q_locs
            .and_then(|col| col.get(row))
            .and_then(|c| c.as_text())
            .or(master_location)
            .unwrap_or_else(|| NO_LOCATION.to_string());

        let entry = grouped
            .entry(product_name)
            .or_insert_with(|| (0, NO_LOCATION.to_string()));
        entry.0 += quantity;
        if entry.1 == NO_LOCATION && location != NO_LOCATION {
            entry.1 = location;
        }
    }

    Ok(grouped
        .into_iter()
        .map(|(product_name, (quantity, location))| CanonicalRow {
            product_name,
            quantity,
            location,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CellValue;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.into())
    }

    fn num(n: f64) -> CellValue {
        CellValue::Number(n)
    }

    fn table(name: &str, headers: &[&str], rows: &[&[CellValue]]) -> SheetTable {
        SheetTable::from_rows(
            name,
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter().map(|r| r.to_vec()).collect(),
        )
    }

    fn quantity_sheet() -> SheetTable {
        table(
            "在庫",
            &["JANコード", "個数"],
            &[
                &[text("4901"), num(5.0)],
                &[text("4902"), num(3.0)],
                &[CellValue::Empty, num(99.0)], // dropped: no key
                &[text("4903"), text("n/a")],   // quantity coerces to 0
            ],
        )
    }

    fn master_sheet() -> SheetTable {
        table(
            "商品マスター",
            &["JANコード", "商品名"],
            &[
                &[text("4901"), text("りんごジュース")],
                &[text("4902"), text("みかんゼリー")],
            ],
        )
    }

    #[test]
    fn basic_join() {
        let rows = join_sheets(&quantity_sheet(), &master_sheet(), &ReconConfig::default()).unwrap();
        assert_eq!(rows.len(), 3);
        let apple = rows.iter().find(|r| r.product_name == "りんごジュース").unwrap();
        assert_eq!(apple.quantity, 5);
        assert_eq!(apple.location, NO_LOCATION);
    }

    #[test]
    fn unmatched_key_gets_unknown_sentinel() {
        let rows = join_sheets(&quantity_sheet(), &master_sheet(), &ReconConfig::default()).unwrap();
        let unknown = rows.iter().find(|r| r.product_name == UNKNOWN_PRODUCT).unwrap();
        // 4903 had no master entry; its non-numeric quantity coerced to 0
        assert_eq!(unknown.quantity, 0);
    }

    #[test]
    fn missing_quantity_column_is_reported_with_headers() {
        let qty = table("シート1", &["JANコード", "備考"], &[&[text("4901"), text("x")]]);
        let err = join_sheets(&qty, &master_sheet(), &ReconConfig::default()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("シート1"), "{msg}");
        assert!(msg.contains("quantity"), "{msg}");
        assert!(msg.contains("備考"), "{msg}");
    }

    #[test]
    fn missing_product_column_on_master() {
        let master = table("マスター", &["JANコード", "仕入先"], &[&[text("4901"), text("x")]]);
        let err = join_sheets(&quantity_sheet(), &master, &ReconConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            ReconError::MissingColumn { field: CanonicalField::ProductName, .. }
        ));
    }

    #[test]
    fn master_dedup_keeps_first_occurrence() {
        let master = table(
            "マスター",
            &["JAN", "商品名"],
            &[
                &[text("4901"), text("先勝ち")],
                &[text("4901"), text("後から")],
            ],
        );
        let qty = table("在庫", &["JAN", "個数"], &[&[text("4901"), num(2.0)]]);
        let rows = join_sheets(&qty, &master, &ReconConfig::default()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].product_name, "先勝ち");
    }

    #[test]
    fn same_name_under_different_keys_collapses() {
        let master = table(
            "マスター",
            &["JAN", "商品名"],
            &[
                &[text("4901"), text("詰め合わせ")],
                &[text("4902"), text("詰め合わせ")],
            ],
        );
        let qty = table(
            "在庫",
            &["JAN", "個数"],
            &[&[text("4901"), num(2.0)], &[text("4902"), num(5.0)]],
        );
        let rows = join_sheets(&qty, &master, &ReconConfig::default()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].quantity, 7);
    }

    #[test]
    fn quantity_sheet_location_wins_over_master() {
        let master = table(
            "マスター",
            &["JAN", "商品名", "棚番"],
            &[&[text("4901"), text("りんご"), text("Z-9")]],
        );
        let qty = table(
            "在庫",
            &["JAN", "個数", "棚番"],
            &[&[text("4901"), num(2.0), text("A-1")]],
        );
        let rows = join_sheets(&qty, &master, &ReconConfig::default()).unwrap();
        assert_eq!(rows[0].location, "A-1");
    }

    #[test]
    fn master_location_fills_missing_quantity_side() {
        let master = table(
            "マスター",
            &["JAN", "商品名", "棚番"],
            &[&[text("4901"), text("りんご"), text("Z-9")]],
        );
        let qty = table(
            "在庫",
            &["JAN", "個数", "棚番"],
            &[&[text("4901"), num(2.0), CellValue::Empty]],
        );
        let rows = join_sheets(&qty, &master, &ReconConfig::default()).unwrap();
        assert_eq!(rows[0].location, "Z-9");
    }

    #[test]
    fn numeric_key_matches_text_key() {
        // Excel often stores barcodes as floats on one sheet, text on another
        let master = table("マスター", &["JAN", "商品名"], &[&[num(4901.0), text("りんご")]]);
        let qty = table("在庫", &["JAN", "個数"], &[&[text("4901"), num(2.0)]]);
        let rows = join_sheets(&qty, &master, &ReconConfig::default()).unwrap();
        assert_eq!(rows[0].product_name, "りんご");
    }
}
