use crate::types::{FieldGeometry, MergedFieldProduction, ProductionRecord, WideProductionRow};
use std::collections::{BTreeMap, HashMap};

/// Pivot long production records into one row per carrier with a column
/// per configured year.
///
/// Records sharing (carrier, year) are summed. Years outside `years` are
/// dropped, and every configured year gets a value, zero if the source has
/// none. Rows come out ordered by carrier name, then id.
pub fn pivot_production(records: &[ProductionRecord], years: &[i32]) -> Vec<WideProductionRow> {
    let mut map: HashMap<(i64, String), HashMap<i32, f64>> = HashMap::new();
    for r in records {
        let by_year = map.entry((r.carrier_id, r.carrier_name.clone())).or_default();
        *by_year.entry(r.year).or_insert(0.0) += r.net_volume;
    }

    let mut rows: Vec<WideProductionRow> = map
        .into_iter()
        .map(|((carrier_id, carrier_name), sums)| {
            let volume_by_year: BTreeMap<i32, f64> = years
                .iter()
                .map(|y| (*y, sums.get(y).copied().unwrap_or(0.0)))
                .collect();
            WideProductionRow {
                carrier_name,
                carrier_id,
                volume_by_year,
            }
        })
        .collect();
    rows.sort_by(|a, b| {
        a.carrier_name
            .cmp(&b.carrier_name)
            .then(a.carrier_id.cmp(&b.carrier_id))
    });
    log::debug!("Pivoted {} records into {} carriers x {} years", records.len(), rows.len(), years.len());
    rows
}

/// Inner join of wide production rows with field geometries on
/// `carrier_id == field_id`, ordered by field name.
///
/// Rows without a counterpart on the other side are dropped.
pub fn join_fields(production: &[WideProductionRow], fields: &[FieldGeometry]) -> Vec<MergedFieldProduction> {
    let by_id: HashMap<i64, &FieldGeometry> = fields.iter().map(|f| (f.field_id, f)).collect();

    let mut merged: Vec<MergedFieldProduction> = production
        .iter()
        .filter_map(|row| {
            by_id.get(&row.carrier_id).map(|field| MergedFieldProduction {
                production: row.clone(),
                field: (*field).clone(),
            })
        })
        .collect();
    // Stable, so equal names keep production order.
    merged.sort_by(|a, b| a.field_name().cmp(b.field_name()));

    let dropped = production.len() - merged.len();
    if dropped > 0 {
        log::debug!("{} production carriers have no field geometry", dropped);
    }
    merged
}
