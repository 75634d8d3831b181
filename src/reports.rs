use crate::types::{
    MapMarker, MergedFieldProduction, NationalYearlyTotal, RankedFieldRow, RegionShareRow, RegionYearlyTotal,
    WideProductionRow,
};
use crate::util::{format_number, percent};
use geo::Centroid;
use std::cmp::Ordering;

/// Which merged fields count towards a regional total.
#[derive(Debug, Clone, PartialEq)]
pub enum RegionFilter {
    /// `region_tag` equal to the given name (surrounding whitespace ignored).
    Named(String),
    All,
}

impl RegionFilter {
    pub fn named(region: &str) -> Self {
        RegionFilter::Named(region.trim().to_string())
    }

    pub fn matches(&self, row: &MergedFieldProduction) -> bool {
        match self {
            RegionFilter::Named(name) => row.field.region_tag.trim() == name,
            RegionFilter::All => true,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            RegionFilter::Named(name) => name,
            RegionFilter::All => "All regions",
        }
    }
}

/// Sum each configured year over the merged fields that pass `filter`.
/// Every configured year gets an entry, zero sums included.
pub fn aggregate_region(merged: &[MergedFieldProduction], filter: &RegionFilter, years: &[i32]) -> Vec<RegionYearlyTotal> {
    let in_region: Vec<&MergedFieldProduction> = merged.iter().filter(|m| filter.matches(m)).collect();
    log::debug!("{} of {} fields are in {}", in_region.len(), merged.len(), filter.label());
    years
        .iter()
        .map(|year| RegionYearlyTotal {
            year: *year,
            total_volume: in_region.iter().map(|m| m.volume(*year)).sum(),
        })
        .collect()
}

/// Regional share of national production in percent; zero when the
/// national total is zero.
pub fn share_percent(regional_total: f64, national_total: f64) -> f64 {
    percent(regional_total, national_total)
}

pub fn national_total_for(totals: &[NationalYearlyTotal], year: i32) -> f64 {
    totals
        .iter()
        .find(|t| t.year == year)
        .map(|t| t.total_volume)
        .unwrap_or(0.0)
}

/// Top `limit` carriers by the year's volume, largest first. Ties go by
/// name so the table is stable.
pub fn rank_fields(rows: &[WideProductionRow], year: i32, limit: usize) -> Vec<RankedFieldRow> {
    let mut tmp: Vec<(f64, &str)> = rows.iter().map(|r| (r.volume(year), r.carrier_name.as_str())).collect();
    tmp.sort_by(|a, b| {
        b.0.partial_cmp(&a.0)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.1.cmp(b.1))
    });
    tmp.into_iter()
        .take(limit)
        .enumerate()
        .map(|(idx, (volume, name))| RankedFieldRow {
            rank: idx + 1,
            field: name.to_string(),
            volume: format_number(volume, 2),
        })
        .collect()
}

/// One marker per field at its geometry centroid. Fields whose geometry
/// has no centroid (empty polygons) are left off the map.
pub fn map_markers<'a, I>(fields: I, year: i32) -> Vec<MapMarker>
where
    I: IntoIterator<Item = &'a MergedFieldProduction>,
{
    fields
        .into_iter()
        .filter_map(|m| {
            let centroid = m.field.geometry.centroid()?;
            let volume = m.volume(year);
            Some(MapMarker {
                field_name: m.field.field_name.clone(),
                operator_name: m.field.operator_name.clone(),
                hydrocarbon_type: m.field.hydrocarbon_type.clone(),
                lon: centroid.x(),
                lat: centroid.y(),
                volume,
                hover_text: format!("{}\nProduction: {:?} mill Sm3 OE", m.field.field_name, volume),
            })
        })
        .collect()
}

/// Regional vs national totals for every configured year, newest first.
pub fn region_share_rows(regional: &[RegionYearlyTotal], national: &[NationalYearlyTotal]) -> Vec<RegionShareRow> {
    let mut rows: Vec<RegionShareRow> = regional
        .iter()
        .map(|r| {
            let national_total = national_total_for(national, r.year);
            RegionShareRow {
                year: r.year,
                region_total: format_number(r.total_volume, 2),
                national_total: format_number(national_total, 2),
                share_pct: format_number(share_percent(r.total_volume, national_total), 1),
            }
        })
        .collect();
    rows.sort_by(|a, b| b.year.cmp(&a.year));
    rows
}
