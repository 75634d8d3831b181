use crate::error::{PipelineError, Result};
use crate::schema::{self, missing_columns};
use crate::types::{NationalYearlyTotal, ProductionRecord, RawProductionRow, RawTotalRow};
use crate::util::{clamp_non_negative, clamp_non_negative_i64, parse_f64_safe, parse_i64_safe};
use csv::{Reader, ReaderBuilder, Trim};
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub parse_errors: usize,
    pub clamped_values: usize,
}

fn open_delimited(path: &Path, separator: u8, dataset: &str, required: &[&str]) -> Result<Reader<File>> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(separator)
        .flexible(true)
        .trim(Trim::Headers)
        .from_path(path)
        .map_err(|e| PipelineError::unavailable(path, e))?;
    let headers = rdr
        .headers()
        .map_err(|e| PipelineError::unavailable(path, e))?
        .clone();
    let missing = missing_columns(required, headers.iter());
    if !missing.is_empty() {
        return Err(PipelineError::schema(dataset, missing));
    }
    Ok(rdr)
}

/// Read the yearly production-by-field file.
///
/// Every numeric value that comes out negative is stored as zero, whichever
/// column it sits in. Rows without a usable carrier id or year are skipped
/// and counted in the report.
pub fn load_production(path: &Path, separator: u8) -> Result<(Vec<ProductionRecord>, LoadReport)> {
    let mut rdr = open_delimited(path, separator, "production", &schema::production::REQUIRED)?;
    let mut report = LoadReport::default();
    let mut records = Vec::new();

    for result in rdr.deserialize::<RawProductionRow>() {
        report.total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                log::warn!("Skipping unreadable production row {}: {}", report.total_rows, e);
                report.parse_errors += 1;
                continue;
            }
        };
        match clean_production_row(row, &mut report.clamped_values) {
            Some(rec) => records.push(rec),
            None => report.parse_errors += 1,
        }
    }

    log::info!(
        "Loaded {} production records from {} ({} rows, {} skipped, {} negative values clamped)",
        records.len(),
        path.display(),
        report.total_rows,
        report.parse_errors,
        report.clamped_values
    );
    Ok((records, report))
}

fn clean_production_row(row: RawProductionRow, clamped: &mut usize) -> Option<ProductionRecord> {
    let (carrier_id, id_hit) = clamp_non_negative_i64(parse_i64_safe(row.carrier_id.as_deref())?);
    let (year, year_hit) = clamp_non_negative_i64(parse_i64_safe(row.year.as_deref())?);
    let year = i32::try_from(year).ok()?;
    *clamped += usize::from(id_hit) + usize::from(year_hit);

    let mut clamp = |v: f64| {
        let (v, hit) = clamp_non_negative(v);
        *clamped += usize::from(hit);
        v
    };
    // Blank measures do not contribute to any sum.
    let net_volume = clamp(parse_f64_safe(row.net_oe.as_deref()).unwrap_or(0.0));
    let oil = clamp(parse_f64_safe(row.oil.as_deref()).unwrap_or(0.0));
    let gas = clamp(parse_f64_safe(row.gas.as_deref()).unwrap_or(0.0));
    let ngl = clamp(parse_f64_safe(row.ngl.as_deref()).unwrap_or(0.0));
    let condensate = clamp(parse_f64_safe(row.condensate.as_deref()).unwrap_or(0.0));
    let produced_water = clamp(parse_f64_safe(row.produced_water.as_deref()).unwrap_or(0.0));

    let carrier_name = row.carrier_name.unwrap_or_default().trim().to_string();

    Some(ProductionRecord {
        carrier_id,
        carrier_name,
        year,
        net_volume,
        oil,
        gas,
        ngl,
        condensate,
        produced_water,
    })
}

/// Read the national yearly totals, newest year first.
///
/// Rows for the same year are summed. Negative totals are clamped the same
/// way as the per-field production.
pub fn load_national_totals(path: &Path, separator: u8) -> Result<Vec<NationalYearlyTotal>> {
    let mut rdr = open_delimited(path, separator, "national totals", &schema::totals::REQUIRED)?;
    let mut by_year: BTreeMap<i32, f64> = BTreeMap::new();
    let mut skipped = 0usize;

    for result in rdr.deserialize::<RawTotalRow>() {
        let row = match result {
            Ok(r) => r,
            Err(_) => {
                skipped += 1;
                continue;
            }
        };
        let Some(year) = parse_i64_safe(row.year.as_deref()).and_then(|y| i32::try_from(y).ok()) else {
            skipped += 1;
            continue;
        };
        let (volume, _) = clamp_non_negative(parse_f64_safe(row.net_oe.as_deref()).unwrap_or(0.0));
        *by_year.entry(year).or_insert(0.0) += volume;
    }

    if skipped > 0 {
        log::warn!("Skipped {} unreadable rows in {}", skipped, path.display());
    }
    let totals: Vec<NationalYearlyTotal> = by_year
        .into_iter()
        .rev()
        .map(|(year, total_volume)| NationalYearlyTotal { year, total_volume })
        .collect();
    log::info!("Loaded {} national yearly totals from {}", totals.len(), path.display());
    Ok(totals)
}
