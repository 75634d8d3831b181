//! The prepared dashboard data.
//!
//! [`Dashboard::build`] runs every loader and transform once; afterwards the
//! tables are only read. A selected year is a lookup into them through
//! [`Dashboard::view`], so a built dashboard can be shared between any
//! number of readers.

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::geometry;
use crate::loader::{self, LoadReport};
use crate::reports;
use crate::types::{Crs, MergedFieldProduction, NationalYearlyTotal, RegionShareRow, RegionYearlyTotal, WideProductionRow, YearView};
use crate::wrangle;

#[derive(Debug)]
pub struct Dashboard {
    config: PipelineConfig,
    crs: Crs,
    load_report: LoadReport,
    wide: Vec<WideProductionRow>,
    merged: Vec<MergedFieldProduction>,
    region_totals: Vec<RegionYearlyTotal>,
    national_totals: Vec<NationalYearlyTotal>,
    warnings: Vec<PipelineError>,
}

impl Dashboard {
    /// Load all sources and prepare the tables. Any load failure is
    /// returned as is; an empty join only becomes a warning.
    pub fn build(config: &PipelineConfig) -> Result<Self> {
        if config.years.is_empty() {
            return Err(PipelineError::Config("no years configured".to_string()));
        }
        let mut config = config.clone();
        config.normalize_years();

        let shapes = geometry::load_field_geometries(&config.shapes_path, &config.fallback_crs)?;
        let (records, load_report) = loader::load_production(&config.production_path, config.separator)?;
        let national_totals = loader::load_national_totals(&config.totals_path, config.separator)?;

        let wide = wrangle::pivot_production(&records, &config.years);
        let merged = wrangle::join_fields(&wide, &shapes.fields);
        let mut warnings = Vec::new();
        if merged.is_empty() {
            log::warn!(
                "None of the {} production carriers matched any of the {} field geometries",
                wide.len(),
                shapes.fields.len()
            );
            warnings.push(PipelineError::EmptyJoinResult);
        } else {
            log::info!("Merged {} fields with production", merged.len());
        }

        let region_totals = reports::aggregate_region(&merged, &config.region, &config.years);

        Ok(Dashboard {
            config,
            crs: shapes.crs,
            load_report,
            wide,
            merged,
            region_totals,
            national_totals,
            warnings,
        })
    }

    /// Everything needed to draw the dashboard for `year`.
    pub fn view(&self, year: i32) -> Result<YearView> {
        if !self.config.has_year(year) {
            return Err(PipelineError::UnknownYear(year));
        }

        let region = &self.config.region;
        let markers = if self.config.map_region_only {
            reports::map_markers(self.merged.iter().filter(|m| region.matches(m)), year)
        } else {
            reports::map_markers(&self.merged, year)
        };
        let color_scale_max = markers.iter().map(|m| m.volume).fold(0.0, f64::max);

        let regional_total = self.regional_total(year);
        let national_total = reports::national_total_for(&self.national_totals, year);

        Ok(YearView {
            year,
            region: region.label().to_string(),
            markers,
            color_scale_max,
            regional_total,
            national_total,
            share_percent: reports::share_percent(regional_total, national_total),
            ranking: reports::rank_fields(&self.wide, year, self.config.top_n),
        })
    }

    fn regional_total(&self, year: i32) -> f64 {
        self.region_totals
            .iter()
            .find(|t| t.year == year)
            .map(|t| t.total_volume)
            .unwrap_or(0.0)
    }

    pub fn share_rows(&self) -> Vec<RegionShareRow> {
        reports::region_share_rows(&self.region_totals, &self.national_totals)
    }

    pub fn years(&self) -> &[i32] {
        &self.config.years
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn crs(&self) -> &Crs {
        &self.crs
    }

    pub fn load_report(&self) -> &LoadReport {
        &self.load_report
    }

    pub fn wide_rows(&self) -> &[WideProductionRow] {
        &self.wide
    }

    pub fn merged(&self) -> &[MergedFieldProduction] {
        &self.merged
    }

    pub fn region_totals(&self) -> &[RegionYearlyTotal] {
        &self.region_totals
    }

    pub fn national_totals(&self) -> &[NationalYearlyTotal] {
        &self.national_totals
    }

    pub fn warnings(&self) -> &[PipelineError] {
        &self.warnings
    }
}
