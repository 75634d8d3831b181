use crate::error::{PipelineError, Result};
use crate::reports::RegionFilter;
use crate::types::Crs;
use clap::Parser;
use std::path::PathBuf;

/// Years offered by the year selector unless `--years` says otherwise.
pub const DEFAULT_YEARS: [i32; 12] = [1971, 1976, 1981, 1986, 1991, 1996, 2001, 2006, 2011, 2016, 2021, 2023];

pub const DEFAULT_REGION: &str = "North sea";

#[derive(Parser, Debug)]
#[command(name = "ncs_production", about = "Norwegian Continental Shelf field production dashboard")]
pub struct Cli {
    /// Zip archive with the field area shapefile
    #[arg(long, env = "NCS_SHAPES", default_value = "data/fldArea_shape.zip")]
    pub shapes: PathBuf,

    /// Yearly production by field
    #[arg(long, env = "NCS_PRODUCTION", default_value = "data/production-yearly-by-field.csv")]
    pub production: PathBuf,

    /// Yearly national production totals
    #[arg(long, env = "NCS_TOTALS", default_value = "data/production-yearly-total.csv")]
    pub totals: PathBuf,

    /// Field separator of both CSV files
    #[arg(long, default_value = ";")]
    pub separator: String,

    /// Comma-separated years offered by the year selector
    #[arg(long, value_delimiter = ',')]
    pub years: Vec<String>,

    /// Region compared against the national total
    #[arg(long, default_value = DEFAULT_REGION)]
    pub region: String,

    /// Only put fields of --region on the map
    #[arg(long)]
    pub map_region_only: bool,

    /// Number of fields in the ranking table
    #[arg(long, default_value_t = 10)]
    pub top: usize,

    /// CRS assumed when the shapefile has no .prj
    #[arg(long, default_value = "EPSG:4326")]
    pub fallback_crs: String,

    /// Show this year and exit instead of prompting
    #[arg(long)]
    pub year: Option<i32>,

    /// Write the merged fields as GeoJSON
    #[arg(long)]
    pub geojson_out: Option<PathBuf>,

    /// Write the wide production table as CSV
    #[arg(long)]
    pub wide_csv_out: Option<PathBuf>,
}

/// Everything the pipeline needs, already validated.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub shapes_path: PathBuf,
    pub production_path: PathBuf,
    pub totals_path: PathBuf,
    pub separator: u8,
    /// Ascending, no duplicates.
    pub years: Vec<i32>,
    pub region: RegionFilter,
    pub map_region_only: bool,
    pub top_n: usize,
    pub fallback_crs: Crs,
}

impl PipelineConfig {
    pub fn new(shapes_path: PathBuf, production_path: PathBuf, totals_path: PathBuf) -> Self {
        PipelineConfig {
            shapes_path,
            production_path,
            totals_path,
            separator: b';',
            years: DEFAULT_YEARS.to_vec(),
            region: RegionFilter::named(DEFAULT_REGION),
            map_region_only: false,
            top_n: 10,
            fallback_crs: Crs::from_name("EPSG:4326"),
        }
    }

    pub fn has_year(&self, year: i32) -> bool {
        self.years.contains(&year)
    }

    /// Sort and deduplicate `years`; they may have been set directly.
    pub fn normalize_years(&mut self) {
        self.years.sort_unstable();
        self.years.dedup();
    }
}

impl Cli {
    pub fn into_config(self) -> Result<PipelineConfig> {
        let separator = parse_separator(&self.separator)?;
        let years = if self.years.is_empty() {
            DEFAULT_YEARS.to_vec()
        } else {
            parse_years(&self.years)?
        };
        if self.top == 0 {
            return Err(PipelineError::Config("--top must be at least 1".to_string()));
        }
        if self.region.trim().is_empty() {
            return Err(PipelineError::Config("--region must not be empty".to_string()));
        }
        Ok(PipelineConfig {
            shapes_path: self.shapes,
            production_path: self.production,
            totals_path: self.totals,
            separator,
            years,
            region: RegionFilter::named(&self.region),
            map_region_only: self.map_region_only,
            top_n: self.top,
            fallback_crs: Crs::from_name(&self.fallback_crs),
        })
    }
}

fn parse_separator(s: &str) -> Result<u8> {
    let s = if s == "\\t" || s == "tab" { "\t" } else { s };
    match s.as_bytes() {
        [b] if b.is_ascii() => Ok(*b),
        _ => Err(PipelineError::Config(format!(
            "separator must be a single ASCII character, got {:?}",
            s
        ))),
    }
}

/// Parse, sort and deduplicate the configured years.
fn parse_years(raw: &[String]) -> Result<Vec<i32>> {
    let mut years = Vec::with_capacity(raw.len());
    for item in raw.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        let year = item
            .parse::<i32>()
            .map_err(|_| PipelineError::Config(format!("not a year: {:?}", item)))?;
        years.push(year);
    }
    if years.is_empty() {
        return Err(PipelineError::Config("--years needs at least one year".to_string()));
    }
    years.sort_unstable();
    years.dedup();
    Ok(years)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("ncs_production").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn defaults_match_the_dashboard() {
        let config = cli(&[]).into_config().unwrap();
        assert_eq!(config.separator, b';');
        assert_eq!(config.years, DEFAULT_YEARS.to_vec());
        assert_eq!(config.region, RegionFilter::named("North sea"));
        assert_eq!(config.top_n, 10);
        assert_eq!(config.fallback_crs.epsg, Some(4326));
        assert!(config.has_year(2023));
        assert!(!config.has_year(2022));
    }

    #[test]
    fn years_are_sorted_and_deduplicated() {
        let config = cli(&["--years", "2023,1971, 1996,2023"]).into_config().unwrap();
        assert_eq!(config.years, vec![1971, 1996, 2023]);
    }

    #[test]
    fn rejects_bad_separator_and_years() {
        assert!(matches!(
            cli(&["--separator", ";;"]).into_config(),
            Err(PipelineError::Config(_))
        ));
        assert!(matches!(
            cli(&["--years", "1971,abc"]).into_config(),
            Err(PipelineError::Config(_))
        ));
        assert!(matches!(cli(&["--top", "0"]).into_config(), Err(PipelineError::Config(_))));
        assert_eq!(cli(&["--separator", "tab"]).into_config().unwrap().separator, b'\t');
    }
}
