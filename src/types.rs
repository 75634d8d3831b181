use geo::Geometry;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tabled::Tabled;

use crate::schema;

/// One line of the yearly production file, untyped. Only the required
/// columns are checked up front; the measure columns are optional.
#[derive(Debug, Deserialize)]
pub struct RawProductionRow {
    #[serde(rename = "prfInformationCarrier")]
    pub carrier_name: Option<String>,
    #[serde(rename = "prfNpdidInformationCarrier")]
    pub carrier_id: Option<String>,
    #[serde(rename = "prfYear")]
    pub year: Option<String>,
    #[serde(rename = "prfPrdOeNetMillSm3")]
    pub net_oe: Option<String>,
    #[serde(rename = "prfPrdOilNetMillSm3", default)]
    pub oil: Option<String>,
    #[serde(rename = "prfPrdGasNetBillSm3", default)]
    pub gas: Option<String>,
    #[serde(rename = "prfPrdNGLNetMillSm3", default)]
    pub ngl: Option<String>,
    #[serde(rename = "prfPrdCondensateNetMillSm3", default)]
    pub condensate: Option<String>,
    #[serde(rename = "prfPrdProducedWaterInFieldMillSm3", default)]
    pub produced_water: Option<String>,
}

/// A cleaned production record. No numeric field is negative.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductionRecord {
    pub carrier_id: i64,
    pub carrier_name: String,
    pub year: i32,
    /// Net oil equivalents, mill Sm3 OE.
    pub net_volume: f64,
    pub oil: f64,
    pub gas: f64,
    pub ngl: f64,
    pub condensate: f64,
    pub produced_water: f64,
}

impl ProductionRecord {
    pub fn new(carrier_id: i64, carrier_name: &str, year: i32, net_volume: f64) -> Self {
        ProductionRecord {
            carrier_id,
            carrier_name: carrier_name.to_string(),
            year,
            net_volume,
            oil: 0.0,
            gas: 0.0,
            ngl: 0.0,
            condensate: 0.0,
            produced_water: 0.0,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RawTotalRow {
    #[serde(rename = "prfYear")]
    pub year: Option<String>,
    #[serde(rename = "prfPrdOeNetMillSm3")]
    pub net_oe: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NationalYearlyTotal {
    pub year: i32,
    pub total_volume: f64,
}

/// Coordinate reference system declared by the geometry source.
#[derive(Debug, Clone, PartialEq)]
pub struct Crs {
    /// Datum/projection name, e.g. `GCS_European_1950` or `EPSG:4326`.
    pub name: String,
    pub epsg: Option<u32>,
    pub wkt: Option<String>,
}

impl Crs {
    pub fn from_name(name: &str) -> Self {
        let epsg = name
            .trim()
            .strip_prefix("EPSG:")
            .and_then(|code| code.parse().ok());
        Crs {
            name: name.trim().to_string(),
            epsg,
            wkt: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FieldGeometry {
    pub field_id: i64,
    pub field_name: String,
    pub operator_name: String,
    pub hydrocarbon_type: String,
    pub region_tag: String,
    pub geometry: Geometry<f64>,
}

/// Field geometries in source order, with the CRS they are expressed in.
#[derive(Debug, Clone)]
pub struct FieldGeometries {
    pub crs: Crs,
    pub fields: Vec<FieldGeometry>,
}

/// One carrier with a total per configured year.
#[derive(Debug, Clone, PartialEq)]
pub struct WideProductionRow {
    pub carrier_name: String,
    pub carrier_id: i64,
    pub volume_by_year: BTreeMap<i32, f64>,
}

impl WideProductionRow {
    pub fn volume(&self, year: i32) -> f64 {
        self.volume_by_year.get(&year).copied().unwrap_or(0.0)
    }
}

#[derive(Debug, Clone)]
pub struct MergedFieldProduction {
    pub production: WideProductionRow,
    pub field: FieldGeometry,
}

impl MergedFieldProduction {
    pub fn field_name(&self) -> &str {
        &self.field.field_name
    }

    pub fn volume(&self, year: i32) -> f64 {
        self.production.volume(year)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RegionYearlyTotal {
    pub year: i32,
    pub total_volume: f64,
}

/// A field marker for the map, placed at the geometry centroid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapMarker {
    pub field_name: String,
    pub operator_name: String,
    pub hydrocarbon_type: String,
    pub lon: f64,
    pub lat: f64,
    pub volume: f64,
    pub hover_text: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct RankedFieldRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Field")]
    #[tabled(rename = "Field")]
    pub field: String,
    #[serde(rename = "NetMillSm3OE")]
    #[tabled(rename = "Net mill Sm3 OE")]
    pub volume: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct RegionShareRow {
    #[serde(rename = "Year")]
    #[tabled(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Region")]
    #[tabled(rename = "Region")]
    pub region_total: String,
    #[serde(rename = "National")]
    #[tabled(rename = "National")]
    pub national_total: String,
    #[serde(rename = "SharePct")]
    #[tabled(rename = "Share %")]
    pub share_pct: String,
}

/// Everything the renderers need for one selected year.
#[derive(Debug, Clone, Serialize)]
pub struct YearView {
    pub year: i32,
    pub region: String,
    pub markers: Vec<MapMarker>,
    /// Upper bound for the marker color scale.
    pub color_scale_max: f64,
    pub regional_total: f64,
    pub national_total: f64,
    pub share_percent: f64,
    pub ranking: Vec<RankedFieldRow>,
}

/// Column label used for a year in exports.
pub fn year_label(year: i32) -> String {
    year.to_string()
}

/// Wide-table export header: carrier columns followed by the year labels.
pub fn wide_header(years: &[i32]) -> Vec<String> {
    let mut header = vec![
        schema::production::CARRIER_NAME.to_string(),
        schema::production::CARRIER_ID.to_string(),
    ];
    header.extend(years.iter().map(|y| year_label(*y)));
    header
}
