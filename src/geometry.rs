//! Field outlines from a zipped shapefile.
//!
//! The archive holds one shapefile layer (`.shp` + `.dbf`, usually a
//! `.prj`). Members are read into memory; nothing is extracted to disk.

use crate::error::{PipelineError, Result};
use crate::schema::{self, missing_columns};
use crate::types::{Crs, FieldGeometries, FieldGeometry};
use crate::util::parse_i64_safe;
use geo::{Coord, Geometry, LineString, MultiPolygon, Point, Polygon};
use shapefile::dbase::{self, FieldValue, Record};
use shapefile::{PolygonRing, Shape, ShapeReader};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;
use zip::ZipArchive;

#[derive(Debug, Clone, PartialEq)]
struct LayerMembers {
    shp: String,
    dbf: Option<String>,
    prj: Option<String>,
}

/// Picks the first `.shp` member and its same-stem siblings.
fn find_layer(names: &[String]) -> Option<LayerMembers> {
    let shp = names
        .iter()
        .filter(|n| !n.starts_with("__MACOSX/"))
        .find(|n| n.to_ascii_lowercase().ends_with(".shp"))?;
    let stem = shp[..shp.len() - 4].to_ascii_lowercase();
    let sibling = |ext: &str| {
        names
            .iter()
            .find(|n| n.to_ascii_lowercase() == format!("{}.{}", stem, ext))
            .cloned()
    };
    Some(LayerMembers {
        shp: shp.clone(),
        dbf: sibling("dbf"),
        prj: sibling("prj"),
    })
}

fn read_member<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str, path: &Path) -> Result<Vec<u8>> {
    let mut member = archive
        .by_name(name)
        .map_err(|e| PipelineError::unavailable(path, format!("{}: {}", name, e)))?;
    let mut buf = Vec::new();
    member
        .read_to_end(&mut buf)
        .map_err(|e| PipelineError::unavailable(path, format!("{}: {}", name, e)))?;
    Ok(buf)
}

/// Load the field outlines from the zip archive at `path`.
///
/// `fallback_crs` is attached when the layer has no `.prj` member.
pub fn load_field_geometries(path: &Path, fallback_crs: &Crs) -> Result<FieldGeometries> {
    let file = File::open(path).map_err(|e| PipelineError::unavailable(path, e))?;
    let mut archive = ZipArchive::new(BufReader::new(file)).map_err(|e| PipelineError::unavailable(path, e))?;

    let names: Vec<String> = archive.file_names().map(String::from).collect();
    let layer = find_layer(&names).ok_or_else(|| PipelineError::unavailable(path, "no .shp layer in archive"))?;
    let dbf_name = layer
        .dbf
        .clone()
        .ok_or_else(|| PipelineError::unavailable(path, format!("{} has no .dbf attribute table", layer.shp)))?;

    let shp = read_member(&mut archive, &layer.shp, path)?;
    let dbf = read_member(&mut archive, &dbf_name, path)?;
    let crs = match &layer.prj {
        Some(prj) => parse_prj(&String::from_utf8_lossy(&read_member(&mut archive, prj, path)?)),
        None => {
            log::warn!(
                "{} has no .prj member, assuming {}",
                layer.shp,
                fallback_crs.name
            );
            fallback_crs.clone()
        }
    };

    let fields = read_shapefile(Cursor::new(shp), Cursor::new(dbf), path)?;
    log::info!(
        "Loaded {} field geometries from {} (CRS {}{})",
        fields.len(),
        path.display(),
        crs.name,
        crs.epsg.map(|c| format!(", EPSG:{}", c)).unwrap_or_default()
    );
    Ok(FieldGeometries { crs, fields })
}

/// Read shapes and their attribute rows in file order.
pub fn read_shapefile<S, D>(shp: S, dbf: D, path: &Path) -> Result<Vec<FieldGeometry>>
where
    S: Read + Seek,
    D: Read + Seek,
{
    let shape_reader = ShapeReader::new(shp).map_err(|e| PipelineError::unavailable(path, e))?;
    let dbase_reader = dbase::Reader::new(dbf).map_err(|e| PipelineError::unavailable(path, e))?;

    let attributes: Vec<String> = dbase_reader.fields().iter().map(|f| f.name().to_string()).collect();
    let missing = missing_columns(&schema::fields::REQUIRED, attributes.iter().map(String::as_str));
    if !missing.is_empty() {
        return Err(PipelineError::schema("field shapes", missing));
    }

    let mut reader = shapefile::Reader::new(shape_reader, dbase_reader);
    let mut seen: HashSet<i64> = HashSet::new();
    let mut fields = Vec::new();

    for (index, result) in reader.iter_shapes_and_records().enumerate() {
        let (shape, record) = result.map_err(|e| PipelineError::unavailable(path, e))?;

        let Some(field_id) = id_attr(&record, schema::fields::FIELD_ID).filter(|id| *id >= 0) else {
            log::warn!("Shape {} has no usable {}, skipping", index, schema::fields::FIELD_ID);
            continue;
        };
        let field_name = text_attr(&record, schema::fields::FIELD_NAME);
        let Some(geometry) = to_geometry(&shape) else {
            log::warn!("Field {} ({}) has an unsupported or empty shape, skipping", field_name, field_id);
            continue;
        };
        if !seen.insert(field_id) {
            log::warn!("Duplicate field id {} ({}), keeping the first", field_id, field_name);
            continue;
        }

        fields.push(FieldGeometry {
            field_id,
            field_name,
            operator_name: text_attr(&record, schema::fields::OPERATOR),
            hydrocarbon_type: text_attr(&record, schema::fields::HC_TYPE),
            region_tag: text_attr(&record, schema::fields::REGION),
            geometry,
        });
    }
    Ok(fields)
}

fn text_attr(record: &Record, name: &str) -> String {
    match record.get(name) {
        Some(FieldValue::Character(Some(s))) => s.trim().to_string(),
        Some(FieldValue::Memo(s)) => s.trim().to_string(),
        Some(FieldValue::Numeric(Some(n))) => n.to_string(),
        Some(FieldValue::Integer(i)) => i.to_string(),
        _ => String::new(),
    }
}

fn id_attr(record: &Record, name: &str) -> Option<i64> {
    let as_int = |v: f64| (v.fract() == 0.0).then_some(v as i64);
    match record.get(name)? {
        FieldValue::Numeric(Some(n)) => as_int(*n),
        FieldValue::Double(d) => as_int(*d),
        FieldValue::Float(Some(f)) => as_int(f64::from(*f)),
        FieldValue::Integer(i) => Some(i64::from(*i)),
        FieldValue::Character(Some(s)) => parse_i64_safe(Some(s)),
        _ => None,
    }
}

fn to_geometry(shape: &Shape) -> Option<Geometry<f64>> {
    match shape {
        Shape::Point(p) => Some(Geometry::Point(Point::new(p.x, p.y))),
        Shape::PointM(p) => Some(Geometry::Point(Point::new(p.x, p.y))),
        Shape::PointZ(p) => Some(Geometry::Point(Point::new(p.x, p.y))),
        Shape::Polygon(p) => polygons_from_rings(p.rings(), |pt| (pt.x, pt.y)),
        Shape::PolygonM(p) => polygons_from_rings(p.rings(), |pt| (pt.x, pt.y)),
        Shape::PolygonZ(p) => polygons_from_rings(p.rings(), |pt| (pt.x, pt.y)),
        _ => None,
    }
}

/// Outer rings open a new polygon; inner rings are holes of the polygon
/// opened last.
fn polygons_from_rings<P>(rings: &[PolygonRing<P>], xy: impl Fn(&P) -> (f64, f64)) -> Option<Geometry<f64>> {
    let mut parts: Vec<(LineString<f64>, Vec<LineString<f64>>)> = Vec::new();
    for ring in rings {
        let (points, inner) = match ring {
            PolygonRing::Outer(points) => (points, false),
            PolygonRing::Inner(points) => (points, true),
        };
        let line: LineString<f64> = points
            .iter()
            .map(|p| {
                let (x, y) = xy(p);
                Coord { x, y }
            })
            .collect();
        match parts.last_mut() {
            Some((_, holes)) if inner => holes.push(line),
            _ => parts.push((line, Vec::new())),
        }
    }

    let mut polygons: Vec<Polygon<f64>> = parts
        .into_iter()
        .map(|(exterior, holes)| Polygon::new(exterior, holes))
        .collect();
    match polygons.len() {
        0 => None,
        1 => polygons.pop().map(Geometry::Polygon),
        _ => Some(Geometry::MultiPolygon(MultiPolygon::new(polygons))),
    }
}

/// CRS from the WKT in a `.prj` member. The outermost `AUTHORITY` is the
/// last one in WKT1, so it is searched from the end.
fn parse_prj(wkt: &str) -> Crs {
    let wkt = wkt.trim().trim_start_matches('\u{feff}');
    let name = wkt.split('"').nth(1).unwrap_or("unknown").to_string();
    let epsg = wkt
        .rfind("AUTHORITY[\"EPSG\"")
        .and_then(|at| wkt[at..].split('"').nth(3))
        .and_then(|code| code.parse().ok())
        .or_else(|| epsg_for_name(&name));
    Crs {
        name,
        epsg,
        wkt: Some(wkt.to_string()),
    }
}

// ESRI-flavoured .prj files carry no AUTHORITY node.
fn epsg_for_name(name: &str) -> Option<u32> {
    match name {
        "GCS_WGS_1984" | "WGS 84" => Some(4326),
        "GCS_European_1950" | "ED50" => Some(4230),
        "GCS_ETRS_1989" | "ETRS89" => Some(4258),
        "ED_1950_UTM_Zone_31N" | "ED50 / UTM zone 31N" => Some(23031),
        "ED_1950_UTM_Zone_32N" | "ED50 / UTM zone 32N" => Some(23032),
        "ETRS_1989_UTM_Zone_33N" | "ETRS89 / UTM zone 33N" => Some(25833),
        _ => None,
    }
}
