//! Fixture builders shared by the integration tests.
//!
//! Shapefiles are written byte by byte (ESRI shapefile + dBase III layout)
//! and packed with the `zip` writer, the same shape the field area download
//! comes in.

#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

pub const WGS84_PRJ: &str = r#"GEOGCS["GCS_WGS_1984",DATUM["D_WGS_1984",SPHEROID["WGS_1984",6378137.0,298.257223563]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]]"#;

pub const PRODUCTION_HEADER: &str =
    "prfInformationCarrier;prfYear;prfPrdOilNetMillSm3;prfPrdGasNetBillSm3;prfPrdOeNetMillSm3;prfNpdidInformationCarrier";

pub const TOTALS_HEADER: &str = "prfYear;prfPrdOilNetMillSm3;prfPrdOeNetMillSm3";

pub struct FieldFixture {
    pub id: i64,
    pub name: &'static str,
    pub operator: &'static str,
    pub hc_type: &'static str,
    pub region: &'static str,
    pub ring: Vec<(f64, f64)>,
}

impl FieldFixture {
    pub fn new(id: i64, name: &'static str, region: &'static str, x: f64, y: f64) -> Self {
        FieldFixture {
            id,
            name,
            operator: "Equinor Energy AS",
            hc_type: "OIL",
            region,
            ring: square(x, y, 1.0),
        }
    }
}

pub struct DbfField {
    pub name: &'static str,
    pub kind: u8,
    pub len: u8,
}

pub const FIELD_TABLE: [DbfField; 5] = [
    DbfField { name: "idField", kind: b'N', len: 10 },
    DbfField { name: "fieldName", kind: b'C', len: 40 },
    DbfField { name: "OpLongName", kind: b'C', len: 40 },
    DbfField { name: "Dctype", kind: b'C', len: 10 },
    DbfField { name: "main_area", kind: b'C', len: 20 },
];

/// Closed, clockwise square with its lower-left corner at (x, y).
pub fn square(x: f64, y: f64, size: f64) -> Vec<(f64, f64)> {
    vec![(x, y), (x, y + size), (x + size, y + size), (x + size, y), (x, y)]
}

fn shp_header(shape_type: i32, file_len_bytes: usize, points: &[(f64, f64)]) -> Vec<u8> {
    let mut out = Vec::with_capacity(100);
    out.extend_from_slice(&9994i32.to_be_bytes());
    out.extend_from_slice(&[0u8; 20]);
    out.extend_from_slice(&((file_len_bytes / 2) as i32).to_be_bytes());
    out.extend_from_slice(&1000i32.to_le_bytes());
    out.extend_from_slice(&shape_type.to_le_bytes());
    let (min_x, min_y, max_x, max_y) = bbox(points);
    for v in [min_x, min_y, max_x, max_y, 0.0, 0.0, 0.0, 0.0] {
        out.extend_from_slice(&f64::to_le_bytes(v));
    }
    out
}

fn bbox(points: &[(f64, f64)]) -> (f64, f64, f64, f64) {
    points.iter().fold(
        (f64::MAX, f64::MAX, f64::MIN, f64::MIN),
        |(a, b, c, d), (x, y)| (a.min(*x), b.min(*y), c.max(*x), d.max(*y)),
    )
}

fn with_records(shape_type: i32, contents: Vec<Vec<u8>>, all_points: &[(f64, f64)]) -> Vec<u8> {
    let body_len: usize = contents.iter().map(|c| 8 + c.len()).sum();
    let mut out = shp_header(shape_type, 100 + body_len, all_points);
    for (i, content) in contents.into_iter().enumerate() {
        out.extend_from_slice(&((i + 1) as i32).to_be_bytes());
        out.extend_from_slice(&((content.len() / 2) as i32).to_be_bytes());
        out.extend_from_slice(&content);
    }
    out
}

/// `.shp` bytes with one single-ring polygon per entry.
pub fn polygon_shp(rings: &[Vec<(f64, f64)>]) -> Vec<u8> {
    let contents = rings
        .iter()
        .map(|ring| {
            let mut c = Vec::new();
            c.extend_from_slice(&5i32.to_le_bytes());
            let (min_x, min_y, max_x, max_y) = bbox(ring);
            for v in [min_x, min_y, max_x, max_y] {
                c.extend_from_slice(&v.to_le_bytes());
            }
            c.extend_from_slice(&1i32.to_le_bytes());
            c.extend_from_slice(&(ring.len() as i32).to_le_bytes());
            c.extend_from_slice(&0i32.to_le_bytes());
            for (x, y) in ring {
                c.extend_from_slice(&x.to_le_bytes());
                c.extend_from_slice(&y.to_le_bytes());
            }
            c
        })
        .collect();
    let all: Vec<(f64, f64)> = rings.iter().flatten().copied().collect();
    with_records(5, contents, &all)
}

/// `.shp` bytes with one point per entry.
pub fn point_shp(points: &[(f64, f64)]) -> Vec<u8> {
    let contents = points
        .iter()
        .map(|(x, y)| {
            let mut c = Vec::new();
            c.extend_from_slice(&1i32.to_le_bytes());
            c.extend_from_slice(&x.to_le_bytes());
            c.extend_from_slice(&y.to_le_bytes());
            c
        })
        .collect();
    with_records(1, contents, points)
}

/// dBase III table. Character values are left aligned, numbers right
/// aligned, both space padded.
pub fn dbf(fields: &[DbfField], rows: &[Vec<String>]) -> Vec<u8> {
    let header_len = 32 + 32 * fields.len() + 1;
    let record_len = 1 + fields.iter().map(|f| f.len as usize).sum::<usize>();

    let mut out = Vec::new();
    out.push(0x03);
    out.extend_from_slice(&[124, 1, 1]);
    out.extend_from_slice(&(rows.len() as u32).to_le_bytes());
    out.extend_from_slice(&(header_len as u16).to_le_bytes());
    out.extend_from_slice(&(record_len as u16).to_le_bytes());
    out.extend_from_slice(&[0u8; 20]);

    for f in fields {
        let mut name = [0u8; 11];
        name[..f.name.len()].copy_from_slice(f.name.as_bytes());
        out.extend_from_slice(&name);
        out.push(f.kind);
        out.extend_from_slice(&[0u8; 4]);
        out.push(f.len);
        out.push(0);
        out.extend_from_slice(&[0u8; 14]);
    }
    out.push(0x0D);

    for row in rows {
        out.push(b' ');
        for (f, value) in fields.iter().zip(row) {
            let width = f.len as usize;
            let cell = if f.kind == b'N' {
                format!("{:>width$}", value, width = width)
            } else {
                format!("{:<width$}", value, width = width)
            };
            out.extend_from_slice(&cell.as_bytes()[..width]);
        }
    }
    out.push(0x1A);
    out
}

pub fn field_rows(fixtures: &[FieldFixture]) -> Vec<Vec<String>> {
    fixtures
        .iter()
        .map(|f| {
            vec![
                f.id.to_string(),
                f.name.to_string(),
                f.operator.to_string(),
                f.hc_type.to_string(),
                f.region.to_string(),
            ]
        })
        .collect()
}

pub fn write_zip(path: &Path, members: &[(&str, Vec<u8>)]) {
    let mut zip = ZipWriter::new(File::create(path).unwrap());
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    for (name, bytes) in members {
        zip.start_file(*name, options).unwrap();
        zip.write_all(bytes).unwrap();
    }
    zip.finish().unwrap();
}

/// Zipped field area layer with the standard attribute table.
pub fn write_field_archive(dir: &Path, fixtures: &[FieldFixture], prj: Option<&str>) -> PathBuf {
    let path = dir.join("fldArea_shape.zip");
    let rings: Vec<Vec<(f64, f64)>> = fixtures.iter().map(|f| f.ring.clone()).collect();
    let mut members = vec![
        ("fldArea.shp", polygon_shp(&rings)),
        ("fldArea.dbf", dbf(&FIELD_TABLE, &field_rows(fixtures))),
    ];
    if let Some(prj) = prj {
        members.push(("fldArea.prj", prj.as_bytes().to_vec()));
    }
    write_zip(&path, &members);
    path
}

pub fn write_text(dir: &Path, name: &str, lines: &[&str]) -> PathBuf {
    let path = dir.join(name);
    let mut f = File::create(&path).unwrap();
    for line in lines {
        writeln!(f, "{}", line).unwrap();
    }
    path
}
