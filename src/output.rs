use crate::schema;
use crate::types::{wide_header, year_label, MergedFieldProduction, WideProductionRow, YearView};
use crate::util::format_number;
use geojson::{Feature, FeatureCollection, JsonObject, JsonValue};
use std::error::Error;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

pub fn write_wide_csv(path: &Path, rows: &[WideProductionRow], years: &[i32]) -> Result<(), Box<dyn Error>> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(wide_header(years))?;
    for r in rows {
        let mut record = vec![r.carrier_name.clone(), r.carrier_id.to_string()];
        record.extend(years.iter().map(|y| r.volume(*y).to_string()));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Merged fields as GeoJSON features, one numeric property per year.
/// Coordinates stay in the source CRS.
pub fn feature_collection(merged: &[MergedFieldProduction], years: &[i32]) -> FeatureCollection {
    let features = merged
        .iter()
        .map(|m| {
            let mut properties = JsonObject::new();
            properties.insert(schema::fields::FIELD_NAME.to_string(), JsonValue::from(m.field.field_name.as_str()));
            properties.insert(schema::fields::FIELD_ID.to_string(), JsonValue::from(m.field.field_id));
            properties.insert(schema::fields::OPERATOR.to_string(), JsonValue::from(m.field.operator_name.as_str()));
            properties.insert(schema::fields::HC_TYPE.to_string(), JsonValue::from(m.field.hydrocarbon_type.as_str()));
            properties.insert(schema::fields::REGION.to_string(), JsonValue::from(m.field.region_tag.as_str()));
            for year in years {
                properties.insert(year_label(*year), JsonValue::from(m.volume(*year)));
            }
            Feature {
                bbox: None,
                geometry: Some(geojson::Geometry::new(geojson::Value::from(&m.field.geometry))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();
    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

pub fn write_geojson(path: &Path, merged: &[MergedFieldProduction], years: &[i32]) -> Result<(), Box<dyn Error>> {
    let s = serde_json::to_string_pretty(&feature_collection(merged, years))?;
    std::fs::write(path, s)?;
    Ok(())
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}

pub fn print_view(view: &YearView) {
    println!("Production {}", view.year);
    println!(
        "{}: {} of {} mill Sm3 OE ({}%)",
        view.region,
        format_number(view.regional_total, 2),
        format_number(view.national_total, 2),
        format_number(view.share_percent, 1)
    );
    println!(
        "Map: {} fields, color scale 0 to {}\n",
        view.markers.len(),
        format_number(view.color_scale_max, 2)
    );
    println!("Top producing fields ({})\n", view.year);
    preview_table_rows(&view.ranking, view.ranking.len());
}
