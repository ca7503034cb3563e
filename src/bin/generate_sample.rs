use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Duration, NaiveDate};
use parquet::arrow::ArrowWriter;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;

const CUISINES: [&str; 8] = [
    "Thai", "Chinese", "Italian", "Mexican", "American", "Japanese", "Indian", "Pizza",
];
const BOROUGHS: [(&str, &str); 5] = [
    ("Manhattan", "10001"),
    ("Brooklyn", "11201"),
    ("Queens", "11101"),
    ("Bronx", "10451"),
    ("Staten Island", "10301"),
];
const STREETS: [&str; 6] = [
    "BROADWAY", "5 AVENUE", "ATLANTIC AVENUE", "QUEENS BOULEVARD", "GRAND CONCOURSE", "VICTORY BOULEVARD",
];
const NAME_PARTS: [&str; 8] = ["GOLDEN", "LUCKY", "LITTLE", "ROYAL", "HAPPY", "BLUE", "OLD", "NEW"];

/// One row in the city export's column layout.
#[derive(Debug, Serialize)]
struct Row {
    #[serde(rename = "CAMIS")]
    camis: String,
    #[serde(rename = "DBA")]
    dba: String,
    #[serde(rename = "BORO")]
    boro: String,
    #[serde(rename = "BUILDING")]
    building: String,
    #[serde(rename = "STREET")]
    street: String,
    #[serde(rename = "ZIPCODE")]
    zipcode: String,
    #[serde(rename = "CUISINE DESCRIPTION")]
    cuisine: String,
    #[serde(rename = "INSPECTION DATE")]
    inspection_date: String,
    #[serde(rename = "SCORE")]
    score: Option<f64>,
    #[serde(rename = "GRADE")]
    grade: String,
}

fn grade_for(score: f64) -> &'static str {
    match score as u32 {
        0..=13 => "A",
        14..=27 => "B",
        _ => "C",
    }
}

fn generate(restaurants: usize, rng: &mut StdRng) -> Vec<Row> {
    let epoch = NaiveDate::from_ymd_opt(2017, 1, 1).unwrap_or_default();
    let mut rows = Vec::new();

    for i in 0..restaurants {
        let cuisine = CUISINES[i % CUISINES.len()];
        let (boro, zipcode) = *BOROUGHS.choose(rng).unwrap_or(&BOROUGHS[0]);
        let street = *STREETS.choose(rng).unwrap_or(&STREETS[0]);
        let prefix = NAME_PARTS[rng.gen_range(0..NAME_PARTS.len())];
        let dba = format!("{prefix} {} {}", cuisine.to_ascii_uppercase(), i + 1);
        let building = rng.gen_range(1..2000).to_string();
        let camis = (40_000_000 + i).to_string();

        // Cleaner kitchens stay clean between inspections.
        let baseline: f64 = rng.gen_range(0.0..30.0);
        let inspections = rng.gen_range(1..=4);
        for _ in 0..inspections {
            let date = epoch + Duration::days(rng.gen_range(0..1500));
            // Roughly one in ten inspections is still pending a score.
            let score = if rng.gen_bool(0.1) {
                None
            } else {
                Some((baseline + rng.gen_range(-5.0..8.0_f64)).max(0.0).round())
            };

            rows.push(Row {
                camis: camis.clone(),
                dba: dba.clone(),
                boro: boro.to_string(),
                building: building.clone(),
                street: street.to_string(),
                zipcode: zipcode.to_string(),
                cuisine: cuisine.to_string(),
                inspection_date: date.format("%m/%d/%Y").to_string(),
                score,
                grade: score.map(grade_for).unwrap_or_default().to_string(),
            });
        }
    }

    rows
}

fn write_csv(path: &Path, rows: &[Row]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV")?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_json(path: &Path, rows: &[Row]) -> Result<()> {
    let file = std::fs::File::create(path).context("creating JSON")?;
    serde_json::to_writer_pretty(file, rows)?;
    Ok(())
}

fn write_parquet(path: &Path, rows: &[Row]) -> Result<()> {
    let text = |f: fn(&Row) -> &str| StringArray::from(rows.iter().map(f).collect::<Vec<_>>());

    let schema = Arc::new(Schema::new(vec![
        Field::new("CAMIS", DataType::Utf8, false),
        Field::new("DBA", DataType::Utf8, false),
        Field::new("BORO", DataType::Utf8, false),
        Field::new("BUILDING", DataType::Utf8, false),
        Field::new("STREET", DataType::Utf8, false),
        Field::new("ZIPCODE", DataType::Utf8, false),
        Field::new("CUISINE DESCRIPTION", DataType::Utf8, false),
        Field::new("INSPECTION DATE", DataType::Utf8, false),
        Field::new("SCORE", DataType::Float64, true),
        Field::new("GRADE", DataType::Utf8, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(text(|r| r.camis.as_str())),
            Arc::new(text(|r| r.dba.as_str())),
            Arc::new(text(|r| r.boro.as_str())),
            Arc::new(text(|r| r.building.as_str())),
            Arc::new(text(|r| r.street.as_str())),
            Arc::new(text(|r| r.zipcode.as_str())),
            Arc::new(text(|r| r.cuisine.as_str())),
            Arc::new(text(|r| r.inspection_date.as_str())),
            Arc::new(Float64Array::from(rows.iter().map(|r| r.score).collect::<Vec<_>>())),
            Arc::new(text(|r| r.grade.as_str())),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).context("creating parquet")?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    let output = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "data/inspections.csv".to_string());
    let path = Path::new(&output);

    let mut rng = StdRng::seed_from_u64(42);
    let rows = generate(120, &mut rng);

    match path.extension().and_then(|e| e.to_str()) {
        Some("csv") => write_csv(path, &rows)?,
        Some("json") => write_json(path, &rows)?,
        Some("parquet") | Some("pq") => write_parquet(path, &rows)?,
        other => bail!("Unsupported output extension: {other:?}"),
    }

    println!("Wrote {} inspections to {output}", rows.len());
    Ok(())
}
