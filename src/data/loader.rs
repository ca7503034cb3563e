use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};
use arrow::array::Array;
use arrow::util::display::array_value_to_string;
use chrono::{NaiveDate, NaiveDateTime};
use log::info;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::file::reader::ChunkReader;
use serde_json::Value as JsonValue;

use super::model::{Address, Dataset, InspectionRecord};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load the dataset named on the command line: an `http(s)://` URL is
/// downloaded once, anything else is read from disk.
pub async fn load_source(source: &str) -> Result<Dataset> {
    let dataset = if source.starts_with("http://") || source.starts_with("https://") {
        load_url(&reqwest::Client::new(), source).await?
    } else {
        load_file(Path::new(source))?
    };

    info!(
        "Loaded {} inspection records covering {} cuisines from {source}",
        dataset.len(),
        dataset.cuisines.len()
    );
    Ok(dataset)
}

/// Load an inspection dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, NYC open data layout or the short column names
/// * `.json`    – `[{ "name": ..., "cuisine": ..., "score": ... }, ...]`
/// * `.parquet` – one column per field, any scalar Arrow type
pub fn load_file(path: &Path) -> Result<Dataset> {
    let format = Format::from_path(path.to_str().unwrap_or(""))?;

    match format {
        Format::Csv => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("opening CSV {}", path.display()))?;
            load_csv(file)
        }
        Format::Json => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading JSON {}", path.display()))?;
            load_json(&text)
        }
        Format::Parquet => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("opening parquet {}", path.display()))?;
            load_parquet(file)
        }
    }
}

/// Download a dataset at startup and parse it by the URL path's extension.
pub async fn load_url(client: &reqwest::Client, url: &str) -> Result<Dataset> {
    let parsed = reqwest::Url::parse(url).with_context(|| format!("invalid dataset URL {url}"))?;
    let format = Format::from_path(parsed.path())?;

    info!("Downloading inspection dataset from {url}");
    let bytes = client
        .get(parsed)
        .send()
        .await
        .and_then(|resp| resp.error_for_status())
        .context("dataset download failed")?
        .bytes()
        .await
        .context("reading dataset response")?;

    match format {
        Format::Csv => load_csv(bytes.as_ref()),
        Format::Json => {
            let text = std::str::from_utf8(&bytes).context("dataset is not UTF-8")?;
            load_json(text)
        }
        Format::Parquet => load_parquet(bytes),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Csv,
    Json,
    Parquet,
}

impl Format {
    fn from_path(path: &str) -> Result<Self> {
        let ext = Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "csv" => Ok(Format::Csv),
            "json" => Ok(Format::Json),
            "parquet" | "pq" => Ok(Format::Parquet),
            other => bail!("Unsupported dataset extension: .{other}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Column mapping
// ---------------------------------------------------------------------------

/// The fields an inspection row is built from. Source headers are matched
/// case-insensitively against a few aliases each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Column {
    Camis,
    Name,
    Building,
    Street,
    Borough,
    Zipcode,
    Address,
    Cuisine,
    Score,
    Grade,
    InspectionDate,
}

impl Column {
    fn from_header(header: &str) -> Option<Self> {
        let column = match header.trim().to_ascii_lowercase().as_str() {
            "camis" | "id" => Column::Camis,
            "dba" | "name" | "restaurant" => Column::Name,
            "building" => Column::Building,
            "street" => Column::Street,
            "boro" | "borough" => Column::Borough,
            "zipcode" | "zip" => Column::Zipcode,
            "address" => Column::Address,
            "cuisine description" | "cuisine" => Column::Cuisine,
            "score" => Column::Score,
            "grade" => Column::Grade,
            "inspection date" | "inspection_date" | "date" => Column::InspectionDate,
            _ => return None,
        };
        Some(column)
    }
}

/// Resolve header positions. When two headers map to the same field the
/// first one in source order wins; JSON objects keep their document order.
fn column_positions<'a>(headers: impl IntoIterator<Item = &'a str>) -> Vec<(usize, Column)> {
    let mut seen = Vec::new();
    headers
        .into_iter()
        .enumerate()
        .filter_map(|(i, h)| Column::from_header(h).map(|c| (i, c)))
        .filter(|(_, c)| {
            if seen.contains(c) {
                false
            } else {
                seen.push(*c);
                true
            }
        })
        .collect()
}

/// Raw text cells of one source row, keyed by field.
type Row = HashMap<Column, String>;

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names. Unknown columns are ignored,
/// so the full NYC DOHMH export loads as-is.
pub fn load_csv<R: Read>(source: R) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(source);

    let positions = column_positions(reader.headers().context("reading CSV headers")?.iter());

    let mut records = Vec::new();
    // Row numbers in messages are 1-based data rows, header excluded.
    for (row_no, result) in (1..).zip(reader.records()) {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let row: Row = positions
            .iter()
            .map(|(i, col)| (*col, record.get(*i).unwrap_or("").to_string()))
            .collect();
        records.push(record_from_row(row_no, &row)?);
    }

    Ok(Dataset::from_records(records))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "DBA": "LOTUS", "CUISINE DESCRIPTION": "Thai", "SCORE": 7, ... },
///   ...
/// ]
/// ```
pub fn load_json(text: &str) -> Result<Dataset> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;
    let rows = root.as_array().context("Expected top-level JSON array")?;

    let mut records = Vec::with_capacity(rows.len());
    for (row_no, value) in (1..).zip(rows) {
        let obj = value
            .as_object()
            .with_context(|| format!("Row {row_no} is not a JSON object"))?;

        let positions = column_positions(obj.keys().map(String::as_str));
        let values: Vec<&JsonValue> = obj.values().collect();
        let row: Row = positions
            .into_iter()
            .map(|(i, col)| (col, json_to_text(values[i])))
            .collect();
        records.push(record_from_row(row_no, &row)?);
    }

    Ok(Dataset::from_records(records))
}

fn json_to_text(val: &JsonValue) -> String {
    match val {
        JsonValue::String(s) => s.trim().to_string(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one column per field.
///
/// Works with files written by **Pandas** (`df.to_parquet()`) and by the
/// `generate_sample` binary. Scalar cells of any Arrow type are rendered to
/// text and parsed the same way as CSV cells.
pub fn load_parquet<T: ChunkReader + 'static>(source: T) -> Result<Dataset> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(source)
        .context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();
        let positions = column_positions(schema.fields().iter().map(|f| f.name().as_str()));

        for row in 0..batch.num_rows() {
            let row_no = records.len() + 1;
            let mut cells = Row::new();
            for (idx, col) in &positions {
                let array = batch.column(*idx);
                let text = if array.is_null(row) {
                    String::new()
                } else {
                    array_value_to_string(array, row)
                        .with_context(|| format!("Row {row_no}: unreadable {col:?} cell"))?
                };
                cells.insert(*col, text);
            }
            records.push(record_from_row(row_no, &cells)?);
        }
    }

    Ok(Dataset::from_records(records))
}

// ---------------------------------------------------------------------------
// Row → InspectionRecord
// ---------------------------------------------------------------------------

fn record_from_row(row_no: usize, row: &Row) -> Result<InspectionRecord> {
    let cell = |col: Column| row.get(&col).map(|s| s.trim()).unwrap_or("");
    let optional = |col: Column| Some(cell(col)).filter(|s| !s.is_empty()).map(str::to_string);

    let name = cell(Column::Name);
    if name.is_empty() {
        bail!("Row {row_no}: missing restaurant name");
    }
    let cuisine = cell(Column::Cuisine);
    if cuisine.is_empty() {
        bail!("Row {row_no}: missing cuisine for {name}");
    }

    let score = parse_score(cell(Column::Score))
        .with_context(|| format!("Row {row_no}: invalid score"))?;
    let inspection_date = parse_date(cell(Column::InspectionDate))
        .with_context(|| format!("Row {row_no}: invalid inspection date"))?;

    Ok(InspectionRecord {
        camis: optional(Column::Camis).map(|s| strip_integral_suffix(&s)),
        name: name.to_string(),
        address: Address {
            building: cell(Column::Building).to_string(),
            street: cell(Column::Street).to_string(),
            borough: cell(Column::Borough).to_string(),
            zipcode: strip_integral_suffix(cell(Column::Zipcode)),
            line: cell(Column::Address).to_string(),
        },
        cuisine: cuisine.to_string(),
        score,
        grade: optional(Column::Grade).map(|g| g.to_ascii_uppercase()),
        inspection_date,
    })
}

fn parse_score(s: &str) -> Result<Option<f64>> {
    if s.is_empty() {
        return Ok(None);
    }
    let score: f64 = s
        .parse()
        .with_context(|| format!("'{s}' is not a number"))?;
    if !score.is_finite() {
        bail!("'{s}' is not a finite score");
    }
    Ok(Some(score))
}

const DATE_FORMATS: [&str; 2] = ["%m/%d/%Y", "%Y-%m-%d"];
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%m/%d/%Y %I:%M:%S %p"];

fn parse_date(s: &str) -> Result<Option<NaiveDate>> {
    if s.is_empty() {
        return Ok(None);
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(Some(date));
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(Some(dt.date()));
        }
    }
    bail!("'{s}' is not a recognised date")
}

/// Pandas writes integer columns with gaps as floats: `10001.0` → `10001`.
fn strip_integral_suffix(s: &str) -> String {
    match s.strip_suffix(".0") {
        Some(head) if !head.is_empty() && head.bytes().all(|b| b.is_ascii_digit()) => {
            head.to_string()
        }
        _ => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use arrow::array::{Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    use super::*;

    const NYC_CSV: &str = "\
CAMIS,DBA,BORO,BUILDING,STREET,ZIPCODE,PHONE,CUISINE DESCRIPTION,INSPECTION DATE,SCORE,GRADE
40511702,LOTUS OF SIAM,Manhattan,123,BROADWAY,10001,2125550100,Thai,03/04/2019,7,A
40511703,PAPAYA KING,Manhattan,179,EAST 86 STREET,10028.0,2125550101,Hotdogs,,,
";

    #[test]
    fn csv_in_city_layout_loads() {
        let ds = load_csv(NYC_CSV.as_bytes()).unwrap();
        assert_eq!(ds.len(), 2);

        let lotus = &ds.records[0];
        assert_eq!(lotus.camis.as_deref(), Some("40511702"));
        assert_eq!(lotus.name, "LOTUS OF SIAM");
        assert_eq!(lotus.address.full(), "123 BROADWAY, Manhattan 10001");
        assert_eq!(lotus.score, Some(7.0));
        assert_eq!(lotus.grade.as_deref(), Some("A"));
        assert_eq!(lotus.inspection_date, NaiveDate::from_ymd_opt(2019, 3, 4));

        let papaya = &ds.records[1];
        assert_eq!(papaya.address.zipcode, "10028");
        assert_eq!(papaya.score, None);
        assert_eq!(papaya.grade, None);
        assert_eq!(papaya.inspection_date, None);
    }

    #[test]
    fn csv_headers_match_case_insensitively() {
        let csv = "name,Address,Cuisine,Score,date\nLotus,1 Main St,Thai,4,2020-01-31\n";
        let ds = load_csv(csv.as_bytes()).unwrap();
        let rec = &ds.records[0];
        assert_eq!(rec.address.full(), "1 Main St");
        assert_eq!(rec.inspection_date, NaiveDate::from_ymd_opt(2020, 1, 31));
    }

    #[test]
    fn non_numeric_score_is_an_error() {
        let csv = "name,cuisine,score\nLotus,Thai,dirty\n";
        let err = load_csv(csv.as_bytes()).unwrap_err();
        assert!(format!("{err:#}").contains("invalid score"));
    }

    #[test]
    fn errors_name_the_one_based_data_row() {
        let csv = "name,cuisine,score\nLotus,Thai,3\nSiam,Thai,dirty\n";
        let err = load_csv(csv.as_bytes()).unwrap_err();
        assert!(format!("{err:#}").starts_with("Row 2: invalid score"), "{err:#}");

        let json = r#"[{"name": "Lotus", "cuisine": "Thai"}, 7]"#;
        let err = load_json(json).unwrap_err();
        assert_eq!(err.to_string(), "Row 2 is not a JSON object");
    }

    #[test]
    fn missing_cuisine_is_an_error() {
        let csv = "name,cuisine,score\nLotus,,3\n";
        assert!(load_csv(csv.as_bytes()).is_err());
    }

    #[test]
    fn bad_date_is_an_error() {
        let csv = "name,cuisine,score,date\nLotus,Thai,3,yesterday\n";
        assert!(load_csv(csv.as_bytes()).is_err());
    }

    #[test]
    fn json_records_load() {
        let json = r#"[
            {"DBA": "LOTUS", "CUISINE DESCRIPTION": "Thai", "SCORE": 7, "ZIPCODE": 10001.0, "GRADE": "a"},
            {"name": "SIAM", "cuisine": "Thai", "score": null, "address": "2 Main St"}
        ]"#;
        let ds = load_json(json).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records[0].score, Some(7.0));
        assert_eq!(ds.records[0].address.zipcode, "10001");
        assert_eq!(ds.records[0].grade.as_deref(), Some("A"));
        assert_eq!(ds.records[1].score, None);
        assert_eq!(ds.records[1].address.full(), "2 Main St");
    }

    #[test]
    fn json_alias_collision_keeps_first_key_in_document() {
        let json = r#"[{"name": "FIRST", "DBA": "SECOND", "cuisine": "Thai"}]"#;
        let ds = load_json(json).unwrap();
        assert_eq!(ds.records[0].name, "FIRST");
    }

    #[test]
    fn json_must_be_an_array() {
        assert!(load_json(r#"{"name": "LOTUS"}"#).is_err());
    }

    #[test]
    fn parquet_matches_csv() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("DBA", DataType::Utf8, false),
            Field::new("CUISINE DESCRIPTION", DataType::Utf8, false),
            Field::new("SCORE", DataType::Float64, true),
            Field::new("ZIPCODE", DataType::Int64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec!["LOTUS", "SIAM"])),
                Arc::new(StringArray::from(vec!["Thai", "Thai"])),
                Arc::new(Float64Array::from(vec![Some(7.0), None])),
                Arc::new(Int64Array::from(vec![Some(10001), None])),
            ],
        )
        .unwrap();

        let mut file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer = ArrowWriter::try_new(file.as_file_mut(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records[0].score, Some(7.0));
        assert_eq!(ds.records[0].address.zipcode, "10001");
        assert_eq!(ds.records[1].score, None);
    }

    #[test]
    fn load_file_dispatches_on_extension() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(NYC_CSV.as_bytes()).unwrap();
        assert_eq!(load_file(file.path()).unwrap().len(), 2);

        let err = load_file(Path::new("inspections.xlsx")).unwrap_err();
        assert!(err.to_string().contains("Unsupported"));
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_file(Path::new("/nonexistent/inspections.csv")).is_err());
    }

    #[test]
    fn integral_suffix_only_stripped_from_digits() {
        assert_eq!(strip_integral_suffix("10001.0"), "10001");
        assert_eq!(strip_integral_suffix("10001"), "10001");
        assert_eq!(strip_integral_suffix("12.5"), "12.5");
        assert_eq!(strip_integral_suffix("A.0"), "A.0");
    }
}
