use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use arrow::array::Array;
use arrow::util::display::array_value_to_string;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{MovieDataset, MovieRecord};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Fatal load failures. Bad individual cells never end up here; they are
/// coerced to null instead.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file is absent or could not be read.
    #[error("cannot read {}: {source}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file was readable but its container structure is broken.
    #[error("malformed file {}: {reason}", path.display())]
    Malformed { path: PathBuf, reason: String },
}

impl LoadError {
    fn access(path: &Path, source: std::io::Error) -> Self {
        LoadError::FileAccess {
            path: path.to_path_buf(),
            source,
        }
    }

    fn malformed(path: &Path, reason: impl ToString) -> Self {
        LoadError::Malformed {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LoadError>;

// ---------------------------------------------------------------------------
// Column names
// ---------------------------------------------------------------------------

pub const TITLE: &str = "movie_title";
pub const GENRE: &str = "genre";
pub const MPAA_RATING: &str = "mpaa_rating";
pub const RELEASE_DATE: &str = "release_date";
pub const TOTAL_GROSS: &str = "total_gross";
pub const INFLATION_ADJUSTED_GROSS: &str = "inflation_adjusted_gross";

pub const COLUMNS: [&str; 6] = [
    TITLE,
    GENRE,
    MPAA_RATING,
    RELEASE_DATE,
    TOTAL_GROSS,
    INFLATION_ADJUSTED_GROSS,
];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a movie table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row plus one movie per line (also the fallback)
/// * `.json`    – `[{ "movie_title": "...", "total_gross": "...", ... }, ...]`
/// * `.parquet` – one column per field, any scalar type
pub fn load_file(path: &Path) -> Result<MovieDataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let mut stats = LoadStats::default();
    let records = match ext.as_str() {
        "parquet" | "pq" => load_parquet(path, &mut stats)?,
        "json" => load_json(path, &mut stats)?,
        "csv" => load_csv(path, &mut stats)?,
        other => {
            log::debug!("Unknown extension '.{other}', reading as CSV");
            load_csv(path, &mut stats)?
        }
    };

    log::info!(
        "Loaded {} movies from {} ({} unparsable dates, {} non-numeric gross cells)",
        records.len(),
        path.display(),
        stats.bad_dates,
        stats.bad_gross
    );

    Ok(MovieDataset::from_records(records))
}

// ---------------------------------------------------------------------------
// Cell coercion shared by every format
// ---------------------------------------------------------------------------

/// Counters for cells that failed coercion and were nulled.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct LoadStats {
    bad_dates: usize,
    bad_gross: usize,
}

/// One row as text, before coercion. `None` means the cell is absent.
#[derive(Debug, Default)]
struct RawRow {
    title: Option<String>,
    genre: Option<String>,
    mpaa_rating: Option<String>,
    release_date: Option<String>,
    total_gross: Option<String>,
    inflation_adjusted_gross: Option<String>,
}

impl RawRow {
    /// Build a row by asking `cell` for each known column.
    fn from_lookup(mut cell: impl FnMut(&str) -> Option<String>) -> Self {
        RawRow {
            title: cell(TITLE),
            genre: cell(GENRE),
            mpaa_rating: cell(MPAA_RATING),
            release_date: cell(RELEASE_DATE),
            total_gross: cell(TOTAL_GROSS),
            inflation_adjusted_gross: cell(INFLATION_ADJUSTED_GROSS),
        }
    }

    fn into_record(self, stats: &mut LoadStats) -> MovieRecord {
        let release_date = non_blank(self.release_date).and_then(|text| {
            let parsed = parse_date(&text);
            if parsed.is_none() {
                log::trace!("Unparsable release date '{text}'");
                stats.bad_dates += 1;
            }
            parsed
        });

        let mut gross = |cell: Option<String>| {
            non_blank(cell).and_then(|text| {
                let parsed = parse_gross(&text);
                if parsed.is_none() {
                    stats.bad_gross += 1;
                }
                parsed
            })
        };
        let total_gross = gross(self.total_gross);
        let inflation_adjusted_gross = gross(self.inflation_adjusted_gross);

        MovieRecord::new(
            non_blank(self.title),
            non_blank(self.genre),
            non_blank(self.mpaa_rating),
            release_date,
            total_gross,
            inflation_adjusted_gross,
        )
    }
}

fn non_blank(cell: Option<String>) -> Option<String> {
    cell.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d %b %Y",
    "%d %B %Y",
];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Tolerant date parser. Returns `None` for anything it cannot read.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| DateTime::parse_from_rfc3339(text).ok().map(|dt| dt.date_naive()))
}

/// Parse a gross amount such as `1280`, `184925485.5` or `$184,925,485`.
/// Non-numeric and non-finite values yield `None`.
pub fn parse_gross(text: &str) -> Option<f64> {
    let cleaned: String = text
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn warn_missing_columns(path: &Path, present: impl Fn(&str) -> bool) {
    for col in COLUMNS {
        if !present(col) {
            log::warn!(
                "{}: column '{col}' not found, treating every cell as missing",
                path.display()
            );
        }
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path, stats: &mut LoadStats) -> Result<Vec<MovieRecord>> {
    let file = File::open(path).map_err(|e| LoadError::access(path, e))?;
    read_csv(file, path, stats)
}

/// CSV layout: header row with column names, then one movie per line.
/// Rows may be ragged and cells may hold invalid UTF-8 (decoded lossily).
fn read_csv<R: Read>(source: R, path: &Path, stats: &mut LoadStats) -> Result<Vec<MovieRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(source);

    let headers: Vec<String> = reader
        .byte_headers()
        .map_err(|e| csv_error(path, e))?
        .iter()
        .map(|h| String::from_utf8_lossy(h).trim().to_string())
        .collect();
    let position = |col: &str| headers.iter().position(|h| h == col);
    warn_missing_columns(path, |col| position(col).is_some());

    let index: Vec<Option<usize>> = COLUMNS.iter().map(|&col| position(col)).collect();
    let column_of = |name: &str| {
        COLUMNS
            .iter()
            .position(|c| *c == name)
            .and_then(|i| index[i])
    };

    let mut records = Vec::new();
    let mut row = csv::ByteRecord::new();
    while reader
        .read_byte_record(&mut row)
        .map_err(|e| csv_error(path, e))?
    {
        let raw = RawRow::from_lookup(|name| {
            column_of(name)
                .and_then(|i| row.get(i))
                .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
        });
        records.push(raw.into_record(stats));
    }

    Ok(records)
}

fn csv_error(path: &Path, err: csv::Error) -> LoadError {
    let reason = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(source) => LoadError::access(path, source),
        _ => LoadError::malformed(path, reason),
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "movie_title": "Frozen", "genre": "Adventure", "mpaa_rating": "PG",
///     "release_date": "2013-11-22", "total_gross": 400738009,
///     "inflation_adjusted_gross": "$414,997,174" },
///   ...
/// ]
/// ```
fn load_json(path: &Path, stats: &mut LoadStats) -> Result<Vec<MovieRecord>> {
    let bytes = std::fs::read(path).map_err(|e| LoadError::access(path, e))?;
    read_json(&String::from_utf8_lossy(&bytes), path, stats)
}

fn read_json(text: &str, path: &Path, stats: &mut LoadStats) -> Result<Vec<MovieRecord>> {
    let root: JsonValue = serde_json::from_str(text).map_err(|e| LoadError::malformed(path, e))?;
    let rows = root
        .as_array()
        .ok_or_else(|| LoadError::malformed(path, "expected top-level JSON array"))?;

    if let Some(first) = rows.first().and_then(|r| r.as_object()) {
        warn_missing_columns(path, |col| first.contains_key(col));
    }

    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            let obj = row
                .as_object()
                .ok_or_else(|| LoadError::malformed(path, format!("row {i} is not a JSON object")))?;
            let raw = RawRow::from_lookup(|name| obj.get(name).and_then(json_to_text));
            Ok(raw.into_record(stats))
        })
        .collect()
}

fn json_to_text(val: &JsonValue) -> Option<String> {
    match val {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file holding one column per field.
///
/// Every cell is rendered to text through Arrow's display formatting and
/// then coerced exactly like a CSV cell, so dates may be stored as `Date32`,
/// timestamps or strings, and gross values as integers, floats or strings.
fn load_parquet(path: &Path, stats: &mut LoadStats) -> Result<Vec<MovieRecord>> {
    let file = File::open(path).map_err(|e| LoadError::access(path, e))?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).map_err(|e| LoadError::malformed(path, e))?;
    let reader = builder.build().map_err(|e| LoadError::malformed(path, e))?;

    let mut records = Vec::new();
    let mut checked_columns = false;

    for batch_result in reader {
        let batch = batch_result.map_err(|e| LoadError::malformed(path, e))?;
        let schema = batch.schema();

        if !checked_columns {
            warn_missing_columns(path, |col| schema.index_of(col).is_ok());
            checked_columns = true;
        }

        for row in 0..batch.num_rows() {
            let raw = RawRow::from_lookup(|name| {
                let col = batch.column(schema.index_of(name).ok()?);
                if col.is_null(row) {
                    return None;
                }
                array_value_to_string(col.as_ref(), row).ok()
            });
            records.push(raw.into_record(stats));
        }
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use arrow::array::{ArrayRef, Date32Array, Float64Array, StringArray};
    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    use super::*;
    use crate::data::model::{NOT_RATED, UNKNOWN_GENRE};

    const HEADER: &str =
        "movie_title,genre,mpaa_rating,release_date,total_gross,inflation_adjusted_gross\n";

    fn read(body: &str) -> (Vec<MovieRecord>, LoadStats) {
        let mut stats = LoadStats::default();
        let text = format!("{HEADER}{body}");
        let records = read_csv(text.as_bytes(), Path::new("inline.csv"), &mut stats).unwrap();
        (records, stats)
    }

    #[test]
    fn parses_common_date_formats() {
        let expected = NaiveDate::from_ymd_opt(1937, 12, 21);
        assert_eq!(parse_date("1937-12-21"), expected);
        assert_eq!(parse_date("1937/12/21"), expected);
        assert_eq!(parse_date("12/21/1937"), expected);
        assert_eq!(parse_date("Dec 21, 1937"), expected);
        assert_eq!(parse_date("December 21, 1937"), expected);
        assert_eq!(parse_date("21 Dec 1937"), expected);
        assert_eq!(parse_date("1937-12-21 00:00:00"), expected);
        assert_eq!(parse_date("1937-12-21T08:30:00"), expected);
        assert_eq!(parse_date("1937-12-21T08:30:00+01:00"), expected);
    }

    #[test]
    fn rejects_garbage_dates() {
        assert_eq!(parse_date("not-a-date"), None);
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("2013-02-30"), None);
    }

    #[test]
    fn gross_accepts_plain_and_currency_text() {
        assert_eq!(parse_gross("1280"), Some(1280.0));
        assert_eq!(parse_gross(" 33.5 "), Some(33.5));
        assert_eq!(parse_gross("$184,925,485"), Some(184_925_485.0));
        assert_eq!(parse_gross("n/a"), None);
        assert_eq!(parse_gross("$"), None);
        assert_eq!(parse_gross("NaN"), None);
        assert_eq!(parse_gross("inf"), None);
    }

    #[test]
    fn loads_well_formed_rows() {
        let (records, stats) = read(
            "Frozen,Animation,PG,2013-11-27,1280,1300\n\
             Tron,Action,PG,1982-07-09,33,90\n",
        );
        assert_eq!(records.len(), 2);
        assert_eq!(stats, LoadStats::default());

        let frozen = &records[0];
        assert_eq!(frozen.title(), Some("Frozen"));
        assert_eq!(frozen.genre(), "Animation");
        assert_eq!(frozen.mpaa_rating(), "PG");
        assert_eq!(frozen.year(), Some(2013));
        assert_eq!(frozen.total_gross(), Some(1280.0));
        assert_eq!(frozen.inflation_adjusted_gross(), Some(1300.0));
    }

    #[test]
    fn bad_cells_become_null_without_failing() {
        let (records, stats) = read(
            "Broken,Drama,R,not-a-date,lots,\n\
             Quoted,\"Comedy\",PG-13,\"Jun 20, 2003\",\"$1,000\",oops\n",
        );
        assert_eq!(records.len(), 2);
        assert_eq!(stats.bad_dates, 1);
        assert_eq!(stats.bad_gross, 2);

        assert_eq!(records[0].release_date(), None);
        assert_eq!(records[0].year(), None);
        assert_eq!(records[0].total_gross(), None);
        assert_eq!(records[0].inflation_adjusted_gross(), None);

        assert_eq!(records[1].year(), Some(2003));
        assert_eq!(records[1].total_gross(), Some(1000.0));
        assert_eq!(records[1].inflation_adjusted_gross(), None);
    }

    #[test]
    fn blank_genre_and_rating_get_defaults() {
        let (records, _) = read("Mystery,,  ,2001-01-01,1,1\nShort row\n");
        assert_eq!(records.len(), 2);
        for rec in &records {
            assert_eq!(rec.genre(), UNKNOWN_GENRE);
            assert_eq!(rec.mpaa_rating(), NOT_RATED);
        }
        assert_eq!(records[1].title(), Some("Short row"));
        assert_eq!(records[1].year(), None);
    }

    #[test]
    fn missing_columns_are_treated_as_absent() {
        let mut stats = LoadStats::default();
        let text = "movie_title,total_gross\nAlone,5\n";
        let records = read_csv(text.as_bytes(), Path::new("narrow.csv"), &mut stats).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].genre(), UNKNOWN_GENRE);
        assert_eq!(records[0].year(), None);
        assert_eq!(records[0].total_gross(), Some(5.0));
    }

    #[test]
    fn year_is_null_iff_release_date_is_null() {
        let (records, _) = read(
            "A,Drama,G,1999-01-01,1,1\nB,Drama,G,garbage,1,1\nC,Drama,G,,1,1\n",
        );
        for rec in &records {
            assert_eq!(rec.year().is_none(), rec.release_date().is_none());
        }
    }

    #[test]
    fn load_file_reads_csv_from_disk() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        write!(file, "{HEADER}Frozen,Animation,PG,2013-11-27,1280,1300\n").unwrap();

        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.year_bounds, Some((2013, 2013)));
    }

    #[test]
    fn load_file_reads_json_records() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"[{{"movie_title":"Frozen","genre":"Animation","mpaa_rating":"PG",
                 "release_date":"2013-11-27","total_gross":1280,"inflation_adjusted_gross":null}},
                {{"movie_title":"Tron","genre":null,"release_date":"bad","total_gross":"$33"}}]"#
        )
        .unwrap();

        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records[0].total_gross(), Some(1280.0));
        assert_eq!(ds.records[0].inflation_adjusted_gross(), None);
        assert_eq!(ds.records[1].genre(), UNKNOWN_GENRE);
        assert_eq!(ds.records[1].mpaa_rating(), NOT_RATED);
        assert_eq!(ds.records[1].year(), None);
        assert_eq!(ds.records[1].total_gross(), Some(33.0));
    }

    #[test]
    fn json_that_is_not_an_array_is_malformed() {
        let mut stats = LoadStats::default();
        let err = read_json(r#"{"movie_title":"x"}"#, Path::new("x.json"), &mut stats).unwrap_err();
        assert!(matches!(err, LoadError::Malformed { .. }));
    }

    #[test]
    fn missing_file_is_a_file_access_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.csv");

        let err = load_file(&missing).unwrap_err();
        match err {
            LoadError::FileAccess { path, source } => {
                assert_eq!(path, missing);
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("expected FileAccess, got {other:?}"),
        }
    }

    #[test]
    fn json_with_invalid_utf8_is_decoded_lossily() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(b"[{\"movie_title\":\"Am\xE9lie\",\"release_date\":\"2001-04-25\"}]")
            .unwrap();

        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.records[0].title(), Some("Am\u{FFFD}lie"));
        assert_eq!(ds.records[0].year(), Some(2001));
    }

    fn days_since_epoch(y: i32, m: u32, d: u32) -> i32 {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        (NaiveDate::from_ymd_opt(y, m, d).unwrap() - epoch).num_days() as i32
    }

    #[test]
    fn load_file_reads_typed_parquet_columns() {
        // No mpaa_rating column; dates are Date32 and gross values mix types.
        let schema = Arc::new(Schema::new(vec![
            Field::new(TITLE, DataType::Utf8, true),
            Field::new(GENRE, DataType::Utf8, true),
            Field::new(RELEASE_DATE, DataType::Date32, true),
            Field::new(TOTAL_GROSS, DataType::Utf8, true),
            Field::new(INFLATION_ADJUSTED_GROSS, DataType::Float64, true),
        ]));
        let columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(vec![Some("Frozen"), Some("Tron")])),
            Arc::new(StringArray::from(vec![Some("Animation"), None])),
            Arc::new(Date32Array::from(vec![Some(days_since_epoch(2013, 11, 27)), None])),
            Arc::new(StringArray::from(vec![Some("1280"), Some("$33")])),
            Arc::new(Float64Array::from(vec![Some(1300.0), None])),
        ];
        let batch = RecordBatch::try_new(schema.clone(), columns).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("movies.parquet");
        let mut writer = ArrowWriter::try_new(File::create(&path).unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 2);

        let frozen = &ds.records[0];
        assert_eq!(frozen.title(), Some("Frozen"));
        assert_eq!(frozen.genre(), "Animation");
        assert_eq!(frozen.mpaa_rating(), NOT_RATED);
        assert_eq!(frozen.release_date(), NaiveDate::from_ymd_opt(2013, 11, 27));
        assert_eq!(frozen.year(), Some(2013));
        assert_eq!(frozen.total_gross(), Some(1280.0));
        assert_eq!(frozen.inflation_adjusted_gross(), Some(1300.0));

        let tron = &ds.records[1];
        assert_eq!(tron.genre(), UNKNOWN_GENRE);
        assert_eq!(tron.release_date(), None);
        assert_eq!(tron.year(), None);
        assert_eq!(tron.total_gross(), Some(33.0));
        assert_eq!(tron.inflation_adjusted_gross(), None);
    }

    #[test]
    fn corrupt_parquet_is_malformed() {
        let mut file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        file.write_all(b"definitely not parquet").unwrap();

        let err = load_file(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::Malformed { .. }), "{err:?}");
    }
}
