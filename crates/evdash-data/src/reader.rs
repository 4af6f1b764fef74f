//! Dataset discovery and loading.
//!
//! Reads registration datasets (JSON arrays, JSON Lines or CSV) from a single
//! file or a directory tree and converts every row into a [`Record`] at the
//! boundary.  Loading never aborts: a broken file is logged and contributes
//! no records.

use std::io::BufRead;
use std::path::{Path, PathBuf};

use evdash_core::data_processors::RecordConverter;
use evdash_core::error::{DashboardError, Result};
use evdash_core::models::Record;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

/// Extensions recognised by [`find_dataset_files`].
pub const DATASET_EXTENSIONS: &[&str] = &["json", "jsonl", "ndjson", "csv"];

/// Top-level keys searched when a `.json` document is an object.
const RECORD_ARRAY_KEYS: &[&str] = &["data", "records"];

// ── Types ─────────────────────────────────────────────────────────────────────

/// On-disk layout of a dataset file, decided by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetFormat {
    /// A single JSON document holding an array of rows.
    Json,
    /// One JSON value per line.
    JsonLines,
    /// Comma-separated values with a header row.
    Csv,
}

impl DatasetFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(DatasetFormat::Json),
            "jsonl" | "ndjson" => Some(DatasetFormat::JsonLines),
            "csv" => Some(DatasetFormat::Csv),
            _ => None,
        }
    }
}

/// Records read from one file.
#[derive(Debug, Clone, Default)]
pub struct LoadedFile {
    pub records: Vec<Record>,
    /// Rows encountered, including the ones skipped.
    pub values_seen: usize,
    /// Rows that were malformed or not JSON objects.
    pub values_skipped: usize,
}

/// Outcome of [`load_records`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadReport {
    #[serde(skip)]
    pub records: Vec<Record>,
    pub files_read: usize,
    pub files_failed: usize,
    pub values_seen: usize,
    pub values_skipped: usize,
}

impl LoadReport {
    fn absorb(&mut self, file: LoadedFile) {
        self.files_read += 1;
        self.values_seen += file.values_seen;
        self.values_skipped += file.values_skipped;
        self.records.extend(file.records);
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Find all dataset files recursively under `data_path`, sorted by path.
pub fn find_dataset_files(data_path: &Path) -> Vec<PathBuf> {
    if !data_path.exists() {
        warn!("Data path does not exist: {}", data_path.display());
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(data_path)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file() && DatasetFormat::from_path(entry.path()).is_some()
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

/// Read and validate every row of one dataset file.
pub fn read_records_from_file(path: &Path) -> Result<LoadedFile> {
    let format = DatasetFormat::from_path(path)
        .ok_or_else(|| DashboardError::UnsupportedFormat(path.to_path_buf()))?;

    let loaded = match format {
        DatasetFormat::Json => read_json_document(path)?,
        DatasetFormat::JsonLines => read_json_lines(path)?,
        DatasetFormat::Csv => read_csv(path)?,
    };

    debug!(
        "File {}: {} rows, {} skipped, {} records",
        path.display(),
        loaded.values_seen,
        loaded.values_skipped,
        loaded.records.len(),
    );
    Ok(loaded)
}

/// Load every record reachable from `path`, which may be a single file or a
/// directory.
///
/// Never fails: a missing path or an unreadable file is logged and yields
/// no records.
pub fn load_records(path: &Path) -> LoadReport {
    let mut report = LoadReport::default();

    let files = if path.is_file() {
        vec![path.to_path_buf()]
    } else {
        find_dataset_files(path)
    };

    if files.is_empty() {
        let reason = if path.exists() {
            DashboardError::NoDataFiles(path.to_path_buf())
        } else {
            DashboardError::DataPathNotFound(path.to_path_buf())
        };
        warn!("{}", reason);
        return report;
    }

    for file in &files {
        match read_records_from_file(file) {
            Ok(loaded) => report.absorb(loaded),
            Err(e) => {
                warn!("Skipping {}: {}", file.display(), e);
                report.files_failed += 1;
            }
        }
    }

    info!(
        "Loaded {} records from {} files ({} failed, {} rows skipped)",
        report.records.len(),
        report.files_read,
        report.files_failed,
        report.values_skipped,
    );
    report
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn read_to_string(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| DashboardError::FileRead {
        path: path.to_path_buf(),
        source,
    })
}

fn open(path: &Path) -> Result<std::fs::File> {
    std::fs::File::open(path).map_err(|source| DashboardError::FileRead {
        path: path.to_path_buf(),
        source,
    })
}

/// Convert raw values, counting the ones that are not records.
fn convert_values<I>(values: I) -> LoadedFile
where
    I: IntoIterator<Item = Value>,
{
    let mut loaded = LoadedFile::default();
    for value in values {
        loaded.values_seen += 1;
        match RecordConverter::from_value(&value) {
            Some(record) => loaded.records.push(record),
            None => loaded.values_skipped += 1,
        }
    }
    loaded
}

fn read_json_document(path: &Path) -> Result<LoadedFile> {
    let text = read_to_string(path)?;
    let document: Value = serde_json::from_str(&text)?;

    let rows = match document {
        Value::Array(rows) => rows,
        Value::Object(mut map) => RECORD_ARRAY_KEYS
            .iter()
            .find_map(|key| match map.remove(*key) {
                Some(Value::Array(rows)) => Some(rows),
                _ => None,
            })
            .ok_or_else(|| DashboardError::NoRecordArray(path.to_path_buf()))?,
        _ => return Err(DashboardError::NoRecordArray(path.to_path_buf())),
    };

    Ok(convert_values(rows))
}

fn read_json_lines(path: &Path) -> Result<LoadedFile> {
    let reader = std::io::BufReader::new(open(path)?);
    let mut values = Vec::new();
    let mut malformed = 0usize;

    for line_result in reader.lines() {
        let line = line_result.map_err(|source| DashboardError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match serde_json::from_str::<Value>(trimmed) {
            Ok(value) => values.push(value),
            Err(e) => {
                debug!("Failed to parse JSON line in {}: {}", path.display(), e);
                malformed += 1;
            }
        }
    }

    let mut loaded = convert_values(values);
    loaded.values_seen += malformed;
    loaded.values_skipped += malformed;
    Ok(loaded)
}

fn read_csv(path: &Path) -> Result<LoadedFile> {
    let csv_error = |e: csv::Error| DashboardError::CsvParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(open(path)?);

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(|h| h.trim().to_owned())
        .collect();

    if headers.iter().all(String::is_empty) {
        return Err(DashboardError::CsvParse {
            path: path.to_path_buf(),
            message: "CSV file contains no header row".to_owned(),
        });
    }

    let mut values = Vec::new();
    let mut malformed = 0usize;

    for result in reader.records() {
        let row = match result {
            Ok(row) => row,
            Err(e) => {
                debug!("Failed to parse CSV row in {}: {}", path.display(), e);
                malformed += 1;
                continue;
            }
        };

        // Short rows simply lack the trailing columns.
        let map: serde_json::Map<String, Value> = headers
            .iter()
            .zip(row.iter())
            .map(|(header, cell)| (header.clone(), Value::String(cell.trim().to_owned())))
            .collect();
        values.push(Value::Object(map));
    }

    let mut loaded = convert_values(values);
    loaded.values_seen += malformed;
    loaded.values_skipped += malformed;
    Ok(loaded)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    fn row(make: &str, year: i32) -> String {
        serde_json::json!({
            "Make": make,
            "Model_Year": year,
            "City": "Pune",
            "State": "Maharashtra",
            "Latitude": 18.52,
            "Longitude": 73.85,
            "Battery_Capacity": 30.2,
        })
        .to_string()
    }

    // ── DatasetFormat ─────────────────────────────────────────────────────────

    #[test]
    fn test_dataset_format_from_extension() {
        assert_eq!(
            DatasetFormat::from_path(Path::new("a.json")),
            Some(DatasetFormat::Json)
        );
        assert_eq!(
            DatasetFormat::from_path(Path::new("a.NDJSON")),
            Some(DatasetFormat::JsonLines)
        );
        assert_eq!(
            DatasetFormat::from_path(Path::new("a.csv")),
            Some(DatasetFormat::Csv)
        );
        assert_eq!(DatasetFormat::from_path(Path::new("a.txt")), None);
        assert_eq!(DatasetFormat::from_path(Path::new("README")), None);
    }

    // ── find_dataset_files ────────────────────────────────────────────────────

    #[test]
    fn test_find_dataset_files_recursive_and_sorted() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("2023");
        std::fs::create_dir_all(&sub).unwrap();
        write_file(dir.path(), "c.csv", "Make\n");
        write_file(dir.path(), "a.json", "[]");
        write_file(&sub, "b.jsonl", "");
        write_file(dir.path(), "notes.txt", "ignored");

        let files = find_dataset_files(dir.path());
        let names: Vec<&str> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["b.jsonl", "a.json", "c.csv"]);
    }

    #[test]
    fn test_find_dataset_files_nonexistent_path() {
        let files = find_dataset_files(Path::new("/tmp/does-not-exist-evdash-test-xyz"));
        assert!(files.is_empty());
    }

    // ── read_records_from_file ────────────────────────────────────────────────

    #[test]
    fn test_read_json_array() {
        let dir = TempDir::new().unwrap();
        let body = format!("[{}, {}]", row("TATA", 2022), row("MG", 2021));
        let path = write_file(dir.path(), "processed_ev_data.json", &body);

        let loaded = read_records_from_file(&path).unwrap();
        assert_eq!(loaded.records.len(), 2);
        assert_eq!(loaded.records[0].make, "TATA");
        assert_eq!(loaded.records[1].model_year, Some(2021));
        assert_eq!(loaded.values_skipped, 0);
    }

    #[test]
    fn test_read_json_object_with_data_key() {
        let dir = TempDir::new().unwrap();
        let body = format!(r#"{{"generated": "2024", "data": [{}]}}"#, row("Kia", 2023));
        let path = write_file(dir.path(), "wrapped.json", &body);

        let loaded = read_records_from_file(&path).unwrap();
        assert_eq!(loaded.records.len(), 1);
        assert_eq!(loaded.records[0].make, "Kia");
    }

    #[test]
    fn test_read_json_object_with_records_key() {
        let dir = TempDir::new().unwrap();
        let body = format!(r#"{{"records": [{}]}}"#, row("BYD", 2024));
        let path = write_file(dir.path(), "wrapped.json", &body);
        assert_eq!(read_records_from_file(&path).unwrap().records.len(), 1);
    }

    #[test]
    fn test_read_json_object_without_array_is_error() {
        let dir = TempDir::new().unwrap();
        let path = write_file(dir.path(), "meta.json", r#"{"data": 3}"#);
        let err = read_records_from_file(&path).unwrap_err();
        assert!(matches!(err, DashboardError::NoRecordArray(_)));
    }

    #[test]
    fn test_read_json_malformed_is_error() {
        let dir = TempDir::new().unwrap();
        let path = write_file(dir.path(), "broken.json", "[{not json");
        let err = read_records_from_file(&path).unwrap_err();
        assert!(matches!(err, DashboardError::JsonParse(_)));
    }

    #[test]
    fn test_read_json_skips_non_objects() {
        let dir = TempDir::new().unwrap();
        let body = format!(r#"[{}, 42, "text", null]"#, row("Tesla", 2020));
        let path = write_file(dir.path(), "mixed.json", &body);

        let loaded = read_records_from_file(&path).unwrap();
        assert_eq!(loaded.records.len(), 1);
        assert_eq!(loaded.values_seen, 4);
        assert_eq!(loaded.values_skipped, 3);
    }

    #[test]
    fn test_read_json_lines_skips_malformed_lines() {
        let dir = TempDir::new().unwrap();
        let body = format!("{}\n{{bad\n\n{}\n", row("Tesla", 2020), row("Nissan", 2021));
        let path = write_file(dir.path(), "rows.jsonl", &body);

        let loaded = read_records_from_file(&path).unwrap();
        assert_eq!(loaded.records.len(), 2);
        assert_eq!(loaded.values_seen, 3);
        assert_eq!(loaded.values_skipped, 1);
    }

    #[test]
    fn test_read_csv_rows() {
        let dir = TempDir::new().unwrap();
        let body = "Make,Model Year,City,State,Latitude,Longitude,Battery_Capacity\n\
                    TESLA,2020,Seattle,WA,47.6,-122.3,75\n\
                    NISSAN,2019,Olympia,WA,,,\n";
        let path = write_file(dir.path(), "registrations.csv", body);

        let loaded = read_records_from_file(&path).unwrap();
        assert_eq!(loaded.records.len(), 2);

        let tesla = &loaded.records[0];
        assert_eq!(tesla.make, "TESLA");
        assert_eq!(tesla.model_year, Some(2020));
        assert_eq!(tesla.latitude, Some(47.6));
        assert_eq!(tesla.battery_capacity_kwh, Some(75.0));

        let nissan = &loaded.records[1];
        assert_eq!(nissan.latitude, None);
        assert_eq!(nissan.battery_capacity_kwh, None);
    }

    #[test]
    fn test_read_csv_short_rows_are_kept() {
        let dir = TempDir::new().unwrap();
        let body = "Make,Model_Year,City\nKIA,2022\n";
        let path = write_file(dir.path(), "short.csv", body);

        let loaded = read_records_from_file(&path).unwrap();
        assert_eq!(loaded.records.len(), 1);
        assert_eq!(loaded.records[0].make, "KIA");
        assert!(loaded.records[0].city.is_empty());
    }

    #[test]
    fn test_read_unsupported_extension() {
        let dir = TempDir::new().unwrap();
        let path = write_file(dir.path(), "data.xml", "<rows/>");
        let err = read_records_from_file(&path).unwrap_err();
        assert!(matches!(err, DashboardError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_records_from_file(Path::new("/tmp/evdash-missing-file.json")).unwrap_err();
        assert!(matches!(err, DashboardError::FileRead { .. }));
    }

    // ── load_records ──────────────────────────────────────────────────────────

    #[test]
    fn test_load_records_single_file() {
        let dir = TempDir::new().unwrap();
        let path = write_file(dir.path(), "one.json", &format!("[{}]", row("MG", 2022)));

        let report = load_records(&path);
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.files_read, 1);
        assert_eq!(report.files_failed, 0);
    }

    #[test]
    fn test_load_records_directory_counts_failures() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "a.json", &format!("[{}]", row("MG", 2022)));
        write_file(dir.path(), "b.json", "{broken");
        write_file(dir.path(), "c.jsonl", &row("TATA", 2023));

        let report = load_records(dir.path());
        assert_eq!(report.records.len(), 2);
        assert_eq!(report.files_read, 2);
        assert_eq!(report.files_failed, 1);
        // Directory order is path order.
        assert_eq!(report.records[0].make, "MG");
        assert_eq!(report.records[1].make, "TATA");
    }

    #[test]
    fn test_load_records_malformed_file_yields_empty_set() {
        let dir = TempDir::new().unwrap();
        let path = write_file(dir.path(), "processed_ev_data.json", "not json at all");

        let report = load_records(&path);
        assert!(report.records.is_empty());
        assert_eq!(report.files_failed, 1);
    }

    #[test]
    fn test_load_records_missing_path() {
        let report = load_records(Path::new("/tmp/does-not-exist-evdash-test-xyz"));
        assert!(report.records.is_empty());
        assert_eq!(report.files_read, 0);
    }

    #[test]
    fn test_load_records_keeps_duplicates() {
        let dir = TempDir::new().unwrap();
        let line = row("Tesla", 2020);
        let path = write_file(dir.path(), "dupes.jsonl", &format!("{line}\n{line}\n"));

        let report = load_records(&path);
        assert_eq!(report.records.len(), 2);
        assert_eq!(report.records[0], report.records[1]);
    }
}
