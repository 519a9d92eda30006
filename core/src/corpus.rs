//! Reading corpus sources into raw records.
//!
//! A source is a CSV, JSON or JSONL file, or a directory holding any number
//! of them. Records come back in source order; directories are walked in
//! file-name order. Filtering out records without a storyline is left to
//! [`crate::CorpusIndex::build`] so in-memory corpora get the same treatment.

use crate::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Column holding the display title.
pub const TITLE_COLUMN: &str = "Movie Name";
/// Column holding the storyline text.
pub const STORYLINE_COLUMN: &str = "Storyline";

/// Markers tabular tooling writes for a missing value.
const NA_MARKERS: &[&str] = &["n/a", "na", "nan", "null", "none", "#n/a"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieRecord {
    #[serde(rename = "Movie Name", alias = "title", default)]
    pub title: Option<String>,
    #[serde(rename = "Storyline", alias = "storyline", default)]
    pub storyline: Option<String>,
}

impl MovieRecord {
    pub fn new(title: impl Into<String>, storyline: impl Into<String>) -> Self {
        Self { title: Some(title.into()), storyline: Some(storyline.into()) }
    }

    /// The storyline, unless it is absent, blank, or an NA marker.
    pub fn usable_storyline(&self) -> Option<&str> {
        self.storyline.as_deref().filter(|s| !is_missing(s))
    }
}

fn is_missing(value: &str) -> bool {
    let v = value.trim();
    v.is_empty() || NA_MARKERS.iter().any(|m| v.eq_ignore_ascii_case(m))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Csv,
    Json,
    Jsonl,
}

fn format_of(path: &Path) -> Option<Format> {
    match path.extension().and_then(|s| s.to_str()).map(|s| s.to_ascii_lowercase()).as_deref() {
        Some("csv") => Some(Format::Csv),
        Some("json") => Some(Format::Json),
        Some("jsonl") => Some(Format::Jsonl),
        _ => None,
    }
}

/// Load every record from a file or directory.
pub fn load_records<P: AsRef<Path>>(source: P) -> EngineResult<Vec<MovieRecord>> {
    let source = source.as_ref();
    if source.is_dir() {
        let mut records = Vec::new();
        for file in corpus_files(source)? {
            records.extend(load_file(&file)?);
        }
        Ok(records)
    } else if source.is_file() {
        load_file(source)
    } else {
        Err(EngineError::unavailable(source, "no such file or directory"))
    }
}

fn corpus_files(dir: &Path) -> EngineResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| EngineError::unavailable(dir, e))?;
        let p = entry.path();
        if p.is_file() && format_of(p).is_some() {
            files.push(p.to_path_buf());
        }
    }
    Ok(files)
}

fn load_file(path: &Path) -> EngineResult<Vec<MovieRecord>> {
    let file = File::open(path).map_err(|e| EngineError::unavailable(path, e))?;
    // Unrecognized extensions are read as CSV, the scraper's output format.
    let records = match format_of(path).unwrap_or(Format::Csv) {
        Format::Csv => read_csv(file),
        Format::Json => read_json(BufReader::new(file)),
        Format::Jsonl => read_jsonl(BufReader::new(file)),
    };
    let records = records.map_err(|reason| EngineError::unavailable(path, reason))?;
    tracing::debug!(path = %path.display(), records = records.len(), "read corpus file");
    Ok(records)
}

/// Read CSV with a header row. The storyline column must be present.
/// Short rows are accepted; their missing trailing fields read as absent.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<MovieRecord>, String> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr.headers().map_err(|e| e.to_string())?.clone();
    if !headers.iter().any(|h| h == STORYLINE_COLUMN || h == "storyline") {
        return Err(format!("missing `{STORYLINE_COLUMN}` column"));
    }
    let mut records = Vec::new();
    for row in rdr.deserialize() {
        let record: MovieRecord = row.map_err(|e| e.to_string())?;
        records.push(record);
    }
    Ok(records)
}

/// Read a JSON array of records, or a single record object.
pub fn read_json<R: Read>(reader: R) -> Result<Vec<MovieRecord>, String> {
    let json: serde_json::Value = serde_json::from_reader(reader).map_err(|e| e.to_string())?;
    match json {
        serde_json::Value::Array(arr) => arr
            .into_iter()
            .map(|v| serde_json::from_value(v).map_err(|e| e.to_string()))
            .collect(),
        serde_json::Value::Object(_) => {
            let record = serde_json::from_value(json).map_err(|e| e.to_string())?;
            Ok(vec![record])
        }
        _ => Err("expected a JSON array or object".into()),
    }
}

/// Read one record per line; blank lines are skipped.
pub fn read_jsonl<R: BufRead>(reader: R) -> Result<Vec<MovieRecord>, String> {
    let mut records = Vec::new();
    for (lineno, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| e.to_string())?;
        if line.trim().is_empty() { continue; }
        let record = serde_json::from_str(&line).map_err(|e| format!("line {}: {e}", lineno + 1))?;
        records.push(record);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_empty_and_na_storylines_are_unusable() {
        let data = "Movie Name,Storyline,Year\nA,a wizard,2024\nB,,2024\nC,N/A,2024\n,orphan plot,2024\n";
        let records = read_csv(data.as_bytes()).unwrap();
        assert_eq!(records.len(), 4);
        assert_eq!(records[0].usable_storyline(), Some("a wizard"));
        assert_eq!(records[1].usable_storyline(), None);
        assert_eq!(records[2].usable_storyline(), None);
        assert_eq!(records[3].title, None);
        assert_eq!(records[3].usable_storyline(), Some("orphan plot"));
    }

    #[test]
    fn csv_short_rows_become_unusable_records() {
        let data = "Movie Name,Storyline,Year\nA,a wizard,2024\nB,a detective\nC\n";
        let records = read_csv(data.as_bytes()).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[1].usable_storyline(), Some("a detective"));
        assert_eq!(records[2].title.as_deref(), Some("C"));
        assert_eq!(records[2].usable_storyline(), None);
    }

    #[test]
    fn csv_without_storyline_column_is_rejected() {
        let err = read_csv("Movie Name,Plot\nA,x\n".as_bytes()).unwrap_err();
        assert!(err.contains("Storyline"));
    }

    #[test]
    fn json_accepts_aliases_and_single_objects() {
        let arr = r#"[{"title":"A","storyline":"x"},{"Movie Name":"B","Storyline":"y"}]"#;
        let records = read_json(arr.as_bytes()).unwrap();
        assert_eq!(records, vec![MovieRecord::new("A", "x"), MovieRecord::new("B", "y")]);

        let one = read_json(r#"{"Movie Name":"C","Storyline":"z"}"#.as_bytes()).unwrap();
        assert_eq!(one.len(), 1);
        assert!(read_json("42".as_bytes()).is_err());
    }

    #[test]
    fn jsonl_skips_blank_lines_and_reports_bad_ones() {
        let data = "{\"title\":\"A\",\"storyline\":\"x\"}\n\n{\"title\":\"B\"}\n";
        let records = read_jsonl(data.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].usable_storyline(), None);

        let err = read_jsonl("{\"title\":\"A\"}\nnot json\n".as_bytes()).unwrap_err();
        assert!(err.starts_with("line 2"));
    }

    #[test]
    fn missing_path_is_unavailable() {
        let err = load_records("/definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, EngineError::SourceUnavailable { .. }));
    }

    #[test]
    fn directory_is_read_in_file_name_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.jsonl"), "{\"title\":\"Second\",\"storyline\":\"y\"}\n").unwrap();
        std::fs::write(dir.path().join("a.csv"), "Movie Name,Storyline\nFirst,x\n").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        let records = load_records(dir.path()).unwrap();
        let titles: Vec<_> = records.iter().filter_map(|r| r.title.as_deref()).collect();
        assert_eq!(titles, vec!["First", "Second"]);
    }
}
