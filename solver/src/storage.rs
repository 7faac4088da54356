//! Persistence of sweep results.
//!
//! Text format (`evs.txt`): one line per win amount, each line the list of
//! root entries for `lose = 0..=limit(win)`:
//!
//! ```text
//! [('p', 0.0)]
//! [('p', 1.0), ('p', 0.75), ('w', -0.1288555994688801)]
//! ```
//!
//! Values are written with full round-trip precision; the 2-decimal form is a
//! display concern (see [`crate::display`]). A JSON form carrying the sweep
//! configuration alongside the grid is also provided.
//!
//! Saving only borrows the result, so a failed write can be retried without
//! recomputing the sweep. Each file handle lives inside one function call and
//! is closed on every return path.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::config::SweepConfig;
use crate::error::{CoinflipError, Result};
use crate::sweep::SweepResult;
use crate::types::{Action, PolicyEntry};

/// Sweep grid plus the configuration that produced it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SweepRecord {
    pub config: SweepConfig,
    pub result: SweepResult,
}

/// Render one row as `[('a', 1.5), ('p', -2.0)]`.
pub fn format_sweep_row(row: &[PolicyEntry]) -> String {
    let pairs: Vec<String> = row
        .iter()
        .map(|e| format!("('{}', {:?})", e.action.label(), e.expected_value))
        .collect();
    format!("[{}]", pairs.join(", "))
}

/// Parse a line produced by [`format_sweep_row`].
pub fn parse_sweep_row(line: &str) -> std::result::Result<Vec<PolicyEntry>, String> {
    let inner = line
        .trim()
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .ok_or_else(|| "expected a bracketed list".to_string())?;

    let mut entries = Vec::new();
    let mut rest = inner;
    while let Some(open) = rest.find('(') {
        let gap = rest[..open].trim();
        if !(gap.is_empty() || (gap == "," && !entries.is_empty())) {
            return Err(format!("unexpected text '{gap}' between pairs"));
        }
        let close = rest[open..]
            .find(')')
            .map(|c| open + c)
            .ok_or_else(|| "unterminated pair".to_string())?;
        let (label, value) = rest[open + 1..close]
            .split_once(',')
            .ok_or_else(|| format!("expected (label, value), got '{}'", &rest[open..=close]))?;
        let label = label.trim().trim_matches(|c| c == '\'' || c == '"');
        let action =
            Action::from_label(label).ok_or_else(|| format!("unknown action label '{label}'"))?;
        let expected_value: f64 = value
            .trim()
            .parse()
            .map_err(|e| format!("bad value '{}': {e}", value.trim()))?;
        entries.push(PolicyEntry::new(action, expected_value));
        rest = &rest[close + 1..];
    }
    if !rest.trim().is_empty() {
        return Err(format!("trailing text '{}'", rest.trim()));
    }
    Ok(entries)
}

fn create_with_parents(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| CoinflipError::io(parent, e))?;
        }
    }
    File::create(path).map_err(|e| CoinflipError::io(path, e))
}

/// Write the text artifact, one line per win amount.
pub fn save_sweep_text(result: &SweepResult, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let start = Instant::now();
    let mut writer = BufWriter::new(create_with_parents(path)?);
    for row in result.rows() {
        writeln!(writer, "{}", format_sweep_row(row)).map_err(|e| CoinflipError::io(path, e))?;
    }
    writer.flush().map_err(|e| CoinflipError::io(path, e))?;
    log::info!(
        "saved {} sweep rows to {} in {:.2} ms",
        result.len(),
        path.display(),
        start.elapsed().as_secs_f64() * 1000.0
    );
    Ok(())
}

/// Read a text artifact back. Blank lines are skipped.
pub fn load_sweep_text(path: impl AsRef<Path>) -> Result<SweepResult> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path).map_err(|e| CoinflipError::io(path, e))?);
    let mut rows = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| CoinflipError::io(path, e))?;
        if line.trim().is_empty() {
            continue;
        }
        let row = parse_sweep_row(&line).map_err(|reason| CoinflipError::MalformedSweep {
            path: path.to_path_buf(),
            line: idx + 1,
            reason,
        })?;
        rows.push(row);
    }
    Ok(SweepResult::from_rows(rows))
}

/// Write the grid and its configuration as pretty-printed JSON.
pub fn save_sweep_json(record: &SweepRecord, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(create_with_parents(path)?);
    serde_json::to_writer_pretty(&mut writer, record).map_err(|e| CoinflipError::json(path, e))?;
    writer.flush().map_err(|e| CoinflipError::io(path, e))?;
    log::info!("saved sweep record to {}", path.display());
    Ok(())
}

pub fn load_sweep_json(path: impl AsRef<Path>) -> Result<SweepRecord> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path).map_err(|e| CoinflipError::io(path, e))?);
    serde_json::from_reader(reader).map_err(|e| CoinflipError::json(path, e))
}

/// Write the text artifact and, when `json` is given, the JSON record.
///
/// Every sink is attempted even if an earlier one fails. The failures are
/// returned in order; an empty vector means everything was written.
pub fn save_sweep_outputs(
    record: &SweepRecord,
    text: impl AsRef<Path>,
    json: Option<&Path>,
) -> Vec<CoinflipError> {
    let mut failures = Vec::new();
    if let Err(e) = save_sweep_text(&record.result, text) {
        log::error!("{e}");
        failures.push(e);
    }
    if let Some(path) = json {
        if let Err(e) = save_sweep_json(record, path) {
            log::error!("{e}");
            failures.push(e);
        }
    }
    failures
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(action: Action, value: f64) -> PolicyEntry {
        PolicyEntry::new(action, value)
    }

    #[test]
    fn test_format_row() {
        let row = [entry(Action::Pardon, 15.0), entry(Action::Accuse, -3.25)];
        assert_eq!(format_sweep_row(&row), "[('p', 15.0), ('a', -3.25)]");
        assert_eq!(format_sweep_row(&[]), "[]");
    }

    #[test]
    fn test_parse_row_keeps_full_precision() {
        let row = [
            entry(Action::Wait, -1.9609374999999996),
            entry(Action::Pardon, 1.7763568394002505e-15),
        ];
        let parsed = parse_sweep_row(&format_sweep_row(&row)).unwrap();
        assert_eq!(parsed, row);
    }

    #[test]
    fn test_parse_tuple_style_line() {
        let parsed = parse_sweep_row("[('p', 0.0), ('a', 12.5), ('w', -0.25)]").unwrap();
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[1], entry(Action::Accuse, 12.5));
        assert!(parse_sweep_row("[]").unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_sweep_row("('p', 1.0)").is_err());
        assert!(parse_sweep_row("[('x', 1.0)]").is_err());
        assert!(parse_sweep_row("[('p', one)]").is_err());
        assert!(parse_sweep_row("[('p', 1.0) junk]").is_err());
    }

    #[test]
    fn test_load_reports_line_number() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.txt");
        fs::write(&path, "[('p', 0.0)]\n[('q', 1.0)]\n").unwrap();
        match load_sweep_text(&path) {
            Err(CoinflipError::MalformedSweep { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected MalformedSweep, got {other:?}"),
        }
    }

    #[test]
    fn test_failed_text_sink_still_writes_json() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where the text output's parent directory should be.
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();
        let text = blocker.join("evs.txt");
        let json = dir.path().join("sweep.json");

        let record = SweepRecord {
            config: SweepConfig::default(),
            result: SweepResult::from_rows(vec![vec![entry(Action::Pardon, 0.0)]]),
        };
        let failures = save_sweep_outputs(&record, &text, Some(&json));
        assert_eq!(failures.len(), 1);
        assert!(matches!(failures[0], CoinflipError::Io { .. }));
        assert_eq!(load_sweep_json(&json).unwrap(), record);

        // Same record, good paths: retry succeeds without recomputing.
        let retry = dir.path().join("evs.txt");
        assert!(save_sweep_outputs(&record, &retry, None).is_empty());
        assert_eq!(load_sweep_text(&retry).unwrap(), record.result);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_sweep_text(dir.path().join("absent.txt")).unwrap_err();
        assert!(matches!(err, CoinflipError::Io { .. }));
    }
}
