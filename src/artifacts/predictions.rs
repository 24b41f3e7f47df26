//! Append-only per-item prediction log and its reader.

use crate::artifacts::{backup_existing, escape_field, unescape_field};
use crate::error::{PatchrankError, Result};
use crate::eval::{Label, ScoredItem};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Headerless `cve,output,label` lines, one per recorded prediction.
///
/// Purely observational: the engine never reads it back.
#[derive(Debug)]
pub struct PredictionLog {
    path: PathBuf,
    file: File,
}

impl PredictionLog {
    /// Back up any existing file at `path`, then open a fresh log for appending.
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        backup_existing(path)?;
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        log::info!("Logging predictions to {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one line. Written straight to the file so a crash loses at most
    /// the line in flight. Keys containing line breaks are rejected since the
    /// log is read back line by line.
    pub fn append(&mut self, group_key: &str, score: f64, label: Label) -> Result<()> {
        if group_key.contains(|c: char| c == '\n' || c == '\r') {
            return Err(PatchrankError::InvalidInput(format!(
                "group key {:?} contains a line break",
                group_key
            )));
        }
        writeln!(self.file, "{},{},{}", escape_field(group_key), score, label)?;
        Ok(())
    }
}

/// Read a prediction log (or any scorer output shaped `key,score,label`).
///
/// The last two fields are score and label; everything before them is the
/// group key. A first line whose score and label fields are both non-numeric
/// is taken as a header. Labels may be written as integers or integral
/// floats (`1.0`).
pub fn read_predictions(path: &Path) -> Result<Vec<ScoredItem>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut items = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = idx + 1;
        if line.trim().is_empty() {
            continue;
        }

        let mut fields = line.rsplitn(3, ',');
        let (label_field, score_field, key_field) =
            match (fields.next(), fields.next(), fields.next()) {
                (Some(label), Some(score), Some(key)) => (label, score, key),
                _ => {
                    return Err(PatchrankError::Parse(format!(
                        "{} line {}: expected `key,score,label`",
                        path.display(),
                        line_no
                    )))
                }
            };

        let score = match score_field.trim().parse::<f64>() {
            Ok(score) => score,
            Err(_) if idx == 0 && parse_label(label_field.trim()).is_none() => {
                log::debug!("Skipping header line in {}: {}", path.display(), line);
                continue;
            }
            Err(_) => {
                return Err(PatchrankError::Parse(format!(
                    "{} line {}: invalid score {:?}",
                    path.display(),
                    line_no,
                    score_field
                )))
            }
        };

        let label = parse_label(label_field.trim()).ok_or_else(|| {
            PatchrankError::Parse(format!(
                "{} line {}: invalid label {:?}",
                path.display(),
                line_no,
                label_field
            ))
        })?;

        items.push(ScoredItem::new(unescape_field(key_field), score, label)?);
    }

    log::info!("Read {} predictions from {}", items.len(), path.display());
    Ok(items)
}

fn parse_label(field: &str) -> Option<i64> {
    if let Ok(label) = field.parse::<i64>() {
        return Some(label);
    }
    let value = field.parse::<f64>().ok()?;
    if value.fract() == 0.0 && value.is_finite() {
        Some(value as i64)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_log_then_read_back() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("predict.csv");
        let mut log = PredictionLog::create(&path).unwrap();
        log.append("CVE-2019-0001", 0.125, Label::Positive).unwrap();
        log.append("odd,key", -3.5, Label::Negative).unwrap();
        drop(log);

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "CVE-2019-0001,0.125,1\n\"odd,key\",-3.5,0\n");

        let items = read_predictions(&path).unwrap();
        assert_eq!(
            items,
            vec![
                ScoredItem::new("CVE-2019-0001", 0.125, 1).unwrap(),
                ScoredItem::new("odd,key", -3.5, 0).unwrap(),
            ]
        );
    }

    #[test]
    fn test_create_backs_up_previous_log() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("predict.csv");
        fs::write(&path, "CVE-1,0.5,1\n").unwrap();

        let log = PredictionLog::create(&path).unwrap();
        drop(log);
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
        assert_eq!(
            fs::read_to_string(temp_dir.path().join("predict.csv.bak")).unwrap(),
            "CVE-1,0.5,1\n"
        );
    }

    #[test]
    fn test_read_skips_header_and_accepts_float_labels() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("scores.csv");
        fs::write(&path, "cve,output,label\nCVE-1,2.5,1.0\n\nCVE-1,-1.0,0.0\n").unwrap();

        let items = read_predictions(&path).unwrap();
        assert_eq!(items.len(), 2);
        assert!(items[0].label.is_positive());
        assert_eq!(items[1].score, -1.0);
    }

    #[test]
    fn test_read_rejects_bad_label() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("scores.csv");
        fs::write(&path, "CVE-1,0.5,3\n").unwrap();

        assert!(matches!(
            read_predictions(&path),
            Err(PatchrankError::InvalidLabel(3))
        ));
    }

    #[test]
    fn test_read_reports_line_number() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("scores.csv");
        fs::write(&path, "CVE-1,0.5,1\nCVE-2,high,0\n").unwrap();

        let err = read_predictions(&path).unwrap_err();
        assert!(matches!(err, PatchrankError::Parse(_)));
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_read_rejects_malformed_first_row() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("scores.csv");
        fs::write(&path, "CVE-1,high,1\nCVE-1,0.5,0\n").unwrap();

        let err = read_predictions(&path).unwrap_err();
        assert!(matches!(err, PatchrankError::Parse(_)));
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn test_edge_whitespace_keys_stay_distinct() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("predict.csv");
        let mut log = PredictionLog::create(&path).unwrap();
        log.append(" CVE-1", 0.5, Label::Positive).unwrap();
        log.append("CVE-1", 0.25, Label::Negative).unwrap();
        drop(log);

        let keys: Vec<String> = read_predictions(&path)
            .unwrap()
            .into_iter()
            .map(|item| item.group_key)
            .collect();
        assert_eq!(keys, vec![" CVE-1".to_string(), "CVE-1".to_string()]);
    }

    #[test]
    fn test_line_break_in_key_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("predict.csv");
        let mut log = PredictionLog::create(&path).unwrap();
        let err = log.append("CVE-1\nx", 0.5, Label::Positive).unwrap_err();
        assert!(matches!(err, PatchrankError::InvalidInput(_)));
        assert!(log.append("CVE-1\rx", 0.5, Label::Positive).is_err());
        log.append("CVE-2", 0.5, Label::Negative).unwrap();
        drop(log);

        let items = read_predictions(&path).unwrap();
        assert_eq!(items, vec![ScoredItem::new("CVE-2", 0.5, 0).unwrap()]);
    }

    #[test]
    fn test_read_rejects_short_line() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("scores.csv");
        fs::write(&path, "CVE-1,0.5,1\n0.5\n").unwrap();

        assert!(matches!(
            read_predictions(&path),
            Err(PatchrankError::Parse(_))
        ));
    }
}
