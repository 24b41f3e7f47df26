//! Rank table and metrics table writers.

use crate::artifacts::{backup_existing, escape_field};
use crate::error::Result;
use crate::eval::{AggregateMetrics, RankedItem};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub const RANK_TABLE_HEADER: &str = "cve,rank,label";
pub const METRICS_TABLE_HEADER: &str = "k,recall,manual_effort,MRR";

fn create_fresh(path: &Path) -> Result<BufWriter<File>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    backup_existing(path)?;
    Ok(BufWriter::new(File::create(path)?))
}

/// Write one `cve,rank,label` row per ranked item, in the given order.
pub fn write_rank_table(path: &Path, rows: &[RankedItem]) -> Result<()> {
    let mut out = create_fresh(path)?;
    writeln!(out, "{}", RANK_TABLE_HEADER)?;
    for row in rows {
        writeln!(out, "{},{},{}", escape_field(&row.group_key), row.rank, row.label)?;
    }
    out.flush()?;
    log::info!("Wrote {} rank rows to {}", rows.len(), path.display());
    Ok(())
}

/// Write one row per k; MRR is a single scalar repeated on every row.
pub fn write_metrics_table(path: &Path, metrics: &AggregateMetrics) -> Result<()> {
    let mut out = create_fresh(path)?;
    writeln!(out, "{}", METRICS_TABLE_HEADER)?;
    for m in &metrics.per_k {
        writeln!(out, "{},{},{},{}", m.k, m.recall, m.manual_effort, metrics.mrr)?;
    }
    out.flush()?;
    log::info!("Wrote metrics for {} cutoffs to {}", metrics.per_k.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::{KValues, RankMetricsEngine};
    use std::fs;
    use tempfile::TempDir;

    fn sample_engine() -> RankMetricsEngine {
        let mut engine = RankMetricsEngine::new();
        engine.record("CVE-A", 0.1, 0).unwrap();
        engine.record("CVE-A", 0.9, 1).unwrap();
        engine.record("CVE-B", 0.8, 0).unwrap();
        engine.record("CVE-B", 0.2, 0).unwrap();
        engine
    }

    #[test]
    fn test_rank_table_contents() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("rank_info.csv");
        let eval = sample_engine().finalize(&KValues::new(vec![1, 2]).unwrap());

        write_rank_table(&path, &eval.rank_table).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "cve,rank,label\nCVE-A,1,1\nCVE-A,2,0\nCVE-B,1,0\nCVE-B,2,0\n"
        );
    }

    #[test]
    fn test_metrics_table_contents() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("metrics.csv");
        let eval = sample_engine().finalize(&KValues::new(vec![1, 2]).unwrap());

        write_metrics_table(&path, &eval.metrics).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "k,recall,manual_effort,MRR\n1,0,1,0.5\n2,0.5,1.5,0.5\n");
    }

    #[test]
    fn test_rewrite_preserves_previous_artifact() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("rank_info.csv");
        fs::write(&path, "previous run").unwrap();

        write_rank_table(&path, &[]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "cve,rank,label\n");
        assert_eq!(
            fs::read_to_string(temp_dir.path().join("rank_info.csv.bak")).unwrap(),
            "previous run"
        );
    }

    #[test]
    fn test_writer_creates_missing_directories() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested/run/metrics.csv");
        let eval = RankMetricsEngine::new().finalize(&KValues::default());

        write_metrics_table(&path, &eval.metrics).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 15);
        assert!(content.contains("\n100,0,100,0\n"));
    }
}
