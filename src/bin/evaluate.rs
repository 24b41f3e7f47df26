//! Evaluation CLI: rank scored candidates per CVE and report recall@k, manual effort@k, and MRR.

use anyhow::{Context, Result};
use clap::Parser;
use patchrank::{
    artifacts::{read_predictions, write_metrics_table, write_rank_table, PredictionLog},
    eval::{KValues, RankMetricsEngine},
    config::ConfigOverrides,
    Config,
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "evaluate")]
#[command(about = "Rank model scores per CVE and compute recall@k, manual effort@k, and MRR")]
struct Args {
    /// Scorer output with `cve,score,label` lines (header optional).
    predictions: PathBuf,

    /// Config file (default: $PATCHRANK_CONFIG or ./config.toml).
    #[arg(long)]
    config: Option<PathBuf>,

    /// k values for evaluation (comma-separated), overrides config.
    #[arg(long, value_delimiter = ',')]
    k_values: Option<Vec<usize>>,

    /// Output directory for rank and metrics tables, overrides config.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Run name used in artifact file names, overrides config.
    #[arg(long)]
    run_name: Option<String>,

    /// Also copy accepted predictions into predict_<run>.csv.
    #[arg(long)]
    log_predictions: bool,

    /// Print the full evaluation as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Print per-CVE positive ranks.
    #[arg(long)]
    per_group: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let overrides = ConfigOverrides {
        k_values: args.k_values.clone(),
        output_dir: args.output_dir.clone(),
        run_name: args.run_name.clone(),
    };
    let config = Config::load_with(args.config.as_deref(), overrides)?;

    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or("RUST_LOG", config.logging.log_level.as_str()),
    )
    .init();

    let k_values: KValues = config.k_values().context("Invalid --k-values")?;

    log::info!("Evaluating predictions from {}", args.predictions.display());
    let items = read_predictions(&args.predictions)
        .with_context(|| format!("Failed to read {}", args.predictions.display()))?;

    let mut engine = RankMetricsEngine::new();
    if args.log_predictions {
        engine = engine.with_prediction_log(PredictionLog::create(&config.prediction_log_path())?);
    }
    engine.extend(&items);
    log::info!(
        "Recorded {} predictions across {} CVEs",
        engine.item_count(),
        engine.group_count()
    );
    if engine.is_empty() {
        log::warn!("No predictions recorded; metrics fall back to defaults");
    }

    let evaluation = engine.finalize(&k_values);

    for m in &evaluation.metrics.per_k {
        log::info!("Average Top@{} recall: {:.4}", m.k, m.recall);
        log::info!("Manual Efforts@{}: {:.4}", m.k, m.manual_effort);
    }
    log::info!("Average MRR: {:.4}", evaluation.metrics.mrr);

    write_rank_table(&config.rank_table_path(), &evaluation.rank_table)?;
    write_metrics_table(&config.metrics_table_path(), &evaluation.metrics)?;

    if args.per_group {
        for group in &evaluation.groups {
            println!(
                "  {} ({} candidates, positives at {:?}, RR: {:.4})",
                group.group_key, group.candidates, group.positive_ranks, group.reciprocal_rank
            );
        }
    }

    if args.json {
        println!("{}", evaluation.to_json()?);
    } else {
        println!("\n=== Evaluation Results ({} CVEs) ===", evaluation.metrics.group_count);
        println!("{:>5}  {:>8}  {:>13}", "k", "Recall", "ManualEffort");
        for m in &evaluation.metrics.per_k {
            println!("{:>5}  {:>8.4}  {:>13.4}", m.k, m.recall, m.manual_effort);
        }
        println!("MRR: {:.4}", evaluation.metrics.mrr);
    }

    Ok(())
}
