//! Evaluation framework: scored items, per-group metrics (R@K, manual effort@K, MRR),
//! and the grouped ranking engine.

pub mod engine;
pub mod item;
pub mod metrics;
pub mod thresholds;

pub use engine::{AggregateMetrics, Evaluation, GroupSummary, KMetrics, RankMetricsEngine};
pub use item::{Label, RankedItem, ScoredItem};
pub use metrics::{manual_effort_at_k, mean_reciprocal_rank, recall_at_k};
pub use thresholds::{KValues, DEFAULT_K_VALUES};
