//! Grouped ranking engine: accumulate scored candidates per query key, then
//! rank each group and aggregate recall@k, manual effort@k, and MRR.

use crate::artifacts::PredictionLog;
use crate::error::Result;
use crate::eval::item::{Label, RankedItem, ScoredItem};
use crate::eval::metrics::{
    descending_score, manual_effort_at_k, mean, mean_reciprocal_rank, recall_at_k,
};
use crate::eval::thresholds::KValues;
use serde::Serialize;
use std::collections::HashMap;

/// Recall and manual effort at a single cutoff.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KMetrics {
    pub k: usize,
    pub recall: f64,
    pub manual_effort: f64,
}

/// Metrics averaged (unweighted) over every group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateMetrics {
    /// One entry per k, in threshold order.
    pub per_k: Vec<KMetrics>,
    pub mrr: f64,
    pub group_count: usize,
}

impl AggregateMetrics {
    pub fn at(&self, k: usize) -> Option<&KMetrics> {
        self.per_k.iter().find(|m| m.k == k)
    }
}

/// Ranking outcome of a single group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub group_key: String,
    pub candidates: usize,
    pub positive_ranks: Vec<usize>,
    pub reciprocal_rank: f64,
}

/// Result of one finalization pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub metrics: AggregateMetrics,
    /// Every ranked item, grouped in first-seen order, rank ascending.
    pub rank_table: Vec<RankedItem>,
    pub groups: Vec<GroupSummary>,
}

#[derive(Debug)]
struct Group {
    key: String,
    candidates: Vec<(f64, Label)>,
}

/// Accumulates scored candidates per group and computes ranking metrics.
///
/// Groups are kept in the order their key was first recorded and are never
/// evicted.
#[derive(Debug, Default)]
pub struct RankMetricsEngine {
    groups: Vec<Group>,
    index: HashMap<String, usize>,
    prediction_log: Option<PredictionLog>,
}

impl RankMetricsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mirror every accepted record into an append-only prediction log.
    /// Log write failures are reported with `log::warn!` and otherwise ignored.
    pub fn with_prediction_log(mut self, log: PredictionLog) -> Self {
        self.prediction_log = Some(log);
        self
    }

    /// Record one model score. Only the label is validated.
    pub fn record(&mut self, group_key: &str, score: f64, label: i64) -> Result<()> {
        let label = Label::try_from(label)?;
        self.push(group_key, score, label);
        Ok(())
    }

    pub fn record_item(&mut self, item: &ScoredItem) {
        self.push(&item.group_key, item.score, item.label);
    }

    pub fn extend<'a, I>(&mut self, items: I)
    where
        I: IntoIterator<Item = &'a ScoredItem>,
    {
        for item in items {
            self.record_item(item);
        }
    }

    fn push(&mut self, group_key: &str, score: f64, label: Label) {
        let idx = match self.index.get(group_key) {
            Some(&idx) => idx,
            None => {
                self.groups.push(Group {
                    key: group_key.to_string(),
                    candidates: Vec::new(),
                });
                self.index.insert(group_key.to_string(), self.groups.len() - 1);
                self.groups.len() - 1
            }
        };
        self.groups[idx].candidates.push((score, label));

        if let Some(ref mut prediction_log) = self.prediction_log {
            if let Err(e) = prediction_log.append(group_key, score, label) {
                log::warn!(
                    "Failed to append prediction to {}: {}",
                    prediction_log.path().display(),
                    e
                );
            }
        }
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn item_count(&self) -> usize {
        self.groups.iter().map(|g| g.candidates.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Rank every group and aggregate metrics for each k.
    ///
    /// Never fails: with no groups, recall and MRR are 0 and manual effort is k.
    pub fn finalize(&self, k_values: &KValues) -> Evaluation {
        let n = self.groups.len();
        let mut rank_table = Vec::with_capacity(self.item_count());
        let mut groups = Vec::with_capacity(n);
        let mut recalls: Vec<Vec<f64>> = vec![Vec::with_capacity(n); k_values.len()];
        let mut efforts: Vec<Vec<f64>> = vec![Vec::with_capacity(n); k_values.len()];
        let mut reciprocal_ranks = Vec::with_capacity(n);

        for group in &self.groups {
            let ranked = rank_group(group);
            let positive_ranks: Vec<usize> = ranked
                .iter()
                .filter(|item| item.label.is_positive())
                .map(|item| item.rank)
                .collect();

            for (i, k) in k_values.iter().enumerate() {
                recalls[i].push(recall_at_k(&positive_ranks, k));
                efforts[i].push(manual_effort_at_k(&positive_ranks, k) as f64);
            }

            let rr = mean_reciprocal_rank(&positive_ranks);
            reciprocal_ranks.push(rr);

            log::debug!(
                "Ranked group {} ({} candidates, positives at {:?})",
                group.key,
                ranked.len(),
                positive_ranks
            );

            groups.push(GroupSummary {
                group_key: group.key.clone(),
                candidates: ranked.len(),
                positive_ranks,
                reciprocal_rank: rr,
            });
            rank_table.extend(ranked);
        }

        let per_k = k_values
            .iter()
            .enumerate()
            .map(|(i, k)| KMetrics {
                k,
                recall: mean(&recalls[i]).unwrap_or(0.0),
                manual_effort: mean(&efforts[i]).unwrap_or(k as f64),
            })
            .collect();

        Evaluation {
            metrics: AggregateMetrics {
                per_k,
                mrr: mean(&reciprocal_ranks).unwrap_or(0.0),
                group_count: n,
            },
            rank_table,
            groups,
        }
    }
}

impl Evaluation {
    /// Pretty-printed JSON report of metrics, rank table, and group summaries.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Sort a group by descending score (stable, so ties keep insertion order)
/// and assign 1-indexed ranks.
fn rank_group(group: &Group) -> Vec<RankedItem> {
    let mut sorted = group.candidates.clone();
    sorted.sort_by(|a, b| descending_score(a.0, b.0));
    sorted
        .into_iter()
        .enumerate()
        .map(|(i, (score, label))| RankedItem {
            group_key: group.key.clone(),
            score,
            label,
            rank: i + 1,
        })
        .collect()
}
