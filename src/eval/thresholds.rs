//! Cutoff thresholds (the k in recall@k and manual effort@k).

use crate::error::{PatchrankError, Result};

/// Evaluation grid used when nothing else is configured.
pub const DEFAULT_K_VALUES: &[usize] = &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 20, 30, 50, 100];

/// Non-empty, duplicate-free list of positive cutoffs, in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KValues(Vec<usize>);

impl KValues {
    pub fn new(values: Vec<usize>) -> Result<Self> {
        if values.is_empty() {
            return Err(PatchrankError::InvalidInput(
                "at least one k value is required".to_string(),
            ));
        }
        if values.contains(&0) {
            return Err(PatchrankError::InvalidInput(
                "k values must be >= 1".to_string(),
            ));
        }
        let mut unique = Vec::with_capacity(values.len());
        for k in values {
            if !unique.contains(&k) {
                unique.push(k);
            }
        }
        Ok(Self(unique))
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for KValues {
    fn default() -> Self {
        Self(DEFAULT_K_VALUES.to_vec())
    }
}
