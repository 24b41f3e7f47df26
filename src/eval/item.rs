//! Scored and ranked items flowing through the evaluation engine.

use crate::error::{PatchrankError, Result};
use serde::Serialize;
use std::fmt;

/// Binary relevance label of a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "u8")]
pub enum Label {
    Negative,
    Positive,
}

impl Label {
    pub fn is_positive(self) -> bool {
        matches!(self, Label::Positive)
    }

    pub fn as_u8(self) -> u8 {
        match self {
            Label::Negative => 0,
            Label::Positive => 1,
        }
    }
}

impl TryFrom<i64> for Label {
    type Error = PatchrankError;

    fn try_from(value: i64) -> Result<Self> {
        match value {
            0 => Ok(Label::Negative),
            1 => Ok(Label::Positive),
            other => Err(PatchrankError::InvalidLabel(other)),
        }
    }
}

impl From<Label> for u8 {
    fn from(label: Label) -> Self {
        label.as_u8()
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// One model score for a (group, candidate) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredItem {
    /// Query identifier, e.g. a CVE id.
    pub group_key: String,
    pub score: f64,
    pub label: Label,
}

impl ScoredItem {
    /// Build an item from a raw integer label, rejecting anything but 0 or 1.
    pub fn new(group_key: impl Into<String>, score: f64, label: i64) -> Result<Self> {
        Ok(Self {
            group_key: group_key.into(),
            score,
            label: Label::try_from(label)?,
        })
    }
}

/// A scored item after ranking within its group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedItem {
    pub group_key: String,
    pub score: f64,
    pub label: Label,
    /// 1-indexed position within the group, best score first.
    pub rank: usize,
}
