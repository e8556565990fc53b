//! Fit reports - Per-stage training curves of one `fit()` call.

use crate::Result;
use serde::{Deserialize, Serialize};

/// Which kind of stage produced a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageKind {
    Bottleneck,
    Classifier,
    FineTune,
}

/// Training record of one stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageReport {
    pub index: usize,
    pub kind: StageKind,
    pub in_width: usize,
    pub out_width: usize,
    /// Mean per-sample error of every epoch
    pub epoch_errors: Vec<f64>,
}

impl StageReport {
    /// Error of the last epoch, if any epoch ran.
    pub fn final_error(&self) -> Option<f64> {
        self.epoch_errors.last().copied()
    }
}

/// Training record of a whole pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitReport {
    pub strategy: String,
    pub stages: Vec<StageReport>,
}

impl FitReport {
    pub fn new(strategy: &str) -> Self {
        Self {
            strategy: strategy.to_string(),
            stages: Vec::new(),
        }
    }

    pub fn push(&mut self, stage: StageReport) {
        self.stages.push(stage);
    }

    /// Reports of one stage kind, in stage order.
    pub fn stages_of(&self, kind: StageKind) -> impl Iterator<Item = &StageReport> + '_ {
        self.stages.iter().filter(move |s| s.kind == kind)
    }

    /// Export report to JSON string
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Import report from JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
