//! Staged case analysis.
//!
//! A run calls the five analysis stages strictly in order, decodes each
//! payload, and folds the results into a [`CaseWorkspace`]. A payload that
//! cannot be decoded is absorbed at the stage boundary. A transport failure
//! aborts the run and keeps whatever earlier stages produced.

mod runner;
mod workspace;


pub use runner::{CasePipeline, SharedWorkspace};
pub use workspace::{ActiveView, CaseWorkspace, Notice, Panel, RunPhase, StageOutput};

use serde::{Deserialize, Serialize};

/// One remote analysis stage, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Classify,
    Risk,
    Strength,
    Precedents,
    Timeline,
}

impl Stage {
    /// All stages in execution order.
    pub const ALL: [Stage; 5] = [
        Stage::Classify,
        Stage::Risk,
        Stage::Strength,
        Stage::Precedents,
        Stage::Timeline,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Classify => "classify",
            Stage::Risk => "risk",
            Stage::Strength => "strength",
            Stage::Precedents => "precedents",
            Stage::Timeline => "timeline",
        }
    }

    /// Progress reached once this stage completes. Precedents share the
    /// strength checkpoint.
    pub fn checkpoint(&self) -> u8 {
        match self {
            Stage::Classify => 60,
            Stage::Risk => 80,
            Stage::Strength | Stage::Precedents => 90,
            Stage::Timeline => 100,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Progress once an upload starts.
pub const PROGRESS_UPLOAD_STARTED: u8 = 20;
/// Progress once the document text is available.
pub const PROGRESS_TEXT_ACCEPTED: u8 = 40;
