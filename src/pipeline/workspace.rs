use std::collections::HashSet;

use chrono::Utc;
use tracing::debug;

use super::{Stage, PROGRESS_TEXT_ACCEPTED, PROGRESS_UPLOAD_STARTED};
use crate::case::{
    text_preview, AnalysisRecord, BookmarkEntry, CaseSnapshot, Precedent, RiskAssessment,
    SnapshotId, StrengthAssessment, TimelineMilestone,
};
use crate::decode::Decoded;
use crate::error::{PipelineError, ViewError};
use crate::evidence::EvidenceManager;

/// Lifecycle of the current analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunPhase {
    #[default]
    Idle,
    Running,
    Completed,
    Aborted,
}

/// Dashboard tab being shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ActiveView {
    #[default]
    Upload,
    Overview,
    Risk,
    Strength,
    Precedents,
    Timeline,
    Evidence,
}

impl ActiveView {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActiveView::Upload => "upload",
            ActiveView::Overview => "overview",
            ActiveView::Risk => "risk",
            ActiveView::Strength => "strength",
            ActiveView::Precedents => "precedents",
            ActiveView::Timeline => "timeline",
            ActiveView::Evidence => "evidence",
        }
    }
}

/// Collapsible sections of the overview and strength views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Panel {
    Sections,
    Parties,
    KeyFacts,
    LegalIssues,
    Strengths,
    Weaknesses,
    MissingEvidence,
    Recommendations,
}

/// The single user-facing message about the last thing that went wrong.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    AnalysisFailed { stage: Stage, message: String },
    StorageUnavailable { message: String },
    EvidenceRejected { filename: String },
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Notice::AnalysisFailed { stage, .. } => write!(
                f,
                "Error analyzing case at the {} stage. Make sure the analysis service is running.",
                stage
            ),
            Notice::StorageUnavailable { .. } => {
                write!(f, "The analysis finished but could not be saved to history.")
            }
            Notice::EvidenceRejected { filename } => {
                write!(f, "Evidence '{}' could not be analyzed.", filename)
            }
        }
    }
}

/// A decoded stage result ready to be stored in the workspace.
#[derive(Debug, Clone, PartialEq)]
pub enum StageOutput {
    Classify(Decoded<AnalysisRecord>),
    Risk(Decoded<RiskAssessment>),
    Strength(Decoded<StrengthAssessment>),
    Precedents(Vec<Precedent>),
    Timeline(Vec<TimelineMilestone>),
}

impl StageOutput {
    pub fn stage(&self) -> Stage {
        match self {
            StageOutput::Classify(_) => Stage::Classify,
            StageOutput::Risk(_) => Stage::Risk,
            StageOutput::Strength(_) => Stage::Strength,
            StageOutput::Precedents(_) => Stage::Precedents,
            StageOutput::Timeline(_) => Stage::Timeline,
        }
    }
}

/// Everything the dashboard shows for the case being worked on.
///
/// All mutation goes through the named transitions below. `None` for a
/// stage output means the stage has not run in this workspace; `Some(Failed)`
/// means it ran and its payload could not be decoded.
#[derive(Debug, Clone, Default)]
pub struct CaseWorkspace {
    name: String,
    text: String,
    analysis: Option<Decoded<AnalysisRecord>>,
    risk: Option<Decoded<RiskAssessment>>,
    strength: Option<Decoded<StrengthAssessment>>,
    precedents: Vec<Precedent>,
    timeline: Vec<TimelineMilestone>,
    evidence: EvidenceManager,
    progress: u8,
    phase: RunPhase,
    generation: u64,
    active_view: ActiveView,
    expanded: HashSet<Panel>,
    notice: Option<Notice>,
}

impl CaseWorkspace {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- transitions ----

    /// Start a new run for `name`. Clears the previous run's outputs and
    /// notice and returns the run's generation number.
    pub fn begin_upload(&mut self, name: impl Into<String>) -> u64 {
        self.generation += 1;
        self.name = name.into();
        self.text.clear();
        self.analysis = None;
        self.risk = None;
        self.strength = None;
        self.precedents.clear();
        self.timeline.clear();
        self.notice = None;
        self.phase = RunPhase::Running;
        self.progress = PROGRESS_UPLOAD_STARTED;
        self.generation
    }

    /// Record the extracted document text.
    pub fn accept_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.advance(PROGRESS_TEXT_ACCEPTED);
    }

    /// Store one stage's decoded output and move progress to its checkpoint.
    pub fn complete_stage(&mut self, output: StageOutput) {
        let stage = output.stage();
        match output {
            StageOutput::Classify(analysis) => self.analysis = Some(analysis),
            StageOutput::Risk(risk) => self.risk = Some(risk),
            StageOutput::Strength(strength) => self.strength = Some(strength),
            StageOutput::Precedents(precedents) => self.precedents = precedents,
            StageOutput::Timeline(timeline) => self.timeline = timeline,
        }
        self.advance(stage.checkpoint());
    }

    /// Abort the run. Outputs from earlier stages stay in place.
    pub fn fail_stage(&mut self, error: &PipelineError) {
        self.phase = RunPhase::Aborted;
        self.notice = Some(Notice::AnalysisFailed {
            stage: error.stage,
            message: error.source.to_string(),
        });
    }

    /// Mark the run complete and switch to the overview.
    pub fn finish(&mut self) {
        self.phase = RunPhase::Completed;
        self.progress = Stage::Timeline.checkpoint();
        self.active_view = ActiveView::Overview;
    }

    /// Return progress to neutral if `generation` is still the latest run
    /// and that run has ended. Returns whether progress was reset.
    pub fn reset_progress(&mut self, generation: u64) -> bool {
        if generation != self.generation || self.phase == RunPhase::Running {
            return false;
        }
        self.progress = 0;
        true
    }

    /// Expand or collapse a panel. Returns whether it is now expanded.
    pub fn toggle_panel(&mut self, panel: Panel) -> bool {
        if self.expanded.remove(&panel) {
            false
        } else {
            self.expanded.insert(panel);
            true
        }
    }

    /// Switch views. A view with nothing to show is refused.
    pub fn select_view(&mut self, view: ActiveView) -> Result<(), ViewError> {
        if !self.is_available(view) {
            return Err(ViewError::Unavailable {
                view: view.as_str().to_string(),
            });
        }
        self.active_view = view;
        Ok(())
    }

    /// Replace the working state with a stored snapshot.
    pub fn restore(&mut self, snapshot: &CaseSnapshot) {
        self.generation += 1;
        self.name = snapshot.name.clone();
        self.text = snapshot.text_preview.clone();
        self.analysis = Some(snapshot.analysis.clone());
        self.risk = Some(snapshot.risk.clone());
        self.strength = Some(snapshot.strength.clone());
        self.precedents = snapshot.precedents.clone();
        self.timeline = snapshot.timeline.clone();
        self.phase = RunPhase::Completed;
        self.progress = 0;
        self.notice = None;
        self.active_view = ActiveView::Overview;
        debug!(snapshot_id = %snapshot.id, "Workspace restored from history");
    }

    pub fn set_notice(&mut self, notice: Notice) {
        self.notice = Some(notice);
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    pub fn evidence_mut(&mut self) -> &mut EvidenceManager {
        &mut self.evidence
    }

    fn advance(&mut self, checkpoint: u8) {
        self.progress = self.progress.max(checkpoint);
    }

    // ---- queries ----

    /// Whether `view` has anything to show.
    pub fn is_available(&self, view: ActiveView) -> bool {
        match view {
            ActiveView::Upload | ActiveView::Evidence => true,
            ActiveView::Overview => self.analysis.is_some(),
            ActiveView::Risk => self.risk.is_some(),
            ActiveView::Strength => self.strength.is_some(),
            ActiveView::Precedents => !self.precedents.is_empty(),
            ActiveView::Timeline => !self.timeline.is_empty(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn analysis(&self) -> Option<&Decoded<AnalysisRecord>> {
        self.analysis.as_ref()
    }

    pub fn risk(&self) -> Option<&Decoded<RiskAssessment>> {
        self.risk.as_ref()
    }

    pub fn strength(&self) -> Option<&Decoded<StrengthAssessment>> {
        self.strength.as_ref()
    }

    pub fn precedents(&self) -> &[Precedent] {
        &self.precedents
    }

    pub fn timeline(&self) -> &[TimelineMilestone] {
        &self.timeline
    }

    pub fn evidence(&self) -> &EvidenceManager {
        &self.evidence
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn active_view(&self) -> ActiveView {
        self.active_view
    }

    pub fn is_expanded(&self, panel: Panel) -> bool {
        self.expanded.contains(&panel)
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }
}

impl CaseSnapshot {
    /// Freeze the workspace into a new history entry.
    pub fn capture(workspace: &CaseWorkspace) -> Self {
        Self {
            id: SnapshotId::next(),
            name: workspace.name.clone(),
            timestamp: Utc::now(),
            analysis: workspace.analysis.clone().unwrap_or(Decoded::Failed),
            risk: workspace.risk.clone().unwrap_or(Decoded::Failed),
            strength: workspace.strength.clone().unwrap_or(Decoded::Failed),
            precedents: workspace.precedents.clone(),
            timeline: workspace.timeline.clone(),
            text_preview: text_preview(&workspace.text),
        }
    }
}

impl BookmarkEntry {
    /// Bookmark the current case. Precedents and timeline are not kept.
    pub fn capture(workspace: &CaseWorkspace) -> Self {
        Self {
            name: workspace.name.clone(),
            timestamp: Utc::now(),
            analysis: workspace.analysis.clone(),
            risk: workspace.risk.clone(),
            strength: workspace.strength.clone(),
        }
    }
}
