use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::workspace::{CaseWorkspace, Notice, StageOutput};
use super::Stage;
use crate::api::{
    AnalysisService, AnalyzeCaseRequest, PrecedentRequest, RiskRequest, StrengthRequest,
    TimelineRequest,
};
use crate::case::{AnalysisRecord, CaseSnapshot, TEXT_PREVIEW_CHARS};
use crate::config::{DashboardConfig, RequestConfig};
use crate::decode::{decode, decode_as, decode_list, Decoded};
use crate::error::{PipelineError, ServiceError, ServiceResult};
use crate::history::HistoryCache;

/// Workspace shared between the pipeline and whoever renders it. The lock
/// is never held across a remote call.
pub type SharedWorkspace = Arc<Mutex<CaseWorkspace>>;

/// Runs the five analysis stages for one document.
#[derive(Clone)]
pub struct CasePipeline {
    service: Arc<dyn AnalysisService>,
    history: HistoryCache,
    request: RequestConfig,
    dashboard: DashboardConfig,
}

impl CasePipeline {
    pub fn new(
        service: Arc<dyn AnalysisService>,
        history: HistoryCache,
        request: RequestConfig,
        dashboard: DashboardConfig,
    ) -> Self {
        Self {
            service,
            history,
            request,
            dashboard,
        }
    }

    /// Analyze `text` as case `name`.
    ///
    /// On success the snapshot is added to history and returned. A history
    /// write failure leaves a storage notice but does not fail the run. A
    /// transport failure aborts the run at that stage. Either way progress
    /// returns to 0 after the configured delay unless another run started.
    pub async fn run(
        &self,
        workspace: &SharedWorkspace,
        name: &str,
        text: &str,
    ) -> Result<CaseSnapshot, PipelineError> {
        let run_id = Uuid::new_v4();
        let start = Instant::now();

        let generation = {
            let mut ws = workspace.lock().await;
            let generation = ws.begin_upload(name);
            ws.accept_text(text);
            generation
        };

        info!(run_id = %run_id, case = %name, chars = text.chars().count(), "Analysis run started");

        let outcome = self.run_stages(workspace, text, run_id).await;
        let result = match outcome {
            Ok(()) => {
                let snapshot = {
                    let mut ws = workspace.lock().await;
                    ws.finish();
                    CaseSnapshot::capture(&ws)
                };

                if let Err(e) = self.history.append(snapshot.clone()).await {
                    warn!(run_id = %run_id, error = %e, "Failed to save snapshot to history");
                    workspace.lock().await.set_notice(Notice::StorageUnavailable {
                        message: e.to_string(),
                    });
                }

                info!(
                    run_id = %run_id,
                    snapshot_id = %snapshot.id,
                    latency_ms = start.elapsed().as_millis(),
                    "Analysis run completed"
                );
                Ok(snapshot)
            }
            Err(e) => {
                error!(
                    run_id = %run_id,
                    stage = %e.stage,
                    error = %e.source,
                    latency_ms = start.elapsed().as_millis(),
                    "Analysis run aborted"
                );
                workspace.lock().await.fail_stage(&e);
                Err(e)
            }
        };

        self.schedule_progress_reset(workspace.clone(), generation);
        result
    }

    async fn run_stages(
        &self,
        workspace: &SharedWorkspace,
        text: &str,
        run_id: Uuid,
    ) -> Result<(), PipelineError> {
        // Stage 1
        let raw = self
            .call(
                Stage::Classify,
                run_id,
                self.service.analyze_case(&AnalyzeCaseRequest::new(text)),
            )
            .await?;
        let decoded = decode(&raw);
        let analysis: Decoded<AnalysisRecord> = match &decoded {
            Decoded::Ok(value) => decode_as(value),
            Decoded::Failed => Decoded::Failed,
        };
        let case_context = match (&decoded, &analysis) {
            (Decoded::Ok(value), Decoded::Ok(_)) => value.clone(),
            _ => json!({}),
        };
        let record = analysis.as_ok().cloned();
        self.complete(workspace, StageOutput::Classify(analysis), run_id)
            .await;

        // Stage 2
        let request = RiskRequest {
            case_details: case_context.clone(),
            evidence: workspace.lock().await.evidence().payload(),
        };
        let raw = self
            .call(Stage::Risk, run_id, self.service.calculate_risk(&request))
            .await?;
        self.complete(workspace, StageOutput::Risk(decode_as(&raw)), run_id)
            .await;

        // Stage 3
        let request = StrengthRequest {
            case_info: case_context,
            evidence: workspace.lock().await.evidence().payload(),
        };
        let raw = self
            .call(Stage::Strength, run_id, self.service.case_strength(&request))
            .await?;
        self.complete(workspace, StageOutput::Strength(decode_as(&raw)), run_id)
            .await;

        // Stage 4 needs a usable classification
        match &record {
            Some(record) => {
                let request = precedent_request(record, text);
                let raw = self
                    .call(
                        Stage::Precedents,
                        run_id,
                        self.service.find_precedents(&request),
                    )
                    .await?;
                self.complete(
                    workspace,
                    StageOutput::Precedents(decode_list(&raw)),
                    run_id,
                )
                .await;
            }
            None => {
                info!(run_id = %run_id, "Skipping precedents: no usable classification");
            }
        }

        // Stage 5
        let request = timeline_request(record.as_ref());
        let raw = self
            .call(
                Stage::Timeline,
                run_id,
                self.service.generate_timeline(&request),
            )
            .await?;
        self.complete(workspace, StageOutput::Timeline(decode_list(&raw)), run_id)
            .await;

        Ok(())
    }

    /// One attempt at a stage call, bounded by the request timeout.
    async fn call<F>(&self, stage: Stage, run_id: Uuid, call: F) -> Result<Value, PipelineError>
    where
        F: Future<Output = ServiceResult<Value>>,
    {
        debug!(run_id = %run_id, stage = %stage, "Stage started");
        let start = Instant::now();

        let result = match tokio::time::timeout(self.request.timeout(), call).await {
            Ok(result) => result,
            Err(_) => Err(ServiceError::Timeout {
                timeout_ms: self.request.timeout_ms,
            }),
        };

        match result {
            Ok(raw) => {
                debug!(
                    run_id = %run_id,
                    stage = %stage,
                    latency_ms = start.elapsed().as_millis(),
                    "Stage responded"
                );
                Ok(raw)
            }
            Err(source) => Err(PipelineError { stage, source }),
        }
    }

    async fn complete(&self, workspace: &SharedWorkspace, output: StageOutput, run_id: Uuid) {
        let stage = output.stage();
        let decoded = match &output {
            StageOutput::Classify(d) => d.is_ok(),
            StageOutput::Risk(d) => d.is_ok(),
            StageOutput::Strength(d) => d.is_ok(),
            StageOutput::Precedents(items) => !items.is_empty(),
            StageOutput::Timeline(items) => !items.is_empty(),
        };
        if !decoded {
            warn!(run_id = %run_id, stage = %stage, "Stage payload unusable, continuing");
        }

        let progress = {
            let mut ws = workspace.lock().await;
            ws.complete_stage(output);
            ws.progress()
        };
        info!(run_id = %run_id, stage = %stage, progress, "Stage completed");
    }

    fn schedule_progress_reset(&self, workspace: SharedWorkspace, generation: u64) {
        let delay = self.dashboard.progress_reset_delay();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if workspace.lock().await.reset_progress(generation) {
                debug!(generation, "Progress reset");
            }
        });
    }
}

/// Precedent search input: the key facts if there are any, otherwise the
/// start of the document.
fn precedent_request(record: &AnalysisRecord, text: &str) -> PrecedentRequest {
    let case_description = if record.key_facts.is_empty() {
        text.chars().take(TEXT_PREVIEW_CHARS).collect()
    } else {
        record.key_facts.join(" ")
    };

    PrecedentRequest {
        case_description,
        case_type: non_empty(record.case_type.as_deref())
            .unwrap_or(PrecedentRequest::DEFAULT_CASE_TYPE)
            .to_string(),
    }
}

fn timeline_request(record: Option<&AnalysisRecord>) -> TimelineRequest {
    let case_type = record.and_then(|r| non_empty(r.case_type.as_deref()));
    let jurisdiction = record.and_then(|r| non_empty(r.jurisdiction.as_deref()));

    TimelineRequest {
        case_type: case_type
            .unwrap_or(TimelineRequest::DEFAULT_CASE_TYPE)
            .to_string(),
        jurisdiction: jurisdiction
            .unwrap_or(TimelineRequest::DEFAULT_JURISDICTION)
            .to_string(),
        filing_date: Utc::now().date_naive().format("%Y-%m-%d").to_string(),
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
