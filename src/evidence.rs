//! Evidence accumulated during a session.
//!
//! Evidence only grows. Every risk and strength request made after an
//! upload carries the whole list, so later uploads refine those stages.

use tracing::{info, warn};

use crate::api::{AnalysisService, EvidencePayload};
use crate::case::EvidenceItem;
use crate::error::{ServiceError, ServiceResult};

/// Append-only list of evidence items for the current session.
#[derive(Debug, Clone, Default)]
pub struct EvidenceManager {
    items: Vec<EvidenceItem>,
}

impl EvidenceManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item to the end of the list.
    pub fn append(&mut self, item: EvidenceItem) {
        self.items.push(item);
    }

    pub fn items(&self) -> &[EvidenceItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Wire form of the list for risk and strength requests.
    pub fn payload(&self) -> Vec<EvidencePayload> {
        self.items.iter().map(EvidencePayload::from).collect()
    }

    /// Send one file to the service and build the resulting item without
    /// appending it.
    ///
    /// An analysis that cannot be decoded is kept as a failure marker. A
    /// response with `success: false` is an error.
    pub async fn analyze(
        service: &dyn AnalysisService,
        filename: &str,
        content: Vec<u8>,
    ) -> ServiceResult<EvidenceItem> {
        let response = service.upload_evidence(filename, content).await?;

        if !response.success {
            warn!(filename = %filename, "Evidence upload rejected");
            return Err(ServiceError::UploadRejected {
                filename: filename.to_string(),
            });
        }

        let name = response.filename.unwrap_or_else(|| filename.to_string());
        let item = EvidenceItem::from_response(name, response.analysis);

        info!(
            filename = %item.filename,
            decoded = item.analysis.is_ok(),
            "Evidence analyzed"
        );

        Ok(item)
    }

    /// Upload a file and append the analyzed item.
    pub async fn upload(
        &mut self,
        service: &dyn AnalysisService,
        filename: &str,
        content: Vec<u8>,
    ) -> ServiceResult<&EvidenceItem> {
        let item = Self::analyze(service, filename, content).await?;
        self.items.push(item);
        Ok(&self.items[self.items.len() - 1])
    }
}
