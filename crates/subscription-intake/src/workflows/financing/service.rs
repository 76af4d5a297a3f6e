use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use serde::Serialize;
use tracing::{info, warn};

use super::documents::{DocumentSlot, UploadedDocument};
use super::domain::{
    Application, ApplicationFilter, ApplicationId, CustomerDetails, LeadSubmission, StatusEdit,
};
use super::engine::{self, DocumentChecklist, Reconciliation, StatusTransition};
use super::repository::{ApplicationRepository, RepositoryError, StatusUpdatePayload};
use super::status::{ApplicationStatus, StageGroup};

/// Prefix of ids generated for partner leads. Ids imported from the sheet never carry it.
const GENERATED_ID_PREFIX: &str = "app-";

/// Result of an explicit save from the edit form.
#[derive(Debug, Clone, Serialize)]
pub struct SaveOutcome {
    pub application: Application,
    pub reconciliation: Reconciliation,
}

impl SaveOutcome {
    pub fn transition(&self) -> StatusTransition {
        self.reconciliation.transition
    }
}

/// Application as returned to clients, with the documents each round still needs.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationView {
    #[serde(flatten)]
    pub application: Application,
    pub checklist: DocumentChecklist,
}

impl From<Application> for ApplicationView {
    fn from(application: Application) -> Self {
        let checklist = DocumentChecklist::for_documents(&application.documents);
        Self {
            application,
            checklist,
        }
    }
}

/// Result of attaching a document.
#[derive(Debug, Clone, Serialize)]
pub struct UploadOutcome {
    pub application: Application,
    /// Set when the upload completed a round and the status was advanced and persisted.
    pub auto_advanced: Option<ApplicationStatus>,
}

/// Totals shown on the settlement screens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SettlementSummary {
    pub pending_count: usize,
    pub pending_amount: u64,
    pub settled_count: usize,
    pub settled_amount: u64,
}

impl SettlementSummary {
    pub fn from_applications<'a>(applications: impl IntoIterator<Item = &'a Application>) -> Self {
        applications
            .into_iter()
            .fold(Self::default(), |mut summary, application| {
                match application.status {
                    ApplicationStatus::RecordingDoneSettlementPending => {
                        summary.pending_count += 1;
                        summary.pending_amount = summary
                            .pending_amount
                            .saturating_add(application.customer.amount);
                    }
                    ApplicationStatus::SettlementComplete => {
                        summary.settled_count += 1;
                        summary.settled_amount = summary
                            .settled_amount
                            .saturating_add(application.customer.amount);
                    }
                    _ => {}
                }
                summary
            })
    }
}

/// Stage counts for the dashboard and admin overview. Every status and group is present, even
/// when its count is zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineSummary {
    pub total: usize,
    pub total_amount: u64,
    pub by_group: BTreeMap<StageGroup, usize>,
    pub by_status: BTreeMap<ApplicationStatus, usize>,
}

impl PipelineSummary {
    pub fn from_applications<'a>(applications: impl IntoIterator<Item = &'a Application>) -> Self {
        let mut summary = Self {
            total: 0,
            total_amount: 0,
            by_group: StageGroup::ALL.into_iter().map(|group| (group, 0)).collect(),
            by_status: ApplicationStatus::ALL
                .into_iter()
                .map(|status| (status, 0))
                .collect(),
        };

        for application in applications {
            summary.total += 1;
            summary.total_amount = summary
                .total_amount
                .saturating_add(application.customer.amount);
            *summary
                .by_group
                .entry(application.status.stage_group())
                .or_default() += 1;
            *summary.by_status.entry(application.status).or_default() += 1;
        }
        summary
    }
}

/// Calling layer around the status engine: every mutation goes through the repository and every
/// save re-derives the status from the documents on file.
pub struct ApplicationService<R> {
    repository: Arc<R>,
    sequence: AtomicU64,
}

impl<R> ApplicationService<R>
where
    R: ApplicationRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            sequence: AtomicU64::new(1),
        }
    }

    fn next_application_id(&self) -> ApplicationId {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed);
        ApplicationId(format!("{GENERATED_ID_PREFIX}{id:06}"))
    }

    /// Continue lead numbering after the highest generated id already stored. Returns that
    /// highest sequence number, or 0 when none exists.
    pub fn resume_sequence(&self) -> Result<u64, ApplicationServiceError> {
        let highest = self
            .repository
            .list()?
            .iter()
            .filter_map(|application| generated_sequence(&application.id))
            .max()
            .unwrap_or(0);
        self.sequence
            .fetch_max(highest.saturating_add(1), Ordering::Relaxed);
        Ok(highest)
    }

    /// Register a partner's lead in [`ApplicationStatus::Received`].
    pub fn submit(&self, lead: LeadSubmission) -> Result<Application, ApplicationServiceError> {
        self.submit_on(lead, Local::now().date_naive())
    }

    pub fn submit_on(
        &self,
        lead: LeadSubmission,
        received_on: NaiveDate,
    ) -> Result<Application, ApplicationServiceError> {
        validate_lead(&lead)?;
        let application = Application::received(self.next_application_id(), lead, received_on);
        let stored = self.repository.insert(application)?;
        info!(id = %stored.id.0, partner = %stored.partner.id.0, "lead received");
        Ok(stored)
    }

    pub fn get(&self, id: &ApplicationId) -> Result<Application, ApplicationServiceError> {
        let application = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(application)
    }

    /// Matching applications, newest first.
    pub fn list(
        &self,
        filter: &ApplicationFilter,
    ) -> Result<Vec<Application>, ApplicationServiceError> {
        let mut applications: Vec<_> = self
            .repository
            .list()?
            .into_iter()
            .filter(|application| filter.matches(application))
            .collect();
        sort_newest_first(&mut applications);
        Ok(applications)
    }

    /// Persist a reviewer's edit after reconciling the proposed status with the documents.
    /// Corrected customer details, when present, replace the stored ones.
    ///
    /// On failure nothing is retried and the stored record is left as it was.
    pub fn save(
        &self,
        id: &ApplicationId,
        edit: StatusEdit,
    ) -> Result<SaveOutcome, ApplicationServiceError> {
        if let Some(customer) = &edit.customer {
            validate_customer(customer).map_err(ApplicationServiceError::CustomerRejected)?;
        }

        let mut application = self.get(id)?;
        let reconciliation = engine::reconcile(edit.status, &application.documents);

        application.status = reconciliation.status;
        application.remarks = edit.remarks;
        if let Some(customer) = edit.customer {
            application.customer = customer;
        }
        self.persist(&application)?;

        match reconciliation.transition {
            StatusTransition::Unchanged => {
                info!(id = %id.0, status = %application.status, "application saved")
            }
            StatusTransition::Promoted => info!(
                id = %id.0,
                proposed = %reconciliation.proposed,
                status = %application.status,
                "documents complete, status promoted"
            ),
            StatusTransition::Demoted => warn!(
                id = %id.0,
                proposed = %reconciliation.proposed,
                status = %application.status,
                "documents missing, status demoted"
            ),
        }

        Ok(SaveOutcome {
            application,
            reconciliation,
        })
    }

    /// Attach an upload and, when it completes the current round, advance and persist at once.
    ///
    /// If persisting fails the error is returned; the caller decides whether to retry.
    pub fn attach_document(
        &self,
        id: &ApplicationId,
        slot: DocumentSlot,
        document: UploadedDocument,
    ) -> Result<UploadOutcome, ApplicationServiceError> {
        let mut application = self.get(id)?;
        application.documents.attach(slot, document);

        let auto_advanced = engine::advance_on_upload(application.status, &application.documents);
        if let Some(next) = auto_advanced {
            application.status = next;
        }

        self.persist(&application)?;

        if let Some(next) = auto_advanced {
            info!(id = %id.0, %slot, status = %next, "upload completed round, status advanced");
        }

        Ok(UploadOutcome {
            application,
            auto_advanced,
        })
    }

    /// Remove an upload. The status follows on the next save.
    pub fn detach_document(
        &self,
        id: &ApplicationId,
        slot: DocumentSlot,
    ) -> Result<Application, ApplicationServiceError> {
        let mut application = self.get(id)?;
        if application.documents.detach(slot).is_some() {
            self.persist(&application)?;
        }
        Ok(application)
    }

    /// Applications awaiting or past settlement, newest first.
    pub fn settlement_queue(&self) -> Result<Vec<Application>, ApplicationServiceError> {
        let mut queue: Vec<_> = self
            .repository
            .list()?
            .into_iter()
            .filter(|application| application.status.is_settlement_stage())
            .collect();
        sort_newest_first(&mut queue);
        Ok(queue)
    }

    pub fn settlement_summary(&self) -> Result<SettlementSummary, ApplicationServiceError> {
        let applications = self.repository.list()?;
        Ok(SettlementSummary::from_applications(&applications))
    }

    /// Per-stage counts over the applications matching `filter`.
    pub fn pipeline_summary(
        &self,
        filter: &ApplicationFilter,
    ) -> Result<PipelineSummary, ApplicationServiceError> {
        let applications = self.list(filter)?;
        Ok(PipelineSummary::from_applications(&applications))
    }

    /// Mark a recorded contract as paid out.
    pub fn settle(&self, id: &ApplicationId) -> Result<Application, ApplicationServiceError> {
        let mut application = self.get(id)?;
        if application.status != ApplicationStatus::RecordingDoneSettlementPending {
            return Err(ApplicationServiceError::NotSettleable {
                status: application.status,
            });
        }

        application.status = ApplicationStatus::SettlementComplete;
        self.persist(&application)?;
        info!(id = %id.0, amount = application.customer.amount, "settlement completed");
        Ok(application)
    }

    pub fn remove(&self, id: &ApplicationId) -> Result<(), ApplicationServiceError> {
        self.repository.remove(id)?;
        info!(id = %id.0, "application removed");
        Ok(())
    }

    fn persist(&self, application: &Application) -> Result<(), ApplicationServiceError> {
        self.repository
            .update(StatusUpdatePayload::from(application))
            .map_err(|err| {
                warn!(id = %application.id.0, error = %err, "failed to persist application");
                ApplicationServiceError::from(err)
            })
    }
}

fn validate_lead(lead: &LeadSubmission) -> Result<(), ApplicationServiceError> {
    validate_customer(&lead.customer).map_err(ApplicationServiceError::LeadRejected)?;
    if lead.partner.id.0.trim().is_empty() {
        return Err(ApplicationServiceError::LeadRejected(
            "partner id is required".to_string(),
        ));
    }
    Ok(())
}

fn validate_customer(customer: &CustomerDetails) -> Result<(), String> {
    let reason = if customer.name.trim().is_empty() {
        Some("customer name is required")
    } else if customer.phone.chars().filter(char::is_ascii_digit).count() == 0 {
        Some("customer phone number is required")
    } else if customer.amount == 0 {
        Some("quoted amount must be greater than zero")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(reason.to_string()),
        None => Ok(()),
    }
}

fn generated_sequence(id: &ApplicationId) -> Option<u64> {
    id.0.strip_prefix(GENERATED_ID_PREFIX)?.parse().ok()
}

/// Undated rows sort after every dated one.
fn sort_newest_first(applications: &mut [Application]) {
    applications.sort_by(|a, b| {
        b.received_on
            .cmp(&a.received_on)
            .then_with(|| b.id.cmp(&a.id))
    });
}

/// Error raised by the application service.
#[derive(Debug, thiserror::Error)]
pub enum ApplicationServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("lead rejected: {0}")]
    LeadRejected(String),
    #[error("customer details rejected: {0}")]
    CustomerRejected(String),
    #[error("application in status '{status}' cannot be settled")]
    NotSettleable { status: ApplicationStatus },
}
