//! Subscription-financing application intake, document gating, and settlement.
//!
//! The status engine in [`engine`] is pure; [`service`] is the single calling layer that loads an
//! application, reconciles its status against the documents on file, and persists it through an
//! [`ApplicationRepository`].

pub mod calculator;
pub mod documents;
pub mod domain;
pub mod engine;
pub mod repository;
pub mod roster;
pub mod router;
pub mod service;
pub mod status;

#[cfg(test)]
mod tests;

pub use documents::{
    AlternativeGroup, DocumentSet, DocumentSlot, DocumentsDecodeError, RequirementClass,
    ReviewRound, UploadedDocument,
};
pub use domain::{
    Application, ApplicationFilter, ApplicationId, CustomerDetails, LeadSubmission, PartnerId,
    PartnerRef, StatusEdit,
};
pub use calculator::{monthly_payment, QuoteError, QuoteRequest, SubscriptionQuote};
pub use engine::{
    advance_on_upload, is_first_round_complete, is_second_round_complete, missing_for_round,
    reconcile, reconcile_status, DocumentChecklist, MissingRequirement, Reconciliation,
    StatusTransition,
};
pub use repository::{ApplicationRepository, RepositoryError, StatusUpdatePayload};
pub use roster::{reconcile_roster, RosterImportError, RosterImporter, RosterReconciliation};
pub use router::application_router;
pub use service::{
    ApplicationService, ApplicationServiceError, ApplicationView, PipelineSummary, SaveOutcome,
    SettlementSummary, UploadOutcome,
};
pub use status::{ApplicationStatus, StageGroup};
