//! Document-gated status reconciliation.
//!
//! Everything here is a pure function of its inputs. Callers run [`reconcile`] on every save so
//! the persisted status always agrees with the documents actually on file, and may call
//! [`advance_on_upload`] right after an attachment to promote eagerly.

use serde::{Deserialize, Serialize};

use super::documents::{
    AlternativeGroup, DocumentSet, DocumentSlot, RequirementClass, ReviewRound,
};
use super::status::ApplicationStatus;

/// Mandatory first-round documents plus at least one ownership proof.
pub fn is_first_round_complete(documents: &DocumentSet) -> bool {
    missing_for_round(documents, ReviewRound::First).is_empty()
}

pub fn is_second_round_complete(documents: &DocumentSet) -> bool {
    missing_for_round(documents, ReviewRound::Second).is_empty()
}

/// Requirement that still blocks a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MissingRequirement {
    Slot { slot: DocumentSlot },
    AnyOf { group: AlternativeGroup },
}

impl MissingRequirement {
    pub fn describe(&self) -> String {
        match self {
            MissingRequirement::Slot { slot } => slot.label().to_string(),
            MissingRequirement::AnyOf { group } => format!("one of: {}", group.label()),
        }
    }
}

/// Unfilled mandatory slots and unsatisfied alternative groups, in catalog order.
pub fn missing_for_round(documents: &DocumentSet, round: ReviewRound) -> Vec<MissingRequirement> {
    let mut missing = Vec::new();
    let mut groups: Vec<(AlternativeGroup, bool)> = Vec::new();

    for slot in DocumentSlot::for_round(round) {
        match slot.requirement() {
            RequirementClass::Mandatory => {
                if !documents.is_filled(slot) {
                    missing.push(MissingRequirement::Slot { slot });
                }
            }
            RequirementClass::Alternative(group) => {
                let filled = documents.is_filled(slot);
                match groups.iter_mut().find(|(known, _)| *known == group) {
                    Some((_, satisfied)) => *satisfied |= filled,
                    None => groups.push((group, filled)),
                }
            }
            RequirementClass::Optional => {}
        }
    }

    missing.extend(
        groups
            .into_iter()
            .filter(|(_, satisfied)| !satisfied)
            .map(|(group, _)| MissingRequirement::AnyOf { group }),
    );
    missing
}

/// Outstanding requirements for both rounds, shown next to an application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentChecklist {
    pub first_round: Vec<MissingRequirement>,
    pub second_round: Vec<MissingRequirement>,
}

impl DocumentChecklist {
    pub fn for_documents(documents: &DocumentSet) -> Self {
        Self {
            first_round: missing_for_round(documents, ReviewRound::First),
            second_round: missing_for_round(documents, ReviewRound::Second),
        }
    }
}

/// Direction a reconciliation moved the proposed status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusTransition {
    Promoted,
    Demoted,
    Unchanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reconciliation {
    pub proposed: ApplicationStatus,
    pub status: ApplicationStatus,
    pub transition: StatusTransition,
}

/// Status consistent with the documents on file. Idempotent.
pub fn reconcile_status(current: ApplicationStatus, documents: &DocumentSet) -> ApplicationStatus {
    match current {
        ApplicationStatus::FirstDocsComplete if !is_first_round_complete(documents) => {
            ApplicationStatus::FirstApprovalDocsRequired
        }
        ApplicationStatus::FirstApprovalDocsRequired | ApplicationStatus::CreditConsentDone
            if is_first_round_complete(documents) =>
        {
            ApplicationStatus::FirstDocsComplete
        }
        ApplicationStatus::FinalDocsComplete if !is_second_round_complete(documents) => {
            ApplicationStatus::FinalApprovalContractRequired
        }
        ApplicationStatus::FinalApprovalContractRequired if is_second_round_complete(documents) => {
            ApplicationStatus::FinalDocsComplete
        }
        other => other,
    }
}

pub fn reconcile(proposed: ApplicationStatus, documents: &DocumentSet) -> Reconciliation {
    let status = reconcile_status(proposed, documents);
    let transition = match (proposed, status) {
        (before, after) if before == after => StatusTransition::Unchanged,
        (_, ApplicationStatus::FirstDocsComplete | ApplicationStatus::FinalDocsComplete) => {
            StatusTransition::Promoted
        }
        _ => StatusTransition::Demoted,
    };

    Reconciliation {
        proposed,
        status,
        transition,
    }
}

/// Eager promotion after an upload. Only the two "documents required" stages (and credit
/// consent, which precedes the first one) advance here; every other stage returns `None`.
pub fn advance_on_upload(
    current: ApplicationStatus,
    documents: &DocumentSet,
) -> Option<ApplicationStatus> {
    match current {
        ApplicationStatus::FirstApprovalDocsRequired
        | ApplicationStatus::CreditConsentDone
        | ApplicationStatus::FinalApprovalContractRequired => {
            let next = reconcile_status(current, documents);
            (next != current).then_some(next)
        }
        _ => None,
    }
}
