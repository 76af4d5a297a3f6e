use super::common::*;
use crate::workflows::financing::documents::{DocumentSet, DocumentSlot};
use crate::workflows::financing::engine::{
    advance_on_upload, is_first_round_complete, is_second_round_complete, reconcile,
    reconcile_status, StatusTransition,
};
use crate::workflows::financing::status::ApplicationStatus;

#[test]
fn first_round_needs_mandatory_slots_and_an_ownership_proof() {
    assert!(!is_first_round_complete(&DocumentSet::new()));
    assert!(is_first_round_complete(&full_first_round()));
    assert!(!is_first_round_complete(&documents(&FIRST_ROUND_MANDATORY)));
}

#[test]
fn second_round_needs_construction_contract() {
    assert!(!is_second_round_complete(&DocumentSet::new()));
    assert!(is_second_round_complete(&documents(&[
        DocumentSlot::ConstructionContract
    ])));
}

#[test]
fn second_round_ignores_first_round_documents() {
    let mut docs = full_first_round();
    assert!(!is_second_round_complete(&docs));
    docs.attach(
        DocumentSlot::ConstructionContract,
        upload(DocumentSlot::ConstructionContract),
    );
    assert!(is_second_round_complete(&docs));
}

#[test]
fn demotes_first_docs_complete_without_ownership_proof() {
    let docs = documents(&FIRST_ROUND_MANDATORY);
    assert_eq!(
        reconcile_status(ApplicationStatus::FirstDocsComplete, &docs),
        ApplicationStatus::FirstApprovalDocsRequired
    );
}

#[test]
fn promotes_required_stages_once_first_round_is_complete() {
    let docs = full_first_round();
    assert_eq!(
        reconcile_status(ApplicationStatus::FirstApprovalDocsRequired, &docs),
        ApplicationStatus::FirstDocsComplete
    );
    assert_eq!(
        reconcile_status(ApplicationStatus::CreditConsentDone, &docs),
        ApplicationStatus::FirstDocsComplete
    );
}

#[test]
fn final_round_promotion_is_a_fixed_point() {
    let docs = documents(&[DocumentSlot::ConstructionContract]);
    let once = reconcile_status(ApplicationStatus::FinalApprovalContractRequired, &docs);
    assert_eq!(once, ApplicationStatus::FinalDocsComplete);
    assert_eq!(reconcile_status(once, &docs), once);
}

#[test]
fn reconcile_is_idempotent_for_every_status() {
    let samples = [
        DocumentSet::new(),
        documents(&FIRST_ROUND_MANDATORY),
        full_first_round(),
        documents(&[DocumentSlot::ConstructionContract]),
        documents(&DocumentSlot::ALL),
    ];

    for docs in &samples {
        for status in ApplicationStatus::ALL {
            let once = reconcile_status(status, docs);
            assert_eq!(reconcile_status(once, docs), once, "{status:?} not stable");
        }
    }
}

#[test]
fn ungated_statuses_pass_through() {
    let gated = [
        ApplicationStatus::CreditConsentDone,
        ApplicationStatus::FirstApprovalDocsRequired,
        ApplicationStatus::FirstDocsComplete,
        ApplicationStatus::FinalApprovalContractRequired,
        ApplicationStatus::FinalDocsComplete,
    ];
    let samples = [DocumentSet::new(), documents(&DocumentSlot::ALL)];

    for status in ApplicationStatus::ALL
        .into_iter()
        .filter(|status| !gated.contains(status))
    {
        for docs in &samples {
            assert_eq!(reconcile_status(status, docs), status);
        }
    }
    assert_eq!(
        reconcile_status(
            ApplicationStatus::SettlementComplete,
            &documents(&FIRST_ROUND_MANDATORY)
        ),
        ApplicationStatus::SettlementComplete
    );
}

#[test]
fn credit_consent_is_not_demoted_when_incomplete() {
    assert_eq!(
        reconcile_status(ApplicationStatus::CreditConsentDone, &DocumentSet::new()),
        ApplicationStatus::CreditConsentDone
    );
}

#[test]
fn uploads_advance_only_after_the_ownership_proof() {
    let mut status = ApplicationStatus::CreditConsentDone;
    let mut docs = DocumentSet::new();
    let sequence = [
        DocumentSlot::IdCopy,
        DocumentSlot::BankPassbookCopy,
        DocumentSlot::FinalQuote,
        DocumentSlot::PropertyRegister,
    ];

    for (index, slot) in sequence.into_iter().enumerate() {
        docs.attach(slot, upload(slot));
        if let Some(next) = advance_on_upload(status, &docs) {
            status = next;
        }

        if index < 3 {
            assert_eq!(status, ApplicationStatus::CreditConsentDone, "after {slot}");
        } else {
            assert_eq!(status, ApplicationStatus::FirstDocsComplete);
        }
        assert_eq!(reconcile_status(status, &docs), status);
    }
}

#[test]
fn removing_a_mandatory_document_demotes_on_reconcile() {
    let mut docs = full_first_round();
    let status = reconcile_status(ApplicationStatus::FirstApprovalDocsRequired, &docs);
    assert_eq!(status, ApplicationStatus::FirstDocsComplete);

    docs.detach(DocumentSlot::BankPassbookCopy);
    let outcome = reconcile(status, &docs);

    assert_eq!(outcome.status, ApplicationStatus::FirstApprovalDocsRequired);
    assert_eq!(outcome.transition, StatusTransition::Demoted);
}

#[test]
fn upload_shortcut_agrees_with_reconcile() {
    let samples = [
        DocumentSet::new(),
        documents(&FIRST_ROUND_MANDATORY),
        full_first_round(),
        documents(&[DocumentSlot::ConstructionContract]),
    ];

    for docs in &samples {
        for status in ApplicationStatus::ALL {
            if let Some(next) = advance_on_upload(status, docs) {
                assert_eq!(next, reconcile_status(status, docs));
                assert_eq!(reconcile(status, docs).transition, StatusTransition::Promoted);
            }
        }
    }
}
