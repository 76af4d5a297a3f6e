use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::workflows::financing::documents::{DocumentSet, DocumentSlot, UploadedDocument};
use crate::workflows::financing::domain::{
    Application, ApplicationId, CustomerDetails, LeadSubmission, PartnerId, PartnerRef,
};
use crate::workflows::financing::repository::{
    ApplicationRepository, RepositoryError, StatusUpdatePayload,
};
use crate::workflows::financing::status::ApplicationStatus;
use crate::workflows::financing::{application_router, ApplicationService};

pub(super) fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, d).expect("valid date")
}

pub(super) fn upload(slot: DocumentSlot) -> UploadedDocument {
    UploadedDocument::new(format!("2025-06-01_홍길동_01012345678_{}", slot.label()), day(2))
        .with_url(format!("https://files.example/{}", slot.label()))
}

pub(super) fn documents(slots: &[DocumentSlot]) -> DocumentSet {
    slots.iter().map(|slot| (*slot, upload(*slot))).collect()
}

pub(super) const FIRST_ROUND_MANDATORY: [DocumentSlot; 3] = [
    DocumentSlot::IdCopy,
    DocumentSlot::BankPassbookCopy,
    DocumentSlot::FinalQuote,
];

pub(super) fn full_first_round() -> DocumentSet {
    documents(&[
        DocumentSlot::IdCopy,
        DocumentSlot::BankPassbookCopy,
        DocumentSlot::FinalQuote,
        DocumentSlot::PropertyRegister,
    ])
}

pub(super) fn lead(partner: &str) -> LeadSubmission {
    LeadSubmission {
        partner: PartnerRef {
            id: PartnerId(partner.to_string()),
            name: format!("{partner} 창호"),
        },
        customer: CustomerDetails {
            name: "홍길동".to_string(),
            phone: "010-1234-5678".to_string(),
            address: "서울시 마포구 월드컵로 1".to_string(),
            amount: 5_200_000,
        },
    }
}

pub(super) fn application(id: &str, status: ApplicationStatus, docs: DocumentSet) -> Application {
    let mut application = Application::received(ApplicationId(id.to_string()), lead("P-1"), day(1));
    application.status = status;
    application.documents = docs;
    application
}

pub(super) fn build_service() -> (ApplicationService<MemoryRepository>, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::default());
    let service = ApplicationService::new(repository.clone());
    (service, repository)
}

/// Service over a repository pre-loaded with `records`.
pub(super) fn seeded_service(
    records: Vec<Application>,
) -> (ApplicationService<MemoryRepository>, Arc<MemoryRepository>) {
    let (service, repository) = build_service();
    for record in records {
        repository.insert(record).expect("seed insert");
    }
    (service, repository)
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<HashMap<ApplicationId, Application>>>,
}

impl MemoryRepository {
    pub(super) fn stored(&self, id: &str) -> Application {
        self.records
            .lock()
            .expect("repository mutex poisoned")
            .get(&ApplicationId(id.to_string()))
            .cloned()
            .expect("record stored")
    }
}

impl ApplicationRepository for MemoryRepository {
    fn insert(&self, application: Application) -> Result<Application, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&application.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(application.id.clone(), application.clone());
        Ok(application)
    }

    fn update(&self, update: StatusUpdatePayload) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let record = guard
            .get_mut(&update.application_id())
            .ok_or(RepositoryError::NotFound)?;
        update.apply_to(record)
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<Application>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.values().cloned().collect())
    }

    fn remove(&self, id: &ApplicationId) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard
            .remove(id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }
}

/// Reads succeed from a fixed record but every write is rejected.
pub(super) struct ReadOnlyRepository {
    pub(super) record: Application,
}

impl ApplicationRepository for ReadOnlyRepository {
    fn insert(&self, _application: Application) -> Result<Application, RepositoryError> {
        Err(RepositoryError::Unavailable("sheet proxy offline".to_string()))
    }

    fn update(&self, _update: StatusUpdatePayload) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("sheet proxy offline".to_string()))
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError> {
        Ok((self.record.id == *id).then(|| self.record.clone()))
    }

    fn list(&self) -> Result<Vec<Application>, RepositoryError> {
        Ok(vec![self.record.clone()])
    }

    fn remove(&self, _id: &ApplicationId) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("sheet proxy offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn router_with_service(service: ApplicationService<MemoryRepository>) -> axum::Router {
    application_router(Arc::new(service))
}
