use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::workflows::financing::{PartnerId, RepositoryError};
use crate::workflows::partners::domain::{Partner, PartnerOrigin, PartnerRegistration};
use crate::workflows::partners::repository::PartnerRepository;
use crate::workflows::partners::service::PartnerService;

pub(super) fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, d).expect("valid date")
}

pub(super) fn registration(id: &str, origin: PartnerOrigin) -> PartnerRegistration {
    PartnerRegistration {
        id: id.to_string(),
        name: format!("{id} 창호"),
        owner: "박대표".to_string(),
        phone: "010-7777-8888".to_string(),
        address: "인천시 연수구".to_string(),
        region: "인천".to_string(),
        business_number: "123-45-67890".to_string(),
        account: "기업 010-000000".to_string(),
        email: "partner@example.kr".to_string(),
        origin,
    }
}

pub(super) fn partner(id: &str, origin: PartnerOrigin, joined: u32) -> Partner {
    registration(id, origin).into_partner(day(joined))
}

#[derive(Default)]
pub(super) struct MemoryPartnerRepository {
    pub(super) records: Mutex<BTreeMap<PartnerId, Partner>>,
}

impl MemoryPartnerRepository {
    pub(super) fn stored(&self, id: &str) -> Partner {
        self.records
            .lock()
            .expect("repository mutex poisoned")
            .get(&PartnerId(id.to_string()))
            .cloned()
            .expect("partner stored")
    }
}

impl PartnerRepository for MemoryPartnerRepository {
    fn insert(&self, partner: Partner) -> Result<Partner, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&partner.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(partner.id.clone(), partner.clone());
        Ok(partner)
    }

    fn replace(&self, partner: Partner) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard.insert(partner.id.clone(), partner);
        Ok(())
    }

    fn fetch(&self, id: &PartnerId) -> Result<Option<Partner>, RepositoryError> {
        Ok(self
            .records
            .lock()
            .expect("repository mutex poisoned")
            .get(id)
            .cloned())
    }

    fn list(&self) -> Result<Vec<Partner>, RepositoryError> {
        Ok(self
            .records
            .lock()
            .expect("repository mutex poisoned")
            .values()
            .cloned()
            .collect())
    }
}

pub(super) fn seeded_service(
    partners: Vec<Partner>,
) -> (
    PartnerService<MemoryPartnerRepository>,
    Arc<MemoryPartnerRepository>,
) {
    let repository = Arc::new(MemoryPartnerRepository::default());
    for partner in partners {
        repository.insert(partner).expect("seed insert");
    }
    (PartnerService::new(repository.clone()), repository)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
