use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};
use subscription_intake::workflows::financing::{
    Application, ApplicationId, ApplicationRepository, PartnerId, RepositoryError,
    StatusUpdatePayload,
};
use subscription_intake::workflows::partners::{Partner, PartnerRepository};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local stand-in for a sheet tab, keyed by record id. Each call holds the lock, but a
/// fetch-modify-replace sequence spans several calls and is last-write-wins.
pub(crate) struct InMemoryRepository<K, V> {
    records: Arc<Mutex<HashMap<K, V>>>,
}

pub(crate) type InMemoryApplicationRepository = InMemoryRepository<ApplicationId, Application>;
pub(crate) type InMemoryPartnerRepository = InMemoryRepository<PartnerId, Partner>;

impl<K, V> Default for InMemoryRepository<K, V> {
    fn default() -> Self {
        Self {
            records: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl<K, V> Clone for InMemoryRepository<K, V> {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
        }
    }
}

impl<K, V> InMemoryRepository<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn lock(&self) -> Result<MutexGuard<'_, HashMap<K, V>>, RepositoryError> {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))
    }

    fn insert_record(&self, key: &K, value: V) -> Result<V, RepositoryError> {
        let mut guard = self.lock()?;
        if guard.contains_key(key) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(key.clone(), value.clone());
        Ok(value)
    }

    fn replace_record(&self, key: &K, value: V) -> Result<(), RepositoryError> {
        let mut guard = self.lock()?;
        match guard.get_mut(key) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch_record(&self, key: &K) -> Result<Option<V>, RepositoryError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn list_records(&self) -> Result<Vec<V>, RepositoryError> {
        Ok(self.lock()?.values().cloned().collect())
    }
}

impl InMemoryApplicationRepository {
    pub(crate) fn seeded(
        applications: impl IntoIterator<Item = Application>,
    ) -> Result<Self, RepositoryError> {
        let repository = Self::default();
        for application in applications {
            ApplicationRepository::insert(&repository, application)?;
        }
        Ok(repository)
    }
}

impl InMemoryPartnerRepository {
    pub(crate) fn seeded(
        partners: impl IntoIterator<Item = Partner>,
    ) -> Result<Self, RepositoryError> {
        let repository = Self::default();
        for partner in partners {
            PartnerRepository::insert(&repository, partner)?;
        }
        Ok(repository)
    }
}

impl ApplicationRepository for InMemoryApplicationRepository {
    fn insert(&self, application: Application) -> Result<Application, RepositoryError> {
        let id = application.id.clone();
        self.insert_record(&id, application)
    }

    fn update(&self, update: StatusUpdatePayload) -> Result<(), RepositoryError> {
        let mut guard = self.lock()?;
        let record = guard
            .get_mut(&update.application_id())
            .ok_or(RepositoryError::NotFound)?;
        update.apply_to(record)
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError> {
        self.fetch_record(id)
    }

    fn list(&self) -> Result<Vec<Application>, RepositoryError> {
        self.list_records()
    }

    fn remove(&self, id: &ApplicationId) -> Result<(), RepositoryError> {
        self.lock()?
            .remove(id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }
}

impl PartnerRepository for InMemoryPartnerRepository {
    fn insert(&self, partner: Partner) -> Result<Partner, RepositoryError> {
        let id = partner.id.clone();
        self.insert_record(&id, partner)
    }

    fn replace(&self, partner: Partner) -> Result<(), RepositoryError> {
        let id = partner.id.clone();
        self.replace_record(&id, partner)
    }

    fn fetch(&self, id: &PartnerId) -> Result<Option<Partner>, RepositoryError> {
        self.fetch_record(id)
    }

    fn list(&self) -> Result<Vec<Partner>, RepositoryError> {
        self.list_records()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use subscription_intake::workflows::financing::RosterImporter;
    use subscription_intake::workflows::partners::PartnerRosterImporter;

    const EXPORT: &str = "고객번호,접수일,상태\nC-1,2025-02-01,접수\nC-1,2025-02-02,접수\n";

    #[test]
    fn seeding_rejects_duplicate_customer_numbers() {
        let applications =
            RosterImporter::from_reader(Cursor::new(EXPORT.as_bytes())).expect("export parses");
        assert!(matches!(
            InMemoryApplicationRepository::seeded(applications),
            Err(RepositoryError::Conflict)
        ));
    }

    #[test]
    fn update_requires_existing_record() {
        let applications =
            RosterImporter::from_reader(Cursor::new(EXPORT.as_bytes())).expect("export parses");
        let first = applications.into_iter().next().expect("one row");
        let repository = InMemoryApplicationRepository::default();

        let mut update = StatusUpdatePayload::from(&first);
        assert!(matches!(
            repository.update(update.clone()),
            Err(RepositoryError::NotFound)
        ));
        repository.insert(first.clone()).expect("insert");
        update.status = "신용동의 완료".to_string();
        update.amount = "2,500,000".to_string();
        repository.update(update).expect("update");

        let stored = repository
            .fetch(&first.id)
            .expect("fetch")
            .expect("stored");
        assert_eq!(stored.customer.amount, 2_500_000);
        assert_eq!(stored.received_on, first.received_on);
        assert_eq!(repository.list().expect("list").len(), 1);
    }

    #[test]
    fn partner_store_seeds_from_export() {
        let export = "파트너 ID,파트너명\nP-1,한빛창호\nguest_demo,체험\nreq_2,새빛\n";
        let partners = PartnerRosterImporter::from_reader(Cursor::new(export.as_bytes()))
            .expect("export parses");

        let repository = InMemoryPartnerRepository::seeded(partners).expect("seeded");

        assert_eq!(PartnerRepository::list(&repository).expect("list").len(), 2);
        assert!(PartnerRepository::fetch(&repository, &PartnerId("P-1".to_string()))
            .expect("fetch")
            .is_some());
    }
}
