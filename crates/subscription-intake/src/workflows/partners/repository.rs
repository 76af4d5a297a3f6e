use crate::workflows::financing::{PartnerId, RepositoryError};

use super::domain::Partner;

/// Storage abstraction over the partner sheet. Same full-record, last-write-wins semantics as
/// the application store.
pub trait PartnerRepository: Send + Sync {
    fn insert(&self, partner: Partner) -> Result<Partner, RepositoryError>;
    fn replace(&self, partner: Partner) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &PartnerId) -> Result<Option<Partner>, RepositoryError>;
    fn list(&self) -> Result<Vec<Partner>, RepositoryError>;
}
