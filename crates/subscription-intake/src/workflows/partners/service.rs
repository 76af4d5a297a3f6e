use std::sync::Arc;

use chrono::{Local, NaiveDate};
use tracing::info;

use crate::workflows::financing::{PartnerId, RepositoryError};

use super::domain::{
    Partner, PartnerFilter, PartnerProfileEdit, PartnerRegistration, GUEST_PARTNER_ID,
};
use super::repository::PartnerRepository;

pub struct PartnerService<R> {
    repository: Arc<R>,
}

impl<R> PartnerService<R>
where
    R: PartnerRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub fn register(
        &self,
        registration: PartnerRegistration,
    ) -> Result<Partner, PartnerServiceError> {
        self.register_on(registration, Local::now().date_naive())
    }

    pub fn register_on(
        &self,
        registration: PartnerRegistration,
        joined_on: NaiveDate,
    ) -> Result<Partner, PartnerServiceError> {
        let id = registration.id.trim();
        if id.is_empty() {
            return Err(PartnerServiceError::Rejected("partner id is required".to_string()));
        }
        if id == GUEST_PARTNER_ID {
            return Err(PartnerServiceError::Rejected(format!(
                "'{GUEST_PARTNER_ID}' is reserved for the demo account"
            )));
        }
        if registration.name.trim().is_empty() {
            return Err(PartnerServiceError::Rejected(
                "partner name is required".to_string(),
            ));
        }

        let partner = self
            .repository
            .insert(registration.into_partner(joined_on))?;
        info!(id = %partner.id.0, origin = ?partner.origin, "partner registered");
        Ok(partner)
    }

    pub fn get(&self, id: &PartnerId) -> Result<Partner, PartnerServiceError> {
        let partner = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(partner)
    }

    /// Partners matching `filter`, most recently joined first. The guest account is never listed.
    pub fn list(&self, filter: &PartnerFilter) -> Result<Vec<Partner>, PartnerServiceError> {
        let mut partners: Vec<_> = self
            .repository
            .list()?
            .into_iter()
            .filter(|partner| filter.matches(partner))
            .collect();
        partners.sort_by(|a, b| {
            b.joined_on
                .cmp(&a.joined_on)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(partners)
    }

    pub fn update_profile(
        &self,
        id: &PartnerId,
        edit: PartnerProfileEdit,
    ) -> Result<Partner, PartnerServiceError> {
        if edit.name.trim().is_empty() {
            return Err(PartnerServiceError::Rejected(
                "partner name is required".to_string(),
            ));
        }

        let mut partner = self.get(id)?;
        edit.apply(&mut partner);
        self.repository.replace(partner.clone())?;
        info!(id = %id.0, "partner profile updated");
        Ok(partner)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PartnerServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("partner rejected: {0}")]
    Rejected(String),
}
