use serde::{Deserialize, Serialize};

use super::documents::DocumentSet;
use super::domain::{Application, ApplicationId};
use super::status::ApplicationStatus;

/// Storage abstraction over the spreadsheet-backed customer store.
///
/// `update` overwrites every field the sheet proxy accepts. There is no version token, so two
/// sessions that read the same record and save in turn race under last-write-wins;
/// implementations must not pretend otherwise.
pub trait ApplicationRepository: Send + Sync {
    fn insert(&self, application: Application) -> Result<Application, RepositoryError>;
    fn update(&self, update: StatusUpdatePayload) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError>;
    fn list(&self) -> Result<Vec<Application>, RepositoryError>;
    fn remove(&self, id: &ApplicationId) -> Result<(), RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
    #[error("update rejected: {0}")]
    Rejected(String),
}

/// Flat update body accepted by the sheet proxy. `documents` is the JSON-encoded map and
/// `amount` is sent without thousands separators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdatePayload {
    pub action: String,
    pub id: String,
    pub status: String,
    pub remarks: String,
    pub documents: String,
    pub customer_name: String,
    pub phone: String,
    pub amount: String,
    pub address: String,
}

impl StatusUpdatePayload {
    pub fn application_id(&self) -> ApplicationId {
        ApplicationId(self.id.clone())
    }

    /// Write the update onto a stored row. Partner and received date are not part of the update
    /// and stay as stored.
    pub fn apply_to(&self, application: &mut Application) -> Result<(), RepositoryError> {
        let documents = DocumentSet::from_json(&self.documents)
            .map_err(|err| RepositoryError::Rejected(err.to_string()))?;
        let amount = self.amount.replace(',', "").trim().parse().map_err(|_| {
            RepositoryError::Rejected(format!("amount '{}' is not a number", self.amount))
        })?;

        application.status = ApplicationStatus::parse(&self.status);
        application.remarks = self.remarks.clone();
        application.documents = documents;
        application.customer.name = self.customer_name.clone();
        application.customer.phone = self.phone.clone();
        application.customer.address = self.address.clone();
        application.customer.amount = amount;
        Ok(())
    }
}

impl From<&Application> for StatusUpdatePayload {
    fn from(application: &Application) -> Self {
        Self {
            action: "update".to_string(),
            id: application.id.0.clone(),
            status: application.status.label().to_string(),
            remarks: application.remarks.clone(),
            documents: application.documents.to_json(),
            customer_name: application.customer.name.clone(),
            phone: application.customer.phone.clone(),
            amount: application.customer.amount.to_string(),
            address: application.customer.address.clone(),
        }
    }
}
