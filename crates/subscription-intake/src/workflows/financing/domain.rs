use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use super::documents::DocumentSet;
use super::status::ApplicationStatus;

/// Identifier wrapper for financing applications (the sheet's customer number).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PartnerId(pub String);

/// Installer partner that submitted the lead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartnerRef {
    pub id: PartnerId,
    pub name: String,
}

/// Descriptive customer fields. The status engine never reads these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDetails {
    pub name: String,
    pub phone: String,
    pub address: String,
    /// Final quoted amount in KRW. Accepts a number or a comma-grouped string.
    #[serde(deserialize_with = "deserialize_amount")]
    pub amount: u64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AmountInput {
    Number(u64),
    Text(String),
}

fn deserialize_amount<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match AmountInput::deserialize(deserializer)? {
        AmountInput::Number(amount) => Ok(amount),
        AmountInput::Text(raw) => raw.replace(',', "").trim().parse().map_err(|_| {
            serde::de::Error::custom(format!("amount '{raw}' is not a whole number of won"))
        }),
    }
}

/// A lead as entered on the partner dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadSubmission {
    pub partner: PartnerRef,
    pub customer: CustomerDetails,
}

/// Aggregate persisted per customer row. Owns its documents exclusively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub partner: PartnerRef,
    pub customer: CustomerDetails,
    /// Missing when the sheet row carries no readable date.
    pub received_on: Option<NaiveDate>,
    pub status: ApplicationStatus,
    #[serde(default)]
    pub remarks: String,
    #[serde(default)]
    pub documents: DocumentSet,
}

impl Application {
    pub fn received(id: ApplicationId, lead: LeadSubmission, received_on: NaiveDate) -> Self {
        Self {
            id,
            partner: lead.partner,
            customer: lead.customer,
            received_on: Some(received_on),
            status: ApplicationStatus::Received,
            remarks: String::new(),
            documents: DocumentSet::new(),
        }
    }
}

/// Status, remarks and optionally corrected customer fields from the edit form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEdit {
    pub status: ApplicationStatus,
    #[serde(default)]
    pub remarks: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<CustomerDetails>,
}

impl StatusEdit {
    pub fn new(status: ApplicationStatus, remarks: impl Into<String>) -> Self {
        Self {
            status,
            remarks: remarks.into(),
            customer: None,
        }
    }

    pub fn with_customer(mut self, customer: CustomerDetails) -> Self {
        self.customer = Some(customer);
        self
    }
}

/// Listing filter for the partner dashboard and the admin roster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ApplicationFilter {
    #[serde(default)]
    pub partner_id: Option<String>,
    #[serde(default)]
    pub status: Option<ApplicationStatus>,
}

impl ApplicationFilter {
    pub fn matches(&self, application: &Application) -> bool {
        let partner_matches = self
            .partner_id
            .as_deref()
            .map_or(true, |id| application.partner.id.0 == id);
        let status_matches = self
            .status
            .map_or(true, |status| application.status == status);
        partner_matches && status_matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_accepts_grouped_text() {
        let parsed: CustomerDetails = serde_json::from_str(
            r#"{"name":"김","phone":"010","address":"서울","amount":"12,500,000"}"#,
        )
        .expect("grouped amount decodes");
        assert_eq!(parsed.amount, 12_500_000);

        let numeric: CustomerDetails = serde_json::from_str(
            r#"{"name":"김","phone":"010","address":"서울","amount":3000000}"#,
        )
        .expect("numeric amount decodes");
        assert_eq!(numeric.amount, 3_000_000);

        assert!(serde_json::from_str::<CustomerDetails>(
            r#"{"name":"김","phone":"010","address":"서울","amount":"약 300만"}"#,
        )
        .is_err());
    }

    #[test]
    fn edit_without_customer_keeps_details_untouched() {
        let edit: StatusEdit =
            serde_json::from_str(r#"{"status":"접수"}"#).expect("minimal edit decodes");
        assert_eq!(edit, StatusEdit::new(ApplicationStatus::Received, ""));
    }
}
