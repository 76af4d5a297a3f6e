//! Import of the customer sheet export and batch status reconciliation.

use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::documents::DocumentSet;
use super::domain::{Application, ApplicationId, CustomerDetails, PartnerId, PartnerRef};
use super::engine::{self, StatusTransition};
use super::status::ApplicationStatus;

#[derive(Debug, thiserror::Error)]
pub enum RosterImportError {
    #[error("failed to read roster export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid roster CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("roster row {row}: {reason}")]
    InvalidRow { row: usize, reason: String },
}

pub struct RosterImporter;

impl RosterImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Application>, RosterImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Map exported customer rows into applications. Row numbers in errors are 1-based and
    /// exclude the header line.
    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<Application>, RosterImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut applications = Vec::new();
        for (index, record) in csv_reader.deserialize::<RosterRow>().enumerate() {
            let row = record?;
            let application = row
                .into_application(index + 1)
                .map_err(|reason| RosterImportError::InvalidRow {
                    row: index + 1,
                    reason,
                })?;
            applications.push(application);
        }

        Ok(applications)
    }
}

#[derive(Debug, Deserialize)]
struct RosterRow {
    #[serde(rename = "고객번호", alias = "고객 번호", alias = "ID", alias = "id")]
    id: String,
    #[serde(rename = "신청자명", default)]
    name: String,
    #[serde(rename = "연락처", default)]
    phone: String,
    #[serde(rename = "주소", default)]
    address: String,
    #[serde(rename = "최종 견적가", alias = "견적금액", default)]
    amount: String,
    #[serde(rename = "접수일", default)]
    received_on: String,
    #[serde(rename = "상태", default)]
    status: String,
    #[serde(rename = "비고", default)]
    remarks: String,
    #[serde(
        rename = "documents",
        alias = "서류",
        alias = "서류관리",
        alias = "서류 JSON",
        alias = "서류JSON",
        default
    )]
    documents: String,
    #[serde(rename = "파트너ID", alias = "파트너 ID", alias = "partnerId", default)]
    partner_id: String,
    #[serde(rename = "파트너명", alias = "partnerName", default)]
    partner_name: String,
}

impl RosterRow {
    /// Rows without a readable received date are kept undated.
    fn into_application(self, row: usize) -> Result<Application, String> {
        if self.id.is_empty() {
            return Err("customer number is empty".to_string());
        }

        let received_on = parse_sheet_date(&self.received_on);
        if received_on.is_none() && !self.received_on.is_empty() {
            warn!(row, value = %self.received_on, "unreadable received date, row kept undated");
        }
        let documents = DocumentSet::from_json(&self.documents).map_err(|err| err.to_string())?;

        Ok(Application {
            id: ApplicationId(self.id),
            partner: PartnerRef {
                id: PartnerId(self.partner_id),
                name: self.partner_name,
            },
            customer: CustomerDetails {
                name: self.name,
                phone: self.phone,
                address: self.address,
                amount: parse_amount(&self.amount),
            },
            received_on,
            status: ApplicationStatus::parse(&self.status),
            remarks: self.remarks,
            documents,
        })
    }
}

/// Quoted amounts are exported with thousands separators; anything unparseable counts as zero.
fn parse_amount(raw: &str) -> u64 {
    raw.replace(',', "").trim().parse().unwrap_or(0)
}

/// Sheet dates are exported as `YYYY-MM-DD`, optionally followed by a time.
pub(crate) fn parse_sheet_date(raw: &str) -> Option<NaiveDate> {
    let date_part = raw
        .split(|c: char| c == 'T' || c.is_whitespace())
        .next()
        .unwrap_or_default();
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// A status rewritten during batch reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterChange {
    pub id: ApplicationId,
    pub from: ApplicationStatus,
    pub to: ApplicationStatus,
    pub transition: StatusTransition,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RosterReconciliation {
    pub changes: Vec<RosterChange>,
    pub unchanged: usize,
}

impl RosterReconciliation {
    pub fn promoted(&self) -> usize {
        self.count(StatusTransition::Promoted)
    }

    pub fn demoted(&self) -> usize {
        self.count(StatusTransition::Demoted)
    }

    fn count(&self, transition: StatusTransition) -> usize {
        self.changes
            .iter()
            .filter(|change| change.transition == transition)
            .count()
    }
}

/// Re-derive every status from its documents, rewriting the applications in place.
pub fn reconcile_roster(applications: &mut [Application]) -> RosterReconciliation {
    let mut report = RosterReconciliation::default();

    for application in applications.iter_mut() {
        let reconciliation = engine::reconcile(application.status, &application.documents);
        if reconciliation.transition == StatusTransition::Unchanged {
            report.unchanged += 1;
            continue;
        }

        report.changes.push(RosterChange {
            id: application.id.clone(),
            from: reconciliation.proposed,
            to: reconciliation.status,
            transition: reconciliation.transition,
        });
        application.status = reconciliation.status;
    }

    report
}
