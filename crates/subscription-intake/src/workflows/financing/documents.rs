use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

/// Review round a document belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewRound {
    /// Credit approval paperwork collected after the credit check passes.
    First,
    /// Construction contract collected after final approval.
    Second,
}

/// Named alternative groups. Any one member satisfies the group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlternativeGroup {
    OwnershipProof,
}

impl AlternativeGroup {
    pub const fn label(self) -> &'static str {
        match self {
            AlternativeGroup::OwnershipProof => "property register or sale contract copy",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementClass {
    Mandatory,
    Alternative(AlternativeGroup),
    Optional,
}

/// Fixed catalog of supporting documents tracked per application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DocumentSlot {
    IdCopy,
    BankPassbookCopy,
    PropertyRegister,
    SaleContractCopy,
    FamilyRelationCertificate,
    FinalQuote,
    ConstructionContract,
}

impl DocumentSlot {
    pub const ALL: [DocumentSlot; 7] = [
        DocumentSlot::IdCopy,
        DocumentSlot::BankPassbookCopy,
        DocumentSlot::PropertyRegister,
        DocumentSlot::SaleContractCopy,
        DocumentSlot::FamilyRelationCertificate,
        DocumentSlot::FinalQuote,
        DocumentSlot::ConstructionContract,
    ];

    /// Key used in the stored documents map.
    pub const fn label(self) -> &'static str {
        match self {
            DocumentSlot::IdCopy => "신분증사본",
            DocumentSlot::BankPassbookCopy => "통장사본(자동이체)",
            DocumentSlot::PropertyRegister => "부동산 등기부 등본(원본)",
            DocumentSlot::SaleContractCopy => "부동산 매매 계약서 사본(등기 불가일 경우)",
            DocumentSlot::FamilyRelationCertificate => "가족관계 증명서(등기가 가족 명의일 경우)",
            DocumentSlot::FinalQuote => "최종 견적서",
            DocumentSlot::ConstructionContract => "시공 계약서",
        }
    }

    pub const fn round(self) -> ReviewRound {
        match self {
            DocumentSlot::ConstructionContract => ReviewRound::Second,
            _ => ReviewRound::First,
        }
    }

    pub const fn requirement(self) -> RequirementClass {
        match self {
            DocumentSlot::IdCopy
            | DocumentSlot::BankPassbookCopy
            | DocumentSlot::FinalQuote
            | DocumentSlot::ConstructionContract => RequirementClass::Mandatory,
            DocumentSlot::PropertyRegister | DocumentSlot::SaleContractCopy => {
                RequirementClass::Alternative(AlternativeGroup::OwnershipProof)
            }
            DocumentSlot::FamilyRelationCertificate => RequirementClass::Optional,
        }
    }

    pub fn from_label(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        Self::ALL.into_iter().find(|slot| slot.label() == trimmed)
    }

    pub fn for_round(round: ReviewRound) -> impl Iterator<Item = DocumentSlot> {
        Self::ALL.into_iter().filter(move |slot| slot.round() == round)
    }
}

impl fmt::Display for DocumentSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for DocumentSlot {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for DocumentSlot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DocumentSlot::from_label(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown document slot '{raw}'")))
    }
}

/// A file attached to a slot. Presence alone marks the slot as filled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedDocument {
    pub name: String,
    #[serde(deserialize_with = "deserialize_upload_date")]
    pub uploaded_at: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

impl UploadedDocument {
    pub fn new(name: impl Into<String>, uploaded_at: NaiveDate) -> Self {
        Self {
            name: name.into(),
            uploaded_at,
            url: None,
            mime_type: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

fn deserialize_upload_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_upload_date(&raw).ok_or_else(|| {
        serde::de::Error::custom(format!("'{raw}' is not a YYYY-MM-DD date or RFC 3339 timestamp"))
    })
}

pub(crate) fn parse_upload_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|dt| dt.date_naive())
}

/// Error raised when the stored documents column cannot be decoded.
#[derive(Debug, thiserror::Error)]
#[error("documents column is not valid JSON: {0}")]
pub struct DocumentsDecodeError(#[from] serde_json::Error);

/// Uploaded documents keyed by slot label, owned by a single application.
///
/// Keys outside the catalog are kept so that a load/store cycle does not drop data, but they
/// never count toward completeness.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentSet {
    entries: BTreeMap<String, UploadedDocument>,
}

impl DocumentSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the JSON-encoded documents column. Blank input is an empty set.
    pub fn from_json(raw: &str) -> Result<Self, DocumentsDecodeError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(raw)?)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.entries).unwrap_or_else(|_| "{}".to_string())
    }

    /// Attach an upload, replacing any previous file in the slot.
    pub fn attach(&mut self, slot: DocumentSlot, document: UploadedDocument) {
        self.entries.insert(slot.label().to_string(), document);
    }

    pub fn detach(&mut self, slot: DocumentSlot) -> Option<UploadedDocument> {
        self.entries.remove(slot.label())
    }

    pub fn get(&self, slot: DocumentSlot) -> Option<&UploadedDocument> {
        self.entries.get(slot.label())
    }

    pub fn is_filled(&self, slot: DocumentSlot) -> bool {
        self.entries.contains_key(slot.label())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &UploadedDocument)> {
        self.entries.iter().map(|(key, doc)| (key.as_str(), doc))
    }
}

impl FromIterator<(DocumentSlot, UploadedDocument)> for DocumentSet {
    fn from_iter<I: IntoIterator<Item = (DocumentSlot, UploadedDocument)>>(iter: I) -> Self {
        let mut set = DocumentSet::new();
        for (slot, document) in iter {
            set.attach(slot, document);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: &str) -> UploadedDocument {
        UploadedDocument::new(name, NaiveDate::from_ymd_opt(2025, 3, 4).expect("valid date"))
    }

    #[test]
    fn catalog_classifies_slots() {
        assert_eq!(
            DocumentSlot::for_round(ReviewRound::Second).collect::<Vec<_>>(),
            vec![DocumentSlot::ConstructionContract]
        );
        assert_eq!(DocumentSlot::for_round(ReviewRound::First).count(), 6);
        assert_eq!(
            DocumentSlot::FamilyRelationCertificate.requirement(),
            RequirementClass::Optional
        );
        assert_eq!(
            DocumentSlot::from_label("최종 견적서"),
            Some(DocumentSlot::FinalQuote)
        );
        assert_eq!(DocumentSlot::from_label("주민등록등본"), None);
    }

    #[test]
    fn decodes_stored_column_and_keeps_unknown_keys() {
        let raw = r#"{
            "신분증사본": {"name": "2025-03-04_kim_id", "uploadedAt": "2025-03-04", "url": "https://files.example/id"},
            "기타 서류": {"name": "misc", "uploadedAt": "2025-03-05T09:30:00.000Z"}
        }"#;

        let set = DocumentSet::from_json(raw).expect("column decodes");
        assert!(set.is_filled(DocumentSlot::IdCopy));
        assert_eq!(set.len(), 2);
        assert_eq!(
            set.get(DocumentSlot::IdCopy).and_then(|doc| doc.url.as_deref()),
            Some("https://files.example/id")
        );

        let reencoded = DocumentSet::from_json(&set.to_json()).expect("round trip");
        assert_eq!(reencoded, set);
    }

    #[test]
    fn blank_column_is_empty_and_garbage_is_rejected() {
        assert!(DocumentSet::from_json("  ").expect("blank").is_empty());
        assert!(DocumentSet::from_json("{not json").is_err());
    }

    #[test]
    fn attach_replaces_and_detach_removes() {
        let mut set = DocumentSet::new();
        set.attach(DocumentSlot::FinalQuote, upload("first"));
        set.attach(DocumentSlot::FinalQuote, upload("second"));
        assert_eq!(set.len(), 1);
        assert_eq!(
            set.get(DocumentSlot::FinalQuote).map(|doc| doc.name.as_str()),
            Some("second")
        );

        let removed = set.detach(DocumentSlot::FinalQuote).expect("was attached");
        assert_eq!(removed.name, "second");
        assert!(!set.is_filled(DocumentSlot::FinalQuote));
        assert!(set.detach(DocumentSlot::FinalQuote).is_none());
    }
}
