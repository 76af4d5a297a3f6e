use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Stage of a financing application. Exactly one is active per application.
///
/// The serialized form is the label stored in the customer sheet, so the strings returned by
/// [`ApplicationStatus::label`] must not change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ApplicationStatus {
    #[default]
    Received,
    CreditConsentDone,
    FirstApprovalDocsRequired,
    FirstDocsComplete,
    FinalApprovalContractRequired,
    FinalDocsComplete,
    ESignRecordingInProgress,
    RecordingDoneSettlementPending,
    SettlementComplete,
    FirstRejected,
    FinalRejected,
}

impl ApplicationStatus {
    /// Every status in workflow order, rejections last.
    pub const ALL: [ApplicationStatus; 11] = [
        ApplicationStatus::Received,
        ApplicationStatus::CreditConsentDone,
        ApplicationStatus::FirstApprovalDocsRequired,
        ApplicationStatus::FirstDocsComplete,
        ApplicationStatus::FinalApprovalContractRequired,
        ApplicationStatus::FinalDocsComplete,
        ApplicationStatus::ESignRecordingInProgress,
        ApplicationStatus::RecordingDoneSettlementPending,
        ApplicationStatus::SettlementComplete,
        ApplicationStatus::FirstRejected,
        ApplicationStatus::FinalRejected,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Received => "접수",
            ApplicationStatus::CreditConsentDone => "신용동의 완료",
            ApplicationStatus::FirstApprovalDocsRequired => "1차승인(추가 서류 등록 必)",
            ApplicationStatus::FirstDocsComplete => "1차서류 등록완료",
            ApplicationStatus::FinalApprovalContractRequired => "최종승인(시공계약서 등록 必)",
            ApplicationStatus::FinalDocsComplete => "최종서류 등록완료",
            ApplicationStatus::ESignRecordingInProgress => "전자서명/녹취 진행중",
            ApplicationStatus::RecordingDoneSettlementPending => "녹취완료/정산대기",
            ApplicationStatus::SettlementComplete => "정산완료",
            ApplicationStatus::FirstRejected => "1차 불가",
            ApplicationStatus::FinalRejected => "최종 불가",
        }
    }

    pub const fn tag(self) -> &'static str {
        match self {
            ApplicationStatus::Received => "Received",
            ApplicationStatus::CreditConsentDone => "CreditConsentDone",
            ApplicationStatus::FirstApprovalDocsRequired => "FirstApprovalDocsRequired",
            ApplicationStatus::FirstDocsComplete => "FirstDocsComplete",
            ApplicationStatus::FinalApprovalContractRequired => "FinalApprovalContractRequired",
            ApplicationStatus::FinalDocsComplete => "FinalDocsComplete",
            ApplicationStatus::ESignRecordingInProgress => "ESignRecordingInProgress",
            ApplicationStatus::RecordingDoneSettlementPending => "RecordingDoneSettlementPending",
            ApplicationStatus::SettlementComplete => "SettlementComplete",
            ApplicationStatus::FirstRejected => "FirstRejected",
            ApplicationStatus::FinalRejected => "FinalRejected",
        }
    }

    /// Parse a stored label or tag. Unrecognized input is treated as [`ApplicationStatus::Received`].
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.label() == trimmed || status.tag() == trimmed)
            .unwrap_or(ApplicationStatus::Received)
    }

    pub const fn is_rejected(self) -> bool {
        matches!(
            self,
            ApplicationStatus::FirstRejected | ApplicationStatus::FinalRejected
        )
    }

    pub const fn stage_group(self) -> StageGroup {
        match self {
            ApplicationStatus::Received
            | ApplicationStatus::CreditConsentDone
            | ApplicationStatus::FirstApprovalDocsRequired
            | ApplicationStatus::FirstDocsComplete => StageGroup::Review,
            ApplicationStatus::FinalApprovalContractRequired
            | ApplicationStatus::FinalDocsComplete
            | ApplicationStatus::ESignRecordingInProgress => StageGroup::Contract,
            ApplicationStatus::RecordingDoneSettlementPending
            | ApplicationStatus::SettlementComplete => StageGroup::Settlement,
            ApplicationStatus::FirstRejected | ApplicationStatus::FinalRejected => {
                StageGroup::Rejected
            }
        }
    }

    pub const fn is_settlement_stage(self) -> bool {
        matches!(
            self,
            ApplicationStatus::RecordingDoneSettlementPending
                | ApplicationStatus::SettlementComplete
        )
    }
}

/// Dashboard tab an application is listed under. Rejections only show in the full list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageGroup {
    Review,
    Contract,
    Settlement,
    Rejected,
}

impl StageGroup {
    pub const ALL: [StageGroup; 4] = [
        StageGroup::Review,
        StageGroup::Contract,
        StageGroup::Settlement,
        StageGroup::Rejected,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            StageGroup::Review => "접수/심사",
            StageGroup::Contract => "승인/계약",
            StageGroup::Settlement => "정산완료",
            StageGroup::Rejected => "불가",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for ApplicationStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for ApplicationStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(Self::parse).unwrap_or_default())
    }
}
