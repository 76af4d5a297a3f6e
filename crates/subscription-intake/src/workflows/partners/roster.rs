//! Import of the partner sheet export. Column names drifted between sheet revisions, so every
//! field accepts the headers seen in the wild.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::workflows::financing::roster::parse_sheet_date;
use crate::workflows::financing::{PartnerId, RosterImportError};

use super::domain::{Partner, PartnerOrigin, GUEST_PARTNER_ID};

pub struct PartnerRosterImporter;

impl PartnerRosterImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Partner>, RosterImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Map partner rows, skipping the shared guest account.
    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<Partner>, RosterImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut partners = Vec::new();
        for (index, record) in csv_reader.deserialize::<PartnerRow>().enumerate() {
            let row: PartnerRow = record?;
            if row.id.is_empty() {
                return Err(RosterImportError::InvalidRow {
                    row: index + 1,
                    reason: "partner id is empty".to_string(),
                });
            }
            if row.id == GUEST_PARTNER_ID {
                continue;
            }
            partners.push(row.into_partner());
        }

        Ok(partners)
    }
}

#[derive(Debug, Deserialize)]
struct PartnerRow {
    #[serde(
        rename = "파트너 ID",
        alias = "아이디",
        alias = "ID",
        alias = "id",
        alias = "Id",
        alias = "아이디(ID)"
    )]
    id: String,
    #[serde(
        rename = "파트너명",
        alias = "파트너",
        alias = "업체명",
        alias = "name",
        alias = "Name",
        default
    )]
    name: String,
    #[serde(
        rename = "대표명",
        alias = "대표자명",
        alias = "대표자",
        alias = "대표",
        alias = "owner",
        default
    )]
    owner: String,
    #[serde(
        rename = "연락처",
        alias = "휴대폰",
        alias = "전화번호",
        alias = "phone",
        alias = "연락처(휴대폰)",
        default
    )]
    phone: String,
    #[serde(
        rename = "시공지역",
        alias = "지역",
        alias = "활동지역",
        alias = "region",
        alias = "Region",
        default
    )]
    region: String,
    #[serde(
        rename = "가입일",
        alias = "가입일시",
        alias = "등록일",
        alias = "등록일시",
        alias = "날짜",
        default
    )]
    joined_on: String,
    #[serde(
        rename = "사업자번호",
        alias = "사업자",
        alias = "사업자등록번호",
        alias = "bizNum",
        default
    )]
    business_number: String,
    #[serde(rename = "이메일", alias = "email", alias = "Email", alias = "메일주소", default)]
    email: String,
    #[serde(
        rename = "주소",
        alias = "address",
        alias = "Address",
        alias = "영업소주소",
        default
    )]
    address: String,
    #[serde(
        rename = "법인계좌",
        alias = "계좌번호",
        alias = "정산계좌",
        alias = "계좌",
        alias = "입금계좌",
        default
    )]
    account: String,
    #[serde(rename = "구분", alias = "origin", alias = "type", alias = "가입구분", default)]
    origin: String,
}

impl PartnerRow {
    fn into_partner(self) -> Partner {
        let origin = PartnerOrigin::classify(&self.origin, &self.id);
        Partner {
            id: PartnerId(self.id),
            name: self.name,
            owner: self.owner,
            phone: self.phone,
            address: self.address,
            region: self.region,
            business_number: self.business_number,
            account: self.account,
            email: self.email,
            joined_on: parse_sheet_date(&self.joined_on),
            origin,
        }
    }
}
