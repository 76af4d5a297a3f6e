use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::workflows::financing::PartnerId;

/// Demo account shared on the login page. Its records never show up in admin views.
pub const GUEST_PARTNER_ID: &str = "guest_demo";

/// Ids of partners created from a sign-up request carry this prefix.
pub const REQUEST_ID_PREFIX: &str = "req_";

/// How a partner entered the roster.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartnerOrigin {
    /// Registered directly by an administrator.
    #[default]
    Admin,
    /// Created from a partner's own sign-up request.
    Request,
}

impl PartnerOrigin {
    /// Classify a sheet row. The origin column wins when it mentions a request; otherwise the
    /// `req_` id prefix marks request-created partners.
    pub fn classify(origin: &str, id: &str) -> Self {
        let from_column = origin.to_ascii_lowercase().contains("request");
        let from_id = id.to_ascii_lowercase().starts_with(REQUEST_ID_PREFIX);
        if from_column || from_id {
            PartnerOrigin::Request
        } else {
            PartnerOrigin::Admin
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partner {
    pub id: PartnerId,
    pub name: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    /// Installation region the partner covers.
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub business_number: String,
    /// Settlement account payouts are sent to.
    #[serde(default)]
    pub account: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub joined_on: Option<NaiveDate>,
    #[serde(default)]
    pub origin: PartnerOrigin,
}

impl Partner {
    pub fn is_guest(&self) -> bool {
        self.id.0 == GUEST_PARTNER_ID
    }
}

/// New partner as entered in the admin form or a sign-up request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartnerRegistration {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub business_number: String,
    #[serde(default)]
    pub account: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub origin: PartnerOrigin,
}

impl PartnerRegistration {
    pub fn into_partner(self, joined_on: NaiveDate) -> Partner {
        Partner {
            id: PartnerId(self.id.trim().to_string()),
            name: self.name,
            owner: self.owner,
            phone: self.phone,
            address: self.address,
            region: self.region,
            business_number: self.business_number,
            account: self.account,
            email: self.email,
            joined_on: Some(joined_on),
            origin: self.origin,
        }
    }
}

/// Fields a partner may change on the profile page. Id, region and origin stay fixed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartnerProfileEdit {
    pub name: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub business_number: String,
    #[serde(default)]
    pub account: String,
    #[serde(default)]
    pub email: String,
}

impl PartnerProfileEdit {
    pub fn apply(self, partner: &mut Partner) {
        partner.name = self.name;
        partner.owner = self.owner;
        partner.phone = self.phone;
        partner.address = self.address;
        partner.business_number = self.business_number;
        partner.account = self.account;
        partner.email = self.email;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PartnerFilter {
    #[serde(default)]
    pub origin: Option<PartnerOrigin>,
}

impl PartnerFilter {
    pub fn matches(&self, partner: &Partner) -> bool {
        !partner.is_guest() && self.origin.map_or(true, |origin| partner.origin == origin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_prefers_column_then_id_prefix() {
        assert_eq!(PartnerOrigin::classify("Request", "p-1"), PartnerOrigin::Request);
        assert_eq!(PartnerOrigin::classify("", "REQ_0042"), PartnerOrigin::Request);
        assert_eq!(PartnerOrigin::classify("admin", "p-1"), PartnerOrigin::Admin);
        assert_eq!(PartnerOrigin::classify("", "request-free"), PartnerOrigin::Admin);
    }
}
