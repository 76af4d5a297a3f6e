//! Installer partner roster: sheet import, registration by the admin or by sign-up request,
//! profile edits and the admin listing.

pub mod domain;
pub mod repository;
pub mod roster;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    Partner, PartnerFilter, PartnerOrigin, PartnerProfileEdit, PartnerRegistration,
    GUEST_PARTNER_ID,
};
pub use repository::PartnerRepository;
pub use roster::PartnerRosterImporter;
pub use router::partner_router;
pub use service::{PartnerService, PartnerServiceError};
