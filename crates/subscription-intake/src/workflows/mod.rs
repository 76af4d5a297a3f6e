pub mod financing;
pub mod partners;
