//! Entities shipped with the crate.
//!
//! Each module declares one [`Schema`](crate::libs::schema::Schema) and a
//! `factory` the registry calls to instantiate it.

pub mod encoding;
pub mod export_job;
pub mod phone;
pub mod report_summary;
pub mod timezone;
