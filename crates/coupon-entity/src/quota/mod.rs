//! Quota status and snapshot entities.

pub mod snapshot;

pub use snapshot::{QuotaSnapshot, QuotaStatus};
