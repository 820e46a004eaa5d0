//! Grant domain entities.

pub mod failed;
pub mod model;

pub use failed::FailedGrant;
pub use model::Grant;
