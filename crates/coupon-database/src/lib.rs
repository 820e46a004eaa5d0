//! # coupon-database
//!
//! PostgreSQL connection management and concrete repository
//! implementations for grants, failed grant writes, and quota snapshots.

pub mod connection;
pub mod repositories;

pub use connection::{GrantDatabase, schema_version};
