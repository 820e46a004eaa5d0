//! # coupon-store
//!
//! Coordination store implementations for CouponHub. Supports two modes:
//!
//! - **memory**: in-process store using [dashmap](https://crates.io/crates/dashmap)
//!   sets and a compare-and-swap loop over atomic counters
//! - **redis**: Redis-backed store using `SADD` for claims and a Lua script
//!   for the bounded increment
//!
//! The provider is selected at runtime based on configuration.

pub mod keys;
#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;
#[cfg(feature = "redis-backend")]
pub mod redis;

pub use provider::StoreManager;
