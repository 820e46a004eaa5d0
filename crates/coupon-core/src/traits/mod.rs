//! Core traits defined in `coupon-core` and implemented by other crates.

pub mod coordination;

pub use coordination::CoordinationStore;
