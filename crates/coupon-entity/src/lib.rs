//! # coupon-entity
//!
//! Domain entity models for CouponHub. Every struct in this crate
//! represents a database table row or a domain value object. Row types
//! additionally derive `sqlx::FromRow`.

pub mod grant;
pub mod quota;
