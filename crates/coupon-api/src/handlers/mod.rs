//! HTTP request handlers.

pub mod admin;
pub mod coupon;
pub mod health;
