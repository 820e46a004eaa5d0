//! Router-level integration tests against the in-memory stack.

mod admin_test;
mod apply_test;
mod health_test;
mod helpers;
