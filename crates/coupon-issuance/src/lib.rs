//! # coupon-issuance
//!
//! The concurrent admission-and-allocation engine.
//!
//! ## Modules
//!
//! - `gate`: per-actor dedup gate (atomic insert-if-absent)
//! - `quota`: capacity-bounded quota counter (atomic bounded increment)
//! - `engine`: composes gate, quota and ledger into `apply`
//! - `ledger`: durable grant persistence (PostgreSQL or in-memory)
//! - `reconciler`: out-of-band drift detection and failed grant replay
//! - `scheduler`: cron-driven reconciliation

mod deadline;
pub mod engine;
pub mod gate;
pub mod ledger;
pub mod quota;
pub mod reconciler;
pub mod scheduler;

pub use deadline::Deadline;
pub use engine::{AllocationFailure, AllocationResult, IssuanceEngine};
pub use gate::DedupGate;
pub use ledger::{GrantLedger, MemoryGrantLedger, PgGrantLedger};
pub use quota::{QuotaCounter, Reservation};
pub use reconciler::{GrantReconciler, ReplayReport, SnapshotSource};
pub use scheduler::ReconcileScheduler;
