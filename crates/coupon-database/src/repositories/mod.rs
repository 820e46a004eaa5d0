//! Repository implementations for CouponHub entities.

pub mod failed_grant;
pub mod grant;
pub mod quota_snapshot;

pub use failed_grant::FailedGrantRepository;
pub use grant::GrantRepository;
pub use quota_snapshot::QuotaSnapshotRepository;
