//! Shared domain value types.

pub mod id;

pub use id::{ActorId, ActorIdError, GrantId, MAX_ACTOR_ID_LEN, SnapshotId};
