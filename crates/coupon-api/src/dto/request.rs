//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use coupon_core::types::{ActorId, ActorIdError};

/// Actor identity as sent by clients: a JSON number or string.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActorIdInput {
    /// Non-negative numeric user ID.
    Unsigned(u64),
    /// Negative numeric user ID.
    Signed(i64),
    /// String user ID.
    Text(String),
}

impl ActorIdInput {
    /// Converts to the canonical identity.
    pub fn to_actor_id(&self) -> Result<ActorId, ActorIdError> {
        match self {
            Self::Unsigned(n) => Ok(ActorId::from(*n)),
            Self::Signed(n) => Ok(ActorId::from(*n)),
            Self::Text(s) => ActorId::parse(s.as_str()),
        }
    }
}

/// Coupon application request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ApplyRequest {
    /// Requesting actor.
    #[validate(custom(function = "validate_actor_id"))]
    pub actor_id: ActorIdInput,
}

fn validate_actor_id(input: &ActorIdInput) -> Result<(), ValidationError> {
    input.to_actor_id().map(|_| ()).map_err(|e| {
        let mut err = ValidationError::new("actor_id");
        err.message = Some(e.to_string().into());
        err
    })
}

/// Optional `limit` query parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitParams {
    /// Maximum number of items (default: 20, max: 500).
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    20
}

impl LimitParams {
    /// The limit clamped to `1..=500`.
    pub fn clamped(&self) -> usize {
        self.limit.clamp(1, 500)
    }
}
