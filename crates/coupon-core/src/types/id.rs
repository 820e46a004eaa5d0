//! Typed identifiers.
//!
//! [`ActorId`] is the opaque identity of the party requesting a coupon.
//! Callers may supply it as a number or a string; it is always stored and
//! compared in its canonical string form. Entity identifiers are newtype
//! wrappers around [`uuid::Uuid`]; with the `sqlx` feature enabled they
//! also encode/decode as PostgreSQL `UUID`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Maximum accepted length of an actor identity, in bytes.
pub const MAX_ACTOR_ID_LEN: usize = 128;

/// Opaque identity of an actor (user) requesting a coupon.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ActorId(String);

impl ActorId {
    /// Wrap a raw identity, rejecting empty, oversized, or whitespace-padded values.
    pub fn parse(raw: impl Into<String>) -> Result<Self, ActorIdError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(ActorIdError::Empty);
        }
        if raw.len() > MAX_ACTOR_ID_LEN {
            return Err(ActorIdError::TooLong(raw.len()));
        }
        if raw.trim() != raw {
            return Err(ActorIdError::Whitespace);
        }
        Ok(Self(raw))
    }

    /// Return the canonical string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the identifier, returning the canonical string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for ActorId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<i64> for ActorId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl FromStr for ActorId {
    type Err = ActorIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<'de> Deserialize<'de> for ActorId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Unsigned(u64),
            Signed(i64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Unsigned(n) => Ok(Self::from(n)),
            Raw::Signed(n) => Ok(Self::from(n)),
            Raw::Text(s) => Self::parse(s).map_err(serde::de::Error::custom),
        }
    }
}

/// Reasons an actor identity is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActorIdError {
    /// The identity was an empty string.
    #[error("actor id must not be empty")]
    Empty,
    /// The identity exceeded [`MAX_ACTOR_ID_LEN`].
    #[error("actor id is {0} bytes, limit is {MAX_ACTOR_ID_LEN}")]
    TooLong(usize),
    /// The identity had leading or trailing whitespace.
    #[error("actor id must not have leading or trailing whitespace")]
    Whitespace,
}

/// Macro to define a newtype ID wrapper around `Uuid`.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new time-ordered identifier.
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner UUID value.
            pub fn into_uuid(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        #[cfg(feature = "sqlx")]
        impl sqlx::Type<sqlx::Postgres> for $name {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <Uuid as sqlx::Type<sqlx::Postgres>>::type_info()
            }
        }

        #[cfg(feature = "sqlx")]
        impl<'q> sqlx::Encode<'q, sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut <sqlx::Postgres as sqlx::Database>::ArgumentBuffer<'q>,
            ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
                <Uuid as sqlx::Encode<'q, sqlx::Postgres>>::encode_by_ref(&self.0, buf)
            }
        }

        #[cfg(feature = "sqlx")]
        impl<'r> sqlx::Decode<'r, sqlx::Postgres> for $name {
            fn decode(
                value: <sqlx::Postgres as sqlx::Database>::ValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                <Uuid as sqlx::Decode<'r, sqlx::Postgres>>::decode(value).map(Self)
            }
        }
    };
}

define_id!(
    /// Unique identifier for an issued grant.
    GrantId
);

define_id!(
    /// Unique identifier for a quota snapshot.
    SnapshotId
);
