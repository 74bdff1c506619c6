//! Record and identifier types for the three admin tables.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! id_type {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse().map($name)
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                $name(raw)
            }
        }
    };
}

id_type!(
    /// Identifier of a name record.
    NameId
);
id_type!(
    /// Identifier of a group record.
    GroupId
);
id_type!(
    /// Identifier of a group-object permission grant.
    GrantId
);

/// A stored name record (a system account).
///
/// `password_hash` holds the salted one-way hash of the credential. The
/// plaintext is never stored, and the hash is never serialized outward.
#[derive(Debug, Clone, Serialize)]
pub struct NameRecord {
    pub id: NameId,
    pub username: String,
    pub full_name: String,
    pub email: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Writable fields of a name record.
#[derive(Debug, Clone)]
pub struct NameFields {
    pub username: String,
    pub full_name: String,
    pub email: Option<String>,
    pub password_hash: String,
}

/// A stored group record.
#[derive(Debug, Clone, Serialize)]
pub struct GroupRecord {
    pub id: GroupId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Writable fields of a group record.
#[derive(Debug, Clone)]
pub struct GroupFields {
    pub name: String,
    pub description: Option<String>,
}

/// A stored group-object permission grant: a group, a capability string,
/// and the primary key of the object the capability applies to.
#[derive(Debug, Clone, Serialize)]
pub struct GrantRecord {
    pub id: GrantId,
    pub group_id: GroupId,
    pub capability: String,
    pub object_pk: String,
    pub created_at: DateTime<Utc>,
}

/// Writable fields of a grant record.
#[derive(Debug, Clone)]
pub struct GrantFields {
    pub group_id: GroupId,
    pub capability: String,
    pub object_pk: String,
}
