use serde::{Deserialize, Serialize};

use crate::error::Error;

/// The entity types the admin service manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Name,
    Group,
    Grant,
}

/// Capability strings that gate admin operations.
///
/// One capability exists per (entity type, operation) pair. The string forms
/// are fixed wire/config values; grants keep the `guardian.*` prefix their
/// permission rows carry in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    #[serde(rename = "name.add_names")]
    AddNames,
    #[serde(rename = "name.change_names")]
    ChangeNames,
    #[serde(rename = "name.delete_names")]
    DeleteNames,
    #[serde(rename = "name.add_groups")]
    AddGroups,
    #[serde(rename = "name.change_groups")]
    ChangeGroups,
    #[serde(rename = "name.delete_groups")]
    DeleteGroups,
    #[serde(rename = "guardian.add_groupobjectpermission")]
    AddGrants,
    #[serde(rename = "guardian.change_groupobjectpermission")]
    ChangeGrants,
    #[serde(rename = "guardian.delete_groupobjectpermission")]
    DeleteGrants,
}

impl Capability {
    /// All capabilities, in declaration order.
    pub const ALL: [Capability; 9] = [
        Capability::AddNames,
        Capability::ChangeNames,
        Capability::DeleteNames,
        Capability::AddGroups,
        Capability::ChangeGroups,
        Capability::DeleteGroups,
        Capability::AddGrants,
        Capability::ChangeGrants,
        Capability::DeleteGrants,
    ];

    /// The capability gating creation (and, by inherited quirk, listing)
    /// of the given entity type.
    pub fn add(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Name => Capability::AddNames,
            EntityKind::Group => Capability::AddGroups,
            EntityKind::Grant => Capability::AddGrants,
        }
    }

    /// The capability gating updates of the given entity type.
    pub fn change(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Name => Capability::ChangeNames,
            EntityKind::Group => Capability::ChangeGroups,
            EntityKind::Grant => Capability::ChangeGrants,
        }
    }

    /// The capability gating deletion of the given entity type.
    pub fn delete(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Name => Capability::DeleteNames,
            EntityKind::Group => Capability::DeleteGroups,
            EntityKind::Grant => Capability::DeleteGrants,
        }
    }

    /// The dotted string form, e.g. `name.add_names`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::AddNames => "name.add_names",
            Capability::ChangeNames => "name.change_names",
            Capability::DeleteNames => "name.delete_names",
            Capability::AddGroups => "name.add_groups",
            Capability::ChangeGroups => "name.change_groups",
            Capability::DeleteGroups => "name.delete_groups",
            Capability::AddGrants => "guardian.add_groupobjectpermission",
            Capability::ChangeGrants => "guardian.change_groupobjectpermission",
            Capability::DeleteGrants => "guardian.delete_groupobjectpermission",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Capability {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Capability::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| Error::UnknownCapability(s.to_string()))
    }
}
