//! Permission-gated CRUD handlers, one set per entity type.
//!
//! Every handler checks the acting principal's capability before touching
//! the store. Create and update validate their form first and persist
//! nothing on validation failure. Delete handlers return an in-band
//! [`DeleteResponse`] once past the capability gate: deletion failures are
//! caught and reported as `status=false`, never propagated.

use policy::{Capability, Principal};
use serde::{Deserialize, Serialize};
use storage::{
    AdminStore, GrantFields, GrantId, GrantRecord, GroupFields, GroupId, GroupRecord, NameFields,
    NameId, NameRecord,
};
use tracing::{info, warn};

use crate::credential::{self, KEEP_SENTINEL};
use crate::forms::{GrantForm, GroupForm, NameForm};
use crate::Result;

/// A delete submission: a single id (`nid`) or a set of ids (`id`).
///
/// When both are present the single id wins, matching the form contract
/// of the delete endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeleteRequest {
    pub nid: Option<i64>,
    #[serde(default)]
    pub id: Vec<i64>,
}

impl DeleteRequest {
    pub fn single(id: i64) -> Self {
        Self {
            nid: Some(id),
            id: Vec::new(),
        }
    }

    pub fn many(ids: impl Into<Vec<i64>>) -> Self {
        Self {
            nid: None,
            id: ids.into(),
        }
    }
}

/// In-band result of a delete operation.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    pub status: bool,
    pub error: Option<String>,
}

impl DeleteResponse {
    fn ok() -> Self {
        Self {
            status: true,
            error: None,
        }
    }

    fn failed(message: impl Into<String>) -> Self {
        Self {
            status: false,
            error: Some(message.into()),
        }
    }
}

// --- names ---

/// List all name records. Gated on the add capability; the list view
/// never had its own (see the policy crate docs).
pub fn list_names(principal: &Principal, store: &AdminStore) -> Result<Vec<NameRecord>> {
    principal.require(Capability::AddNames)?;
    Ok(store.list_names()?)
}

/// Create a name record. Whatever password is submitted — the update
/// sentinel included — is hashed before storage; `"1"` only means "keep"
/// on the update path.
pub fn create_name(
    principal: &Principal,
    store: &AdminStore,
    form: &NameForm,
) -> Result<NameRecord> {
    principal.require(Capability::AddNames)?;
    form.validate()?;

    let record = store
        .insert_name(NameFields {
            username: form.username.clone(),
            full_name: form.full_name.clone(),
            email: form.email_or_none(),
            password_hash: credential::hash_password(&form.password)?,
        })
        .map_err(|e| duplicate_field(e, "username"))?;
    info!(id = %record.id, username = %record.username, "name created");
    Ok(record)
}

/// Update a name record. A password equal to the sentinel keeps the
/// stored hash unchanged; any other value replaces it with a fresh hash.
pub fn update_name(
    principal: &Principal,
    store: &AdminStore,
    id: NameId,
    form: &NameForm,
) -> Result<NameRecord> {
    principal.require(Capability::ChangeNames)?;
    form.validate()?;

    let existing = store.get_name(id)?;
    let password_hash = if form.password == KEEP_SENTINEL {
        existing.password_hash
    } else {
        credential::hash_password(&form.password)?
    };

    let record = store
        .update_name(
            id,
            NameFields {
                username: form.username.clone(),
                full_name: form.full_name.clone(),
                email: form.email_or_none(),
                password_hash,
            },
        )
        .map_err(|e| duplicate_field(e, "username"))?;
    info!(id = %record.id, "name updated");
    Ok(record)
}

/// Delete one name or a set of names.
pub fn delete_names(
    principal: &Principal,
    store: &AdminStore,
    request: &DeleteRequest,
) -> Result<DeleteResponse> {
    principal.require(Capability::DeleteNames)?;
    Ok(run_delete(
        "name",
        request,
        |id| store.delete_name(NameId(id)),
        |ids| store.delete_names_in(&ids.iter().copied().map(NameId).collect::<Vec<_>>()),
    ))
}

// --- groups ---

/// List all group records. Same add-capability gate as names.
pub fn list_groups(principal: &Principal, store: &AdminStore) -> Result<Vec<GroupRecord>> {
    principal.require(Capability::AddGroups)?;
    Ok(store.list_groups()?)
}

pub fn create_group(
    principal: &Principal,
    store: &AdminStore,
    form: &GroupForm,
) -> Result<GroupRecord> {
    principal.require(Capability::AddGroups)?;
    form.validate()?;

    let record = store
        .insert_group(GroupFields {
            name: form.name.clone(),
            description: form.description_or_none(),
        })
        .map_err(|e| duplicate_field(e, "name"))?;
    info!(id = %record.id, name = %record.name, "group created");
    Ok(record)
}

pub fn update_group(
    principal: &Principal,
    store: &AdminStore,
    id: GroupId,
    form: &GroupForm,
) -> Result<GroupRecord> {
    principal.require(Capability::ChangeGroups)?;
    form.validate()?;

    let record = store
        .update_group(
            id,
            GroupFields {
                name: form.name.clone(),
                description: form.description_or_none(),
            },
        )
        .map_err(|e| duplicate_field(e, "name"))?;
    info!(id = %record.id, "group updated");
    Ok(record)
}

pub fn delete_groups(
    principal: &Principal,
    store: &AdminStore,
    request: &DeleteRequest,
) -> Result<DeleteResponse> {
    principal.require(Capability::DeleteGroups)?;
    Ok(run_delete(
        "group",
        request,
        |id| store.delete_group(GroupId(id)),
        |ids| store.delete_groups_in(&ids.iter().copied().map(GroupId).collect::<Vec<_>>()),
    ))
}

// --- grants ---

/// List all group-object permission grants. Gated on the add capability.
pub fn list_grants(principal: &Principal, store: &AdminStore) -> Result<Vec<GrantRecord>> {
    principal.require(Capability::AddGrants)?;
    Ok(store.list_grants()?)
}

/// Create a grant. Grants only come from explicit assignment; the store
/// rejects references to groups that do not exist.
pub fn create_grant(
    principal: &Principal,
    store: &AdminStore,
    form: &GrantForm,
) -> Result<GrantRecord> {
    principal.require(Capability::AddGrants)?;
    form.validate()?;

    let record = store.insert_grant(GrantFields {
        group_id: GroupId(form.group_id),
        capability: form.capability.clone(),
        object_pk: form.object_pk.clone(),
    })?;
    info!(id = %record.id, group = %record.group_id, "grant created");
    Ok(record)
}

pub fn update_grant(
    principal: &Principal,
    store: &AdminStore,
    id: GrantId,
    form: &GrantForm,
) -> Result<GrantRecord> {
    principal.require(Capability::ChangeGrants)?;
    form.validate()?;

    let record = store.update_grant(
        id,
        GrantFields {
            group_id: GroupId(form.group_id),
            capability: form.capability.clone(),
            object_pk: form.object_pk.clone(),
        },
    )?;
    info!(id = %record.id, "grant updated");
    Ok(record)
}

pub fn delete_grants(
    principal: &Principal,
    store: &AdminStore,
    request: &DeleteRequest,
) -> Result<DeleteResponse> {
    principal.require(Capability::DeleteGrants)?;
    Ok(run_delete(
        "grant",
        request,
        |id| store.delete_grant(GrantId(id)),
        |ids| store.delete_grants_in(&ids.iter().copied().map(GrantId).collect::<Vec<_>>()),
    ))
}

/// Turn a uniqueness conflict into a field-level validation error so the
/// caller gets the usual echo instead of a server fault. Other storage
/// errors pass through.
fn duplicate_field(e: storage::Error, field: &str) -> crate::Error {
    match e {
        storage::Error::Conflict(_) => {
            let mut errors = crate::ValidationErrors::default();
            errors.add(field, "already in use");
            crate::Error::Validation(errors)
        }
        other => crate::Error::Storage(other),
    }
}

/// Shared delete body. Runs after the capability gate, so every failure
/// here is reported in-band instead of propagated.
fn run_delete(
    kind: &str,
    request: &DeleteRequest,
    delete_one: impl FnOnce(i64) -> storage::Result<()>,
    delete_many: impl FnOnce(&[i64]) -> storage::Result<usize>,
) -> DeleteResponse {
    let outcome = match request.nid {
        Some(id) => delete_one(id),
        None if request.id.is_empty() => {
            Err(storage::Error::NotFound("no identifiers supplied".into()))
        }
        None => delete_many(&request.id).map(|_| ()),
    };

    match outcome {
        Ok(()) => {
            info!(kind, "delete succeeded");
            DeleteResponse::ok()
        }
        Err(e) => {
            warn!(kind, error = %e, "delete failed");
            DeleteResponse::failed(format!("delete request failed: {e}"))
        }
    }
}
