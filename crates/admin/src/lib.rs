//! Permission-gated CRUD handlers for names, groups, and permission
//! grants.
//!
//! This crate is the seam between the capability layer ([`policy`]) and
//! persistence ([`storage`]). Each operation follows the same contract:
//!
//! 1. Check the acting principal's capability; denial short-circuits
//!    before any data access.
//! 2. Validate the submitted form; failures echo field-level errors and
//!    persist nothing.
//! 3. Perform the storage operation.
//!
//! Delete is the one exception to plain error propagation: once past the
//! capability gate, failures are caught and reported in-band as a
//! [`DeleteResponse`] with `status=false`, so the transport can always
//! answer 200 with the status blob.
//!
//! Name records carry a credential that is argon2-hashed before storage
//! (see [`credential`]); the update form's sentinel value `"1"` keeps the
//! stored hash unchanged.

pub mod credential;
mod error;
mod forms;
mod handlers;

pub use error::{Error, Result};
pub use forms::{GrantForm, GroupForm, NameForm, ValidationErrors};
pub use handlers::{
    create_grant, create_group, create_name, delete_grants, delete_groups, delete_names,
    list_grants, list_groups, list_names, update_grant, update_group, update_name,
    DeleteRequest, DeleteResponse,
};
