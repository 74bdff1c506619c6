//! SQLite-backed persistence for the admin service.
//!
//! This crate owns the three relational tables the service manages and
//! nothing else — no permission logic, no validation, no hashing. Callers
//! hand it already-validated field structs and get records back.
//!
//! # Core concepts
//!
//! ## AdminStore
//!
//! The [`AdminStore`] wraps a SQLite connection and exposes the CRUD
//! surface per table: `list_*` (ordered by id ascending), `get_*`,
//! `insert_*`, `update_*`, `delete_*` (single id, fails on a missing row)
//! and `delete_*_in` (id set).
//!
//! ## Records and fields
//!
//! Each table has a record type carrying the generated id and creation
//! timestamp ([`NameRecord`], [`GroupRecord`], [`GrantRecord`]) and a
//! plain field struct for writes ([`NameFields`], [`GroupFields`],
//! [`GrantFields`]). Name records store only the salted hash of the
//! credential, never plaintext.
//!
//! ## Bulk deletion
//!
//! `delete_*_in` binds every id as a placeholder via
//! `params_from_iter`. Identifier sets never reach the SQL text, so a
//! hostile id list cannot change the statement.
//!
//! # Example
//!
//! ```no_run
//! use storage::{AdminStore, GroupFields};
//!
//! let store = AdminStore::open("muster.db")?;
//! let group = store.insert_group(GroupFields {
//!     name: "operators".into(),
//!     description: None,
//! })?;
//! println!("created group {}", group.id);
//! # Ok::<(), storage::Error>(())
//! ```

mod error;
mod record;
mod store;

pub use error::{Error, Result};
pub use record::{
    GrantFields, GrantId, GrantRecord, GroupFields, GroupId, GroupRecord, NameFields, NameId,
    NameRecord,
};
pub use store::AdminStore;
