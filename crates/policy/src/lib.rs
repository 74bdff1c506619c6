//! Capability-based access control for the admin service.
//!
//! Core principle: **every mutating operation names a capability, and the
//! acting principal must hold it before any data access happens.**
//!
//! Note: list operations are gated on the `add` capability of their entity
//! type rather than a dedicated view capability. That is inherited behavior,
//! kept deliberately; introducing a read capability is a stakeholder
//! decision, not a silent fix.

mod capability;
mod error;
mod principal;

pub use capability::{Capability, EntityKind};
pub use error::{Error, Result};
pub use principal::{has_capability, Decision, Principal};
