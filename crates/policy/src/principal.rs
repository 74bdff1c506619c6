//! Principals and capability checks.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{Capability, Error, Result};

/// An authenticated actor and the capabilities granted to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    pub name: String,
    #[serde(default)]
    pub capabilities: HashSet<Capability>,
}

/// Result of a capability check.
#[derive(Debug, Clone)]
pub enum Decision {
    Allow,
    Deny { reason: String },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// Pure capability check, independent of any persistence layer.
pub fn has_capability(principal: &Principal, capability: Capability) -> bool {
    principal.capabilities.contains(&capability)
}

impl Principal {
    /// Create a principal with no capabilities.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            capabilities: HashSet::new(),
        }
    }

    /// Add a capability, builder-style.
    pub fn grant(mut self, capability: Capability) -> Self {
        self.capabilities.insert(capability);
        self
    }

    /// Check a capability without failing.
    pub fn check(&self, capability: Capability) -> Decision {
        if has_capability(self, capability) {
            Decision::Allow
        } else {
            Decision::Deny {
                reason: format!("{} does not hold {capability}", self.name),
            }
        }
    }

    /// Fail with [`Error::Denied`] unless the capability is held.
    ///
    /// Callers invoke this before touching any data, so a denial leaves
    /// the store untouched.
    pub fn require(&self, capability: Capability) -> Result<()> {
        if has_capability(self, capability) {
            Ok(())
        } else {
            Err(Error::Denied {
                principal: self.name.clone(),
                capability,
            })
        }
    }
}
