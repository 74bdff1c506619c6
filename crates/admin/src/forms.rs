//! Input forms and field-level validation.

use std::collections::BTreeMap;

use policy::Capability;
use serde::{Deserialize, Serialize};

/// Field-level validation failures, keyed by field name.
///
/// The map is ordered so error output is stable for a given form.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationErrors {
    pub fields: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Ok when no errors were recorded, Err(self) otherwise.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, messages) in &self.fields {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Submitted fields for creating or updating a name record.
#[derive(Debug, Clone, Deserialize)]
pub struct NameForm {
    pub username: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub password: String,
}

impl NameForm {
    /// Field validation shared by create and update. The sentinel value
    /// `"1"` is an ordinary credential here; only the update handler
    /// gives it its keep-the-stored-hash meaning.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if self.username.is_empty() {
            errors.add("username", "required");
        } else if !self
            .username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        {
            errors.add("username", "only letters, digits, '.', '_' and '-' allowed");
        }
        if let Some(email) = self.email.as_deref()
            && !email.is_empty()
        {
            let valid = email
                .split_once('@')
                .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
            if !valid {
                errors.add("email", "not a valid address");
            }
        }
        if self.password.is_empty() {
            errors.add("password", "required");
        }
        errors.into_result()
    }

    /// Email normalized so an empty submission reads as absent.
    pub fn email_or_none(&self) -> Option<String> {
        self.email.clone().filter(|e| !e.is_empty())
    }
}

/// Submitted fields for creating or updating a group record.
#[derive(Debug, Clone, Deserialize)]
pub struct GroupForm {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl GroupForm {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if self.name.is_empty() {
            errors.add("name", "required");
        }
        errors.into_result()
    }

    pub fn description_or_none(&self) -> Option<String> {
        self.description.clone().filter(|d| !d.is_empty())
    }
}

/// Submitted fields for creating or updating a permission grant.
#[derive(Debug, Clone, Deserialize)]
pub struct GrantForm {
    pub group_id: i64,
    pub capability: String,
    pub object_pk: String,
}

impl GrantForm {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if self.group_id <= 0 {
            errors.add("group_id", "required");
        }
        if self.capability.parse::<Capability>().is_err() {
            errors.add("capability", "unknown capability");
        }
        if self.object_pk.is_empty() {
            errors.add("object_pk", "required");
        }
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name_form(username: &str, password: &str) -> NameForm {
        NameForm {
            username: username.to_string(),
            full_name: String::new(),
            email: None,
            password: password.to_string(),
        }
    }

    #[test]
    fn valid_name_form_passes() {
        assert!(name_form("alice", "secret").validate().is_ok());
    }

    #[test]
    fn empty_username_and_password_collect_both_errors() {
        let errors = name_form("", "").validate().unwrap_err();
        assert!(errors.fields.contains_key("username"));
        assert!(errors.fields.contains_key("password"));
    }

    #[test]
    fn username_charset_enforced() {
        let errors = name_form("al ice", "pw").validate().unwrap_err();
        assert_eq!(errors.fields.keys().collect::<Vec<_>>(), vec!["username"]);
    }

    #[test]
    fn bad_email_rejected_empty_email_ignored() {
        let mut form = name_form("alice", "pw");
        form.email = Some("not-an-address".to_string());
        assert!(form.validate().is_err());

        form.email = Some(String::new());
        assert!(form.validate().is_ok());
        assert_eq!(form.email_or_none(), None);
    }

    #[test]
    fn sentinel_is_an_ordinary_value_to_validation() {
        assert!(name_form("alice", "1").validate().is_ok());
    }

    #[test]
    fn grant_form_requires_known_capability() {
        let form = GrantForm {
            group_id: 1,
            capability: "name.fly_names".to_string(),
            object_pk: "3".to_string(),
        };
        let errors = form.validate().unwrap_err();
        assert!(errors.fields.contains_key("capability"));
    }

    #[test]
    fn display_is_stable_and_readable() {
        let mut errors = ValidationErrors::default();
        errors.add("username", "required");
        errors.add("password", "required");
        assert_eq!(errors.to_string(), "password: required; username: required");
    }
}
