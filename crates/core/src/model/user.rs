use serde::{Deserialize, Serialize};

use crate::model::ids::UserId;

/// An authenticated account as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub is_verified: bool,
    pub avatar: Option<String>,
}

impl User {
    /// Name to show in greetings, falling back to the email's local part.
    #[must_use]
    pub fn display_name(&self) -> &str {
        let name = self.name.trim();
        if !name.is_empty() {
            return name;
        }
        self.email.split('@').next().unwrap_or(&self.email)
    }
}

/// Profile handed over by a Google sign-in flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleProfile {
    pub name: String,
    pub email: String,
    pub google_id: String,
    pub avatar: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str, email: &str) -> User {
        User {
            id: UserId::new("u1").unwrap(),
            name: name.to_owned(),
            email: email.to_owned(),
            is_verified: true,
            avatar: None,
        }
    }

    #[test]
    fn display_name_prefers_name() {
        assert_eq!(user("Ada", "ada@example.com").display_name(), "Ada");
    }

    #[test]
    fn display_name_falls_back_to_email_local_part() {
        assert_eq!(user("  ", "grace@example.com").display_name(), "grace");
    }
}
