//! Roster: read-only identity and role lookups
//!
//! The core never authenticates anyone; it only resolves ids to display
//! names for ledger text and checks that an approver holds an approving
//! role. Account management lives outside this crate.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::core::types::UserId;

/// Roles that matter to the coordination core
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Administrator,
    Commander,
    FireDirectionOfficer,
    Logistics,
    PlatoonLeader,
    Observer,
}

impl Role {
    /// Whether this role may approve or reject pending reports
    pub fn can_approve(&self) -> bool {
        matches!(self, Role::Administrator | Role::Commander)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub display_name: String,
    pub role: Role,
    /// Chat id for mission notifications, when the user has one configured
    pub chat_id: Option<String>,
}

/// The user roster, keyed by id
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Roster {
    users: HashMap<UserId, User>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, user: User) {
        self.users.insert(user.id, user);
    }

    pub fn get(&self, id: UserId) -> Option<&User> {
        self.users.get(&id)
    }

    /// Display name for ledger text, with a generic fallback so missing
    /// users never block an operation
    pub fn display_name(&self, id: UserId) -> String {
        self.users
            .get(&id)
            .map(|u| u.display_name.clone())
            .unwrap_or_else(|| "Cdt.".to_string())
    }

    pub fn chat_id(&self, id: UserId) -> Option<&str> {
        self.users.get(&id).and_then(|u| u.chat_id.as_deref())
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_fallback() {
        let roster = Roster::new();
        assert_eq!(roster.display_name(UserId::new()), "Cdt.");
    }

    #[test]
    fn test_approver_roles() {
        assert!(Role::Commander.can_approve());
        assert!(Role::Administrator.can_approve());
        assert!(!Role::Observer.can_approve());
        assert!(!Role::PlatoonLeader.can_approve());
    }
}
