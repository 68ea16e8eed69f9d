//! User table
//!
//! In-memory login → password map owned by one service instance.

use std::collections::HashMap;

use crate::error::AuthError;

#[derive(Debug, Default)]
pub struct UserTable {
    users: HashMap<String, String>,
}

impl UserTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a user. Logins are unique; an existing entry is never overwritten.
    pub fn register(&mut self, login: &str, password: &str) -> Result<(), AuthError> {
        if self.users.contains_key(login) {
            return Err(AuthError::UserExists(login.to_string()));
        }
        self.users.insert(login.to_string(), password.to_string());
        Ok(())
    }

    pub fn contains(&self, login: &str) -> bool {
        self.users.contains_key(login)
    }

    pub fn password(&self, login: &str) -> Option<&str> {
        self.users.get(login).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
