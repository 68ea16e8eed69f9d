//! Authentication validator
//!
//! Checks a login and then its password against the service's user table,
//! one step at a time as the PUT/GET sub-protocol receives them.

use super::store::UserTable;
use crate::error::AuthError;

/// Validates that the login is registered.
pub fn validate_user(users: &UserTable, login: &str) -> Result<(), AuthError> {
    if users.contains(login) {
        Ok(())
    } else {
        Err(AuthError::UserNotFound(login.to_string()))
    }
}

/// Validates that the password matches the one stored for the login.
pub fn validate_password(users: &UserTable, login: &str, password: &str) -> Result<(), AuthError> {
    match users.password(login) {
        Some(stored) if stored == password => Ok(()),
        Some(_) => Err(AuthError::InvalidPassword(login.to_string())),
        None => Err(AuthError::UserNotFound(login.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users() -> UserTable {
        let mut users = UserTable::new();
        users.register("alice", "1234567890").unwrap();
        users
    }

    #[test]
    fn test_validate_user() {
        assert!(validate_user(&users(), "alice").is_ok());
        assert_eq!(
            validate_user(&users(), "bob"),
            Err(AuthError::UserNotFound("bob".into()))
        );
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password(&users(), "alice", "1234567890").is_ok());
        assert_eq!(
            validate_password(&users(), "alice", "1234567891"),
            Err(AuthError::InvalidPassword("alice".into()))
        );
        assert_eq!(
            validate_password(&users(), "bob", "1234567890"),
            Err(AuthError::UserNotFound("bob".into()))
        );
    }
}
