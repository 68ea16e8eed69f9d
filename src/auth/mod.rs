//! Authentication
//!
//! Credential generation and state tokens for the checker, and the user
//! table plus login/password validation for the service.

pub mod credentials;
pub mod store;
pub mod validator;

pub use credentials::{Credential, random_login, random_password};
pub use store::UserTable;
pub use validator::{validate_password, validate_user};
