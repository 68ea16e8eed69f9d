//! Checker credentials
//!
//! Generates throwaway login/password pairs and round-trips them through the
//! `login:password` state token.

use rand::Rng;
use rand::seq::SliceRandom;
use std::fmt;
use std::str::FromStr;

use crate::error::StateTokenError;

pub const LOGIN_LENGTH: usize = 10;
pub const PASSWORD_LENGTH: usize = 10;

const STATE_SEPARATOR: char = ':';

/// A login/password pair registered with the service by `put`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub login: String,
    pub password: String,
}

impl Credential {
    pub fn new(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            password: password.into(),
        }
    }

    /// Fresh random credential.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            login: random_login(rng),
            password: random_password(rng),
        }
    }
}

/// Formats as the state token `login:password`.
impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.login, STATE_SEPARATOR, self.password)
    }
}

/// Parses a state token. Exactly one `:` is required and neither half may
/// contain a line terminator, since both go on the wire as single lines.
impl FromStr for Credential {
    type Err = StateTokenError;

    fn from_str(state: &str) -> Result<Self, Self::Err> {
        if state.contains(['\n', '\r']) {
            return Err(StateTokenError::Unframeable(state.to_string()));
        }

        let (login, password) = state
            .split_once(STATE_SEPARATOR)
            .ok_or(StateTokenError::MissingSeparator)?;

        if password.contains(STATE_SEPARATOR) {
            return Err(StateTokenError::ExtraSeparator);
        }

        Ok(Credential::new(login, password))
    }
}

/// Ten distinct ASCII letters in random order.
pub fn random_login<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut letters: Vec<char> = ('a'..='z').chain('A'..='Z').collect();
    letters.shuffle(rng);
    letters[..LOGIN_LENGTH].iter().collect()
}

/// Ten decimal digits, never starting with zero.
pub fn random_password<R: Rng + ?Sized>(rng: &mut R) -> String {
    rng.gen_range(1_000_000_000u64..=9_999_999_999u64)
        .to_string()
}
