//! Checker driver
//!
//! Client side of the REG/PUT/GET sub-protocols, and the three checker
//! roles built from them. Each role is one attempt; nothing is retried.

use log::{debug, info};
use std::io;

use crate::auth::{Credential, random_password};
use crate::checker::Target;
use crate::checker::connection::Connection;
use crate::config::CheckerConfig;
use crate::error::{CheckerError, WireError};
use crate::protocol::{Command, Reply};

/// Registers a fresh user and stores `flag` under it.
///
/// Returns the credential, whose `Display` form is the state token `get` needs.
pub async fn put(
    target: &Target,
    flag: &str,
    config: &CheckerConfig,
) -> Result<Credential, CheckerError> {
    if flag.contains('\n') {
        return Err(CheckerError::InvalidFlag(flag.to_string()));
    }

    let credential = Credential::generate(&mut rand::thread_rng());
    info!("Put flag '{}' to {}", flag, target);

    register(target, &credential, config).await?;
    store(target, &credential, flag, config).await?;

    Ok(credential)
}

/// Retrieves the flag stored under the credential in `state`.
///
/// Once the service has accepted GET, a rejected login or password means
/// data it previously accepted is gone, so it is CORRUPT rather than MUMBLE.
pub async fn get(target: &Target, state: &str, config: &CheckerConfig) -> Result<String, CheckerError> {
    let credential: Credential = state.parse()?;
    info!("Get flag from {}", target);

    let mut conn = Connection::open(target, config).await?;
    conn.exchange(Command::Get.as_str()).await?;

    conn.exchange(&credential.login)
        .await
        .map_err(CheckerError::corrupt_on_mismatch)?;
    conn.exchange(&credential.password)
        .await
        .map_err(CheckerError::corrupt_on_mismatch)?;

    let Some(first) = conn.receive().await.map_err(malformed_payload)? else {
        return Err(CheckerError::MalformedFlag(String::new()));
    };
    // A flag whose value is literally NOOK is still followed by OK.
    match conn.receive().await {
        Ok(Some(line)) if Reply::parse(&line) == Some(Reply::Ok) => Ok(first),
        _ if Reply::parse(&first) == Some(Reply::Nook) => Err(CheckerError::FlagMissing),
        Ok(_) => Err(CheckerError::MalformedFlag(first)),
        Err(e) => Err(malformed_payload(e)),
    }
}

/// Immediate read-after-write check with a random payload.
pub async fn chk(target: &Target, config: &CheckerConfig) -> Result<(), CheckerError> {
    info!("Check status of {}", target);

    let data = random_password(&mut rand::thread_rng());
    let credential = put(target, &data, config).await?;
    let received = get(target, &credential.to_string(), config).await?;

    if received != data {
        return Err(CheckerError::Mismatch {
            sent: data,
            received,
        });
    }

    Ok(())
}

async fn register(
    target: &Target,
    credential: &Credential,
    config: &CheckerConfig,
) -> Result<(), CheckerError> {
    let mut conn = Connection::open(target, config).await?;

    conn.exchange(Command::Reg.as_str()).await?;
    conn.exchange(&credential.login).await?;
    conn.exchange(&credential.password).await?;

    debug!("Registered {}", credential.login);
    Ok(())
}

async fn store(
    target: &Target,
    credential: &Credential,
    flag: &str,
    config: &CheckerConfig,
) -> Result<(), CheckerError> {
    let mut conn = Connection::open(target, config).await?;

    conn.exchange(Command::Put.as_str()).await?;
    conn.exchange(&credential.login).await?;
    conn.exchange(&credential.password).await?;
    conn.exchange(flag).await?;

    debug!("Stored flag for {}", credential.login);
    Ok(())
}

/// A cut-off or oversized flag reply is a damaged payload; timeouts stay MUMBLE.
fn malformed_payload(error: WireError) -> CheckerError {
    match &error {
        WireError::Io(e)
            if matches!(
                e.kind(),
                io::ErrorKind::UnexpectedEof | io::ErrorKind::InvalidData
            ) =>
        {
            CheckerError::Corrupt(error)
        }
        _ => CheckerError::from(error),
    }
}
