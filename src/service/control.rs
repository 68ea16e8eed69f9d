//! Fault-injection client
//!
//! Sends one test-only command to a running service and waits until the
//! service has acted on it.

use log::info;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, ToSocketAddrs};

use crate::protocol::{FaultCommand, write_token};

/// Sends `command` and waits for the service to close the connection.
///
/// The service serves connections in order, so anything connecting after
/// this returns sees the new fault state. Bytes the service sends back
/// (the NOOK after SLEEP) are discarded.
pub async fn send_fault_command<A>(addr: A, command: FaultCommand) -> std::io::Result<()>
where
    A: ToSocketAddrs,
{
    let mut stream = TcpStream::connect(addr).await?;
    info!("Sending {} to {}", command, stream.peer_addr()?);

    write_token(&mut stream, command.as_str()).await?;
    stream.shutdown().await?;

    let mut discard = Vec::new();
    stream.read_to_end(&mut discard).await?;
    Ok(())
}
