//! Checker connection
//!
//! One client connection to the checked service. Connecting and every read
//! or write are bounded by the configured timeouts, so a stalled or hung
//! service is classified instead of hanging the checker.

use log::debug;
use std::future::Future;
use std::io;
use std::time::Duration;
use tokio::io::BufReader;
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};

use crate::checker::Target;
use crate::config::CheckerConfig;
use crate::error::WireError;
use crate::protocol::{Reply, read_token, write_token};

pub struct Connection {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
    io_timeout: Duration,
    max_line_length: usize,
}

impl Connection {
    pub async fn open(target: &Target, config: &CheckerConfig) -> Result<Self, WireError> {
        let addr = target.to_string();
        let limit = config.connect_timeout();

        let stream = match tokio::time::timeout(limit, TcpStream::connect(target.socket_addr())).await
        {
            Ok(Ok(stream)) => stream,
            Ok(Err(source)) if source.kind() == io::ErrorKind::ConnectionRefused => {
                return Err(WireError::Refused { addr, source });
            }
            Ok(Err(e)) => return Err(WireError::Io(e)),
            Err(_) => return Err(WireError::ConnectTimeout { addr, after: limit }),
        };
        debug!("Connected to {}", addr);

        let (read_half, write_half) = stream.into_split();
        Ok(Self {
            reader: BufReader::new(read_half),
            writer: write_half,
            io_timeout: config.io_timeout(),
            max_line_length: config.max_line_length,
        })
    }

    pub async fn send(&mut self, token: &str) -> Result<(), WireError> {
        debug!("> {}", token);
        let limit = self.io_timeout;
        bounded(limit, write_token(&mut self.writer, token)).await
    }

    /// Next line, or `None` if the service closed the connection.
    pub async fn receive(&mut self) -> Result<Option<String>, WireError> {
        let limit = self.io_timeout;
        let max = self.max_line_length;
        let line = bounded(limit, read_token(&mut self.reader, max)).await?;
        debug!("< {:?}", line);
        Ok(line)
    }

    /// Reads one line and requires it to be exactly `expected`.
    pub async fn expect(&mut self, expected: Reply) -> Result<(), WireError> {
        match self.receive().await? {
            Some(line) if Reply::parse(&line) == Some(expected) => Ok(()),
            received => Err(WireError::UnexpectedReply { expected, received }),
        }
    }

    /// Sends `token` and expects `OK` back.
    pub async fn exchange(&mut self, token: &str) -> Result<(), WireError> {
        self.send(token).await?;
        self.expect(Reply::Ok).await
    }
}

async fn bounded<T, F>(limit: Duration, op: F) -> Result<T, WireError>
where
    F: Future<Output = io::Result<T>>,
{
    match tokio::time::timeout(limit, op).await {
        Ok(result) => Ok(result?),
        Err(_) => Err(WireError::Timeout(limit)),
    }
}
