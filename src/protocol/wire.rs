//! Line framing
//!
//! Reads and writes single `\n`-terminated tokens. Both roles share these so
//! the framing stays byte-for-byte identical on either side of the socket.

use std::io;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Reads one line and strips its `\n` terminator.
///
/// Returns `Ok(None)` when the peer closed the connection before sending
/// anything. A line longer than `max_len` bytes, a line cut off by EOF, or
/// invalid UTF-8 is an error.
pub async fn read_token<R>(reader: &mut R, max_len: usize) -> io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = String::new();
    let limit = max_len as u64 + 1;
    let n = reader.take(limit).read_line(&mut line).await?;

    if n == 0 {
        return Ok(None);
    }

    if line.ends_with('\n') {
        line.pop();
        return Ok(Some(line));
    }

    if n as u64 >= limit {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("line exceeds {} bytes", max_len),
        ));
    }

    Err(io::Error::new(
        io::ErrorKind::UnexpectedEof,
        "connection closed mid-line",
    ))
}

/// Writes `token` followed by `\n` and flushes.
pub async fn write_token<W>(writer: &mut W, token: &str) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut frame = Vec::with_capacity(token.len() + 1);
    frame.extend_from_slice(token.as_bytes());
    frame.push(b'\n');
    writer.write_all(&frame).await?;
    writer.flush().await
}
