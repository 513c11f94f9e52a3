use std::io;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::debug;

use crate::error::RpcError;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 60401;

/// Where to reach the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
}

impl ClientConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_PORT)
    }
}

/// A persistent line-oriented stream to one server.
///
/// The read buffer lives as long as the connection, so bytes received past
/// one line delimiter are kept for the next `receive`. There is no read
/// timeout: a server that never answers blocks the caller.
pub struct Connection<S = TcpStream> {
    stream: BufReader<S>,
    peer: String,
}

impl Connection<TcpStream> {
    /// Open a TCP connection. Resolution, refusal and other socket errors
    /// all surface as `RpcError::Connect`; nothing is retried.
    pub async fn connect(config: &ClientConfig) -> Result<Self, RpcError> {
        let addr = config.address();
        let connected = TcpStream::connect(addr.as_str()).await;
        let stream = match connected {
            Ok(stream) => stream,
            Err(source) => return Err(RpcError::Connect { addr, source }),
        };
        if let Err(source) = stream.set_nodelay(true) {
            return Err(RpcError::Connect { addr, source });
        }
        debug!(peer = %addr, "connected");
        Ok(Self::new(stream, addr))
    }
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, peer: impl Into<String>) -> Self {
        Self {
            stream: BufReader::new(stream),
            peer: peer.into(),
        }
    }

    pub fn peer(&self) -> &str {
        &self.peer
    }

    /// Write one newline-terminated request.
    pub async fn send(&mut self, request: &[u8]) -> Result<(), RpcError> {
        if request.last() != Some(&b'\n') {
            return Err(RpcError::Write(io::Error::new(
                io::ErrorKind::InvalidInput,
                "request must end with a newline",
            )));
        }
        let writer = self.stream.get_mut();
        writer.write_all(request).await.map_err(RpcError::Write)?;
        writer.flush().await.map_err(RpcError::Write)
    }

    /// Wait for the next full line and return it without its delimiter.
    pub async fn receive(&mut self) -> Result<Vec<u8>, RpcError> {
        let mut line = Vec::new();
        let n = self
            .stream
            .read_until(b'\n', &mut line)
            .await
            .map_err(RpcError::Read)?;

        if n == 0 || line.last() != Some(&b'\n') {
            return Err(RpcError::Read(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "connection to {} closed before a full response line",
                    self.peer
                ),
            )));
        }

        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        Ok(line)
    }
}
