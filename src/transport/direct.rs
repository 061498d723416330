// MIT License - Copyright (c) the tenmicronsync authors
// Rust translation of tenmicronsync.py

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, error};

use crate::config::SessionConfig;
use crate::constants::RESPONSE_BUFFER_SIZE;
use crate::error::{MountError, Result};

/// One open TCP connection to the mount.
///
/// The link knows nothing about retries; it performs single writes and
/// single reads, each bounded by the configured I/O timeout, and reports
/// any failure to the session that owns it.
pub struct DirectTcpTransport {
    stream: TcpStream,
    io_timeout: std::time::Duration,
}

impl DirectTcpTransport {
    /// Open a TCP connection to the configured endpoint.
    pub async fn connect(config: &SessionConfig) -> Result<Self> {
        let endpoint = config.endpoint();
        debug!("Opening TCP connection to {}", endpoint);

        let stream = match timeout(config.connect_timeout(), TcpStream::connect(&endpoint)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                error!("TCP connect to {} failed: {}", endpoint, e);
                return Err(MountError::Io(e));
            }
            Err(_) => {
                error!("TCP connect to {} timed out", endpoint);
                return Err(MountError::Timeout {
                    operation: "connect",
                });
            }
        };

        // Commands are tiny; don't let Nagle hold them back.
        let _ = stream.set_nodelay(true);

        Ok(Self {
            stream,
            io_timeout: config.io_timeout(),
        })
    }

    /// Write one command in a single write.
    pub async fn send(&mut self, command: &str) -> Result<()> {
        let io_timeout = self.io_timeout;
        let stream = &mut self.stream;
        let write = async move {
            stream.write_all(command.as_bytes()).await?;
            stream.flush().await
        };
        match timeout(io_timeout, write).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(MountError::Io(e)),
            Err(_) => Err(MountError::Timeout { operation: "write" }),
        }
    }

    /// Read one response: a single read of up to `RESPONSE_BUFFER_SIZE`
    /// bytes, decoded as text and trimmed.
    ///
    /// End-of-stream means the mount dropped the connection.
    pub async fn read_response(&mut self) -> Result<String> {
        let mut buf = [0u8; RESPONSE_BUFFER_SIZE];
        let n = match timeout(self.io_timeout, self.stream.read(&mut buf)).await {
            Ok(Ok(0)) => return Err(MountError::Disconnected),
            Ok(Ok(n)) => n,
            Ok(Err(e)) => return Err(MountError::Io(e)),
            Err(_) => return Err(MountError::Timeout { operation: "read" }),
        };
        Ok(String::from_utf8_lossy(&buf[..n]).trim().to_string())
    }

    /// Close the connection. Errors are ignored: the socket is released
    /// either way once `self` is dropped.
    pub async fn shutdown(mut self) {
        let _ = self.stream.shutdown().await;
    }
}
