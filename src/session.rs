// MIT License - Copyright (c) the tenmicronsync authors
// Rust translation of tenmicronsync.py

use tokio::sync::watch;
use tokio::time::{sleep, Duration};
use tracing::{debug, error, info, warn};

use crate::config::SessionConfig;
use crate::error::{MountError, Result};
use crate::protocol::{decode_value, is_accepted, Command};
use crate::transport::DirectTcpTransport;

/// Connection state of a [`MountSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connected,
    /// Terminal; entered through [`MountSession::shutdown`].
    Closed,
}

/// Owns the connection to the mount and speaks its command protocol.
///
/// Every exchange is strictly one command followed by one response. When
/// the connection is lost mid-exchange the session reconnects and issues the
/// same command again, up to `command_attempts` attempts in total. A failed
/// `connect()` (all `connect_attempts` refused or timed out) is fatal to the
/// operation that triggered it.
///
/// # Example
///
/// ```no_run
/// use tenmicron_sync::{MountSession, SessionConfig};
///
/// # async fn run() -> tenmicron_sync::Result<()> {
/// let config = SessionConfig::builder().host("192.168.1.40").build();
/// let mut session = MountSession::new(config);
/// session.connect().await?;
///
/// if session.set_temperature(7.0).await? {
///     println!("Mount reports {:?} C", session.get_temperature().await?);
/// }
/// session.shutdown().await;
/// # Ok(())
/// # }
/// ```
pub struct MountSession {
    config: SessionConfig,
    transport: Option<DirectTcpTransport>,
    closed: bool,
    shutdown_rx: Option<watch::Receiver<bool>>,
}

impl MountSession {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            transport: None,
            closed: false,
            shutdown_rx: None,
        }
    }

    /// Bind the session to a shutdown signal. Once the signal reads `true`,
    /// every new connect attempt or command attempt fails with
    /// [`MountError::Cancelled`].
    pub fn with_shutdown(mut self, shutdown_rx: watch::Receiver<bool>) -> Self {
        self.shutdown_rx = Some(shutdown_rx);
        self
    }

    pub fn state(&self) -> SessionState {
        if self.closed {
            SessionState::Closed
        } else if self.transport.is_some() {
            SessionState::Connected
        } else {
            SessionState::Disconnected
        }
    }

    pub fn is_connected(&self) -> bool {
        self.state() == SessionState::Connected
    }

    fn ensure_active(&self) -> Result<()> {
        if self.closed {
            return Err(MountError::Closed);
        }
        if self.shutdown_rx.as_ref().is_some_and(|rx| *rx.borrow()) {
            return Err(MountError::Cancelled);
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Connection lifecycle
    // -----------------------------------------------------------------------

    /// Open a connection to the mount, replacing any existing one.
    ///
    /// Tries up to `connect_attempts` times. Fails with
    /// [`MountError::ConnectFailed`] carrying the last error when every
    /// attempt failed.
    pub async fn connect(&mut self) -> Result<()> {
        self.ensure_active()?;
        self.close().await;

        let attempts = self.config.connect_attempts;
        let mut last_error = None;

        for attempt in 1..=attempts {
            if attempt > 1 {
                self.ensure_active()?;
                if self.config.reconnect_delay_ms > 0 {
                    sleep(Duration::from_millis(self.config.reconnect_delay_ms)).await;
                }
            }

            match DirectTcpTransport::connect(&self.config).await {
                Ok(transport) => {
                    self.transport = Some(transport);
                    info!(
                        "Connected to {} on port {}.",
                        self.config.host, self.config.port
                    );
                    return Ok(());
                }
                Err(e) => {
                    warn!("Attempt {}: An error occurred: {}", attempt, e);
                    last_error = Some(e);
                }
            }
        }

        let source = last_error.unwrap_or(MountError::Disconnected);
        error!(
            "Failed to connect to {} after {} attempts: {}",
            self.config.endpoint(),
            attempts,
            source
        );
        Err(MountError::ConnectFailed {
            attempts,
            source: Box::new(source),
        })
    }

    /// Close the connection if there is one. Safe to call repeatedly.
    pub async fn close(&mut self) {
        if let Some(transport) = self.transport.take() {
            transport.shutdown().await;
            info!("Connection closed.");
        }
    }

    /// Close the connection and refuse any further use of the session.
    pub async fn shutdown(&mut self) {
        self.close().await;
        self.closed = true;
    }

    // -----------------------------------------------------------------------
    // Command exchange
    // -----------------------------------------------------------------------

    /// Send a command and wait for its single response.
    ///
    /// Connection loss (write error, read error, timeout or end-of-stream)
    /// triggers a reconnect and a full resend of the same command.
    pub async fn send_command(&mut self, command: &Command) -> Result<String> {
        let wire = command.to_wire_string();
        let budget = self.config.command_attempts;
        let mut attempt = 0;

        loop {
            attempt += 1;
            self.ensure_active()?;
            if self.transport.is_none() {
                self.connect().await?;
            }

            match self.exchange(&wire).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_retryable() => {
                    warn!("Connection lost while sending {}: {}", wire, e);
                    self.close().await;
                    if attempt >= budget {
                        error!("Giving up on {} after {} attempts", wire, attempt);
                        return Err(MountError::RetriesExhausted {
                            command: wire,
                            attempts: attempt,
                            source: Box::new(e),
                        });
                    }
                    info!("Reconnecting to resend {}", wire);
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Read one response from the current connection.
    ///
    /// On connection loss the session reconnects and retries the read only;
    /// nothing is written.
    pub async fn receive_response(&mut self) -> Result<String> {
        let budget = self.config.command_attempts;
        let mut attempt = 0;

        loop {
            attempt += 1;
            self.ensure_active()?;
            if self.transport.is_none() {
                self.connect().await?;
            }

            let transport = self.transport.as_mut().ok_or(MountError::Disconnected)?;
            match transport.read_response().await {
                Ok(response) => {
                    debug!("Received response: {:?}", response);
                    return Ok(response);
                }
                Err(e) if e.is_retryable() => {
                    warn!("Connection lost while receiving: {}", e);
                    self.close().await;
                    if attempt >= budget {
                        error!("Giving up on receive after {} attempts", attempt);
                        return Err(MountError::RetriesExhausted {
                            command: "<receive>".to_string(),
                            attempts: attempt,
                            source: Box::new(e),
                        });
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn exchange(&mut self, wire: &str) -> Result<String> {
        let transport = self.transport.as_mut().ok_or(MountError::Disconnected)?;
        debug!("Sending command: {}", wire);
        transport.send(wire).await?;
        let response = transport.read_response().await?;
        debug!("Received response for {}: {:?}", wire, response);
        Ok(response)
    }

    // -----------------------------------------------------------------------
    // Refraction parameters
    // -----------------------------------------------------------------------

    /// Write the refraction pressure. Returns whether the mount accepted it.
    pub async fn set_pressure(&mut self, hpa: f64) -> Result<bool> {
        self.set(Command::SetPressure { hpa }, "pressure").await
    }

    /// Write the refraction temperature. Returns whether the mount accepted it.
    pub async fn set_temperature(&mut self, celsius: f64) -> Result<bool> {
        self.set(Command::SetTemperature { celsius }, "temperature")
            .await
    }

    /// Read the refraction pressure. `None` when the mount's answer is not a
    /// number.
    pub async fn get_pressure(&mut self) -> Result<Option<f64>> {
        self.get(Command::GetPressure, "pressure").await
    }

    /// Read the refraction temperature. `None` when the mount's answer is not
    /// a number.
    pub async fn get_temperature(&mut self) -> Result<Option<f64>> {
        self.get(Command::GetTemperature, "temperature").await
    }

    async fn set(&mut self, command: Command, what: &str) -> Result<bool> {
        let response = self.send_command(&command).await?;
        let accepted = is_accepted(&response);
        if accepted {
            info!("Mount accepted {} ({})", what, command.to_wire_string());
        } else {
            warn!(
                "Mount rejected {} ({}): response {:?}",
                what,
                command.to_wire_string(),
                response
            );
        }
        Ok(accepted)
    }

    async fn get(&mut self, command: Command, what: &str) -> Result<Option<f64>> {
        let response = self.send_command(&command).await?;
        let value = decode_value(&response);
        if value.is_none() {
            warn!("Invalid {} response from mount: {:?}", what, response);
        }
        Ok(value)
    }
}
