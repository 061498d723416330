// MIT License - Copyright (c) the tenmicronsync authors
// Rust translation of tenmicronsync.py
//
//! # tenmicron-sync
//!
//! Keeps the atmospheric-refraction model of a 10Micron mount current with
//! the ambient temperature and pressure reported by N.I.N.A.
//!
//! The mount is driven over its line-oriented TCP command protocol
//! (port 3490) by a [`MountSession`], which owns the single connection,
//! reconnects on connection loss, and formats values exactly as the
//! firmware expects. Weather readings come from any [`WeatherSource`];
//! [`NinaWeather`] polls the N.I.N.A. equipment API. [`SyncLoop`] ties the
//! two together on a fixed interval.
//!
//! ## Quick Start
//!
//! ```no_run
//! use tenmicron_sync::{MountSession, NinaWeather, SessionConfig, SyncLoop, SyncOptions, WeatherConfig};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!     tokio::spawn(async move {
//!         let _ = tokio::signal::ctrl_c().await;
//!         let _ = shutdown_tx.send(true);
//!     });
//!
//!     let weather = NinaWeather::new(&WeatherConfig::default())?;
//!     let session = MountSession::new(SessionConfig::builder().host("192.168.1.40").build())
//!         .with_shutdown(shutdown_rx.clone());
//!
//!     let mut sync = SyncLoop::new(weather, session, SyncOptions::default());
//!     sync.run(shutdown_rx).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod protocol;
pub mod session;
pub mod sync;
pub mod transport;
pub mod weather;

// Re-exports for convenience
pub use config::{SessionConfig, SessionConfigBuilder, SyncOptions, WeatherConfig};
pub use error::{MountError, Result, WeatherError};
pub use protocol::{encode_set_pressure, encode_set_temperature, Command};
pub use session::{MountSession, SessionState};
pub use sync::{Readback, SyncLoop, TickReport};
pub use weather::{NinaWeather, Reading, WeatherSource};
