// MIT License - Copyright (c) the tenmicronsync authors
// Rust translation of tenmicronsync.py

use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::config::SyncOptions;
use crate::error::Result;
use crate::session::MountSession;
use crate::weather::{Reading, WeatherSource};

/// Values read back from the mount after a write.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Readback {
    pub temperature: Option<f64>,
    pub pressure: Option<f64>,
}

/// What happened during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TickReport {
    /// `None` when the weather source had no data this tick.
    pub reading: Option<Reading>,
    /// Whether the mount accepted the temperature; `None` if not written.
    pub temperature_set: Option<bool>,
    /// Whether the mount accepted the pressure; `None` if not written.
    pub pressure_set: Option<bool>,
    pub readback: Option<Readback>,
}

/// Polls a weather source and forwards each reading to the mount.
pub struct SyncLoop<W> {
    weather: W,
    session: MountSession,
    options: SyncOptions,
}

impl<W: WeatherSource> SyncLoop<W> {
    pub fn new(weather: W, session: MountSession, options: SyncOptions) -> Self {
        Self {
            weather,
            session,
            options,
        }
    }

    pub fn session(&self) -> &MountSession {
        &self.session
    }

    /// Run one poll/write/verify cycle.
    ///
    /// Missing weather data and rejected writes are reported in the
    /// returned [`TickReport`]; only fatal mount errors are returned as `Err`.
    pub async fn tick(&mut self) -> Result<TickReport> {
        let reading = match self.weather.fetch().await {
            Ok(reading) => reading,
            Err(e) => {
                error!("No valid weather data received from NINA: {}", e);
                return Ok(TickReport::default());
            }
        };

        info!("Temperature from NINA: {} °C", reading.temperature);
        info!("Pressure from NINA: {} hPa", reading.pressure);

        let mut report = TickReport {
            reading: Some(reading),
            ..TickReport::default()
        };
        if !self.options.sync {
            return Ok(report);
        }

        report.temperature_set = Some(self.session.set_temperature(reading.temperature).await?);
        report.pressure_set = Some(self.session.set_pressure(reading.pressure).await?);

        if self.options.verify {
            let readback = Readback {
                temperature: self.session.get_temperature().await?,
                pressure: self.session.get_pressure().await?,
            };
            match readback.temperature {
                Some(t) => info!("Temperature from mount: {} °C", t),
                None => warn!("Temperature from mount unavailable"),
            }
            match readback.pressure {
                Some(p) => info!("Pressure from mount: {} hPa", p),
                None => warn!("Pressure from mount unavailable"),
            }
            report.readback = Some(readback);
        }

        Ok(report)
    }

    /// Tick forever, sleeping `interval` between ticks, until `shutdown`
    /// turns `true` or a fatal mount error occurs.
    ///
    /// The mount session is shut down on every exit path. A shutdown request
    /// is not an error.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        let result = self.run_until_shutdown(&mut shutdown).await;
        self.session.shutdown().await;
        match result {
            Err(e) if e.is_cancelled() => {
                info!("Sync stopped by shutdown request");
                Ok(())
            }
            other => other,
        }
    }

    async fn run_until_shutdown(&mut self, shutdown: &mut watch::Receiver<bool>) -> Result<()> {
        if self.options.sync {
            tokio::select! {
                connected = self.session.connect() => connected?,
                _ = wait_for_shutdown(shutdown) => return Ok(()),
            }
        } else {
            info!("Sync disabled; polling weather only");
        }

        loop {
            if *shutdown.borrow() {
                return Ok(());
            }

            tokio::select! {
                report = self.tick() => {
                    report?;
                }
                _ = wait_for_shutdown(shutdown) => {
                    info!("Shutdown requested during tick");
                    return Ok(());
                }
            }

            tokio::select! {
                _ = sleep(self.options.interval) => {}
                _ = wait_for_shutdown(shutdown) => return Ok(()),
            }
        }
    }
}

/// Resolves once the shutdown flag is set. Never resolves if the sender is
/// gone without having set it.
async fn wait_for_shutdown(shutdown: &mut watch::Receiver<bool>) {
    if shutdown.wait_for(|stop| *stop).await.is_err() {
        std::future::pending::<()>().await;
    }
}
