use std::{convert::Infallible, net::Ipv4Addr, time::Duration};

use log::{info, trace, warn};

use crate::{
    config::{GripConfig, WifiCredentials},
    gpio::FingerSensors,
    microcontroller_src::delay::Delay,
    utils::grip_error::GripError,
    wifi::{wait_for_association, Association, Broadcaster},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// Network bring-up and server start, nothing is sampled.
    Booting,
    /// Sampling and broadcasting forever.
    Streaming,
}

/// Samples the fingers and broadcasts each frame once per iteration.
pub struct GripStreamer<S, D> {
    sensors: S,
    delay: D,
    sample_period: Duration,
    association_poll_interval: Duration,
    state: StreamState,
    frames_sent: u64,
}

impl<S: FingerSensors, D: Delay> GripStreamer<S, D> {
    pub fn new(sensors: S, delay: D, config: &GripConfig) -> Self {
        GripStreamer {
            sensors,
            delay,
            sample_period: config.sample_period,
            association_poll_interval: config.association_poll_interval,
            state: StreamState::Booting,
            frames_sent: 0,
        }
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    pub fn frames_sent(&self) -> u64 {
        self.frames_sent
    }

    /// Associates with the access point, blocking until it succeeds, then starts the
    /// server through `start_server` and switches to streaming.
    ///
    /// # Errors
    ///
    /// - `GripError::AlreadyStreaming`: If the bring-up already happened.
    /// - Any error from the wifi driver or from `start_server`. The streamer stays booting.
    pub fn boot<L, B, F>(
        &mut self,
        link: &mut L,
        credentials: &WifiCredentials,
        start_server: F,
    ) -> Result<B, GripError>
    where
        L: Association + ?Sized,
        F: FnOnce(Ipv4Addr) -> Result<B, GripError>,
    {
        if self.state == StreamState::Streaming {
            return Err(GripError::AlreadyStreaming);
        }

        info!("Connecting to Wi-Fi");
        link.begin(&credentials.ssid, credentials.password())?;
        let address = wait_for_association(&*link, &mut self.delay, self.association_poll_interval)?;
        info!("IP address: {address}");

        let server = start_server(address)?;
        self.state = StreamState::Streaming;
        Ok(server)
    }

    /// One loop iteration: service the server, read every finger, broadcast, sleep.
    ///
    /// A failed read skips the broadcast but still sleeps, keeping the frame rate.
    ///
    /// # Errors
    ///
    /// - `GripError::NotStreaming`: Before `boot` succeeded. Nothing is read or sent.
    /// - The sensor error of a failed read.
    pub fn step<B: Broadcaster + ?Sized>(&mut self, server: &mut B) -> Result<(), GripError> {
        if self.state != StreamState::Streaming {
            return Err(GripError::NotStreaming);
        }

        server.process_events();
        let frame = self.sensors.read_fingers().map(|sample| {
            let clients = server.broadcast_text(&sample.to_string());
            self.frames_sent += 1;
            trace!("Frame {} ({sample}) sent to {clients} clients", self.frames_sent);
        });
        self.delay.delay(self.sample_period);
        frame
    }

    /// Runs the sampling loop forever. Read errors are logged and the loop goes on.
    ///
    /// # Errors
    ///
    /// - `GripError::NotStreaming`: If called before `boot` succeeded.
    pub fn run<B: Broadcaster + ?Sized>(&mut self, server: &mut B) -> Result<Infallible, GripError> {
        if self.state != StreamState::Streaming {
            return Err(GripError::NotStreaming);
        }
        loop {
            if let Err(err) = self.step(server) {
                warn!("Skipping frame: {err:?}");
            }
        }
    }
}
