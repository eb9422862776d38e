//! Grip ball firmware: joins the configured wifi network, starts a WebSocket server on
//! port 81 and broadcasts the four finger readings as `f1,f2,f3,f4` every 20 ms.
//! Note: Build with CARDINAL_GRIP_SSID & CARDINAL_GRIP_PASSWORD set before flashing.

#[cfg(target_os = "espidf")]
use cardinal_grip::{
    config::GripConfig,
    gpio::FingerArray,
    grip::GripStreamer,
    grip_error::GripError,
    wifi::{NoopEventHandler, WsBroadcastServer},
    FreeRtosDelay, Microcontroller,
};
#[cfg(target_os = "espidf")]
use log::{debug, error};
#[cfg(target_os = "espidf")]
use std::convert::Infallible;

#[cfg(target_os = "espidf")]
fn main() {
    esp_idf_svc::log::EspLogger::initialize_default();

    if let Err(err) = run() {
        error!("Grip ball halted: {err:?}");
    }
}

#[cfg(target_os = "espidf")]
fn run() -> Result<Infallible, GripError> {
    let config = GripConfig::default();
    config.validate()?;

    let mut micro = Microcontroller::new()?;
    let sensors = FingerArray::new(&mut micro, &config.finger_pins, config.smoothing_samples)?;
    let mut wifi = micro.get_wifi_driver()?;

    let mut streamer = GripStreamer::new(sensors, FreeRtosDelay, &config);
    let mut server = streamer.boot(&mut wifi, &config.wifi, |_address| {
        Ok(WsBroadcastServer::start(&config.server, NoopEventHandler)?)
    })?;
    if let Ok(dns) = wifi.get_dns_info() {
        debug!("DNS server: {dns}");
    }

    streamer.run(&mut server)
}

#[cfg(not(target_os = "espidf"))]
fn main() {
    eprintln!("The grip ball firmware only runs on ESP-IDF targets, flash it to the board.");
}
