use crate::{
    config::ConfigError,
    gpio::AnalogInError,
    wifi::{ServerError, WifiError},
};

/// Errors while bringing up the shared ADC1 driver.
#[derive(Debug)]
pub enum AdcDriverError {
    AlreadyTaken,
    InitializationError,
}

#[cfg(target_os = "espidf")]
impl From<esp_idf_svc::sys::EspError> for AdcDriverError {
    fn from(_value: esp_idf_svc::sys::EspError) -> Self {
        AdcDriverError::InitializationError
    }
}

/// Crate level error, every concern specific error converts into it.
#[derive(Debug)]
pub enum GripError {
    AlreadyStreaming,
    AnalogInError(AnalogInError),
    ConfigError(ConfigError),
    EventLoopUnavailable,
    NotStreaming,
    ServerError(ServerError),
    WifiError(WifiError),
}

impl From<AnalogInError> for GripError {
    fn from(value: AnalogInError) -> Self {
        GripError::AnalogInError(value)
    }
}

impl From<ConfigError> for GripError {
    fn from(value: ConfigError) -> Self {
        GripError::ConfigError(value)
    }
}

impl From<ServerError> for GripError {
    fn from(value: ServerError) -> Self {
        GripError::ServerError(value)
    }
}

impl From<WifiError> for GripError {
    fn from(value: WifiError) -> Self {
        GripError::WifiError(value)
    }
}
