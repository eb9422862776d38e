//! Build time configuration of the grip ball.
//!
//! Everything is fixed when the firmware is flashed. The wifi credentials come from the
//! `CARDINAL_GRIP_SSID` and `CARDINAL_GRIP_PASSWORD` environment variables at build time
//! and fall back to placeholders.

use std::time::Duration;

use crate::{grip::FINGER_COUNT, microcontroller_src::peripherals::ANALOG_PINS};

/// Finger sensor pins, index finger first.
pub const FINGER_PINS: [u8; FINGER_COUNT] = [34, 35, 32, 33];
/// Clients connect to `ws://<ip>:81/`.
pub const WS_PORT: u16 = 81;
pub const WS_PATH: &str = "/";
/// Sleep after each broadcast, ~50 Hz.
pub const SAMPLE_PERIOD: Duration = Duration::from_millis(20);
/// Interval between association checks. Bring-up has no timeout and never gives up.
pub const ASSOCIATION_POLL_INTERVAL: Duration = Duration::from_millis(500);
/// ADC conversions averaged per finger and frame.
pub const SMOOTHING_SAMPLES: u16 = 1;

const DEFAULT_SSID: &str = "YOUR_SSID";
const DEFAULT_PASSWORD: &str = "YOUR_PASSWORD";
const MAX_SSID_LEN: usize = 32;
const MAX_PASSWORD_LEN: usize = 64;
const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    DuplicatedPin(u8),
    EmptySsid,
    InvalidPath,
    InvalidPort,
    NotAnAnalogPin(u8),
    PasswordTooLong,
    PasswordTooShort,
    SsidTooLong,
    ZeroDuration,
    ZeroSmoothingSamples,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WifiCredentials {
    pub ssid: String,
    pub password: String,
}

impl WifiCredentials {
    /// `None` for an open network.
    pub fn password(&self) -> Option<&str> {
        match self.password.as_str() {
            "" => None,
            password => Some(password),
        }
    }
}

impl Default for WifiCredentials {
    fn default() -> Self {
        WifiCredentials {
            ssid: option_env!("CARDINAL_GRIP_SSID")
                .unwrap_or(DEFAULT_SSID)
                .to_string(),
            password: option_env!("CARDINAL_GRIP_PASSWORD")
                .unwrap_or(DEFAULT_PASSWORD)
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            port: WS_PORT,
            path: WS_PATH.to_string(),
        }
    }
}

/// Everything the bring-up and the sampling loop need, built once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GripConfig {
    pub wifi: WifiCredentials,
    pub server: ServerConfig,
    pub finger_pins: [u8; FINGER_COUNT],
    pub sample_period: Duration,
    pub association_poll_interval: Duration,
    pub smoothing_samples: u16,
}

impl Default for GripConfig {
    fn default() -> Self {
        GripConfig {
            wifi: WifiCredentials::default(),
            server: ServerConfig::default(),
            finger_pins: FINGER_PINS,
            sample_period: SAMPLE_PERIOD,
            association_poll_interval: ASSOCIATION_POLL_INTERVAL,
            smoothing_samples: SMOOTHING_SAMPLES,
        }
    }
}

impl GripConfig {
    /// Checks the configuration against what the hardware and the wifi stack accept.
    ///
    /// # Errors
    ///
    /// The first `ConfigError` found, checking credentials, then pins, then the server
    /// and finally the timing.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_credentials()?;
        self.validate_pins()?;

        if self.server.port == 0 {
            return Err(ConfigError::InvalidPort);
        }
        if !self.server.path.starts_with('/') {
            return Err(ConfigError::InvalidPath);
        }
        if self.sample_period.is_zero() || self.association_poll_interval.is_zero() {
            return Err(ConfigError::ZeroDuration);
        }
        if self.smoothing_samples == 0 {
            return Err(ConfigError::ZeroSmoothingSamples);
        }
        Ok(())
    }

    fn validate_credentials(&self) -> Result<(), ConfigError> {
        let ssid_len = self.wifi.ssid.len();
        if ssid_len == 0 {
            return Err(ConfigError::EmptySsid);
        }
        if ssid_len > MAX_SSID_LEN {
            return Err(ConfigError::SsidTooLong);
        }
        match self.wifi.password() {
            Some(password) if password.len() > MAX_PASSWORD_LEN => {
                Err(ConfigError::PasswordTooLong)
            }
            Some(password) if password.len() < MIN_PASSWORD_LEN => {
                Err(ConfigError::PasswordTooShort)
            }
            _ => Ok(()),
        }
    }

    fn validate_pins(&self) -> Result<(), ConfigError> {
        for (index, pin) in self.finger_pins.iter().enumerate() {
            if !ANALOG_PINS.contains(pin) {
                return Err(ConfigError::NotAnAnalogPin(*pin));
            }
            if self.finger_pins[..index].contains(pin) {
                return Err(ConfigError::DuplicatedPin(*pin));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn config_with_password(password: &str) -> GripConfig {
        GripConfig {
            wifi: WifiCredentials {
                ssid: "clinic".to_string(),
                password: password.to_string(),
            },
            ..Default::default()
        }
    }

    #[test]
    fn test0_defaults_are_valid() {
        let config = GripConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.finger_pins, [34, 35, 32, 33]);
        assert_eq!(config.server.port, 81);
        assert_eq!(config.sample_period, Duration::from_millis(20));
        assert_eq!(config.association_poll_interval, Duration::from_millis(500));
    }

    #[test]
    fn test1_empty_password_means_open_network() {
        let config = config_with_password("");
        assert_eq!(config.wifi.password(), None);
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(
            config_with_password("secret-pass").wifi.password(),
            Some("secret-pass")
        );
    }

    #[test]
    fn test2_rejects_passwords_wpa_would_refuse() {
        assert_eq!(
            config_with_password("short").validate(),
            Err(ConfigError::PasswordTooShort)
        );
        assert_eq!(
            config_with_password(&"x".repeat(65)).validate(),
            Err(ConfigError::PasswordTooLong)
        );
    }

    #[test]
    fn test3_rejects_bad_ssids() {
        let mut config = config_with_password("");
        config.wifi.ssid.clear();
        assert_eq!(config.validate(), Err(ConfigError::EmptySsid));
        config.wifi.ssid = "s".repeat(33);
        assert_eq!(config.validate(), Err(ConfigError::SsidTooLong));
    }

    #[test]
    fn test4_rejects_pins_outside_adc1_and_duplicates() {
        let mut config = GripConfig::default();
        config.finger_pins = [34, 35, 32, 25];
        assert_eq!(config.validate(), Err(ConfigError::NotAnAnalogPin(25)));
        config.finger_pins = [34, 35, 34, 33];
        assert_eq!(config.validate(), Err(ConfigError::DuplicatedPin(34)));
    }

    #[test]
    fn test5_rejects_bad_server_and_timing() {
        let mut config = GripConfig::default();
        config.server.port = 0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidPort));

        let mut config = GripConfig::default();
        config.server.path = "ws".to_string();
        assert_eq!(config.validate(), Err(ConfigError::InvalidPath));

        let mut config = GripConfig::default();
        config.sample_period = Duration::ZERO;
        assert_eq!(config.validate(), Err(ConfigError::ZeroDuration));

        let mut config = GripConfig::default();
        config.association_poll_interval = Duration::ZERO;
        assert_eq!(config.validate(), Err(ConfigError::ZeroDuration));

        let mut config = GripConfig::default();
        config.smoothing_samples = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroSmoothingSamples));
    }
}
