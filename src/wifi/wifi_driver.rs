use crate::microcontroller_src::peripherals::PeripheralError;

#[cfg(target_os = "espidf")]
use super::Association;
#[cfg(target_os = "espidf")]
use esp_idf_svc::{
    eventloop::EspSystemEventLoop,
    hal::modem,
    nvs::EspDefaultNvsPartition,
    wifi::{AuthMethod, ClientConfiguration, Configuration, EspWifi},
};
#[cfg(target_os = "espidf")]
use std::net::Ipv4Addr;

/// Error types related to WIFI operations.
#[derive(Debug)]
pub enum WifiError {
    ConfigurationError,
    ConnectingError,
    DnsNotFound,
    InformationError,
    NvsAlreadyTaken,
    PeripheralError(PeripheralError),
    StartingError,
    WifiNotInitialized,
}

/// Abstraction of the driver that controls the wifi in station mode.
#[cfg(target_os = "espidf")]
pub struct WifiDriver<'a> {
    controller: EspWifi<'a>,
}

#[cfg(target_os = "espidf")]
impl<'a> WifiDriver<'a> {
    /// Creates a new WifiDriver.
    ///
    /// By default this function takes the Non-Volatile Storage of the ESP in order to save
    /// wifi configuration. This is to improve connection times for future connections
    /// to the same network.
    ///
    /// # Arguments
    ///
    /// - `event_loop`: Microcontroller's event loop.
    /// - `modem`: Microcontroller's modem peripheral.
    ///
    /// # Errors
    ///
    /// - `WifiError::NvsAlreadyTaken`: If the NVS Default Partition was already taken.
    /// - `WifiError::StartingError`: If there is an error initializing the driver.
    pub fn new(event_loop: EspSystemEventLoop, modem: modem::Modem) -> Result<Self, WifiError> {
        let nvs = EspDefaultNvsPartition::take().map_err(|_| WifiError::NvsAlreadyTaken)?;
        Ok(WifiDriver {
            controller: EspWifi::new(modem, event_loop, Some(nvs))
                .map_err(|_| WifiError::StartingError)?,
        })
    }

    /// Gets the DNS ip address handed out with the lease.
    ///
    /// # Errors
    ///
    /// - `WifiError::InformationError`: If getting the information of the netif fails.
    /// - `WifiError::DnsNotFound`: If the netif info does not have the dns ip address.
    pub fn get_dns_info(&self) -> Result<Ipv4Addr, WifiError> {
        let info = self
            .controller
            .sta_netif()
            .get_ip_info()
            .map_err(|_| WifiError::InformationError)?;
        info.dns.ok_or(WifiError::DnsNotFound)
    }
}

#[cfg(target_os = "espidf")]
impl Association for WifiDriver<'_> {
    /// If a password is passed, it associates using the WPAWPA2Personal Authentication method.
    /// Otherwise, it doesn't use an Authentication method.
    ///
    /// # Errors
    ///
    /// - `WifiError::ConfigurationError`: If the credentials do not fit or the configuration is rejected.
    /// - `WifiError::StartingError`: Error while starting wifi driver.
    /// - `WifiError::ConnectingError`: Error while issuing the connect request.
    fn begin(&mut self, ssid: &str, password: Option<&str>) -> Result<(), WifiError> {
        let auth_method = match password {
            Some(_) => AuthMethod::WPAWPA2Personal,
            None => AuthMethod::None,
        };

        let wifi_configuration = Configuration::Client(ClientConfiguration {
            ssid: ssid.try_into().map_err(|_| WifiError::ConfigurationError)?,
            bssid: None, // MAC address
            auth_method,
            password: password
                .unwrap_or_default()
                .try_into()
                .map_err(|_| WifiError::ConfigurationError)?,
            channel: None,
            ..Default::default()
        });

        self.controller
            .set_configuration(&wifi_configuration)
            .map_err(|_| WifiError::ConfigurationError)?;

        self.controller
            .start()
            .map_err(|_| WifiError::StartingError)?;

        self.controller
            .connect()
            .map_err(|_| WifiError::ConnectingError)
    }

    /// Connected to the access point and the station netif is up with a lease.
    fn is_associated(&self) -> Result<bool, WifiError> {
        let connected = self
            .controller
            .is_connected()
            .map_err(|_| WifiError::WifiNotInitialized)?;
        if !connected {
            return Ok(false);
        }
        self.controller
            .sta_netif()
            .is_up()
            .map_err(|_| WifiError::InformationError)
    }

    fn address(&self) -> Result<Ipv4Addr, WifiError> {
        let info = self
            .controller
            .sta_netif()
            .get_ip_info()
            .map_err(|_| WifiError::InformationError)?;
        Ok(info.ip)
    }
}

impl From<PeripheralError> for WifiError {
    fn from(value: PeripheralError) -> Self {
        Self::PeripheralError(value)
    }
}
