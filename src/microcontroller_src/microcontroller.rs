use attenuation::adc_atten_t;
use esp_idf_svc::{eventloop::EspSystemEventLoop, hal::adc::*};
use oneshot::AdcDriver;
use std::rc::Rc;

use crate::{
    gpio::{AnalogIn, AnalogInError},
    microcontroller_src::peripherals::{Peripheral, Peripherals},
    utils::grip_error::{AdcDriverError, GripError},
    wifi::{WifiDriver, WifiError},
};

pub type SharableAdcDriver<'a> = Rc<AdcDriver<'a, ADC1>>;

/// Primary abstraction for interacting with the microcontroller, providing access to peripherals and drivers
/// required for configuring pins and the wifi.
///
/// - `peripherals`: An instance of `Peripherals`, handing out each hardware peripheral once.
/// - `adc_driver`: An optional shared instance of `SharableAdcDriver`, started with the first analog input.
/// - `event_loop`: The system event loop, needed by the wifi driver.
pub struct Microcontroller<'a> {
    peripherals: Peripherals,
    adc_driver: Option<SharableAdcDriver<'a>>,
    event_loop: EspSystemEventLoop,
}

impl<'a> Microcontroller<'a> {
    /// Creates a new Microcontroller instance
    ///
    /// # Errors
    ///
    /// - `GripError::EventLoopUnavailable`: If the system event loop was already taken.
    pub fn new() -> Result<Self, GripError> {
        esp_idf_svc::sys::link_patches();
        let event_loop = EspSystemEventLoop::take().map_err(|_| GripError::EventLoopUnavailable)?;

        Ok(Microcontroller {
            peripherals: Peripherals::new(),
            adc_driver: None,
            event_loop,
        })
    }

    /// Starts the ADC1 driver if no other was started before. Bitwidth is always 12.
    fn start_adc_driver(&mut self) -> Result<(), AdcDriverError> {
        if self.adc_driver.is_none() {
            if let Peripheral::None = self.peripherals.get_adc() {
                return Err(AdcDriverError::AlreadyTaken);
            }
            let driver = AdcDriver::new(unsafe { ADC1::new() })?;
            self.adc_driver.replace(Rc::new(driver));
        };
        Ok(())
    }

    fn set_pin_as_analog_in(
        &mut self,
        pin_num: usize,
        attenuation: adc_atten_t,
    ) -> Result<AnalogIn<'a>, AnalogInError> {
        self.start_adc_driver()?;
        let pin_peripheral = self.peripherals.get_analog_pin(pin_num);
        let adc_driver = self
            .adc_driver
            .clone()
            .ok_or(AnalogInError::AdcDriverError(AdcDriverError::AlreadyTaken))?;
        AnalogIn::new(pin_peripheral, adc_driver, attenuation)
    }

    /// Sets pin as analog input with attenuation set to 11dB, which covers the whole
    /// 0 to ~3.1V span a voltage divider with a force sensor can reach.
    ///
    /// # Arguments
    ///
    /// - `pin_num`: The number of the pin on the microcontroller to configure as an analog input.
    ///
    /// # Returns
    ///
    /// An `AnalogIn` instance that can be used to read analog inputs from the specified pin.
    pub fn set_pin_as_analog_in_high_atten(
        &mut self,
        pin_num: usize,
    ) -> Result<AnalogIn<'a>, AnalogInError> {
        self.set_pin_as_analog_in(pin_num, attenuation::DB_11)
    }

    /// Creates the station mode wifi driver. The modem can only be handed out once.
    pub fn get_wifi_driver(&mut self) -> Result<WifiDriver<'a>, WifiError> {
        let modem = self.peripherals.get_wifi_peripheral().into_modem()?;
        WifiDriver::new(self.event_loop.clone(), modem)
    }
}
