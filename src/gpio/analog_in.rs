use crate::{microcontroller_src::peripherals::PeripheralError, utils::grip_error::AdcDriverError};

#[cfg(target_os = "espidf")]
use crate::microcontroller_src::{microcontroller::SharableAdcDriver, peripherals::Peripheral};
#[cfg(target_os = "espidf")]
use esp_idf_svc::hal::{adc::attenuation::adc_atten_t, adc::*, gpio::*};
#[cfg(target_os = "espidf")]
use oneshot::{config::AdcChannelConfig, AdcChannelDriver, AdcDriver};
#[cfg(target_os = "espidf")]
use std::rc::Rc;

/// Largest value a 12 bit conversion can produce.
pub const MAX_DIGITAL_VAL: u16 = 4095;

/// Enums the different errors possible when working with the analog in
#[derive(Debug)]
pub enum AnalogInError {
    AdcDriverError(AdcDriverError),
    ChannelCreationError,
    ErrorReading,
    InvalidPeripheral(PeripheralError),
    InvalidPin,
    NoSamples,
}

/// Driver for receiving analog inputs from a particular pin
/// - `adc_channel_driver`: Instance of AnalogChannels
#[cfg(target_os = "espidf")]
pub struct AnalogIn<'a> {
    adc_channel_driver: AnalogChannels<'a>,
}

/// Enums the usable channels from ADC1. On the ESP32 ADC1 is wired to
/// GPIO32 to GPIO39, of which 37 and 38 are not broken out.
#[cfg(target_os = "espidf")]
enum AnalogChannels<'a> {
    Channel4(AdcChannelDriver<'a, Gpio32, Rc<AdcDriver<'a, ADC1>>>),
    Channel5(AdcChannelDriver<'a, Gpio33, Rc<AdcDriver<'a, ADC1>>>),
    Channel6(AdcChannelDriver<'a, Gpio34, Rc<AdcDriver<'a, ADC1>>>),
    Channel7(AdcChannelDriver<'a, Gpio35, Rc<AdcDriver<'a, ADC1>>>),
    Channel0(AdcChannelDriver<'a, Gpio36, Rc<AdcDriver<'a, ADC1>>>),
    Channel3(AdcChannelDriver<'a, Gpio39, Rc<AdcDriver<'a, ADC1>>>),
}

#[cfg(target_os = "espidf")]
impl<'a> AnalogIn<'a> {
    /// Create a new AnalogIn for a specific pin.
    ///
    /// # Arguments
    ///
    /// - `pin`: A Peripheral of type Pin
    /// - `adc_driver`: An instance of a SharableAdcDriver
    /// - `attenuation`: An adc_atten_t representing the desired attenuation
    ///
    /// # Errors
    ///
    /// - `AnalogInError::InvalidPin`: If the pin is not wired to ADC1
    /// - `AnalogInError::InvalidPeripheral`: If the pin was already taken or is not a pin
    /// - `AnalogInError::ChannelCreationError`: If the channel could not be created
    pub(crate) fn new(
        pin: Peripheral,
        adc_driver: SharableAdcDriver<'a>,
        attenuation: adc_atten_t,
    ) -> Result<Self, AnalogInError> {
        Ok(AnalogIn {
            adc_channel_driver: AnalogIn::new_channel(pin, adc_driver, attenuation)?,
        })
    }

    fn new_channel(
        pin: Peripheral,
        sharable_adc_driver: SharableAdcDriver<'a>,
        attenuation: adc_atten_t,
    ) -> Result<AnalogChannels<'a>, AnalogInError> {
        let mut config = AdcChannelConfig::new();
        config.attenuation = attenuation;
        config.resolution = Resolution::Resolution12Bit;
        config.calibration = true;
        let adc_channel_driver: AnalogChannels<'a> = match pin {
            Peripheral::Pin(pin_num) => match pin_num {
                32 => AnalogChannels::Channel4(
                    AdcChannelDriver::new(sharable_adc_driver, unsafe { Gpio32::new() }, &config)
                        .map_err(|_| AnalogInError::ChannelCreationError)?,
                ),
                33 => AnalogChannels::Channel5(
                    AdcChannelDriver::new(sharable_adc_driver, unsafe { Gpio33::new() }, &config)
                        .map_err(|_| AnalogInError::ChannelCreationError)?,
                ),
                34 => AnalogChannels::Channel6(
                    AdcChannelDriver::new(sharable_adc_driver, unsafe { Gpio34::new() }, &config)
                        .map_err(|_| AnalogInError::ChannelCreationError)?,
                ),
                35 => AnalogChannels::Channel7(
                    AdcChannelDriver::new(sharable_adc_driver, unsafe { Gpio35::new() }, &config)
                        .map_err(|_| AnalogInError::ChannelCreationError)?,
                ),
                36 => AnalogChannels::Channel0(
                    AdcChannelDriver::new(sharable_adc_driver, unsafe { Gpio36::new() }, &config)
                        .map_err(|_| AnalogInError::ChannelCreationError)?,
                ),
                39 => AnalogChannels::Channel3(
                    AdcChannelDriver::new(sharable_adc_driver, unsafe { Gpio39::new() }, &config)
                        .map_err(|_| AnalogInError::ChannelCreationError)?,
                ),
                _ => return Err(AnalogInError::InvalidPin),
            },
            Peripheral::None => {
                return Err(AnalogInError::InvalidPeripheral(
                    PeripheralError::AlreadyTaken,
                ))
            }
            _ => return Err(AnalogInError::InvalidPeripheral(PeripheralError::NotAPin)),
        };
        Ok(adc_channel_driver)
    }

    /// Returns the raw conversion result of the analog pin, in the range [0, 4095].
    ///
    /// # Errors
    ///
    /// - `AnalogInError::ErrorReading`: If the read operation failed
    pub fn read_raw(&mut self) -> Result<u16, AnalogInError> {
        let read_value = match self.adc_channel_driver {
            AnalogChannels::Channel4(ref mut channel_driver) => channel_driver.read_raw(),
            AnalogChannels::Channel5(ref mut channel_driver) => channel_driver.read_raw(),
            AnalogChannels::Channel6(ref mut channel_driver) => channel_driver.read_raw(),
            AnalogChannels::Channel7(ref mut channel_driver) => channel_driver.read_raw(),
            AnalogChannels::Channel0(ref mut channel_driver) => channel_driver.read_raw(),
            AnalogChannels::Channel3(ref mut channel_driver) => channel_driver.read_raw(),
        }
        .map_err(|_| AnalogInError::ErrorReading)?;

        Ok(read_value.min(MAX_DIGITAL_VAL))
    }

    /// Reads multiple raw conversions from the analog pin and returns their mean.
    ///
    /// # Errors
    ///
    /// - `AnalogInError::NoSamples`: If `amount_of_samples` is zero
    /// - `AnalogInError::ErrorReading`: If any of the read operations fails
    pub fn smooth_read(&mut self, amount_of_samples: u16) -> Result<u16, AnalogInError> {
        if amount_of_samples == 0 {
            return Err(AnalogInError::NoSamples);
        }
        let mut smooth_val: u32 = 0;
        for _ in 0..amount_of_samples {
            smooth_val += self.read_raw()? as u32;
        }
        Ok((smooth_val / amount_of_samples as u32) as u16)
    }
}

impl From<AdcDriverError> for AnalogInError {
    fn from(value: AdcDriverError) -> Self {
        AnalogInError::AdcDriverError(value)
    }
}
