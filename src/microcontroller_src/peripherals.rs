use std::mem;

const PIN_COUNT: usize = 40;
/// GPIOs routed to ADC1 on the ESP32. ADC2 is unusable while the wifi driver runs.
pub(crate) const ANALOG_PINS: [u8; 6] = [32, 33, 34, 35, 36, 39];
const MISSING_PINS: [u8; 5] = [20, 24, 28, 29, 30];

#[derive(Debug, PartialEq, Eq)]
pub enum PeripheralError {
    AlreadyTaken,
    NotAPin,
    NotAModem,
}

/// Represents the esp32 Peripheral allowing to instanciate diferent Peripheral Types
#[derive(Debug, Default, PartialEq, Eq)]
pub enum Peripheral {
    Pin(u8),
    Adc,
    Modem,
    #[default]
    None,
}

impl Peripheral {
    fn take(&mut self) -> Peripheral {
        mem::take(self)
    }

    /// If the Peripheral is the modem returns the corresponding `Modem`.
    /// If not it returns PeripheralError::NotAModem, or PeripheralError::AlreadyTaken
    /// if it was already handed out.
    #[cfg(target_os = "espidf")]
    pub fn into_modem(self) -> Result<esp_idf_svc::hal::modem::Modem, PeripheralError> {
        match self {
            Peripheral::Modem => Ok(unsafe { esp_idf_svc::hal::modem::Modem::new() }),
            Peripheral::None => Err(PeripheralError::AlreadyTaken),
            _ => Err(PeripheralError::NotAModem),
        }
    }
}

/// Represents the available peripherals in the esp32 and provides a way to get each particular
/// peripheral. Subsequent gets of the same peripheral will return Peripheral::None.
pub struct Peripherals {
    pins: [Peripheral; PIN_COUNT],
    adc: Peripheral,
    modem: Peripheral,
}

impl Peripherals {
    pub fn new() -> Peripherals {
        let pins: [Peripheral; PIN_COUNT] = std::array::from_fn(|pin_num| {
            let pin_num = pin_num as u8;
            if MISSING_PINS.contains(&pin_num) {
                Peripheral::None
            } else {
                Peripheral::Pin(pin_num)
            }
        });
        Peripherals {
            pins,
            adc: Peripheral::Adc,
            modem: Peripheral::Modem,
        }
    }

    /// Takes the pin only if it is one of the ADC1 pins.
    pub fn get_analog_pin(&mut self, pin_num: usize) -> Peripheral {
        if ANALOG_PINS.iter().any(|pin| *pin as usize == pin_num) {
            return self.pins[pin_num].take();
        }
        Peripheral::None
    }

    pub fn get_adc(&mut self) -> Peripheral {
        self.adc.take()
    }

    pub fn get_wifi_peripheral(&mut self) -> Peripheral {
        self.modem.take()
    }
}

impl Default for Peripherals {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test0_analog_pin_can_only_be_taken_once() {
        let mut peripherals = Peripherals::new();
        assert_eq!(peripherals.get_analog_pin(34), Peripheral::Pin(34));
        assert_eq!(peripherals.get_analog_pin(34), Peripheral::None);
    }

    #[test]
    fn test1_pins_outside_adc1_are_not_analog() {
        let mut peripherals = Peripherals::new();
        assert_eq!(peripherals.get_analog_pin(5), Peripheral::None);
        assert_eq!(peripherals.get_analog_pin(37), Peripheral::None);
        assert_eq!(peripherals.get_analog_pin(64), Peripheral::None);
    }

    #[test]
    fn test2_every_finger_pin_is_available_on_a_fresh_board() {
        let mut peripherals = Peripherals::new();
        for pin in [34, 35, 32, 33] {
            assert_eq!(peripherals.get_analog_pin(pin), Peripheral::Pin(pin as u8));
        }
    }

    #[test]
    fn test3_adc_and_modem_are_taken_once() {
        let mut peripherals = Peripherals::new();
        assert_eq!(peripherals.get_adc(), Peripheral::Adc);
        assert_eq!(peripherals.get_adc(), Peripheral::None);
        assert_eq!(peripherals.get_wifi_peripheral(), Peripheral::Modem);
        assert_eq!(peripherals.get_wifi_peripheral(), Peripheral::None);
    }
}
