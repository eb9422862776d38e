mod microcontroller_src;
mod utils;

pub mod config;
pub mod gpio;
pub mod grip;
pub mod wifi;

pub use microcontroller_src::delay::Delay;
#[cfg(target_os = "espidf")]
pub use microcontroller_src::delay::FreeRtosDelay;
#[cfg(target_os = "espidf")]
pub use microcontroller_src::Microcontroller;
pub use microcontroller_src::peripherals::PeripheralError;
pub use utils::grip_error;
