pub mod delay;
#[cfg(target_os = "espidf")]
pub mod microcontroller;
#[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
pub mod peripherals;

#[cfg(target_os = "espidf")]
pub use self::microcontroller::Microcontroller;
