mod analog_in;
#[cfg(target_os = "espidf")]
mod finger_array;

pub use analog_in::*;
#[cfg(target_os = "espidf")]
pub use finger_array::*;

use crate::{grip::GripSample, utils::grip_error::GripError};

/// Source of one grip frame: every finger read once, in pin order.
pub trait FingerSensors {
    fn read_fingers(&mut self) -> Result<GripSample, GripError>;
}
