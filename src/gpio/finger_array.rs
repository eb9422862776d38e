use super::{AnalogIn, AnalogInError, FingerSensors};
use crate::{
    grip::{GripSample, FINGER_COUNT},
    microcontroller_src::Microcontroller,
    utils::grip_error::GripError,
};

/// The four force sensors of the grip ball, one `AnalogIn` per finger.
pub struct FingerArray<'a> {
    fingers: Vec<AnalogIn<'a>>,
    smoothing_samples: u16,
}

impl<'a> FingerArray<'a> {
    /// Claims every pin as an analog input with full range attenuation.
    ///
    /// # Errors
    ///
    /// - `AnalogInError::NoSamples`: If `smoothing_samples` is zero.
    /// - Any `AnalogInError` raised while creating one of the channels.
    pub fn new(
        micro: &mut Microcontroller<'a>,
        pins: &[u8; FINGER_COUNT],
        smoothing_samples: u16,
    ) -> Result<Self, AnalogInError> {
        if smoothing_samples == 0 {
            return Err(AnalogInError::NoSamples);
        }
        let fingers = pins
            .iter()
            .map(|pin| micro.set_pin_as_analog_in_high_atten(*pin as usize))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(FingerArray {
            fingers,
            smoothing_samples,
        })
    }
}

impl FingerSensors for FingerArray<'_> {
    fn read_fingers(&mut self) -> Result<GripSample, GripError> {
        let mut readings = [0u16; FINGER_COUNT];
        for (reading, finger) in readings.iter_mut().zip(self.fingers.iter_mut()) {
            *reading = match self.smoothing_samples {
                1 => finger.read_raw()?,
                samples => finger.smooth_read(samples)?,
            };
        }
        Ok(GripSample::new(readings))
    }
}
