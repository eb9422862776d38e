use std::time::Duration;

/// Blocking wait used between polls and between frames.
pub trait Delay {
    fn delay(&mut self, duration: Duration);
}

/// Delay backed by the FreeRTOS scheduler, yielding the core to other tasks
/// (wifi, http server) while waiting.
#[cfg(target_os = "espidf")]
#[derive(Debug, Default, Clone, Copy)]
pub struct FreeRtosDelay;

#[cfg(target_os = "espidf")]
impl Delay for FreeRtosDelay {
    fn delay(&mut self, duration: Duration) {
        let ms = u32::try_from(duration.as_millis()).unwrap_or(u32::MAX);
        esp_idf_svc::hal::delay::FreeRtos::delay_ms(ms)
    }
}
