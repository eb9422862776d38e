use std::{io::Write, net::Ipv4Addr, time::Duration};

use log::debug;

use super::WifiError;
use crate::microcontroller_src::delay::Delay;

/// Joining an access point as a station.
pub trait Association {
    /// Configures the station and starts associating, without waiting for the outcome.
    fn begin(&mut self, ssid: &str, password: Option<&str>) -> Result<(), WifiError>;

    /// Whether the station is associated and holds an address.
    fn is_associated(&self) -> Result<bool, WifiError>;

    fn address(&self) -> Result<Ipv4Addr, WifiError>;
}

/// Polls the link every `poll_interval` until it reports an association, printing a
/// progress dot per poll. There is no timeout: an unreachable network keeps the caller
/// here forever.
///
/// # Errors
///
/// Only errors reported by the driver itself are returned, never "not associated yet".
pub fn wait_for_association<L, D>(
    link: &L,
    delay: &mut D,
    poll_interval: Duration,
) -> Result<Ipv4Addr, WifiError>
where
    L: Association + ?Sized,
    D: Delay + ?Sized,
{
    let mut polls: u64 = 0;
    while !link.is_associated()? {
        delay.delay(poll_interval);
        print_progress(".");
        polls += 1;
    }
    print_progress("\n");
    debug!("Associated after {polls} polls");
    link.address()
}

fn print_progress(text: &str) {
    let mut stdout = std::io::stdout();
    // Console output only, a failed write must not stall the bring-up.
    let _ = stdout.write_all(text.as_bytes());
    let _ = stdout.flush();
}
