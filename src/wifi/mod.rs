mod association;
mod broadcast;
mod wifi_driver;
mod ws_server;

pub use association::*;
pub use broadcast::*;
pub use wifi_driver::*;
pub use ws_server::*;
