mod sample;
pub mod session;
mod streamer;

pub use sample::*;
pub use streamer::*;
