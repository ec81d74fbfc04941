mod signal_bus;
mod ws_signal_bus;

pub use signal_bus::*;
pub use ws_signal_bus::*;
