mod bus;
mod config;
mod error;
mod identity;
mod manager;
mod media;
mod peer;

pub use bus::*;
pub use config::*;
pub use error::*;
pub use identity::*;
pub use manager::*;
pub use media::*;
pub use peer::*;
