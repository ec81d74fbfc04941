mod relay_config;
mod relay_server;

pub use relay_config::*;
pub use relay_server::*;
