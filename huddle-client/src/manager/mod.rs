mod manager_command;
mod peer_observer;
mod peer_set;
mod peer_set_manager;
mod peer_summary;

pub(crate) use manager_command::*;
pub use peer_observer::*;
pub use peer_set::*;
pub(crate) use peer_set_manager::*;
pub use peer_summary::*;
