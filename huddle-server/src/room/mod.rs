mod room_entry;
mod room_registry;

pub use room_entry::*;
pub use room_registry::*;
