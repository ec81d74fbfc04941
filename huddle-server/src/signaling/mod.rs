mod relay_router;
mod ws_handler;

pub use relay_router::*;
pub use ws_handler::*;
