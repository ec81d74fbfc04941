mod link_event;
mod negotiation;
mod peer_link;
mod peer_transport;
mod rtc_transport;

pub use link_event::*;
pub use negotiation::*;
pub(crate) use peer_link::*;
pub use peer_transport::*;
pub use rtc_transport::*;
