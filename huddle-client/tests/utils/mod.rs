pub mod mock_transport;

pub use loopback_relay::*;
pub use mock_observer::*;
pub use mock_transport::*;
