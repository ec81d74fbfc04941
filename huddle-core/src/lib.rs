pub mod model;
pub mod utils;

mod error;

pub use error::ModelError;
pub use model::*;
