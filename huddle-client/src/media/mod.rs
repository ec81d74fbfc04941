mod media_source;
mod track;

pub use media_source::*;
pub use track::*;
