mod engine_config;
mod error;
mod id;
mod input;

pub use engine_config::*;
pub use error::*;
pub use id::*;
pub use input::*;
