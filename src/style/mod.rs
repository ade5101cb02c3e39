mod color;
mod element_config;
mod layout_config;
mod layout_state;

pub use color::*;
pub use element_config::*;
pub use layout_config::*;
pub use layout_state::*;
