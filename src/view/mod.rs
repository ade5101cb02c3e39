mod arena;
mod builder;
mod emitter;
mod engine;
mod position;
mod render_command;
mod scroll;
mod sizing;
mod text;
mod text_cache;

pub use builder::ROOT_ID;
pub use engine::*;
pub use render_command::*;
pub use scroll::ScrollContainerData;
pub use text_cache::*;
