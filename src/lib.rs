//! Immediate-mode box layout: declare an element tree each frame, solve sizes
//! and positions, and receive a flat, paint-ordered list of render commands.

pub mod style;
pub mod ui;
pub mod view;

pub use style::*;
pub use ui::*;
pub use view::*;
