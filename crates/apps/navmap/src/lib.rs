pub mod config;
pub mod event;
pub mod map;

pub use config::*;
pub use event::*;
pub use map::*;
