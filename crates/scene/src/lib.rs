pub mod camera;
pub mod focus;
pub mod orientation;
pub mod pointer;
pub mod range;

pub use camera::*;
pub use focus::*;
pub use orientation::*;
pub use pointer::*;
pub use range::*;
