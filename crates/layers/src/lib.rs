pub mod flight_plan;
pub mod highlight;
pub mod icons;
pub mod labels;
pub mod layer;
pub mod renderer;
pub mod role;
pub mod symbology;
pub mod waypoint;

pub use flight_plan::*;
pub use highlight::*;
pub use icons::*;
pub use labels::*;
pub use layer::*;
pub use renderer::*;
pub use role::*;
pub use symbology::*;
pub use waypoint::*;
