pub mod error;
pub mod facility;
pub mod manager;
pub mod memory;
pub mod search;
pub mod service;
pub mod visibility;

pub use error::*;
pub use facility::*;
pub use manager::*;
pub use memory::*;
pub use search::*;
pub use service::*;
pub use visibility::*;
