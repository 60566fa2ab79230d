pub mod device;
pub mod error;
pub mod event;
pub mod level;

pub use device::*;
pub use error::*;
pub use event::*;
pub use level::*;
