pub mod config;
pub mod error;
pub mod metrics;
pub mod pool;
pub mod registry;
pub mod session;
pub mod transport;
pub mod usb;

pub use config::*;
pub use error::*;
pub use metrics::*;
pub use pool::*;
pub use registry::*;
pub use session::*;
pub use transport::*;
pub use usb::*;
