//! Domain-based type organization
//!
//! Types are organized by domain to match the structure in `update/`:
//! - activity: User-visible log sink
//! - config: Versioned configuration record and its form binding
//! - device: Board identity and live telemetry stores
//! - error: Failure taxonomy
//! - firmware: Firmware upload state machine
//! - navigation: Views and navigation tokens
//! - transport: Request outcomes

pub mod activity;
pub mod config;
pub mod device;
pub mod error;
pub mod firmware;
pub mod navigation;
pub mod transport;

pub use activity::*;
pub use config::*;
pub use device::*;
pub use error::*;
pub use firmware::*;
pub use navigation::*;
pub use transport::*;
