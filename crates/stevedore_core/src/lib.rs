//! STEVEDORE Core Types
//!
//! This crate contains pure value types and logic with no I/O.
//! Every literal grammar here has an exact inverse through `Display`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod capability;
pub mod dialect;
pub mod error;
pub mod image;
pub mod literal;
pub mod port;
pub mod volume;

// Re-exports
pub use capability::{Capability, CapabilitySet};
pub use dialect::Dialect;
pub use error::{CoreError, CoreResult};
pub use image::Image;
pub use port::Port;
pub use volume::ServiceVolume;
