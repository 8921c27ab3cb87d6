//! STEVEDORE Policy System
//!
//! Immutable capability descriptors for deployment targets.
//! A policy is built once, attached to a document, and only ever read.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod decision;
pub mod policy;
pub mod preset;

pub use config::PolicyConfig;
pub use decision::PolicyDecision;
pub use policy::{Policy, PolicyError, PolicyResult};
pub use preset::{preset, Preset, PRO, SHARED};
