//! STEVEDORE Compose Model
//!
//! The canonical, dialect-independent document that every parser produces
//! and every translator consumes. Dialect differences never show up here.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod document;
pub mod error;
pub mod field;
pub mod global;
pub mod list;
pub mod service;

pub use document::{Anchor, ComposeDocument, DocumentLayout, Node, Section};
pub use error::{FieldError, FieldErrorKind, ModelError, ModelResult, Scope};
pub use field::{Build, Field, FieldKind, FieldValue};
pub use global::{ConfigBag, GlobalVolume, Network};
pub use list::{EncodedList, ListEncoding, MappedItem, PortList, VolumeList};
pub use service::Service;
