//! STEVEDORE Dialects
//!
//! Parsers from raw decoded trees into the canonical document, and
//! translators back out, for the V1, V2 and V3 schema dialects.
//! Everything that differs between dialects lives in [`DialectTable`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod allowlist;
pub mod detect;
pub mod parse;
pub mod table;
pub mod translate;

pub use detect::detect;
pub use parse::{parse, parse_detected, HandlerTable, ParseFailure, ParseResult, Parser};
pub use table::DialectTable;
pub use translate::{translate, Translator};
