//! Typed interpreters for the dispatched service fields.

use super::list::parse_list;
use crate::table::DialectTable;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use stevedore_compose::{Build, FieldKind, FieldValue};
use stevedore_core::literal::type_name;
use stevedore_core::Image;

static CONTAINER_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9_.-]+$").expect("container name pattern is a valid regex")
});

/// Inputs a handler may consult
#[derive(Debug, Clone, Copy)]
pub struct HandlerContext<'a> {
    /// Dialect being parsed
    pub table: &'a DialectTable,
    /// Owning service
    pub service: &'a str,
}

/// Interpreter for one field kind
///
/// Returns the typed value, or a message describing the grammar violation.
pub type Handler = fn(&HandlerContext<'_>, &Value) -> Result<FieldValue, String>;

/// Registration table from field kind to handler
#[derive(Clone)]
pub struct HandlerTable {
    handlers: IndexMap<FieldKind, Handler>,
}

impl HandlerTable {
    /// Create an empty table
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: IndexMap::new(),
        }
    }

    /// Table with a handler for every dispatched kind
    #[must_use]
    pub fn standard() -> Self {
        Self::new()
            .with(FieldKind::Image, interpret_image)
            .with(FieldKind::Ports, interpret_ports)
            .with(FieldKind::Volumes, interpret_volumes)
            .with(FieldKind::Build, interpret_build)
            .with(FieldKind::ContainerName, interpret_container_name)
            .with(FieldKind::Context, interpret_context)
            .with(FieldKind::Privileged, interpret_privileged)
    }

    /// Register a handler, replacing any previous one for the kind
    #[must_use]
    pub fn with(mut self, kind: FieldKind, handler: Handler) -> Self {
        self.handlers.insert(kind, handler);
        self
    }

    /// Handler for a kind
    #[must_use]
    pub fn get(&self, kind: FieldKind) -> Option<Handler> {
        self.handlers.get(&kind).copied()
    }

    /// Registered kinds in registration order
    pub fn kinds(&self) -> impl Iterator<Item = FieldKind> + '_ {
        self.handlers.keys().copied()
    }
}

impl Default for HandlerTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl std::fmt::Debug for HandlerTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.handlers.keys()).finish()
    }
}

fn expect_str<'v>(raw: &'v Value, what: &str) -> Result<&'v str, String> {
    raw.as_str()
        .ok_or_else(|| format!("{} must be a string, found {}", what, type_name(raw)))
}

fn interpret_image(_: &HandlerContext<'_>, raw: &Value) -> Result<FieldValue, String> {
    let literal = expect_str(raw, "image")?;
    Image::parse(literal)
        .map(FieldValue::Image)
        .map_err(|e| e.to_string())
}

fn interpret_ports(_: &HandlerContext<'_>, raw: &Value) -> Result<FieldValue, String> {
    parse_list(raw).map(FieldValue::Ports)
}

fn interpret_volumes(_: &HandlerContext<'_>, raw: &Value) -> Result<FieldValue, String> {
    parse_list(raw).map(FieldValue::Volumes)
}

fn interpret_build(ctx: &HandlerContext<'_>, raw: &Value) -> Result<FieldValue, String> {
    match raw {
        Value::String(path) => Ok(FieldValue::Build(Build::Path(path.clone()))),
        Value::Object(map) if ctx.table.build_map => match map.get("context") {
            Some(Value::String(_)) => Ok(FieldValue::Build(Build::Detailed(map.clone()))),
            Some(other) => Err(format!(
                "build context must be a string, found {}",
                type_name(other)
            )),
            None => Err("build map requires a 'context' key".to_string()),
        },
        _ if ctx.table.build_map => Err(format!(
            "build must be a path or a map, found {}",
            type_name(raw)
        )),
        _ => Err(format!(
            "build must be a path in {}, found {}",
            ctx.table.dialect,
            type_name(raw)
        )),
    }
}

fn interpret_container_name(_: &HandlerContext<'_>, raw: &Value) -> Result<FieldValue, String> {
    let name = expect_str(raw, "container_name")?;
    if CONTAINER_NAME.is_match(name) {
        Ok(FieldValue::ContainerName(name.to_string()))
    } else {
        Err(format!(
            "Invalid container name '{}': must match [a-zA-Z0-9][a-zA-Z0-9_.-]+",
            name
        ))
    }
}

fn interpret_context(_: &HandlerContext<'_>, raw: &Value) -> Result<FieldValue, String> {
    expect_str(raw, "context").map(|path| FieldValue::Context(path.to_string()))
}

fn interpret_privileged(_: &HandlerContext<'_>, raw: &Value) -> Result<FieldValue, String> {
    raw.as_bool()
        .map(FieldValue::Privileged)
        .ok_or_else(|| format!("privileged must be a boolean, found {}", type_name(raw)))
}
