//! Sequence-or-map reading for port and volume lists.

use serde_json::Value;
use stevedore_compose::{EncodedList, MappedItem};
use stevedore_core::literal::{scalar_literal, type_name};

/// Read `raw` as a sequence of literals or a source-keyed map.
///
/// Sequence entries may be strings or numbers. In the map form every value is
/// the literal without its source, and must not carry a source of its own.
pub(crate) fn parse_list<T: MappedItem>(raw: &Value) -> Result<EncodedList<T>, String> {
    match raw {
        Value::Array(entries) => {
            let mut items = Vec::with_capacity(entries.len());
            for (index, entry) in entries.iter().enumerate() {
                let literal = scalar_literal(entry).ok_or_else(|| {
                    format!(
                        "entry {} must be a string or number, found {}",
                        index,
                        type_name(entry)
                    )
                })?;
                let item = T::parse_literal(&literal)
                    .map_err(|e| format!("entry {}: {}", index, e))?;
                items.push(item);
            }
            Ok(EncodedList::sequence(items))
        }
        Value::Object(entries) => {
            let mut items = Vec::with_capacity(entries.len());
            for (source, value) in entries {
                let value = scalar_literal(value).ok_or_else(|| {
                    format!(
                        "entry '{}' must map to a string or number, found {}",
                        source,
                        type_name(value)
                    )
                })?;
                let item = T::parse_literal(&format!("{}:{}", source, value))
                    .map_err(|e| format!("entry '{}': {}", source, e))?;
                if item.source() != Some(source.as_str()) {
                    return Err(format!(
                        "entry '{}': value '{}' must not carry its own source",
                        source, value
                    ));
                }
                items.push(item);
            }
            Ok(EncodedList::mapping(items))
        }
        other => Err(format!(
            "expected a sequence or a map, found {}",
            type_name(other)
        )),
    }
}
