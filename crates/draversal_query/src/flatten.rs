//! Flatten and reconstruct transform.
//!
//! A flattened key joins field names with a separator and renders positions
//! in sequences of objects with an index token:
//!
//! ```text
//! {"a": {"b": {"c": 1}}, "d": [{"e": 2}, {"f": 3}]}
//!   => {"a.b.c": 1, "d#0.e": 2, "d#1.f": 3}
//! ```
//!
//! The same [`FlattenConfig`] must be used in both directions.

use serde_json::{Map, Value};

use crate::QueryError;

const PLACEHOLDERS: [&str; 2] = ["%d", "%s"];

/// Separator and index token used to build and parse flattened keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlattenConfig {
    field_separator: String,
    list_index_indicator: String,
    index_prefix: String,
    index_suffix: String,
}

impl FlattenConfig {
    /// Creates a configuration.
    ///
    /// `list_index_indicator` is a template with exactly one `%d` (or `%s`)
    /// placeholder for the position, preceded by a non-empty token, e.g.
    /// `#%d` or `[%d]`.
    pub fn new(
        field_separator: impl Into<String>,
        list_index_indicator: impl Into<String>,
    ) -> Result<Self, QueryError> {
        let field_separator = field_separator.into();
        let list_index_indicator = list_index_indicator.into();

        if field_separator.is_empty() {
            return Err(QueryError::configuration("field separator must not be empty"));
        }

        let occurrences: Vec<(usize, &str)> = PLACEHOLDERS
            .iter()
            .flat_map(|placeholder| list_index_indicator.match_indices(placeholder))
            .collect();
        let [(at, placeholder)] = occurrences.as_slice() else {
            return Err(QueryError::configuration(format!(
                "list index indicator '{list_index_indicator}' must contain exactly one %d or %s placeholder"
            )));
        };

        let index_prefix = list_index_indicator[..*at].to_string();
        let index_suffix = list_index_indicator[at + placeholder.len()..].to_string();
        if index_prefix.is_empty() {
            return Err(QueryError::configuration(format!(
                "list index indicator '{list_index_indicator}' needs a token before the placeholder"
            )));
        }
        if index_prefix.starts_with(&field_separator) || field_separator.starts_with(&index_prefix) {
            return Err(QueryError::configuration(format!(
                "list index token '{index_prefix}' and field separator '{field_separator}' must not start with one another"
            )));
        }

        Ok(Self {
            field_separator,
            list_index_indicator,
            index_prefix,
            index_suffix,
        })
    }

    /// The separator placed between field names.
    pub fn field_separator(&self) -> &str {
        &self.field_separator
    }

    /// The index token template, as given at construction.
    pub fn list_index_indicator(&self) -> &str {
        &self.list_index_indicator
    }

    fn index_token(&self, position: usize) -> String {
        format!("{}{}{}", self.index_prefix, position, self.index_suffix)
    }
}

impl Default for FlattenConfig {
    fn default() -> Self {
        Self {
            field_separator: ".".to_string(),
            list_index_indicator: "#%d".to_string(),
            index_prefix: "#".to_string(),
            index_suffix: String::new(),
        }
    }
}

/// One token of a flattened key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// A field name inside an object.
    Field(String),
    /// A position inside a sequence.
    Index(usize),
}

/// Flattens `node` into a single-level mapping of flattened keys.
///
/// Objects are descended into; sequences are descended into only when every
/// element is an object. Any other value, including mixed sequences, ends the
/// recursion and becomes an entry. Empty objects and empty sequences produce
/// no entries.
pub fn flatten(node: &Map<String, Value>, config: &FlattenConfig) -> Map<String, Value> {
    let mut flat = Map::new();
    flatten_into(node, None, config, &mut flat);
    flat
}

fn flatten_into(
    node: &Map<String, Value>,
    parent_key: Option<&str>,
    config: &FlattenConfig,
    flat: &mut Map<String, Value>,
) {
    for (field, value) in node {
        let key = match parent_key {
            Some(parent) => format!("{parent}{}{field}", config.field_separator),
            None => field.clone(),
        };
        match value {
            Value::Object(child) => flatten_into(child, Some(&key), config, flat),
            Value::Array(items) if items.iter().all(Value::is_object) => {
                for (position, item) in items.iter().enumerate() {
                    if let Value::Object(child) = item {
                        let item_key = format!("{key}{}", config.index_token(position));
                        flatten_into(child, Some(&item_key), config, flat);
                    }
                }
            }
            _ => {
                flat.insert(key, value.clone());
            }
        }
    }
}

/// Splits a flattened key into field and index segments.
pub fn tokenize(key: &str, config: &FlattenConfig) -> Result<Vec<Segment>, QueryError> {
    let separator = config.field_separator.as_str();
    let prefix = config.index_prefix.as_str();
    let suffix = config.index_suffix.as_str();

    let mut segments = Vec::new();
    let mut rest = key;
    loop {
        let end = [rest.find(separator), rest.find(prefix)]
            .into_iter()
            .flatten()
            .min()
            .unwrap_or(rest.len());
        let (field, tail) = rest.split_at(end);
        if field.is_empty() {
            return Err(QueryError::invalid_query(format!(
                "empty field name in key '{key}'"
            )));
        }
        segments.push(Segment::Field(field.to_string()));
        rest = tail;

        while let Some(after_prefix) = rest.strip_prefix(prefix) {
            let digits = after_prefix.bytes().take_while(u8::is_ascii_digit).count();
            let position = after_prefix[..digits].parse::<usize>().map_err(|_| {
                QueryError::invalid_query(format!("missing list index in key '{key}'"))
            })?;
            rest = after_prefix[digits..].strip_prefix(suffix).ok_or_else(|| {
                QueryError::invalid_query(format!("unterminated list index in key '{key}'"))
            })?;
            segments.push(Segment::Index(position));
        }

        if rest.is_empty() {
            return Ok(segments);
        }
        rest = rest.strip_prefix(separator).ok_or_else(|| {
            QueryError::invalid_query(format!("unexpected '{rest}' in key '{key}'"))
        })?;
    }
}

/// Follows `segments` into `node`.
pub fn resolve<'a>(node: &'a Map<String, Value>, segments: &[Segment]) -> Option<&'a Value> {
    let (Segment::Field(first), rest) = segments.split_first()? else {
        return None;
    };
    let mut value = node.get(first)?;
    for segment in rest {
        value = match segment {
            Segment::Field(field) => value.as_object()?.get(field)?,
            Segment::Index(position) => value.as_array()?.get(*position)?,
        };
    }
    Some(value)
}

/// Rebuilds the minimal element holding the value of one flattened key.
///
/// The result is the object that directly contains the key's last field,
/// reduced to that single field: `sections#1.title` on a tree yields
/// `{"title": <value>}`.
pub fn reconstruct(
    key: &str,
    node: &Map<String, Value>,
    config: &FlattenConfig,
) -> Result<Map<String, Value>, QueryError> {
    let segments = tokenize(key, config)?;
    let Some((Segment::Field(field), parents)) = segments.split_last() else {
        return Err(QueryError::invalid_query(format!(
            "key '{key}' must end with a field name"
        )));
    };

    let container = if parents.is_empty() {
        Some(node)
    } else {
        resolve(node, parents).and_then(Value::as_object)
    };
    let value = container
        .and_then(|container| container.get(field))
        .ok_or_else(|| QueryError::address(key))?;

    let mut item = Map::new();
    item.insert(field.clone(), value.clone());
    Ok(item)
}

/// Rebuilds nested objects and sequences from a flat mapping.
///
/// Sequence positions missing from the mapping are filled with empty objects.
pub fn unflatten(
    flat: &Map<String, Value>,
    config: &FlattenConfig,
) -> Result<Map<String, Value>, QueryError> {
    let mut nested = Map::new();
    for (key, value) in flat {
        let segments = tokenize(key, config)?;
        insert_at(&mut nested, &segments, value.clone())?;
    }
    Ok(nested)
}

/// Places `value` at `segments` inside `target`, creating containers on the
/// way.
pub(crate) fn insert_at(
    target: &mut Map<String, Value>,
    segments: &[Segment],
    value: Value,
) -> Result<(), QueryError> {
    let Some((Segment::Field(field), rest)) = segments.split_first() else {
        return Err(QueryError::invalid_query("key must start with a field name"));
    };
    let Some(next) = rest.first() else {
        target.insert(field.clone(), value);
        return Ok(());
    };

    match next {
        Segment::Field(_) => {
            let slot = target
                .entry(field.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            let Value::Object(child) = slot else {
                return Err(conflict(field));
            };
            insert_at(child, rest, value)
        }
        Segment::Index(_) => {
            let slot = target
                .entry(field.clone())
                .or_insert_with(|| Value::Array(Vec::new()));
            let Value::Array(items) = slot else {
                return Err(conflict(field));
            };
            insert_indexed(items, rest, value)
        }
    }
}

fn insert_indexed(items: &mut Vec<Value>, segments: &[Segment], value: Value) -> Result<(), QueryError> {
    let Some((Segment::Index(position), rest)) = segments.split_first() else {
        return Err(QueryError::invalid_query("expected a list index"));
    };
    if items.len() <= *position {
        items.resize(*position + 1, Value::Object(Map::new()));
    }
    let slot = &mut items[*position];

    match rest.first() {
        None => {
            *slot = value;
            Ok(())
        }
        Some(Segment::Field(_)) => {
            let Value::Object(child) = slot else {
                return Err(conflict(&position.to_string()));
            };
            insert_at(child, rest, value)
        }
        Some(Segment::Index(_)) => {
            if slot.as_object().is_some_and(Map::is_empty) {
                *slot = Value::Array(Vec::new());
            }
            let Value::Array(inner) = slot else {
                return Err(conflict(&position.to_string()));
            };
            insert_indexed(inner, rest, value)
        }
    }
}

fn conflict(at: &str) -> QueryError {
    QueryError::invalid_query(format!("conflicting key shapes at '{at}'"))
}
