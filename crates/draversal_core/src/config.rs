//! Traversal configuration.

use std::sync::OnceLock;

use draversal_query::{Query, QueryOptions};
use draversal_tree::Node;
use jsonschema::Validator;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::{Traversal, TraversalError, validate_data};

// Embed the schema
const SCHEMA_JSON: &str = include_str!("../../../schemas/v1/config.json");
static CONFIG_SCHEMA: OnceLock<Result<Validator, String>> = OnceLock::new();

fn config_schema() -> Result<&'static Validator, TraversalError> {
    CONFIG_SCHEMA
        .get_or_init(|| {
            let schema_json: Value = serde_json::from_str(SCHEMA_JSON)
                .map_err(|e| format!("Invalid embedded config schema: {}", e))?;
            Validator::new(&schema_json)
                .map_err(|e| format!("Invalid config schema compilation: {}", e))
        })
        .as_ref()
        .map_err(|e| TraversalError::configuration(e.clone()))
}

/// Settings shared by the traversals and queries of one kind of document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraversalConfig {
    /// Field holding the ordered child nodes.
    pub children_field: String,

    /// Field used as the node label by search, path finding and rendering.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_field: Option<String>,

    /// Query key syntax.
    pub query: QueryOptions,
}

fn default_children_field() -> String {
    "sections".to_string()
}

impl TraversalConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self {
            children_field: default_children_field(),
            label_field: None,
            query: QueryOptions::default(),
        }
    }

    /// Parses configuration from a JSON string with schema validation.
    pub fn from_json(json: &str) -> Result<Self, TraversalError> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| TraversalError::configuration(format!("Invalid JSON: {}", e)))?;

        if let Err(e) = config_schema()?.validate(&value) {
            let error_msg = format!("{} at {}", e, e.instance_path());
            return Err(TraversalError::configuration(format!(
                "Config validation failed: {}",
                error_msg
            )));
        }

        let mut config: Self = serde_json::from_value(value)
            .map_err(|e| TraversalError::configuration(format!("Invalid config: {}", e)))?;
        if config.label_field.as_deref() == Some("") {
            warn!("Empty label_field in config, treating it as unset");
            config.label_field = None;
        }
        config.query.flatten_config()?;
        Ok(config)
    }

    /// The label field, if one is configured.
    pub fn label_field(&self) -> Option<&str> {
        self.label_field.as_deref()
    }

    /// Creates a traversal over `root` with the configured children field.
    pub fn traversal(&self, root: Node) -> Result<Traversal<'static>, TraversalError> {
        Traversal::new(root, self.children_field.clone())
    }

    /// Compiles `clauses` with the configured query options.
    pub fn query(&self, clauses: Map<String, Value>) -> Result<Query, TraversalError> {
        Ok(Query::new(clauses, self.query.clone())?)
    }

    /// Runs [`validate_data`] with the configured fields.
    pub fn validate(&self, data: &Value) -> Result<(), TraversalError> {
        validate_data(data, &self.children_field, self.label_field())
    }
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo_data;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn test_default_config() {
        let config = TraversalConfig::default();
        assert_eq!(config.children_field, "sections");
        assert_eq!(config.label_field(), None);
        assert_eq!(config.query, QueryOptions::default());
    }

    #[test]
    fn test_from_json_full() {
        let config = TraversalConfig::from_json(
            r#"{
                "children_field": "items",
                "label_field": "name",
                "query": {"field_separator": "/", "list_index_indicator": "[%d]", "reconstruct": true}
            }"#,
        )
        .unwrap();
        assert_eq!(config.children_field, "items");
        assert_eq!(config.label_field(), Some("name"));
        assert_eq!(config.query.field_separator, "/");
        assert_eq!(config.query.operator_separator, "$");
        assert!(config.query.reconstruct);
    }

    #[test]
    fn test_from_json_partial_uses_defaults() {
        let config = TraversalConfig::from_json(r#"{"label_field": "title"}"#).unwrap();
        assert_eq!(config.children_field, "sections");
        assert_eq!(config.query, QueryOptions::default());
    }

    #[test]
    fn test_from_json_empty_label_is_unset() {
        let config = TraversalConfig::from_json(r#"{"label_field": ""}"#).unwrap();
        assert_eq!(config.label_field(), None);
    }

    #[rstest]
    #[case::invalid_json("{")]
    #[case::unknown_field(r#"{"children": "sections"}"#)]
    #[case::empty_children_field(r#"{"children_field": ""}"#)]
    #[case::wrong_type(r#"{"query": {"support_regex": "yes"}}"#)]
    #[case::bad_indicator(r##"{"query": {"list_index_indicator": "#"}}"##)]
    #[case::indicator_equals_separator(r#"{"query": {"list_index_indicator": ".%d"}}"#)]
    fn test_from_json_rejected(#[case] json: &str) {
        let err = TraversalConfig::from_json(json).unwrap_err();
        assert!(matches!(err, TraversalError::Configuration(_)), "{err}");
    }

    #[test]
    fn test_config_builds_traversal_and_query() {
        let config = TraversalConfig {
            label_field: Some("title".to_string()),
            ..TraversalConfig::default()
        };
        let traversal = config.traversal(demo_data()).unwrap();
        assert_eq!(traversal.count_children(true), 3);

        let Value::Object(clauses) = json!({"title$contains": "Grand"}) else {
            unreachable!()
        };
        let query = config.query(clauses).unwrap();
        let found = traversal.search(&query.into(), None).unwrap();
        assert_eq!(found.len(), 3);

        assert!(config.validate(&Value::Object(demo_data())).is_ok());
    }

    #[test]
    fn test_config_round_trips_through_serde() {
        let config = TraversalConfig {
            children_field: "items".to_string(),
            label_field: Some("name".to_string()),
            query: QueryOptions::default().with_reconstruct(true),
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(TraversalConfig::from_json(&json).unwrap(), config);
    }
}
