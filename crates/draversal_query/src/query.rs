//! Query matching over flattened keys.

use globset::{GlobBuilder, GlobMatcher};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::QueryError;
use crate::flatten::{FlattenConfig, flatten, insert_at, reconstruct, tokenize};
use crate::operator::Operator;

/// Options controlling how query keys are parsed and matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryOptions {
    /// Separator between field names in flattened keys.
    pub field_separator: String,
    /// Index token template for positions in sequences of objects.
    pub list_index_indicator: String,
    /// Separator between a key pattern and its operator.
    pub operator_separator: String,
    /// Enables `*`, `?` and `[...]` patterns in keys.
    pub support_wildcards: bool,
    /// Enables `/pattern/` keys.
    pub support_regex: bool,
    /// Return matches as nested objects instead of flattened keys.
    pub reconstruct: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            field_separator: ".".to_string(),
            list_index_indicator: "#%d".to_string(),
            operator_separator: "$".to_string(),
            support_wildcards: true,
            support_regex: true,
            reconstruct: false,
        }
    }
}

impl QueryOptions {
    /// Returns a copy with `reconstruct` set.
    pub fn with_reconstruct(mut self, reconstruct: bool) -> Self {
        self.reconstruct = reconstruct;
        self
    }

    /// Builds the flatten configuration these options describe.
    pub fn flatten_config(&self) -> Result<FlattenConfig, QueryError> {
        FlattenConfig::new(&self.field_separator, &self.list_index_indicator)
    }
}

/// How a key pattern selected a flattened key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    Exact,
    Wildcard,
    Regex,
}

#[derive(Debug, Clone)]
struct KeyPattern {
    raw: String,
    glob: Option<GlobMatcher>,
    regex: Option<Regex>,
}

impl KeyPattern {
    fn compile(raw: &str, options: &QueryOptions) -> Result<Self, QueryError> {
        let delimited = is_delimited_regex(raw);

        let glob = if options.support_wildcards && has_wildcard(raw) {
            match GlobBuilder::new(raw).literal_separator(false).build() {
                Ok(glob) => Some(glob.compile_matcher()),
                // `/[a-/` style keys are regexes that happen to look like globs.
                Err(_) if delimited && options.support_regex => None,
                Err(e) => {
                    return Err(QueryError::invalid_query(format!(
                        "invalid wildcard pattern '{raw}': {e}"
                    )));
                }
            }
        } else {
            None
        };

        let regex = if options.support_regex && delimited {
            let inner = raw.trim_matches('/');
            let regex = Regex::new(&format!("^(?:{inner})")).map_err(|e| {
                QueryError::invalid_query(format!("invalid key pattern '{raw}': {e}"))
            })?;
            Some(regex)
        } else {
            None
        };

        Ok(Self {
            raw: raw.to_string(),
            glob,
            regex,
        })
    }

    /// Exact comparison wins over wildcard, wildcard over regex.
    fn matches(&self, key: &str) -> Option<MatchMode> {
        if self.raw == key {
            return Some(MatchMode::Exact);
        }
        if let Some(glob) = &self.glob
            && glob.is_match(key)
        {
            return Some(MatchMode::Wildcard);
        }
        if let Some(regex) = &self.regex
            && regex.is_match(key)
        {
            return Some(MatchMode::Regex);
        }
        None
    }
}

fn has_wildcard(raw: &str) -> bool {
    raw.contains('*') || raw.contains('?') || (raw.contains('[') && raw.contains(']'))
}

fn is_delimited_regex(raw: &str) -> bool {
    raw.len() >= 2 && raw.starts_with('/') && raw.ends_with('/')
}

#[derive(Debug, Clone)]
struct Clause {
    key: String,
    pattern: KeyPattern,
    operator: Operator,
    expected: Value,
    value_pattern: Option<Regex>,
}

impl Clause {
    fn parse(key: &str, expected: Value, options: &QueryOptions) -> Result<Self, QueryError> {
        let (base, operator) = split_operator(key, options);
        let operator = match operator {
            Some(name) => name.parse::<Operator>()?,
            None => Operator::Eq,
        };
        let value_pattern = match operator {
            Operator::Regex => Some(Operator::compile_pattern(&expected)?),
            _ => None,
        };

        Ok(Self {
            key: key.to_string(),
            pattern: KeyPattern::compile(base, options)?,
            operator,
            expected,
            value_pattern,
        })
    }

    fn accepts(&self, actual: &Value) -> bool {
        self.operator
            .apply(actual, &self.expected, self.value_pattern.as_ref())
    }
}

/// Splits `key` into its pattern and operator name.
///
/// The separator inside a `/.../` pattern does not count.
fn split_operator<'k>(key: &'k str, options: &QueryOptions) -> (&'k str, Option<&'k str>) {
    let separator = options.operator_separator.as_str();

    if options.support_regex
        && key.starts_with('/')
        && let Some(close) = key.rfind('/').filter(|&close| close > 0)
    {
        let (pattern, rest) = key.split_at(close + 1);
        if rest.is_empty() {
            return (pattern, None);
        }
        if let Some(operator) = rest.strip_prefix(separator) {
            return (pattern, Some(operator));
        }
    }

    match key.split_once(separator) {
        Some((pattern, operator)) => (pattern, Some(operator)),
        None => (key, None),
    }
}

/// A compiled query.
///
/// Every clause is a key pattern with an optional operator suffix mapped to
/// an expected value. A node matches when every clause that selects at least
/// one flattened key has at least one satisfying entry, and some clause was
/// satisfied at all.
#[derive(Debug, Clone)]
pub struct Query {
    clauses: Vec<Clause>,
    options: QueryOptions,
    flatten: FlattenConfig,
}

impl Query {
    /// Compiles a query from its clauses.
    pub fn new(clauses: Map<String, Value>, options: QueryOptions) -> Result<Self, QueryError> {
        if options.operator_separator.is_empty() {
            return Err(QueryError::configuration(
                "operator separator must not be empty",
            ));
        }
        let flatten = options.flatten_config()?;
        let clauses = clauses
            .into_iter()
            .map(|(key, expected)| Clause::parse(&key, expected, &options))
            .collect::<Result<Vec<_>, _>>()?;

        debug!("Compiled query with {} clause(s)", clauses.len());
        Ok(Self {
            clauses,
            options,
            flatten,
        })
    }

    /// Compiles a query from a JSON object.
    pub fn from_value(query: Value, options: QueryOptions) -> Result<Self, QueryError> {
        match query {
            Value::Object(clauses) => Self::new(clauses, options),
            other => Err(QueryError::invalid_query(format!(
                "query must be an object, got {other}"
            ))),
        }
    }

    pub fn options(&self) -> &QueryOptions {
        &self.options
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Runs the query against `node`.
    ///
    /// Returns the satisfying flattened entries in flattened order, or the
    /// nested elements holding them when `reconstruct` is set. An empty
    /// result means no match.
    pub fn execute(&self, node: &Map<String, Value>) -> Result<Map<String, Value>, QueryError> {
        let flat = flatten(node, &self.flatten);
        let matched = self.select(&flat);
        if !self.options.reconstruct || matched.is_empty() {
            return Ok(matched);
        }

        let mut nested = Map::new();
        for key in matched.keys() {
            let segments = tokenize(key, &self.flatten)?;
            for (_, value) in reconstruct(key, node, &self.flatten)? {
                insert_at(&mut nested, &segments, value)?;
            }
        }
        Ok(nested)
    }

    /// Returns true if `node` produces a non-empty result.
    pub fn is_match(&self, node: &Map<String, Value>) -> bool {
        let flat = flatten(node, &self.flatten);
        !self.select(&flat).is_empty()
    }

    fn select(&self, flat: &Map<String, Value>) -> Map<String, Value> {
        let mut keep = vec![false; flat.len()];
        let mut satisfied_any = false;

        for clause in &self.clauses {
            let mut selected = 0usize;
            let mut satisfied = 0usize;
            for (position, (key, value)) in flat.iter().enumerate() {
                let Some(mode) = clause.pattern.matches(key) else {
                    continue;
                };
                selected += 1;
                trace!("Clause '{}' selected '{}' ({:?})", clause.key, key, mode);
                if clause.accepts(value) {
                    keep[position] = true;
                    satisfied += 1;
                }
            }

            if selected > 0 && satisfied == 0 {
                trace!(
                    "Clause '{}' selected {} key(s), none satisfied {}",
                    clause.key, selected, clause.operator
                );
                return Map::new();
            }
            satisfied_any |= satisfied > 0;
        }

        if !satisfied_any {
            return Map::new();
        }
        flat.iter()
            .zip(keep)
            .filter(|(_, keep)| *keep)
            .map(|((key, value), _)| (key.clone(), value.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected an object, got {other}"),
        }
    }

    fn sample() -> Map<String, Value> {
        object(json!({"a": {"b": {"c": 1}}, "d": [{"e": 2}, {"f": 3}]}))
    }

    fn run(query: Value, options: QueryOptions, node: &Map<String, Value>) -> Value {
        let query = Query::from_value(query, options).unwrap();
        Value::Object(query.execute(node).unwrap())
    }

    #[rstest]
    #[case::exact(json!({"a.b.c": 1}), json!({"a.b.c": 1}))]
    #[case::operator(json!({"d#1.f$gt": 2}), json!({"d#1.f": 3}))]
    #[case::operator_fails(json!({"d#1.f$gt": 3}), json!({}))]
    #[case::wildcard_all(json!({"*": 1}), json!({"a.b.c": 1}))]
    #[case::regex_all(json!({"/.*/": 1}), json!({"a.b.c": 1}))]
    #[case::wildcard_index(json!({"d#?.*$ge": 2}), json!({"d#0.e": 2, "d#1.f": 3}))]
    #[case::regex_with_operator(json!({"/d#\\d+\\.[ef]/$lt": 3}), json!({"d#0.e": 2}))]
    #[case::exists(json!({"a.b.c$exists": true}), json!({"a.b.c": 1}))]
    #[case::missing_key(json!({"x.y": 1}), json!({}))]
    #[case::empty_query(json!({}), json!({}))]
    fn test_execute(#[case] query: Value, #[case] expected: Value) {
        assert_eq!(run(query, QueryOptions::default(), &sample()), expected);
    }

    #[test]
    fn test_every_selecting_clause_must_be_satisfied() {
        let node = sample();
        assert_eq!(
            run(json!({"a.b.c": 1, "d#0.e": 2}), QueryOptions::default(), &node),
            json!({"a.b.c": 1, "d#0.e": 2})
        );
        assert_eq!(
            run(json!({"a.b.c": 1, "d#0.e": 5}), QueryOptions::default(), &node),
            json!({})
        );
        // A clause that selects nothing does not veto the others.
        assert_eq!(
            run(json!({"a.b.c": 1, "zzz": 5}), QueryOptions::default(), &node),
            json!({"a.b.c": 1})
        );
    }

    #[test]
    fn test_results_follow_flattened_order() {
        let node = sample();
        let result = run(
            json!({"d#1.f": 3, "a.b.c": 1}),
            QueryOptions::default(),
            &node,
        );
        let keys: Vec<&str> = result
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, vec!["a.b.c", "d#1.f"]);
    }

    #[test]
    fn test_reconstruct_nested() {
        let node = sample();
        let options = QueryOptions::default().with_reconstruct(true);
        assert_eq!(
            run(json!({"d#1.f$gt": 2}), options.clone(), &node),
            json!({"d": [{}, {"f": 3}]})
        );
        assert_eq!(
            run(json!({"*": 1}), options, &node),
            json!({"a": {"b": {"c": 1}}})
        );
    }

    #[test]
    fn test_disabled_patterns_are_literal() {
        let node = sample();
        let options = QueryOptions {
            support_wildcards: false,
            support_regex: false,
            ..QueryOptions::default()
        };
        assert_eq!(run(json!({"*": 1}), options.clone(), &node), json!({}));
        assert_eq!(run(json!({"/.*/": 1}), options, &node), json!({}));
    }

    #[test]
    fn test_label_regex_query() {
        let node = object(json!({"title": "Grandchild 1"}));
        let query = Query::from_value(
            json!({"*title$regex": "(?i).*child.*"}),
            QueryOptions::default(),
        )
        .unwrap();
        assert!(query.is_match(&node));
        assert!(!query.is_match(&object(json!({"title": "root"}))));
    }

    #[test]
    fn test_custom_separators() {
        let node = sample();
        let options = QueryOptions {
            field_separator: "/".to_string(),
            list_index_indicator: "[%d]".to_string(),
            operator_separator: "::".to_string(),
            ..QueryOptions::default()
        };
        assert_eq!(
            run(json!({"d[1]/f::ge": 3}), options, &node),
            json!({"d[1]/f": 3})
        );
    }

    #[rstest]
    #[case::unknown_operator(json!({"a$between": 1}))]
    #[case::empty_operator(json!({"a$": 1}))]
    #[case::bad_regex_key(json!({"/(a/": 1}))]
    #[case::bad_value_pattern(json!({"a$regex": "(a"}))]
    #[case::non_string_value_pattern(json!({"a$regex": 1}))]
    #[case::not_an_object(json!([1, 2]))]
    fn test_invalid_query(#[case] query: Value) {
        let err = Query::from_value(query, QueryOptions::default()).unwrap_err();
        assert!(matches!(err, QueryError::InvalidQuery(_)), "{err}");
    }

    #[test]
    fn test_invalid_options() {
        let options = QueryOptions {
            operator_separator: String::new(),
            ..QueryOptions::default()
        };
        let err = Query::from_value(json!({"a": 1}), options).unwrap_err();
        assert!(matches!(err, QueryError::Configuration(_)));

        let options = QueryOptions {
            list_index_indicator: "#".to_string(),
            ..QueryOptions::default()
        };
        let err = Query::from_value(json!({"a": 1}), options).unwrap_err();
        assert!(matches!(err, QueryError::Configuration(_)));
    }

    #[test]
    fn test_split_operator() {
        let options = QueryOptions::default();
        assert_eq!(split_operator("a.b$gt", &options), ("a.b", Some("gt")));
        assert_eq!(split_operator("a.b", &options), ("a.b", None));
        assert_eq!(split_operator("/a$b/$eq", &options), ("/a$b/", Some("eq")));
        assert_eq!(split_operator("/a$b/", &options), ("/a$b/", None));
    }

    #[test]
    fn test_match_mode_precedence() {
        let options = QueryOptions::default();
        let pattern = KeyPattern::compile("a*", &options).unwrap();
        assert_eq!(pattern.matches("a*"), Some(MatchMode::Exact));
        assert_eq!(pattern.matches("ab"), Some(MatchMode::Wildcard));
        assert_eq!(pattern.matches("ba"), None);

        let pattern = KeyPattern::compile("/a.c/", &options).unwrap();
        assert_eq!(pattern.matches("abc"), Some(MatchMode::Regex));
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let options: QueryOptions =
            serde_json::from_value(json!({"reconstruct": true, "field_separator": "/"})).unwrap();
        assert_eq!(
            options,
            QueryOptions {
                field_separator: "/".to_string(),
                reconstruct: true,
                ..QueryOptions::default()
            }
        );
    }
}
