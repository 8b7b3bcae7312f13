//! Queries and flattened keys over traversal data.

use draversal_core::{Query, QueryOptions, SearchPattern, Traversal, TraversalConfig, TraversalError, demo, demo_data};
use draversal_query::{FlattenConfig, flatten, reconstruct, tokenize};
use pretty_assertions::assert_eq;
use regex::Regex;
use rstest::rstest;
use serde_json::{Value, json};

fn query(clauses: Value) -> Query {
    Query::from_value(clauses, QueryOptions::default()).unwrap()
}

#[test]
fn test_flatten_demo_tree() {
    let flat = flatten(&demo_data(), &FlattenConfig::default());
    let keys: Vec<&str> = flat.keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        vec![
            "title",
            "sections#0.title",
            "sections#1.title",
            "sections#1.sections#0.title",
            "sections#1.sections#1.title",
            "sections#1.sections#1.sections#0.title",
            "sections#2.title",
        ]
    );
}

#[test]
fn test_reconstruct_matches_traversal_nodes() {
    let traversal = demo();
    let config = FlattenConfig::default();
    for (key, value) in flatten(traversal.data(), &config) {
        let item = reconstruct(&key, traversal.data(), &config).unwrap();
        assert_eq!(item.get("title"), Some(&value));

        // The index segments of a title key are the node's path.
        let path: Vec<usize> = tokenize(&key, &config)
            .unwrap()
            .into_iter()
            .filter_map(|segment| match segment {
                draversal_query::Segment::Index(index) => Some(index),
                draversal_query::Segment::Field(_) => None,
            })
            .collect();
        assert_eq!(traversal.get_item_by_path(&path).unwrap()["title"], value);
    }
}

#[rstest]
#[case::exact(json!({"sections#1.title": "Child 2"}), json!({"sections#1.title": "Child 2"}))]
#[case::wildcard_regex(
    json!({"sections#1.sections#*.title$regex": "Grand.*"}),
    json!({
        "sections#1.sections#0.title": "Grandchild 1",
        "sections#1.sections#1.title": "Grandchild 2",
        "sections#1.sections#1.sections#0.title": "Grandgrandchild"
    })
)]
#[case::no_match(json!({"sections#1.title$eq": "Child 9"}), json!({}))]
fn test_query_over_tree(#[case] clauses: Value, #[case] expected: Value) {
    let result = query(clauses).execute(&demo_data()).unwrap();
    assert_eq!(Value::Object(result), expected);
}

#[test]
fn test_query_reconstructs_nested_result() {
    let options = QueryOptions::default().with_reconstruct(true);
    let query = Query::from_value(json!({"sections#1.sections#1.sections#0.title": "Grandgrandchild"}), options).unwrap();
    let result = query.execute(&demo_data()).unwrap();
    assert_eq!(
        Value::Object(result),
        json!({"sections": [{}, {"sections": [{}, {"sections": [{"title": "Grandgrandchild"}]}]}]})
    );
}

#[test]
fn test_search_patterns_agree() {
    let traversal = demo();
    let by_text = traversal.search(&"child".into(), Some("title")).unwrap();
    let by_regex = traversal
        .search(&Regex::new("(?i)child").unwrap().into(), Some("title"))
        .unwrap();
    let by_query = traversal
        .search(&query(json!({"title$regex": "(?i).*child"})).into(), None)
        .unwrap();

    assert_eq!(by_text.len(), 6);
    assert_eq!(by_text, by_regex);
    assert_eq!(by_text, by_query);
}

#[test]
fn test_search_example_tree() {
    let data = json!({"title": "root", "sections": [
        {"title": "Child 1"},
        {"title": "Child 2", "sections": [{"title": "GC1"}]}
    ]});
    let traversal = Traversal::from_value(data, "sections").unwrap();
    let found = traversal.search(&SearchPattern::from("GC1"), Some("title")).unwrap();
    let found: Vec<(Value, Vec<usize>)> = found
        .into_iter()
        .map(|(node, path)| (Value::Object(node.clone()), path))
        .collect();
    assert_eq!(found, vec![(json!({"title": "GC1"}), vec![1, 0])]);
}

#[test]
fn test_config_query_errors_surface_as_traversal_errors() {
    let config = TraversalConfig::default();
    let Value::Object(clauses) = json!({"title$nope": 1}) else {
        unreachable!()
    };
    let err = config.query(clauses).unwrap_err();
    assert!(matches!(err, TraversalError::InvalidQuery(_)), "{err}");
}
