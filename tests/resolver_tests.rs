// tests/resolver_tests.rs

use safe_expr::convert::{json_to_scope, json_to_value};
use safe_expr::path::{self, AccessFailure, PathSegment, format_path, parse_path};
use safe_expr::{ReferenceError, ReferenceResolver, Scope, Value};
use serde_json::json;

fn resolver(steps: serde_json::Value, context: serde_json::Value) -> ReferenceResolver {
    ReferenceResolver::new(json_to_scope(steps).unwrap(), json_to_value(context))
}

fn resolve(resolver: &ReferenceResolver, path: &str) -> Result<Value, ReferenceError> {
    resolver.resolve_path(path, &Scope::new())
}

// ============================================================================
// Namespace layers
// ============================================================================

#[test]
fn test_default_resolver_is_empty() {
    let r = ReferenceResolver::default();
    assert!(r.step_results().is_empty());
    assert_eq!(r.context(), &Value::Null);
    assert_eq!(Value::default(), Value::Null);
    assert_eq!(resolve(&r, "context").unwrap(), Value::Null);
}

#[test]
fn test_root_only_returns_whole_value() {
    let r = resolver(json!({"fetch": {"status": 200}}), json!({}));
    assert_eq!(resolve(&r, "fetch").unwrap(), json_to_value(json!({"status": 200})));
}

#[test]
fn test_extra_context_wins_over_steps() {
    let r = resolver(json!({"item": 1}), json!({}));
    let extra = json_to_scope(json!({"item": 2})).unwrap();
    assert_eq!(r.resolve_path("item", &extra).unwrap(), Value::Integer(2));
    assert_eq!(resolve(&r, "item").unwrap(), Value::Integer(1));
}

#[test]
fn test_context_root_is_the_context_object() {
    let r = resolver(json!({"context": "shadow"}), json!({"env": "prod"}));
    assert_eq!(resolve(&r, "context.env").unwrap(), Value::String("prod".into()));
}

#[test]
fn test_extra_context_can_name_context() {
    let r = resolver(json!({}), json!({"env": "prod"}));
    let extra = json_to_scope(json!({"context": {"env": "test"}})).unwrap();
    assert_eq!(
        r.resolve_path("context.env", &extra).unwrap(),
        Value::String("test".into())
    );
}

#[test]
fn test_unknown_root_lists_available_names() {
    let r = resolver(json!({"fetch": 1, "parse": 2}), json!({}));
    let extra = json_to_scope(json!({"item": 0})).unwrap();
    let err = r.resolve_path("missing.x", &extra).unwrap_err();

    match &err {
        ReferenceError::UnknownReference { root, available } => {
            assert_eq!(root, "missing");
            assert_eq!(available, &vec!["item", "fetch", "parse", "context"]);
        }
        other => panic!("Expected unknown reference, got {:?}", other),
    }
    assert_eq!(
        err.to_string(),
        "unknown reference 'missing'. Available references: item, fetch, parse, context"
    );
}

#[test]
fn test_has() {
    let r = resolver(json!({"a": {"b": null}}), json!({}));
    assert!(r.has("a.b", &Scope::new()));
    assert!(!r.has("a.b.c", &Scope::new()));
    assert!(!r.has("z", &Scope::new()));
}

// ============================================================================
// Path walking
// ============================================================================

#[test]
fn test_indices_and_quoted_keys() {
    let r = resolver(
        json!({"resp": {"headers": {"x-id": "abc"}, "rows": [[1, 2], [3, 4]]}}),
        json!({}),
    );
    assert_eq!(resolve(&r, r#"resp.headers["x-id"]"#).unwrap(), Value::String("abc".into()));
    assert_eq!(resolve(&r, "resp.rows[1][0]").unwrap(), Value::Integer(3));
    assert_eq!(resolve(&r, "resp.rows.0.1").unwrap(), Value::Integer(2));
}

#[test]
fn test_length() {
    let r = resolver(json!({"s": "héllo", "xs": [1, 2, 3]}), json!({}));
    assert_eq!(resolve(&r, "s.length").unwrap(), Value::Integer(5));
    assert_eq!(resolve(&r, "xs.length").unwrap(), Value::Integer(3));
}

#[test]
fn test_computed_segments() {
    let r = resolver(
        json!({"rows": ["a", "b", "c"], "users": {"u1": "ann"}, "pick": 2}),
        json!({"who": "u1"}),
    );
    assert_eq!(resolve(&r, "rows[pick]").unwrap(), Value::String("c".into()));
    assert_eq!(resolve(&r, "rows[${pick}]").unwrap(), Value::String("c".into()));
    assert_eq!(resolve(&r, "users[context.who]").unwrap(), Value::String("ann".into()));
}

#[test]
fn test_computed_segment_must_be_key() {
    let r = resolver(json!({"rows": [1], "flag": true}), json!({}));
    let err = resolve(&r, "rows[flag]").unwrap_err();
    assert!(matches!(err, ReferenceError::InvalidKey { found: "boolean", .. }));
}

#[test]
fn test_access_failures() {
    let r = resolver(json!({"user": {"name": "a", "tags": []}, "n": 5}), json!({}));

    let err = resolve(&r, "user.email").unwrap_err();
    assert_eq!(
        err.to_string(),
        "property 'email' does not exist on object in path 'user.email'"
    );

    let err = resolve(&r, "user.tags[0]").unwrap_err();
    assert!(matches!(
        err,
        ReferenceError::PropertyAccess(ref e) if e.failure == AccessFailure::Missing && e.segment == "0"
    ));

    let err = resolve(&r, "n.digits").unwrap_err();
    assert!(matches!(
        err,
        ReferenceError::PropertyAccess(ref e) if e.failure == AccessFailure::NotIndexable && e.target == "number"
    ));
}

#[test]
fn test_path_syntax_error() {
    let r = resolver(json!({"a": {}}), json!({}));
    assert!(matches!(
        resolve(&r, "a[0").unwrap_err(),
        ReferenceError::PathSyntax(_)
    ));
}

#[test]
fn test_deeply_nested_computed_keys() {
    let r = resolver(json!({"x": {"x": "x"}}), json!({}));
    assert_eq!(resolve(&r, "x[x[x.x]]").unwrap(), Value::String("x".into()));

    let n = 300;
    let path = format!("{}x{}", "x[".repeat(n), "]".repeat(n));
    match resolve(&r, &path).unwrap_err() {
        ReferenceError::PathSyntax(err) => assert!(err.message.contains("nested too deeply")),
        other => panic!("Expected path syntax error, got {:?}", other),
    }
}

// ============================================================================
// Path accessor
// ============================================================================

#[test]
fn test_parse_and_format_round_trip() {
    for canonical in [r#"foo[0]["bar-baz"]"#, "foo.bar", r#"a["x y"][2].z"#] {
        let segments = parse_path(canonical).unwrap();
        assert_eq!(format_path(&segments), canonical);
    }
}

#[test]
fn test_single_quoted_keys_format_canonically() {
    let segments = parse_path("foo['bar-baz']").unwrap();
    assert_eq!(format_path(&segments), r#"foo["bar-baz"]"#);
}

#[test]
fn test_get_and_has_on_values() {
    let root = json_to_value(json!({"a": [{"b": 1}]}));
    let segments = vec![
        PathSegment::Property("a".into()),
        PathSegment::Index(0),
        PathSegment::Property("b".into()),
    ];
    assert_eq!(path::get(&root, &segments, "a[0].b").unwrap(), Value::Integer(1));
    assert!(path::has(&root, &segments));
    assert!(!path::has(&root, &[PathSegment::Property("missing".into())]));
}

#[test]
fn test_path_syntax_positions() {
    let err = parse_path("a.b[\"c").unwrap_err();
    assert_eq!(err.position, 4);
    assert_eq!(err.path, "a.b[\"c");

    let err = parse_path("a[[0]]").unwrap_err();
    assert_eq!(err.position, 1);
}
