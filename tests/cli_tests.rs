// tests/cli_tests.rs

use safe_expr::cli::{CliError, EvalOptions, execute_eval, execute_refs, get_doc_category, get_docs_overview};
use safe_expr::ErrorKind;
use safe_expr::evaluator::functions::BUILTINS;
use serde_json::json;

fn options(expression: &str) -> EvalOptions {
    EvalOptions {
        expression: expression.to_string(),
        ..Default::default()
    }
}

// ============================================================================
// eval
// ============================================================================

#[test]
fn test_eval_with_steps_and_context() {
    let opts = EvalOptions {
        steps: Some(r#"{"fetch": {"items": [1, 2, 3]}}"#.to_string()),
        context: Some(r#"{"extra": [4]}"#.to_string()),
        ..options("[...${fetch.items}, ...${context.extra}]")
    };
    assert_eq!(execute_eval(&opts).unwrap(), json!([1, 2, 3, 4]));
}

#[test]
fn test_eval_vars_shadow_steps() {
    let opts = EvalOptions {
        steps: Some(r#"{"x": 1}"#.to_string()),
        vars: Some(r#"{"x": 5}"#.to_string()),
        ..options("${x} * 2")
    };
    assert_eq!(execute_eval(&opts).unwrap(), json!(10));
}

#[test]
fn test_eval_undefined_becomes_null() {
    assert_eq!(execute_eval(&options("undefined")).unwrap(), json!(null));
}

#[test]
fn test_eval_preserves_object_order() {
    let output = execute_eval(&options("{ b: 1, a: 2 }")).unwrap();
    assert_eq!(serde_json::to_string(&output).unwrap(), r#"{"b":1,"a":2}"#);
}

#[test]
fn test_eval_invalid_json() {
    let opts = EvalOptions {
        context: Some("{not json".to_string()),
        ..options("1")
    };
    assert!(matches!(execute_eval(&opts), Err(CliError::Json(_))));
}

#[test]
fn test_eval_steps_must_be_object() {
    let opts = EvalOptions {
        steps: Some("[1, 2]".to_string()),
        ..options("1")
    };
    let err = execute_eval(&opts).unwrap_err();
    assert!(matches!(err, CliError::NotAnObject("--steps")));
    assert_eq!(err.to_string(), "--steps must be a JSON object");
}

#[test]
fn test_eval_expression_error() {
    match execute_eval(&options("${missing}")) {
        Err(CliError::Expression(err)) => assert_eq!(err.kind(), ErrorKind::Reference),
        other => panic!("Expected expression error, got {:?}", other),
    }
}

#[test]
fn test_eval_limits() {
    let opts = EvalOptions {
        timeout_ms: Some(0),
        ..options("1 + 1")
    };
    match execute_eval(&opts) {
        Err(CliError::Expression(err)) => assert!(err.is_timeout()),
        other => panic!("Expected timeout, got {:?}", other),
    }

    let opts = EvalOptions {
        max_length: Some(3),
        ..options("1 + 1")
    };
    match execute_eval(&opts) {
        Err(CliError::Expression(err)) => assert_eq!(err.kind(), ErrorKind::Security),
        other => panic!("Expected validation error, got {:?}", other),
    }
}

// ============================================================================
// refs
// ============================================================================

#[test]
fn test_refs_excludes_loop_aliases() {
    assert_eq!(execute_refs("`${user.name} and ${item}`"), vec!["user"]);
}

#[test]
fn test_refs_never_fails() {
    assert!(execute_refs("${open").is_empty());
}

// ============================================================================
// docs
// ============================================================================

#[test]
fn test_docs_overview_lists_categories() {
    let overview = get_docs_overview();
    for category in ["syntax", "operators", "references", "functions", "errors"] {
        assert!(overview.contains(category), "missing {}", category);
        assert!(get_doc_category(category).is_ok());
    }
}

#[test]
fn test_functions_doc_lists_every_builtin() {
    let doc = get_doc_category("functions").unwrap();
    for (name, _) in BUILTINS {
        assert!(doc.contains(&format!("{}(", name)), "missing {}", name);
    }
}

#[test]
fn test_doc_aliases() {
    assert_eq!(get_doc_category("ops").unwrap(), get_doc_category("operators").unwrap());
    assert!(get_doc_category("OPERATORS").is_ok());
}

#[test]
fn test_unknown_doc_category() {
    let err = get_doc_category("nope").unwrap_err();
    assert!(matches!(err, CliError::UnknownCategory(ref c) if c == "nope"));
}
