// tests/lexer_tests.rs

use safe_expr::lexer::tokenize;
use safe_expr::{Token, TokenKind};

fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
    tokens.iter().map(|t| t.kind).collect()
}

fn raws(tokens: &[Token]) -> Vec<&str> {
    tokens.iter().map(|t| t.raw.as_str()).collect()
}

// ============================================================================
// Scalars
// ============================================================================

#[test]
fn test_numbers_and_identifiers() {
    let tokens = tokenize("3.14 + count").unwrap();
    assert_eq!(
        kinds(&tokens),
        vec![TokenKind::Number, TokenKind::Operator, TokenKind::Identifier]
    );
    assert_eq!(raws(&tokens), vec!["3.14", "+", "count"]);
}

#[test]
fn test_negative_number_is_two_tokens() {
    let tokens = tokenize("-42").unwrap();
    assert_eq!(kinds(&tokens), vec![TokenKind::Operator, TokenKind::Number]);
}

#[test]
fn test_string_escapes() {
    let tokens = tokenize(r#""a\tb\"c" + 'it\'s'"#).unwrap();
    assert_eq!(tokens[0].kind, TokenKind::StringLit);
    assert_eq!(tokens[0].value_text(), "a\tb\"c");
    assert_eq!(tokens[2].value_text(), "it's");
}

#[test]
fn test_keywords_are_identifiers() {
    let tokens = tokenize("true && null").unwrap();
    assert_eq!(tokens[0].kind, TokenKind::Identifier);
    assert_eq!(tokens[2].raw, "null");
}

// ============================================================================
// Operators
// ============================================================================

#[test]
fn test_every_operator() {
    let expr = "1 === 1 !== 1 == 1 != 1 <= 1 >= 1 && 1 || 1 ?? 1 < 1 > 1 + 1 - 1 * 1 / 1 % 1";
    let tokens = tokenize(expr).unwrap();
    let ops: Vec<&str> = tokens
        .iter()
        .filter(|t| t.kind == TokenKind::Operator)
        .map(|t| t.raw.as_str())
        .collect();
    assert_eq!(
        ops,
        vec!["===", "!==", "==", "!=", "<=", ">=", "&&", "||", "??", "<", ">", "+", "-", "*", "/", "%"]
    );
}

#[test]
fn test_invalid_operator() {
    let err = tokenize("a = b").unwrap_err();
    assert!(err.message.contains("Invalid operator '='"));
    assert_eq!(err.position, Some(2));
}

#[test]
fn test_adjacent_operators_rejected() {
    let err = tokenize("5 * -3").unwrap_err();
    assert!(err.message.contains("Invalid operator sequence '* -'"));
}

// ============================================================================
// References and templates
// ============================================================================

#[test]
fn test_nested_reference_is_one_token() {
    let tokens = tokenize("${rows[${cursor}]} + 1").unwrap();
    assert_eq!(tokens.len(), 3);
    assert_eq!(tokens[0].kind, TokenKind::Reference);
    assert_eq!(tokens[0].raw, "rows[${cursor}]");

    let inner = tokens[0].children();
    assert_eq!(kinds(inner), vec![TokenKind::Identifier, TokenKind::ArrayLiteral]);
    assert_eq!(inner[1].children()[0].kind, TokenKind::Reference);
}

#[test]
fn test_reference_raw_is_trimmed() {
    let tokens = tokenize("${  user.name  }").unwrap();
    assert_eq!(tokens[0].raw, "user.name");
}

#[test]
fn test_unterminated_reference() {
    let err = tokenize("${user.name + 1").unwrap_err();
    assert!(err.message.contains("Unterminated reference"));
    assert_eq!(err.position, Some(0));
}

#[test]
fn test_bare_dollar_identifier_rejected() {
    let err = tokenize("$user + 1").unwrap_err();
    assert!(err.message.contains("Invalid reference '$user'"));
}

#[test]
fn test_template_parts() {
    let tokens = tokenize("`Hello ${user.name}, you have ${count} items`").unwrap();
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenKind::TemplateLiteral);

    let parts = tokens[0].children();
    assert_eq!(
        kinds(parts),
        vec![
            TokenKind::StringLit,
            TokenKind::Reference,
            TokenKind::StringLit,
            TokenKind::Reference,
            TokenKind::StringLit,
        ]
    );
    assert_eq!(parts[0].value_text(), "Hello ");
    assert_eq!(parts[3].raw, "count");
    assert_eq!(parts[4].value_text(), " items");
}

#[test]
fn test_unterminated_template() {
    assert!(tokenize("`open ${a}").unwrap_err().message.contains("template"));
}

// ============================================================================
// Containers and spread
// ============================================================================

#[test]
fn test_object_literal_children() {
    let tokens = tokenize(r#"{ a: 1, "b-c": [2, 3] }"#).unwrap();
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenKind::ObjectLiteral);
    assert_eq!(
        raws(tokens[0].children()),
        vec!["a", ":", "1", ",", r#""b-c""#, ":", "[2, 3]"]
    );
}

#[test]
fn test_braces_inside_strings_do_not_close_containers() {
    let tokens = tokenize(r#"{ text: "}" }"#).unwrap();
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].children()[2].value_text(), "}");
}

#[test]
fn test_spread_marker_positions() {
    for expr in ["[...${a}, 1]", "[1, ...${a}, 2]", "[1, ...${a}]", "['x',...${a}]"] {
        let tokens = tokenize(expr).unwrap();
        let spreads = tokens[0]
            .children()
            .iter()
            .filter(|t| t.is_punct("..."))
            .count();
        assert_eq!(spreads, 1, "in {}", expr);
    }
}

#[test]
fn test_dots_in_text_are_not_spread() {
    let tokens = tokenize(r#"["...", a.b]"#).unwrap();
    assert!(!tokens[0].children().iter().any(|t| t.is_punct("...")));
}

#[test]
fn test_unbalanced_parentheses() {
    assert!(tokenize("(1 + 2").unwrap_err().message.contains("Unbalanced parentheses"));
    assert!(tokenize("1 + 2)").unwrap_err().message.contains("Unbalanced parentheses"));
    assert!(tokenize("[1, 2").unwrap_err().message.contains("Unterminated array literal"));
    assert!(tokenize("1 }").unwrap_err().message.contains("Unbalanced braces"));
}

#[test]
fn test_empty_expression() {
    assert_eq!(tokenize("   ").unwrap_err().message, "Empty expression");
}
