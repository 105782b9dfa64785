use thiserror::Error;

use crate::{
    ast::{Token, TokenKind},
    validation::MAX_NESTING_DEPTH,
};

/// Operator symbols, longest first so `===` wins over `==` and `=`.
const OPERATORS: [&str; 16] = [
    "===", "!==", "==", "!=", "<=", ">=", "&&", "||", "??", "<", ">", "+", "-", "*", "/", "%",
];

const OPERATOR_CHARS: &str = "=!<>&|?+-*/%";

/// A malformed token stream.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}{}", .position.map(|p| format!(" at position {}", p)).unwrap_or_default())]
pub struct LexError {
    pub message: String,
    /// Character offset into the original expression, when known
    pub position: Option<usize>,
}

impl LexError {
    fn at(message: impl Into<String>, position: usize) -> Self {
        LexError {
            message: message.into(),
            position: Some(position),
        }
    }

    fn new(message: impl Into<String>) -> Self {
        LexError {
            message: message.into(),
            position: None,
        }
    }
}

/// Tokenize a complete expression.
///
/// Rejects empty input, then runs the structural checks of
/// [`validate_tokens`] over the whole stream. Either every token is
/// returned or none.
///
/// # Examples
///
/// ```
/// use safe_expr::{lexer::tokenize, TokenKind};
///
/// let tokens = tokenize("-42").unwrap();
/// assert_eq!(tokens.len(), 2);
/// assert_eq!(tokens[0].kind, TokenKind::Operator);
/// assert_eq!(tokens[1].raw, "42");
/// ```
pub fn tokenize(expr: &str) -> Result<Vec<Token>, LexError> {
    if expr.trim().is_empty() {
        return Err(LexError::new("Empty expression"));
    }

    let tokens = Lexer::new(expr).tokenize()?;
    validate_tokens(&tokens)?;

    tracing::trace!(count = tokens.len(), "tokenized expression");
    Ok(tokens)
}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
    /// Offset of `input` inside the top-level expression, for nested lexers
    base: usize,
    /// Number of enclosing container tokens
    depth: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
            base: 0,
            depth: 0,
        }
    }

    /// Lexer for the contents of a container token one level down.
    fn nested(&self, input: &str, base: usize) -> Result<Self, LexError> {
        let depth = self.depth + 1;
        if depth > MAX_NESTING_DEPTH {
            return Err(LexError::at(
                format!("Expression nested too deeply (maximum depth is {})", MAX_NESTING_DEPTH),
                base,
            ));
        }
        Ok(Lexer {
            input: input.chars().collect(),
            position: 0,
            base,
            depth,
        })
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn offset(&self) -> usize {
        self.base + self.position
    }

    fn slice(&self, start: usize) -> String {
        self.input[start..self.position].iter().collect()
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Read every token up to the end of input.
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    pub fn next_token(&mut self) -> Result<Option<Token>, LexError> {
        self.skip_whitespace();

        let token = match self.current_char() {
            None => return Ok(None),
            Some('$') if self.peek_char(1) == Some('{') => self.read_reference()?,
            Some(quote @ ('"' | '\'')) => self.read_string(quote)?,
            Some('`') => self.read_template()?,
            Some('{') => self.read_container('{', '}', TokenKind::ObjectLiteral)?,
            Some('[') => self.read_container('[', ']', TokenKind::ArrayLiteral)?,
            Some('.') if self.peek_char(1) == Some('.') && self.peek_char(2) == Some('.') => {
                self.position += 3;
                Token::punctuation("...")
            }
            Some(ch @ ('(' | ')' | ':' | ',' | '}' | ']')) => {
                self.advance();
                Token::punctuation(&ch.to_string())
            }
            Some(ch) if ch.is_ascii_digit() => self.read_number(),
            Some(ch) if OPERATOR_CHARS.contains(ch) => self.read_operator()?,
            Some(ch) if is_identifier_char(ch) => self.read_identifier(),
            Some(ch) => {
                return Err(LexError::at(
                    format!("Invalid character '{}'", ch),
                    self.offset(),
                ));
            }
        };

        Ok(Some(token))
    }

    fn read_identifier(&mut self) -> Token {
        let start = self.position;
        while let Some(ch) = self.current_char() {
            // `name${...}` ends the identifier at the reference
            if !is_identifier_char(ch) || (ch == '$' && self.peek_char(1) == Some('{')) {
                break;
            }
            self.advance();
        }
        Token::identifier(&self.slice(start))
    }

    fn read_number(&mut self) -> Token {
        let start = self.position;
        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                self.advance();
            } else {
                break;
            }
        }

        if self.current_char() == Some('.') && self.peek_char(1).is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
            while let Some(ch) = self.current_char() {
                if ch.is_ascii_digit() {
                    self.advance();
                } else {
                    break;
                }
            }
        }

        Token::number(&self.slice(start))
    }

    fn read_operator(&mut self) -> Result<Token, LexError> {
        for op in OPERATORS {
            let matches = op
                .chars()
                .enumerate()
                .all(|(i, c)| self.peek_char(i) == Some(c));
            if matches {
                self.position += op.chars().count();
                return Ok(Token::operator(op));
            }
        }

        let ch = self.current_char().unwrap_or_default();
        Err(LexError::at(format!("Invalid operator '{}'", ch), self.offset()))
    }

    fn read_string(&mut self, quote: char) -> Result<Token, LexError> {
        let start = self.position;
        let mut result = String::new();
        self.advance(); // Consume opening quote

        while let Some(ch) = self.current_char() {
            match ch {
                c if c == quote => {
                    self.advance();
                    return Ok(Token::string(&self.slice(start), &result));
                }
                '\\' => {
                    self.advance(); // Consume backslash
                    match self.current_char() {
                        Some(escaped) => result.push(unescape(escaped)),
                        None => break,
                    }
                    self.advance();
                }
                _ => {
                    result.push(ch);
                    self.advance();
                }
            }
        }

        Err(LexError::at(
            "Unterminated string: missing closing quote",
            self.base + start,
        ))
    }

    /// `${ ... }` with brace-depth counting, so `${a[${b}]}` is one token.
    fn read_reference(&mut self) -> Result<Token, LexError> {
        let start = self.position;
        self.position += 2; // Consume `${`
        let inner_start = self.position;
        let mut depth = 1;

        while let Some(ch) = self.current_char() {
            match ch {
                '"' | '\'' => self.skip_quoted(ch)?,
                '{' => {
                    depth += 1;
                    self.advance();
                }
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        let inner = self.slice(inner_start);
                        self.advance();
                        return self.finish_reference(&inner, self.base + inner_start);
                    }
                    self.advance();
                }
                _ => self.advance(),
            }
        }

        Err(LexError::at(
            "Unterminated reference: missing closing '}'",
            self.base + start,
        ))
    }

    fn finish_reference(&self, inner: &str, inner_offset: usize) -> Result<Token, LexError> {
        let path = inner.trim();
        if path.is_empty() {
            return Err(LexError::at("Empty reference '${}'", inner_offset));
        }
        let children = self.nested(inner, inner_offset)?.tokenize()?;
        Ok(Token::container(TokenKind::Reference, path, children))
    }

    fn read_template(&mut self) -> Result<Token, LexError> {
        let start = self.position;
        self.advance(); // Consume opening backtick
        let mut parts = Vec::new();
        let mut span = String::new();

        while let Some(ch) = self.current_char() {
            match ch {
                '`' => {
                    self.advance();
                    if !span.is_empty() {
                        parts.push(Token::string(&span, &span));
                    }
                    return Ok(Token::container(
                        TokenKind::TemplateLiteral,
                        self.slice(start),
                        parts,
                    ));
                }
                '\\' => {
                    self.advance();
                    match self.current_char() {
                        Some(escaped) => span.push(unescape(escaped)),
                        None => break,
                    }
                    self.advance();
                }
                '$' if self.peek_char(1) == Some('{') => {
                    if !span.is_empty() {
                        parts.push(Token::string(&span, &span));
                        span.clear();
                    }
                    parts.push(self.read_reference()?);
                }
                _ => {
                    span.push(ch);
                    self.advance();
                }
            }
        }

        Err(LexError::at(
            "Unterminated template literal: missing closing '`'",
            self.base + start,
        ))
    }

    /// Object and array literals. Contents are tokenized recursively; the
    /// parser decides what they mean.
    fn read_container(&mut self, open: char, close: char, kind: TokenKind) -> Result<Token, LexError> {
        let start = self.position;
        self.advance(); // Consume opening bracket
        let inner_start = self.position;
        let mut depth = 1;

        while let Some(ch) = self.current_char() {
            match ch {
                '"' | '\'' | '`' => self.skip_quoted(ch)?,
                c if c == open => {
                    depth += 1;
                    self.advance();
                }
                c if c == close => {
                    depth -= 1;
                    if depth == 0 {
                        let inner = self.slice(inner_start);
                        self.advance();
                        let children = self.nested(&inner, self.base + inner_start)?.tokenize()?;
                        return Ok(Token::container(kind, self.slice(start), children));
                    }
                    self.advance();
                }
                _ => self.advance(),
            }
        }

        let what = match kind {
            TokenKind::ObjectLiteral => "object",
            _ => "array",
        };
        Err(LexError::at(
            format!("Unterminated {} literal: missing closing '{}'", what, close),
            self.base + start,
        ))
    }

    /// Move past a quoted run without interpreting it.
    fn skip_quoted(&mut self, quote: char) -> Result<(), LexError> {
        let start = self.position;
        self.advance();
        while let Some(ch) = self.current_char() {
            if ch == '\\' {
                self.position += 2;
                continue;
            }
            self.advance();
            if ch == quote {
                return Ok(());
            }
        }
        Err(LexError::at(
            "Unterminated string: missing closing quote",
            self.base + start,
        ))
    }
}

fn is_identifier_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '$' || ch == '.'
}

fn unescape(ch: char) -> char {
    match ch {
        'n' => '\n',
        't' => '\t',
        'r' => '\r',
        '0' => '\0',
        other => other,
    }
}

/// Structural checks over a whole token stream, recursing into containers.
///
/// - no two operators in a row (`5 * -3`, `1 + + 2`)
/// - `$` only as part of `${...}`
/// - balanced parentheses, no stray `}` or `]`
pub fn validate_tokens(tokens: &[Token]) -> Result<(), LexError> {
    let mut parens: i32 = 0;

    for (i, token) in tokens.iter().enumerate() {
        match token.kind {
            TokenKind::Operator => {
                if let Some(next) = tokens.get(i + 1)
                    && next.kind == TokenKind::Operator
                {
                    return Err(LexError::new(format!(
                        "Invalid operator sequence '{} {}'",
                        token.raw, next.raw
                    )));
                }
            }
            TokenKind::Identifier if token.raw.starts_with('$') => {
                return Err(LexError::new(format!(
                    "Invalid reference '{}': references must be written as ${{...}}",
                    token.raw
                )));
            }
            TokenKind::Punctuation => match token.raw.as_str() {
                "(" => parens += 1,
                ")" => {
                    parens -= 1;
                    if parens < 0 {
                        return Err(LexError::new("Unbalanced parentheses: unexpected ')'"));
                    }
                }
                "}" => return Err(LexError::new("Unbalanced braces: unexpected '}'")),
                "]" => return Err(LexError::new("Unbalanced brackets: unexpected ']'")),
                _ => {}
            },
            kind if kind.is_container() => validate_tokens(token.children())?,
            _ => {}
        }
    }

    if parens != 0 {
        return Err(LexError::new("Unbalanced parentheses: missing ')'"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
        tokens.iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_operators_longest_first() {
        let tokens = tokenize("1 === 2 !== 3 ?? 4").unwrap();
        let ops: Vec<&str> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Operator)
            .map(|t| t.raw.as_str())
            .collect();
        assert_eq!(ops, vec!["===", "!==", "??"]);
    }

    #[test]
    fn test_reference_children() {
        let tokens = tokenize("${fetch.body[0]}").unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Reference);
        assert_eq!(tokens[0].raw, "fetch.body[0]");
        assert_eq!(
            kinds(tokens[0].children()),
            vec![TokenKind::Identifier, TokenKind::ArrayLiteral]
        );
    }

    #[test]
    fn test_nesting_limit() {
        let at_limit = format!("{}1{}", "[".repeat(MAX_NESTING_DEPTH), "]".repeat(MAX_NESTING_DEPTH));
        assert!(tokenize(&at_limit).is_ok());

        let too_deep = format!("[{}]", at_limit);
        let err = tokenize(&too_deep).unwrap_err();
        assert!(err.message.contains("nested too deeply"));
        assert_eq!(err.position, Some(MAX_NESTING_DEPTH + 1));
    }

    #[test]
    fn test_nested_offsets() {
        let err = tokenize("[1, 2, #]").unwrap_err();
        assert_eq!(err.position, Some(7));
    }
}
