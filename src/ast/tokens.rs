/// Lexical category of a [`Token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Integer or decimal number, never signed
    ///
    /// # Examples
    /// ```text
    /// 42
    /// 3.14
    /// ```
    Number,

    /// Single or double quoted string, escapes already resolved
    StringLit,

    /// Bare word: keywords, function names, opaque string literals
    ///
    /// # Examples
    /// ```text
    /// true
    /// undefined
    /// Number
    /// pending
    /// ```
    Identifier,

    /// One of the sixteen binary operator symbols
    Operator,

    /// `( ) : , ...` and any stray closing bracket
    Punctuation,

    /// `${path}` reference
    ///
    /// # Examples
    /// ```text
    /// ${fetch_user.body.name}
    /// ${context.items[0]}
    /// ```
    Reference,

    /// `{ ... }` object literal, children are the tokenized contents
    ObjectLiteral,

    /// `[ ... ]` array literal, children are the tokenized contents
    ArrayLiteral,

    /// Backtick template, children alternate string spans and references
    ///
    /// # Example
    /// ```text
    /// `Hello ${user.name}!`
    /// ```
    TemplateLiteral,
}

impl TokenKind {
    /// Container kinds carry child tokens instead of text.
    pub fn is_container(self) -> bool {
        matches!(
            self,
            TokenKind::Reference
                | TokenKind::ObjectLiteral
                | TokenKind::ArrayLiteral
                | TokenKind::TemplateLiteral
        )
    }

    /// Human-readable name used in parser errors (`Unexpected number`).
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::Number => "number",
            TokenKind::StringLit => "string",
            TokenKind::Identifier => "identifier",
            TokenKind::Operator => "operator",
            TokenKind::Punctuation => "punctuation",
            TokenKind::Reference => "reference",
            TokenKind::ObjectLiteral => "object literal",
            TokenKind::ArrayLiteral => "array literal",
            TokenKind::TemplateLiteral => "template literal",
        }
    }
}

/// Payload of a [`Token`].
#[derive(Debug, Clone, PartialEq)]
pub enum TokenValue {
    /// Scalar payload (number text, unescaped string, symbol, identifier)
    Text(String),
    /// Recursively tokenized contents of a container token
    Tokens(Vec<Token>),
}

/// A lexical token.
///
/// `raw` is the source text the token was read from (for references, the
/// trimmed path between `${` and `}`).
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub raw: String,
    pub value: TokenValue,
}

impl Token {
    pub fn text(kind: TokenKind, raw: impl Into<String>, value: impl Into<String>) -> Self {
        Token {
            kind,
            raw: raw.into(),
            value: TokenValue::Text(value.into()),
        }
    }

    pub fn container(kind: TokenKind, raw: impl Into<String>, children: Vec<Token>) -> Self {
        Token {
            kind,
            raw: raw.into(),
            value: TokenValue::Tokens(children),
        }
    }

    pub fn number(raw: &str) -> Self {
        Token::text(TokenKind::Number, raw, raw)
    }

    pub fn string(raw: &str, value: &str) -> Self {
        Token::text(TokenKind::StringLit, raw, value)
    }

    pub fn identifier(name: &str) -> Self {
        Token::text(TokenKind::Identifier, name, name)
    }

    pub fn operator(symbol: &str) -> Self {
        Token::text(TokenKind::Operator, symbol, symbol)
    }

    pub fn punctuation(symbol: &str) -> Self {
        Token::text(TokenKind::Punctuation, symbol, symbol)
    }

    /// Text payload, empty for container tokens.
    pub fn value_text(&self) -> &str {
        match &self.value {
            TokenValue::Text(s) => s,
            TokenValue::Tokens(_) => "",
        }
    }

    /// Child tokens, empty for scalar tokens.
    pub fn children(&self) -> &[Token] {
        match &self.value {
            TokenValue::Tokens(tokens) => tokens,
            TokenValue::Text(_) => &[],
        }
    }

    pub fn is_punct(&self, symbol: &str) -> bool {
        self.kind == TokenKind::Punctuation && self.raw == symbol
    }
}
