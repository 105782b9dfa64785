use thiserror::Error;

use crate::{
    ast::{ArrayElement, AstNode, BinOp, ObjectProperty, Token, TokenKind},
    error::ExpressionError,
    timeout::Deadline,
    validation::MAX_NESTING_DEPTH,
    value::Value,
};

/// A token stream that does not form a valid expression.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("empty expression")]
    EmptyExpression,

    /// A token in a position the grammar does not allow
    #[error("Unexpected {found} '{raw}'")]
    Unexpected { found: &'static str, raw: String },

    #[error("mismatched parentheses")]
    MismatchedParentheses,

    /// Reduction did not leave exactly one node
    #[error("invalid expression")]
    InvalidExpression,

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("unsupported operator '{0}'")]
    UnsupportedOperator(String),

    #[error("invalid object literal: invalid key")]
    InvalidObjectKey,

    #[error("invalid object literal: missing key")]
    MissingObjectKey,

    #[error("invalid object literal: missing value for key '{0}'")]
    MissingObjectValue(String),

    #[error("invalid {0} literal: empty element")]
    EmptyElement(&'static str),

    #[error("invalid spread operator usage: missing value after '...'")]
    MissingSpreadValue,

    #[error("invalid spread operator usage: cannot spread arguments of '{0}'")]
    SpreadInCall(String),

    #[error("mismatched parentheses in call to '{0}'")]
    MismatchedCallParentheses(String),

    #[error("expression nested too deeply (maximum depth is {0})")]
    TooDeep(usize),
}

/// Operator stack entry of the shunting-yard loop.
#[derive(Debug, Clone, Copy)]
enum StackItem {
    Operator(BinOp),
    OpenParen,
}

/// What a grouped token run is being split for.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Group {
    Object,
    Array,
    Call,
}

impl Group {
    fn name(self) -> &'static str {
        match self {
            Group::Object => "object",
            Group::Array => "array",
            Group::Call => "argument",
        }
    }
}

/// A parsed subtree and its height, leaves being 1.
struct Parsed {
    node: AstNode,
    height: usize,
}

impl Parsed {
    fn leaf(node: AstNode) -> Self {
        Parsed { node, height: 1 }
    }

    /// A node one level above `children`.
    fn branch(node: AstNode, children: usize) -> Result<Self, ParseError> {
        let height = children + 1;
        if height > MAX_NESTING_DEPTH {
            return Err(ParseError::TooDeep(MAX_NESTING_DEPTH));
        }
        Ok(Parsed { node, height })
    }
}

/// One comma-separated element of a grouped run.
struct Element<'t> {
    key: Option<String>,
    value: &'t [Token],
    spread: bool,
}

/// Parse a token stream without a time budget.
pub fn parse(tokens: &[Token]) -> Result<AstNode, ExpressionError> {
    Parser::new(&Deadline::unbounded()).parse(tokens)
}

/// Operator-precedence parser over a tokenized expression.
///
/// Polls the deadline on every step, so a pathological token stream cannot
/// outlive the evaluation budget. Trees taller than [`MAX_NESTING_DEPTH`]
/// are rejected with [`ParseError::TooDeep`].
pub struct Parser<'d> {
    deadline: &'d Deadline,
}

impl<'d> Parser<'d> {
    pub fn new(deadline: &'d Deadline) -> Self {
        Parser { deadline }
    }

    pub fn parse(&self, tokens: &[Token]) -> Result<AstNode, ExpressionError> {
        self.parse_at(tokens, 0).map(|parsed| parsed.node)
    }

    /// `depth` counts the containers around `tokens`.
    fn parse_at(&self, tokens: &[Token], depth: usize) -> Result<Parsed, ExpressionError> {
        self.deadline.check()?;
        if depth > MAX_NESTING_DEPTH {
            return Err(ParseError::TooDeep(MAX_NESTING_DEPTH).into());
        }

        match tokens {
            [] => Err(ParseError::EmptyExpression.into()),
            [single] => self.parse_single(single, depth),
            _ => self.parse_infix(tokens, depth),
        }
    }

    /// A lone token maps straight to a node.
    fn parse_single(&self, token: &Token, depth: usize) -> Result<Parsed, ExpressionError> {
        match token.kind {
            TokenKind::Number => Ok(Parsed::leaf(AstNode::Literal(parse_number(&token.raw)?))),
            TokenKind::StringLit => Ok(Parsed::leaf(AstNode::literal(token.value_text()))),
            TokenKind::Identifier => Ok(Parsed::leaf(AstNode::Literal(identifier_value(&token.raw)))),
            TokenKind::Reference => Ok(Parsed::leaf(AstNode::Reference(token.raw.clone()))),
            TokenKind::ObjectLiteral => self.parse_object(token.children(), depth + 1),
            TokenKind::ArrayLiteral => self.parse_array(token.children(), depth + 1),
            TokenKind::TemplateLiteral => Ok(parse_template(token.children())?),
            TokenKind::Operator | TokenKind::Punctuation => Err(unexpected(token).into()),
        }
    }

    /// Dijkstra's shunting-yard: values go to `output`, operators wait on
    /// `stack` until something binding no tighter arrives.
    fn parse_infix(&self, tokens: &[Token], depth: usize) -> Result<Parsed, ExpressionError> {
        let mut output: Vec<Parsed> = Vec::new();
        let mut stack: Vec<StackItem> = Vec::new();
        let mut expect_operator = false;
        let mut i = 0;

        while i < tokens.len() {
            self.deadline.check()?;
            let token = &tokens[i];

            match token.kind {
                TokenKind::Operator => {
                    if !expect_operator {
                        return Err(unexpected(token).into());
                    }
                    let op = BinOp::from_symbol(&token.raw)
                        .ok_or_else(|| ParseError::UnsupportedOperator(token.raw.clone()))?;

                    // `>=` keeps equal precedence left-associative
                    while let Some(&StackItem::Operator(top)) = stack.last()
                        && top.precedence() >= op.precedence()
                    {
                        stack.pop();
                        reduce(&mut output, top)?;
                    }
                    stack.push(StackItem::Operator(op));
                    expect_operator = false;
                }
                TokenKind::Punctuation if token.raw == "(" => {
                    if expect_operator {
                        return Err(unexpected(token).into());
                    }
                    stack.push(StackItem::OpenParen);
                }
                TokenKind::Punctuation if token.raw == ")" => {
                    if !expect_operator {
                        return Err(unexpected(token).into());
                    }
                    loop {
                        match stack.pop() {
                            Some(StackItem::Operator(op)) => reduce(&mut output, op)?,
                            Some(StackItem::OpenParen) => break,
                            None => return Err(ParseError::MismatchedParentheses.into()),
                        }
                    }
                }
                TokenKind::Punctuation => return Err(unexpected(token).into()),
                TokenKind::Identifier if tokens.get(i + 1).is_some_and(|t| t.is_punct("(")) => {
                    if expect_operator {
                        return Err(unexpected(token).into());
                    }
                    let (call, next) = self.parse_call(&token.raw, tokens, i + 1, depth + 1)?;
                    output.push(call);
                    expect_operator = true;
                    i = next;
                    continue;
                }
                _ => {
                    if expect_operator {
                        return Err(unexpected(token).into());
                    }
                    output.push(self.parse_single(token, depth)?);
                    expect_operator = true;
                }
            }

            i += 1;
        }

        while let Some(item) = stack.pop() {
            match item {
                StackItem::Operator(op) => reduce(&mut output, op)?,
                StackItem::OpenParen => return Err(ParseError::MismatchedParentheses.into()),
            }
        }

        let node = output.pop().ok_or(ParseError::InvalidExpression)?;
        if !output.is_empty() {
            return Err(ParseError::InvalidExpression.into());
        }
        Ok(node)
    }

    /// `name(arg, ...)` starting at the `(` at `open`. Returns the call node
    /// and the index just past the closing `)`.
    fn parse_call(
        &self,
        name: &str,
        tokens: &[Token],
        open: usize,
        depth: usize,
    ) -> Result<(Parsed, usize), ExpressionError> {
        let mut depth = 0;
        let mut close = None;
        for (j, token) in tokens.iter().enumerate().skip(open) {
            if token.is_punct("(") {
                depth += 1;
            } else if token.is_punct(")") {
                depth -= 1;
                if depth == 0 {
                    close = Some(j);
                    break;
                }
            }
        }
        let close = close.ok_or_else(|| ParseError::MismatchedCallParentheses(name.to_string()))?;

        let mut args = Vec::new();
        let mut height = 0;
        for element in split_elements(&tokens[open + 1..close], Group::Call)? {
            if element.spread {
                return Err(ParseError::SpreadInCall(name.to_string()).into());
            }
            let arg = self.parse_at(element.value, depth)?;
            height = height.max(arg.height);
            args.push(arg.node);
        }

        let call = AstNode::FunctionCall {
            name: name.to_string(),
            args,
        };
        Ok((Parsed::branch(call, height)?, close + 1))
    }

    fn parse_object(&self, tokens: &[Token], depth: usize) -> Result<Parsed, ExpressionError> {
        let mut properties = Vec::new();
        let mut height = 0;
        for element in split_elements(tokens, Group::Object)? {
            let value = self.parse_at(element.value, depth)?;
            height = height.max(value.height);
            properties.push(ObjectProperty {
                key: element.key,
                value: value.node,
                spread: element.spread,
            });
        }
        Ok(Parsed::branch(AstNode::Object(properties), height)?)
    }

    fn parse_array(&self, tokens: &[Token], depth: usize) -> Result<Parsed, ExpressionError> {
        let mut elements = Vec::new();
        let mut height = 0;
        for element in split_elements(tokens, Group::Array)? {
            let value = self.parse_at(element.value, depth)?;
            height = height.max(value.height);
            elements.push(ArrayElement {
                value: value.node,
                spread: element.spread,
            });
        }
        Ok(Parsed::branch(AstNode::Array(elements), height)?)
    }
}

/// Fold a template into a `+` chain anchored on a string literal, so every
/// interpolation is concatenated as a string.
///
/// Interpolations are reference paths: `${a.b}` reads `a.b`, and `${1 + 2}`
/// looks up a root named `1 + 2`.
fn parse_template(parts: &[Token]) -> Result<Parsed, ParseError> {
    let mut parts = parts.iter();
    let mut tree = match parts.as_slice().first() {
        Some(first) if first.kind == TokenKind::StringLit => {
            parts.next();
            Parsed::leaf(AstNode::literal(first.value_text()))
        }
        _ => Parsed::leaf(AstNode::literal("")),
    };

    for part in parts {
        let next = match part.kind {
            TokenKind::Reference => AstNode::Reference(part.raw.clone()),
            _ => AstNode::literal(part.value_text()),
        };
        tree = Parsed::branch(AstNode::operation(BinOp::Add, tree.node, next), tree.height)?;
    }
    Ok(tree)
}

/// Pop two operands and push the operation combining them.
fn reduce(output: &mut Vec<Parsed>, op: BinOp) -> Result<(), ParseError> {
    let right = output.pop().ok_or(ParseError::InvalidExpression)?;
    let left = output.pop().ok_or(ParseError::InvalidExpression)?;
    tracing::trace!(operator = %op, "reduced operation");
    let node = AstNode::operation(op, left.node, right.node);
    output.push(Parsed::branch(node, left.height.max(right.height))?);
    Ok(())
}

/// Split a grouped run on depth-0 commas, recognising `...` spread markers
/// and, for objects, `key:` prefixes. A trailing comma is allowed.
fn split_elements(tokens: &[Token], group: Group) -> Result<Vec<Element<'_>>, ParseError> {
    let mut segments: Vec<&[Token]> = Vec::new();
    let mut depth = 0;
    let mut start = 0;

    for (i, token) in tokens.iter().enumerate() {
        if token.is_punct("(") {
            depth += 1;
        } else if token.is_punct(")") {
            depth -= 1;
        } else if depth == 0 && token.is_punct(",") {
            segments.push(&tokens[start..i]);
            start = i + 1;
        }
    }
    // A trailing comma leaves nothing after it
    if start < tokens.len() {
        segments.push(&tokens[start..]);
    }

    let mut elements = Vec::with_capacity(segments.len());
    for segment in segments {
        if segment.is_empty() {
            return Err(ParseError::EmptyElement(group.name()));
        }

        if segment[0].is_punct("...") {
            if segment.len() == 1 {
                return Err(ParseError::MissingSpreadValue);
            }
            elements.push(Element {
                key: None,
                value: &segment[1..],
                spread: true,
            });
            continue;
        }

        if group != Group::Object {
            elements.push(Element {
                key: None,
                value: segment,
                spread: false,
            });
            continue;
        }

        let colon = segment_colon(segment).ok_or(ParseError::MissingObjectKey)?;
        let key = match &segment[..colon] {
            [single] => object_key(single)?,
            _ => return Err(ParseError::InvalidObjectKey),
        };
        let value = &segment[colon + 1..];
        if value.is_empty() {
            return Err(ParseError::MissingObjectValue(key));
        }
        elements.push(Element {
            key: Some(key),
            value,
            spread: false,
        });
    }

    Ok(elements)
}

/// Index of the first depth-0 `:` in an object element.
fn segment_colon(segment: &[Token]) -> Option<usize> {
    let mut depth = 0;
    for (i, token) in segment.iter().enumerate() {
        if token.is_punct("(") {
            depth += 1;
        } else if token.is_punct(")") {
            depth -= 1;
        } else if depth == 0 && token.is_punct(":") {
            return Some(i);
        }
    }
    None
}

fn object_key(token: &Token) -> Result<String, ParseError> {
    match token.kind {
        TokenKind::Identifier | TokenKind::Number => Ok(token.raw.clone()),
        TokenKind::StringLit => Ok(token.value_text().to_string()),
        _ => Err(ParseError::InvalidObjectKey),
    }
}

fn parse_number(raw: &str) -> Result<Value, ParseError> {
    if !raw.contains('.')
        && let Ok(n) = raw.parse::<i64>()
    {
        return Ok(Value::Integer(n));
    }
    raw.parse::<f64>()
        .map(Value::Float)
        .map_err(|_| ParseError::InvalidNumber(raw.to_string()))
}

/// Keywords become their values; any other bare word is a string.
fn identifier_value(name: &str) -> Value {
    match name {
        "true" => Value::Boolean(true),
        "false" => Value::Boolean(false),
        "null" => Value::Null,
        "undefined" => Value::Undefined,
        other => Value::String(other.to_string()),
    }
}

fn unexpected(token: &Token) -> ParseError {
    ParseError::Unexpected {
        found: token.kind.describe(),
        raw: token.raw.clone(),
    }
}
