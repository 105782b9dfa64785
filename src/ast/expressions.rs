use crate::{ast::BinOp, value::Value};

/// Abstract Syntax Tree node representing a parsed expression.
///
/// Nodes own their children; the tree is created per evaluation and
/// dropped afterwards.
#[derive(Debug, Clone, PartialEq)]
pub enum AstNode {
    /// Literal value: string, number, boolean, null or undefined
    ///
    /// # Examples
    /// ```text
    /// 42
    /// "hello"
    /// undefined
    /// ```
    Literal(Value),

    /// Reference to the variable namespace
    ///
    /// Holds the path text between `${` and `}`, ready for the resolver.
    ///
    /// # Examples
    /// ```text
    /// ${fetch.body.items}    // Reference("fetch.body.items")
    /// ${context["api-key"]}  // Reference("context[\"api-key\"]")
    /// ```
    Reference(String),

    /// Binary operation (arithmetic, comparison, logical)
    Operation {
        operator: BinOp,
        left: Box<AstNode>,
        right: Box<AstNode>,
    },

    /// Object literal
    ///
    /// # Example
    /// ```text
    /// { id: ${user.id}, ...${defaults}, "x-trace": true }
    /// ```
    Object(Vec<ObjectProperty>),

    /// Array literal
    ///
    /// # Example
    /// ```text
    /// [1, ...${context.extra}, 2]
    /// ```
    Array(Vec<ArrayElement>),

    /// Call to a whitelisted conversion function
    ///
    /// # Example
    /// ```text
    /// Number(${form.age})
    /// ```
    FunctionCall { name: String, args: Vec<AstNode> },
}

/// Entry of an object literal.
///
/// Spread entries have no key; the spread value's own entries are merged in.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectProperty {
    pub key: Option<String>,
    pub value: AstNode,
    pub spread: bool,
}

/// Entry of an array literal.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayElement {
    pub value: AstNode,
    pub spread: bool,
}

impl AstNode {
    pub fn literal(value: impl Into<Value>) -> Self {
        AstNode::Literal(value.into())
    }

    pub fn operation(operator: BinOp, left: AstNode, right: AstNode) -> Self {
        AstNode::Operation {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}
