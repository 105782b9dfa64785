pub mod ast;
pub mod cli;
pub mod convert;
pub mod error;
pub mod evaluator;
pub mod lexer;
pub mod parser;
pub mod path;
pub mod references;
pub mod resolver;
pub mod timeout;
pub mod validation;
pub mod value;

pub use ast::{AstNode, BinOp, Token, TokenKind, TokenValue};
pub use convert::{json_to_value, value_to_json};
pub use error::{ErrorKind, ExpressionError};
pub use evaluator::{EvalError, Evaluator, EvaluatorOptions, OperatorTable, StandardOperators};
pub use lexer::{LexError, Lexer, tokenize};
pub use parser::{ParseError, Parser, parse};
pub use references::{ReferenceExtractor, extract_references};
pub use resolver::{ReferenceError, ReferenceResolver, Scope};
pub use timeout::{Deadline, FixedTimeout, StepRef, StepTimeouts, TimeoutError, TimeoutPolicy};
pub use validation::{ValidationError, validate_expression};
pub use value::Value;
