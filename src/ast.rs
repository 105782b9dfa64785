//! # Expression Language - Abstract Syntax Tree
//!
//! This module defines the tokens and syntax tree of the step expression
//! language: a small, sandboxed language embedded in workflow step
//! definitions.
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[expressions]** - Syntax tree nodes built by the parser
//! - **[operators]** - Binary operators and their precedence table
//!
//! ## Quick Start
//!
//! ```text
//! ${fetch_user.body.age} >= 18 && ${context.enabled}
//! ```
//!
//! ## Core Concepts
//!
//! ### References
//!
//! Only `${...}` reaches into the variable namespace. A bare word such as
//! `pending` is the string `"pending"`, never a variable lookup.
//!
//! ### Containers
//!
//! Object and array literals may spread other collections:
//!
//! ```text
//! { ...${defaults}, retries: 3 }
//! [...${first.items}, ...${second.items}]
//! ```
//!
//! ### Operator Precedence
//!
//! From loosest to tightest:
//!
//! | Level | Operators |
//! | --- | --- |
//! | 1 | `\|\|` |
//! | 2 | `&&` |
//! | 3 | `==` `===` `!=` `!==` |
//! | 4 | `<` `<=` `>` `>=` |
//! | 5 | `+` `-` |
//! | 6 | `*` `/` `%` |
//! | 7 | `??` |
//!
//! Operators of equal precedence associate to the left, so
//! `10 - 5 - 2` is `3`.
pub mod expressions;
pub mod operators;
pub mod tokens;

pub use expressions::{ArrayElement, AstNode, ObjectProperty};
pub use operators::BinOp;
pub use tokens::{Token, TokenKind, TokenValue};
