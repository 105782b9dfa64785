//! Documentation content for the safexpr CLI

use super::CliError;

/// Available documentation categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocCategory {
    Syntax,
    Operators,
    References,
    Functions,
    Errors,
}

impl DocCategory {
    /// Parse category name from string
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "syntax" => Some(Self::Syntax),
            "operators" | "ops" => Some(Self::Operators),
            "references" | "refs" | "paths" => Some(Self::References),
            "functions" | "fns" => Some(Self::Functions),
            "errors" | "error" => Some(Self::Errors),
            _ => None,
        }
    }

    fn content(self) -> &'static str {
        match self {
            Self::Syntax => SYNTAX_DOC,
            Self::Operators => OPERATORS_DOC,
            Self::References => REFERENCES_DOC,
            Self::Functions => FUNCTIONS_DOC,
            Self::Errors => ERRORS_DOC,
        }
    }
}

/// Get the docs overview (category listing)
pub fn get_docs_overview() -> &'static str {
    r#"SAFEXPR DOCUMENTATION

safexpr evaluates small, sandboxed expressions embedded in workflow step
definitions: references to earlier step results, arithmetic, comparisons,
object and array construction, spread, and template strings.

DOCUMENTATION CATEGORIES

  syntax            Literals, containers, spread, and template strings
  operators         Arithmetic, comparison, logical, and nullish operators
  references        ${...} references, paths, and name resolution order
  functions         The whitelisted conversion functions
  errors            Error kinds and what triggers them

QUICK REFERENCE

  ${step.field}     Result of an earlier step
  ${context.key}    The persistent context object
  `Hi ${name}`      Template string
  [...${a}, 1]      Array with spread
  {...${a}, b: 2}   Object with spread
  a ?? b            First operand unless null/undefined

Run 'safexpr doc <category>' for details.
"#
}

/// Get documentation for a specific category
pub fn get_doc_category(name: &str) -> Result<&'static str, CliError> {
    DocCategory::from_name(name)
        .map(DocCategory::content)
        .ok_or_else(|| CliError::UnknownCategory(name.to_string()))
}

const SYNTAX_DOC: &str = r#"SYNTAX - Literals, Containers, and Templates

LITERALS
  42, 3.5           Numbers (no sign; `-1` is the operator `-` and `1`)
  "text", 'text'    Strings; escapes \n \t \r \0, any other escaped char is literal
  true, false       Booleans
  null, undefined   Nullish values
  word              A bare word is the string "word"

CONTAINERS
  { key: expr, "quoted key": expr, 3: expr }
  [ expr, expr, ]   A trailing comma is allowed, an empty middle element is not

SPREAD
  [...${a}, ...${b}]      Arrays are concatenated; objects contribute their values
  {...${a}, ...${b}}      Later keys overwrite earlier ones; arrays contribute index keys

TEMPLATES
  `Total: ${order.total}` Every interpolation is concatenated as a string
                          Interpolations are reference paths, not expressions:
                          compute outside the template, `Sum: ` + (${a} + ${b})

GROUPING
  (a + b) * c
"#;

const OPERATORS_DOC: &str = r#"OPERATORS - Precedence from loosest to tightest

  ||                    1   Left operand if truthy, else right
  &&                    2   Left operand if falsy, else right
  == != === !==         3   Loose and strict equality
  < <= > >=             4   Operands must share a type (number, string, boolean)
  + -                   5   + concatenates when either side is a string
  * / %                 6   Numbers only; / and % by zero is an error
  ??                    7   Left operand unless null or undefined

Equal precedence groups left to right: 10 - 5 - 2 is 3.
Both operands are always evaluated, left first.

LOOSE EQUALITY
  null == undefined     true
  "5" == 5              true
  true == 1             true
"#;

const REFERENCES_DOC: &str = r#"REFERENCES - Paths and Resolution

PATHS
  ${fetch}                  Whole step result
  ${fetch.body.items[0]}    Properties and indices
  ${headers["x-id"]}        Quoted keys
  ${rows[${cursor}]}        Computed keys (string or number)
  ${items.length}           Length of an array or string

RESOLUTION ORDER
  1. Variables passed to this evaluation (--vars)
  2. `context`, the persistent context object (--context)
  3. Step results by step name (--steps)

Accessing a property of null, or a key that does not exist, is an error.

DEPENDENCIES
  safexpr refs '<expr>' lists the step names an expression reads.
  `item`, `index`, `acc` and `context` are never listed.
"#;

const FUNCTIONS_DOC: &str = r#"FUNCTIONS - Whitelisted Conversions

  Number(x)             Numeric conversion ("" is 0, "abc" is NaN)
  String(x)             String conversion; arrays and objects become JSON
  Boolean(x)            Truthiness
  parseInt(x, radix?)   Leading integer of a string
  parseFloat(x)         Leading decimal number of a string

Any other call is rejected: function 'name' is not allowed.
"#;

const ERRORS_DOC: &str = r#"ERRORS - Kinds of Failure

  security      Empty or over-long expression, forbidden pattern
                (eval, Function, constructor, __proto__, prototype),
                empty ${} slot, unclosed ${
  lexical       Unterminated string or reference, invalid operator,
                unbalanced parentheses, brackets nested over 256 deep
  syntax        Misplaced token, bad object key, mismatched parentheses,
                expression tree over 256 levels (long operator chains)
  reference     Unknown name, property of null, missing property
  evaluation    Type mismatch, division by zero, bad spread,
                disallowed function
  timeout       Evaluation ran past its budget (--timeout-ms)

Syntax, reference and evaluation errors are reported as
  failed to evaluate expression: <expr>. Got error: <detail>
"#;
