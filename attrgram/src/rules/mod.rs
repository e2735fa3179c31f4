//! Semantic rule language
//!
//! Rules are authored as text (`ColList[0].count := ColList[1].count + 1`)
//! and parsed exactly once, when a grammar is built.

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;

pub use ast::{BinaryOp, Expr, ParsedRule, RuleTarget, SymbolRef, LEXEME};
pub use error::{RuleError, RuleResult};
pub use parser::parse_rule;
