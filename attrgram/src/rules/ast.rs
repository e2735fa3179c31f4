//! Semantic rule expression trees
//!
//! `Expr` is generic over how a symbol occurrence is named. Rules are parsed
//! with [`SymbolRef`] (name plus optional occurrence index) and resolved once,
//! at grammar construction, to positional slots.

use crate::evaluation::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reserved pseudo-attribute carrying a terminal's lexeme
pub const LEXEME: &str = "lexeme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    /// `||` string concatenation
    Concat,
    /// `+` integer addition
    Add,
    /// `=` equality of same-typed values
    Eq,
    /// `and`, short-circuit
    And,
    /// `or`, short-circuit
    Or,
}

impl BinaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::Concat => "||",
            BinaryOp::Add => "+",
            BinaryOp::Eq => "=",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
        }
    }

    /// Binding strength; higher binds tighter
    pub fn precedence(&self) -> u8 {
        match self {
            BinaryOp::Or => 1,
            BinaryOp::And => 2,
            BinaryOp::Eq => 3,
            BinaryOp::Concat | BinaryOp::Add => 4,
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A symbol occurrence as written in rule text: `ColList`, `ColList[2]`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SymbolRef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
}

impl SymbolRef {
    pub fn bare(name: &str) -> Self {
        Self {
            name: name.to_string(),
            index: None,
        }
    }

    pub fn indexed(name: &str, index: u32) -> Self {
        Self {
            name: name.to_string(),
            index: Some(index),
        }
    }
}

impl fmt::Display for SymbolRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(index) => write!(f, "{}[{}]", self.name, index),
            None => f.write_str(&self.name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expr<R> {
    Literal {
        value: Value,
    },
    Lexeme {
        symbol: R,
    },
    Attribute {
        symbol: R,
        attribute: String,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr<R>>,
        right: Box<Expr<R>>,
    },
}

impl<R> Expr<R> {
    pub fn literal(value: impl Into<Value>) -> Self {
        Expr::Literal {
            value: value.into(),
        }
    }

    pub fn binary(op: BinaryOp, left: Expr<R>, right: Expr<R>) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Rewrite every symbol reference, failing on the first one `f` rejects
    pub fn map_refs<S, E, F>(&self, f: &mut F) -> Result<Expr<S>, E>
    where
        F: FnMut(&R) -> Result<S, E>,
    {
        Ok(match self {
            Expr::Literal { value } => Expr::Literal {
                value: value.clone(),
            },
            Expr::Lexeme { symbol } => Expr::Lexeme { symbol: f(symbol)? },
            Expr::Attribute { symbol, attribute } => Expr::Attribute {
                symbol: f(symbol)?,
                attribute: attribute.clone(),
            },
            Expr::Binary { op, left, right } => Expr::Binary {
                op: *op,
                left: Box::new(left.map_refs(f)?),
                right: Box::new(right.map_refs(f)?),
            },
        })
    }

    /// Visit every read, left to right. The attribute is `None` for lexemes.
    pub fn for_each_read<'a, F>(&'a self, f: &mut F)
    where
        F: FnMut(&'a R, Option<&'a str>),
    {
        match self {
            Expr::Literal { .. } => {}
            Expr::Lexeme { symbol } => f(symbol, None),
            Expr::Attribute { symbol, attribute } => f(symbol, Some(attribute)),
            Expr::Binary { left, right, .. } => {
                left.for_each_read(f);
                right.for_each_read(f);
            }
        }
    }

    pub fn is_constant(&self) -> bool {
        let mut reads = 0usize;
        self.for_each_read(&mut |_, _| reads += 1);
        reads == 0
    }

    fn binary_precedence(&self) -> Option<u8> {
        match self {
            Expr::Binary { op, .. } => Some(op.precedence()),
            _ => None,
        }
    }
}

impl<R: fmt::Display> fmt::Display for Expr<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal { value } => write!(f, "{}", value),
            Expr::Lexeme { symbol } => write!(f, "{}.{}", symbol, LEXEME),
            Expr::Attribute { symbol, attribute } => write!(f, "{}.{}", symbol, attribute),
            Expr::Binary { op, left, right } => {
                let prec = op.precedence();
                // Operators are left-associative, so an equal-precedence right operand needs parens
                let left_parens = left.binary_precedence().map_or(false, |p| p < prec);
                let right_parens = right.binary_precedence().map_or(false, |p| p <= prec);

                if left_parens {
                    write!(f, "({})", left)?;
                } else {
                    write!(f, "{}", left)?;
                }
                write!(f, " {} ", op)?;
                if right_parens {
                    write!(f, "({})", right)
                } else {
                    write!(f, "{}", right)
                }
            }
        }
    }
}

/// The attribute a rule assigns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleTarget {
    pub symbol: SymbolRef,
    pub attribute: String,
}

impl fmt::Display for RuleTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.symbol, self.attribute)
    }
}

/// A rule before occurrence resolution: `target := expr`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedRule {
    pub target: RuleTarget,
    pub expr: Expr<SymbolRef>,
}

impl fmt::Display for ParsedRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} := {}", self.target, self.expr)
    }
}
