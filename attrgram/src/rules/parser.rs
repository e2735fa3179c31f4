//! Recursive-descent parser for semantic rules
//!
//! ```text
//! rule     ::= target ':=' expr
//! target   ::= Name ('[' int ']')? '.' attr
//! expr     ::= and_expr ('or' and_expr)*
//! and_expr ::= eq_expr ('and' eq_expr)*
//! eq_expr  ::= add_expr ('=' add_expr)*
//! add_expr ::= primary (('||' | '+') primary)*
//! primary  ::= string | int | 'true' | 'false' | ref | '(' expr ')'
//! ref      ::= Name ('[' int ']')? '.' (attr | 'lexeme')
//! ```

use super::ast::{BinaryOp, Expr, ParsedRule, RuleTarget, SymbolRef, LEXEME};
use super::error::{RuleError, RuleResult};
use super::lexer::{tokenize, Token};
use crate::config::compile_time::grammar::MAX_RULE_LENGTH;
use crate::evaluation::Value;
use crate::utils::{Span, Spanned};

/// Maximum parenthesis nesting inside one rule
const MAX_NESTING_DEPTH: usize = 64;

struct RuleParser {
    tokens: Vec<Spanned<Token>>,
    position: usize,
    depth: usize,
}

impl RuleParser {
    fn new(tokens: Vec<Spanned<Token>>) -> Self {
        Self {
            tokens,
            position: 0,
            depth: 0,
        }
    }

    fn current(&self) -> &Spanned<Token> {
        // tokenize always terminates the stream with Eof
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[self.position.min(last)]
    }

    fn advance(&mut self) -> Spanned<Token> {
        let token = self.current().clone();
        if token.value != Token::Eof {
            self.position += 1;
        }
        token
    }

    fn check(&self, token: &Token) -> bool {
        &self.current().value == token
    }

    fn expect(&mut self, token: Token, expected: &str) -> RuleResult<Span> {
        if self.check(&token) {
            Ok(self.advance().span)
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn unexpected(&self, expected: &str) -> RuleError {
        let current = self.current();
        RuleError::unexpected_token(expected, &current.value.to_string(), current.span)
    }

    fn parse_rule(&mut self) -> RuleResult<ParsedRule> {
        let target = self.parse_target()?;
        self.expect(Token::Assign, "':='")?;
        let expr = self.parse_expr()?;
        self.expect(Token::Eof, "operator or end of rule")?;
        Ok(ParsedRule { target, expr })
    }

    fn parse_target(&mut self) -> RuleResult<RuleTarget> {
        let symbol = self.parse_symbol("rule target symbol")?;
        self.expect(Token::Dot, "'.'")?;
        match self.advance() {
            Spanned {
                value: Token::Ident(attribute),
                ..
            } => Ok(RuleTarget { symbol, attribute }),
            other => Err(RuleError::unexpected_token(
                "attribute name",
                &other.value.to_string(),
                other.span,
            )),
        }
    }

    fn parse_symbol(&mut self, expected: &str) -> RuleResult<SymbolRef> {
        let name = match &self.current().value {
            Token::Ident(name) => name.clone(),
            _ => return Err(self.unexpected(expected)),
        };
        self.advance();

        let index = if self.check(&Token::LBracket) {
            self.advance();
            let index = match self.current().value {
                Token::Int(i) if i >= 0 && i <= u32::MAX as i64 => i as u32,
                _ => return Err(self.unexpected("occurrence index")),
            };
            self.advance();
            self.expect(Token::RBracket, "']'")?;
            Some(index)
        } else {
            None
        };

        Ok(SymbolRef { name, index })
    }

    fn parse_expr(&mut self) -> RuleResult<Expr<SymbolRef>> {
        self.parse_level(BinaryOp::Or.precedence())
    }

    /// Left-associative chain of every operator at `precedence` or tighter
    fn parse_level(&mut self, precedence: u8) -> RuleResult<Expr<SymbolRef>> {
        if precedence > BinaryOp::Concat.precedence() {
            return self.parse_primary();
        }

        let mut left = self.parse_level(precedence + 1)?;
        while let Some(op) = self.binary_op_at(precedence) {
            self.advance();
            let right = self.parse_level(precedence + 1)?;
            left = Expr::binary(op, left, right);
        }
        Ok(left)
    }

    fn binary_op_at(&self, precedence: u8) -> Option<BinaryOp> {
        let op = match self.current().value {
            Token::Or => BinaryOp::Or,
            Token::And => BinaryOp::And,
            Token::Eq => BinaryOp::Eq,
            Token::Concat => BinaryOp::Concat,
            Token::Plus => BinaryOp::Add,
            _ => return None,
        };
        (op.precedence() == precedence).then_some(op)
    }

    fn parse_primary(&mut self) -> RuleResult<Expr<SymbolRef>> {
        match self.current().value.clone() {
            Token::Str(s) => {
                self.advance();
                Ok(Expr::literal(Value::Str(s)))
            }
            Token::Int(i) => {
                self.advance();
                Ok(Expr::literal(Value::Int(i)))
            }
            Token::True => {
                self.advance();
                Ok(Expr::literal(true))
            }
            Token::False => {
                self.advance();
                Ok(Expr::literal(false))
            }
            Token::LParen => {
                let open = self.advance().span;
                self.depth += 1;
                if self.depth > MAX_NESTING_DEPTH {
                    return Err(RuleError::unexpected_token(
                        "shallower nesting",
                        "'('",
                        open,
                    ));
                }
                let inner = self.parse_expr()?;
                self.expect(Token::RParen, "')'")?;
                self.depth -= 1;
                Ok(inner)
            }
            Token::Ident(_) => self.parse_reference(),
            _ => Err(self.unexpected("expression")),
        }
    }

    fn parse_reference(&mut self) -> RuleResult<Expr<SymbolRef>> {
        let symbol = self.parse_symbol("symbol reference")?;
        self.expect(Token::Dot, "'.'")?;
        match self.advance() {
            Spanned {
                value: Token::Ident(attribute),
                ..
            } => {
                if attribute == LEXEME {
                    Ok(Expr::Lexeme { symbol })
                } else {
                    Ok(Expr::Attribute { symbol, attribute })
                }
            }
            other => Err(RuleError::unexpected_token(
                "attribute name or 'lexeme'",
                &other.value.to_string(),
                other.span,
            )),
        }
    }
}

/// Parse one rule of the form `Target[.occurrence].attr := expr`
pub fn parse_rule(source: &str) -> RuleResult<ParsedRule> {
    if source.len() > MAX_RULE_LENGTH {
        return Err(RuleError::RuleTooLong {
            length: source.len(),
            limit: MAX_RULE_LENGTH,
        });
    }

    let tokens = tokenize(source)?;
    RuleParser::new(tokens).parse_rule()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(source: &str) -> String {
        parse_rule(source).unwrap().to_string()
    }

    #[test]
    fn test_simple_rules() {
        let rule = parse_rule("ColList.sql := ID.lexeme").unwrap();
        assert_eq!(rule.target.symbol, SymbolRef::bare("ColList"));
        assert_eq!(rule.target.attribute, "sql");
        assert_eq!(
            rule.expr,
            Expr::Lexeme {
                symbol: SymbolRef::bare("ID")
            }
        );

        let rule = parse_rule("WhereOpt.sql := ''").unwrap();
        assert_eq!(rule.expr, Expr::literal(""));
    }

    #[test]
    fn test_indexed_target_and_operands() {
        let rule = parse_rule("ColList[0].count := ColList[1].count + 1").unwrap();
        assert_eq!(rule.target.symbol, SymbolRef::indexed("ColList", 0));
        match rule.expr {
            Expr::Binary { op, left, right } => {
                assert_eq!(op, BinaryOp::Add);
                assert_eq!(
                    *left,
                    Expr::Attribute {
                        symbol: SymbolRef::indexed("ColList", 1),
                        attribute: "count".to_string()
                    }
                );
                assert_eq!(*right, Expr::literal(1i64));
            }
            other => panic!("expected binary expression, got {:?}", other),
        }
    }

    #[test]
    fn test_precedence_and_associativity() {
        // `and` binds tighter than `or`, `=` tighter than `and`
        let rule = parse_rule("A.ok := a.x or b.y and c.z = d.w").unwrap();
        match &rule.expr {
            Expr::Binary { op, right, .. } => {
                assert_eq!(*op, BinaryOp::Or);
                assert!(matches!(**right, Expr::Binary { op: BinaryOp::And, .. }));
            }
            other => panic!("unexpected {:?}", other),
        }

        // Concatenation chains fold to the left
        let rule = parse_rule("A.sql := 'a' || 'b' || 'c'").unwrap();
        match &rule.expr {
            Expr::Binary { left, right, .. } => {
                assert!(matches!(**left, Expr::Binary { op: BinaryOp::Concat, .. }));
                assert_eq!(**right, Expr::literal("c"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parenthesised_insert_rule() {
        let source = "InsertStmt.ok := (ColList[1].count = ColList[2].count) \
                      and TableName.ok and ColList[1].ok and ColList[2].ok";
        assert_eq!(
            roundtrip(source),
            "InsertStmt.ok := ColList[1].count = ColList[2].count and TableName.ok \
             and ColList[1].ok and ColList[2].ok"
        );
    }

    #[test]
    fn test_display_roundtrip_preserves_structure() {
        for source in [
            "StmtList[0].sql := StmtList[1].sql || '\\n' || Stmt.sql",
            "Cond[0].ok := Cond[1].ok and Cond[2].ok",
            "A.ok := (true or false) and B.ok",
            "A.sql := 'x' || ('y' || 'z')",
        ] {
            let first = parse_rule(source).unwrap();
            let second = parse_rule(&first.to_string()).unwrap();
            assert_eq!(first, second, "{}", source);
        }
    }

    #[test]
    fn test_syntax_errors_carry_spans() {
        let err = parse_rule("A.sql = B.sql").unwrap_err();
        match err {
            RuleError::UnexpectedToken { expected, span, .. } => {
                assert_eq!(expected, "':='");
                assert_eq!(span.start.column, 7);
            }
            other => panic!("unexpected {:?}", other),
        }

        assert!(matches!(
            parse_rule("A.sql := B.sql ||"),
            Err(RuleError::UnexpectedToken { .. })
        ));
        assert!(matches!(
            parse_rule("A.sql := (B.sql"),
            Err(RuleError::UnexpectedToken { .. })
        ));
        assert!(matches!(
            parse_rule("A.sql := B.sql C.sql"),
            Err(RuleError::UnexpectedToken { .. })
        ));
        assert!(matches!(
            parse_rule("A[x].sql := ''"),
            Err(RuleError::UnexpectedToken { .. })
        ));
    }

    #[test]
    fn test_rule_length_limit() {
        let long = format!("A.sql := '{}'", "x".repeat(MAX_RULE_LENGTH));
        assert!(matches!(
            parse_rule(&long),
            Err(RuleError::RuleTooLong { .. })
        ));
    }
}
