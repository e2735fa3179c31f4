//! Tokenizer for semantic rule text

use super::error::{RuleError, RuleResult};
use crate::utils::{Position, Span, Spanned};
use std::fmt;
use std::iter::Peekable;
use std::str::CharIndices;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Ident(String),
    Int(i64),
    Str(String),
    True,
    False,
    And,
    Or,
    /// `:=`
    Assign,
    /// `||`
    Concat,
    Plus,
    Eq,
    Dot,
    LBracket,
    RBracket,
    LParen,
    RParen,
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Ident(name) => write!(f, "identifier '{}'", name),
            Token::Int(value) => write!(f, "integer {}", value),
            Token::Str(_) => f.write_str("string literal"),
            Token::True => f.write_str("'true'"),
            Token::False => f.write_str("'false'"),
            Token::And => f.write_str("'and'"),
            Token::Or => f.write_str("'or'"),
            Token::Assign => f.write_str("':='"),
            Token::Concat => f.write_str("'||'"),
            Token::Plus => f.write_str("'+'"),
            Token::Eq => f.write_str("'='"),
            Token::Dot => f.write_str("'.'"),
            Token::LBracket => f.write_str("'['"),
            Token::RBracket => f.write_str("']'"),
            Token::LParen => f.write_str("'('"),
            Token::RParen => f.write_str("')'"),
            Token::Eof => f.write_str("end of rule"),
        }
    }
}

struct Lexer<'a> {
    source: &'a str,
    chars: Peekable<CharIndices<'a>>,
    pos: Position,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            pos: Position::start(),
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    fn bump(&mut self) -> Option<char> {
        let (_, ch) = self.chars.next()?;
        self.pos = self.pos.advance(ch);
        Some(ch)
    }

    fn span_from(&self, start: Position) -> Span {
        Span::new(start, self.pos)
    }

    fn tokenize(mut self) -> RuleResult<Vec<Spanned<Token>>> {
        let mut tokens = Vec::new();

        while let Some(ch) = self.peek() {
            let start = self.pos;

            let token = match ch {
                ' ' | '\t' | '\r' | '\n' => {
                    self.bump();
                    continue;
                }
                '\'' => self.string_literal()?,
                '0'..='9' => self.integer()?,
                c if c.is_ascii_alphabetic() || c == '_' => self.word(),
                ':' => {
                    self.bump();
                    self.expect_follow('=', start)?;
                    Token::Assign
                }
                '|' => {
                    self.bump();
                    self.expect_follow('|', start)?;
                    Token::Concat
                }
                '+' => self.single(Token::Plus),
                '=' => self.single(Token::Eq),
                '.' => self.single(Token::Dot),
                '[' => self.single(Token::LBracket),
                ']' => self.single(Token::RBracket),
                '(' => self.single(Token::LParen),
                ')' => self.single(Token::RParen),
                other => {
                    return Err(RuleError::InvalidCharacter {
                        character: other,
                        span: Span::single(start),
                    })
                }
            };

            tokens.push(Spanned::new(token, self.span_from(start)));
        }

        tokens.push(Spanned::new(Token::Eof, Span::new(self.pos, self.pos)));
        Ok(tokens)
    }

    fn single(&mut self, token: Token) -> Token {
        self.bump();
        token
    }

    fn expect_follow(&mut self, expected: char, start: Position) -> RuleResult<()> {
        match self.peek() {
            Some(c) if c == expected => {
                self.bump();
                Ok(())
            }
            _ => {
                let character = self.source[start.offset..].chars().next().unwrap_or(expected);
                Err(RuleError::InvalidCharacter {
                    character,
                    span: Span::single(start),
                })
            }
        }
    }

    fn word(&mut self) -> Token {
        let start = self.pos.offset;
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '_') {
            self.bump();
        }

        match &self.source[start..self.pos.offset] {
            "true" => Token::True,
            "false" => Token::False,
            "and" => Token::And,
            "or" => Token::Or,
            ident => Token::Ident(ident.to_string()),
        }
    }

    fn integer(&mut self) -> RuleResult<Token> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.bump();
        }

        let text = &self.source[start.offset..self.pos.offset];
        text.parse::<i64>()
            .map(Token::Int)
            .map_err(|_| RuleError::IntegerOutOfRange {
                text: text.to_string(),
                span: self.span_from(start),
            })
    }

    fn string_literal(&mut self) -> RuleResult<Token> {
        let start = self.pos;
        self.bump();
        let mut value = String::new();

        loop {
            let escape_pos = self.pos;
            match self.bump() {
                None => {
                    return Err(RuleError::UnterminatedString {
                        span: self.span_from(start),
                    })
                }
                Some('\'') => return Ok(Token::Str(value)),
                Some('\\') => match self.bump() {
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some('\\') => value.push('\\'),
                    Some('\'') => value.push('\''),
                    Some(other) => {
                        return Err(RuleError::InvalidEscape {
                            character: other,
                            span: self.span_from(escape_pos),
                        })
                    }
                    None => {
                        return Err(RuleError::UnterminatedString {
                            span: self.span_from(start),
                        })
                    }
                },
                Some(c) => value.push(c),
            }
        }
    }
}

/// Split rule text into tokens, always ending with `Token::Eof`
pub fn tokenize(source: &str) -> RuleResult<Vec<Spanned<Token>>> {
    Lexer::new(source).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|t| t.value)
            .collect()
    }

    #[test]
    fn test_rule_tokens() {
        assert_eq!(
            kinds("ColList[0].count := ColList[1].count + 1"),
            vec![
                Token::Ident("ColList".into()),
                Token::LBracket,
                Token::Int(0),
                Token::RBracket,
                Token::Dot,
                Token::Ident("count".into()),
                Token::Assign,
                Token::Ident("ColList".into()),
                Token::LBracket,
                Token::Int(1),
                Token::RBracket,
                Token::Dot,
                Token::Ident("count".into()),
                Token::Plus,
                Token::Int(1),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_keywords_and_operators() {
        assert_eq!(
            kinds("true and false or x = y || z"),
            vec![
                Token::True,
                Token::And,
                Token::False,
                Token::Or,
                Token::Ident("x".into()),
                Token::Eq,
                Token::Ident("y".into()),
                Token::Concat,
                Token::Ident("z".into()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            kinds(r"'\n' 'it\'s' 'a\\b'"),
            vec![
                Token::Str("\n".into()),
                Token::Str("it's".into()),
                Token::Str("a\\b".into()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_spans_track_columns() {
        let tokens = tokenize("A.sql := 'x'").unwrap();
        let assign = &tokens[3];
        assert_eq!(assign.value, Token::Assign);
        assert_eq!(assign.span.start.column, 7);
        assert_eq!(assign.span.end.column, 9);
        assert_eq!(tokens[4].span.len(), 3);
    }

    #[test]
    fn test_lexical_errors() {
        assert!(matches!(
            tokenize("A.sql := 'open"),
            Err(RuleError::UnterminatedString { .. })
        ));
        assert!(matches!(
            tokenize("A.sql := '\\q'"),
            Err(RuleError::InvalidEscape { character: 'q', .. })
        ));
        assert!(matches!(
            tokenize("A.sql := B.sql | C.sql"),
            Err(RuleError::InvalidCharacter { character: '|', .. })
        ));
        assert!(matches!(
            tokenize("A.n := 99999999999999999999"),
            Err(RuleError::IntegerOutOfRange { .. })
        ));
        assert!(matches!(
            tokenize("A.n := 1 - 2"),
            Err(RuleError::InvalidCharacter { character: '-', .. })
        ));
    }
}
