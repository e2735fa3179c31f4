//! Parse tree builders for the SQL CRUD grammar
//!
//! These stand in for the external parser: they take statements that are
//! already split into tokens and assemble the tree the parser would hand
//! over, with left-recursive `StmtList`, `ColList` and `Cond` chains.

use super::productions as p;
use crate::tree::ParseNode;
use serde::{Deserialize, Serialize};

pub type TreeResult<T> = Result<T, TreeBuildError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeBuildError {
    #[error("{0} needs at least one column")]
    EmptyColumnList(&'static str),

    #[error("A program needs at least one statement")]
    EmptyProgram,
}

/// Right-hand side of a `column = value` condition, as its scanned lexeme
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CondValue {
    /// `NUM` token, e.g. `5`
    Num(String),
    /// `STRING` token including its quotes, e.g. `'bob'`
    Str(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comparison {
    pub column: String,
    pub value: CondValue,
}

impl Comparison {
    pub fn num(column: &str, value: &str) -> Self {
        Self {
            column: column.to_string(),
            value: CondValue::Num(value.to_string()),
        }
    }

    pub fn string(column: &str, lexeme: &str) -> Self {
        Self {
            column: column.to_string(),
            value: CondValue::Str(lexeme.to_string()),
        }
    }
}

/// One tokenised statement. An empty `conditions` list means no WHERE clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Statement {
    Select {
        columns: Vec<String>,
        table: String,
        #[serde(default)]
        conditions: Vec<Comparison>,
    },
    Insert {
        table: String,
        columns: Vec<String>,
        values: Vec<String>,
    },
    Update {
        table: String,
        columns: Vec<String>,
        #[serde(default)]
        conditions: Vec<Comparison>,
    },
    Delete {
        table: String,
        #[serde(default)]
        conditions: Vec<Comparison>,
    },
}

fn leaf(terminal: &str, lexeme: &str) -> ParseNode {
    ParseNode::leaf(terminal, lexeme)
}

/// Keyword leaves carry the keyword as lexeme
fn keyword(terminal: &str) -> ParseNode {
    leaf(terminal, terminal)
}

pub fn col_list(columns: &[String], what: &'static str) -> TreeResult<ParseNode> {
    let (first, rest) = columns
        .split_first()
        .ok_or(TreeBuildError::EmptyColumnList(what))?;

    let mut node = ParseNode::node(p::COL_LIST_SINGLE, vec![leaf("ID", first)]);
    for column in rest {
        node = ParseNode::node(
            p::COL_LIST_APPEND,
            vec![node, leaf("COMMA", ","), leaf("ID", column)],
        );
    }
    Ok(node)
}

pub fn table_name(table: &str) -> ParseNode {
    ParseNode::node(p::TABLE_NAME, vec![leaf("ID", table)])
}

fn comparison(cmp: &Comparison) -> ParseNode {
    let (production, value) = match &cmp.value {
        CondValue::Num(lexeme) => (p::COND_NUM, leaf("NUM", lexeme)),
        CondValue::Str(lexeme) => (p::COND_STRING, leaf("STRING", lexeme)),
    };
    ParseNode::node(production, vec![leaf("ID", &cmp.column), leaf("EQ", "="), value])
}

/// `WhereOpt` for the conditions joined by AND, or the empty alternative
pub fn where_opt(conditions: &[Comparison]) -> ParseNode {
    let Some((first, rest)) = conditions.split_first() else {
        return ParseNode::node(p::WHERE_EMPTY, Vec::new());
    };

    let cond = rest.iter().fold(comparison(first), |acc, cmp| {
        ParseNode::node(p::COND_AND, vec![acc, keyword("AND"), comparison(cmp)])
    });
    ParseNode::node(p::WHERE, vec![keyword("WHERE"), cond])
}

/// A `Stmt` node, terminating semicolon included
pub fn statement(stmt: &Statement) -> TreeResult<ParseNode> {
    let (production, inner) = match stmt {
        Statement::Select {
            columns,
            table,
            conditions,
        } => (
            p::STMT_SELECT,
            ParseNode::node(
                p::SELECT,
                vec![
                    keyword("SELECT"),
                    col_list(columns, "SELECT")?,
                    keyword("FROM"),
                    table_name(table),
                    where_opt(conditions),
                ],
            ),
        ),
        Statement::Insert {
            table,
            columns,
            values,
        } => (
            p::STMT_INSERT,
            ParseNode::node(
                p::INSERT,
                vec![
                    keyword("INSERT"),
                    keyword("INTO"),
                    table_name(table),
                    leaf("LPAREN", "("),
                    col_list(columns, "INSERT column list")?,
                    leaf("RPAREN", ")"),
                    keyword("VALUES"),
                    leaf("LPAREN", "("),
                    col_list(values, "INSERT value list")?,
                    leaf("RPAREN", ")"),
                ],
            ),
        ),
        Statement::Update {
            table,
            columns,
            conditions,
        } => (
            p::STMT_UPDATE,
            ParseNode::node(
                p::UPDATE,
                vec![
                    keyword("UPDATE"),
                    table_name(table),
                    keyword("SET"),
                    col_list(columns, "UPDATE")?,
                    where_opt(conditions),
                ],
            ),
        ),
        Statement::Delete { table, conditions } => (
            p::STMT_DELETE,
            ParseNode::node(
                p::DELETE,
                vec![
                    keyword("DELETE"),
                    keyword("FROM"),
                    table_name(table),
                    where_opt(conditions),
                ],
            ),
        ),
    };

    Ok(ParseNode::node(production, vec![inner, leaf("SEMI", ";")]))
}

/// A `Program` root over the statements, in order
pub fn program(statements: &[Statement]) -> TreeResult<ParseNode> {
    let (first, rest) = statements
        .split_first()
        .ok_or(TreeBuildError::EmptyProgram)?;

    let mut list = ParseNode::node(p::STMT_LIST_SINGLE, vec![statement(first)?]);
    for stmt in rest {
        list = ParseNode::node(p::STMT_LIST_APPEND, vec![list, statement(stmt)?]);
    }
    Ok(ParseNode::node(p::PROGRAM, vec![list]))
}

/// The statements `attrgram demo` evaluates
pub fn demo_statements() -> Vec<Statement> {
    let strings = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    vec![
        Statement::Select {
            columns: strings(&["name", "age"]),
            table: "users".to_string(),
            conditions: vec![Comparison::num("id", "5")],
        },
        Statement::Insert {
            table: "users".to_string(),
            columns: strings(&["name", "age"]),
            values: strings(&["bob", "42"]),
        },
        Statement::Update {
            table: "users".to_string(),
            columns: strings(&["age"]),
            conditions: vec![Comparison::string("name", "'bob'"), Comparison::num("id", "7")],
        },
        Statement::Delete {
            table: "users".to_string(),
            conditions: Vec::new(),
        },
        Statement::Insert {
            table: "t".to_string(),
            columns: strings(&["a", "b"]),
            values: strings(&["1"]),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_col_list_is_left_recursive() {
        let tree = col_list(&cols(&["a", "b", "c"]), "test").unwrap();

        match &tree {
            ParseNode::Node { production, children } => {
                assert_eq!(*production, p::COL_LIST_APPEND);
                assert_eq!(children[2], ParseNode::leaf("ID", "c"));
                assert_eq!(children[0].node_count(), 5);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(tree.node_count(), 8);
    }

    #[test]
    fn test_empty_inputs_rejected() {
        assert_eq!(
            col_list(&[], "SELECT"),
            Err(TreeBuildError::EmptyColumnList("SELECT"))
        );
        assert_eq!(program(&[]), Err(TreeBuildError::EmptyProgram));
    }

    #[test]
    fn test_where_opt_shapes() {
        assert_eq!(where_opt(&[]), ParseNode::node(p::WHERE_EMPTY, vec![]));

        let two = where_opt(&[Comparison::num("a", "1"), Comparison::string("b", "'x'")]);
        let cond = &two.children()[1];
        assert!(matches!(cond, ParseNode::Node { production, .. } if *production == p::COND_AND));
    }

    #[test]
    fn test_statement_json() {
        let json = r#"{"kind":"delete","table":"users","conditions":[{"column":"id","value":{"num":"3"}}]}"#;
        let stmt: Statement = serde_json::from_str(json).unwrap();
        assert_eq!(
            stmt,
            Statement::Delete {
                table: "users".to_string(),
                conditions: vec![Comparison::num("id", "3")],
            }
        );
    }
}
