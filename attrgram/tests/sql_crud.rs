//! End-to-end properties of the SQL CRUD grammar

use assert_matches::assert_matches;
use attrgram::evaluation::{self, Value};
use attrgram::grammar::{AttrKind, AttrType, GrammarError, GrammarIssue};
use attrgram::sql::productions as p;
use attrgram::sql::trees::{self, Comparison, Statement};
use attrgram::sql::{sql_crud_definition, sql_crud_grammar};
use attrgram::{evaluate_program, AttributeGrammar, ParseNode};

fn grammar() -> AttributeGrammar {
    let _ = attrgram::logging::init_global_logging();
    sql_crud_grammar().expect("SQL grammar builds")
}

fn names(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn run(statements: &[Statement]) -> (String, bool) {
    let tree = trees::program(statements).unwrap();
    let result = evaluate_program(&grammar(), &tree).unwrap();
    (result.sql, result.ok)
}

#[test]
fn select_example_reconstructs_sql() {
    let (sql, ok) = run(&[Statement::Select {
        columns: names(&["name", "age"]),
        table: "users".to_string(),
        conditions: vec![Comparison::num("id", "5")],
    }]);

    assert_eq!(sql, "SELECT name,age FROM users WHERE id=5;");
    assert!(ok);
}

#[test]
fn insert_with_mismatched_counts_is_not_ok() {
    let (sql, ok) = run(&[Statement::Insert {
        table: "t".to_string(),
        columns: names(&["a", "b"]),
        values: names(&["1"]),
    }]);

    assert_eq!(sql, "INSERT INTO t(a,b) VALUES (1);");
    assert!(!ok);
}

#[test]
fn insert_with_matching_counts_is_ok() {
    let (sql, ok) = run(&[Statement::Insert {
        table: "t".to_string(),
        columns: names(&["a", "b", "c"]),
        values: names(&["1", "2", "3"]),
    }]);

    assert_eq!(sql, "INSERT INTO t(a,b,c) VALUES (1,2,3);");
    assert!(ok);
}

#[test]
fn update_and_delete_statements() {
    let (sql, ok) = run(&[
        Statement::Update {
            table: "users".to_string(),
            columns: names(&["age"]),
            conditions: vec![Comparison::string("name", "'bob'"), Comparison::num("id", "7")],
        },
        Statement::Delete {
            table: "users".to_string(),
            conditions: Vec::new(),
        },
    ]);

    assert_eq!(sql, "UPDATE users SET age WHERE name='bob' AND id=7;\nDELETE FROM users;");
    assert!(ok);
}

#[test]
fn col_list_count_and_sql_follow_leaves() {
    let grammar = grammar();

    for n in 1..=6 {
        let columns: Vec<String> = (0..n).map(|i| format!("c{}", i)).collect();
        let col_list = trees::col_list(&columns, "test").unwrap();
        let tree = ParseNode::node(
            p::PROGRAM,
            vec![ParseNode::node(
                p::STMT_LIST_SINGLE,
                vec![ParseNode::node(
                    p::STMT_SELECT,
                    vec![
                        ParseNode::node(
                            p::SELECT,
                            vec![
                                ParseNode::leaf("SELECT", "SELECT"),
                                col_list,
                                ParseNode::leaf("FROM", "FROM"),
                                trees::table_name("t"),
                                trees::where_opt(&[]),
                            ],
                        ),
                        ParseNode::leaf("SEMI", ";"),
                    ],
                )],
            )],
        );

        let root = evaluation::evaluate(&tree, &grammar).unwrap();
        let select = &root.children[0].children[0].children[0];
        let evaluated_cols = &select.children[1];

        assert_eq!(evaluated_cols.symbol, "ColList");
        assert_eq!(evaluated_cols.get("count"), Some(&Value::Int(n as i64)));
        assert_eq!(
            evaluated_cols.get("sql"),
            Some(&Value::Str(columns.join(",")))
        );
    }
}

#[test]
fn empty_where_is_empty_and_ok() {
    let grammar = grammar();

    let root = evaluation::evaluate(&trees::where_opt(&[]), &grammar).unwrap();
    assert_eq!(root.symbol, "WhereOpt");
    assert_eq!(root.get("sql"), Some(&Value::from("")));
    assert_eq!(root.get("ok"), Some(&Value::Bool(true)));
}

#[test]
fn evaluation_is_idempotent() {
    let grammar = grammar();
    let tree = trees::program(&trees::demo_statements()).unwrap();

    let first = evaluate_program(&grammar, &tree).unwrap();
    let second = evaluate_program(&grammar, &tree).unwrap();

    assert_eq!((first.sql.as_str(), first.ok), (second.sql.as_str(), second.ok));
    assert_eq!(first.tree, second.tree);
}

#[test]
fn statement_list_joins_in_order() {
    let grammar = grammar();

    for n in 1..=5 {
        let statements: Vec<Statement> = (0..n)
            .map(|i| Statement::Delete {
                table: format!("t{}", i),
                conditions: Vec::new(),
            })
            .collect();
        let expected: Vec<String> = (0..n).map(|i| format!("DELETE FROM t{};", i)).collect();

        let tree = trees::program(&statements).unwrap();
        let result = evaluate_program(&grammar, &tree).unwrap();
        assert_eq!(result.sql, expected.join("\n"));
        assert!(result.ok);
    }
}

#[test]
fn long_scripts_evaluate_without_depth_failure() {
    let n = 3_000;
    let statements: Vec<Statement> = (0..n)
        .map(|_| Statement::Delete {
            table: "t".to_string(),
            conditions: Vec::new(),
        })
        .collect();

    let tree = trees::program(&statements).unwrap();
    assert!(tree.depth() > n);

    let result = attrgram::evaluate_sql(&tree).unwrap();
    assert!(result.ok);
    assert_eq!(result.sql.lines().count(), n);
    assert!(result.sql.lines().all(|line| line == "DELETE FROM t;"));
}

#[test]
fn wide_insert_evaluates_without_depth_failure() {
    let columns: Vec<String> = (0..3_000).map(|i| format!("c{}", i)).collect();
    let values: Vec<String> = (0..3_000).map(|i| i.to_string()).collect();

    let (sql, ok) = run(&[Statement::Insert {
        table: "wide".to_string(),
        columns,
        values,
    }]);

    assert!(ok);
    assert!(sql.starts_with("INSERT INTO wide(c0,c1,"));
    assert!(sql.ends_with(",2998,2999);"));
}

#[test]
fn one_bad_statement_makes_program_not_ok() {
    let (sql, ok) = run(&[
        Statement::Delete {
            table: "a".to_string(),
            conditions: Vec::new(),
        },
        Statement::Insert {
            table: "b".to_string(),
            columns: names(&["x"]),
            values: names(&["1", "2"]),
        },
    ]);

    assert_eq!(sql, "DELETE FROM a;\nINSERT INTO b(x) VALUES (1,2);");
    assert!(!ok);
}

#[test]
fn undeclared_attribute_fails_at_construction() {
    let _ = attrgram::logging::init_global_logging();

    let mut definition = sql_crud_definition();
    definition.productions[13].rules[1] = "TableName.valid := true".into();

    assert_matches!(
        AttributeGrammar::from_definition(&definition),
        Err(GrammarError::MalformedGrammar {
            issue: GrammarIssue::UndeclaredAttribute,
            ..
        })
    );
}

#[test]
fn reading_missing_attribute_fails_at_construction() {
    let _ = attrgram::logging::init_global_logging();

    let mut definition = sql_crud_definition();
    definition.productions[7].rules[1] = "SelectStmt.ok := ColList.valid".into();

    assert_matches!(
        definition.build(),
        Err(GrammarError::MalformedGrammar {
            issue: GrammarIssue::UndeclaredAttribute,
            ..
        })
    );
}

#[test]
fn inherited_attributes_extend_the_grammar() {
    let _ = attrgram::logging::init_global_logging();

    // Thread a statement number down from StmtList into each Stmt
    let mut definition = sql_crud_definition();
    definition.attributes.get_mut("StmtList").unwrap().push(attrgram::grammar::AttributeDecl {
        name: "first".to_string(),
        kind: AttrKind::Inherited,
        ty: AttrType::Int,
    });
    definition.attributes.get_mut("Stmt").unwrap().push(attrgram::grammar::AttributeDecl {
        name: "number".to_string(),
        kind: AttrKind::Inherited,
        ty: AttrType::Int,
    });
    definition.productions[0].rules.push("StmtList.first := 1".into());
    definition.productions[1].rules.push("StmtList[1].first := StmtList[0].first".into());
    definition.productions[1].rules.push("Stmt.number := StmtList[0].first + 1".into());
    definition.productions[2].rules.push("Stmt.number := StmtList.first".into());

    let grammar = AttributeGrammar::from_definition(&definition).unwrap();
    assert!(grammar.completeness_gaps().is_empty());

    let tree = trees::program(&trees::demo_statements()[..2]).unwrap();
    let root = evaluation::evaluate(&tree, &grammar).unwrap();

    let list = &root.children[0];
    assert_eq!(list.get("first"), Some(&Value::Int(1)));
    assert_eq!(list.children[0].children[0].get("number"), Some(&Value::Int(1)));
    assert_eq!(list.children[1].get("number"), Some(&Value::Int(2)));
    let (sql, ok) = evaluation::extract(&root).unwrap();
    assert!(sql.starts_with("SELECT name,age FROM users WHERE id=5;\n"));
    assert!(ok);
}
