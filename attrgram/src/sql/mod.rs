//! SQL CRUD reconstruction grammar
//!
//! Every nonterminal synthesizes `sql` (the statement text rebuilt from its
//! tokens) and `ok` (a simple validity flag); `ColList` also counts its
//! entries so INSERT can compare column and value counts.

pub mod trees;

use crate::grammar::{AttrKind, AttrType, AttributeGrammar, GrammarBuilder, GrammarDefinition, GrammarResult};

pub const GRAMMAR_NAME: &str = "sql_crud";

pub const NONTERMINALS: [&str; 11] = [
    "Program",
    "StmtList",
    "Stmt",
    "SelectStmt",
    "InsertStmt",
    "UpdateStmt",
    "DeleteStmt",
    "ColList",
    "TableName",
    "WhereOpt",
    "Cond",
];

pub const TERMINALS: [&str; 19] = [
    "SELECT", "INSERT", "INTO", "UPDATE", "DELETE", "FROM", "SET", "VALUES", "WHERE", "ID", "NUM",
    "STRING", "COMMA", "EQ", "AND", "STAR", "LPAREN", "RPAREN", "SEMI",
];

/// Production ids, in the order [`sql_crud_definition`] declares them
pub mod productions {
    use crate::grammar::ProductionId;

    pub const PROGRAM: ProductionId = ProductionId(0);
    pub const STMT_LIST_APPEND: ProductionId = ProductionId(1);
    pub const STMT_LIST_SINGLE: ProductionId = ProductionId(2);
    pub const STMT_SELECT: ProductionId = ProductionId(3);
    pub const STMT_INSERT: ProductionId = ProductionId(4);
    pub const STMT_UPDATE: ProductionId = ProductionId(5);
    pub const STMT_DELETE: ProductionId = ProductionId(6);
    pub const SELECT: ProductionId = ProductionId(7);
    pub const INSERT: ProductionId = ProductionId(8);
    pub const UPDATE: ProductionId = ProductionId(9);
    pub const DELETE: ProductionId = ProductionId(10);
    pub const COL_LIST_SINGLE: ProductionId = ProductionId(11);
    pub const COL_LIST_APPEND: ProductionId = ProductionId(12);
    pub const TABLE_NAME: ProductionId = ProductionId(13);
    pub const WHERE: ProductionId = ProductionId(14);
    pub const WHERE_EMPTY: ProductionId = ProductionId(15);
    pub const COND_NUM: ProductionId = ProductionId(16);
    pub const COND_STRING: ProductionId = ProductionId(17);
    pub const COND_AND: ProductionId = ProductionId(18);
}

pub fn sql_crud_definition() -> GrammarDefinition {
    GrammarBuilder::new(GRAMMAR_NAME)
        .nonterminals(&NONTERMINALS)
        .terminals(&TERMINALS)
        .attribute_on_all("sql", AttrKind::Synthesized, AttrType::String)
        .attribute_on_all("ok", AttrKind::Synthesized, AttrType::Bool)
        .attribute("ColList", "count", AttrKind::Synthesized, AttrType::Int)
        .production(
            "Program",
            &["StmtList"],
            &["Program.sql := StmtList.sql", "Program.ok := StmtList.ok"],
        )
        .production(
            "StmtList",
            &["StmtList", "Stmt"],
            &[
                "StmtList[0].ok := StmtList[1].ok and Stmt.ok",
                "StmtList[0].sql := StmtList[1].sql || '\\n' || Stmt.sql",
            ],
        )
        .production(
            "StmtList",
            &["Stmt"],
            &["StmtList.sql := Stmt.sql", "StmtList.ok := Stmt.ok"],
        )
        .production(
            "Stmt",
            &["SelectStmt", "SEMI"],
            &["Stmt.sql := SelectStmt.sql || ';'", "Stmt.ok := SelectStmt.ok"],
        )
        .production(
            "Stmt",
            &["InsertStmt", "SEMI"],
            &["Stmt.sql := InsertStmt.sql || ';'", "Stmt.ok := InsertStmt.ok"],
        )
        .production(
            "Stmt",
            &["UpdateStmt", "SEMI"],
            &["Stmt.sql := UpdateStmt.sql || ';'", "Stmt.ok := UpdateStmt.ok"],
        )
        .production(
            "Stmt",
            &["DeleteStmt", "SEMI"],
            &["Stmt.sql := DeleteStmt.sql || ';'", "Stmt.ok := DeleteStmt.ok"],
        )
        .production(
            "SelectStmt",
            &["SELECT", "ColList", "FROM", "TableName", "WhereOpt"],
            &[
                "SelectStmt.sql := 'SELECT ' || ColList.sql || ' FROM ' || TableName.sql || WhereOpt.sql",
                "SelectStmt.ok := ColList.ok and TableName.ok and WhereOpt.ok",
            ],
        )
        .production(
            "InsertStmt",
            &[
                "INSERT", "INTO", "TableName", "LPAREN", "ColList", "RPAREN", "VALUES", "LPAREN",
                "ColList", "RPAREN",
            ],
            &[
                "InsertStmt.sql := 'INSERT INTO ' || TableName.sql || '(' || ColList[1].sql || ') VALUES (' || ColList[2].sql || ')'",
                "InsertStmt.ok := (ColList[1].count = ColList[2].count) and TableName.ok and ColList[1].ok and ColList[2].ok",
            ],
        )
        .production(
            "UpdateStmt",
            &["UPDATE", "TableName", "SET", "ColList", "WhereOpt"],
            &[
                "UpdateStmt.sql := 'UPDATE ' || TableName.sql || ' SET ' || ColList.sql || WhereOpt.sql",
                "UpdateStmt.ok := TableName.ok and ColList.ok and WhereOpt.ok",
            ],
        )
        .production(
            "DeleteStmt",
            &["DELETE", "FROM", "TableName", "WhereOpt"],
            &[
                "DeleteStmt.sql := 'DELETE FROM ' || TableName.sql || WhereOpt.sql",
                "DeleteStmt.ok := TableName.ok and WhereOpt.ok",
            ],
        )
        .production(
            "ColList",
            &["ID"],
            &["ColList.sql := ID.lexeme", "ColList.count := 1", "ColList.ok := true"],
        )
        .production(
            "ColList",
            &["ColList", "COMMA", "ID"],
            &[
                "ColList[0].sql := ColList[1].sql || ',' || ID.lexeme",
                "ColList[0].count := ColList[1].count + 1",
                "ColList[0].ok := ColList[1].ok",
            ],
        )
        .production(
            "TableName",
            &["ID"],
            &["TableName.sql := ID.lexeme", "TableName.ok := true"],
        )
        .production(
            "WhereOpt",
            &["WHERE", "Cond"],
            &["WhereOpt.sql := ' WHERE ' || Cond.sql", "WhereOpt.ok := Cond.ok"],
        )
        .production(
            "WhereOpt",
            &[],
            &["WhereOpt.sql := ''", "WhereOpt.ok := true"],
        )
        .production(
            "Cond",
            &["ID", "EQ", "NUM"],
            &["Cond.sql := ID.lexeme || '=' || NUM.lexeme", "Cond.ok := true"],
        )
        .production(
            "Cond",
            &["ID", "EQ", "STRING"],
            &["Cond.sql := ID.lexeme || '=' || STRING.lexeme", "Cond.ok := true"],
        )
        .production(
            "Cond",
            &["Cond", "AND", "Cond"],
            &[
                "Cond[0].sql := Cond[1].sql || ' AND ' || Cond[2].sql",
                "Cond[0].ok := Cond[1].ok and Cond[2].ok",
            ],
        )
        .start("Program")
        .definition()
}

pub fn sql_crud_grammar() -> GrammarResult<AttributeGrammar> {
    AttributeGrammar::from_definition(&sql_crud_definition())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grammar_builds_complete() {
        let _ = crate::logging::init_global_logging();

        let grammar = sql_crud_grammar().unwrap();
        assert_eq!(grammar.nonterminals().len(), 11);
        assert_eq!(grammar.terminals().len(), 19);
        assert_eq!(grammar.productions().len(), 19);
        assert_eq!(grammar.start_symbol(), "Program");
        assert!(grammar.completeness_gaps().is_empty());
        assert_eq!(grammar.attributes_of("ColList").len(), 3);
        assert_eq!(grammar.productions_for_head("Stmt").len(), 4);
    }

    #[test]
    fn test_production_ids_match_declaration_order() {
        let _ = crate::logging::init_global_logging();
        let grammar = sql_crud_grammar().unwrap();

        let expected = [
            (productions::PROGRAM, "Program -> StmtList"),
            (productions::STMT_LIST_APPEND, "StmtList -> StmtList Stmt"),
            (productions::STMT_LIST_SINGLE, "StmtList -> Stmt"),
            (productions::STMT_SELECT, "Stmt -> SelectStmt SEMI"),
            (productions::STMT_INSERT, "Stmt -> InsertStmt SEMI"),
            (productions::STMT_UPDATE, "Stmt -> UpdateStmt SEMI"),
            (productions::STMT_DELETE, "Stmt -> DeleteStmt SEMI"),
            (productions::SELECT, "SelectStmt -> SELECT ColList FROM TableName WhereOpt"),
            (
                productions::INSERT,
                "InsertStmt -> INSERT INTO TableName LPAREN ColList RPAREN VALUES LPAREN ColList RPAREN",
            ),
            (productions::UPDATE, "UpdateStmt -> UPDATE TableName SET ColList WhereOpt"),
            (productions::DELETE, "DeleteStmt -> DELETE FROM TableName WhereOpt"),
            (productions::COL_LIST_SINGLE, "ColList -> ID"),
            (productions::COL_LIST_APPEND, "ColList -> ColList COMMA ID"),
            (productions::TABLE_NAME, "TableName -> ID"),
            (productions::WHERE, "WhereOpt -> WHERE Cond"),
            (productions::WHERE_EMPTY, "WhereOpt -> ε"),
            (productions::COND_NUM, "Cond -> ID EQ NUM"),
            (productions::COND_STRING, "Cond -> ID EQ STRING"),
            (productions::COND_AND, "Cond -> Cond AND Cond"),
        ];

        for (id, signature) in expected {
            assert_eq!(grammar.production(id).unwrap().signature(), signature);
        }
        assert_eq!(
            grammar.find_production("ColList", &["ColList", "COMMA", "ID"]),
            Some(productions::COL_LIST_APPEND)
        );
    }

    #[test]
    fn test_definition_roundtrips_through_toml() {
        let _ = crate::logging::init_global_logging();

        let definition = sql_crud_definition();
        let text = toml::to_string(&definition).unwrap();
        let parsed: GrammarDefinition = toml::from_str(&text).unwrap();
        assert_eq!(parsed, definition);
        assert!(parsed.build().is_ok());
    }
}
