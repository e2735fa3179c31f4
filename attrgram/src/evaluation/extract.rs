//! Result Extractor

use super::error::{EvalResult, EvaluationError};
use super::node::EvaluatedNode;
use super::value::Value;
use crate::grammar::{AttrKind, AttrType, AttributeGrammar, Slot};

pub const SQL_ATTRIBUTE: &str = "sql";
pub const OK_ATTRIBUTE: &str = "ok";

/// Read the root's synthesized `sql` and `ok`
pub fn extract(root: &EvaluatedNode) -> EvalResult<(String, bool)> {
    let sql = match required(root, SQL_ATTRIBUTE)? {
        Value::Str(sql) => sql.clone(),
        other => return Err(wrong_type(root, SQL_ATTRIBUTE, AttrType::String, other)),
    };
    let ok = match required(root, OK_ATTRIBUTE)? {
        Value::Bool(ok) => *ok,
        other => return Err(wrong_type(root, OK_ATTRIBUTE, AttrType::Bool, other)),
    };
    Ok((sql, ok))
}

fn required<'a>(root: &'a EvaluatedNode, attribute: &str) -> EvalResult<&'a Value> {
    root.get(attribute)
        .ok_or_else(|| EvaluationError::missing_root(&root.symbol, attribute))
}

fn wrong_type(root: &EvaluatedNode, attribute: &str, expected: AttrType, found: &Value) -> EvaluationError {
    EvaluationError::type_mismatch(format!(
        "root attribute {}.{} must be {}, found {} {}",
        root.symbol,
        attribute,
        expected,
        found.attr_type(),
        found
    ))
}

/// Check, before evaluating, that the start symbol declares synthesized
/// `sql: string` and `ok: bool` and that every start production assigns them
pub fn check_root_contract(grammar: &AttributeGrammar) -> EvalResult<()> {
    let start = grammar.start_symbol();

    for (name, ty) in [(SQL_ATTRIBUTE, AttrType::String), (OK_ATTRIBUTE, AttrType::Bool)] {
        match grammar.attribute(start, name) {
            Some(attr) if attr.kind == AttrKind::Synthesized && attr.ty == ty => {}
            _ => return Err(EvaluationError::missing_root(start, name)),
        }

        for production in grammar.productions_for_head(start) {
            let assigned = production
                .rules
                .iter()
                .any(|rule| rule.target == Slot::Head && rule.attribute == name);
            if !assigned {
                return Err(EvaluationError::missing_root(start, name));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::GrammarBuilder;
    use assert_matches::assert_matches;
    use std::collections::BTreeMap;

    fn root(attributes: &[(&str, Value)]) -> EvaluatedNode {
        EvaluatedNode {
            symbol: "Program".to_string(),
            production: Some(crate::grammar::ProductionId(0)),
            lexeme: None,
            attributes: attributes
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect::<BTreeMap<_, _>>(),
            children: Vec::new(),
        }
    }

    #[test]
    fn test_extract() {
        let _ = crate::logging::init_global_logging();

        let node = root(&[("sql", Value::from("DELETE FROM t;")), ("ok", Value::Bool(true))]);
        assert_eq!(extract(&node).unwrap(), ("DELETE FROM t;".to_string(), true));
    }

    #[test]
    fn test_missing_and_mistyped() {
        let _ = crate::logging::init_global_logging();

        assert_matches!(
            extract(&root(&[("sql", Value::from("x"))])),
            Err(EvaluationError::MissingRootAttribute { attribute, .. }) if attribute == "ok"
        );
        assert_matches!(
            extract(&root(&[("sql", Value::Int(1)), ("ok", Value::Bool(true))])),
            Err(EvaluationError::TypeMismatch { .. })
        );
    }

    #[test]
    fn test_root_contract() {
        let _ = crate::logging::init_global_logging();

        let base = GrammarBuilder::new("contract")
            .nonterminals(&["Program"])
            .attribute("Program", "sql", AttrKind::Synthesized, AttrType::String)
            .attribute("Program", "ok", AttrKind::Synthesized, AttrType::Bool)
            .start("Program");

        let complete = base
            .clone()
            .production("Program", &[], &["Program.sql := ''", "Program.ok := true"])
            .build()
            .unwrap();
        assert!(check_root_contract(&complete).is_ok());

        let partial = base
            .production("Program", &[], &["Program.sql := ''"])
            .build()
            .unwrap();
        assert_matches!(
            check_root_contract(&partial),
            Err(EvaluationError::MissingRootAttribute { attribute, .. }) if attribute == "ok"
        );
    }
}
