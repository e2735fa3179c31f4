mod error;
mod info;
pub mod output;
mod result;
mod validation;

// Re-export public types
pub use error::PipelineError;
pub use info::{get_pipeline_info, PipelineInfo};
pub use output::PipelineOutput;
pub use result::PipelineResult;
pub use validation::validate_pipeline;

use crate::config::runtime::EvaluationPreferences;
use crate::evaluation::{self, EvaluationError};
use crate::grammar::AttributeGrammar;
use crate::logging::{self, codes, Code};
use crate::tree::ParseNode;
use std::time::Instant;

/// Evaluate a program tree and extract its root `sql` and `ok`
/// (schedule -> evaluate -> extract)
pub fn evaluate_program(
    grammar: &AttributeGrammar,
    tree: &ParseNode,
) -> Result<PipelineResult, PipelineError> {
    evaluate_program_with_preferences(grammar, tree, &EvaluationPreferences::default())
}

/// Evaluate a program tree with custom evaluation preferences
pub fn evaluate_program_with_preferences(
    grammar: &AttributeGrammar,
    tree: &ParseNode,
    preferences: &EvaluationPreferences,
) -> Result<PipelineResult, PipelineError> {
    let start_time = Instant::now();

    logging::with_grammar_context(grammar.name(), || {
        crate::log_info!("Starting evaluation pipeline",
            "start_symbol" => grammar.start_symbol(),
            "validate_root" => preferences.validate_root_attributes
        );

        let evaluated = run_stage(Stage::Evaluate, || {
            check_root_symbol(grammar, tree)?;
            if preferences.validate_root_attributes {
                evaluation::check_root_contract(grammar)?;
            }
            evaluation::evaluate_with_preferences(tree, grammar, preferences)
        })?;
        let (sql, ok) = run_stage(Stage::Extract, || evaluation::extract(&evaluated))?;

        let result = PipelineResult::new(
            sql,
            ok,
            evaluated,
            tree.node_count(),
            start_time.elapsed(),
        );
        result.log_success(grammar.name());

        Ok(result)
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Evaluate,
    Extract,
}

impl Stage {
    fn name(self) -> &'static str {
        match self {
            Stage::Evaluate => "evaluate",
            Stage::Extract => "extract",
        }
    }

    fn success_code(self) -> Code {
        match self {
            Stage::Evaluate => codes::success::TREE_EVALUATION_COMPLETE,
            Stage::Extract => codes::success::RESULT_EXTRACTION_COMPLETE,
        }
    }
}

/// Run one stage and time it. A failing stage is logged here, once.
fn run_stage<T>(
    stage: Stage,
    work: impl FnOnce() -> Result<T, EvaluationError>,
) -> Result<T, PipelineError> {
    let stage_start = Instant::now();

    match work() {
        Ok(value) => {
            crate::log_performance!(stage.success_code(), "Pipeline stage complete",
                duration = stage_start.elapsed(),
                "stage" => stage.name()
            );
            Ok(value)
        }
        Err(error) => {
            crate::log_error!(error.error_code(), &error.to_string(),
                "stage" => stage.name()
            );
            Err(error.into())
        }
    }
}

/// Build the SQL CRUD grammar and evaluate `tree` against it
pub fn evaluate_sql(tree: &ParseNode) -> Result<PipelineResult, PipelineError> {
    let grammar = crate::sql::sql_crud_grammar()?;
    evaluate_program(&grammar, tree)
}

/// A program tree must be rooted in a production of the start symbol
fn check_root_symbol(grammar: &AttributeGrammar, tree: &ParseNode) -> Result<(), EvaluationError> {
    let head = match tree {
        ParseNode::Node { production, .. } => grammar.production(*production).map(|p| p.head.as_str()),
        ParseNode::Leaf { .. } => None,
    };

    match head {
        Some(head) if head == grammar.start_symbol() => Ok(()),
        Some(head) => Err(EvaluationError::production_mismatch(
            "root",
            format!(
                "root derives '{}', expected start symbol '{}'",
                head,
                grammar.start_symbol()
            ),
        )),
        // Unknown productions and leaf roots are reported by the evaluator
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::MemoryLogger;
    use crate::sql::trees::{self, Comparison, Statement};
    use assert_matches::assert_matches;
    use std::sync::Arc;

    #[test]
    fn test_validate_pipeline() {
        let _ = crate::logging::init_global_logging();
        let result = validate_pipeline();
        assert!(result.is_ok(), "{:?}", result);
    }

    #[test]
    fn test_pipeline_error_creation() {
        let error = PipelineError::pipeline_error("Test error");
        match error {
            PipelineError::Pipeline { ref message } => {
                assert_eq!(message, "Test error");
            }
            _ => panic!("Wrong error type"),
        }
        assert_eq!(error.error_code().as_str(), "ERR001");
    }

    #[test]
    fn test_evaluate_sql_delete() {
        let _ = crate::logging::init_global_logging();

        let tree = trees::program(&[Statement::Delete {
            table: "users".to_string(),
            conditions: vec![Comparison::num("id", "3")],
        }])
        .unwrap();

        let result = evaluate_sql(&tree).unwrap();
        assert_eq!(result.sql, "DELETE FROM users WHERE id=3;");
        assert!(result.ok);
        assert_eq!(result.node_count, tree.node_count());

        let output = PipelineOutput::new(&result, false);
        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["sql"], "DELETE FROM users WHERE id=3;");
        assert!(json.get("tree").is_none());
    }

    #[test]
    fn test_root_must_derive_start_symbol() {
        let _ = crate::logging::init_global_logging();

        let stmt = trees::statement(&Statement::Delete {
            table: "t".to_string(),
            conditions: Vec::new(),
        })
        .unwrap();

        assert_matches!(
            evaluate_sql(&stmt),
            Err(PipelineError::Evaluation(EvaluationError::ProductionMismatch { .. }))
        );
    }

    #[test]
    fn test_failed_stage_is_logged_once() {
        let stmt = trees::statement(&Statement::Delete {
            table: "t".to_string(),
            conditions: Vec::new(),
        })
        .unwrap();
        let memory = Arc::new(MemoryLogger::new());

        let outcome = logging::with_logger(memory.clone(), || evaluate_sql(&stmt));

        assert!(outcome.is_err());
        let errors = memory.errors();
        assert_eq!(errors.len(), 1, "{:?}", errors);
        assert_eq!(errors[0].code, codes::evaluation::PRODUCTION_MISMATCH);
        assert_eq!(errors[0].site.stage.as_deref(), Some("evaluate"));
        assert_eq!(errors[0].site.grammar.as_deref(), Some("sql_crud"));
    }

    #[test]
    fn test_stage_timings_are_logged() {
        let tree = trees::program(&[Statement::Delete {
            table: "users".to_string(),
            conditions: Vec::new(),
        }])
        .unwrap();
        let memory = Arc::new(MemoryLogger::new());

        let result = logging::with_logger(memory.clone(), || evaluate_sql(&tree)).unwrap();
        assert!(result.ok);
        assert!(memory.errors().is_empty());
        assert_eq!(memory.count_code(codes::success::OPERATION_COMPLETED_SUCCESSFULLY), 1);

        if logging::config::log_performance_events() {
            let stages: Vec<_> = memory
                .events()
                .into_iter()
                .filter_map(|event| event.site.stage.clone())
                .collect();
            assert_eq!(stages, vec!["evaluate".to_string(), "extract".to_string()]);
        }
    }

    #[test]
    fn test_pipeline_info() {
        let info = get_pipeline_info();
        assert_eq!(info.pipeline_stages, 3);
        assert!(info.report().contains("Max Tree Depth"));
        assert!(info.summary().contains("attribute grammar evaluator"));
    }
}
