// Internal modules
pub mod config;
pub mod evaluation;
pub mod grammar;
#[macro_use]
pub mod logging;
pub mod pipeline;
pub mod rules;
pub mod sql;
pub mod tree;
pub mod utils;

// Re-export key types for library consumers
pub use evaluation::{EvaluatedNode, EvaluationError, Value};
pub use grammar::{AttributeGrammar, GrammarBuilder, GrammarDefinition, GrammarError, ProductionId};
pub use pipeline::{evaluate_program, evaluate_sql, PipelineError, PipelineResult};
pub use tree::ParseNode;

// Re-export pipeline output for serializing consumers
pub use pipeline::output::PipelineOutput;
