//! Attribute evaluation: values, the rule interpreter, scheduling, the tree
//! evaluator and result extraction

pub mod error;
pub mod evaluator;
pub mod extract;
pub mod interpreter;
pub mod node;
pub mod schedule;
pub mod value;

pub use error::{EvalResult, EvaluationError};
pub use evaluator::{evaluate, evaluate_with_preferences};
pub use extract::{check_root_contract, extract};
pub use interpreter::Environment;
pub use node::EvaluatedNode;
pub use schedule::{ProductionSchedule, Schedule};
pub use value::Value;
