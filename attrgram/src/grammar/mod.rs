//! Grammar Model
//!
//! An [`AttributeGrammar`] is built once from a [`GrammarDefinition`] (or a
//! [`GrammarBuilder`]), validated, and read-only afterwards. Construction
//! parses every rule and resolves its occurrence references to body
//! positions, so evaluation works purely on slots.

mod display;

pub mod definition;
pub mod error;
pub mod model;
pub mod validation;

pub use definition::{AttributeDecl, GrammarBuilder, GrammarDefinition, ProductionDecl, RuleSource};
pub use error::{GrammarError, GrammarIssue, GrammarResult};
pub use model::{
    AttrKind, AttrType, Attribute, AttributeGrammar, CompiledRule, CompletenessGap, Production,
    ProductionId, Slot,
};
