//! Consolidated error codes and classification system
//!
//! Single source of truth for all codes emitted by grammar construction and
//! tree evaluation, together with their behavioral metadata.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for both error and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ERROR CLASSIFICATION TYPES
// ============================================================================

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for a code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

impl ErrorMetadata {
    pub fn new(
        code: &'static str,
        category: &'static str,
        severity: Severity,
        recoverable: bool,
        requires_halt: bool,
        description: &'static str,
        recommended_action: &'static str,
    ) -> Self {
        Self {
            code,
            category,
            severity,
            recoverable,
            requires_halt,
            description,
            recommended_action,
        }
    }
}

// ============================================================================
// ERROR CODE CONSTANTS
// ============================================================================

/// System error codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
}

/// Input handling error codes (grammar and tree documents)
pub mod input {
    use super::Code;

    pub const READ_FAILURE: Code = Code::new("E010");
    pub const DECODE_FAILURE: Code = Code::new("E011");
}

/// Grammar construction error codes
pub mod grammar {
    use super::Code;

    pub const MALFORMED_GRAMMAR: Code = Code::new("E100");
    pub const UNKNOWN_SYMBOL: Code = Code::new("E101");
    pub const DUPLICATE_ATTRIBUTE: Code = Code::new("E102");
    pub const UNDECLARED_ATTRIBUTE: Code = Code::new("E103");
    pub const INVALID_START_SYMBOL: Code = Code::new("E104");
    pub const UNKNOWN_OCCURRENCE: Code = Code::new("E105");
    pub const RULE_SYNTAX: Code = Code::new("E106");
    pub const INCOMPLETE_DEFINITION: Code = Code::new("E107");
    pub const AMBIGUOUS_REFERENCE: Code = Code::new("E108");
    pub const LIMIT_EXCEEDED: Code = Code::new("E109");
}

/// Tree evaluation error codes
pub mod evaluation {
    use super::Code;

    pub const PRODUCTION_MISMATCH: Code = Code::new("E200");
    pub const UNBOUND_ATTRIBUTE: Code = Code::new("E201");
    pub const TYPE_MISMATCH: Code = Code::new("E202");
    pub const ATTRIBUTE_CYCLE: Code = Code::new("E203");
    pub const MISSING_ROOT_ATTRIBUTE: Code = Code::new("E204");
    pub const DEPTH_LIMIT_EXCEEDED: Code = Code::new("E205");
    pub const ARITHMETIC_OVERFLOW: Code = Code::new("E206");
    pub const TREE_TOO_LARGE: Code = Code::new("E207");
}

// ============================================================================
// WARNING CODE CONSTANTS
// ============================================================================

/// Warning codes
pub mod warnings {
    use super::Code;

    pub const GENERIC_WARNING: Code = Code::new("W000");
    pub const INCOMPLETE_PRODUCTION: Code = Code::new("W100");
}

// ============================================================================
// SUCCESS CODE CONSTANTS
// ============================================================================

/// Success codes
pub mod success {
    use super::Code;

    // General success codes
    pub const OPERATION_COMPLETED_SUCCESSFULLY: Code = Code::new("I001");
    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");

    // Grammar success codes
    pub const GRAMMAR_CONSTRUCTION_COMPLETE: Code = Code::new("I010");
    pub const RULE_COMPILATION_COMPLETE: Code = Code::new("I011");

    // Scheduling success codes
    pub const SCHEDULE_ANALYSIS_COMPLETE: Code = Code::new("I020");

    // Evaluation success codes
    pub const TREE_EVALUATION_COMPLETE: Code = Code::new("I030");
    pub const RESULT_EXTRACTION_COMPLETE: Code = Code::new("I031");
}

// ============================================================================
// ERROR METADATA REGISTRY
// ============================================================================

/// Error metadata registry using OnceLock for thread safety
static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

/// Initialize and get the error registry
fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        let mut registry = HashMap::new();
        let mut insert = |metadata: ErrorMetadata| {
            registry.insert(metadata.code, metadata);
        };

        // System errors
        insert(ErrorMetadata::new(
            "ERR001",
            "System",
            Severity::Critical,
            false,
            true,
            "Critical internal engine error",
            "File a bug report with the grammar and tree that triggered it",
        ));
        insert(ErrorMetadata::new(
            "ERR002",
            "System",
            Severity::Critical,
            false,
            true,
            "Engine initialization failed",
            "Check the build profile and logging configuration",
        ));

        // Input errors
        insert(ErrorMetadata::new(
            "E010",
            "Input",
            Severity::High,
            true,
            false,
            "Input document could not be read",
            "Check the path and file permissions",
        ));
        insert(ErrorMetadata::new(
            "E011",
            "Input",
            Severity::High,
            true,
            false,
            "Input document could not be decoded",
            "Check that the document is valid JSON or TOML in the expected shape",
        ));

        // Grammar construction errors
        insert(ErrorMetadata::new(
            "E100",
            "Grammar",
            Severity::High,
            true,
            false,
            "Grammar definition violates a structural invariant",
            "Fix the grammar definition and rebuild",
        ));
        insert(ErrorMetadata::new(
            "E101",
            "Grammar",
            Severity::High,
            true,
            false,
            "Production or rule references an unknown symbol",
            "Declare the symbol as a terminal or nonterminal",
        ));
        insert(ErrorMetadata::new(
            "E102",
            "Grammar",
            Severity::High,
            true,
            false,
            "Attribute declared twice on the same nonterminal",
            "Remove the duplicate attribute declaration",
        ));
        insert(ErrorMetadata::new(
            "E103",
            "Grammar",
            Severity::High,
            true,
            false,
            "Rule uses an attribute the symbol does not declare",
            "Declare the attribute or correct the rule",
        ));
        insert(ErrorMetadata::new(
            "E104",
            "Grammar",
            Severity::High,
            true,
            false,
            "Start symbol is not a declared nonterminal",
            "Set the start symbol to a declared nonterminal",
        ));
        insert(ErrorMetadata::new(
            "E105",
            "Grammar",
            Severity::High,
            true,
            false,
            "Rule references an occurrence not present in the production",
            "Check the occurrence index against the production body",
        ));
        insert(ErrorMetadata::new(
            "E106",
            "Grammar",
            Severity::High,
            true,
            false,
            "Semantic rule text could not be parsed",
            "Correct the rule expression syntax",
        ));
        insert(ErrorMetadata::new(
            "E107",
            "Grammar",
            Severity::Medium,
            true,
            false,
            "Production does not define every synthesized attribute of its head",
            "Add the missing rules or disable the completeness requirement",
        ));
        insert(ErrorMetadata::new(
            "E108",
            "Grammar",
            Severity::High,
            true,
            false,
            "Bare symbol reference is ambiguous in its production",
            "Add an occurrence index to the reference",
        ));
        insert(ErrorMetadata::new(
            "E109",
            "Grammar",
            Severity::High,
            true,
            false,
            "Grammar exceeds a compile-time size limit",
            "Reduce the grammar or build with a larger profile",
        ));

        // Evaluation errors
        insert(ErrorMetadata::new(
            "E200",
            "Evaluation",
            Severity::High,
            true,
            false,
            "Parse tree node does not match its production",
            "Check the tree against the grammar productions",
        ));
        insert(ErrorMetadata::new(
            "E201",
            "Evaluation",
            Severity::High,
            true,
            false,
            "Rule read an attribute that was never assigned",
            "Add the rule that defines the attribute",
        ));
        insert(ErrorMetadata::new(
            "E202",
            "Evaluation",
            Severity::High,
            true,
            false,
            "Value type does not match the attribute or operator",
            "Correct the rule expression types",
        ));
        insert(ErrorMetadata::new(
            "E203",
            "Evaluation",
            Severity::High,
            true,
            false,
            "Semantic rules have no valid evaluation order",
            "Break the cycle between the listed rules",
        ));
        insert(ErrorMetadata::new(
            "E204",
            "Evaluation",
            Severity::High,
            true,
            false,
            "Root node lacks a required attribute",
            "Define the attribute on every start production",
        ));
        insert(ErrorMetadata::new(
            "E205",
            "Evaluation",
            Severity::High,
            true,
            false,
            "Parse tree is deeper than the configured limit",
            "Flatten the tree or build with a larger profile",
        ));
        insert(ErrorMetadata::new(
            "E206",
            "Evaluation",
            Severity::High,
            true,
            false,
            "Integer arithmetic overflowed",
            "Check the rule inputs for unbounded growth",
        ));
        insert(ErrorMetadata::new(
            "E207",
            "Evaluation",
            Severity::High,
            true,
            false,
            "Parse tree has more nodes than the configured limit",
            "Split the input or build with a larger profile",
        ));

        // Warnings
        insert(ErrorMetadata::new(
            "W000",
            "General",
            Severity::Low,
            true,
            false,
            "General warning",
            "Review the warning message",
        ));
        insert(ErrorMetadata::new(
            "W100",
            "Grammar",
            Severity::Low,
            true,
            false,
            "Production leaves a synthesized attribute undefined",
            "Add the rule if the attribute is read at the root",
        ));

        // Success codes
        insert(ErrorMetadata::new(
            "I001",
            "General",
            Severity::Low,
            true,
            false,
            "Operation completed successfully",
            "No action required",
        ));
        insert(ErrorMetadata::new(
            "I004",
            "System",
            Severity::Low,
            true,
            false,
            "System initialization completed",
            "Engine ready",
        ));
        insert(ErrorMetadata::new(
            "I010",
            "Grammar",
            Severity::Low,
            true,
            false,
            "Grammar construction completed",
            "Grammar ready for evaluation",
        ));
        insert(ErrorMetadata::new(
            "I011",
            "Grammar",
            Severity::Low,
            true,
            false,
            "Semantic rule compilation completed",
            "Rules ready for scheduling",
        ));
        insert(ErrorMetadata::new(
            "I020",
            "Evaluation",
            Severity::Low,
            true,
            false,
            "Rule schedule analysis completed",
            "Schedules ready for tree evaluation",
        ));
        insert(ErrorMetadata::new(
            "I030",
            "Evaluation",
            Severity::Low,
            true,
            false,
            "Tree evaluation completed",
            "Attributes ready for extraction",
        ));
        insert(ErrorMetadata::new(
            "I031",
            "Evaluation",
            Severity::Low,
            true,
            false,
            "Result extraction completed",
            "No action required",
        ));

        registry
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

/// Get error metadata for a specific code
pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

/// Get error severity from code
pub fn get_severity(code: &str) -> Severity {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

/// Check if error is recoverable
pub fn is_recoverable(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

/// Check if error requires immediate halt
pub fn requires_halt(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.requires_halt)
        .unwrap_or(false)
}

/// Get human-readable description for code
pub fn get_description(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

/// Get recommended action for code
pub fn get_action(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

/// Get category from code
pub fn get_category(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_declared_code_has_metadata() {
        let declared = [
            system::INTERNAL_ERROR,
            system::INITIALIZATION_FAILURE,
            input::READ_FAILURE,
            input::DECODE_FAILURE,
            grammar::MALFORMED_GRAMMAR,
            grammar::UNKNOWN_SYMBOL,
            grammar::DUPLICATE_ATTRIBUTE,
            grammar::UNDECLARED_ATTRIBUTE,
            grammar::INVALID_START_SYMBOL,
            grammar::UNKNOWN_OCCURRENCE,
            grammar::RULE_SYNTAX,
            grammar::INCOMPLETE_DEFINITION,
            grammar::AMBIGUOUS_REFERENCE,
            grammar::LIMIT_EXCEEDED,
            evaluation::PRODUCTION_MISMATCH,
            evaluation::UNBOUND_ATTRIBUTE,
            evaluation::TYPE_MISMATCH,
            evaluation::ATTRIBUTE_CYCLE,
            evaluation::MISSING_ROOT_ATTRIBUTE,
            evaluation::DEPTH_LIMIT_EXCEEDED,
            evaluation::ARITHMETIC_OVERFLOW,
            evaluation::TREE_TOO_LARGE,
            warnings::GENERIC_WARNING,
            warnings::INCOMPLETE_PRODUCTION,
            success::OPERATION_COMPLETED_SUCCESSFULLY,
            success::SYSTEM_INITIALIZATION_COMPLETED,
            success::GRAMMAR_CONSTRUCTION_COMPLETE,
            success::RULE_COMPILATION_COMPLETE,
            success::SCHEDULE_ANALYSIS_COMPLETE,
            success::TREE_EVALUATION_COMPLETE,
            success::RESULT_EXTRACTION_COMPLETE,
        ];

        for code in declared {
            let metadata = get_error_metadata(code.as_str());
            assert!(metadata.is_some(), "missing metadata for {}", code);
        }
    }

    #[test]
    fn test_system_errors_halt() {
        assert!(requires_halt(system::INTERNAL_ERROR.as_str()));
        assert!(!is_recoverable(system::INTERNAL_ERROR.as_str()));
        assert_eq!(get_severity("ERR002"), Severity::Critical);
    }

    #[test]
    fn test_unknown_code_defaults() {
        assert_eq!(get_description("X999"), "Unknown error");
        assert_eq!(get_category("X999"), "Unknown");
        assert_eq!(get_severity("X999"), Severity::Medium);
        assert!(!requires_halt("X999"));
    }

    #[test]
    fn test_categories() {
        assert_eq!(get_category(grammar::RULE_SYNTAX.as_str()), "Grammar");
        assert_eq!(get_category(evaluation::ATTRIBUTE_CYCLE.as_str()), "Evaluation");
    }
}
