// build.rs - TOML-driven compile-time limit generation
use std::env;
use std::fs;
use std::path::Path;

#[derive(serde::Deserialize)]
struct CompileTimeConfig {
    grammar: GrammarLimits,
    evaluation: EvaluationLimits,
    semantic: SemanticLimits,
    logging: LoggingLimits,
}

#[derive(serde::Deserialize)]
struct GrammarLimits {
    max_nonterminals: usize,
    max_terminals: usize,
    max_productions: usize,
    max_body_length: usize,
    max_rules_per_production: usize,
    max_rule_length: usize,
}

#[derive(serde::Deserialize)]
struct EvaluationLimits {
    max_tree_depth: usize,
    max_tree_nodes: usize,
}

#[derive(serde::Deserialize)]
struct SemanticLimits {
    max_error_message_length: usize,
    max_cycle_path_length: usize,
}

#[derive(serde::Deserialize)]
struct LoggingLimits {
    log_buffer_size: usize,
    max_log_message_length: usize,
    security_min_log_level: u8,
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=AG_BUILD_PROFILE");
    println!("cargo:rerun-if-env-changed=AG_CONFIG_DIR");

    let profile = env::var("AG_BUILD_PROFILE").unwrap_or_else(|_| "development".to_string());
    let config_dir = env::var("AG_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

    // Find workspace root (parent of attrgram directory)
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let workspace_root = Path::new(&manifest_dir)
        .parent()
        .expect("Could not find workspace root (parent directory)");

    let config_path = workspace_root
        .join(&config_dir)
        .join(format!("{}.toml", profile));

    println!("cargo:rerun-if-changed={}", config_path.display());

    if !config_path.exists() {
        panic!(
            "Configuration file not found: {}\nWorkspace root: {}\nLooking for: {}/{}/{}.toml",
            config_path.display(),
            workspace_root.display(),
            workspace_root.display(),
            config_dir,
            profile
        );
    }

    let config_content = fs::read_to_string(&config_path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", config_path.display(), e));

    let config: CompileTimeConfig = toml::from_str(&config_content)
        .unwrap_or_else(|e| panic!("Invalid TOML in {}: {}", config_path.display(), e));

    validate_limits(&config, &profile);
    generate_constants(&config, &profile);
}

fn validate_limits(config: &CompileTimeConfig, profile: &str) {
    const ABSOLUTE_MAX_TREE_DEPTH: usize = 10_000_000;
    const ABSOLUTE_MAX_RULE_LENGTH: usize = 1_000_000;

    if config.evaluation.max_tree_depth == 0
        || config.evaluation.max_tree_depth > ABSOLUTE_MAX_TREE_DEPTH
    {
        panic!("LIMITS: max_tree_depth must be between 1 and {}", ABSOLUTE_MAX_TREE_DEPTH);
    }

    if config.grammar.max_rule_length > ABSOLUTE_MAX_RULE_LENGTH {
        panic!("LIMITS: max_rule_length exceeds absolute maximum");
    }

    if config.semantic.max_cycle_path_length == 0 {
        panic!("LIMITS: max_cycle_path_length must be positive");
    }

    if config.logging.security_min_log_level > 2 {
        panic!("LIMITS: security_min_log_level too high (max: 2)");
    }

    if config.evaluation.max_tree_depth > config.evaluation.max_tree_nodes {
        panic!("LIMITS: max_tree_depth cannot exceed max_tree_nodes");
    }

    if profile == "production" && config.evaluation.max_tree_nodes > 1_000_000 {
        panic!("PRODUCTION: max_tree_nodes too high for production");
    }
}

fn generate_constants(config: &CompileTimeConfig, profile: &str) {
    let out_dir = env::var("OUT_DIR").unwrap();
    let output_path = Path::new(&out_dir).join("constants.rs");

    let constants_code = format!(
        r#"
// Generated compile-time constants from TOML configuration
// Profile: {}
// DO NOT EDIT - Generated by build.rs

pub mod compile_time {{
    pub mod grammar {{
        pub const MAX_NONTERMINALS: usize = {};
        pub const MAX_TERMINALS: usize = {};
        pub const MAX_PRODUCTIONS: usize = {};
        pub const MAX_BODY_LENGTH: usize = {};
        pub const MAX_RULES_PER_PRODUCTION: usize = {};
        pub const MAX_RULE_LENGTH: usize = {};
    }}

    pub mod evaluation {{
        pub const MAX_TREE_DEPTH: usize = {};
        pub const MAX_TREE_NODES: usize = {};
    }}

    pub mod semantic {{
        pub const MAX_ERROR_MESSAGE_LENGTH: usize = {};
        pub const MAX_CYCLE_PATH_LENGTH: usize = {};
    }}

    pub mod logging {{
        pub const LOG_BUFFER_SIZE: usize = {};
        pub const MAX_LOG_MESSAGE_LENGTH: usize = {};
        pub const SECURITY_MIN_LOG_LEVEL: u8 = {};
    }}
}}
"#,
        profile,
        config.grammar.max_nonterminals,
        config.grammar.max_terminals,
        config.grammar.max_productions,
        config.grammar.max_body_length,
        config.grammar.max_rules_per_production,
        config.grammar.max_rule_length,
        config.evaluation.max_tree_depth,
        config.evaluation.max_tree_nodes,
        config.semantic.max_error_message_length,
        config.semantic.max_cycle_path_length,
        config.logging.log_buffer_size,
        config.logging.max_log_message_length,
        config.logging.security_min_log_level,
    );

    fs::write(output_path, constants_code).unwrap();
}
