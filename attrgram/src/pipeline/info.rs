use crate::config::compile_time::{evaluation, grammar};

/// Information about pipeline capabilities
#[derive(Debug, Clone)]
pub struct PipelineInfo {
    pub pipeline_stages: usize,
    pub supports_inherited_attributes: bool,
    pub supports_rule_text: bool,
    pub max_tree_depth: usize,
    pub max_tree_nodes: usize,
    pub max_productions: usize,
    pub max_rule_length: usize,
    pub build_profile: &'static str,
    pub global_logging_enabled: bool,
}

impl PipelineInfo {
    pub fn report(&self) -> String {
        format!(
            "Attribute Grammar Evaluation Pipeline:\n\
             - Pipeline Stages: {}\n\
             - Inherited Attributes: {}\n\
             - Textual Rules: {}\n\
             - Max Tree Depth: {}\n\
             - Max Tree Nodes: {}\n\
             - Max Productions: {}\n\
             - Max Rule Length: {} bytes\n\
             - Build Profile: {}\n\
             - Global Logging: {}",
            self.pipeline_stages,
            self.supports_inherited_attributes,
            self.supports_rule_text,
            self.max_tree_depth,
            self.max_tree_nodes,
            self.max_productions,
            self.max_rule_length,
            self.build_profile,
            self.global_logging_enabled
        )
    }

    pub fn summary(&self) -> String {
        format!(
            "{}-stage attribute grammar evaluator ({} profile, trees up to depth {})",
            self.pipeline_stages, self.build_profile, self.max_tree_depth
        )
    }
}

/// Get pipeline capabilities information
pub fn get_pipeline_info() -> PipelineInfo {
    PipelineInfo {
        // schedule, evaluate, extract
        pipeline_stages: 3,
        supports_inherited_attributes: true,
        supports_rule_text: true,
        max_tree_depth: evaluation::MAX_TREE_DEPTH,
        max_tree_nodes: evaluation::MAX_TREE_NODES,
        max_productions: grammar::MAX_PRODUCTIONS,
        max_rule_length: grammar::MAX_RULE_LENGTH,
        build_profile: crate::config::build_info::profile(),
        global_logging_enabled: crate::logging::is_initialized(),
    }
}
