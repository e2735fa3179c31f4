use super::PipelineResult;
use crate::evaluation::EvaluatedNode;
use serde::{Deserialize, Serialize};

/// Serializable form of a pipeline result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineOutput {
    pub sql: String,
    pub ok: bool,
    pub node_count: usize,
    pub duration_ms: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tree: Option<EvaluatedNode>,
}

impl PipelineOutput {
    pub fn new(result: &PipelineResult, include_tree: bool) -> Self {
        Self {
            sql: result.sql.clone(),
            ok: result.ok,
            node_count: result.node_count,
            duration_ms: result.processing_duration.as_secs_f64() * 1000.0,
            tree: include_tree.then(|| result.tree.clone()),
        }
    }
}
