use crate::evaluation::EvaluatedNode;
use std::time::Duration;

/// Outcome of evaluating one program tree
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub sql: String,
    pub ok: bool,
    pub tree: EvaluatedNode,
    pub node_count: usize,
    pub processing_duration: Duration,
}

impl PipelineResult {
    pub fn new(
        sql: String,
        ok: bool,
        tree: EvaluatedNode,
        node_count: usize,
        processing_duration: Duration,
    ) -> Self {
        Self {
            sql,
            ok,
            tree,
            node_count,
            processing_duration,
        }
    }

    pub fn log_success(&self, grammar: &str) {
        crate::log_success!(
            crate::logging::codes::success::OPERATION_COMPLETED_SUCCESSFULLY,
            "Evaluation pipeline succeeded",
            "grammar" => grammar,
            "ok" => self.ok,
            "nodes" => self.node_count,
            "duration_ms" => format!("{:.2}", self.processing_duration.as_secs_f64() * 1000.0),
            "nodes_per_sec" => format!("{:.0}",
                self.node_count as f64 / self.processing_duration.as_secs_f64().max(f64::EPSILON))
        );
    }
}
