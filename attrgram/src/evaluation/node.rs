//! Evaluated tree nodes

use super::value::Value;
use crate::grammar::ProductionId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A parse tree node annotated with its computed attributes. Built fresh by
/// every evaluation call and never shared with the input tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluatedNode {
    pub symbol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub production: Option<ProductionId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lexeme: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<EvaluatedNode>,
}

impl EvaluatedNode {
    pub(crate) fn leaf(terminal: &str, lexeme: &str) -> Self {
        Self {
            symbol: terminal.to_string(),
            production: None,
            lexeme: Some(lexeme.to_string()),
            attributes: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn get(&self, attribute: &str) -> Option<&Value> {
        self.attributes.get(attribute)
    }

    pub fn is_leaf(&self) -> bool {
        self.production.is_none()
    }
}

impl Drop for EvaluatedNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaf_serializes_compactly() {
        let leaf = EvaluatedNode::leaf("ID", "users");
        assert!(leaf.is_leaf());
        assert_eq!(leaf.get("sql"), None);
        assert_eq!(
            serde_json::to_string(&leaf).unwrap(),
            r#"{"symbol":"ID","lexeme":"users"}"#
        );
    }

    #[test]
    fn test_deep_chain_drops() {
        let mut node = EvaluatedNode::leaf("X", "x");
        for _ in 0..200_000 {
            let mut parent = EvaluatedNode::leaf("L", "");
            parent.children.push(node);
            node = parent;
        }
        drop(node);
    }
}
