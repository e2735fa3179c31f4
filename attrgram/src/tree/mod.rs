//! Parse trees handed in by an external parser
//!
//! Internal nodes carry the [`ProductionId`] the parser selected; leaves carry
//! a terminal name and its raw lexeme. Trees are plain owned hierarchies and
//! are never mutated by evaluation.

use crate::grammar::ProductionId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParseNode {
    Leaf {
        terminal: String,
        lexeme: String,
    },
    Node {
        production: ProductionId,
        #[serde(default)]
        children: Vec<ParseNode>,
    },
}

impl ParseNode {
    pub fn leaf(terminal: &str, lexeme: &str) -> Self {
        ParseNode::Leaf {
            terminal: terminal.to_string(),
            lexeme: lexeme.to_string(),
        }
    }

    pub fn node(production: ProductionId, children: Vec<ParseNode>) -> Self {
        ParseNode::Node {
            production,
            children,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, ParseNode::Leaf { .. })
    }

    pub fn children(&self) -> &[ParseNode] {
        match self {
            ParseNode::Leaf { .. } => &[],
            ParseNode::Node { children, .. } => children,
        }
    }

    /// Total number of nodes, leaves included
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children());
        }
        count
    }

    /// Number of nodes on the longest root-to-leaf path
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 1usize)];
        while let Some((node, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            stack.extend(node.children().iter().map(|child| (child, depth + 1)));
        }
        deepest
    }
}

/// Left-recursive lists nest one level per item, so subtrees are released
/// from a work list instead of through nested drop calls.
impl Drop for ParseNode {
    fn drop(&mut self) {
        let ParseNode::Node { children, .. } = self else {
            return;
        };
        let mut pending = std::mem::take(children);
        while let Some(mut node) = pending.pop() {
            if let ParseNode::Node { children, .. } = &mut node {
                pending.append(children);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ParseNode {
        ParseNode::node(
            ProductionId(2),
            vec![
                ParseNode::node(ProductionId(1), vec![ParseNode::leaf("ID", "a")]),
                ParseNode::leaf("COMMA", ","),
                ParseNode::leaf("ID", "b"),
            ],
        )
    }

    #[test]
    fn test_counts() {
        let tree = sample();
        assert_eq!(tree.node_count(), 5);
        assert_eq!(tree.depth(), 3);
        assert_eq!(ParseNode::leaf("ID", "x").depth(), 1);
        assert!(tree.children()[1].is_leaf());
    }

    #[test]
    fn test_json_shape() {
        let json = r#"{"production":2,"children":[
            {"production":1,"children":[{"terminal":"ID","lexeme":"a"}]},
            {"terminal":"COMMA","lexeme":","},
            {"terminal":"ID","lexeme":"b"}
        ]}"#;
        let tree: ParseNode = serde_json::from_str(json).unwrap();
        assert_eq!(tree, sample());

        let epsilon: ParseNode = serde_json::from_str(r#"{"production":7}"#).unwrap();
        assert_eq!(epsilon, ParseNode::node(ProductionId(7), vec![]));
    }

    #[test]
    fn test_deep_chain_counts_and_drops() {
        let mut tree = ParseNode::leaf("ID", "a");
        for _ in 0..200_000 {
            tree = ParseNode::node(ProductionId(0), vec![tree]);
        }
        assert_eq!(tree.depth(), 200_001);
        assert_eq!(tree.node_count(), 200_001);
        drop(tree);
    }
}
