//! Tree Evaluator
//!
//! Walks a parse tree once. At each node, the inherited rules for child `i`
//! run just before child `i` is visited, and the head's synthesized rules run
//! after every child has returned. Results go into a fresh
//! [`EvaluatedNode`] tree; the input tree is never touched.

use super::error::{EvalResult, EvaluationError};
use super::interpreter::{self, Environment};
use super::node::EvaluatedNode;
use super::schedule::{ProductionSchedule, Schedule};
use super::value::Value;
use crate::config::compile_time::evaluation::{MAX_TREE_DEPTH, MAX_TREE_NODES};
use crate::config::runtime::EvaluationPreferences;
use crate::grammar::{AttributeGrammar, CompiledRule, Production, ProductionId, Slot};
use crate::logging::with_grammar_context;
use crate::tree::ParseNode;
use crate::log_debug;
use std::collections::BTreeMap;

/// Evaluate every attribute of `tree` with preferences from the environment
pub fn evaluate(tree: &ParseNode, grammar: &AttributeGrammar) -> EvalResult<EvaluatedNode> {
    evaluate_with_preferences(tree, grammar, &EvaluationPreferences::default())
}

/// Errors are returned, not logged; the pipeline stage that runs the
/// evaluator reports them once.
pub fn evaluate_with_preferences(
    tree: &ParseNode,
    grammar: &AttributeGrammar,
    preferences: &EvaluationPreferences,
) -> EvalResult<EvaluatedNode> {
    with_grammar_context(grammar.name(), || run(tree, grammar, preferences))
}

fn run(
    tree: &ParseNode,
    grammar: &AttributeGrammar,
    preferences: &EvaluationPreferences,
) -> EvalResult<EvaluatedNode> {
    if tree.depth() > MAX_TREE_DEPTH {
        return Err(EvaluationError::DepthLimitExceeded {
            limit: MAX_TREE_DEPTH,
        });
    }
    if tree.node_count() > MAX_TREE_NODES {
        return Err(EvaluationError::NodeLimitExceeded {
            limit: MAX_TREE_NODES,
        });
    }

    let schedule = Schedule::for_tree(grammar, tree)?;
    let evaluator = TreeEvaluator {
        grammar,
        schedule: &schedule,
        preferences,
    };

    match tree {
        ParseNode::Node { production, children } => evaluator.walk(*production, children),
        ParseNode::Leaf { terminal, .. } => Err(EvaluationError::production_mismatch(
            "root",
            format!("root is the terminal leaf '{}', expected a production node", terminal),
        )),
    }
}

fn format_path(path: &[usize]) -> String {
    let mut rendered = String::from("root");
    for index in path {
        rendered.push('/');
        rendered.push_str(&index.to_string());
    }
    rendered
}

struct TreeEvaluator<'a> {
    grammar: &'a AttributeGrammar,
    schedule: &'a Schedule,
    preferences: &'a EvaluationPreferences,
}

/// A node whose children are being visited. The next child to visit is
/// `state.visited.len()`.
struct Frame<'a> {
    children: &'a [ParseNode],
    schedule: &'a ProductionSchedule,
    state: NodeState<'a>,
}

impl<'a> TreeEvaluator<'a> {
    /// Depth-first walk over an explicit frame stack. `path` always holds the
    /// child positions leading to the top frame.
    fn walk(&self, root: ProductionId, children: &'a [ParseNode]) -> EvalResult<EvaluatedNode> {
        let mut path = Vec::new();
        let mut stack = vec![self.enter(root, children, BTreeMap::new(), &path)?];

        while let Some(frame) = stack.last_mut() {
            let children = frame.children;
            let position = frame.state.visited.len();

            if let Some(child) = children.get(position) {
                self.run_inherited(frame, position)?;

                match child {
                    ParseNode::Leaf { terminal, lexeme } => {
                        frame.state.visited.push(EvaluatedNode::leaf(terminal, lexeme));
                    }
                    ParseNode::Node {
                        production,
                        children: grandchildren,
                    } => {
                        let inherited = std::mem::take(&mut frame.state.child_inherited[position]);
                        path.push(position);
                        let child_frame = self.enter(*production, grandchildren, inherited, &path)?;
                        stack.push(child_frame);
                    }
                }
                continue;
            }

            let Some(frame) = stack.pop() else { break };
            let node = self.finish(frame)?;
            match stack.last_mut() {
                Some(parent) => {
                    parent.state.visited.push(node);
                    path.pop();
                }
                None => return Ok(node),
            }
        }

        Err(EvaluationError::production_mismatch(
            &format_path(&path),
            "evaluation ended without a root node",
        ))
    }

    fn enter(
        &self,
        id: ProductionId,
        children: &'a [ParseNode],
        inherited: BTreeMap<String, Value>,
        path: &[usize],
    ) -> EvalResult<Frame<'a>> {
        let production = self.grammar.production(id).ok_or_else(|| {
            EvaluationError::production_mismatch(
                &format_path(path),
                format!("production {} does not exist in grammar '{}'", id, self.grammar.name()),
            )
        })?;
        let schedule = self.schedule.get(id).ok_or_else(|| {
            EvaluationError::production_mismatch(
                &format_path(path),
                format!("production {} was not scheduled", id),
            )
        })?;

        self.check_shape(production, children, path)?;

        if self.preferences.log_node_visits {
            log_debug!("Visiting node",
                "path" => format_path(path),
                "production" => production.signature()
            );
        }

        Ok(Frame {
            children,
            schedule,
            state: NodeState {
                production,
                head_inherited: inherited,
                head_synthesized: BTreeMap::new(),
                visited: Vec::with_capacity(children.len()),
                child_inherited: vec![BTreeMap::new(); children.len()],
            },
        })
    }

    /// Inherited rules targeting the child at `position`, run just before it is visited
    fn run_inherited(&self, frame: &mut Frame<'a>, position: usize) -> EvalResult<()> {
        let production = frame.state.production;
        for &index in &frame.schedule.inherited[position] {
            let rule = &production.rules[index];
            let value = self.run_rule(&frame.state, rule)?;
            frame.state.child_inherited[position].insert(rule.attribute.clone(), value);
        }
        Ok(())
    }

    fn finish(&self, frame: Frame<'a>) -> EvalResult<EvaluatedNode> {
        let Frame {
            schedule,
            mut state,
            ..
        } = frame;
        self.run_synthesized(&mut state, schedule)?;

        let NodeState {
            production,
            head_inherited,
            head_synthesized,
            visited,
            ..
        } = state;
        let mut attributes = head_inherited;
        attributes.extend(head_synthesized);

        Ok(EvaluatedNode {
            symbol: production.head.clone(),
            production: Some(production.id),
            lexeme: None,
            attributes,
            children: visited,
        })
    }

    fn run_synthesized(&self, state: &mut NodeState<'_>, schedule: &ProductionSchedule) -> EvalResult<()> {
        let production = state.production;
        for &index in &schedule.synthesized {
            let rule = &production.rules[index];
            let value = self.run_rule(state, rule)?;
            state.head_synthesized.insert(rule.attribute.clone(), value);
        }
        Ok(())
    }

    /// Children must match the production body positionally
    fn check_shape(
        &self,
        production: &Production,
        children: &[ParseNode],
        path: &[usize],
    ) -> EvalResult<()> {
        if children.len() != production.body.len() {
            return Err(EvaluationError::production_mismatch(
                &format_path(path),
                format!(
                    "'{}' expects {} children, node has {}",
                    production.signature(),
                    production.body.len(),
                    children.len()
                ),
            ));
        }

        for (position, (child, expected)) in children.iter().zip(&production.body).enumerate() {
            let found = match child {
                ParseNode::Leaf { terminal, .. } => {
                    if self.grammar.is_terminal(expected) && terminal == expected {
                        continue;
                    }
                    format!("terminal '{}'", terminal)
                }
                ParseNode::Node {
                    production: child_id,
                    ..
                } => match self.grammar.production(*child_id) {
                    Some(child) if &child.head == expected => continue,
                    Some(child) => format!("production '{}'", child.signature()),
                    None => format!("unknown production {}", child_id),
                },
            };

            let mut child_path = path.to_vec();
            child_path.push(position);
            return Err(EvaluationError::production_mismatch(
                &format_path(&child_path),
                format!(
                    "'{}' expects '{}' at position {}, found {}",
                    production.signature(),
                    expected,
                    position,
                    found
                ),
            ));
        }
        Ok(())
    }

    fn run_rule(&self, state: &NodeState<'_>, rule: &CompiledRule) -> EvalResult<Value> {
        let value = interpreter::evaluate(&rule.expr, state).map_err(|e| e.with_rule(&rule.text()))?;

        let symbol = state.production.symbol_at(rule.target).unwrap_or_default();
        if let Some(declared) = self.grammar.attribute(symbol, &rule.attribute) {
            if declared.ty != value.attr_type() {
                return Err(EvaluationError::type_mismatch(format!(
                    "{}.{} is declared {} but the rule produced {} {}",
                    state.production.slot_label(rule.target),
                    rule.attribute,
                    declared.ty,
                    value.attr_type(),
                    value
                ))
                .with_rule(&rule.text()));
            }
        }
        Ok(value)
    }
}

/// Attribute values visible while one node's rules run
struct NodeState<'a> {
    production: &'a Production,
    head_inherited: BTreeMap<String, Value>,
    head_synthesized: BTreeMap<String, Value>,
    /// Children already visited, in body order
    visited: Vec<EvaluatedNode>,
    /// Inherited attributes assigned to children not yet visited
    child_inherited: Vec<BTreeMap<String, Value>>,
}

impl Environment<Slot> for NodeState<'_> {
    fn lookup(&self, slot: &Slot, attribute: Option<&str>) -> Option<Value> {
        match (*slot, attribute) {
            (Slot::Head, Some(name)) => self
                .head_synthesized
                .get(name)
                .or_else(|| self.head_inherited.get(name))
                .cloned(),
            (Slot::Head, None) => None,
            (Slot::Child(position), attribute) => match self.visited.get(position) {
                Some(child) => match attribute {
                    Some(name) => child.get(name).cloned(),
                    None => child.lexeme.clone().map(Value::Str),
                },
                None => attribute
                    .and_then(|name| self.child_inherited.get(position)?.get(name))
                    .cloned(),
            },
        }
    }

    fn describe(&self, slot: &Slot, attribute: Option<&str>) -> String {
        format!(
            "{}.{}",
            self.production.slot_label(*slot),
            attribute.unwrap_or(crate::rules::LEXEME)
        )
    }
}
