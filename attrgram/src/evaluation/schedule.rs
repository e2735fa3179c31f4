//! Static evaluation schedules
//!
//! For every production a tree uses, rules are split into one inherited group
//! per body position plus the head's synthesized group. Each group is ordered
//! by declaration order with deferral over dependencies inside the group.
//! Reads that can never be satisfied in a single left-to-right pass are
//! reported as an [`EvaluationError::AttributeCycle`].

use super::error::{EvalResult, EvaluationError};
use crate::grammar::{AttrKind, AttributeGrammar, CompiledRule, Production, ProductionId, Slot};
use crate::logging::codes;
use crate::tree::ParseNode;
use crate::log_success;
use std::collections::{BTreeSet, HashMap};

/// Rule indices of one production, in run order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProductionSchedule {
    /// Inherited rules per body position, run just before that child is visited
    pub inherited: Vec<Vec<usize>>,
    /// Synthesized rules for the head, run after every child is visited
    pub synthesized: Vec<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct Schedule {
    productions: HashMap<ProductionId, ProductionSchedule>,
}

impl Schedule {
    /// Schedule every known production that occurs in `tree`. Unknown
    /// production ids are left for the evaluator to report with their path.
    pub fn for_tree(grammar: &AttributeGrammar, tree: &ParseNode) -> EvalResult<Self> {
        let mut used = BTreeSet::new();
        let mut stack = vec![tree];
        while let Some(node) = stack.pop() {
            if let ParseNode::Node { production, children } = node {
                used.insert(*production);
                stack.extend(children);
            }
        }

        let mut productions = HashMap::with_capacity(used.len());
        for id in used {
            if let Some(production) = grammar.production(id) {
                productions.insert(id, schedule_production(grammar, production)?);
            }
        }

        log_success!(
            codes::success::SCHEDULE_ANALYSIS_COMPLETE,
            "Evaluation schedule derived",
            "productions" => productions.len()
        );

        Ok(Self { productions })
    }

    /// Schedule every production of the grammar
    pub fn for_grammar(grammar: &AttributeGrammar) -> EvalResult<Self> {
        let productions = grammar
            .productions()
            .iter()
            .map(|p| schedule_production(grammar, p).map(|s| (p.id, s)))
            .collect::<EvalResult<HashMap<_, _>>>()?;
        Ok(Self { productions })
    }

    pub fn get(&self, id: ProductionId) -> Option<&ProductionSchedule> {
        self.productions.get(&id)
    }

    pub fn len(&self) -> usize {
        self.productions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.productions.is_empty()
    }
}

pub fn schedule_production(
    grammar: &AttributeGrammar,
    production: &Production,
) -> EvalResult<ProductionSchedule> {
    let mut inherited: Vec<Vec<usize>> = vec![Vec::new(); production.body.len()];
    let mut synthesized = Vec::new();

    for (index, rule) in production.rules.iter().enumerate() {
        match rule.target {
            Slot::Head => synthesized.push(index),
            Slot::Child(position) => {
                check_inherited_reads(grammar, production, rule, position)?;
                if let Some(group) = inherited.get_mut(position) {
                    group.push(index);
                }
            }
        }
    }

    let inherited = inherited
        .into_iter()
        .map(|group| order_group(production, &group))
        .collect::<EvalResult<Vec<_>>>()?;
    let synthesized = order_group(production, &synthesized)?;

    Ok(ProductionSchedule {
        inherited,
        synthesized,
    })
}

/// An inherited rule for child `position` runs before that child is visited,
/// so it may only see the head's inherited attributes, earlier siblings, and
/// inherited attributes of its own target.
fn check_inherited_reads(
    grammar: &AttributeGrammar,
    production: &Production,
    rule: &CompiledRule,
    position: usize,
) -> EvalResult<()> {
    let mut reads: Vec<(Slot, Option<&str>)> = Vec::new();
    rule.expr.for_each_read(&mut |slot, attribute| reads.push((*slot, attribute)));

    for (slot, attribute) in reads {
        let problem = match slot {
            Slot::Head => match attribute {
                Some(name) if kind_of(grammar, &production.head, name) == Some(AttrKind::Synthesized) => {
                    Some(format!(
                        "{}.{} is synthesized after every child is visited",
                        production.slot_label(slot),
                        name
                    ))
                }
                _ => None,
            },
            Slot::Child(other) if other > position => Some(format!(
                "{} is a later sibling of {}",
                production.slot_label(slot),
                production.slot_label(rule.target)
            )),
            Slot::Child(other) if other == position => match attribute {
                Some(name) => {
                    let symbol = production.symbol_at(slot).unwrap_or_default();
                    if kind_of(grammar, symbol, name) == Some(AttrKind::Synthesized) {
                        Some(format!(
                            "{}.{} depends on the inherited attributes it is given",
                            production.slot_label(slot),
                            name
                        ))
                    } else {
                        None
                    }
                }
                None => None,
            },
            Slot::Child(_) => None,
        };

        if let Some(reason) = problem {
            return Err(EvaluationError::cycle(
                &production.signature(),
                vec![rule.text(), reason],
            ));
        }
    }
    Ok(())
}

fn kind_of(grammar: &AttributeGrammar, symbol: &str, name: &str) -> Option<AttrKind> {
    grammar.attribute(symbol, name).map(|a| a.kind)
}

/// Order a group by declaration with deferral: a rule waits until every
/// attribute it reads that the same group assigns has been assigned.
fn order_group(production: &Production, group: &[usize]) -> EvalResult<Vec<usize>> {
    let assigned: HashMap<(Slot, &str), usize> = group
        .iter()
        .map(|&i| {
            let rule = &production.rules[i];
            ((rule.target, rule.attribute.as_str()), i)
        })
        .collect();

    let dependencies: HashMap<usize, Vec<usize>> = group
        .iter()
        .map(|&i| {
            let mut deps = Vec::new();
            production.rules[i].expr.for_each_read(&mut |slot, attribute| {
                if let Some(&dep) = attribute.and_then(|name| assigned.get(&(*slot, name))) {
                    deps.push(dep);
                }
            });
            (i, deps)
        })
        .collect();

    let mut order = Vec::with_capacity(group.len());
    let mut done = BTreeSet::new();
    let mut pending: Vec<usize> = group.to_vec();

    while !pending.is_empty() {
        let before = pending.len();
        pending.retain(|i| {
            let ready = dependencies[i].iter().all(|dep| done.contains(dep));
            if ready {
                order.push(*i);
                done.insert(*i);
            }
            !ready
        });

        if pending.len() == before {
            return Err(EvaluationError::cycle(
                &production.signature(),
                cycle_path(production, &pending, &dependencies),
            ));
        }
    }

    Ok(order)
}

/// Follow unmet dependencies from the first stuck rule until one repeats
fn cycle_path(
    production: &Production,
    pending: &[usize],
    dependencies: &HashMap<usize, Vec<usize>>,
) -> Vec<String> {
    let mut path: Vec<usize> = Vec::new();
    let mut current = pending[0];

    loop {
        if let Some(start) = path.iter().position(|&r| r == current) {
            let mut cycle: Vec<String> = path[start..]
                .iter()
                .map(|&r| production.rules[r].text())
                .collect();
            cycle.push(production.rules[current].text());
            return cycle;
        }
        path.push(current);

        match dependencies[&current].iter().find(|dep| pending.contains(dep)) {
            Some(&next) => current = next,
            None => return path.iter().map(|&r| production.rules[r].text()).collect(),
        }
    }
}
