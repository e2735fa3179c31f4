//! Immutable attribute grammar registry

use crate::rules::{Expr, ParsedRule};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttrKind {
    Synthesized,
    Inherited,
}

impl AttrKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttrKind::Synthesized => "synthesized",
            AttrKind::Inherited => "inherited",
        }
    }
}

impl fmt::Display for AttrKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttrType {
    String,
    Bool,
    Int,
}

impl AttrType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttrType::String => "string",
            AttrType::Bool => "bool",
            AttrType::Int => "int",
        }
    }
}

impl fmt::Display for AttrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub kind: AttrKind,
    #[serde(rename = "type")]
    pub ty: AttrType,
}

impl Attribute {
    pub fn new(name: &str, kind: AttrKind, ty: AttrType) -> Self {
        Self {
            name: name.to_string(),
            kind,
            ty,
        }
    }

    pub fn synthesized(name: &str, ty: AttrType) -> Self {
        Self::new(name, AttrKind::Synthesized, ty)
    }

    pub fn inherited(name: &str, ty: AttrType) -> Self {
        Self::new(name, AttrKind::Inherited, ty)
    }
}

/// Index of a production in its grammar; parse tree nodes carry this tag
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ProductionId(pub usize);

impl fmt::Display for ProductionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A symbol occurrence resolved to its position in a production
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Slot {
    Head,
    /// Body position, 0-based
    Child(usize),
}

/// One semantic rule with every occurrence resolved to a slot
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledRule {
    pub target: Slot,
    pub attribute: String,
    pub kind: AttrKind,
    pub expr: Expr<Slot>,
    /// The rule as authored, kept for diagnostics
    pub source: ParsedRule,
}

impl CompiledRule {
    pub fn text(&self) -> String {
        self.source.to_string()
    }

    /// Attributes of `slot` this rule reads; lexeme reads are excluded
    pub fn reads_of(&self, slot: Slot) -> Vec<&str> {
        let mut reads = Vec::new();
        self.expr.for_each_read(&mut |s, attribute| {
            if *s == slot {
                if let Some(name) = attribute {
                    reads.push(name);
                }
            }
        });
        reads
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Production {
    pub id: ProductionId,
    pub head: String,
    pub body: Vec<String>,
    pub rules: Vec<CompiledRule>,
    /// Symbol name to body positions, left to right
    occurrences: HashMap<String, Vec<usize>>,
}

impl Production {
    pub(crate) fn new(
        id: ProductionId,
        head: String,
        body: Vec<String>,
        rules: Vec<CompiledRule>,
    ) -> Self {
        let occurrences = occurrence_table(&body);
        Self {
            id,
            head,
            body,
            rules,
            occurrences,
        }
    }

    pub fn is_epsilon(&self) -> bool {
        self.body.is_empty()
    }

    /// Body positions holding `name`, in left-to-right order
    pub fn occurrences_of(&self, name: &str) -> &[usize] {
        self.occurrences
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Symbol at a slot
    pub fn symbol_at(&self, slot: Slot) -> Option<&str> {
        match slot {
            Slot::Head => Some(&self.head),
            Slot::Child(i) => self.body.get(i).map(String::as_str),
        }
    }

    /// The occurrence-indexed name of a slot, as rule text would write it
    pub fn slot_label(&self, slot: Slot) -> String {
        match slot {
            Slot::Head if self.occurrences_of(&self.head).is_empty() => self.head.clone(),
            Slot::Head => format!("{}[0]", self.head),
            Slot::Child(i) => {
                let Some(name) = self.body.get(i) else {
                    return format!("<child {}>", i);
                };
                let positions = self.occurrences_of(name);
                if positions.len() == 1 && *name != self.head {
                    name.clone()
                } else {
                    let nth = positions.iter().position(|&p| p == i).unwrap_or(0) + 1;
                    format!("{}[{}]", name, nth)
                }
            }
        }
    }

    /// `Head -> body` with `ε` for an empty body
    pub fn signature(&self) -> String {
        if self.body.is_empty() {
            format!("{} -> ε", self.head)
        } else {
            format!("{} -> {}", self.head, self.body.join(" "))
        }
    }
}

pub(crate) fn occurrence_table(body: &[String]) -> HashMap<String, Vec<usize>> {
    let mut table: HashMap<String, Vec<usize>> = HashMap::new();
    for (position, symbol) in body.iter().enumerate() {
        table.entry(symbol.clone()).or_default().push(position);
    }
    table
}

/// A production that leaves declared attributes without a defining rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletenessGap {
    pub production: ProductionId,
    pub missing: Vec<String>,
}

/// Validated, compiled attribute grammar. Built once, read-only afterwards.
#[derive(Debug, Clone)]
pub struct AttributeGrammar {
    pub(crate) name: String,
    pub(crate) nonterminals: Vec<String>,
    pub(crate) terminals: Vec<String>,
    pub(crate) attributes: BTreeMap<String, Vec<Attribute>>,
    pub(crate) productions: Vec<Production>,
    pub(crate) start_symbol: String,
    pub(crate) by_head: HashMap<String, Vec<ProductionId>>,
    pub(crate) nonterminal_set: HashSet<String>,
    pub(crate) terminal_set: HashSet<String>,
    pub(crate) gaps: Vec<CompletenessGap>,
}

impl AttributeGrammar {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn nonterminals(&self) -> &[String] {
        &self.nonterminals
    }

    pub fn terminals(&self) -> &[String] {
        &self.terminals
    }

    pub fn start_symbol(&self) -> &str {
        &self.start_symbol
    }

    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    pub fn production(&self, id: ProductionId) -> Option<&Production> {
        self.productions.get(id.0)
    }

    /// Alternatives for a nonterminal, in declaration order
    pub fn productions_for_head(&self, nonterminal: &str) -> Vec<&Production> {
        self.by_head
            .get(nonterminal)
            .map(|ids| ids.iter().filter_map(|id| self.production(*id)).collect())
            .unwrap_or_default()
    }

    /// Locate a production by its exact head and body
    pub fn find_production(&self, head: &str, body: &[&str]) -> Option<ProductionId> {
        self.productions_for_head(head)
            .into_iter()
            .find(|p| p.body.iter().map(String::as_str).eq(body.iter().copied()))
            .map(|p| p.id)
    }

    /// Declared attributes of a nonterminal, in declaration order
    pub fn attributes_of(&self, nonterminal: &str) -> &[Attribute] {
        self.attributes
            .get(nonterminal)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn attribute(&self, symbol: &str, name: &str) -> Option<&Attribute> {
        self.attributes_of(symbol).iter().find(|a| a.name == name)
    }

    pub fn is_terminal(&self, symbol: &str) -> bool {
        self.terminal_set.contains(symbol)
    }

    pub fn is_nonterminal(&self, symbol: &str) -> bool {
        self.nonterminal_set.contains(symbol)
    }

    /// Productions that do not define every attribute they are responsible for
    pub fn completeness_gaps(&self) -> &[CompletenessGap] {
        &self.gaps
    }
}
