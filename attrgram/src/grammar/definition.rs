//! Serializable grammar definition documents
//!
//! A [`GrammarDefinition`] is the unvalidated, authorable form of a grammar:
//! symbol lists, attribute declarations and productions with their rules as
//! text. It deserializes from TOML or JSON and compiles through
//! [`AttributeGrammar::from_definition`].

use super::error::GrammarResult;
use super::model::{AttrKind, AttrType, Attribute, AttributeGrammar};
use crate::rules::ParsedRule;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

fn default_grammar_name() -> String {
    "grammar".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrammarDefinition {
    #[serde(default = "default_grammar_name")]
    pub name: String,
    pub nonterminals: Vec<String>,
    pub terminals: Vec<String>,
    pub start_symbol: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, Vec<AttributeDecl>>,
    #[serde(default)]
    pub productions: Vec<ProductionDecl>,
}

impl GrammarDefinition {
    pub fn build(&self) -> GrammarResult<AttributeGrammar> {
        AttributeGrammar::from_definition(self)
    }
}

/// One attribute declaration; `type` is the serialized key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDecl {
    pub name: String,
    pub kind: AttrKind,
    #[serde(rename = "type")]
    pub ty: AttrType,
}

impl From<&AttributeDecl> for Attribute {
    fn from(decl: &AttributeDecl) -> Self {
        Attribute::new(&decl.name, decl.kind, decl.ty)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionDecl {
    pub head: String,
    #[serde(default)]
    pub body: Vec<String>,
    #[serde(default)]
    pub rules: Vec<RuleSource>,
}

/// A rule as text (`ColList[0].count := ColList[1].count + 1`) or as an
/// already-built expression tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleSource {
    Text(String),
    Parsed(ParsedRule),
}

impl From<&str> for RuleSource {
    fn from(text: &str) -> Self {
        RuleSource::Text(text.to_string())
    }
}

impl From<String> for RuleSource {
    fn from(text: String) -> Self {
        RuleSource::Text(text)
    }
}

impl From<ParsedRule> for RuleSource {
    fn from(rule: ParsedRule) -> Self {
        RuleSource::Parsed(rule)
    }
}

impl fmt::Display for RuleSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleSource::Text(text) => f.write_str(text),
            RuleSource::Parsed(rule) => write!(f, "{}", rule),
        }
    }
}

/// Fluent construction of a [`GrammarDefinition`]
#[derive(Debug, Clone)]
pub struct GrammarBuilder {
    definition: GrammarDefinition,
}

impl GrammarBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            definition: GrammarDefinition {
                name: name.to_string(),
                nonterminals: Vec::new(),
                terminals: Vec::new(),
                start_symbol: String::new(),
                attributes: BTreeMap::new(),
                productions: Vec::new(),
            },
        }
    }

    pub fn nonterminals(mut self, names: &[&str]) -> Self {
        self.definition
            .nonterminals
            .extend(names.iter().map(|n| n.to_string()));
        self
    }

    pub fn terminals(mut self, names: &[&str]) -> Self {
        self.definition
            .terminals
            .extend(names.iter().map(|n| n.to_string()));
        self
    }

    /// Declare one attribute on one nonterminal
    pub fn attribute(mut self, nonterminal: &str, name: &str, kind: AttrKind, ty: AttrType) -> Self {
        self.definition
            .attributes
            .entry(nonterminal.to_string())
            .or_default()
            .push(AttributeDecl {
                name: name.to_string(),
                kind,
                ty,
            });
        self
    }

    /// Declare the same attribute on every nonterminal declared so far
    pub fn attribute_on_all(self, name: &str, kind: AttrKind, ty: AttrType) -> Self {
        let nonterminals = self.definition.nonterminals.clone();
        nonterminals
            .iter()
            .fold(self, |builder, nt| builder.attribute(nt, name, kind, ty))
    }

    pub fn production(mut self, head: &str, body: &[&str], rules: &[&str]) -> Self {
        self.definition.productions.push(ProductionDecl {
            head: head.to_string(),
            body: body.iter().map(|s| s.to_string()).collect(),
            rules: rules.iter().map(|r| RuleSource::from(*r)).collect(),
        });
        self
    }

    pub fn start(mut self, symbol: &str) -> Self {
        self.definition.start_symbol = symbol.to_string();
        self
    }

    pub fn definition(self) -> GrammarDefinition {
        self.definition
    }

    pub fn build(self) -> GrammarResult<AttributeGrammar> {
        AttributeGrammar::from_definition(&self.definition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::parse_rule;

    #[test]
    fn test_builder_collects_definition() {
        let _ = crate::logging::init_global_logging();

        let definition = GrammarBuilder::new("lists")
            .nonterminals(&["List"])
            .terminals(&["ITEM"])
            .attribute_on_all("size", AttrKind::Synthesized, AttrType::Int)
            .production("List", &["ITEM"], &["List.size := 1"])
            .start("List")
            .definition();

        assert_eq!(definition.name, "lists");
        assert_eq!(definition.attributes["List"].len(), 1);
        assert_eq!(definition.productions[0].rules[0].to_string(), "List.size := 1");
        assert_eq!(definition.start_symbol, "List");
    }

    #[test]
    fn test_definition_from_toml() {
        let source = r#"
            name = "flags"
            nonterminals = ["S"]
            terminals = ["X"]
            start_symbol = "S"

            [[attributes.S]]
            name = "ok"
            kind = "synthesized"
            type = "bool"

            [[productions]]
            head = "S"
            body = ["X"]
            rules = ["S.ok := X.lexeme = 'x'"]

            [[productions]]
            head = "S"
        "#;

        let definition: GrammarDefinition = toml::from_str(source).unwrap();
        assert_eq!(definition.name, "flags");
        assert_eq!(definition.attributes["S"][0].ty, AttrType::Bool);
        assert!(definition.productions[1].body.is_empty());
        assert!(definition.productions[1].rules.is_empty());
    }

    #[test]
    fn test_rule_source_accepts_text_and_trees() {
        let parsed = parse_rule("S.ok := true").unwrap();
        let json = serde_json::json!(["S.ok := false", parsed]);

        let rules: Vec<RuleSource> = serde_json::from_value(json).unwrap();
        assert!(matches!(rules[0], RuleSource::Text(_)));
        assert_eq!(rules[1], RuleSource::Parsed(parsed));
    }

    #[test]
    fn test_name_defaults() {
        let json = r#"{"nonterminals":["S"],"terminals":[],"start_symbol":"S"}"#;
        let definition: GrammarDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(definition.name, "grammar");
        assert!(definition.productions.is_empty());
    }
}
