//! Grammar construction: validation of a definition and rule compilation
//!
//! Every structural invariant is checked here, once, before any tree is
//! evaluated. Rule text is parsed and every symbol reference is resolved to a
//! positional [`Slot`], so evaluation never looks symbols up by name.

use super::definition::{GrammarDefinition, ProductionDecl, RuleSource};
use super::error::{GrammarError, GrammarIssue, GrammarResult};
use super::model::{
    occurrence_table, AttrKind, Attribute, AttributeGrammar, CompiledRule, CompletenessGap,
    Production, ProductionId, Slot,
};
use crate::config::compile_time::grammar::{
    MAX_BODY_LENGTH, MAX_NONTERMINALS, MAX_PRODUCTIONS, MAX_RULES_PER_PRODUCTION, MAX_TERMINALS,
};
use crate::config::runtime::GrammarPreferences;
use crate::logging::{codes, with_grammar_context};
use crate::rules::{parse_rule, Expr, ParsedRule, RuleError, SymbolRef, LEXEME};
use crate::{log_debug, log_error, log_success, log_warning};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::time::Instant;

/// Words the rule language claims for itself
const RESERVED_WORDS: [&str; 5] = [LEXEME, "and", "or", "true", "false"];

impl AttributeGrammar {
    /// Validate and compile a definition with preferences from the environment
    pub fn from_definition(definition: &GrammarDefinition) -> GrammarResult<Self> {
        Self::from_definition_with_preferences(definition, &GrammarPreferences::default())
    }

    pub fn from_definition_with_preferences(
        definition: &GrammarDefinition,
        preferences: &GrammarPreferences,
    ) -> GrammarResult<Self> {
        with_grammar_context(&definition.name, || {
            build_grammar(definition, preferences).map_err(|error| {
                log_error!(error.error_code(), &error.to_string(),
                    "grammar" => &definition.name
                );
                error
            })
        })
    }
}

fn build_grammar(
    definition: &GrammarDefinition,
    preferences: &GrammarPreferences,
) -> GrammarResult<AttributeGrammar> {
    let start_time = Instant::now();

    check_limits(definition)?;
    let symbols = SymbolTable::new(definition)?;
    check_start_symbol(definition, &symbols)?;
    let attributes = collect_attributes(definition, &symbols)?;

    let mut productions = Vec::with_capacity(definition.productions.len());
    let mut by_head: HashMap<String, Vec<ProductionId>> = HashMap::new();
    let mut rule_count = 0usize;

    for (index, decl) in definition.productions.iter().enumerate() {
        let id = ProductionId(index);
        let production = ProductionCompiler::new(id, decl, &symbols, &attributes)?
            .compile(preferences)?;
        rule_count += production.rules.len();
        by_head.entry(production.head.clone()).or_default().push(id);
        productions.push(production);
    }

    for nonterminal in &definition.nonterminals {
        if !by_head.contains_key(nonterminal) {
            log_warning!("Nonterminal has no productions",
                "nonterminal" => nonterminal
            );
        }
    }

    log_success!(
        codes::success::RULE_COMPILATION_COMPLETE,
        "Semantic rules compiled",
        "rules" => rule_count
    );

    let gaps = find_completeness_gaps(&productions, &attributes);
    report_gaps(&gaps, &productions, preferences)?;

    let grammar = AttributeGrammar {
        name: definition.name.clone(),
        nonterminals: definition.nonterminals.clone(),
        terminals: definition.terminals.clone(),
        attributes,
        productions,
        start_symbol: definition.start_symbol.clone(),
        by_head,
        nonterminal_set: symbols.nonterminals,
        terminal_set: symbols.terminals,
        gaps,
    };

    log_success!(
        codes::success::GRAMMAR_CONSTRUCTION_COMPLETE,
        "Attribute grammar constructed",
        "productions" => grammar.productions.len(),
        "nonterminals" => grammar.nonterminals.len(),
        "terminals" => grammar.terminals.len(),
        "duration_ms" => start_time.elapsed().as_secs_f64() * 1000.0
    );

    Ok(grammar)
}

fn check_limits(definition: &GrammarDefinition) -> GrammarResult<()> {
    let checks = [
        ("nonterminal count", definition.nonterminals.len(), MAX_NONTERMINALS),
        ("terminal count", definition.terminals.len(), MAX_TERMINALS),
        ("production count", definition.productions.len(), MAX_PRODUCTIONS),
    ];
    for (what, actual, limit) in checks {
        if actual > limit {
            return Err(GrammarError::limit_exceeded(what, limit, actual));
        }
    }

    for production in &definition.productions {
        if production.body.len() > MAX_BODY_LENGTH {
            return Err(GrammarError::limit_exceeded(
                "production body length",
                MAX_BODY_LENGTH,
                production.body.len(),
            ));
        }
        if production.rules.len() > MAX_RULES_PER_PRODUCTION {
            return Err(GrammarError::limit_exceeded(
                "rules per production",
                MAX_RULES_PER_PRODUCTION,
                production.rules.len(),
            ));
        }
    }
    Ok(())
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

fn check_name(name: &str, what: &str) -> GrammarResult<()> {
    if !is_identifier(name) {
        return Err(GrammarError::malformed(
            GrammarIssue::Structure,
            format!("{} '{}' is not a valid identifier", what, name),
        ));
    }
    if RESERVED_WORDS.contains(&name) {
        return Err(GrammarError::malformed(
            GrammarIssue::Structure,
            format!("{} '{}' is a reserved word", what, name),
        ));
    }
    Ok(())
}

struct SymbolTable {
    nonterminals: HashSet<String>,
    terminals: HashSet<String>,
}

impl SymbolTable {
    fn new(definition: &GrammarDefinition) -> GrammarResult<Self> {
        let mut nonterminals = HashSet::new();
        for name in &definition.nonterminals {
            check_name(name, "Nonterminal")?;
            if !nonterminals.insert(name.clone()) {
                return Err(GrammarError::malformed(
                    GrammarIssue::Structure,
                    format!("Nonterminal '{}' is declared more than once", name),
                ));
            }
        }

        let mut terminals = HashSet::new();
        for name in &definition.terminals {
            check_name(name, "Terminal")?;
            if nonterminals.contains(name) {
                return Err(GrammarError::malformed(
                    GrammarIssue::Structure,
                    format!("'{}' is declared as both terminal and nonterminal", name),
                ));
            }
            if !terminals.insert(name.clone()) {
                return Err(GrammarError::malformed(
                    GrammarIssue::Structure,
                    format!("Terminal '{}' is declared more than once", name),
                ));
            }
        }

        Ok(Self {
            nonterminals,
            terminals,
        })
    }

    fn is_nonterminal(&self, name: &str) -> bool {
        self.nonterminals.contains(name)
    }

    fn is_terminal(&self, name: &str) -> bool {
        self.terminals.contains(name)
    }
}

fn check_start_symbol(definition: &GrammarDefinition, symbols: &SymbolTable) -> GrammarResult<()> {
    if symbols.is_nonterminal(&definition.start_symbol) {
        return Ok(());
    }
    Err(GrammarError::malformed(
        GrammarIssue::InvalidStartSymbol,
        format!(
            "Start symbol '{}' is not a declared nonterminal",
            definition.start_symbol
        ),
    ))
}

fn collect_attributes(
    definition: &GrammarDefinition,
    symbols: &SymbolTable,
) -> GrammarResult<BTreeMap<String, Vec<Attribute>>> {
    let mut attributes = BTreeMap::new();

    for (symbol, decls) in &definition.attributes {
        if symbols.is_terminal(symbol) {
            return Err(GrammarError::malformed(
                GrammarIssue::Structure,
                format!(
                    "Terminal '{}' cannot declare attributes; terminals only carry '{}'",
                    symbol, LEXEME
                ),
            ));
        }
        if !symbols.is_nonterminal(symbol) {
            return Err(GrammarError::malformed(
                GrammarIssue::UnknownSymbol,
                format!("Attributes declared for unknown symbol '{}'", symbol),
            ));
        }

        let mut seen = HashSet::new();
        let mut declared = Vec::with_capacity(decls.len());
        for decl in decls {
            check_name(&decl.name, "Attribute")?;
            if !seen.insert(decl.name.as_str()) {
                return Err(GrammarError::malformed(
                    GrammarIssue::DuplicateAttribute,
                    format!("Attribute '{}' is declared twice on '{}'", decl.name, symbol),
                ));
            }
            declared.push(Attribute::from(decl));
        }
        attributes.insert(symbol.clone(), declared);
    }

    Ok(attributes)
}

/// Compiles one production declaration against the validated symbol table
struct ProductionCompiler<'a> {
    id: ProductionId,
    decl: &'a ProductionDecl,
    symbols: &'a SymbolTable,
    attributes: &'a BTreeMap<String, Vec<Attribute>>,
    occurrences: HashMap<String, Vec<usize>>,
    signature: String,
}

impl<'a> ProductionCompiler<'a> {
    fn new(
        id: ProductionId,
        decl: &'a ProductionDecl,
        symbols: &'a SymbolTable,
        attributes: &'a BTreeMap<String, Vec<Attribute>>,
    ) -> GrammarResult<Self> {
        if symbols.is_terminal(&decl.head) {
            return Err(GrammarError::malformed(
                GrammarIssue::Structure,
                format!("Production head '{}' is a terminal", decl.head),
            ));
        }
        if !symbols.is_nonterminal(&decl.head) {
            return Err(GrammarError::malformed(
                GrammarIssue::UnknownSymbol,
                format!("Production head '{}' is not a declared nonterminal", decl.head),
            ));
        }
        for symbol in &decl.body {
            if !symbols.is_nonterminal(symbol) && !symbols.is_terminal(symbol) {
                return Err(GrammarError::malformed(
                    GrammarIssue::UnknownSymbol,
                    format!(
                        "Unknown symbol '{}' in body of production for '{}'",
                        symbol, decl.head
                    ),
                ));
            }
        }

        let signature = if decl.body.is_empty() {
            format!("{} -> ε", decl.head)
        } else {
            format!("{} -> {}", decl.head, decl.body.join(" "))
        };

        Ok(Self {
            id,
            decl,
            symbols,
            attributes,
            occurrences: occurrence_table(&decl.body),
            signature,
        })
    }

    fn compile(self, preferences: &GrammarPreferences) -> GrammarResult<Production> {
        let mut rules: Vec<CompiledRule> = Vec::with_capacity(self.decl.rules.len());
        let mut targets: HashSet<(Slot, String)> = HashSet::new();

        for source in &self.decl.rules {
            let parsed = parse_source(source)?;
            let rule = self.compile_rule(parsed)?;

            if !targets.insert((rule.target, rule.attribute.clone())) {
                return Err(GrammarError::malformed(
                    GrammarIssue::Structure,
                    format!(
                        "'{}' is assigned more than once in production '{}'",
                        rule.source.target, self.signature
                    ),
                ));
            }

            if preferences.log_rule_compilation {
                log_debug!("Compiled semantic rule",
                    "production" => &self.signature,
                    "rule" => rule.text()
                );
            }
            rules.push(rule);
        }

        Ok(Production::new(
            self.id,
            self.decl.head.clone(),
            self.decl.body.clone(),
            rules,
        ))
    }

    fn compile_rule(&self, parsed: ParsedRule) -> GrammarResult<CompiledRule> {
        let target = self.resolve(&parsed.target.symbol)?;
        let target_symbol = self.symbol_at(target);
        let attribute_name = parsed.target.attribute.as_str();

        if self.symbols.is_terminal(target_symbol) {
            return Err(GrammarError::malformed(
                GrammarIssue::Structure,
                format!(
                    "Rule '{}' assigns to terminal '{}'",
                    parsed, parsed.target.symbol
                ),
            ));
        }
        if attribute_name == LEXEME {
            return Err(GrammarError::malformed(
                GrammarIssue::Structure,
                format!("Rule '{}' assigns to the reserved '{}'", parsed, LEXEME),
            ));
        }

        let attribute = self.declared(target_symbol, attribute_name).ok_or_else(|| {
            GrammarError::malformed(
                GrammarIssue::UndeclaredAttribute,
                format!(
                    "Rule '{}' assigns undeclared attribute '{}' of '{}'",
                    parsed, attribute_name, target_symbol
                ),
            )
        })?;

        match (attribute.kind, target) {
            (AttrKind::Synthesized, Slot::Child(_)) => {
                return Err(GrammarError::malformed(
                    GrammarIssue::Structure,
                    format!(
                        "Rule '{}' assigns synthesized '{}' of a body symbol; only the head defines it",
                        parsed, attribute_name
                    ),
                ))
            }
            (AttrKind::Inherited, Slot::Head) => {
                return Err(GrammarError::malformed(
                    GrammarIssue::Structure,
                    format!(
                        "Rule '{}' assigns inherited '{}' of the head; only the parent defines it",
                        parsed, attribute_name
                    ),
                ))
            }
            _ => {}
        }

        let expr = parsed.expr.map_refs(&mut |symbol| self.resolve(symbol))?;
        self.check_reads(&parsed, &expr)?;

        Ok(CompiledRule {
            target,
            attribute: attribute_name.to_string(),
            kind: attribute.kind,
            expr,
            source: parsed,
        })
    }

    fn check_reads(&self, parsed: &ParsedRule, expr: &Expr<Slot>) -> GrammarResult<()> {
        let mut reads: Vec<(Slot, Option<&str>)> = Vec::new();
        expr.for_each_read(&mut |slot, attribute| reads.push((*slot, attribute)));

        for (slot, attribute) in reads {
            let symbol = self.symbol_at(slot);
            match attribute {
                None if self.symbols.is_nonterminal(symbol) => {
                    return Err(GrammarError::malformed(
                        GrammarIssue::Structure,
                        format!(
                            "Rule '{}' reads '{}' of nonterminal '{}'",
                            parsed, LEXEME, symbol
                        ),
                    ));
                }
                None => {}
                Some(name) if self.symbols.is_terminal(symbol) => {
                    return Err(GrammarError::malformed(
                        GrammarIssue::UndeclaredAttribute,
                        format!(
                            "Rule '{}' reads '{}' of terminal '{}'; terminals only carry '{}'",
                            parsed, name, symbol, LEXEME
                        ),
                    ));
                }
                Some(name) => {
                    if self.declared(symbol, name).is_none() {
                        return Err(GrammarError::malformed(
                            GrammarIssue::UndeclaredAttribute,
                            format!(
                                "Rule '{}' reads undeclared attribute '{}' of '{}'",
                                parsed, name, symbol
                            ),
                        ));
                    }
                }
            }
        }
        Ok(())
    }

    /// Resolve an occurrence reference: `Name[0]` is the head, `Name[k]` the
    /// k-th body occurrence, a bare name only when unambiguous
    fn resolve(&self, symbol: &SymbolRef) -> GrammarResult<Slot> {
        let name = symbol.name.as_str();
        let is_head = name == self.decl.head;
        let positions = self
            .occurrences
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or(&[]);

        if !is_head && positions.is_empty() {
            return Err(GrammarError::malformed(
                GrammarIssue::UnknownSymbol,
                format!(
                    "Symbol '{}' does not occur in production '{}'",
                    symbol, self.signature
                ),
            ));
        }

        match symbol.index {
            Some(0) if is_head => Ok(Slot::Head),
            Some(0) => Err(GrammarError::unknown_occurrence(
                &self.signature,
                name,
                0,
                positions.len(),
            )),
            Some(index) => positions
                .get(index as usize - 1)
                .map(|&position| Slot::Child(position))
                .ok_or_else(|| {
                    GrammarError::unknown_occurrence(
                        &self.signature,
                        name,
                        index,
                        positions.len(),
                    )
                }),
            None => match (is_head, positions) {
                (true, []) => Ok(Slot::Head),
                (false, [position]) => Ok(Slot::Child(*position)),
                _ => Err(GrammarError::malformed(
                    GrammarIssue::AmbiguousReference,
                    format!(
                        "Bare '{}' is ambiguous in production '{}'; write {}[0] for the head or {}[k] for the k-th body occurrence",
                        name, self.signature, name, name
                    ),
                )),
            },
        }
    }

    fn symbol_at(&self, slot: Slot) -> &str {
        match slot {
            Slot::Head => &self.decl.head,
            Slot::Child(position) => &self.decl.body[position],
        }
    }

    fn declared(&self, symbol: &str, name: &str) -> Option<&Attribute> {
        self.attributes
            .get(symbol)
            .and_then(|attrs| attrs.iter().find(|a| a.name == name))
    }
}

fn parse_source(source: &RuleSource) -> GrammarResult<ParsedRule> {
    match source {
        RuleSource::Text(text) => parse_rule(text).map_err(|error| match error {
            RuleError::RuleTooLong { length, limit } => {
                GrammarError::limit_exceeded("rule text length", limit, length)
            }
            other => GrammarError::rule_syntax(text, &other),
        }),
        RuleSource::Parsed(rule) => Ok(rule.clone()),
    }
}

fn find_completeness_gaps(
    productions: &[Production],
    attributes: &BTreeMap<String, Vec<Attribute>>,
) -> Vec<CompletenessGap> {
    let attrs_of = |symbol: &str| attributes.get(symbol).map(Vec::as_slice).unwrap_or(&[]);
    let mut gaps = Vec::new();

    for production in productions {
        let assigned: HashSet<(Slot, &str)> = production
            .rules
            .iter()
            .map(|rule| (rule.target, rule.attribute.as_str()))
            .collect();

        let mut missing = Vec::new();
        for attr in attrs_of(&production.head) {
            if attr.kind == AttrKind::Synthesized && !assigned.contains(&(Slot::Head, attr.name.as_str())) {
                missing.push(format!("{}.{}", production.slot_label(Slot::Head), attr.name));
            }
        }
        for (position, symbol) in production.body.iter().enumerate() {
            let slot = Slot::Child(position);
            for attr in attrs_of(symbol) {
                if attr.kind == AttrKind::Inherited && !assigned.contains(&(slot, attr.name.as_str())) {
                    missing.push(format!("{}.{}", production.slot_label(slot), attr.name));
                }
            }
        }

        if !missing.is_empty() {
            gaps.push(CompletenessGap {
                production: production.id,
                missing,
            });
        }
    }

    gaps
}

fn report_gaps(
    gaps: &[CompletenessGap],
    productions: &[Production],
    preferences: &GrammarPreferences,
) -> GrammarResult<()> {
    for gap in gaps {
        let signature = productions
            .get(gap.production.0)
            .map(Production::signature)
            .unwrap_or_default();
        let missing = gap.missing.join(", ");

        if preferences.require_complete_definitions {
            return Err(GrammarError::malformed(
                GrammarIssue::IncompleteDefinition,
                format!("Production '{}' never assigns {}", signature, missing),
            ));
        }

        log_warning!(
            code = codes::warnings::INCOMPLETE_PRODUCTION,
            "Production leaves attributes undefined",
            "production" => &signature,
            "missing" => &missing
        );
    }
    Ok(())
}
