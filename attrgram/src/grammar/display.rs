//! Diagnostic listing of a grammar

use super::model::{AttributeGrammar, Production};
use std::fmt;

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  {}", self.signature())?;
        for rule in &self.rules {
            writeln!(f, "    {{{}}}", rule.text())?;
        }
        Ok(())
    }
}

impl fmt::Display for AttributeGrammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Grammar: {}", self.name())?;
        writeln!(f, "Nonterminals: {}", self.nonterminals().join(", "))?;
        writeln!(f, "Terminals: {}", self.terminals().join(", "))?;
        writeln!(f, "Start symbol: {}", self.start_symbol())?;

        writeln!(f, "Attributes:")?;
        for nonterminal in self.nonterminals() {
            let attributes = self.attributes_of(nonterminal);
            if attributes.is_empty() {
                continue;
            }
            let listed: Vec<String> = attributes
                .iter()
                .map(|a| format!("{}: {} ({})", a.name, a.ty, a.kind))
                .collect();
            writeln!(f, "  {}: {}", nonterminal, listed.join(", "))?;
        }

        writeln!(f, "Productions:")?;
        for production in self.productions() {
            write!(f, "{}", production)?;
        }
        Ok(())
    }
}
