//! Reading grammar and tree documents from disk

use attrgram::grammar::GrammarDefinition;
use attrgram::logging::codes;
use attrgram::logging::Code;
use attrgram::sql::trees::{self, Statement};
use attrgram::ParseNode;
use std::fmt;
use std::path::Path;

#[derive(Debug)]
pub struct InputError {
    pub code: Code,
    pub message: String,
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for InputError {}

impl InputError {
    fn read(path: &Path, err: std::io::Error) -> Self {
        Self {
            code: codes::input::READ_FAILURE,
            message: format!("Cannot read '{}': {}", path.display(), err),
        }
    }

    fn decode(path: &Path, err: impl fmt::Display) -> Self {
        Self {
            code: codes::input::DECODE_FAILURE,
            message: format!("Cannot decode '{}': {}", path.display(), err),
        }
    }
}

fn read_to_string(path: &Path) -> Result<String, InputError> {
    std::fs::read_to_string(path).map_err(|e| InputError::read(path, e))
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Grammar definitions are TOML unless the file ends in `.json`
pub fn load_grammar(path: &Path) -> Result<GrammarDefinition, InputError> {
    let content = read_to_string(path)?;

    if is_json(path) {
        serde_json::from_str(&content).map_err(|e| InputError::decode(path, e))
    } else {
        toml::from_str(&content).map_err(|e| InputError::decode(path, e))
    }
}

/// A tree document is either a parse tree or a list of tokenised SQL
/// statements, which is assembled into a `Program` tree.
pub fn load_tree(path: &Path) -> Result<ParseNode, InputError> {
    let content = read_to_string(path)?;

    if let Ok(statements) = serde_json::from_str::<Vec<Statement>>(&content) {
        return trees::program(&statements).map_err(|e| InputError::decode(path, e));
    }

    serde_json::from_str(&content).map_err(|e| InputError::decode(path, e))
}
