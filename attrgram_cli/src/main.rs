//! # attrgram CLI
//!
//! Inspect grammars and evaluate parse trees from the command line.

mod input;

use attrgram::config::runtime::{parse_log_level, EvaluationPreferences, GrammarPreferences, LoggingPreferences};
use attrgram::grammar::AttributeGrammar;
use attrgram::logging::{self, codes, LoggingService};
use attrgram::pipeline::{self, PipelineOutput, PipelineResult};
use attrgram::sql::{self, trees};
use attrgram::{log_error, log_info, log_success};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "attrgram", version, about = "Attribute grammar evaluation engine")]
struct Cli {
    /// Print log events to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Minimum log level (error, warning, info, debug)
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Also append log events to this file
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print a grammar (the built-in SQL CRUD grammar by default)
    Grammar {
        /// Grammar definition in TOML or JSON
        #[arg(long, value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Evaluate a parse tree or a list of SQL statements
    Eval {
        /// JSON parse tree, or a JSON array of statements
        tree: PathBuf,

        /// Evaluate against this grammar instead of the SQL CRUD grammar
        #[arg(long, value_name = "FILE")]
        grammar: Option<PathBuf>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        /// Include the decorated tree in JSON output
        #[arg(long = "tree", requires = "json")]
        tree_output: bool,
    },

    /// Evaluate the built-in demo program
    Demo,

    /// Print pipeline capabilities and logging configuration
    Info,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(&cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = pipeline::validate_pipeline() {
        log_error!(codes::system::INITIALIZATION_FAILURE, &e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    log_info!("attrgram starting", "command" => format!("{:?}", cli.command));

    let outcome = match &cli.command {
        Command::Grammar { file } => print_grammar(file.as_deref()),
        Command::Eval {
            tree,
            grammar,
            json,
            tree_output,
        } => eval_file(tree, grammar.as_deref(), *json, *tree_output),
        Command::Demo => run_demo(),
        Command::Info => {
            print_info();
            Ok(())
        }
    };

    if let Err(e) = outcome {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(cli: &Cli) -> Result<(), String> {
    let mut preferences = LoggingPreferences::default();
    if cli.verbose {
        preferences.enable_console_logging = true;
    }
    if let Some(level) = &cli.log_level {
        preferences.min_log_level =
            parse_log_level(level).ok_or_else(|| format!("Unknown log level '{}'", level))?;
    }
    logging::config::init_runtime_preferences(preferences)?;

    let multi_logger = logging::service::create_configured_multi_logger(cli.log_file.as_deref())
        .map_err(|e| format!("Cannot open log file: {}", e))?;
    let min_level = logging::config::get_min_log_level();
    let service = LoggingService::new(Arc::new(multi_logger), min_level);

    logging::init_global_logging_with_service(Arc::new(service))
}

fn load_grammar(path: &Path) -> Result<AttributeGrammar, Box<dyn std::error::Error>> {
    let definition = input::load_grammar(path).map_err(|e| {
        log_error!(e.code, &e.message, "file" => path.display());
        e
    })?;

    Ok(AttributeGrammar::from_definition_with_preferences(
        &definition,
        &GrammarPreferences::default(),
    )?)
}

fn print_grammar(file: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let grammar = match file {
        Some(path) => load_grammar(path)?,
        None => sql::sql_crud_grammar()?,
    };

    println!("{}", grammar);

    let gaps = grammar.completeness_gaps();
    if !gaps.is_empty() {
        println!("Incomplete productions:");
        for gap in gaps {
            println!("  {}: missing {}", gap.production, gap.missing.join(", "));
        }
    }
    Ok(())
}

fn eval_file(
    tree_path: &Path,
    grammar_path: Option<&Path>,
    json: bool,
    include_tree: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let tree = input::load_tree(tree_path).map_err(|e| {
        log_error!(e.code, &e.message, "file" => tree_path.display());
        e
    })?;

    let grammar = match grammar_path {
        Some(path) => load_grammar(path)?,
        None => sql::sql_crud_grammar()?,
    };

    let result = pipeline::evaluate_program_with_preferences(
        &grammar,
        &tree,
        &EvaluationPreferences::default(),
    )?;

    if json {
        let output = PipelineOutput::new(&result, include_tree);
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_result(tree_path, &result);
    }
    Ok(())
}

fn run_demo() -> Result<(), Box<dyn std::error::Error>> {
    let statements = trees::demo_statements();
    let tree = trees::program(&statements)?;

    log_info!("Evaluating demo program", "statements" => statements.len());
    let result = pipeline::evaluate_sql(&tree)?;

    print_result(Path::new("<demo>"), &result);
    Ok(())
}

fn print_result(source: &Path, result: &PipelineResult) {
    println!("\n=== Evaluation Result ===");
    println!("Source: {}", source.display());
    println!("Nodes:  {}", result.node_count);
    println!("Time:   {:.2?}", result.processing_duration);
    println!("OK:     {}", result.ok);
    println!("\n{}", result.sql);

    if result.ok {
        log_success!(
            codes::success::OPERATION_COMPLETED_SUCCESSFULLY,
            "Program is well formed",
            "source" => source.display()
        );
    } else {
        println!("\nProgram is not well formed (ok = false)");
    }
}

fn print_info() {
    let info = pipeline::get_pipeline_info();
    println!("{}", info.report());
    println!();
    println!("{}", logging::config::get_config_summary());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_eval_flags() {
        let cli = Cli::try_parse_from([
            "attrgram",
            "--log-level",
            "debug",
            "eval",
            "tree.json",
            "--json",
            "--tree",
        ])
        .unwrap();

        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        match cli.command {
            Command::Eval {
                tree,
                grammar,
                json,
                tree_output,
            } => {
                assert_eq!(tree, PathBuf::from("tree.json"));
                assert!(grammar.is_none());
                assert!(json);
                assert!(tree_output);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_tree_output_requires_json() {
        let parsed = Cli::try_parse_from(["attrgram", "eval", "tree.json", "--tree"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["attrgram", "demo", "--verbose"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::Demo));
    }
}
