//! bindport: translate foreign AST dumps into Python binding stubs.

mod config;

use anyhow::Context;
use bindport_syntax::{detect_translator, translator_for_grammar, translators};
use clap::{Parser, Subcommand};
use config::BindportConfig;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bindport")]
#[command(version)]
#[command(about = "Translate C and TypeScript declaration ASTs into Python binding stubs")]
struct Cli {
    /// Config file path (default: ./bindport.toml if present)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate a JSON AST dump into a Python module
    Translate {
        /// Source grammar (detected from the AST root when omitted)
        #[arg(short, long)]
        grammar: Option<String>,

        /// JSON AST produced by the front end, or `-` for stdin
        input: PathBuf,

        /// Output file (stdout when omitted)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// List the available grammars
    Grammars,
}

/// Install the stderr subscriber.
///
/// The config filter wins over `RUST_LOG`, which wins over `-v`.
fn init_tracing(verbose: u8, configured: Option<&str>) {
    let fallback = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = match configured {
        Some(directives) => EnvFilter::builder().parse_lossy(directives),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_input(path: &Path) -> anyhow::Result<serde_json::Value> {
    let content = if path == Path::new("-") {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .context("failed to read stdin")?;
        content
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?
    };
    serde_json::from_str(&content)
        .with_context(|| format!("{} is not a JSON document", path.display()))
}

/// Translate one dump. The output file is only written on success.
fn translate(
    config: &BindportConfig,
    grammar: Option<&str>,
    input: &Path,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let root = read_input(input)?;
    let translator = match grammar {
        Some(name) => {
            translator_for_grammar(name).with_context(|| format!("unknown grammar `{name}`"))?
        }
        None => detect_translator(&root)
            .context("cannot detect the grammar of this AST; pass --grammar")?,
    };
    tracing::debug!(grammar = translator.grammar(), input = %input.display(), "translating");

    let translation = translator
        .translate(&root, &config.options())
        .with_context(|| format!("failed to translate {}", input.display()))?;
    if !translation.diagnostics.is_empty() {
        tracing::warn!(
            count = translation.diagnostics.len(),
            "some declarations were skipped or degraded"
        );
    }

    match output {
        Some(path) => std::fs::write(path, &translation.text)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => print!("{}", translation.text),
    }
    Ok(())
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir().context("failed to resolve the working directory")?;
    let config = BindportConfig::load(cli.config.as_deref(), &cwd)?;
    init_tracing(cli.verbose, config.log.filter.as_deref());

    match cli.command {
        Commands::Translate {
            grammar,
            input,
            output,
        } => translate(&config, grammar.as_deref(), &input, output.as_deref()),
        Commands::Grammars => {
            for translator in translators() {
                println!("{}", translator.grammar());
            }
            Ok(())
        }
    }
}

fn main() {
    if let Err(e) = run(Cli::parse()) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
