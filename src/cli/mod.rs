//! CLI module for routescope.
//!
//! Commands:
//! - scan: parse source roots and print every resolved endpoint
//! - resolve: run resolution on parsed-file JSON from another front end
//! - chain: show one class's superclass chain
//! - classes: list indexed classes

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::RouteConfig;
use crate::diagnostics::Diagnostics;
use crate::engine::{is_controller, resolve_endpoints};
use crate::hierarchy::{ChainEnd, HierarchyLinker};
use crate::report::Report;
use crate::scanner::scan_roots;
use crate::symbols::{ParsedFile, SymbolTable};

/// Exit code for `--strict` runs that produced warnings.
pub const EXIT_WARNINGS: i32 = 2;

#[derive(Parser)]
#[command(name = "routescope")]
#[command(about = "Resolve HTTP endpoints across controller class hierarchies", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file (default: <first root>/.routescope/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan source roots and print resolved endpoints
    Scan {
        /// Source root directories
        #[arg(required = true)]
        roots: Vec<PathBuf>,

        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Exit with status 2 when any warning was reported
        #[arg(long)]
        strict: bool,
    },

    /// Resolve endpoints from a JSON array of parsed files
    Resolve {
        /// Path to the parsed-file JSON
        file: PathBuf,

        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Exit with status 2 when any warning was reported
        #[arg(long)]
        strict: bool,
    },

    /// Show the superclass chain of a class
    Chain {
        /// Simple or qualified class name
        class: String,

        /// Source root directories
        #[arg(required = true)]
        roots: Vec<PathBuf>,
    },

    /// List indexed classes
    Classes {
        /// Source root directories
        #[arg(required = true)]
        roots: Vec<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Yaml,
}

/// Tracing filter directive for a `-v` count.
pub fn log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

/// Execute a command, printing to stdout. Returns the process exit code.
pub fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Scan {
            roots,
            format,
            strict,
        } => {
            let config = load_config(cli.config.as_deref(), &roots)?;
            let output = scan_roots(&roots, &config)?;
            let report = resolve_endpoints(output.files, &config.resolve);
            print!("{}", render(&report, format)?);
            Ok(exit_code(&report, strict))
        }

        Commands::Resolve {
            file,
            format,
            strict,
        } => {
            let config = match cli.config.as_deref() {
                Some(path) => RouteConfig::try_load(path)?,
                None => RouteConfig::default(),
            };
            let files = read_parsed_files(&file)?;
            let report = resolve_endpoints(files, &config.resolve);
            print!("{}", render(&report, format)?);
            Ok(exit_code(&report, strict))
        }

        Commands::Chain { class, roots } => {
            let config = load_config(cli.config.as_deref(), &roots)?;
            let table = build_table(&roots, &config)?;
            print!("{}", describe_chain(&table, &config, &class)?);
            Ok(0)
        }

        Commands::Classes { roots } => {
            let config = load_config(cli.config.as_deref(), &roots)?;
            let table = build_table(&roots, &config)?;
            print!("{}", list_classes(&table, &config));
            Ok(0)
        }
    }
}

/// Explicit `--config` must load; the default location is optional.
fn load_config(explicit: Option<&Path>, roots: &[PathBuf]) -> Result<RouteConfig> {
    if let Some(path) = explicit {
        return Ok(RouteConfig::try_load(path)?);
    }
    Ok(roots
        .first()
        .map(|root| RouteConfig::load(&RouteConfig::default_path(root)))
        .unwrap_or_default())
}

fn read_parsed_files(path: &Path) -> Result<Vec<ParsedFile>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("{} is not a JSON array of parsed files", path.display()))
}

fn build_table(roots: &[PathBuf], config: &RouteConfig) -> Result<SymbolTable> {
    let output = scan_roots(roots, config)?;
    Ok(SymbolTable::build(output.files, &mut Diagnostics::new()))
}

pub fn render(report: &Report, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Text => report.render_text(),
        OutputFormat::Json => report.to_json()? + "\n",
        OutputFormat::Yaml => report.to_yaml()?,
    })
}

pub fn exit_code(report: &Report, strict: bool) -> i32 {
    if strict && report.has_warnings() {
        EXIT_WARNINGS
    } else {
        0
    }
}

/// Chain of `class`, child first, one class per line.
pub fn describe_chain(table: &SymbolTable, config: &RouteConfig, class: &str) -> Result<String> {
    let id = table
        .find(class)
        .with_context(|| format!("class {} not found", class))?;

    let mut diagnostics = Diagnostics::new();
    let chain = HierarchyLinker::new(table, &config.resolve).link(id, &mut diagnostics);

    let mut out = String::new();
    for (depth, &link) in chain.links().iter().enumerate() {
        let record = table.get(link);
        let prefix = record
            .prefix
            .as_ref()
            .map(|p| format!(" prefix={}", p.path.as_deref().unwrap_or("\"\"")))
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "{}{} [{}:{}]{}",
            "  ".repeat(depth),
            record.qualified_name(),
            record.file.display(),
            record.line_start,
            prefix
        );
    }

    let end = match chain.end() {
        ChainEnd::Root => "root".to_string(),
        ChainEnd::Unresolved {
            reference,
            external: true,
        } => format!("external {}", reference),
        ChainEnd::Unresolved {
            reference,
            external: false,
        } => format!("unresolved {}", reference),
        ChainEnd::Cycle { back_to } => format!("cycle back to {}", back_to),
    };
    let _ = writeln!(out, "end: {}", end);
    for diagnostic in diagnostics.iter() {
        let _ = writeln!(out, "  {}", diagnostic);
    }
    Ok(out)
}

/// Every indexed class with its superclass, flagging controllers and
/// ambiguous names.
pub fn list_classes(table: &SymbolTable, config: &RouteConfig) -> String {
    let mut out = String::new();
    for id in table.ids() {
        let class = table.get(id);
        let mut flags = Vec::new();
        if is_controller(class, &config.resolve) {
            flags.push("controller");
        }
        if class.is_abstract {
            flags.push("abstract");
        }
        if table.is_ambiguous(&class.name) {
            flags.push("ambiguous");
        }

        let _ = write!(out, "{}", class.qualified_name());
        if let Some(superclass) = &class.superclass {
            let _ = write!(out, " extends {}", superclass);
        }
        if !flags.is_empty() {
            let _ = write!(out, " [{}]", flags.join(", "));
        }
        let _ = writeln!(out, " ({}:{})", class.file.display(), class.line_start);
    }
    let _ = writeln!(out, "\n{} classes", table.len());
    out
}
