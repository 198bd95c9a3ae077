//! CLI entry point for module assembly.
//!
//! Enumerates the headers of each requested module under a prefix, parses them
//! through one parser session and prints the assembled modules.

use anyhow::{Context, bail};
use clap::{
    Parser, Subcommand, ValueEnum,
    builder::styling::{AnsiColor, Effects, Styles},
};
use cxxbind::{Module, ModuleError, ParserBackend, ParserSession, Settings, discover_headers};
use std::collections::{BTreeSet, HashSet};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

/// Assemble parsed C++ headers into binding modules
#[derive(Parser)]
#[command(
    name = "cxxbind",
    version = env!("CARGO_PKG_VERSION"),
    about = "Assemble C++ headers into ordered, qualified binding modules",
    next_line_help = true,
    styles = clap_cargo_style()
)]
struct Cli {
    /// Path to custom settings.toml file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log progress to stderr (repeat for more detail)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Set up .cxxbind directory with default configuration
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Display active settings
    Config,

    /// Parse and assemble one or more modules
    #[command(after_help = "Examples:\n  cxxbind assemble gp --prefix /opt/occt/inc\n  cxxbind assemble gp Geom --known Standard --json")]
    Assemble {
        /// Module names, e.g. gp Geom TopoDS
        #[arg(required = true)]
        modules: Vec<String>,

        /// Directory holding the headers (overrides config)
        #[arg(short, long)]
        prefix: Option<PathBuf>,

        /// Additional known module names for dependency resolution
        #[arg(short, long)]
        known: Vec<String>,

        /// Header parser backend (overrides config)
        #[arg(long, value_enum)]
        parser: Option<ParserArg>,

        /// Print the assembled modules as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ParserArg {
    TreeSitter,
    Json,
}

impl From<ParserArg> for ParserBackend {
    fn from(arg: ParserArg) -> Self {
        match arg {
            ParserArg::TreeSitter => ParserBackend::TreeSitter,
            ParserArg::Json => ParserBackend::Json,
        }
    }
}

#[derive(Debug)]
struct ModuleSummary<'a> {
    name: &'a str,
    headers: usize,
    classes: Vec<&'a str>,
    class_templates: Vec<&'a str>,
    typedefs: usize,
    enums: usize,
    functions: usize,
    operators: usize,
    dependencies: &'a BTreeSet<String>,
}

impl<'a> ModuleSummary<'a> {
    fn of(module: &'a Module) -> Self {
        Self {
            name: module.name(),
            headers: module.headers().len(),
            classes: module.classes().iter().map(|c| c.name.as_str()).collect(),
            class_templates: module.class_templates().iter().map(|t| t.name()).collect(),
            typedefs: module.typedefs().len(),
            enums: module.enums().len(),
            functions: module.functions().len(),
            operators: module.operators().len(),
            dependencies: module.dependencies(),
        }
    }
}

fn init_tracing(verbose: u8, debug: bool) {
    let default_level = match (verbose, debug) {
        (0, false) => "warn",
        (0, true) | (1, _) => "info",
        (2, _) => "debug",
        _ => "trace",
    };
    // RUST_LOG wins over the flags
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("cxxbind={default_level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        if let Some(module_error) = e.downcast_ref::<ModuleError>() {
            eprintln!("Status: {}", module_error.status_code());
            for suggestion in module_error.recovery_suggestions() {
                eprintln!("  - {suggestion}");
            }
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut settings = match &cli.config {
        Some(path) => Settings::load_from(path)
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("Configuration error loading from {}", path.display()))?,
        None => Settings::load().unwrap_or_else(|e| {
            eprintln!("Configuration error: {e}");
            Settings::default()
        }),
    };

    init_tracing(cli.verbose, settings.debug);

    match cli.command {
        Commands::Init { force } => {
            let path = Settings::init_config_file(force)
                .map_err(|e| anyhow::anyhow!("Could not create configuration file: {e}"))?;
            println!("Created configuration file at: {}", path.display());
            println!("Edit this file to customize your settings.");
            Ok(())
        }
        Commands::Config => {
            println!("Current Configuration:");
            println!("{}", "=".repeat(50));
            println!("{}", toml::to_string_pretty(&settings)?);
            Ok(())
        }
        Commands::Assemble {
            modules,
            prefix,
            known,
            parser,
            json,
        } => {
            if let Some(parser) = parser {
                settings.parser.backend = parser.into();
            }
            let Some(prefix) = prefix.or_else(|| settings.prefix.clone()) else {
                bail!("No header prefix given; pass --prefix or set `prefix` in settings.toml");
            };

            let known_modules: HashSet<String> = settings
                .known_modules
                .iter()
                .chain(&known)
                .chain(&modules)
                .cloned()
                .collect();

            let mut session = ParserSession::open(&settings.parser)?;
            let mut assembled = Vec::with_capacity(modules.len());
            for name in &modules {
                let headers = discover_headers(&prefix, name, &settings.parser)
                    .with_context(|| format!("Failed to list headers under {}", prefix.display()))?;
                if headers.is_empty() {
                    warn!("No headers found for module {name} in {}", prefix.display());
                }

                let module =
                    Module::build(name, &prefix, &headers, &known_modules, &settings, &mut session)?;
                assembled.push(module);
            }
            let parsed = session.close();
            info!("Parsed {parsed} headers for {} modules", assembled.len());

            if json {
                println!("{}", serde_json::to_string_pretty(&assembled)?);
            } else {
                for module in &assembled {
                    print_summary(&ModuleSummary::of(module));
                }
            }
            Ok(())
        }
    }
}

fn print_summary(summary: &ModuleSummary<'_>) {
    println!("Module {} ({} headers)", summary.name, summary.headers);
    println!("  classes ({}): {}", summary.classes.len(), summary.classes.join(", "));
    if !summary.class_templates.is_empty() {
        println!(
            "  class templates ({}): {}",
            summary.class_templates.len(),
            summary.class_templates.join(", ")
        );
    }
    println!(
        "  typedefs: {}, enums: {}, functions: {}, operators: {}",
        summary.typedefs, summary.enums, summary.functions, summary.operators
    );
    let dependencies: Vec<&str> = summary.dependencies.iter().map(String::as_str).collect();
    println!("  depends on: {}", dependencies.join(", "));
}
