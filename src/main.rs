//! sbom-analyzer: SBOM dependency-graph, quality and verification tool
//!
//! Reads SPDX, `CycloneDX` and SWID documents into one model and reports on
//! their dependency structure, completeness and correctness.

use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use sbom_analyzer::{
    cli::{
        self, exit_codes, AnalyzeFormat, AnalyzeOptions, PackageOptions, TreeOptions,
        VerifyFormat, VerifyOptions, ViewFormat,
    },
    config::{self, AppConfig, ConfigPreset, Validatable},
};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Build long version string with format support info
const fn build_long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        "\n\nSupported SBOM Formats:",
        "\n  SPDX:      2.x (JSON, tag-value)",
        "\n  CycloneDX: 1.x (JSON, XML)",
        "\n  SWID:      ISO/IEC 19770-2 (XML, JSON)",
        "\n\nOutput Formats:",
        "\n  text, json, markdown, sarif"
    )
}

#[derive(Parser)]
#[command(name = "sbom-analyzer")]
#[command(version, long_version = build_long_version())]
#[command(about = "SBOM dependency-graph, quality and verification tool", long_about = None)]
#[command(after_help = "EXIT CODES:
    0  Success
    1  Verification found issues / score below --min-score
    2  Package not found
    3  Error occurred

ENVIRONMENT:
    SBOM_FUZZY_THRESHOLD  Same as --fuzzy-threshold
    SBOM_MAX_NODES        Same as --max-nodes
    RUST_LOG              Log filter (overrides --verbose/--quiet)

EXAMPLES:
    sbom-analyzer analyze bom.cdx.json --min-score 70
    sbom-analyzer verify app.spdx.json -o sarif -O verify.sarif
    sbom-analyzer dep bom.cdx.json --max-depth 3
    sbom-analyzer check-pkg bom.cdx.json flask")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Flags accepted by every subcommand
#[derive(clap::Args)]
struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Disable colored output (also respects `NO_COLOR` env)
    #[arg(long, global = true)]
    no_color: bool,

    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Configuration preset (default, strict, lenient); replaces any config file
    #[arg(long, global = true)]
    preset: Option<String>,

    /// Minimum similarity (0.0-1.0) for fuzzy package matches
    #[arg(long, global = true, env = "SBOM_FUZZY_THRESHOLD")]
    fuzzy_threshold: Option<f64>,

    /// Maximum number of graph nodes before the build is refused
    #[arg(long, global = true, env = "SBOM_MAX_NODES")]
    max_nodes: Option<usize>,
}

// ============================================================================
// Command argument structs
// ============================================================================

/// Arguments for the `analyze` subcommand
#[derive(Parser)]
struct AnalyzeArgs {
    /// Path to the SBOM
    sbom: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = AnalyzeFormat::Text)]
    output: AnalyzeFormat,

    /// Output file path (stdout if not specified)
    #[arg(short = 'O', long)]
    output_file: Option<PathBuf>,

    /// Exit with code 1 if the completeness score is below this value
    #[arg(long)]
    min_score: Option<f64>,
}

/// Arguments for the `verify` subcommand
#[derive(Parser)]
struct VerifyArgs {
    /// Path to the SBOM
    sbom: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = VerifyFormat::Text)]
    output: VerifyFormat,

    /// Output file path (stdout if not specified)
    #[arg(short = 'O', long)]
    output_file: Option<PathBuf>,
}

/// Arguments for the `dep` subcommand
#[derive(Parser)]
struct DepArgs {
    /// Path to the SBOM
    sbom: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = ViewFormat::Text)]
    output: ViewFormat,

    /// Output file path (stdout if not specified)
    #[arg(short = 'O', long)]
    output_file: Option<PathBuf>,

    /// Deepest level to draw
    #[arg(long)]
    max_depth: Option<usize>,
}

/// Arguments shared by `check-pkg`, `search` and `list`
#[derive(Parser)]
struct PackageArgs {
    /// Path to the SBOM
    sbom: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = ViewFormat::Text)]
    output: ViewFormat,

    /// Output file path (stdout if not specified)
    #[arg(short = 'O', long)]
    output_file: Option<PathBuf>,
}

impl From<PackageArgs> for PackageOptions {
    fn from(args: PackageArgs) -> Self {
        Self {
            sbom_path: args.sbom,
            format: args.output,
            output_file: args.output_file,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Statistics, completeness score and recommendations
    Analyze(AnalyzeArgs),

    /// Run the verification checklist
    Verify(VerifyArgs),

    /// Show the dependency tree
    Dep(DepArgs),

    /// Look up a package by name (exact, then fuzzy)
    CheckPkg {
        #[command(flatten)]
        args: PackageArgs,

        /// Package name
        name: String,
    },

    /// Search package names and descriptions
    Search {
        #[command(flatten)]
        args: PackageArgs,

        /// Case-insensitive search term
        term: String,
    },

    /// List every package
    List(PackageArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Show, discover, or initialize configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Sub-subcommands for the `config` command
#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Print config file search paths and the discovered file
    Path,
    /// Generate an example .sbom-analyzer.yaml in the current directory
    Init,
    /// Print the JSON Schema of the config file format
    Schema {
        /// Write schema to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn init_logging(flags: &GlobalArgs) {
    let level = if flags.verbose {
        "debug"
    } else if flags.quiet {
        "warn"
    } else {
        "info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr)
                .with_ansi(cli::should_use_color(flags.no_color)),
        )
        .init();
}

/// Defaults or preset, then config file, then flags (or their env variables)
fn resolve_config(flags: &GlobalArgs) -> Result<AppConfig> {
    let mut config = match &flags.preset {
        Some(name) => {
            let Some(preset) = ConfigPreset::from_name(name) else {
                let valid: Vec<_> = ConfigPreset::all().iter().map(ConfigPreset::name).collect();
                bail!("Unknown preset: {name}. Valid options: {}", valid.join(", "));
            };
            tracing::debug!(preset = %preset, "Using configuration preset");
            AppConfig::from_preset(preset)
        }
        None => {
            let (config, loaded_from) = config::load_or_default(flags.config.as_deref());
            if let Some(path) = loaded_from {
                tracing::debug!(path = %path.display(), "Loaded configuration file");
            }
            config
        }
    };

    if let Some(threshold) = flags.fuzzy_threshold {
        config.lookup.fuzzy_threshold = threshold;
    }
    if let Some(max_nodes) = flags.max_nodes {
        config.graph.max_nodes = max_nodes;
    }

    config.ensure_valid()?;
    Ok(config)
}

fn run(cli: Cli) -> Result<i32> {
    let Cli {
        global: flags,
        command,
    } = cli;
    let color = cli::should_use_color(flags.no_color);

    match command {
        Commands::Analyze(args) => cli::run_analyze(
            AnalyzeOptions {
                sbom_path: args.sbom,
                format: args.output,
                output_file: args.output_file,
                min_score: args.min_score,
                color,
            },
            &resolve_config(&flags)?,
        ),

        Commands::Verify(args) => cli::run_verify(
            VerifyOptions {
                sbom_path: args.sbom,
                format: args.output,
                output_file: args.output_file,
                color,
            },
            &resolve_config(&flags)?,
        ),

        Commands::Dep(args) => cli::run_tree(
            TreeOptions {
                sbom_path: args.sbom,
                format: args.output,
                output_file: args.output_file,
                max_depth: args.max_depth,
            },
            &resolve_config(&flags)?,
        ),

        Commands::CheckPkg { args, name } => {
            cli::run_check_package(args.into(), &name, &resolve_config(&flags)?)
        }

        Commands::Search { args, term } => {
            cli::run_search(args.into(), &term, &resolve_config(&flags)?)
        }

        Commands::List(args) => cli::run_list(args.into(), &resolve_config(&flags)?),

        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "sbom-analyzer", &mut io::stdout());
            Ok(exit_codes::SUCCESS)
        }

        Commands::Config { action } => run_config(action, &flags),
    }
}

fn run_config(action: ConfigAction, flags: &GlobalArgs) -> Result<i32> {
    match action {
        ConfigAction::Show => {
            let config = resolve_config(flags)?;
            let yaml = serde_yaml::to_string(&config).context("failed to serialize config")?;
            print!("{yaml}");
        }
        ConfigAction::Path => {
            let search_paths: [Option<String>; 3] = [
                std::env::current_dir()
                    .ok()
                    .map(|p| p.display().to_string()),
                ::dirs::config_dir().map(|p| p.join("sbom-analyzer").display().to_string()),
                ::dirs::home_dir().map(|p| p.display().to_string()),
            ];
            eprintln!("Config file search paths (in order, git root after the current directory):");
            for path in search_paths.into_iter().flatten() {
                eprintln!("  {path}");
            }
            eprintln!();
            eprintln!("Recognized file names:");
            for name in config::CONFIG_FILE_NAMES {
                eprintln!("  {name}");
            }
            eprintln!();
            match config::discover_config_file(flags.config.as_deref()) {
                Some(path) => eprintln!("Active config file: {}", path.display()),
                None => eprintln!("No config file found."),
            }
        }
        ConfigAction::Init => {
            let target = std::env::current_dir()
                .context("cannot determine current directory")?
                .join(".sbom-analyzer.yaml");
            if target.exists() {
                bail!(
                    "{} already exists. Remove it first to re-initialize.",
                    target.display()
                );
            }
            std::fs::write(&target, config::generate_full_example_config())
                .with_context(|| format!("failed to write {}", target.display()))?;
            eprintln!("Created {}", target.display());
        }
        ConfigAction::Schema { output } => {
            let schema = config::generate_json_schema();
            match output {
                Some(path) => {
                    std::fs::write(&path, &schema)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    eprintln!("Schema written to {}", path.display());
                }
                None => println!("{schema}"),
            }
        }
    }
    Ok(exit_codes::SUCCESS)
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli.global);

    let code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            exit_codes::ERROR
        }
    };
    std::process::exit(code);
}
