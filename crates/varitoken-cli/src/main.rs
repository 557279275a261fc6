//! Varitoken CLI
//!
//! Converts a design tool's variables export (CSV) into one design-token
//! document per mode:
//! - `convert`: build every mode and write `<slug>.tokens.json` files
//! - `check`: build and report problems without writing anything

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use varitoken_tree::document::MANIFEST_FILE;
use varitoken_tree::{convert_csv, BuildReport, Conversion, ConvertConfig, ConvertError, Manifest};

#[derive(Parser)]
#[command(name = "varitoken")]
#[command(
    author,
    version,
    about = "Varitoken: design variables CSV → per-mode design tokens"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an export into one `<mode>.tokens.json` document per mode.
    ///
    /// Every mode is built and rendered before the first file is written, so
    /// a failing run leaves the output directory untouched.
    Convert {
        #[command(flatten)]
        input: InputArgs,
        /// Output directory (default: `tokens`, or `out_dir` from the config)
        #[arg(short, long)]
        out_dir: Option<PathBuf>,
        /// Also write `manifest.json` mapping modes to files
        #[arg(long)]
        manifest: bool,
    },

    /// Build every mode and report problems without writing output.
    Check {
        #[command(flatten)]
        input: InputArgs,
    },
}

#[derive(Args, Debug, Clone)]
struct InputArgs {
    /// Variables export (CSV)
    input: PathBuf,
    /// JSON config file (see `ConvertConfig`)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Kebab-case token names (`Beaver Orange` → `beaver-orange`)
    #[arg(long)]
    kebab_names: bool,
    /// Fail on any dropped row, unresolved alias or path conflict
    #[arg(long)]
    strict: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Convert {
            input,
            out_dir,
            manifest,
        } => cmd_convert(&input, out_dir, manifest),
        Commands::Check { input } => cmd_check(&input),
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(args: &InputArgs) -> Result<ConvertConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            ConvertConfig::from_json_str(&text)
                .with_context(|| format!("Invalid config {}", path.display()))?
        }
        None => ConvertConfig::default(),
    };
    config.kebab_names |= args.kebab_names;
    config.strict |= args.strict;
    Ok(config)
}

fn read_input(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read input {}", path.display()))
}

fn cmd_convert(args: &InputArgs, out_dir: Option<PathBuf>, manifest: bool) -> Result<()> {
    let mut config = load_config(args)?;
    if let Some(dir) = out_dir {
        config.out_dir = dir;
    }

    println!(
        "{} variables {}",
        "Converting".green().bold(),
        args.input.display()
    );

    let text = read_input(&args.input)?;
    let conversion = convert_or_report(&text, &config)?;
    print_report(&conversion.token_set.report);

    fs::create_dir_all(&config.out_dir)
        .with_context(|| format!("Failed to create {}", config.out_dir.display()))?;
    for document in &conversion.documents {
        let path = config.out_dir.join(&document.file_name);
        fs::write(&path, &document.json)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("  {} Wrote {}", "→".cyan(), path.display());
    }

    if manifest {
        let path = config.out_dir.join(MANIFEST_FILE);
        let json = Manifest::from_documents(&conversion.documents).to_json()?;
        fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        println!("  {} Wrote {}", "→".cyan(), path.display());
    }

    tracing::info!(
        out_dir = %config.out_dir.display(),
        documents = conversion.documents.len(),
        "conversion finished"
    );
    Ok(())
}

fn cmd_check(args: &InputArgs) -> Result<()> {
    let config = load_config(args)?;

    println!(
        "{} variables {}",
        "Checking".green().bold(),
        args.input.display()
    );

    let text = read_input(&args.input)?;
    let conversion = convert_or_report(&text, &config)?;
    print_report(&conversion.token_set.report);

    for document in &conversion.documents {
        println!(
            "  {} {} → {}",
            "✓".green(),
            document.mode,
            document.file_name
        );
    }
    Ok(())
}

/// Convert, printing strict-mode diagnostics before failing.
fn convert_or_report(text: &str, config: &ConvertConfig) -> Result<Conversion> {
    match convert_csv(text, config) {
        Ok(conversion) => Ok(conversion),
        Err(ConvertError::Strict { diagnostics }) => {
            for diagnostic in &diagnostics {
                eprintln!("  {} {}", "✗".red(), diagnostic);
            }
            anyhow::bail!(
                "strict mode: {} problem(s) found, no output written",
                diagnostics.len()
            )
        }
        Err(err) => Err(err).context("Conversion failed"),
    }
}

fn print_report(report: &BuildReport) {
    for stats in &report.modes {
        println!(
            "  {} {}: {} tokens, {} aliases ({} resolved)",
            "→".yellow(),
            stats.mode,
            stats.tokens,
            stats.aliases,
            stats.resolved_aliases
        );
    }
    if !report.collections.is_empty() {
        let collections: Vec<String> = report
            .collections
            .iter()
            .map(|(name, rows)| format!("{name} ({rows})"))
            .collect();
        println!("  {} collections: {}", "→".yellow(), collections.join(", "));
    }
    if report.replaced > 0 {
        println!(
            "  {} {} row(s) overwrote an earlier token",
            "→".yellow(),
            report.replaced
        );
    }
    for diagnostic in &report.diagnostics {
        println!("  {} {}", "!".yellow().bold(), diagnostic);
    }
}
