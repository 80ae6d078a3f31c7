//! reportgen CLI - turn an abstract into a report skeleton
//!
//! Usage: reportgen-cli [OPTIONS] <COMMAND>
//!
//! Reads the abstract from a file or stdin. Supports JSON output for scripting.

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use reportgen_lib::sinks::{DirectorySink, SystemClipboard};
use reportgen_lib::workflow::{self, ReportView};
use reportgen_lib::{draft_report, settings, split_sentences, ReportError, SECTIONS};
use std::io::Read as _;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[path = "cli/tui.rs"]
mod tui;

// ============================================================================
// Main CLI Structure
// ============================================================================

#[derive(Parser)]
#[command(name = "reportgen-cli")]
#[command(version, about = "Turn an abstract into a report skeleton", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON for scripting
    #[arg(long, global = true)]
    json: bool,

    /// Suppress status output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Detailed logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a report from an abstract
    Generate {
        /// Abstract file (stdin when omitted or "-")
        input: Option<PathBuf>,
        /// Copy the report to the clipboard
        #[arg(long)]
        copy: bool,
        /// Save the report as a Markdown file
        #[arg(long)]
        download: bool,
        /// Directory for --download (default: configured output-dir)
        #[arg(long)]
        out_dir: Option<PathBuf>,
        /// File name for --download (default: configured download-filename)
        #[arg(long)]
        filename: Option<String>,
    },
    /// Show how an abstract splits into sentences
    Split {
        /// Abstract file (stdin when omitted or "-")
        input: Option<PathBuf>,
    },
    /// List the report sections and their fallback sentences
    Sections,
    /// Interactive report form
    Tui,
    /// Settings
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// List all settings
    List,
    /// Get a setting value
    Get {
        /// Setting key
        key: String,
    },
    /// Set a setting value (empty string resets to default)
    Set {
        /// Setting key
        key: String,
        /// Setting value
        value: String,
    },
}

fn main() {
    // Exit cleanly on broken pipe (e.g. `reportgen-cli generate a.txt | head`)
    #[cfg(unix)]
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_IGN);
    }
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        if info.to_string().contains("Broken pipe") {
            std::process::exit(0);
        }
        default_hook(info);
    }));

    let cli = Cli::parse();

    // The form owns the terminal, so it gets no log output
    if !matches!(cli.command, Commands::Tui) {
        init_logging(cli.verbose);
    }

    if let Err(e) = run_cli(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Log to stderr, filtered by REPORTGEN_LOG
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("REPORTGEN_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run_cli(cli: Cli) -> Result<(), String> {
    settings::init(settings::default_app_data_dir());

    match cli.command {
        Commands::Generate { input, copy, download, out_dir, filename } => {
            handle_generate(input.as_deref(), copy, download, out_dir, filename, cli.json, cli.quiet)
        }
        Commands::Split { input } => handle_split(input.as_deref(), cli.json),
        Commands::Sections => handle_sections(cli.json),
        Commands::Tui => tui::run_tui(),
        Commands::Config { cmd } => handle_config(cmd, cli.json),
        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "reportgen-cli", &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Read the abstract from a file, or stdin for None / "-"
fn read_input(path: Option<&Path>) -> Result<String, String> {
    match path {
        Some(p) if p != Path::new("-") => std::fs::read_to_string(p)
            .map_err(|e| format!("Failed to read {}: {}", p.display(), e)),
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| format!("Failed to read stdin: {}", e))?;
            Ok(buf)
        }
    }
}

fn handle_generate(
    input: Option<&Path>,
    copy: bool,
    download: bool,
    out_dir: Option<PathBuf>,
    filename: Option<String>,
    json: bool,
    quiet: bool,
) -> Result<(), String> {
    let text = read_input(input)?;
    let mut view = ReportView::new(settings::copy_status_duration());

    match workflow::generate(text.as_str(), &mut view) {
        Ok(report) => {
            if json {
                let draft = draft_report(&text);
                let out = serde_json::to_string_pretty(&draft)
                    .map_err(|e| format!("Failed to serialize report: {}", e))?;
                println!("{}", out);
            } else {
                println!("{}", report);
            }
        }
        Err(ReportError::EmptyInput) => return Err(view.hint().to_string()),
        Err(e) => return Err(e.to_string()),
    }

    if copy {
        let mut clipboard = SystemClipboard::new();
        let now = Instant::now();
        match workflow::copy(&mut view, &mut clipboard, now) {
            Ok(_) => {
                if !quiet {
                    eprintln!("{}", view.copy_label(now));
                }
            }
            // Not fatal: the report is already on stdout
            Err(e) => eprintln!("{}: {}", view.copy_label(now), e),
        }
    }

    if download {
        let dir = out_dir.unwrap_or_else(settings::output_dir);
        let filename = filename.unwrap_or_else(settings::download_filename);
        let mut sink = DirectorySink::new(dir);
        if let Some(path) = workflow::download(&view, &mut sink, &filename).map_err(|e| e.to_string())? {
            if !quiet {
                eprintln!("Saved to {}", path.display());
            }
        }
    }

    Ok(())
}

fn handle_split(input: Option<&Path>, json: bool) -> Result<(), String> {
    let text = read_input(input)?;
    let sentences = split_sentences(&text);

    if json {
        let out = serde_json::to_string_pretty(&sentences)
            .map_err(|e| format!("Failed to serialize sentences: {}", e))?;
        println!("{}", out);
    } else {
        for (i, sentence) in sentences.iter().enumerate() {
            let section = SECTIONS.get(i).map(|s| s.label).unwrap_or("-");
            println!("{:>3}  {}  {}", i + 1, section, sentence);
        }
    }
    Ok(())
}

fn handle_sections(json: bool) -> Result<(), String> {
    if json {
        let out = serde_json::to_string_pretty(&SECTIONS)
            .map_err(|e| format!("Failed to serialize sections: {}", e))?;
        println!("{}", out);
    } else {
        for (i, section) in SECTIONS.iter().enumerate() {
            println!("{}. {} ({:<10}) {}", i + 1, section.label, section.name, section.fallback);
        }
    }
    Ok(())
}

fn handle_config(cmd: ConfigCommands, json: bool) -> Result<(), String> {
    match cmd {
        ConfigCommands::List => {
            let current = settings::current();
            if json {
                let out = serde_json::to_string_pretty(&current)
                    .map_err(|e| format!("Failed to serialize settings: {}", e))?;
                println!("{}", out);
            } else {
                for key in settings::KEYS {
                    let value = current.get(key).map_err(|e| e.to_string())?;
                    println!("{:<18} {}", format!("{}:", key), value);
                }
            }
        }
        ConfigCommands::Get { key } => {
            let value = settings::current().get(&key).map_err(|e| e.to_string())?;
            if json {
                println!("{}", serde_json::json!({ key: value }));
            } else {
                println!("{}", value);
            }
        }
        ConfigCommands::Set { key, value } => {
            settings::set_value(&key, &value).map_err(|e| e.to_string())?;
            println!("{} updated", key);
        }
    }
    Ok(())
}
