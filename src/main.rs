use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "repcoach")]
#[command(
    version,
    about = "AI coaching feedback for sales and support conversations"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long)]
    verbose: bool,

    #[arg(long, short)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a conversation transcript and render coaching feedback
    Analyze {
        #[arg(help = "Transcript file (speaker: text lines)")]
        transcript: PathBuf,
        #[arg(long, help = "Scenario context YAML file")]
        scenario: Option<PathBuf>,
        #[arg(long, help = "Thread ID for conversation memory")]
        thread_id: Option<String>,
        #[arg(long, help = "Resource ID owning the thread (default: cli)")]
        resource_id: Option<String>,
        #[arg(long, help = "Model override")]
        model: Option<String>,
        #[arg(long, help = "Emit the parsed report as JSON")]
        json: bool,
        #[arg(long, short, help = "Write the combined raw report to a file")]
        output: Option<PathBuf>,
    },

    /// Extract the rating table from a saved report
    Scores {
        #[arg(help = "Report file to scan")]
        file: PathBuf,
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            help = "Output format: text, json"
        )]
        format: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show {
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            help = "Output format: text, json"
        )]
        format: String,
    },
    /// Show configuration file paths
    Path,
    /// Initialize configuration
    Init {
        #[arg(long, short, help = "Initialize global config")]
        global: bool,
        #[arg(long, help = "Overwrite existing config")]
        force: bool,
    },
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        // Extract panic message
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        // Log the panic
        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mrepcoach encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }

        eprintln!();

        // Call default hook for backtrace (if RUST_BACKTRACE=1)
        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    // Install panic handler first
    setup_panic_handler();

    // Run the actual CLI
    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Analyze {
            transcript,
            scenario,
            thread_id,
            resource_id,
            model,
            json,
            output,
        } => {
            use repcoach::cli::commands::analyze::AnalyzeOptions;

            repcoach::cli::commands::analyze::run(AnalyzeOptions {
                transcript,
                scenario,
                thread_id,
                resource_id,
                model,
                json,
                output,
            })?;
        }
        Commands::Scores { file, format } => {
            repcoach::cli::commands::scores::run(&file, &format)?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { format } => {
                repcoach::cli::commands::config::show(&format)?;
            }
            ConfigAction::Path => {
                repcoach::cli::commands::config::path()?;
            }
            ConfigAction::Init { global, force } => {
                if global {
                    repcoach::cli::commands::config::init_global(force)?;
                } else {
                    repcoach::cli::commands::config::init_project(force)?;
                }
            }
        },
    }

    Ok(())
}
