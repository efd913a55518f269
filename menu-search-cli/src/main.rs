use std::io;
use std::path::PathBuf;

use clap::{CommandFactory, Parser};
use is_terminal::IsTerminal;

use menu_search::config::LogLevel;
use menu_search_cli::commands::Commands;
use menu_search_cli::context::CliContext;
use menu_search_cli::handlers::*;
use menu_search_cli::output::output_error_json;

#[derive(Parser)]
#[command(name = "menu-search")]
#[command(about = "Adaptive search over the academic menu catalogue", long_about = None)]
#[command(version = menu_search::VERSION)]
struct Cli {
    /// Custom data directory for the catalogue and weights files
    #[arg(long, short, global = true)]
    data_dir: Option<String>,

    /// Configuration file (toml, yaml or json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format (table, json) - use json for tool integration
    #[arg(long, short, default_value = "table", global = true)]
    output: String,

    /// Use machine-readable output (alias for --output json)
    #[arg(long, global = true)]
    machine: bool,

    /// Verbose output (debug level logging)
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Quiet mode (only errors are logged)
    #[arg(long, short, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    let cli_args = Cli::parse();

    // Priority: machine flag > env var > cli arg
    let output_format = if cli_args.machine {
        "json".to_string()
    } else if let Ok(env_output) = std::env::var("MENU_SEARCH_OUTPUT") {
        env_output
    } else {
        cli_args.output.clone()
    };

    if output_format == "json" || !io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    if let Err(e) = run(cli_args, &output_format).await {
        output_error_json(&e, &output_format);
        std::process::exit(1);
    }
}

async fn run(cli_args: Cli, output_format: &str) -> menu_search::Result<()> {
    match cli_args.command {
        Commands::Version => {
            if output_format == "json" {
                println!("{{\"version\": \"{}\"}}", menu_search::VERSION);
            } else {
                println!("menu-search v{}", menu_search::VERSION);
            }
            return Ok(());
        }
        Commands::Completions(args) => {
            let mut cmd = Cli::command();
            clap_complete::generate(args.shell, &mut cmd, "menu-search", &mut io::stdout());
            return Ok(());
        }
        _ => {}
    }

    let ctx = CliContext::new(cli_args.data_dir, cli_args.config.as_deref()).await?;

    let is_quiet = cli_args.quiet
        || std::env::var("MENU_SEARCH_QUIET")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

    // JSON output implies quiet so stdout stays parseable
    let mut logging = ctx.config.logging.clone();
    logging.level = if is_quiet || output_format == "json" {
        LogLevel::Error
    } else if cli_args.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Warn
    };
    let _log_guard = menu_search::logging::init(&logging)?;

    match cli_args.command {
        Commands::Search(args) => handle_search(args, &ctx, output_format).await,
        Commands::Phrase(args) => handle_phrase(args, &ctx, output_format).await,
        Commands::Feedback(args) => handle_feedback(args, &ctx, output_format).await,
        Commands::Categories(args) => handle_categories(args, &ctx, output_format).await,
        Commands::Weights(args) => handle_weights(args, &ctx, output_format).await,
        Commands::Menu(cmd) => handle_menu_command(cmd, &ctx, output_format).await,
        Commands::Seed(args) => handle_seed(args, &ctx, output_format).await,
        Commands::Version | Commands::Completions(_) => Ok(()),
    }
}
