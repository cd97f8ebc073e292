//! pkb CLI - personal knowledge base in PostgreSQL
//!
//! Stores titled text entries with free-form tags and a type label, and
//! retrieves them by tag, type, substring search, or exact title.
//!
//! Connection settings come from `user`, `password`, `host`, `port`, `dbname`
//! (environment or `.env`, see [`pkb_core::config`]).

use std::io::IsTerminal;
use std::process::ExitCode;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use pkb_core::config::{load_dotenv, ENV_TEMPLATE};
use tracing::debug;

mod commands;
mod output;
mod tracing_setup;
mod ui;

use output::{OutputFormat, Renderer};
use tracing_setup::TracingConfig;

#[derive(Parser, Debug)]
#[command(
    name = "pkb",
    author,
    version,
    about = "Personal knowledge base: tagged text entries in PostgreSQL",
    long_about = "Capture notes, ideas, and snippets as tagged entries in a PostgreSQL \
                  database, then list them by tag or type, search them by substring, \
                  or show one by title."
)]
struct Cli {
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    /// Enable debug logging (RUST_LOG overrides)
    #[arg(long, global = true)]
    debug: bool,

    /// Suppress the connection spinner
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create tables and indexes (safe to re-run)
    InitDb,
    /// Verify database connectivity
    CheckDb,
    /// Add an entry with optional tags and type
    AddEntry(commands::entries::AddEntryArgs),
    /// List entries, most recent first
    ListEntries(commands::entries::ListEntriesArgs),
    /// Search titles and content for a substring
    Search(commands::entries::SearchArgs),
    /// Show the entry with an exact title
    Show(commands::entries::ShowArgs),
    /// List tags with usage counts
    ListTags(commands::tags::ListTagsArgs),
    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}

#[derive(Parser, Debug)]
struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    shell: Shell,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Before parsing, so .env can supply PKB_AUTHOR
    let loaded = load_dotenv();
    let cli = Cli::parse();

    tracing_setup::init(&TracingConfig { debug: cli.debug }).ok();
    ui::init_quiet_mode(cli.quiet);
    debug!(files = ?loaded, "loaded .env files");

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) if output::is_broken_pipe(&err) => ExitCode::SUCCESS,
        Err(err) => report(&err),
    }
}

async fn run(cli: Cli) -> Result<()> {
    let color = cli.format == OutputFormat::Text && std::io::stdout().is_terminal();
    let renderer = Renderer::new(cli.format, color);

    match cli.command {
        Commands::InitDb => commands::run_init_db(renderer).await,
        Commands::CheckDb => commands::run_check_db(renderer).await,
        Commands::AddEntry(args) => commands::run_add_entry(args, renderer).await,
        Commands::ListEntries(args) => commands::run_list_entries(args, renderer).await,
        Commands::Search(args) => commands::run_search(args, renderer).await,
        Commands::Show(args) => commands::run_show(args, renderer).await,
        Commands::ListTags(args) => commands::run_list_tags(args, renderer).await,
        Commands::Completions(args) => run_completions(args),
    }
}

fn run_completions(args: CompletionsArgs) -> Result<()> {
    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    let mut script = Vec::new();
    generate(args.shell, &mut cmd, bin_name, &mut script);
    output::write_out(&mut std::io::stdout().lock(), &script)?;
    Ok(())
}

/// First [`pkb_core::Error`] in the chain, if any.
fn core_error(err: &anyhow::Error) -> Option<&pkb_core::Error> {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<pkb_core::Error>())
}

/// Exit code of the underlying core error; anything else exits with 1.
fn exit_code(err: &anyhow::Error) -> u8 {
    core_error(err).map_or(1, pkb_core::Error::exit_code)
}

/// Print the failure to stderr and map it to a process exit code.
fn report(err: &anyhow::Error) -> ExitCode {
    eprintln!("Error: {err:#}");

    if let Some(pkb_core::Error::Config(_)) = core_error(err) {
        eprintln!();
        eprintln!("Set the variables in the environment, ./.env, or ~/.pkb/.env:");
        eprintln!();
        eprintln!("{ENV_TEMPLATE}");
    }

    ExitCode::from(exit_code(err))
}
