//! Countdown Timer CLI - a task-driven countdown for the terminal
//!
//! Pick a task, start the countdown, and get:
//! - a beep for each of the last ten seconds
//! - an alarm when time is up
//! - the task marked completed automatically

use std::path::PathBuf;

use anyhow::Result;
use clap::{CommandFactory, Parser};

use countdown::cli::{Cli, Commands, DaemonArgs, Display, IpcClient, TaskCommands};
use countdown::config::{self, AppConfig};
use countdown::daemon;

/// Main entry point
#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    let is_daemon = matches!(cli.command, Some(Commands::Daemon(_)));
    init_tracing(cli.verbose, is_daemon);

    // Execute command
    if let Err(e) = execute(cli).await {
        Display::show_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber for logging.
///
/// `RUST_LOG` wins; otherwise `debug` with `--verbose`, `info` for the
/// daemon and `warn` for everything else.
fn init_tracing(verbose: bool, is_daemon: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_log_level(verbose, is_daemon)));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

/// Returns the log level used when `RUST_LOG` is not set.
fn default_log_level(verbose: bool, is_daemon: bool) -> &'static str {
    match (verbose, is_daemon) {
        (true, _) => "debug",
        (false, true) => "info",
        (false, false) => "warn",
    }
}

/// Executes the CLI command.
async fn execute(cli: Cli) -> Result<()> {
    if cli.verbose {
        tracing::debug!("Verbose mode enabled");
    }

    let Some(command) = cli.command else {
        // No command provided, show help
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Daemon(args) => run_daemon(args, cli.socket).await,
        Commands::Completions { shell } => {
            generate_completions(shell);
            Ok(())
        }
        Commands::Start => {
            let response = IpcClient::new(cli.socket)?.start().await?;
            Display::show_countdown_result(&response);
            Ok(())
        }
        Commands::Pause => {
            let response = IpcClient::new(cli.socket)?.pause().await?;
            Display::show_countdown_result(&response);
            Ok(())
        }
        Commands::Reset => {
            let response = IpcClient::new(cli.socket)?.reset().await?;
            Display::show_countdown_result(&response);
            Ok(())
        }
        Commands::SetTime { minutes } => {
            let response = IpcClient::new(cli.socket)?.set_time(minutes).await?;
            Display::show_countdown_result(&response);
            Ok(())
        }
        Commands::CloseAlert => {
            let response = IpcClient::new(cli.socket)?.close_alert().await?;
            Display::show_countdown_result(&response);
            Ok(())
        }
        Commands::Status => {
            let response = IpcClient::new(cli.socket)?.status().await?;
            Display::show_status(&response);
            Ok(())
        }
        Commands::Task { command } => execute_task(command, IpcClient::new(cli.socket)?).await,
    }
}

/// Executes a task subcommand.
async fn execute_task(command: TaskCommands, client: IpcClient) -> Result<()> {
    let response = match command {
        TaskCommands::Add(args) => client.add_task(&args).await?,
        TaskCommands::List => {
            let response = client.list_tasks().await?;
            Display::show_task_list(&response);
            return Ok(());
        }
        TaskCommands::Select { id } => client.select_task(&id).await?,
        TaskCommands::Remove { id } => client.remove_task(&id).await?,
        TaskCommands::Complete => client.complete_task().await?,
        TaskCommands::ClearCompleted => client.clear_completed().await?,
    };
    Display::show_success(&response);
    Ok(())
}

/// Loads the config and runs the daemon in the foreground.
async fn run_daemon(args: DaemonArgs, socket: Option<PathBuf>) -> Result<()> {
    let config_path = match args.config {
        Some(path) => path,
        None => config::default_config_path()?,
    };
    let mut config = AppConfig::load(&config_path)?;
    if socket.is_some() {
        config.socket_path = socket;
    }

    daemon::run(config, args.no_sound).await
}

/// Generates shell completion scripts.
fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}

// ============================================================================
// Tests
// ============================================================================
