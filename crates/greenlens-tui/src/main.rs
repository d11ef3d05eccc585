//! Green Lens - a terminal client for the Green Lens plant marketplace.
//!
//! With no arguments this launches the TUI. `status`, `login` and `logout`
//! run the same session flow headlessly and print the result.

mod app;
mod forms;
mod ui;

use std::io::{self, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use greenlens_core::api::AuthOutcome;
use greenlens_core::storage::{Backend, TokenBackend, TokenStore};
use greenlens_core::utils::mask;
use greenlens_core::{AuthClient, Config, SessionGate, SessionState};

use app::{App, AppState};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Log file written by the TUI, inside the cache directory
const LOG_FILE: &str = "greenlens.log";

const USAGE: &str = "\
Usage: greenlens [--ephemeral] [COMMAND]

Commands:
  status          Show whether a session is stored
  login [EMAIL]   Sign in from the terminal
  logout          Remove the stored session

Options:
  --ephemeral     Keep tokens in memory only
  -h, --help      Print this help";

// ============================================================================
// Command Line
// ============================================================================

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Tui,
    Status,
    Login(Option<String>),
    Logout,
    Help,
}

#[derive(Debug, PartialEq, Eq)]
struct Args {
    command: Command,
    ephemeral: bool,
}

fn parse_args(args: &[String]) -> Result<Args> {
    let ephemeral = args.iter().any(|a| a == "--ephemeral");
    let mut rest = args.iter().filter(|a| a.as_str() != "--ephemeral");

    let command = match rest.next().map(String::as_str) {
        None => Command::Tui,
        Some("status") => Command::Status,
        Some("login") => Command::Login(rest.next().cloned()),
        Some("logout") => Command::Logout,
        Some("-h") | Some("--help") | Some("help") => Command::Help,
        Some(other) => anyhow::bail!("Unknown command '{}'\n\n{}", other, USAGE),
    };

    if let Some(extra) = rest.next() {
        anyhow::bail!("Unexpected argument '{}'\n\n{}", extra, USAGE);
    }

    Ok(Args { command, ephemeral })
}

// ============================================================================
// Logging
// ============================================================================

enum LogTarget {
    Stderr,
    File,
}

/// Initialize the tracing subscriber for logging.
///
/// Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug). The TUI
/// logs to a file so output never lands on the alternate screen; the returned
/// guard flushes it on drop.
fn init_tracing(target: LogTarget) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    match target {
        LogTarget::Stderr => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(io::stderr))
                .with(filter)
                .init();
            None
        }
        LogTarget::File => {
            let dir = match Config::cache_dir() {
                Ok(dir) if std::fs::create_dir_all(&dir).is_ok() => dir,
                _ => {
                    tracing_subscriber::registry().with(filter).init();
                    return None;
                }
            };
            let appender = tracing_appender::rolling::never(dir, LOG_FILE);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .with(filter)
                .init();
            Some(guard)
        }
    }
}

// ============================================================================
// Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let raw: Vec<String> = std::env::args().skip(1).collect();
    let args = parse_args(&raw)?;

    if args.command == Command::Help {
        println!("{}", USAGE);
        return Ok(());
    }

    let _guard = init_tracing(if args.command == Command::Tui {
        LogTarget::File
    } else {
        LogTarget::Stderr
    });

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            warn!(error = %e, "Failed to load config, using defaults");
            Config::default()
        }
    };

    let backend = if args.ephemeral {
        Backend::Memory
    } else {
        config.token_backend()
    };
    let store = TokenBackend::open(backend).context("Failed to open token storage")?;
    let client = AuthClient::new(&config.api_base_url()).context("Failed to create HTTP client")?;

    match args.command {
        Command::Tui => run_tui(config, store, client).await,
        Command::Status => status(store).await,
        Command::Login(email) => login(config, store, client, email).await,
        Command::Logout => logout(store).await,
        Command::Help => Ok(()),
    }
}

async fn run_tui(config: Config, store: TokenBackend, client: AuthClient) -> Result<()> {
    info!(base_url = client.base_url(), "Green Lens starting");

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config, store, client);

    // Draw the loading screen, then resolve the session
    let result = match terminal.draw(|f| render(f, &app)) {
        Ok(_) => match app.boot().await {
            Ok(()) => run_app(&mut terminal, &mut app).await,
            Err(e) => Err(e),
        },
        Err(e) => Err(e.into()),
    };

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    info!("Green Lens shutting down");
    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        // Draw UI
        terminal.draw(|f| render(f, app))?;

        // Poll for events with timeout to allow background updates
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    // Ctrl+C to quit
                    if key.code == KeyCode::Char('c')
                        && key.modifiers.contains(KeyModifiers::CONTROL)
                    {
                        return Ok(());
                    }

                    // Handle input
                    if handle_input(app, key).await? {
                        return Ok(());
                    }
                }
            }
        }

        // Check for completed background tasks
        app.check_background_tasks().await;

        // Check if we should quit
        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}

// ============================================================================
// Headless Commands
// ============================================================================

/// Print whether a session is stored
async fn status(store: TokenBackend) -> Result<()> {
    let kind = store.kind();
    match store.load_tokens().await.context("Failed to read stored session")? {
        Some(tokens) => {
            println!("Signed in ({:?} storage)", kind);
            println!("Access token: {}", mask(&tokens.access_token));
        }
        None => println!("Signed out ({:?} storage)", kind),
    }
    Ok(())
}

/// Sign in from the terminal and persist the session
async fn login(
    mut config: Config,
    store: TokenBackend,
    client: AuthClient,
    email: Option<String>,
) -> Result<()> {
    let ephemeral = store.kind() == Backend::Memory;
    let mut gate = SessionGate::new(store);
    if gate.restore().await.context("Failed to read stored session")? == SessionState::Authenticated {
        println!("Already signed in. Run `greenlens logout` first to switch accounts.");
        return Ok(());
    }

    let email = match email {
        Some(email) => email,
        None => prompt_email(config.last_email.as_deref())?,
    };
    let password = rpassword::prompt_password("Password: ")?;

    eprintln!("Signing in to {}...", client.base_url());

    let success = match client.login(&email, &password).await {
        AuthOutcome::Success(success) => success,
        other => {
            let message = other
                .failure_message("Login failed")
                .unwrap_or_else(|| "Login failed".to_string());
            anyhow::bail!(message);
        }
    };

    gate.mark_logged_in(&success.tokens)
        .await
        .context("Failed to save session")?;

    config.last_email = Some(email.trim().to_string());
    if !ephemeral {
        if let Err(e) = config.save() {
            warn!(error = %e, "Failed to save config");
        }
    }

    println!("Signed in as {}", success.user.display_name());
    Ok(())
}

fn prompt_email(last: Option<&str>) -> Result<String> {
    match last {
        Some(last) => print!("Email [{}]: ", last),
        None => print!("Email: "),
    }
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim();

    Ok(match (input.is_empty(), last) {
        (true, Some(last)) => last.to_string(),
        _ => input.to_string(),
    })
}

/// Remove the stored session
async fn logout(store: TokenBackend) -> Result<()> {
    let mut gate = SessionGate::new(store);
    gate.restore().await.context("Failed to read stored session")?;
    gate.mark_logged_out().await?;
    println!("Signed out");
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
