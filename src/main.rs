// Defensive programming lints - prevent panics and unsafe patterns
#![deny(clippy::indexing_slicing)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::fallible_impl_from)]
#![warn(clippy::wildcard_enum_match_arm)]
#![warn(clippy::fn_params_excessive_bools)]
// Idiomatic Rust lints
#![warn(clippy::needless_return)]
#![warn(clippy::let_and_return)]
#![warn(clippy::must_use_candidate)]
#![warn(clippy::redundant_closure_for_method_calls)]
#![warn(clippy::map_unwrap_or)]
#![warn(clippy::explicit_iter_loop)]
// Test code may index and unwrap freely
#![cfg_attr(test, allow(clippy::indexing_slicing, clippy::unwrap_used))]

mod agents;
mod app;
mod cases;
mod config;
mod error;
mod services;
mod session;
mod ui;

use agents::{AnalysisOptions, GeminiClient};
use app::{App, AppMode, Focus, Navigable};
use cases::{CaseStore, ingest_batch, ingest_file};
use color_eyre::{Result, eyre::eyre};
use config::Config;
use crossterm::{
    event::{
        self, DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste,
        EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::{Backend, CrosstermBackend},
};
use services::MicrophoneRecorder;
use session::{SessionController, TurnOutcome};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter
const LOG_ENV: &str = "CASELENS_LOG";

fn main() -> Result<()> {
    // Setup error handling
    color_eyre::install()?;

    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 {
        return handle_cli_args(&args);
    }

    // Missing credentials stop us before the terminal is touched
    let config = Config::load()?;
    let api_key = config.api_key()?;
    init_file_logging()?;
    let backend = GeminiClient::new(&api_key, &config.gemini, &config.models)?;
    info!(version = env!("CARGO_PKG_VERSION"), "starting interactive session");

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableBracketedPaste
    )?;
    let backend_term = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend_term)?;

    let recorder = MicrophoneRecorder::new(config.voice.max_seconds);
    let mut app = App::new(Arc::new(backend), Box::new(recorder));
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!(error = %err, "interactive session ended with an error");
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// The terminal UI owns stdout, so logs go to a file in the data dir
fn init_file_logging() -> Result<()> {
    let log_path = Config::log_path()?;
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(io::stderr)
        .init();
}

fn handle_cli_args(args: &[String]) -> Result<()> {
    let cmd = args
        .get(1)
        .ok_or_else(|| eyre!("No command provided"))?;
    let program_name = args.first().map_or("caselens", String::as_str);
    let rest = args.get(2..).unwrap_or_default();

    match cmd.as_str() {
        "--help" | "-h" | "help" => print_help(program_name),
        "--version" | "-v" => println!("CaseLens v{}", env!("CARGO_PKG_VERSION")),
        "ask" => {
            let (options, prompt, files) = parse_ask_args(rest)?;
            let client = cli_client()?;
            run_ask(&client, options, &prompt, &files)?;
        }
        "transcribe" => {
            let path = rest
                .first()
                .ok_or_else(|| eyre!("Usage: {program_name} transcribe <audio-file>"))?;
            let client = cli_client()?;
            run_transcribe(&client, Path::new(path))?;
        }
        cmd_str => {
            eprintln!("Unknown command: {}", cmd_str);
            eprintln!("Run with --help for available commands.");
            std::process::exit(1);
        }
    }
    Ok(())
}

fn cli_client() -> Result<GeminiClient> {
    let config = Config::load()?;
    let api_key = config.api_key()?;
    init_stderr_logging();
    Ok(GeminiClient::new(&api_key, &config.gemini, &config.models)?)
}

/// `ask [--think] <prompt> [file...]`
fn parse_ask_args(args: &[String]) -> Result<(AnalysisOptions, String, Vec<PathBuf>)> {
    let mut options = AnalysisOptions::default();
    let mut positional = args.iter().peekable();
    if positional.peek().is_some_and(|arg| arg.as_str() == "--think") {
        options.extended_reasoning = true;
        positional.next();
    }
    let prompt = positional
        .next()
        .ok_or_else(|| eyre!("Usage: caselens ask [--think] <prompt> [file...]"))?
        .clone();
    let files = positional.map(PathBuf::from).collect();
    Ok((options, prompt, files))
}

/// Runs one turn against a fresh in-memory case, echoing fragments as they arrive
fn run_ask(
    client: &GeminiClient,
    options: AnalysisOptions,
    prompt: &str,
    files: &[PathBuf],
) -> Result<()> {
    let mut store = CaseStore::new();
    let case_id = store.create();
    let attachments = ingest_batch(files, store.previews())?;
    store.add_files(&case_id, attachments);

    let mut session = SessionController::new(case_id);
    let mut stdout = io::stdout();
    let outcome = session.submit(&mut store, prompt, client, options, |fragment| {
        let _ = write!(stdout, "{fragment}");
        let _ = stdout.flush();
    });
    println!();

    match outcome {
        TurnOutcome::Completed => Ok(()),
        TurnOutcome::Skipped => Err(eyre!("Prompt is empty")),
        TurnOutcome::Failed(error) => Err(error.into()),
    }
}

fn run_transcribe(client: &GeminiClient, path: &Path) -> Result<()> {
    let store = CaseStore::new();
    let audio = ingest_file(path, store.previews())?;
    let transcript = services::voice::transcribe_recording(client, &audio)?;
    println!("{transcript}");
    Ok(())
}

fn print_help(program_name: &str) {
    println!("CaseLens - multimodal document analysis in the terminal");
    println!();
    println!("Usage: {} [command]", program_name);
    println!();
    println!("Commands:");
    println!("  ask [--think] <prompt> [file...]  - Analyze files once and print the answer");
    println!("  transcribe <audio-file>           - Print a transcript of an audio file");
    println!("  --help                            - Show this help");
    println!("  --version                         - Show version");
    println!();
    println!("Run without arguments to start interactive mode.");
    println!("Set GEMINI_API_KEY or gemini.api_key in the config file.");
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        app.check_agent_response();
        app.clear_expired_status_toast();

        terminal.draw(|f| ui::render(f, app))?;

        if app.should_quit {
            break;
        }

        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) => {
                    // Only handle KeyPress events to avoid duplicate handling
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if key.code == KeyCode::Char('c')
                        && key.modifiers.contains(KeyModifiers::CONTROL)
                    {
                        app.should_quit = true;
                        continue;
                    }

                    match app.mode {
                        AppMode::CommandMenu => handle_command_menu(app, key.code),
                        AppMode::Chat => handle_chat_mode(app, key.code, key.modifiers),
                        AppMode::Help => handle_help_mode(app, key.code),
                    }
                }
                Event::Mouse(mouse) => handle_mouse_event(app, mouse.kind),
                Event::Paste(paste) => {
                    if app.mode == AppMode::Chat && app.focus == Focus::Input {
                        app.handle_chat_paste(&paste);
                    }
                }
                Event::FocusGained | Event::FocusLost | Event::Resize(_, _) => {}
            }
        }
    }

    Ok(())
}

fn handle_command_menu(app: &mut App, key_code: KeyCode) {
    match key_code {
        KeyCode::Esc => app.close_menu(),
        KeyCode::Enter => app.execute_selected(),
        KeyCode::Up => app.previous_item(),
        KeyCode::Down => app.next_item(),
        KeyCode::Char(character) => app.add_input_char(character),
        KeyCode::Backspace => app.remove_input_char(),
        KeyCode::Left
        | KeyCode::Right
        | KeyCode::Home
        | KeyCode::End
        | KeyCode::PageUp
        | KeyCode::PageDown
        | KeyCode::Tab
        | KeyCode::BackTab
        | KeyCode::Delete
        | KeyCode::Insert
        | KeyCode::F(_)
        | KeyCode::Null
        | KeyCode::CapsLock
        | KeyCode::ScrollLock
        | KeyCode::NumLock
        | KeyCode::PrintScreen
        | KeyCode::Pause
        | KeyCode::Menu
        | KeyCode::KeypadBegin
        | KeyCode::Media(_)
        | KeyCode::Modifier(_) => {}
    }
}

fn handle_chat_mode(app: &mut App, key_code: KeyCode, modifiers: KeyModifiers) {
    if modifiers.contains(KeyModifiers::CONTROL) {
        match key_code {
            KeyCode::Char('n') => app.create_case(),
            KeyCode::Char('t') => app.toggle_extended_reasoning(),
            KeyCode::Char('r') => app.toggle_recording(),
            KeyCode::Char('d') if app.focus == Focus::Sidebar => app.delete_highlighted_case(),
            KeyCode::Up => app.scroll_chat_up_lines(3),
            KeyCode::Down => app.scroll_chat_down_lines(3),
            _ => {}
        }
        return;
    }

    match app.focus {
        Focus::Sidebar => handle_sidebar_keys(app, key_code),
        Focus::Input => handle_input_keys(app, key_code, modifiers),
    }
}

fn handle_sidebar_keys(app: &mut App, key_code: KeyCode) {
    match key_code {
        KeyCode::Up => app.previous_item(),
        KeyCode::Down => app.next_item(),
        KeyCode::Enter => app.select_highlighted_case(),
        KeyCode::Delete => app.delete_highlighted_case(),
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Esc => app.toggle_focus(),
        KeyCode::Char('/') => app.open_command_menu(),
        KeyCode::PageUp => app.scroll_chat_up_page(),
        KeyCode::PageDown => app.scroll_chat_down_page(),
        KeyCode::Backspace
        | KeyCode::Left
        | KeyCode::Right
        | KeyCode::Home
        | KeyCode::End
        | KeyCode::Insert
        | KeyCode::F(_)
        | KeyCode::Char(_)
        | KeyCode::Null
        | KeyCode::CapsLock
        | KeyCode::ScrollLock
        | KeyCode::NumLock
        | KeyCode::PrintScreen
        | KeyCode::Pause
        | KeyCode::Menu
        | KeyCode::KeypadBegin
        | KeyCode::Media(_)
        | KeyCode::Modifier(_) => {}
    }
}

fn handle_input_keys(app: &mut App, key_code: KeyCode, modifiers: KeyModifiers) {
    match key_code {
        KeyCode::Char('/') if modifiers == KeyModifiers::NONE && app.chat_input.is_empty() => {
            app.open_command_menu();
        }
        KeyCode::Enter => app.send_chat_message(),
        KeyCode::Char(character) => app.add_chat_input_char(character),
        KeyCode::Backspace => app.remove_chat_input_char(),
        KeyCode::Delete => app.chat_input.delete_char(),
        KeyCode::Left => app.chat_input.move_left(),
        KeyCode::Right => app.chat_input.move_right(),
        KeyCode::Home => app.chat_input.move_to_start(),
        KeyCode::End => app.chat_input.move_to_end(),
        KeyCode::Up => app.scroll_chat_up_lines(3),
        KeyCode::Down => app.scroll_chat_down_lines(3),
        KeyCode::PageUp => app.scroll_chat_up_page(),
        KeyCode::PageDown => app.scroll_chat_down_page(),
        KeyCode::Tab | KeyCode::BackTab => app.toggle_focus(),
        KeyCode::Esc => app.chat_input.clear(),
        KeyCode::Insert
        | KeyCode::F(_)
        | KeyCode::Null
        | KeyCode::CapsLock
        | KeyCode::ScrollLock
        | KeyCode::NumLock
        | KeyCode::PrintScreen
        | KeyCode::Pause
        | KeyCode::Menu
        | KeyCode::KeypadBegin
        | KeyCode::Media(_)
        | KeyCode::Modifier(_) => {}
    }
}

fn handle_help_mode(app: &mut App, key_code: KeyCode) {
    match key_code {
        KeyCode::Esc | KeyCode::Char('q') => app.close_help(),
        KeyCode::Enter
        | KeyCode::Backspace
        | KeyCode::Up
        | KeyCode::Down
        | KeyCode::Left
        | KeyCode::Right
        | KeyCode::Home
        | KeyCode::End
        | KeyCode::PageUp
        | KeyCode::PageDown
        | KeyCode::Tab
        | KeyCode::BackTab
        | KeyCode::Delete
        | KeyCode::Insert
        | KeyCode::F(_)
        | KeyCode::Char(_)
        | KeyCode::Null
        | KeyCode::CapsLock
        | KeyCode::ScrollLock
        | KeyCode::NumLock
        | KeyCode::PrintScreen
        | KeyCode::Pause
        | KeyCode::Menu
        | KeyCode::KeypadBegin
        | KeyCode::Media(_)
        | KeyCode::Modifier(_) => {}
    }
}

fn handle_mouse_event(app: &mut App, kind: MouseEventKind) {
    if app.mode != AppMode::Chat {
        return;
    }
    match kind {
        MouseEventKind::ScrollUp => app.scroll_chat_up_lines(3),
        MouseEventKind::ScrollDown => app.scroll_chat_down_lines(3),
        MouseEventKind::ScrollLeft
        | MouseEventKind::ScrollRight
        | MouseEventKind::Down(_)
        | MouseEventKind::Up(_)
        | MouseEventKind::Drag(_)
        | MouseEventKind::Moved => {}
    }
}
