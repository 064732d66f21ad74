use std::path::PathBuf;
use std::sync::{Arc, mpsc as std_mpsc};
use std::thread;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use rustyline::Editor;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use tokio::sync::mpsc;

use devcmd_core::settings::MemorySettingsStore;
use devcmd_core::speech::SpeechCapability;
use devcmd_core::{BackendApi, SessionController, SessionEvent, SessionRuntime, SettingsStore};
use devcmd_infrastructure::{ConfigService, DevcmdPaths, FileSettingsStore, HttpBackend};

mod commands;
mod helper;
mod logging;
mod renderer;
mod views;

use commands::Command;
use helper::CliHelper;
use renderer::TerminalRenderer;

const PROMPT: &str = ">> ";

#[derive(Parser, Debug)]
#[command(name = "devcmd")]
#[command(about = "Terminal client for the developer command assistant", long_about = None)]
struct Cli {
    /// Backend base URL, overriding the config file
    #[arg(long)]
    backend_url: Option<String>,

    /// Configuration directory (defaults to the platform config dir)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `devcmd_core=trace`
    #[arg(long)]
    log_level: Option<String>,
}

/// What the readline thread hands back to the event loop.
enum Input {
    Line(String),
    Interrupted,
    Eof,
    Failed(String),
}

/// Runs rustyline on its own thread. Each message on `prompts` asks for one
/// line, optionally pre-filled.
fn spawn_reader(
    helper: CliHelper,
    prompts: std_mpsc::Receiver<Option<String>>,
    lines: mpsc::UnboundedSender<Input>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let mut rl = match Editor::<CliHelper, DefaultHistory>::new() {
            Ok(rl) => rl,
            Err(err) => {
                let _ = lines.send(Input::Failed(err.to_string()));
                return;
            }
        };
        rl.set_helper(Some(helper));

        while let Ok(initial) = prompts.recv() {
            let readline = match initial {
                Some(text) => rl.readline_with_initial(PROMPT, (&text, "")),
                None => rl.readline(PROMPT),
            };

            let input = match readline {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        let _ = rl.add_history_entry(line.as_str());
                    }
                    Input::Line(line)
                }
                Err(ReadlineError::Interrupted) => Input::Interrupted,
                Err(ReadlineError::Eof) => Input::Eof,
                Err(err) => Input::Failed(err.to_string()),
            };

            if lines.send(input).is_err() {
                break;
            }
        }
    })
}

fn open_settings_store(paths: &DevcmdPaths) -> Arc<dyn SettingsStore> {
    match FileSettingsStore::new_default(paths) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::warn!("[Main] Settings will not persist: {}", e);
            Arc::new(MemorySettingsStore::new())
        }
    }
}

/// Handles one line. Returns `false` when the session should end.
fn handle_line(runtime: &mut SessionRuntime, line: &str) -> bool {
    match commands::parse(line) {
        Command::Quit => {
            println!("{}", "Goodbye!".bright_green());
            return false;
        }
        Command::Show(view) => {
            for line in views::render(view, runtime.controller()) {
                println!("{}", line);
            }
        }
        Command::Dispatch(event) => runtime.dispatch(event),
        Command::Voice => {
            if runtime.controller().speech().is_enabled() {
                runtime.dispatch(SessionEvent::ToggleSpeech);
            } else {
                println!(
                    "{}",
                    "Voice input is not available in this terminal.".yellow()
                );
            }
        }
        Command::Usage(usage) => println!("{}", format!("Usage: {}", usage).yellow()),
        Command::Unknown(name) => println!(
            "{}",
            format!("Unknown command {}. Type /help for a list.", name).bright_black()
        ),
    }
    true
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = DevcmdPaths::new(cli.config);
    let _log_guard = logging::init(&paths, cli.log_level.as_deref())?;

    let mut config = ConfigService::load(&paths.config_file()?);
    if let Some(url) = cli.backend_url {
        config.backend_url = url;
    }
    tracing::info!("[Main] Using backend at {}", config.backend_url);

    let backend: Arc<dyn BackendApi> = Arc::new(HttpBackend::new(
        config.backend_url.clone(),
        config.request_timeout(),
    )?);

    println!("{}", "=== devcmd ===".bright_magenta().bold());
    println!(
        "{}",
        "Describe what you want to do, '/help' for commands, or 'quit' to exit.".bright_black()
    );
    println!();

    // Speech needs a platform recognizer; the terminal has none.
    let controller = SessionController::new(
        config.session_config(),
        open_settings_store(&paths),
        SpeechCapability::Unavailable,
        Box::new(TerminalRenderer::stdout()),
    );
    let mut runtime = SessionRuntime::new(controller, backend);
    runtime.dispatch(SessionEvent::Startup);

    let (prompt_tx, prompt_rx) = std_mpsc::channel::<Option<String>>();
    let (input_tx, mut input_rx) = mpsc::unbounded_channel::<Input>();
    let reader = spawn_reader(CliHelper::new(&config), prompt_rx, input_tx);
    let _ = prompt_tx.send(None);

    loop {
        tokio::select! {
            input = input_rx.recv() => {
                let Some(input) = input else { break };
                let keep_going = match input {
                    Input::Line(line) => handle_line(&mut runtime, &line),
                    Input::Interrupted => {
                        println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
                        true
                    }
                    Input::Eof => {
                        println!("{}", "CTRL-D detected. Exiting...".bright_green());
                        false
                    }
                    Input::Failed(err) => {
                        eprintln!("{}", format!("Error: {}", err).red());
                        false
                    }
                };
                if !keep_going || prompt_tx.send(runtime.take_pending_input()).is_err() {
                    break;
                }
            }
            _ = runtime.process_next() => {}
        }
    }

    // Closing the prompt channel ends the reader thread.
    drop(prompt_tx);
    let _ = reader.join();

    Ok(())
}
