//! Top-level CLI definition and dispatch.

use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{Shell as CompletionShell, generate};
use colored::control;
use serde_json::{Value, json};
use thiserror::Error;

use ayur_remedy::cli::render;
use ayur_remedy::client::{HttpTransport, RemedyApi};
use ayur_remedy::core::config::Config;
use ayur_remedy::logger::jsonl::JsonlConfig;
use ayur_remedy::logger::{JsonlRequestObserver, MemoryRequestObserver, ObserverSet};
use ayur_remedy::session::suggest::{self, COMMON_SYMPTOMS};
use ayur_remedy::session::{ConnectivityStatus, SessionModel, SessionObserver, SessionRuntime, UiState};

/// Upper bound on waiting for startup calls before the first prompt.
const STARTUP_WAIT: Duration = Duration::from_secs(2);

const RETRY_HINT_ONESHOT: &str = "Run the command again to retry.";
const RETRY_HINT_INTERACTIVE: &str = "Type :retry to clear the error and re-check the connection.";

/// Ayurvedic remedy lookup from free-text symptoms.
#[derive(Debug, Parser)]
#[command(
    name = "ayur",
    author,
    version,
    about = "Ayurvedic remedy lookup from free-text symptoms",
    long_about = None,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Override config file path.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Override the analysis service base URL.
    #[arg(long, global = true, value_name = "URL")]
    api_url: Option<String>,
    /// Force JSON output mode.
    #[arg(long, global = true)]
    json: bool,
    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
    /// Echo API requests and responses to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Check whether the analysis service is reachable.
    Health,
    /// Show vocabulary suggestions for the word being typed.
    Suggest(SuggestArgs),
    /// Analyze symptoms and show matching remedies.
    Analyze(AnalyzeArgs),
    /// Line-oriented session with suggestions and retry.
    Interactive,
    /// View configuration state.
    Config(ConfigArgs),
    /// Generate shell completions.
    Completions(CompletionsArgs),
}

#[derive(Debug, Clone, Args)]
struct SuggestArgs {
    /// Partial symptom text; the last word is matched.
    #[arg(value_name = "TEXT", allow_hyphen_values = true)]
    text: String,
}

#[derive(Debug, Clone, Args)]
struct AnalyzeArgs {
    /// Free-text symptom description. Multiple words are joined with spaces.
    #[arg(value_name = "TEXT", required = true, num_args = 1..)]
    text: Vec<String>,
}

#[derive(Debug, Clone, Args, Default)]
struct ConfigArgs {
    /// Config operation to run.
    #[command(subcommand)]
    command: Option<ConfigCommand>,
}

#[derive(Debug, Clone, Subcommand)]
enum ConfigCommand {
    /// Print resolved config file path.
    Path,
    /// Print effective merged configuration.
    Show,
}

#[derive(Debug, Clone, Args)]
struct CompletionsArgs {
    /// Shell to generate completion script for.
    #[arg(value_enum)]
    shell: CompletionShell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Human,
    Json,
}

/// CLI error type with explicit exit-code mapping.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid user input.
    #[error("{0}")]
    User(String),
    /// Environment or transport failure.
    #[error("{0}")]
    Runtime(String),
    /// Runtime failure whose message was already shown to the user.
    #[error("{0}")]
    Reported(String),
    /// Internal bug or invariant violation.
    #[error("{0}")]
    Internal(String),
    /// JSON serialization failed.
    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
    /// Output write failed.
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

impl CliError {
    /// Process exit code contract for the CLI.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::User(_) => 1,
            Self::Runtime(_) | Self::Reported(_) | Self::Io(_) => 2,
            Self::Internal(_) | Self::Json(_) => 3,
        }
    }

    /// Whether the message is already on screen and needs no trailer.
    pub const fn is_reported(&self) -> bool {
        matches!(self, Self::Reported(_))
    }
}

/// Dispatch CLI commands.
pub fn run(cli: &Cli) -> Result<(), CliError> {
    if cli.no_color {
        control::set_override(false);
    }

    match &cli.command {
        Command::Health => run_health(cli),
        Command::Suggest(args) => run_suggest(cli, args),
        Command::Analyze(args) => run_analyze(cli, args),
        Command::Interactive => run_interactive(cli),
        Command::Config(args) => run_config(cli, args),
        Command::Completions(args) => {
            let mut command = Cli::command();
            let binary_name = command.get_name().to_string();
            generate(args.shell, &mut command, binary_name, &mut io::stdout());
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Shared setup
// ---------------------------------------------------------------------------

/// Resolved config plus the transport built from it.
struct AppContext {
    config: Config,
    mode: OutputMode,
    transport: Arc<HttpTransport>,
    /// Present under `--verbose`; drained to stderr after each step.
    echo: Option<MemoryRequestObserver>,
}

impl AppContext {
    fn echo_requests(&self) {
        if let Some(echo) = &self.echo {
            for event in echo.drain() {
                eprintln!("{}", event.summary());
            }
        }
    }
}

fn load_config(cli: &Cli) -> Result<Config, CliError> {
    let config =
        Config::load(cli.config.as_deref()).map_err(|e| CliError::Runtime(e.to_string()))?;
    match &cli.api_url {
        Some(url) => config
            .with_base_url(url)
            .map_err(|e| CliError::User(e.to_string())),
        None => Ok(config),
    }
}

fn build_context(cli: &Cli) -> Result<AppContext, CliError> {
    let config = load_config(cli)?;

    let mut observers = ObserverSet::new();
    if config.logging.enabled {
        observers = observers.with(Arc::new(JsonlRequestObserver::open(JsonlConfig {
            path: config.logging.jsonl_path.clone(),
            fallback_to_stderr: config.logging.fallback_to_stderr,
        })));
    }
    let echo = cli.verbose.then(MemoryRequestObserver::new);
    if let Some(echo) = &echo {
        observers = observers.with(Arc::new(echo.clone()));
    }

    let mut transport =
        HttpTransport::new(&config.api).map_err(|e| CliError::Internal(e.to_string()))?;
    if !observers.is_empty() {
        transport = transport.with_observer(Arc::new(observers));
    }

    Ok(AppContext {
        config,
        mode: output_mode(cli),
        transport: Arc::new(transport),
        echo,
    })
}

fn connectivity_value(status: ConnectivityStatus) -> Value {
    serde_json::to_value(status).unwrap_or(Value::Null)
}

// ---------------------------------------------------------------------------
// One-shot commands
// ---------------------------------------------------------------------------

fn run_health(cli: &Cli) -> Result<(), CliError> {
    let ctx = build_context(cli)?;
    let outcome = ctx.transport.health_check();
    ctx.echo_requests();

    let status = if outcome.is_ok() {
        ConnectivityStatus::Online
    } else {
        ConnectivityStatus::Offline
    };

    match ctx.mode {
        OutputMode::Human => {
            println!("{}", render::connectivity_badge(status));
            println!("  {}", ctx.transport.base_url());
        }
        OutputMode::Json => {
            let payload = match &outcome {
                Ok(body) => json!({
                    "command": "health",
                    "status": connectivity_value(status),
                    "base_url": ctx.transport.base_url(),
                    "payload": body,
                }),
                Err(err) => json!({
                    "command": "health",
                    "status": connectivity_value(status),
                    "base_url": ctx.transport.base_url(),
                    "error": err.to_string(),
                    "code": err.code(),
                }),
            };
            write_json_line(&payload)?;
        }
    }

    outcome
        .map(|_| ())
        .map_err(|err| CliError::Runtime(err.to_string()))
}

fn run_suggest(cli: &Cli, args: &SuggestArgs) -> Result<(), CliError> {
    let ctx = build_context(cli)?;
    let vocabulary = ctx.transport.fetch_suggestions();
    ctx.echo_requests();
    let matches = suggest::filter(&args.text, &vocabulary);

    match ctx.mode {
        OutputMode::Human => {
            if matches.is_empty() {
                println!("(no suggestions)");
            }
            for entry in &matches {
                println!("{entry}");
            }
        }
        OutputMode::Json => {
            let payload = json!({
                "command": "suggest",
                "input": args.text,
                "token": suggest::last_token(&args.text),
                "vocabulary_size": vocabulary.len(),
                "suggestions": matches,
            });
            write_json_line(&payload)?;
        }
    }
    Ok(())
}

fn run_analyze(cli: &Cli, args: &AnalyzeArgs) -> Result<(), CliError> {
    let text = args.text.join(" ");
    if text.trim().is_empty() {
        return Err(CliError::User("symptom text is empty".to_string()));
    }

    let ctx = build_context(cli)?;
    let mut session = SessionRuntime::new(Arc::clone(&ctx.transport), &ctx.config.session);
    session.initialize();
    session.set_input(&text);
    session.submit_and_wait(&text);
    session.settle();
    ctx.echo_requests();

    let model = session.model();

    match (&model.ui, ctx.mode) {
        (UiState::Success(result), OutputMode::Human) => {
            println!("{}", render::connectivity_badge(model.connectivity));
            if model.over_soft_limit() {
                println!(
                    "  input length {}",
                    render::length_guidance(model.input_len(), model.input_soft_limit)
                );
            }
            println!();
            print!("{}", render::render_result(result));
            Ok(())
        }
        (UiState::Success(result), OutputMode::Json) => {
            let payload = json!({
                "command": "analyze",
                "status": "success",
                "connectivity": connectivity_value(model.connectivity),
                "result": render::result_json(result),
            });
            write_json_line(&payload)?;
            Ok(())
        }
        (UiState::Error(message), OutputMode::Human) => {
            eprintln!("{}", render::render_error(message, RETRY_HINT_ONESHOT));
            Err(CliError::Reported(message.clone()))
        }
        (UiState::Error(message), OutputMode::Json) => {
            let payload = json!({
                "command": "analyze",
                "status": "error",
                "connectivity": connectivity_value(model.connectivity),
                "error": message,
            });
            write_json_line(&payload)?;
            Err(CliError::Runtime(message.clone()))
        }
        (state, _) => Err(CliError::Internal(format!(
            "analysis did not settle (state: {})",
            state.tag()
        ))),
    }
}

fn run_config(cli: &Cli, args: &ConfigArgs) -> Result<(), CliError> {
    match &args.command {
        None | Some(ConfigCommand::Path) => {
            let path = cli.config.clone().unwrap_or_else(Config::default_path);
            let exists = path.exists();

            match output_mode(cli) {
                OutputMode::Human => {
                    println!("{}", path.display());
                    if !exists {
                        println!("  (file does not exist; defaults will be used)");
                    }
                }
                OutputMode::Json => {
                    let payload = json!({
                        "command": "config path",
                        "path": path.to_string_lossy(),
                        "exists": exists,
                    });
                    write_json_line(&payload)?;
                }
            }
            Ok(())
        }
        Some(ConfigCommand::Show) => {
            let config = load_config(cli)?;

            match output_mode(cli) {
                OutputMode::Human => {
                    let toml_str = toml::to_string_pretty(&config)
                        .map_err(|e| CliError::Internal(format!("serialize config: {e}")))?;
                    println!("{toml_str}");
                }
                OutputMode::Json => {
                    let value = serde_json::to_value(&config)?;
                    let payload = json!({
                        "command": "config show",
                        "config": value,
                    });
                    write_json_line(&payload)?;
                }
            }
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Interactive session
// ---------------------------------------------------------------------------

/// One parsed line of interactive input.
#[derive(Debug, Clone, PartialEq, Eq)]
enum LineCommand {
    /// Blank line; ignored.
    Empty,
    /// Plain text: analyze it.
    Submit(String),
    /// `:submit`: analyze the text composed with `:add`.
    SubmitComposed,
    /// `:s [text]`: preview suggestions for `text`, or for the composed input.
    Suggest(String),
    /// `:pick <n>`: accept the n-th suggestion (1-based) for the composed input.
    Pick(usize),
    /// `:add <symptom>`: append to the composed input.
    Add(String),
    Common,
    Clear,
    Retry,
    Status,
    Help,
    Quit,
    Unknown(String),
}

fn parse_line(line: &str) -> LineCommand {
    let trimmed = line.trim_end_matches(['\r', '\n']);
    if trimmed.trim().is_empty() {
        return LineCommand::Empty;
    }
    let Some(rest) = trimmed.trim_start().strip_prefix(':') else {
        return LineCommand::Submit(trimmed.to_string());
    };
    let (name, arg) = rest.split_once(' ').unwrap_or((rest, ""));
    match name {
        "q" | "quit" | "exit" => LineCommand::Quit,
        "s" | "suggest" => LineCommand::Suggest(arg.to_string()),
        "p" | "pick" => match arg.trim().parse::<usize>() {
            Ok(n) if n > 0 => LineCommand::Pick(n),
            _ => LineCommand::Unknown(name.to_string()),
        },
        "a" | "add" if !arg.trim().is_empty() => LineCommand::Add(arg.trim().to_string()),
        "common" => LineCommand::Common,
        "submit" => LineCommand::SubmitComposed,
        "clear" => LineCommand::Clear,
        "r" | "retry" => LineCommand::Retry,
        "status" => LineCommand::Status,
        "h" | "help" => LineCommand::Help,
        _ => LineCommand::Unknown(name.to_string()),
    }
}

/// Prints results when the session's results cue fires.
struct ResultsPrinter {
    mode: OutputMode,
}

impl SessionObserver for ResultsPrinter {
    fn on_results_ready(&mut self, model: &SessionModel) {
        let Some(result) = model.ui.result() else {
            return;
        };
        match self.mode {
            OutputMode::Human => print!("{}", render::render_result(result)),
            OutputMode::Json => {
                let payload = json!({
                    "event": "results",
                    "result": render::result_json(result),
                });
                if let Err(e) = write_json_line(&payload) {
                    eprintln!("ayur: {e}");
                }
            }
        }
        let _ = io::stdout().flush();
    }
}

const INTERACTIVE_HELP: &str = "\
Type symptoms and press Enter to analyze them.
  :s [text]        show suggestions for the last word of <text>
                   (or of the composed input when <text> is omitted)
  :add <symptom>   append a symptom to the composed input
  :pick <n>        complete the composed input's last word with suggestion <n>
  :common          list common symptoms for :add
  :submit          analyze the composed input
  :clear           clear the composed input
  :retry           clear the error and re-check the connection
  :status          show connection and session state
  :quit            leave";

fn run_interactive(cli: &Cli) -> Result<(), CliError> {
    let ctx = build_context(cli)?;
    let mode = ctx.mode;
    let mut session = SessionRuntime::new(Arc::clone(&ctx.transport), &ctx.config.session)
        .with_observer(Box::new(ResultsPrinter { mode }));
    session.initialize();
    session.settle_timeout(STARTUP_WAIT);
    ctx.echo_requests();

    if mode == OutputMode::Human {
        println!("{}", render::connectivity_badge(session.model().connectivity));
        println!("Type :help for commands.");
    } else {
        emit_status(&session, mode)?;
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        if mode == OutputMode::Human {
            print!("ayur> ");
            io::stdout().flush()?;
        }
        let Some(line) = lines.next() else { break };
        let line = line?;
        session.pump();

        match parse_line(&line) {
            LineCommand::Empty => {}
            LineCommand::Quit => break,
            LineCommand::Help => println!("{INTERACTIVE_HELP}"),
            LineCommand::Status => emit_status(&session, mode)?,
            LineCommand::Common => emit_list(mode, "common", COMMON_SYMPTOMS.iter().copied())?,
            LineCommand::Suggest(text) => {
                let matches = preview_suggestions(session.model(), &text);
                emit_list(mode, "suggestions", matches.iter().map(String::as_str))?;
            }
            LineCommand::Pick(n) => match session.suggestions().get(n - 1).cloned() {
                Some(choice) => {
                    session.accept_suggestion(&choice);
                    emit_composed(&session, mode)?;
                }
                None => eprintln!("no suggestion {n} for the composed input (try :s)"),
            },
            LineCommand::Add(symptom) => {
                session.quick_add(&symptom);
                emit_composed(&session, mode)?;
            }
            LineCommand::Clear => {
                session.clear_input();
                emit_composed(&session, mode)?;
            }
            LineCommand::Retry => {
                session.retry();
                session.run_until(|m| m.connectivity != ConnectivityStatus::Checking);
                emit_status(&session, mode)?;
            }
            LineCommand::Submit(text) => {
                session.set_input(&text);
                analyze_interactive(&mut session, mode)?;
            }
            LineCommand::SubmitComposed => analyze_interactive(&mut session, mode)?,
            LineCommand::Unknown(name) => {
                eprintln!("unknown command :{name} (type :help)");
            }
        }
        ctx.echo_requests();
    }
    Ok(())
}

/// Suggestions for `text` without touching the composed input.
fn preview_suggestions(model: &SessionModel, text: &str) -> Vec<String> {
    if text.trim().is_empty() {
        model.suggestions()
    } else {
        suggest::filter(text, &model.vocabulary)
    }
}

/// Analyze the composed input and report the outcome.
fn analyze_interactive<A: RemedyApi + 'static>(
    session: &mut SessionRuntime<A>,
    mode: OutputMode,
) -> Result<(), CliError> {
    if !session.model().can_submit() {
        if session.model().ui.is_loading() {
            eprintln!("an analysis is already running");
        } else {
            eprintln!("nothing to analyze");
        }
        return Ok(());
    }
    let text = session.model().input.clone();
    session.submit(&text);
    session.run_until(|m| !m.ui.is_loading());
    if let UiState::Error(message) = &session.model().ui {
        match mode {
            OutputMode::Human => {
                eprintln!("{}", render::render_error(message, RETRY_HINT_INTERACTIVE));
            }
            OutputMode::Json => {
                write_json_line(&json!({"event": "error", "error": message}))?;
            }
        }
        return Ok(());
    }
    // Results print from the cue observer.
    session.run_until(|m| !m.results_cue_pending);
    Ok(())
}

fn emit_status<A: RemedyApi + 'static>(
    session: &SessionRuntime<A>,
    mode: OutputMode,
) -> Result<(), CliError> {
    let model = session.model();
    match mode {
        OutputMode::Human => {
            println!("{}", render::connectivity_badge(model.connectivity));
            println!(
                "  vocabulary: {}  state: {}",
                if model.vocabulary_loaded {
                    format!("{} terms", model.vocabulary.len())
                } else {
                    "loading".to_string()
                },
                model.ui.tag()
            );
        }
        OutputMode::Json => {
            write_json_line(&json!({
                "event": "status",
                "connectivity": connectivity_value(model.connectivity),
                "vocabulary_loaded": model.vocabulary_loaded,
                "vocabulary_size": model.vocabulary.len(),
                "state": model.ui.tag(),
                "error": model.ui.error(),
            }))?;
        }
    }
    Ok(())
}

fn emit_composed<A: RemedyApi + 'static>(
    session: &SessionRuntime<A>,
    mode: OutputMode,
) -> Result<(), CliError> {
    let model = session.model();
    match mode {
        OutputMode::Human => println!(
            "{}  ({})",
            model.input,
            render::length_guidance(model.input_len(), model.input_soft_limit)
        ),
        OutputMode::Json => write_json_line(&json!({
            "event": "input",
            "input": model.input,
            "length": model.input_len(),
            "soft_limit": model.input_soft_limit,
            "over_limit": model.over_soft_limit(),
        }))?,
    }
    Ok(())
}

fn emit_list<'a>(
    mode: OutputMode,
    event: &str,
    items: impl Iterator<Item = &'a str>,
) -> Result<(), CliError> {
    let items: Vec<&str> = items.collect();
    match mode {
        OutputMode::Human => {
            if items.is_empty() {
                println!("(none)");
            }
            for item in &items {
                println!("  {item}");
            }
        }
        OutputMode::Json => write_json_line(&json!({"event": event, "items": items}))?,
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Output helpers
// ---------------------------------------------------------------------------

fn write_json_line(payload: &Value) -> Result<(), CliError> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, payload)?;
    writeln!(stdout)?;
    Ok(())
}

fn output_mode(cli: &Cli) -> OutputMode {
    let env_mode = std::env::var("AYUR_OUTPUT_FORMAT").ok();
    resolve_output_mode(cli.json, env_mode.as_deref(), io::stdout().is_terminal())
}

fn resolve_output_mode(json_flag: bool, env_mode: Option<&str>, stdout_is_tty: bool) -> OutputMode {
    if json_flag {
        return OutputMode::Json;
    }

    let fallback = if stdout_is_tty {
        OutputMode::Human
    } else {
        OutputMode::Json
    };

    match env_mode
        .map(str::trim)
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("json") => OutputMode::Json,
        Some("human") => OutputMode::Human,
        _ => fallback,
    }
}
