//! Data Analyst Command Line Interface
//!
//! Ask research questions, inspect routing and prompts, run code, or work in
//! an interactive session with edit and re-run.
//!
//! # Usage
//!
//! ```bash
//! # One cycle: generate and run
//! analyst_cli ask "What's the Sharpe ratio of HSI in 2024?"
//!
//! # Show the route and the prompt without calling the model
//! analyst_cli classify "Plot a chart of CPI of China and US"
//! analyst_cli prompt "Plot HSI daily chart of 2024"
//!
//! # Execute a script
//! analyst_cli run --file analysis.py
//!
//! # Interactive session
//! analyst_cli repl
//! ```

use clap::{Parser, Subcommand};
use colored::Colorize;
use rustyline::error::ReadlineError;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use data_analyst::repl::{ReplCommand, HELP};
use data_analyst::{
    classify, create_llm_client, AnalystConfig, CodeExecutor, ConfigLoader, ExecutionResult,
    GeneratedCode, InputKind, Session, SessionError, SessionLoop, EXAMPLE_QUERIES,
};

#[derive(Parser)]
#[command(name = "analyst_cli")]
#[command(version = "0.1.0")]
#[command(about = "Turn research questions into analysis code, run it, edit and re-run it")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to $ANALYST_CONFIG or config/analyst.yaml)
    #[arg(long, short, global = true, env = "ANALYST_CONFIG")]
    config: Option<PathBuf>,

    /// Show info-level logs
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate code for a question and run it
    Ask {
        query: String,

        /// Print the generated code without running it
        #[arg(long)]
        no_exec: bool,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show which route a question takes
    Classify { query: String },

    /// Show the artifact handed to the generator (no model call)
    Prompt { query: String },

    /// Execute code directly
    Run {
        /// Input file (reads stdin if not provided)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Interactive session
    Repl,

    /// Show example questions
    Examples,
}

// =============================================================================
// MAIN
// =============================================================================

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    data_analyst::telemetry::init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Ask {
            query,
            no_exec,
            json,
        } => cmd_ask(cli.config, &query, no_exec, json).await,
        Commands::Classify { query } => cmd_classify(&query),
        Commands::Prompt { query } => cmd_prompt(cli.config, &query).await,
        Commands::Run { file, json } => cmd_run(cli.config, file, json).await,
        Commands::Repl => cmd_repl(cli.config).await,
        Commands::Examples => cmd_examples(),
    };

    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

// =============================================================================
// COMMAND IMPLEMENTATIONS
// =============================================================================

async fn cmd_ask(
    config_path: Option<PathBuf>,
    query: &str,
    no_exec: bool,
    json: bool,
) -> Result<(), String> {
    let config = load_config(config_path)?;
    let pipeline = build_pipeline(&config)?;
    let mut session = Session::new();

    if !json {
        progress("Generating code...");
    }
    let preparation = pipeline
        .prepare(&mut session, query)
        .await
        .map_err(|e| e.to_string())?;

    let result = if no_exec || !preparation.generated.is_code() {
        None
    } else {
        if !json {
            progress("Executing code...");
        }
        let outcome = pipeline
            .rerun(&mut session)
            .await
            .map_err(|e| e.to_string())?;
        Some(outcome.result)
    };

    if json {
        let output = serde_json::json!({
            "session_id": session.id,
            "intent": preparation.intent,
            "generation": preparation.generated,
            "code": preparation.generated.as_text(),
            "result": result,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output)
                .map_err(|e| format!("JSON serialization failed: {}", e))?
        );
    } else {
        println!("{} {}", "Route:".cyan().bold(), preparation.intent);
        print_generation(&preparation.generated);
        if let Some(result) = &result {
            print_result(result);
        }
    }

    match (&preparation.generated, &result) {
        (GeneratedCode::Code { .. }, Some(r)) if !r.is_success() => {
            Err("Execution failed".to_string())
        }
        (GeneratedCode::Code { .. }, _) => Ok(()),
        _ => Err("Code generation failed".to_string()),
    }
}

fn cmd_classify(query: &str) -> Result<(), String> {
    let intent = classify(query);
    let path = if intent.requires_generation() {
        "model"
    } else {
        "static resource"
    };
    println!("{} ({})", intent.to_string().green().bold(), path);
    Ok(())
}

async fn cmd_prompt(config_path: Option<PathBuf>, query: &str) -> Result<(), String> {
    let config = load_config(config_path)?;
    let intent = classify(query);
    let artifact = config.prompt_builder().build(intent, query).await;

    let kind = if artifact.is_passthrough() {
        "passthrough"
    } else {
        "instruction"
    };
    println!("{} {} ({})", "Route:".cyan().bold(), intent, kind);
    println!("{}", artifact.as_text());
    Ok(())
}

async fn cmd_run(
    config_path: Option<PathBuf>,
    file: Option<PathBuf>,
    json: bool,
) -> Result<(), String> {
    let config = load_config(config_path)?;
    let code = read_input(file)?;

    let executor = data_analyst::PythonExecutor::from_config(&config.executor);
    if !json {
        progress("Executing code...");
    }
    let result = executor.run(&code).await;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&result)
                .map_err(|e| format!("JSON serialization failed: {}", e))?
        );
    } else {
        print_result(&result);
    }

    if result.is_success() {
        Ok(())
    } else {
        Err("Execution failed".to_string())
    }
}

fn cmd_examples() -> Result<(), String> {
    println!("{}", "Example questions:".cyan().bold());
    for query in EXAMPLE_QUERIES {
        println!("  {}", query.yellow());
    }
    Ok(())
}

// =============================================================================
// REPL
// =============================================================================

async fn cmd_repl(config_path: Option<PathBuf>) -> Result<(), String> {
    let config = load_config(config_path)?;
    let pipeline = build_pipeline(&config)?;
    let mut session = Session::new();
    let mut editor =
        rustyline::DefaultEditor::new().map_err(|e| format!("Failed to start line editor: {}", e))?;

    println!(
        "{} session {} (model {})",
        "Data analyst".green().bold(),
        session.id,
        pipeline.model_id()
    );
    println!("Ask a question, or type :help for commands.");

    loop {
        let line = match editor.readline("analyst> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(format!("Failed to read input: {}", e)),
        };
        let _ = editor.add_history_entry(line.as_str());

        let command = match ReplCommand::parse(&line) {
            Ok(command) => command,
            Err(e) => {
                eprintln!("{}: {}", "error".red().bold(), e);
                continue;
            }
        };

        if command == ReplCommand::Quit {
            break;
        }
        if let Err(e) = handle_repl_command(&pipeline, &mut session, command).await {
            eprintln!("{}: {}", "error".red().bold(), e);
        }
    }

    Ok(())
}

async fn handle_repl_command(
    pipeline: &SessionLoop,
    session: &mut Session,
    command: ReplCommand,
) -> Result<(), String> {
    match command {
        ReplCommand::Query(query) => {
            progress("Generating code...");
            let preparation = pipeline
                .prepare(session, &query)
                .await
                .map_err(|e| e.to_string())?;
            println!("{} {}", "Route:".cyan().bold(), preparation.intent);
            print_generation(&preparation.generated);

            if preparation.generated.is_code() {
                run_stored(pipeline, session).await?;
            }
        }
        ReplCommand::Code => match session.code() {
            Some(code) => println!("{}", code),
            None => println!("No code yet."),
        },
        ReplCommand::Edit => {
            if !session.state().has_code() {
                return Err(SessionError::NothingToRun.to_string());
            }
            let current = session.code().unwrap_or_default().to_string();
            let edited = edit_in_editor(&current)?;
            if edited == current {
                println!("No changes.");
            } else {
                pipeline
                    .edit(session, edited)
                    .map_err(|e| e.to_string())?;
                println!("Code updated. Use :rerun to run it.");
            }
        }
        ReplCommand::Load(path) => {
            let raw = std::fs::read_to_string(&path)
                .map_err(|e| format!("Failed to read '{}': {}", path.display(), e))?;
            let kind = InputKind::for_path(&path);
            if kind == InputKind::Instruction {
                progress("Generating code...");
            }
            let outcome = pipeline
                .submit_raw(session, kind, &raw)
                .await
                .map_err(|e| e.to_string())?;
            if let Some(generated) = session.last_generation() {
                print_generation(generated);
            }
            if session.last_generation().map_or(false, GeneratedCode::is_code) {
                print_result(&outcome.result);
            }
        }
        ReplCommand::Save(path) => {
            let code = session.code().ok_or("No code to save")?;
            save_code(&path, code)?;
            println!("Saved to {}", path.display());
        }
        ReplCommand::Rerun => run_stored(pipeline, session).await?,
        ReplCommand::Examples => {
            cmd_examples()?;
        }
        ReplCommand::Stats => print_stats(session),
        ReplCommand::Help => println!("{}", HELP),
        ReplCommand::Empty | ReplCommand::Quit => {}
    }
    Ok(())
}

async fn run_stored(pipeline: &SessionLoop, session: &mut Session) -> Result<(), String> {
    progress("Executing code...");
    let outcome = pipeline.rerun(session).await.map_err(|e| e.to_string())?;
    print_result(&outcome.result);
    Ok(())
}

fn print_stats(session: &Session) {
    let counters = session.counters();
    println!("{} {}", "Session:".cyan().bold(), session.id);
    println!("  state:           {}", session.state().name());
    if let Some(query) = session.last_query() {
        println!("  last query:      {}", query);
    }
    if let Some(intent) = session.last_intent() {
        println!("  last route:      {}", intent);
    }
    println!("  classifications: {}", counters.classifications);
    println!("  prompt builds:   {}", counters.prompt_builds);
    println!("  generations:     {}", counters.generations);
    println!("  executions:      {}", counters.executions);
    println!("  edits:           {}", counters.edits);
}

// =============================================================================
// HELPERS
// =============================================================================

fn load_config(path: Option<PathBuf>) -> Result<AnalystConfig, String> {
    ConfigLoader::resolve(path)
        .load()
        .map_err(|e| e.to_string())
}

fn build_pipeline(config: &AnalystConfig) -> Result<SessionLoop, String> {
    let client = create_llm_client(&config.model.client_options())
        .map_err(|e| format!("Failed to create {} client: {}", config.model.backend, e))?;
    Ok(SessionLoop::from_config(config, client))
}

fn progress(message: &str) {
    eprintln!("{}", message.dimmed());
}

fn print_generation(generated: &GeneratedCode) {
    match generated {
        GeneratedCode::Code { source } => {
            println!("{}", "Generated code:".cyan().bold());
            println!("{}", source);
        }
        other => eprintln!("{}: {}", "error".red().bold(), other),
    }
}

fn print_result(result: &ExecutionResult) {
    match &result.error {
        None => {
            println!(
                "{} ({} ms)",
                "Code executed successfully!".green().bold(),
                result.duration.as_millis()
            );
            if let Some(output) = &result.output {
                println!("{}", "Output:".cyan().bold());
                print!("{}", output);
                if !output.ends_with('\n') {
                    println!();
                }
            }
        }
        Some(error) => {
            eprintln!("{} {}", "Error during execution:".red().bold(), error);
        }
    }
}

fn read_input(file: Option<PathBuf>) -> Result<String, String> {
    match file {
        Some(path) => std::fs::read_to_string(&path)
            .map_err(|e| format!("Failed to read '{}': {}", path.display(), e)),
        None => {
            if io::stdin().is_terminal() {
                return Err("No input provided. Use --file or pipe input via stdin.".to_string());
            }
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|e| format!("Failed to read stdin: {}", e))?;
            Ok(buffer)
        }
    }
}

fn save_code(path: &Path, code: &str) -> Result<(), String> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create '{}': {}", parent.display(), e))?;
    }
    std::fs::write(path, code).map_err(|e| format!("Failed to write '{}': {}", path.display(), e))
}

/// Open `code` in `$VISUAL` / `$EDITOR` and return the saved text
fn edit_in_editor(code: &str) -> Result<String, String> {
    use std::io::Write;

    let editor = std::env::var("VISUAL")
        .or_else(|_| std::env::var("EDITOR"))
        .unwrap_or_else(|_| "vi".to_string());
    let mut parts = editor.split_whitespace();
    let program = parts.next().ok_or("EDITOR is empty")?;

    let mut file = tempfile::Builder::new()
        .prefix("analyst-")
        .suffix(".py")
        .tempfile()
        .map_err(|e| format!("Failed to create temp file: {}", e))?;
    file.write_all(code.as_bytes())
        .and_then(|_| file.flush())
        .map_err(|e| format!("Failed to write temp file: {}", e))?;

    let status = std::process::Command::new(program)
        .args(parts)
        .arg(file.path())
        .status()
        .map_err(|e| format!("Failed to launch '{}': {}", program, e))?;
    if !status.success() {
        return Err(format!("Editor exited with {}", status));
    }

    std::fs::read_to_string(file.path()).map_err(|e| format!("Failed to read edited code: {}", e))
}
