//! REPL command parsing
//!
//! Lines starting with `:` are commands; anything else is a query for the
//! session loop. Parsing is kept free of I/O so the binary only dispatches.

use std::path::PathBuf;

/// One line of REPL input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    /// Natural-language question
    Query(String),
    /// Show the stored code
    Code,
    /// Open the stored code in `$EDITOR`
    Edit,
    /// Submit a file: `.py` runs as-is, other files go to the model
    Load(PathBuf),
    /// Write the stored code to a file
    Save(PathBuf),
    /// Execute the stored code again
    Rerun,
    Examples,
    Stats,
    Help,
    Quit,
    /// Blank line
    Empty,
}

/// A command line that could not be parsed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReplParseError {
    #[error("unknown command '{0}' - type :help for a list")]
    Unknown(String),

    #[error("{0} needs a file path")]
    MissingPath(&'static str),
}

pub const HELP: &str = "\
Commands:
  <question>      Generate and run code for a question
  :code           Show the current code
  :edit           Edit the current code in $EDITOR
  :load <file>    Run a .py file as-is; any other file is sent to the model
  :save <file>    Save the current code
  :rerun          Run the current code again
  :examples       Show example questions
  :stats          Show session state and stage counters
  :help           Show this help
  :quit           Exit";

impl ReplCommand {
    pub fn parse(line: &str) -> Result<Self, ReplParseError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(ReplCommand::Empty);
        }
        if matches!(line, "exit" | "quit") {
            return Ok(ReplCommand::Quit);
        }
        if !line.starts_with(':') {
            return Ok(ReplCommand::Query(line.to_string()));
        }

        let (cmd, arg) = match line.split_once(char::is_whitespace) {
            Some((cmd, arg)) => (cmd, arg.trim()),
            None => (line, ""),
        };

        match cmd {
            ":code" | ":c" => Ok(ReplCommand::Code),
            ":edit" | ":e" => Ok(ReplCommand::Edit),
            ":load" | ":l" => path_arg(":load", arg).map(ReplCommand::Load),
            ":save" | ":s" => path_arg(":save", arg).map(ReplCommand::Save),
            ":rerun" | ":r" => Ok(ReplCommand::Rerun),
            ":examples" => Ok(ReplCommand::Examples),
            ":stats" => Ok(ReplCommand::Stats),
            ":help" | ":h" | ":?" => Ok(ReplCommand::Help),
            ":quit" | ":q" | ":exit" => Ok(ReplCommand::Quit),
            other => Err(ReplParseError::Unknown(other.to_string())),
        }
    }
}

fn path_arg(cmd: &'static str, arg: &str) -> Result<PathBuf, ReplParseError> {
    if arg.is_empty() {
        Err(ReplParseError::MissingPath(cmd))
    } else {
        Ok(PathBuf::from(arg))
    }
}
