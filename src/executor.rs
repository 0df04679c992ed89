//! Process execution for tokenized commands.
//!
//! Arguments are handed to the operating system as a vector, never
//! re-concatenated into a shell string, so quoting resolved by the tokenizer
//! cannot be re-interpreted. ffmpeg writes its progress log to stderr, so the
//! captured output combines both streams.

use crate::error::{Error, Result};
use crate::tokenizer::ParsedCommand;
use std::process::{Command, Output};
use tracing::{error, info};

/// Trait for running system processes.
///
/// This abstraction enables testing without spawning real processes.
pub trait ProcessRunner: Send + Sync {
    /// Executes a command and returns its output.
    fn run(&self, program: &str, args: &[&str]) -> std::io::Result<Output>;

    /// Checks if a program exists in PATH.
    fn program_exists(&self, program: &str) -> bool;
}

/// Default process runner using std::process::Command.
pub struct SystemProcessRunner;

impl ProcessRunner for SystemProcessRunner {
    fn run(&self, program: &str, args: &[&str]) -> std::io::Result<Output> {
        let mut cmd = Command::new(program);
        cmd.args(args);
        cmd.output()
    }

    fn program_exists(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}

/// Runs tokenized commands and captures their output.
pub struct Executor {
    runner: Box<dyn ProcessRunner>,
}

impl Executor {
    pub fn new() -> Self {
        Self::with_runner(Box::new(SystemProcessRunner))
    }

    /// Builds an executor with an injected process runner (for testing).
    pub fn with_runner(runner: Box<dyn ProcessRunner>) -> Self {
        Self { runner }
    }

    /// Runs a parsed command and returns its combined captured output.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Execution`] if the executable is not installed, the
    /// process cannot be spawned, or it exits with a non-zero status.
    pub async fn run_parsed(&self, command: &ParsedCommand) -> Result<String> {
        if !self.runner.program_exists(&command.executable) {
            return Err(Error::Execution(format!(
                "{} is not installed or not in PATH",
                command.executable
            )));
        }

        info!(
            "Executing: {} with {} argument(s)",
            command.executable,
            command.args.len()
        );

        let args: Vec<&str> = command.args.iter().map(String::as_str).collect();
        let output = self
            .runner
            .run(&command.executable, &args)
            .map_err(|e| Error::Execution(format!("failed to spawn process: {}", e)))?;

        Self::collect_output(&command.executable, &output)
    }

    fn collect_output(program: &str, output: &Output) -> Result<String> {
        if output.status.success() {
            let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
            text.push_str(&String::from_utf8_lossy(&output.stderr));
            Ok(text)
        } else {
            error!("{} exited with status: {}", program, output.status);
            let stderr = String::from_utf8_lossy(&output.stderr);
            if stderr.trim().is_empty() {
                Err(Error::Execution(format!(
                    "{} exited with status {}",
                    program, output.status
                )))
            } else {
                Err(Error::Execution(stderr.into_owned()))
            }
        }
    }
}

impl Default for Executor {
    fn default() -> Self {
        Self::new()
    }
}
