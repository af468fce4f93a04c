//! Helpers for running the `reducer` binary with timing
//!
//! Wraps the binary built by Cargo for this test run and exposes assertion
//! helpers. Stdin is closed, so any confirmation prompt reads end of input.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

/// `reducer` invocation builder
pub struct ReducerCommand {
    working_dir: PathBuf,
    args: Vec<String>,
    env: HashMap<String, String>,
}

impl ReducerCommand {
    pub fn new(working_dir: impl AsRef<Path>) -> Self {
        let mut env = HashMap::new();
        // Keep credential lookups off the network if a test ever gets that far
        env.insert("AWS_EC2_METADATA_DISABLED".to_string(), "true".to_string());
        Self {
            working_dir: working_dir.as_ref().to_path_buf(),
            args: Vec::new(),
            env,
        }
    }

    pub fn args(&mut self, args: &[&str]) -> &mut Self {
        self.args.extend(args.iter().map(|s| s.to_string()));
        self
    }

    /// Run to completion and capture output
    pub fn execute(&self) -> Result<CommandResult> {
        let start = Instant::now();

        let mut command = Command::new(env!("CARGO_BIN_EXE_reducer"));
        command
            .args(&self.args)
            .current_dir(&self.working_dir)
            .envs(&self.env)
            .env_remove("RUST_LOG")
            .stdin(Stdio::null());

        let output = command.output().context("Failed to execute reducer")?;

        Ok(CommandResult {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code().unwrap_or(-1),
            duration: start.elapsed(),
        })
    }

    pub fn assert_success(&self) -> Result<CommandResult> {
        let result = self.execute()?;

        if !result.success() {
            anyhow::bail!(
                "Command failed (exit code: {}):\nArgs: {:?}\nStdout: {}\nStderr: {}",
                result.exit_code,
                self.args,
                result.stdout,
                result.stderr
            );
        }

        Ok(result)
    }

    pub fn assert_failure(&self) -> Result<CommandResult> {
        let result = self.execute()?;

        if result.success() {
            anyhow::bail!(
                "Command should have failed but succeeded:\nArgs: {:?}\nStdout: {}",
                self.args,
                result.stdout
            );
        }

        Ok(result)
    }
}

/// Captured output of one run
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub duration: Duration,
}

impl CommandResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    pub fn contains_stdout(&self, text: &str) -> bool {
        self.stdout.contains(text)
    }

    pub fn contains_stderr(&self, text: &str) -> bool {
        self.stderr.contains(text)
    }
}

/// Build a command in `dir` with the given arguments
///
/// ```ignore
/// reducer!(dir, "prune", "my-bucket", "-s", "0").assert_failure()?;
/// ```
#[macro_export]
macro_rules! reducer {
    ($dir:expr, $($arg:expr),*) => {{
        let mut cmd = $crate::common::cli::ReducerCommand::new($dir);
        cmd.args(&[$($arg),*]);
        cmd
    }};
}
