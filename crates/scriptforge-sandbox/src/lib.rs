//! Scriptforge Sandbox - isolated execution of generated test suites
//!
//! The candidate implementation and its tests are written into the run
//! directory, then the test module runs as an independent child process.
//! Only the exit status decides the verdict: an import failure and a failed
//! assertion are both a non-zero exit.

use scriptforge_core::store::{IMPLEMENTATION_FILE, TEST_SCRIPT_FILE};
use scriptforge_core::{
    ArtifactStore, CandidateImplementation, ForgeError, Result, TestSuite, ValidationVerdict,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tokio::time::timeout;

/// Default upper bound on a single test run
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Process runner rooted at a directory
#[derive(Debug, Clone)]
pub struct Sandbox {
    /// Working directory of every child process
    pub root_path: PathBuf,
    timeout: Duration,
}

/// Result of one child-process execution
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionResult {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
    pub timed_out: bool,
    pub duration_ms: u64,
}

impl Sandbox {
    pub fn new(root_path: impl Into<PathBuf>) -> Self {
        Self {
            root_path: root_path.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run a command inside the sandbox root, killing it when the bound expires.
    ///
    /// A program that cannot be launched at all is an error, not a result.
    pub async fn run(&self, cmd: &str, args: &[String]) -> Result<ExecutionResult> {
        let mut command = Command::new(cmd);
        command
            .args(args)
            .current_dir(&self.root_path)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let started = Instant::now();
        let outcome = timeout(self.timeout, command.output()).await;
        let duration_ms = started.elapsed().as_millis() as u64;

        match outcome {
            Ok(Ok(output)) => Ok(ExecutionResult {
                success: output.status.success(),
                stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
                exit_code: output.status.code(),
                timed_out: false,
                duration_ms,
            }),
            Ok(Err(e)) => Err(ForgeError::Sandbox(format!(
                "failed to launch '{}': {}",
                cmd, e
            ))),
            Err(_) => Ok(ExecutionResult {
                success: false,
                stdout: String::new(),
                stderr: format!(
                    "'{}' timed out after {}s and was killed",
                    cmd,
                    self.timeout.as_secs()
                ),
                exit_code: None,
                timed_out: true,
                duration_ms,
            }),
        }
    }
}

/// Validation gate between a candidate implementation and its test suite
#[derive(Debug, Clone)]
pub struct Validator {
    interpreter: String,
    timeout: Duration,
}

impl Validator {
    pub fn new(interpreter: impl Into<String>) -> Self {
        Self {
            interpreter: interpreter.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn interpreter(&self) -> &str {
        &self.interpreter
    }

    /// Write both modules into the run directory and execute the tests.
    pub async fn validate(
        &self,
        store: &ArtifactStore,
        tests: &TestSuite,
        candidate: &CandidateImplementation,
    ) -> Result<ValidationVerdict> {
        store.ensure_text(TEST_SCRIPT_FILE, tests.source())?;
        store.write_text(IMPLEMENTATION_FILE, candidate.source())?;

        let sandbox = Sandbox::new(store.context().dir()).with_timeout(self.timeout);
        let run_id = store.context().run_id();
        tracing::info!(
            run_id = %run_id,
            stage = "validation",
            interpreter = %self.interpreter,
            "running {} against {}",
            TEST_SCRIPT_FILE,
            IMPLEMENTATION_FILE
        );

        let result = sandbox
            .run(&self.interpreter, &[TEST_SCRIPT_FILE.to_string()])
            .await?;

        if result.timed_out {
            tracing::warn!(run_id = %run_id, stage = "validation", "{}", result.stderr);
        }

        Ok(ValidationVerdict {
            passed: result.success,
            exit_code: result.exit_code,
            stdout: result.stdout,
            stderr: result.stderr,
            duration_ms: result.duration_ms,
        })
    }
}

/// True when `program` can be launched from `dir`
pub async fn interpreter_available(program: &str, dir: &Path) -> bool {
    Sandbox::new(dir)
        .with_timeout(Duration::from_secs(10))
        .run(program, &["--version".to_string()])
        .await
        .map(|r| r.success)
        .unwrap_or(false)
}
