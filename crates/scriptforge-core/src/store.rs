//! Per-run artifact directory
//!
//! A [`RunContext`] is built once at the top of the workflow and passed to
//! every stage. The [`ArtifactStore`] bound to it writes each file at most
//! once; a second write of the same name is rejected.

use crate::error::{ForgeError, Result};
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Input schema artifact
pub const INPUT_SCHEMA_FILE: &str = "input_schema.json";
/// Output schema artifact
pub const OUTPUT_SCHEMA_FILE: &str = "output_schema.json";
/// Generated test module
pub const TEST_SCRIPT_FILE: &str = "test_script.py";
/// Module name the tests import the implementation from
pub const IMPLEMENTATION_MODULE: &str = "generated_script";
/// Implementation under test
pub const IMPLEMENTATION_FILE: &str = "generated_script.py";
/// Accepted implementation, present only after a passing validation
pub const FINAL_SCRIPT_FILE: &str = "final_script.py";
/// Stage event log
pub const LOG_FILE: &str = "function_generation.log";

/// Length of the run identifier in hex characters
const RUN_ID_LEN: usize = 8;

/// Identity and directory of one pipeline execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    run_id: String,
    dir: PathBuf,
}

impl RunContext {
    /// Create a fresh run directory under `root` with a random identifier
    pub fn create(root: impl AsRef<Path>) -> Result<Self> {
        let run_id = Uuid::new_v4().simple().to_string()[..RUN_ID_LEN].to_string();
        Self::with_id(root, run_id)
    }

    /// Create the run directory for a known identifier
    pub fn with_id(root: impl AsRef<Path>, run_id: impl Into<String>) -> Result<Self> {
        let run_id = run_id.into();
        let dir = root.as_ref().join(&run_id);
        fs::create_dir_all(&dir)?;
        tracing::debug!(run_id = %run_id, dir = %dir.display(), "created run directory");
        Ok(Self { run_id, dir })
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// Write-once store for the artifacts of a single run
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    context: RunContext,
}

impl ArtifactStore {
    pub fn new(context: RunContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &RunContext {
        &self.context
    }

    pub fn path_of(&self, name: &str) -> PathBuf {
        self.context.dir.join(name)
    }

    pub fn exists(&self, name: &str) -> bool {
        self.path_of(name).is_file()
    }

    /// Write a text artifact. Fails if the artifact already exists.
    pub fn write_text(&self, name: &str, content: &str) -> Result<PathBuf> {
        let path = self.path_of(name);
        let mut file = create_new(&path)?;
        file.write_all(content.as_bytes())?;
        tracing::info!(
            run_id = %self.context.run_id,
            artifact = name,
            bytes = content.len(),
            "saved artifact to {}",
            path.display()
        );
        Ok(path)
    }

    /// Write a JSON artifact with a 4-space indent
    pub fn write_json<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<PathBuf> {
        let content = to_pretty_json(value)?;
        self.write_text(name, &content)
    }

    /// Make sure `name` holds exactly `content`.
    ///
    /// An existing file with identical content is accepted as-is; different
    /// content is a write-once violation.
    pub fn ensure_text(&self, name: &str, content: &str) -> Result<PathBuf> {
        let path = self.path_of(name);
        if path.is_file() {
            let existing = fs::read_to_string(&path)?;
            if existing == content {
                return Ok(path);
            }
            return Err(ForgeError::AlreadyWritten(path));
        }
        self.write_text(name, content)
    }

    pub fn read_text(&self, name: &str) -> Result<String> {
        Ok(fs::read_to_string(self.path_of(name))?)
    }

    /// Open the run's log stream for appending
    pub fn open_log(&self) -> Result<File> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path_of(LOG_FILE))?;
        Ok(file)
    }
}

fn create_new(path: &Path) -> Result<File> {
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| match e.kind() {
            ErrorKind::AlreadyExists => ForgeError::AlreadyWritten(path.to_path_buf()),
            _ => ForgeError::Io(e),
        })
}

/// Serialize with a 4-space indent
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
