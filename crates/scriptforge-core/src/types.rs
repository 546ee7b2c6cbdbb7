//! Pipeline data model
//!
//! Each stage hands its output to the next by value. Nothing here is shared
//! through a global.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Human input that ends requirement gathering
pub const COMPLETION_SENTINEL: &str = "done";

/// One entry of the requirements dialogue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Turn {
    /// Requirements supplied up front (`-r` / `-f`)
    Supplied(String),
    /// A line typed by the human
    User(String),
    /// A clarifying question produced by the generation service
    Question(String),
}

/// Accumulated natural-language description of the desired function
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Specification {
    turns: Vec<Turn>,
    complete: bool,
}

impl Specification {
    /// Empty specification in the collecting state
    pub fn new() -> Self {
        Self::default()
    }

    /// Specification supplied as a finished text blob
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            turns: vec![Turn::Supplied(text.into())],
            complete: true,
        }
    }

    /// Append a human line. The completion sentinel finishes the specification.
    ///
    /// Returns `true` when the line was the sentinel.
    pub fn push_user(&mut self, line: impl Into<String>) -> bool {
        let line = line.into();
        let finished = is_completion_sentinel(&line);
        self.turns.push(Turn::User(line));
        if finished {
            self.complete = true;
        }
        finished
    }

    /// Append a clarifying question
    pub fn push_question(&mut self, question: impl Into<String>) {
        self.turns.push(Turn::Question(question.into()));
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Flatten the dialogue into the prompt-ready text blob
    pub fn text(&self) -> String {
        let mut text = String::new();
        for turn in &self.turns {
            match turn {
                Turn::Supplied(body) => text.push_str(body),
                Turn::User(line) => {
                    text.push_str("\nUser: ");
                    text.push_str(line);
                }
                Turn::Question(question) => {
                    text.push_str("\nLLM: ");
                    text.push_str(question);
                }
            }
        }
        text
    }
}

impl fmt::Display for Specification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

/// Case-insensitive check for the completion sentinel
pub fn is_completion_sentinel(line: &str) -> bool {
    line.trim_end_matches(&['\r', '\n'][..])
        .eq_ignore_ascii_case(COMPLETION_SENTINEL)
}

/// Which side of the function a schema describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaKind {
    Input,
    Output,
}

impl SchemaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Output => "output",
        }
    }

    /// Fixed artifact name for this kind
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Input => "input_schema.json",
            Self::Output => "output_schema.json",
        }
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JSON-schema-shaped document produced by the schema stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub kind: SchemaKind,
    pub document: serde_json::Value,
}

impl Schema {
    pub fn new(kind: SchemaKind, document: serde_json::Value) -> Self {
        Self { kind, document }
    }

    /// Document rendered with a 4-space indent, as embedded in prompts
    pub fn pretty(&self) -> String {
        crate::store::to_pretty_json(&self.document)
            .unwrap_or_else(|_| self.document.to_string())
    }
}

/// Decoded source text of the generated test module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestSuite(String);

impl TestSuite {
    pub fn new(source: impl Into<String>) -> Self {
        Self(source.into())
    }

    pub fn source(&self) -> &str {
        &self.0
    }
}

/// Decoded source text of the implementation under test
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateImplementation(String);

impl CandidateImplementation {
    pub fn new(source: impl Into<String>) -> Self {
        Self(source.into())
    }

    pub fn source(&self) -> &str {
        &self.0
    }
}

/// Outcome of running a test suite against a candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationVerdict {
    pub passed: bool,
    /// `None` when the process was killed or timed out
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub duration_ms: u64,
}

impl ValidationVerdict {
    /// Short human-readable diagnostic
    pub fn summary(&self) -> String {
        match (self.passed, self.exit_code) {
            (true, _) => "all unit tests passed".to_string(),
            (false, Some(code)) => format!("test process exited with code {}", code),
            (false, None) => "test process did not exit normally".to_string(),
        }
    }
}
