//! Scriptforge Core - data contracts of the script generation pipeline
//!
//! The pipeline narrows a natural-language request into a validated program:
//!
//! 1. **Specification** (`types`): accumulated requirements dialogue
//! 2. **Schemas** (`types`): input/output contracts derived from it
//! 3. **Test suite / candidate** (`types`): generated source text, moved through
//!    JSON with the narrow escape codec (`codec`)
//! 4. **Artifact store** (`store`): write-once files under a per-run directory
//!
//! Nothing is accepted as `final_script.py` unless the validator observed a
//! passing test run for that exact test/implementation pair.

#![deny(unsafe_code)]
#![warn(rust_2018_idioms, missing_debug_implementations, clippy::all)]

pub mod codec;
pub mod error;
pub mod naming;
pub mod store;
pub mod types;

pub use codec::{escape, strip_wrapping_quotes, unescape};
pub use error::{ForgeError, Result};
pub use store::{ArtifactStore, RunContext};
pub use types::{
    CandidateImplementation, Schema, SchemaKind, Specification, TestSuite, Turn,
    ValidationVerdict,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
