//! Scriptforge Agent - turns a natural-language request into a validated script
//!
//! Every transformation step is one call to an external generation service
//! through the [`gateway::Gateway`]:
//!
//! 1. **Requirements** (`collector`): clarifying dialogue until the human types `done`
//! 2. **Schemas** (`schema`): input and output contracts, one call each
//! 3. **Tests** (`unit_tests`): a test module written before any implementation
//! 4. **Code** (`codegen`): an implementation that must pass those tests
//! 5. **Validation** (`orchestrator`): the tests run in a child process; only a
//!    pass persists `final_script.py`
//!
//! # Example
//!
//! ```no_run
//! use scriptforge_agent::{ForgeConfig, Pipeline};
//! use scriptforge_core::{ArtifactStore, RunContext};
//!
//! # async fn demo(human: &mut dyn scriptforge_agent::Interlocutor) -> anyhow::Result<()> {
//! let config = ForgeConfig::load(None)?;
//! let store = ArtifactStore::new(RunContext::create(&config.artifact_root)?);
//! let pipeline = Pipeline::new(config.build_gateway()?, config.validator());
//!
//! let outcome = pipeline
//!     .run(&store, Some("add two numbers".into()), human)
//!     .await?;
//! println!("accepted: {}", outcome.accepted());
//! # Ok(())
//! # }
//! ```

pub mod codegen;
pub mod collector;
pub mod config;
pub mod envelope;
pub mod gateway;
pub mod orchestrator;
pub mod prompts;
pub mod providers;
pub mod schema;
pub mod unit_tests;

pub use collector::{Interlocutor, RequirementsCollector};
pub use config::ForgeConfig;
pub use gateway::{Conversation, Gateway, GenerationClient, GenerationRequest, Message, Reply};
pub use orchestrator::{Pipeline, RunOutcome};
