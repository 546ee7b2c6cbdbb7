//! Pipeline Orchestrator
//!
//! Requirements → schemas → tests → code → validation, once each, strictly in
//! sequence. `final_script.py` is written only after a passing verdict for the
//! exact test/implementation pair. There is no retry: a failed run ends with
//! only its intermediate artifacts on disk.

use scriptforge_core::store::FINAL_SCRIPT_FILE;
use scriptforge_core::{ArtifactStore, Result, SchemaKind, Specification, ValidationVerdict};
use scriptforge_sandbox::Validator;
use std::path::PathBuf;

use crate::codegen::ScriptSynthesizer;
use crate::collector::{Interlocutor, RequirementsCollector};
use crate::gateway::Gateway;
use crate::schema::SchemaSynthesizer;
use crate::unit_tests::UnitTestSynthesizer;

/// How a completed run ended
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub run_id: String,
    pub specification: Specification,
    pub verdict: ValidationVerdict,
    /// Present only when the verdict passed
    pub final_artifact: Option<PathBuf>,
}

impl RunOutcome {
    pub fn accepted(&self) -> bool {
        self.final_artifact.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    gateway: Gateway,
    validator: Validator,
}

impl Pipeline {
    pub fn new(gateway: Gateway, validator: Validator) -> Self {
        Self { gateway, validator }
    }

    /// Run the whole workflow for one run directory.
    ///
    /// Non-blank `requirements` skip the interactive dialogue. Any error is
    /// logged here, once, before it propagates.
    pub async fn run(
        &self,
        store: &ArtifactStore,
        requirements: Option<String>,
        interlocutor: &mut dyn Interlocutor,
    ) -> Result<RunOutcome> {
        match self.execute(store, requirements, interlocutor).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                tracing::error!(
                    run_id = %store.context().run_id(),
                    "Execution failed: {}",
                    e
                );
                Err(e)
            }
        }
    }

    async fn execute(
        &self,
        store: &ArtifactStore,
        requirements: Option<String>,
        interlocutor: &mut dyn Interlocutor,
    ) -> Result<RunOutcome> {
        let run_id = store.context().run_id().to_string();

        let spec = match requirements.filter(|text| !text.trim().is_empty()) {
            Some(text) => {
                tracing::info!(
                    run_id = %run_id,
                    stage = "requirements",
                    "using supplied requirements"
                );
                Specification::from_text(text)
            }
            None => {
                RequirementsCollector::new(&self.gateway)
                    .collect(store.context(), interlocutor)
                    .await?
            }
        };

        let schemas = SchemaSynthesizer::new(&self.gateway);
        let input = schemas.synthesize(store, &spec, SchemaKind::Input).await?;
        let output = schemas.synthesize(store, &spec, SchemaKind::Output).await?;
        schemas.persist(store, &input)?;
        schemas.persist(store, &output)?;

        let test_synth = UnitTestSynthesizer::new(&self.gateway);
        let tests = test_synth.synthesize(store, &spec, &input, &output).await?;
        test_synth.persist(store, &tests)?;

        let candidate = ScriptSynthesizer::new(&self.gateway)
            .synthesize(store, &spec, &input, &output, &tests)
            .await?;

        let verdict = self.validator.validate(store, &tests, &candidate).await?;

        let final_artifact = if verdict.passed {
            tracing::info!(
                run_id = %run_id,
                stage = "validation",
                duration_ms = verdict.duration_ms,
                "Generated script passes all unit tests."
            );
            Some(store.write_text(FINAL_SCRIPT_FILE, candidate.source())?)
        } else {
            tracing::error!(
                run_id = %run_id,
                stage = "validation",
                exit_code = ?verdict.exit_code,
                "Generated script failed some tests: {}",
                verdict.stderr
            );
            tracing::error!(
                run_id = %run_id,
                "The generated script did not pass all the unit tests."
            );
            None
        };

        Ok(RunOutcome {
            run_id,
            specification: spec,
            verdict,
            final_artifact,
        })
    }
}
