//! Code Synthesizer - an implementation constrained by the generated tests

use scriptforge_core::{
    strip_wrapping_quotes, ArtifactStore, CandidateImplementation, Result, Schema, Specification,
    TestSuite,
};

use crate::envelope::decode_escaped_source;
use crate::gateway::{Gateway, GenerationRequest};
use crate::prompts;

const STAGE: &str = "script";

#[derive(Debug)]
pub struct ScriptSynthesizer<'a> {
    gateway: &'a Gateway,
}

impl<'a> ScriptSynthesizer<'a> {
    pub fn new(gateway: &'a Gateway) -> Self {
        Self { gateway }
    }

    /// Produce the candidate. Nothing is written; persistence waits for validation.
    pub async fn synthesize(
        &self,
        store: &ArtifactStore,
        spec: &Specification,
        input: &Schema,
        output: &Schema,
        tests: &TestSuite,
    ) -> Result<CandidateImplementation> {
        let run_id = store.context().run_id();
        let prompt = prompts::code_prompt(spec, input, output, tests);
        tracing::info!(
            run_id = %run_id,
            stage = STAGE,
            "Generating script with prompt:\n{}",
            prompt
        );

        let reply = self
            .gateway
            .respond(GenerationRequest::prompt(prompt).json())
            .await?;
        tracing::info!(run_id = %run_id, stage = STAGE, "Raw LLM response: {}", reply.text());

        let decoded = decode_escaped_source(STAGE, prompts::PYTHON_CODE_KEY, reply.text())?;
        let source = strip_wrapping_quotes(&decoded);
        tracing::info!(run_id = %run_id, stage = STAGE, "Generated function code: {}", source);
        Ok(CandidateImplementation::new(source))
    }
}
