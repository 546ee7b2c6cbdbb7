//! Requirements Collector - turn-based dialogue that accumulates the specification
//!
//! Two states: collecting and done. Every non-sentinel line triggers exactly
//! one clarifying question. The completion sentinel is the only way out; it
//! is recorded in the specification before the loop exits.

use async_trait::async_trait;
use scriptforge_core::{RunContext, Result, Specification};

use crate::gateway::{Gateway, GenerationRequest};
use crate::prompts;

/// Human side of the requirements dialogue
#[async_trait]
pub trait Interlocutor: Send {
    /// Show `prompt` and read one line of input
    async fn read_line(&mut self, prompt: &str) -> Result<String>;

    /// Present a clarifying question
    async fn relay(&mut self, question: &str) -> Result<()>;
}

#[derive(Debug)]
pub struct RequirementsCollector<'a> {
    gateway: &'a Gateway,
}

impl<'a> RequirementsCollector<'a> {
    pub fn new(gateway: &'a Gateway) -> Self {
        Self { gateway }
    }

    /// Run the dialogue until the human types the completion sentinel
    pub async fn collect(
        &self,
        run: &RunContext,
        interlocutor: &mut dyn Interlocutor,
    ) -> Result<Specification> {
        let mut spec = Specification::new();

        loop {
            let line = interlocutor.read_line(prompts::INPUT_PROMPT).await?;
            if spec.push_user(line) {
                break;
            }

            let reply = self
                .gateway
                .respond(GenerationRequest::prompt(prompts::clarification_prompt(&spec)))
                .await?;
            let question = reply.text().to_string();

            interlocutor.relay(&question).await?;
            spec.push_question(question);

            tracing::info!(
                run_id = %run.run_id(),
                stage = "requirements",
                "Gathering requirements: {}",
                spec.text()
            );
        }

        tracing::info!(
            run_id = %run.run_id(),
            stage = "requirements",
            turns = spec.turns().len(),
            "requirements complete"
        );
        Ok(spec)
    }
}
