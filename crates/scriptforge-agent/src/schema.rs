//! Schema Synthesizer - input and output contracts from the specification

use scriptforge_core::{ArtifactStore, Result, Schema, SchemaKind, Specification};
use std::path::PathBuf;

use crate::envelope::decode_json;
use crate::gateway::{Gateway, GenerationRequest};
use crate::prompts;

const STAGE: &str = "schema";

#[derive(Debug)]
pub struct SchemaSynthesizer<'a> {
    gateway: &'a Gateway,
}

impl<'a> SchemaSynthesizer<'a> {
    pub fn new(gateway: &'a Gateway) -> Self {
        Self { gateway }
    }

    /// One structured-JSON call; the response is the schema document itself.
    pub async fn synthesize(
        &self,
        store: &ArtifactStore,
        spec: &Specification,
        kind: SchemaKind,
    ) -> Result<Schema> {
        let reply = self
            .gateway
            .respond(GenerationRequest::prompt(prompts::schema_prompt(kind, spec)).json())
            .await?;
        let document = decode_json(STAGE, reply.text())?;

        tracing::info!(
            run_id = %store.context().run_id(),
            stage = STAGE,
            kind = %kind,
            "Generated {} schema: {}",
            kind,
            document
        );
        Ok(Schema::new(kind, document))
    }

    /// Save under the fixed file name for the schema's kind
    pub fn persist(&self, store: &ArtifactStore, schema: &Schema) -> Result<PathBuf> {
        store.write_json(schema.kind.file_name(), &schema.document)
    }
}
