//! Test Synthesizer - an executable test module written before the implementation

use scriptforge_core::store::TEST_SCRIPT_FILE;
use scriptforge_core::{ArtifactStore, Result, Schema, Specification, TestSuite};
use std::path::PathBuf;

use crate::envelope::decode_escaped_source;
use crate::gateway::{Gateway, GenerationRequest};
use crate::prompts;

const STAGE: &str = "unit tests";

#[derive(Debug)]
pub struct UnitTestSynthesizer<'a> {
    gateway: &'a Gateway,
}

impl<'a> UnitTestSynthesizer<'a> {
    pub fn new(gateway: &'a Gateway) -> Self {
        Self { gateway }
    }

    pub async fn synthesize(
        &self,
        store: &ArtifactStore,
        spec: &Specification,
        input: &Schema,
        output: &Schema,
    ) -> Result<TestSuite> {
        let run_id = store.context().run_id();
        let prompt = prompts::unit_test_prompt(input, output, spec);
        tracing::info!(
            run_id = %run_id,
            stage = STAGE,
            "Generating unit tests with prompt:\n{}",
            prompt
        );

        let reply = self
            .gateway
            .respond(GenerationRequest::prompt(prompt).json())
            .await?;
        tracing::info!(
            run_id = %run_id,
            stage = STAGE,
            "Raw LLM response: {}",
            reply.text()
        );

        let source = decode_escaped_source(STAGE, prompts::UNIT_TESTS_KEY, reply.text())?;
        tracing::info!(run_id = %run_id, stage = STAGE, "Generated unit tests: {}", source);
        Ok(TestSuite::new(source))
    }

    pub fn persist(&self, store: &ArtifactStore, tests: &TestSuite) -> Result<PathBuf> {
        store.write_text(TEST_SCRIPT_FILE, tests.source())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ScriptedClient;
    use scriptforge_core::{escape, ForgeError, RunContext, SchemaKind};
    use std::sync::Arc;

    fn fixtures() -> (tempfile::TempDir, ArtifactStore, Schema, Schema) {
        let root = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(RunContext::create(root.path()).unwrap());
        let input = Schema::new(SchemaKind::Input, serde_json::json!({"number1": "number"}));
        let output = Schema::new(SchemaKind::Output, serde_json::json!({"sum": "number"}));
        (root, store, input, output)
    }

    #[tokio::test]
    async fn test_envelope_decoded_and_persisted() {
        let (_root, store, input, output) = fixtures();
        let module = "import unittest\nfrom generated_script import add\n\nclass T(unittest.TestCase):\n    def test_add(self):\n        self.assertEqual(add({'a': 1}), \"1\")\n";
        let envelope = serde_json::json!({ "unit_tests": escape(module) }).to_string();
        let client = Arc::new(ScriptedClient::new(vec![Ok(envelope)]));
        let gateway = Gateway::new(client.clone());
        let synth = UnitTestSynthesizer::new(&gateway);

        let tests = synth
            .synthesize(&store, &Specification::from_text("add"), &input, &output)
            .await
            .unwrap();
        assert_eq!(tests.source(), module);
        assert!(client.requests()[0].json_mode);

        synth.persist(&store, &tests).unwrap();
        assert_eq!(store.read_text(TEST_SCRIPT_FILE).unwrap(), module);
    }

    #[tokio::test]
    async fn test_missing_key_propagates() {
        let (_root, store, input, output) = fixtures();
        let client = Arc::new(ScriptedClient::new(vec![Ok(r#"{"tests": ""}"#.into())]));
        let gateway = Gateway::new(client);

        let err = UnitTestSynthesizer::new(&gateway)
            .synthesize(&store, &Specification::from_text("add"), &input, &output)
            .await
            .unwrap_err();
        assert!(matches!(err, ForgeError::MissingKey { key: "unit_tests", .. }));
        assert!(!store.exists(TEST_SCRIPT_FILE));
    }
}
