//! E2E Test: Script generation pipeline
//!
//! Drives the full workflow with a scripted generation client. Most runs use
//! `sh` as the test interpreter so they do not need Python; the concrete
//! add-two-numbers scenario runs only when `python3` is installed.

use async_trait::async_trait;
use scriptforge_agent::providers::ScriptedClient;
use scriptforge_agent::{Gateway, Interlocutor, Pipeline};
use scriptforge_core::store::{
    FINAL_SCRIPT_FILE, IMPLEMENTATION_FILE, INPUT_SCHEMA_FILE, OUTPUT_SCHEMA_FILE,
    TEST_SCRIPT_FILE,
};
use scriptforge_core::{escape, ArtifactStore, ForgeError, Result, RunContext};
use scriptforge_sandbox::{interpreter_available, Validator};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

const INPUT_SCHEMA: &str = r#"{"type": "object", "properties": {"number1": {"type": "number"}, "number2": {"type": "number"}, "language": {"type": "string", "enum": ["Python", "JavaScript", "Go"]}}, "required": ["number1", "number2", "language"]}"#;
const OUTPUT_SCHEMA: &str = r#"{"type": "object", "properties": {"sum": {"type": "number"}}, "required": ["sum"]}"#;

const SH_TESTS: &str = ". ./generated_script.py\n\
result=$(add 10 20)\n\
if [ \"$result\" != '30' ]; then\n\
  echo \"expected 30, got $result\" >&2\n\
  exit 1\n\
fi\n";

const SH_GOOD: &str = "add() {\n  echo $(($1 + $2))\n}\n";
const SH_BAD: &str = "add() {\n  echo $(($1 - $2))\n}\n";

const PY_TESTS: &str = r#"import unittest
from generated_script import add_two_numbers

class TestAddTwoNumbers(unittest.TestCase):

    def test_sum(self):
        data = {"number1": 10, "number2": 20, "language": "Python"}
        self.assertEqual(add_two_numbers(data), {"sum": 30})

    def test_invalid_language(self):
        data = {"number1": 10, "number2": 20, "language": "InvalidLang"}
        with self.assertRaises(ValueError):
            add_two_numbers(data)

    def test_missing_number2(self):
        data = {"number1": 10, "language": "Python"}
        with self.assertRaises(KeyError):
            add_two_numbers(data)


if __name__ == '__main__':
    unittest.main()
"#;

const PY_IMPL: &str = r#"import logging

logger = logging.getLogger(__name__)

SUPPORTED_LANGUAGES = ["Python", "JavaScript", "Go"]

def add_two_numbers(input_data):
    number1 = input_data['number1']
    number2 = input_data['number2']
    language = input_data['language']
    if language not in SUPPORTED_LANGUAGES:
        raise ValueError("Unsupported language")
    if not isinstance(number1, (int, float)) or not isinstance(number2, (int, float)):
        raise ValueError("numbers required")
    logger.info("adding %s and %s", number1, number2)
    return {"sum": number1 + number2}
"#;

#[derive(Default)]
struct ScriptedHuman {
    lines: VecDeque<String>,
    relayed: Vec<String>,
}

#[async_trait]
impl Interlocutor for ScriptedHuman {
    async fn read_line(&mut self, _prompt: &str) -> Result<String> {
        self.lines
            .pop_front()
            .ok_or_else(|| ForgeError::Input("no more input".into()))
    }

    async fn relay(&mut self, question: &str) -> Result<()> {
        self.relayed.push(question.to_string());
        Ok(())
    }
}

fn envelope(key: &str, source: &str) -> String {
    serde_json::json!({ key: escape(source) }).to_string()
}

fn synthesis_responses(tests: &str, candidate: &str) -> Vec<anyhow::Result<String>> {
    vec![
        Ok(INPUT_SCHEMA.to_string()),
        Ok(OUTPUT_SCHEMA.to_string()),
        Ok(envelope("unit_tests", tests)),
        Ok(envelope("python_code", candidate)),
    ]
}

struct Harness {
    _root: tempfile::TempDir,
    store: ArtifactStore,
    client: Arc<ScriptedClient>,
    pipeline: Pipeline,
}

fn harness(responses: Vec<anyhow::Result<String>>, interpreter: &str) -> Harness {
    let root = tempfile::tempdir().unwrap();
    let store = ArtifactStore::new(RunContext::create(root.path()).unwrap());
    let client = Arc::new(ScriptedClient::new(responses));
    let pipeline = Pipeline::new(
        Gateway::new(client.clone()),
        Validator::new(interpreter).with_timeout(Duration::from_secs(60)),
    );
    Harness {
        _root: root,
        store,
        client,
        pipeline,
    }
}

#[tokio::test]
async fn e2e_passing_candidate_is_persisted() {
    let h = harness(synthesis_responses(SH_TESTS, SH_GOOD), "sh");
    let mut human = ScriptedHuman::default();

    let outcome = h
        .pipeline
        .run(&h.store, Some("add two numbers".into()), &mut human)
        .await
        .unwrap();

    assert!(outcome.verdict.passed, "stderr: {}", outcome.verdict.stderr);
    assert!(outcome.accepted());
    assert_eq!(outcome.run_id, h.store.context().run_id());
    assert_eq!(h.store.read_text(FINAL_SCRIPT_FILE).unwrap(), SH_GOOD);
    assert_eq!(h.store.read_text(TEST_SCRIPT_FILE).unwrap(), SH_TESTS);
    assert!(h.store.exists(INPUT_SCHEMA_FILE));
    assert!(h.store.exists(OUTPUT_SCHEMA_FILE));

    // two schema calls, one test call, one code call; all structured JSON
    let requests = h.client.requests();
    assert_eq!(requests.len(), 4);
    assert!(requests.iter().all(|r| r.json_mode));
    assert!(requests[0].messages[1].content.contains("JSON schema for the input"));
    assert!(requests[1].messages[1].content.contains("JSON schema for the output"));
    assert!(requests[2].messages[1].content.contains("unit_tests"));
    assert!(requests[3].messages[1].content.contains(SH_TESTS));
    assert!(human.relayed.is_empty());
}

#[tokio::test]
async fn e2e_failing_candidate_is_not_persisted() {
    let h = harness(synthesis_responses(SH_TESTS, SH_BAD), "sh");
    let mut human = ScriptedHuman::default();

    let outcome = h
        .pipeline
        .run(&h.store, Some("add two numbers".into()), &mut human)
        .await
        .unwrap();

    assert!(!outcome.verdict.passed);
    assert_eq!(outcome.verdict.exit_code, Some(1));
    assert!(outcome.verdict.stderr.contains("expected 30, got -10"));
    assert!(!outcome.accepted());
    assert!(!h.store.exists(FINAL_SCRIPT_FILE));

    // intermediate artifacts remain
    assert!(h.store.exists(INPUT_SCHEMA_FILE));
    assert!(h.store.exists(OUTPUT_SCHEMA_FILE));
    assert!(h.store.exists(TEST_SCRIPT_FILE));
    assert!(h.store.exists(IMPLEMENTATION_FILE));
    assert_eq!(h.client.calls(), 4);
}

#[tokio::test]
async fn e2e_non_json_schema_aborts_before_validation() {
    let h = harness(vec![Ok("I think the input should be two numbers.".into())], "sh");
    let mut human = ScriptedHuman::default();

    let err = h
        .pipeline
        .run(&h.store, Some("add two numbers".into()), &mut human)
        .await
        .unwrap_err();

    assert!(matches!(err, ForgeError::Decode { stage: "schema", .. }));
    assert_eq!(h.client.calls(), 1);
    assert!(!h.store.exists(INPUT_SCHEMA_FILE));
    assert!(!h.store.exists(TEST_SCRIPT_FILE));
    assert!(!h.store.exists(IMPLEMENTATION_FILE));
    assert!(!h.store.exists(FINAL_SCRIPT_FILE));
}

#[tokio::test]
async fn e2e_missing_code_key_aborts_without_final_artifact() {
    let mut responses = synthesis_responses(SH_TESTS, SH_GOOD);
    responses[3] = Ok(r#"{"code": "add() { :; }"}"#.to_string());
    let h = harness(responses, "sh");
    let mut human = ScriptedHuman::default();

    let err = h
        .pipeline
        .run(&h.store, Some("add two numbers".into()), &mut human)
        .await
        .unwrap_err();

    assert!(matches!(err, ForgeError::MissingKey { key: "python_code", .. }));
    assert!(h.store.exists(TEST_SCRIPT_FILE));
    assert!(!h.store.exists(IMPLEMENTATION_FILE));
    assert!(!h.store.exists(FINAL_SCRIPT_FILE));
}

#[tokio::test]
async fn e2e_interactive_requirements() {
    let mut responses = vec![
        Ok("Should decimals be supported?".to_string()),
        Ok("What should happen with invalid input?".to_string()),
    ];
    responses.extend(synthesis_responses(SH_TESTS, SH_GOOD));
    let h = harness(responses, "sh");
    let mut human = ScriptedHuman {
        lines: ["add two numbers", "only integers", "done"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        relayed: Vec::new(),
    };

    let outcome = h.pipeline.run(&h.store, None, &mut human).await.unwrap();

    assert!(outcome.accepted());
    assert_eq!(human.relayed.len(), 2);
    let spec = outcome.specification.text();
    assert!(spec.starts_with("\nUser: add two numbers\nLLM: Should decimals be supported?"));
    assert!(spec.ends_with("\nUser: done"));

    let requests = h.client.requests();
    assert_eq!(requests.len(), 6);
    assert!(!requests[0].json_mode && !requests[1].json_mode);
    assert!(requests[2].messages[1].content.contains("\nUser: done"));
}

#[tokio::test]
async fn e2e_blank_requirements_fall_back_to_dialogue() {
    for supplied in ["", "  \n"] {
        let mut responses = vec![Ok("Which number types?".to_string())];
        responses.extend(synthesis_responses(SH_TESTS, SH_GOOD));
        let h = harness(responses, "sh");
        let mut human = ScriptedHuman {
            lines: ["add two numbers", "done"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            relayed: Vec::new(),
        };

        let outcome = h
            .pipeline
            .run(&h.store, Some(supplied.to_string()), &mut human)
            .await
            .unwrap();

        assert!(human.lines.is_empty());
        assert_eq!(human.relayed, vec!["Which number types?".to_string()]);
        assert_eq!(
            outcome.specification.text(),
            "\nUser: add two numbers\nLLM: Which number types?\nUser: done"
        );
        let requests = h.client.requests();
        assert_eq!(requests.len(), 5);
        assert!(requests[1].messages[1]
            .content
            .ends_with("\nUser: add two numbers\nLLM: Which number types?\nUser: done"));
    }
}

#[tokio::test]
async fn e2e_add_two_numbers_in_python() {
    let probe = tempfile::tempdir().unwrap();
    if !interpreter_available("python3", probe.path()).await {
        eprintln!("python3 not available; skipping");
        return;
    }

    let h = harness(synthesis_responses(PY_TESTS, PY_IMPL), "python3");
    let mut human = ScriptedHuman::default();
    let outcome = h
        .pipeline
        .run(&h.store, Some("add two numbers".into()), &mut human)
        .await
        .unwrap();

    assert!(outcome.verdict.passed, "stderr: {}", outcome.verdict.stderr);
    assert_eq!(h.store.read_text(FINAL_SCRIPT_FILE).unwrap(), PY_IMPL);
}

#[tokio::test]
async fn e2e_python_import_failure_is_a_plain_failure() {
    let probe = tempfile::tempdir().unwrap();
    if !interpreter_available("python3", probe.path()).await {
        eprintln!("python3 not available; skipping");
        return;
    }

    let broken = "def add_two_numbers(input_data)\n    return {}\n";
    let h = harness(synthesis_responses(PY_TESTS, broken), "python3");
    let mut human = ScriptedHuman::default();
    let outcome = h
        .pipeline
        .run(&h.store, Some("add two numbers".into()), &mut human)
        .await
        .unwrap();

    assert!(!outcome.verdict.passed);
    assert!(matches!(outcome.verdict.exit_code, Some(code) if code != 0));
    assert!(outcome.verdict.stderr.contains("SyntaxError"));
    assert!(!h.store.exists(FINAL_SCRIPT_FILE));
}
