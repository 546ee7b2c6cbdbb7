//! Prompt templates for every generation stage.
//!
//! The worked examples are formatting exemplars only. They are escaped with
//! the pipeline codec and embedded in prompts, never executed.

use scriptforge_core::naming::{
    error_capture_name, payload_input_name, payload_output_name, TIMESTAMP_FORMAT,
};
use scriptforge_core::store::IMPLEMENTATION_MODULE;
use scriptforge_core::{escape, Schema, SchemaKind, Specification, TestSuite};

/// JSON key holding the escaped test module
pub const UNIT_TESTS_KEY: &str = "unit_tests";

/// JSON key holding the escaped implementation
pub const PYTHON_CODE_KEY: &str = "python_code";

/// Shown to the human before the first line is read
pub const WELCOME: &str = "Describe the key functionality of the script. \
The assistant will keep asking one question at a time until you are satisfied.";

/// Prompt for each line of human input
pub const INPUT_PROMPT: &str = "Your input (or type 'done' to finish): ";

pub const EXAMPLE_UNIT_TEST: &str = r#"
import unittest
from unittest.mock import patch
from generated_script import convert_temperature

class TestConvertTemperature(unittest.TestCase):

    def setUp(self):
        self.valid_input = {
            "value": 100,
            "from_unit": "celsius",
            "to_unit": "fahrenheit",
            "precision": 1
        }

    def test_celsius_to_fahrenheit(self):
        self.assertEqual(convert_temperature(self.valid_input), {"value": 212.0, "unit": "fahrenheit"})

    def test_fahrenheit_to_kelvin(self):
        data = dict(self.valid_input, value=32, from_unit="fahrenheit", to_unit="kelvin")
        self.assertEqual(convert_temperature(data), {"value": 273.1, "unit": "kelvin"})

    @patch('generated_script.return_gpt_response')
    def test_unit_alias_resolved_by_llm(self, mock_llm):
        mock_llm.return_value = '{"unit": "celsius"}'
        data = dict(self.valid_input, from_unit="degrees C")
        self.assertEqual(convert_temperature(data)["unit"], "fahrenheit")

    def test_missing_value(self):
        data = dict(self.valid_input)
        data.pop('value')
        with self.assertRaises(KeyError):
            convert_temperature(data)

    def test_non_numeric_value(self):
        data = dict(self.valid_input, value="hot")
        with self.assertRaises(ValueError):
            convert_temperature(data)

    def test_unsupported_unit(self):
        data = dict(self.valid_input, to_unit="rankine")
        with self.assertRaises(ValueError):
            convert_temperature(data)


if __name__ == '__main__':
    unittest.main()
"#;

pub const EXAMPLE_CODE: &str = r#"
import json
import logging
import datetime
from utils import return_gpt_response

logging.basicConfig(level=logging.INFO)
logger = logging.getLogger(__name__)

SCRIPT_NAME = "summarize_feed"

def read_json(file_path):
    with open(file_path, 'r') as file:
        return json.load(file)

def write_json(data, file_path):
    with open(file_path, 'w') as file:
        json.dump(data, file, indent=4)

def log_error(unique_id, timestamp, input_data, error_message):
    error_log = {
        "script_name": SCRIPT_NAME,
        "input_data": input_data,
        "error_message": error_message,
        "file_location": __file__
    }
    write_json(error_log, f"{unique_id}_{timestamp}_error.json")

def summarize_feed(input_data):
    items = input_data['items']
    if not isinstance(items, list):
        raise ValueError("items must be a list")
    logger.info("Summarizing %d items", len(items))
    prompt = f"Summarize these feed items as JSON with a 'summary' key: {json.dumps(items)}"
    summary = json.loads(return_gpt_response(prompt=prompt, return_json=True))
    return {"summary": summary["summary"], "count": len(items)}

def main(unique_id, timestamp):
    input_file = f"{unique_id}_{timestamp}_{SCRIPT_NAME}_input.json"
    output_file = f"{unique_id}_{timestamp}_{SCRIPT_NAME}_output.json"
    input_data = None
    try:
        input_data = read_json(input_file)
        write_json(summarize_feed(input_data), output_file)
    except Exception as e:
        log_error(unique_id, timestamp, input_data, str(e))
        raise

if __name__ == "__main__":
    main("unique_series_identifier", datetime.datetime.now().strftime('%Y%m%d_%H%M%S'))
"#;

/// Fixed rules every generated script must follow
pub fn generation_guidelines() -> String {
    let input = payload_input_name("(unique identifier)", "(timestamp)", "(script_name)");
    let output = payload_output_name("(unique identifier)", "(timestamp)", "(script_name)");
    let error = error_capture_name("(unique identifier)", "(timestamp)");
    format!(
        "1. The script should read JSON input from a file named in the format: {input}.\n\
         2. The script should write JSON output to a file named in the format: {output}.\n\
         3. Error logs should be stored in a file named {error}, containing the input data that caused the error, the error message, the script name, and the file location.\n\
         4. All scripts should handle input and output data in JSON format to ensure easy chaining.\n\
         5. The scripts should include detailed logging and error handling to facilitate debugging.\n\
         6. Use return_gpt_response(prompt: str, return_json: bool) to outsource complex tasks to an LLM.\n\
         7. Raise KeyError when a required input key is missing and ValueError when an input value has the wrong type or an unsupported value.\n\
         8. The timestamp in file names uses the strftime format {TIMESTAMP_FORMAT}.\n"
    )
}

/// Ask for exactly one follow-up question about the specification so far
pub fn clarification_prompt(spec: &Specification) -> String {
    format!(
        "Given the current specifications, clarify further details or add new aspects. \
         Only ask exactly one question. This process will continue until the user finishes. \
         At NO point in time may you stop asking questions.: {}\n\
         Remember, you are NOT allowed to stop asking questions -- though you should still ask \
         questions that add further clarity to the specifications.",
        spec.text()
    )
}

pub fn schema_prompt(kind: SchemaKind, spec: &Specification) -> String {
    format!(
        "Create a JSON schema for the {} of a function/script that follows this specification: {}",
        kind,
        spec.text()
    )
}

pub fn unit_test_prompt(input: &Schema, output: &Schema, spec: &Specification) -> String {
    format!(
        r#"Create a series of unit tests for a function/script.
The function/script input schema:
{input}
The expected output schema:
{output}
The tests should cover typical cases, edge cases, and erroneous cases.
Provide the tests in Python unittest format.

Note that these schemas are the expected input and output for the function/script that meet these requirements:
{requirements}

You MUST return a json object that contains the unit tests in Python unittest format. Escape the code so that newlines become \n and quotes become \' and \". Put those tests in the '{key}' key of the json object.

Example:
{{"{key}": "{example}"}}

Make special note that the tests should be escaped like they are in the example.

Assume that the function being tested has the same name as used in the unit tests. This function will be defined in '{module}.py' so the tests should import the functions from '{module}'.
"#,
        input = input.pretty(),
        output = output.pretty(),
        requirements = spec.text(),
        key = UNIT_TESTS_KEY,
        example = escape(EXAMPLE_UNIT_TEST),
        module = IMPLEMENTATION_MODULE,
    )
}

pub fn code_prompt(
    spec: &Specification,
    input: &Schema,
    output: &Schema,
    tests: &TestSuite,
) -> String {
    format!(
        r#"Here are the guidelines for the python script you'll be generating:
{guidelines}
Following this specification:
{requirements}

The input schema:
{input}
The output schema:
{output}

Your code must pass the following unit tests:
{tests}

You must return a JSON object with the generated function/script in the '{key}' property, escaped so that newlines become \n and quotes become \' and \".

Here's an example of the returned json object:

{{"{key}": "{example}"}}

Just respond with the code such that it can be run directly after unescaping it -- it should include all python libraries required to run the code.
"#,
        guidelines = generation_guidelines(),
        requirements = spec.text(),
        input = input.pretty(),
        output = output.pretty(),
        tests = tests.source(),
        key = PYTHON_CODE_KEY,
        example = escape(EXAMPLE_CODE),
    )
}
