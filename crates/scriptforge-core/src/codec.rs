//! Narrow escape codec for moving source text through a JSON envelope.
//!
//! Only three sequences are handled: newline, single quote and double quote.
//! Any other backslash sequence passes through [`unescape`] untouched.

/// Escape newlines and both quote characters.
pub fn escape(source: &str) -> String {
    source
        .replace('\n', "\\n")
        .replace('\'', "\\'")
        .replace('"', "\\\"")
}

/// Reverse [`escape`]. The substitution order is fixed: `\n`, then `\'`, then `\"`.
pub fn unescape(escaped: &str) -> String {
    escaped
        .replace("\\n", "\n")
        .replace("\\'", "'")
        .replace("\\\"", "\"")
}

/// Strip stray quote characters wrapped around a decoded module.
///
/// Leading and trailing `"` are removed first, then `'`.
pub fn strip_wrapping_quotes(source: &str) -> &str {
    source.trim_matches('"').trim_matches('\'')
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_escape_handles_three_sequences() {
        let source = "print('hi')\nx = \"y\"";
        assert_eq!(escape(source), "print(\\'hi\\')\\nx = \\\"y\\\"");
    }

    #[test]
    fn test_unescape_passes_other_sequences_through() {
        assert_eq!(unescape("a\\tb\\\\c"), "a\\tb\\\\c");
        assert_eq!(unescape("line\\nnext"), "line\nnext");
    }

    #[test]
    fn test_unescape_of_already_decoded_text_is_identity() {
        let module = "import unittest\n\nclass T(unittest.TestCase):\n    pass\n";
        assert_eq!(unescape(module), module);
    }

    #[test]
    fn test_strip_wrapping_quotes() {
        assert_eq!(strip_wrapping_quotes("\"import os\""), "import os");
        assert_eq!(strip_wrapping_quotes("'import os'"), "import os");
        assert_eq!(strip_wrapping_quotes("\"'x = 1'\""), "x = 1");
        assert_eq!(strip_wrapping_quotes("x = 1"), "x = 1");
    }

    proptest! {
        #[test]
        fn prop_round_trip(source in "[a-zA-Z0-9 _=():#.,\n'\"]{0,200}") {
            prop_assert_eq!(unescape(&escape(&source)), source);
        }
    }
}
