//! Removal of `<think>...</think>` blocks before output is forwarded

use regex::Regex;
use std::sync::OnceLock;

fn reasoning_block() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?s)<think>.*?</think>").expect("valid reasoning pattern")
    })
}

/// Strip every reasoning block, markers included
///
/// Repeats until nothing matches, so removing one block can never leave a
/// new one behind.
pub fn strip_reasoning(text: &str) -> String {
    let pattern = reasoning_block();
    let mut cleaned = pattern.replace_all(text, "").into_owned();
    while pattern.is_match(&cleaned) {
        cleaned = pattern.replace_all(&cleaned, "").into_owned();
    }
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_multiline_block() {
        let text = "<think>\nlet me see\nhmm\n</think>\nThe answer is 4.";
        assert_eq!(strip_reasoning(text), "\nThe answer is 4.");
    }

    #[test]
    fn test_strips_every_block() {
        let text = "a<think>one</think>b<think>two</think>c";
        assert_eq!(strip_reasoning(text), "abc");
    }

    #[test]
    fn test_is_idempotent() {
        let inputs = [
            "plain text",
            "x<think>y</think>z",
            "<thi<think>inner</think>nk>outer</think>done",
            "<think>unterminated",
        ];
        for input in inputs {
            let once = strip_reasoning(input);
            assert_eq!(strip_reasoning(&once), once, "input: {input}");
        }
    }

    #[test]
    fn test_nested_leftover_is_removed() {
        assert_eq!(
            strip_reasoning("<thi<think>inner</think>nk>outer</think>done"),
            "done"
        );
    }

    #[test]
    fn test_unterminated_block_is_kept() {
        assert_eq!(strip_reasoning("<think>unterminated"), "<think>unterminated");
    }
}
