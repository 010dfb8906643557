//! Removal of `<think>...</think>` reasoning markup from model output.

const OPEN: &str = "<think>";
const CLOSE: &str = "</think>";

/// Strip every reasoning block and trim the result.
///
/// An opening tag without a matching close drops everything after it.
/// A close tag with no opening tag drops everything before it (some models
/// omit the opening tag when the prompt template injects it).
pub fn strip_reasoning(text: &str) -> String {
    let mut rest = text;
    if !rest.contains(OPEN) {
        if let Some(pos) = rest.rfind(CLOSE) {
            rest = &rest[pos + CLOSE.len()..];
        }
    }

    let mut out = String::with_capacity(rest.len());
    while let Some(start) = rest.find(OPEN) {
        out.push_str(&rest[..start]);
        let after_open = &rest[start + OPEN.len()..];
        match after_open.find(CLOSE) {
            Some(end) => rest = &after_open[end + CLOSE.len()..],
            None => {
                rest = "";
                break;
            }
        }
    }
    out.push_str(rest);
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_trimmed_only() {
        assert_eq!(strip_reasoning("  hello there \n"), "hello there");
    }

    #[test]
    fn test_single_block_removed() {
        assert_eq!(
            strip_reasoning("<think>user wants a joke</think>\nWhy did the crab..."),
            "Why did the crab..."
        );
    }

    #[test]
    fn test_multiple_blocks_removed() {
        assert_eq!(
            strip_reasoning("a <think>x</think>b<think>y\nz</think> c"),
            "a b c"
        );
    }

    #[test]
    fn test_unterminated_block_drops_remainder() {
        assert_eq!(strip_reasoning("Answer first. <think>still going"), "Answer first.");
    }

    #[test]
    fn test_orphan_close_tag_drops_prefix() {
        assert_eq!(strip_reasoning("hidden musings</think> visible"), "visible");
    }

    #[test]
    fn test_only_reasoning_yields_empty() {
        assert_eq!(strip_reasoning("<think>nothing to say</think>"), "");
    }
}
