//! Turns raw, possibly truncated summary replies into closed sentences.

/// Normalizes a raw reply against a character `budget`.
///
/// A reply that reached the budget without a dangling comma or trailing
/// "and" is returned trimmed. Anything else has trailing commas, spaces and
/// a final "and" stripped, then gets a period unless it already ends in
/// terminal punctuation.
#[must_use]
pub fn normalize(raw: &str, budget: usize) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let dangling = trimmed.ends_with(',') || ends_with_and(trimmed);
    if !dangling && trimmed.chars().count() >= budget {
        return trimmed.to_string();
    }

    let mut text = strip_trailing_separators(trimmed);
    while ends_with_and(text) {
        text = strip_trailing_separators(&text[..text.len() - "and".len()]);
    }

    if text.is_empty() {
        return String::new();
    }
    if text.ends_with(['.', '!', '?']) {
        text.to_string()
    } else {
        format!("{text}.")
    }
}

fn strip_trailing_separators(text: &str) -> &str {
    text.trim_end_matches([',', ' ', '\t', '\n', '\r'])
}

/// `true` when `text` ends with the standalone word "and".
fn ends_with_and(text: &str) -> bool {
    let Some(head) = text.strip_suffix("and") else {
        return false;
    };
    head.is_empty() || head.ends_with(|c: char| c.is_whitespace() || c == ',')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closes_truncated_enumeration() {
        assert_eq!(normalize("Computes the sum, logs it, and", 50), "Computes the sum, logs it.");
    }

    #[test]
    fn complete_reply_at_budget_is_unchanged() {
        let reply = "Returns the cached value.";
        assert_eq!(normalize(reply, 10), reply);
    }

    #[test]
    fn long_reply_without_punctuation_is_unchanged_at_budget() {
        assert_eq!(normalize("Validates the input", 5), "Validates the input");
    }

    #[test]
    fn short_reply_gets_a_period() {
        assert_eq!(normalize("Adds two numbers", 50), "Adds two numbers.");
    }

    #[test]
    fn trailing_commas_and_spaces_are_stripped() {
        assert_eq!(normalize("Parses the header, ,  ", 50), "Parses the header.");
        assert_eq!(normalize("Opens the file,", 5), "Opens the file.");
    }

    #[test]
    fn word_ending_in_and_is_not_stripped() {
        assert_eq!(normalize("Loads the brand", 50), "Loads the brand.");
        assert_eq!(normalize("Starts the command", 50), "Starts the command.");
    }

    #[test]
    fn normalization_is_idempotent() {
        for (raw, budget) in [
            ("Computes the sum, logs it, and", 50),
            ("Returns the cached value.", 10),
            ("Adds two numbers", 50),
            ("Handles X, Y, and", 8),
            ("Does the thing!", 100),
        ] {
            let once = normalize(raw, budget);
            assert_eq!(normalize(&once, budget), once, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn empty_or_conjunction_only_reply_collapses_to_empty() {
        assert_eq!(normalize("   ", 10), "");
        assert_eq!(normalize("and", 10), "");
    }
}
