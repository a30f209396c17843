//! Tag-field tokenization.

use std::sync::LazyLock;

use regex::Regex;

/// Separators accepted in the tag form field: commas, semicolons, whitespace.
static TAG_SEPARATOR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[,;\s]+").expect("tag separator regex should compile"));

/// Split a raw tag form field into labels.
///
/// Empty tokens are dropped and repeated labels within one submission
/// collapse to their first occurrence, order preserved.
pub fn split_tag_labels(field: &str) -> Vec<String> {
    let mut labels: Vec<String> = Vec::new();
    for token in TAG_SEPARATOR_REGEX.split(field) {
        if token.is_empty() {
            continue;
        }
        if !labels.iter().any(|seen| seen == token) {
            labels.push(token.to_string());
        }
    }
    labels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_comma_with_space() {
        assert_eq!(split_tag_labels("go, rust"), vec!["go", "rust"]);
    }

    #[test]
    fn splits_on_semicolons_and_whitespace_runs() {
        assert_eq!(
            split_tag_labels("a;b  c,,d"),
            vec!["a", "b", "c", "d"]
        );
    }

    #[test]
    fn empty_field_yields_no_labels() {
        assert!(split_tag_labels("").is_empty());
        assert!(split_tag_labels("  , ; ").is_empty());
    }

    #[test]
    fn duplicates_collapse_to_first_occurrence() {
        assert_eq!(split_tag_labels("go, rust, go"), vec!["go", "rust"]);
    }
}
