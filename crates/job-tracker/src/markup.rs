//! Extraction of progress facts from the backend's markup fragment.
//!
//! The backend reports progress as a tiny HTML snippet containing a
//! `<progress>` bar and a `<span>` message. The exact shape is an external,
//! unvalidated contract, so all knowledge of it is confined to this module.

use std::sync::LazyLock;

use regex::Regex;

static PROGRESS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<progress value="(\d+)" max="100"></progress>"#).unwrap()
});

static MESSAGE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<span>(.*?)</span>").unwrap());

/// Pull the percentage and message out of a progress markup fragment.
///
/// Either component may be absent; absence yields `None` for that field and
/// never an error. Percentages that do not fit 0-255 are treated as absent.
pub fn extract_progress(html: &str) -> (Option<u8>, Option<String>) {
    let percentage = PROGRESS_RE
        .captures(html)
        .and_then(|captures| captures[1].parse::<u8>().ok());
    let message = MESSAGE_RE
        .captures(html)
        .map(|captures| captures[1].to_string());
    (percentage, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_both_fields() {
        let html = r#"<div><progress value="42" max="100"></progress><span>Sampling 11/25</span></div>"#;
        assert_eq!(
            extract_progress(html),
            (Some(42), Some("Sampling 11/25".to_string()))
        );
    }

    #[test]
    fn missing_progress_bar_yields_none() {
        let html = "<span>Starting up</span>";
        assert_eq!(extract_progress(html), (None, Some("Starting up".to_string())));
    }

    #[test]
    fn missing_message_yields_none() {
        let html = r#"<progress value="7" max="100"></progress>"#;
        assert_eq!(extract_progress(html), (Some(7), None));
    }

    #[test]
    fn empty_fragment_yields_nothing() {
        assert_eq!(extract_progress(""), (None, None));
    }

    #[test]
    fn message_match_is_non_greedy() {
        let html = "<span>first</span><span>second</span>";
        assert_eq!(extract_progress(html).1, Some("first".to_string()));
    }

    #[test]
    fn boundary_values() {
        let zero = r#"<progress value="0" max="100"></progress>"#;
        let full = r#"<progress value="100" max="100"></progress>"#;
        assert_eq!(extract_progress(zero).0, Some(0));
        assert_eq!(extract_progress(full).0, Some(100));
    }

    #[test]
    fn malformed_bar_is_ignored() {
        // Different max attribute: not our contract, treated as absent.
        let html = r#"<progress value="42" max="50"></progress>"#;
        assert_eq!(extract_progress(html).0, None);
    }
}
