use std::sync::OnceLock;

use regex::Regex;
use stockpick_models::{Candidate, UNKNOWN_IDENTIFIER};

fn is_separator(c: char) -> bool {
    matches!(c, ':' | '-' | '–') || c.is_whitespace()
}

/// Leading ticker, then at least one separator (colon, hyphen, en dash or
/// whitespace), then the rationale. The rationale may span lines.
fn pick_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?s)\A([A-Z]{1,5})[:\-–\s]+(.+)\z").expect("pick pattern is valid")
    })
}

/// Structured form of a pick response.
///
/// Malformed responses carry [`UNKNOWN_IDENTIFIER`] and the whole trimmed text
/// as rationale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedResponse {
    pub identifier: String,
    pub rationale: String,
}

impl ParsedResponse {
    pub fn is_malformed(&self) -> bool {
        self.identifier == UNKNOWN_IDENTIFIER
    }

    pub fn into_candidate(self) -> Option<Candidate> {
        if self.is_malformed() {
            return None;
        }
        Some(Candidate::new(self.identifier, self.rationale))
    }
}

/// Extract `(ticker, rationale)` from free text such as `"NVDA - Earnings beat"`.
///
/// Matching is anchored at the start and case-sensitive. Never fails.
pub fn parse_pick_response(raw: &str) -> ParsedResponse {
    let trimmed = raw.trim();

    if let Some(caps) = pick_pattern().captures(trimmed) {
        // The separator run may backtrack and leave separators in the rationale.
        let rationale = caps[2].trim_start_matches(is_separator).trim_end();
        if !rationale.is_empty() {
            return ParsedResponse {
                identifier: caps[1].to_string(),
                rationale: rationale.to_string(),
            };
        }
    }

    ParsedResponse {
        identifier: UNKNOWN_IDENTIFIER.to_string(),
        rationale: trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dash_separated() {
        let parsed = parse_pick_response("XYZ - some reason");
        assert_eq!(parsed.identifier, "XYZ");
        assert_eq!(parsed.rationale, "some reason");
        assert!(!parsed.is_malformed());
    }

    #[test]
    fn not_a_ticker() {
        let parsed = parse_pick_response("not a ticker at all");
        assert_eq!(parsed.identifier, "UNKNOWN");
        assert_eq!(parsed.rationale, "not a ticker at all");
        assert!(parsed.into_candidate().is_none());
    }

    #[test]
    fn ticker_on_its_own_line() {
        let parsed = parse_pick_response("\n  SMCI\nAdded to the S&P 500 effective Monday.\n");
        assert_eq!(parsed.identifier, "SMCI");
        assert_eq!(parsed.rationale, "Added to the S&P 500 effective Monday.");
    }

    #[test]
    fn colon_and_en_dash_separators() {
        assert_eq!(parse_pick_response("AMD: new AI chip").identifier, "AMD");
        let parsed = parse_pick_response("RIVN – recall resolved early");
        assert_eq!(parsed.identifier, "RIVN");
        assert_eq!(parsed.rationale, "recall resolved early");
    }

    #[test]
    fn multi_line_rationale() {
        let parsed = parse_pick_response("MRNA\nFDA approval this morning.\nVolume 5x average.");
        assert_eq!(parsed.identifier, "MRNA");
        assert_eq!(
            parsed.rationale,
            "FDA approval this morning.\nVolume 5x average."
        );
    }

    #[test]
    fn six_letters_is_malformed() {
        let parsed = parse_pick_response("ABCDEF - too long");
        assert!(parsed.is_malformed());
        assert_eq!(parsed.rationale, "ABCDEF - too long");
    }

    #[test]
    fn lowercase_is_malformed() {
        assert!(parse_pick_response("aapl - lowercase").is_malformed());
    }

    #[test]
    fn not_anchored_mid_text() {
        assert!(parse_pick_response("My pick is NVDA - earnings").is_malformed());
    }

    #[test]
    fn ticker_without_rationale_is_malformed() {
        assert!(parse_pick_response("TSLA").is_malformed());
        assert!(parse_pick_response("TSLA -  ").is_malformed());
        assert!(parse_pick_response("TSLA : -").is_malformed());
        assert!(parse_pick_response("GME\n--\n").is_malformed());
    }

    #[test]
    fn doubled_separators_are_stripped() {
        let parsed = parse_pick_response("PLTR - - defense contract");
        assert_eq!(parsed.identifier, "PLTR");
        assert_eq!(parsed.rationale, "defense contract");
    }

    #[test]
    fn trailing_dash_in_rationale_is_kept() {
        let parsed = parse_pick_response("AMC - squeeze -");
        assert_eq!(parsed.rationale, "squeeze -");
    }

    #[test]
    fn single_capital_letter_word_reads_as_ticker() {
        let parsed = parse_pick_response("I would rather not say.");
        assert_eq!(parsed.identifier, "I");
        assert!(parse_pick_response("i would rather not say.").is_malformed());
    }

    #[test]
    fn markdown_wrapped_ticker_is_malformed() {
        assert!(parse_pick_response("**NVDA** - earnings").is_malformed());
    }

    #[test]
    fn empty_input() {
        let parsed = parse_pick_response("   ");
        assert!(parsed.is_malformed());
        assert_eq!(parsed.rationale, "");
    }
}
