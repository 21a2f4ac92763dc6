use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::Kommentar;

/// The transcripts carry invisible and ambiguous characters; they are
/// mapped to plain-text equivalents before anything is stored.
const CHAR_SUBSTITUTIONS: &[(char, &str)] = &[
    ('\u{00A0}', " "),
    ('\u{202F}', ""),
    ('\u{2013}', "-"),
    ('\u{201C}', "'"),
    ('\u{201E}', "'"),
];

pub fn clean_text(text: &str) -> String {
    let mut cleaned = String::with_capacity(text.len());
    for c in text.chars() {
        match CHAR_SUBSTITUTIONS.iter().find(|(from, _)| *from == c) {
            Some((_, replacement)) => cleaned.push_str(replacement),
            None => cleaned.push(c),
        }
    }
    cleaned
}

static KOMMENTAR_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([A-Za-zäöüÄÖÜßğ\.\s]+) \[([A-Za-z0-9äöüÄÖÜß\s/]+)\]: (.+)").unwrap()
});

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Collapses whitespace runs to single spaces. Role descriptions wrap
/// across lines in the source documents and have to be normalized before
/// they can serve as dictionary keys.
pub fn normalize_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

/// Splits an interjection paragraph into its individual comments.
///
/// One `kommentar` element may record several interjections separated by
/// `-`. Each segment matching `<Name> [<Fraktion>]: <text>` becomes one
/// [`Kommentar`]; a closing parenthesis left over from the enclosing
/// `(...)` wrapper is stripped from the text.
pub fn extract_comments(comment: &str) -> Vec<Kommentar> {
    let mut comments = Vec::new();
    for segment in comment.split('-') {
        for caps in KOMMENTAR_PATTERN.captures_iter(segment) {
            let text = caps[3].trim_end_matches(')');
            comments.push(Kommentar {
                kommentator: caps[1].trim().to_string(),
                fraktion: caps[2].trim().to_string(),
                text: text.trim().to_string(),
            });
        }
    }
    comments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_substitutions() {
        let raw = "Guten\u{00A0}Tag \u{2013} \u{201C}Zitat\u{201E}\u{202F}Ende";
        assert_eq!(clean_text(raw), "Guten Tag - 'Zitat'Ende");
    }

    #[test]
    fn test_clean_text_is_idempotent() {
        let raw = "Ein\u{00A0}Text mit \u{2013} allem\u{202F}Drum und \u{201E}Dran\u{201C}";
        let once = clean_text(raw);
        let twice = clean_text(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_extract_single_comment_strips_trailing_paren() {
        let comments = extract_comments("Redner [SPD]: Das ist nicht korrekt.)");
        assert_eq!(
            comments,
            vec![Kommentar {
                kommentator: "Redner".to_string(),
                fraktion: "SPD".to_string(),
                text: "Das ist nicht korrekt.".to_string(),
            }]
        );
    }

    #[test]
    fn test_extract_multiple_comments_split_on_hyphen() {
        let comments = extract_comments(
            "(Beifall bei der SPD - Max Mustermann [CDU/CSU]: Sehr richtig! - Dr. Eva Beispiel [BÜNDNIS 90/DIE GRÜNEN]: Eben!)",
        );
        // the applause segment has no speaker pattern and yields nothing
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].kommentator, "Max Mustermann");
        assert_eq!(comments[0].fraktion, "CDU/CSU");
        assert_eq!(comments[0].text, "Sehr richtig!");
        assert_eq!(comments[1].kommentator, "Dr. Eva Beispiel");
        assert_eq!(comments[1].text, "Eben!");
    }

    #[test]
    fn test_extract_comments_ignores_plain_applause() {
        assert!(extract_comments("(Beifall bei der SPD und der FDP)").is_empty());
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(
            normalize_whitespace("  Präsidentin  des\n   Deutschen Bundestages "),
            "Präsidentin des Deutschen Bundestages"
        );
    }
}
