use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::routing::types::FieldValue;

const PUNCTUATION_REPLACEMENTS: [(char, char); 11] = [
    // dashes
    ('\u{2012}', '-'),
    ('\u{2013}', '-'),
    ('\u{2014}', '-'),
    ('\u{2015}', '-'),
    ('\u{2212}', '-'),
    // double quotes, including Hebrew gershayim
    ('\u{201C}', '"'),
    ('\u{201D}', '"'),
    ('\u{05F4}', '"'),
    // single quotes, including Hebrew geresh
    ('\u{2018}', '\''),
    ('\u{2019}', '\''),
    ('\u{05F3}', '\''),
];

/// NFKC plus ASCII quotes and hyphens. Safe for display and cut-point search.
pub fn normalize_quotes_and_dashes(text: &str) -> String {
    text.nfkc().map(replace_punctuation).collect()
}

/// Heavy normalization used only for equality and similarity checks.
pub fn normalize_for_matching(text: &str) -> String {
    let unified = normalize_quotes_and_dashes(text);
    let mut output = String::with_capacity(unified.len());
    let mut previous_space = true;
    for character in unified.chars() {
        if is_kept(character) {
            output.push(character);
            previous_space = false;
        } else if !previous_space {
            output.push(' ');
            previous_space = true;
        }
    }

    output.trim_end().to_string()
}

/// Non-text values normalize to an empty string.
pub fn normalize_field(value: Option<&FieldValue>) -> String {
    value
        .and_then(FieldValue::as_text)
        .map(normalize_quotes_and_dashes)
        .unwrap_or_default()
}

pub fn normalize_field_for_matching(value: Option<&FieldValue>) -> String {
    value
        .and_then(FieldValue::as_text)
        .map(normalize_for_matching)
        .unwrap_or_default()
}

fn replace_punctuation(character: char) -> char {
    PUNCTUATION_REPLACEMENTS
        .iter()
        .find(|(source, _)| *source == character)
        .map(|(_, target)| *target)
        .unwrap_or(character)
}

// Whitespace is re-emitted as a single separator, not kept.
fn is_kept(character: char) -> bool {
    character.is_alphanumeric()
        || is_combining_mark(character)
        || matches!(character, '"' | '\'' | '-')
}

#[cfg(test)]
mod tests {
    use super::{normalize_field, normalize_for_matching, normalize_quotes_and_dashes};
    use crate::routing::types::FieldValue;

    #[test]
    fn dash_and_quote_variants_become_ascii() {
        assert_eq!(
            normalize_quotes_and_dashes("רו״ח דן\u{2013}לוי \u{201C}x\u{201D} \u{2019}"),
            "רו\"ח דן-לוי \"x\" '"
        );
    }

    #[test]
    fn display_normalization_keeps_spacing_and_letters() {
        assert_eq!(normalize_quotes_and_dashes("  a  b. "), "  a  b. ");
    }

    #[test]
    fn matching_normalization_strips_symbols_and_collapses_spaces() {
        assert_eq!(normalize_for_matching("  I.D   Cyber,Solutions!  "), "I D Cyber Solutions");
        assert_eq!(normalize_for_matching("רו\"ח_אילן_קאופמן"), "רו\"ח אילן קאופמן");
        assert_eq!(normalize_for_matching("...!!"), "");
    }

    #[test]
    fn matching_normalization_keeps_any_script_letters_and_marks() {
        assert_eq!(normalize_for_matching("Straße 42, Київ"), "Straße 42 Київ");
        let pointed = normalize_for_matching("שָׁלוֹם עֲלֵיכֶם");
        assert_eq!(pointed.split(' ').count(), 2);
    }

    #[test]
    fn normalization_is_idempotent() {
        let samples = [
            "",
            "   ",
            "רו״ח  אהרון – פארדו!!",
            "I.D Cyber Solutions",
            "ﬁle\u{00A0}name’s — test",
            "a\t\nb",
            "\"'-",
        ];
        for sample in samples {
            let once = normalize_for_matching(sample);
            assert_eq!(normalize_for_matching(&once), once);
            let display = normalize_quotes_and_dashes(sample);
            assert_eq!(normalize_quotes_and_dashes(&display), display);
        }
    }

    #[test]
    fn non_text_fields_normalize_to_empty() {
        assert_eq!(normalize_field(None), "");
        assert_eq!(normalize_field(Some(&FieldValue::Number(3.0))), "");
        assert_eq!(normalize_field(Some(&FieldValue::Empty)), "");
    }
}
