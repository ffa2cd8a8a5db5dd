use std::collections::HashSet;

const RESERVED: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];
const FALLBACK_STEM: &str = "bucket";
// Leaves room for a collision suffix and `.csv` under the common 255-byte limit.
const MAX_STEM_BYTES: usize = 200;

/// Makes a bucket key safe to use as a file stem.
pub fn sanitize_filename(name: &str) -> String {
    let replaced = name
        .chars()
        .map(|ch| if RESERVED.contains(&ch) { '_' } else { ch })
        .collect::<String>();
    replaced.trim_matches(|ch| ch == '.' || ch == ' ').to_string()
}

/// Hands out `<stem>.csv` names, suffixing ` (2)`, ` (3)`, ... when two keys
/// sanitize to the same stem.
#[derive(Debug, Default)]
pub(crate) struct FileNamer {
    taken: HashSet<String>,
}

impl FileNamer {
    pub(crate) fn reserve(&mut self, file_name: &str) {
        self.taken.insert(file_name.to_string());
    }

    pub(crate) fn csv_name(&mut self, key: &str) -> String {
        let mut stem = truncate_stem(sanitize_filename(key));
        if stem.is_empty() {
            stem = FALLBACK_STEM.to_string();
        }

        let mut candidate = format!("{stem}.csv");
        let mut attempt = 2;
        while self.taken.contains(&candidate) {
            candidate = format!("{stem} ({attempt}).csv");
            attempt += 1;
        }
        self.taken.insert(candidate.clone());
        candidate
    }
}

/// Cuts a stem to at most `MAX_STEM_BYTES` on a char boundary.
fn truncate_stem(stem: String) -> String {
    if stem.len() <= MAX_STEM_BYTES {
        return stem;
    }
    let mut cut = MAX_STEM_BYTES;
    while !stem.is_char_boundary(cut) {
        cut -= 1;
    }
    stem[..cut]
        .trim_end_matches(|ch| ch == '.' || ch == ' ')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::{FileNamer, MAX_STEM_BYTES, sanitize_filename};

    #[test]
    fn reserved_characters_become_underscores() {
        assert_eq!(sanitize_filename("רו\"ח דנה/כהן"), "רו_ח דנה_כהן");
        assert_eq!(sanitize_filename("a<b>c:d|e?f*g\\h"), "a_b_c_d_e_f_g_h");
    }

    #[test]
    fn edge_dots_and_spaces_are_trimmed() {
        assert_eq!(sanitize_filename(" ..name. "), "name");
        assert_eq!(sanitize_filename("a.b"), "a.b");
    }

    #[test]
    fn colliding_stems_get_suffixes() {
        let mut namer = FileNamer::default();
        namer.reserve("excluded_businesses.csv");
        assert_eq!(namer.csv_name("רו\"ח דנה"), "רו_ח דנה.csv");
        assert_eq!(namer.csv_name("רו/ח דנה"), "רו_ח דנה (2).csv");
        assert_eq!(namer.csv_name("excluded_businesses"), "excluded_businesses (2).csv");
        assert_eq!(namer.csv_name(" . "), "bucket.csv");
    }

    #[test]
    fn long_hebrew_keys_are_cut_to_a_safe_length() {
        let key = "ליווי עסקי שנתי כולל דוחות ".repeat(6);
        assert!(key.len() > 255);

        let mut namer = FileNamer::default();
        let first = namer.csv_name(&key);
        let second = namer.csv_name(&format!("{key}נוסף"));
        assert!(first.len() <= MAX_STEM_BYTES + ".csv".len());
        assert!(first.ends_with(".csv"));
        assert!(!first.trim_end_matches(".csv").ends_with(' '));
        assert!(key.starts_with(first.trim_end_matches(".csv")));
        assert_eq!(second, first.replace(".csv", " (2).csv"));
        assert!(second.len() < 255);
    }
}
