use crate::routing::types::{TITLE_PREFIX, UNRESOLVED};

/// Lands an override target in an existing bucket when the names overlap,
/// otherwise synthesizes a titled display name. `candidates` must be sorted.
pub fn resolve_target(core_target: &str, candidates: &[String]) -> String {
    if core_target.is_empty() {
        return UNRESOLVED.to_string();
    }

    if let Some(candidate) = candidates
        .iter()
        .find(|candidate| candidate.contains(core_target) || core_target.contains(candidate.as_str()))
    {
        return candidate.clone();
    }

    if core_target.starts_with(TITLE_PREFIX) {
        core_target.to_string()
    } else {
        format!("{TITLE_PREFIX} {core_target}")
    }
}

#[cfg(test)]
mod tests {
    use super::resolve_target;
    use crate::routing::types::UNRESOLVED;

    fn candidates(values: &[&str]) -> Vec<String> {
        let mut names = values.iter().map(|value| value.to_string()).collect::<Vec<_>>();
        names.sort();
        names
    }

    #[test]
    fn empty_core_is_unresolved() {
        assert_eq!(resolve_target("", &candidates(&["דורון פלק"])), UNRESOLVED);
    }

    #[test]
    fn overlapping_candidate_is_reused() {
        let found = resolve_target("אהרון פארדו", &candidates(&["אלכס פבזנר", "רו\"ח אהרון פארדו"]));
        assert_eq!(found, "רו\"ח אהרון פארדו");

        let shorter = resolve_target("דורון פלק", &candidates(&["פלק"]));
        assert_eq!(shorter, "פלק");
    }

    #[test]
    fn first_sorted_candidate_wins() {
        let found = resolve_target("דורון פלק", &candidates(&["רו\"ח דורון פלק", "דורון פלק ושות"]));
        assert_eq!(found, "דורון פלק ושות");
    }

    #[test]
    fn missing_candidate_synthesizes_titled_name() {
        assert_eq!(resolve_target("שחר שולץ", &[]), "רו\"ח שחר שולץ");
        assert_eq!(resolve_target("רו\"ח שחר שולץ", &[]), "רו\"ח שחר שולץ");
    }
}
