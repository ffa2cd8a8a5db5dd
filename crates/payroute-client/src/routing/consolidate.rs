use serde::{Deserialize, Serialize};

use crate::routing::normalize::normalize_for_matching;

/// Bucket keys known to denote one accountant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasSet {
    pub canonical: String,
    pub variants: Vec<String>,
}

/// Heuristic for names with many spellings: the raw key must contain every
/// `all_of` fragment and at least one `any_of` fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FragmentRule {
    pub canonical: String,
    pub all_of: Vec<String>,
    #[serde(default)]
    pub any_of: Vec<String>,
}

impl FragmentRule {
    pub fn matches(&self, key: &str) -> bool {
        let all = self.all_of.iter().all(|fragment| key.contains(fragment.as_str()));
        let any = self.any_of.is_empty()
            || self.any_of.iter().any(|fragment| key.contains(fragment.as_str()));
        all && any
    }
}

#[derive(Debug, Clone)]
pub struct VariantConsolidator {
    canonicals: Vec<(String, String)>,
    aliases: Vec<(String, String)>,
    fragment_rules: Vec<FragmentRule>,
}

impl VariantConsolidator {
    pub fn new(alias_sets: &[AliasSet], fragment_rules: &[FragmentRule]) -> Self {
        let canonicals = alias_sets
            .iter()
            .map(|set| set.canonical.as_str())
            .chain(fragment_rules.iter().map(|rule| rule.canonical.as_str()))
            .map(|canonical| (normalize_for_matching(canonical), canonical.to_string()))
            .collect();
        let aliases = alias_sets
            .iter()
            .flat_map(|set| {
                set.variants
                    .iter()
                    .map(|variant| (normalize_for_matching(variant), set.canonical.clone()))
            })
            .collect();

        Self {
            canonicals,
            aliases,
            fragment_rules: fragment_rules.to_vec(),
        }
    }

    /// Final word on bucket identity. A canonical key always maps to itself,
    /// so applying this twice changes nothing.
    pub fn consolidate(&self, key: &str) -> String {
        let normalized = normalize_for_matching(key);

        if let Some((_, canonical)) = self.canonicals.iter().find(|(form, _)| *form == normalized) {
            return canonical.clone();
        }

        if let Some((_, canonical)) = self.aliases.iter().find(|(form, _)| *form == normalized) {
            return canonical.clone();
        }

        if let Some(rule) = self.fragment_rules.iter().find(|rule| rule.matches(key)) {
            return rule.canonical.clone();
        }

        key.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::{AliasSet, FragmentRule, VariantConsolidator};

    fn consolidator() -> VariantConsolidator {
        VariantConsolidator::new(
            &[AliasSet {
                canonical: "רו״ח אילן קאופמן".to_string(),
                variants: vec![
                    "רו\"ח אילן קאופמן".to_string(),
                    "ו״ח_אילן_קאופמן".to_string(),
                    "ליווי משפטי".to_string(),
                ],
            }],
            &[FragmentRule {
                canonical: "רו״ח אהרון פארדו".to_string(),
                all_of: vec!["אהרון".to_string()],
                any_of: vec!["פארדו".to_string(), "פרדו".to_string()],
            }],
        )
    }

    #[test]
    fn alias_variants_collapse_after_normalization() {
        let consolidator = consolidator();
        assert_eq!(consolidator.consolidate("ו\"ח אילן קאופמן"), "רו״ח אילן קאופמן");
        assert_eq!(consolidator.consolidate("ליווי  משפטי"), "רו״ח אילן קאופמן");
        assert_eq!(consolidator.consolidate("רו\"ח_אילן_קאופמן"), "רו״ח אילן קאופמן");
    }

    #[test]
    fn fragment_rule_collapses_spelling_variants() {
        let consolidator = consolidator();
        assert_eq!(consolidator.consolidate("אהרון פרדו"), "רו״ח אהרון פארדו");
        assert_eq!(consolidator.consolidate("משרד אהרון פארדו ושות"), "רו״ח אהרון פארדו");
        assert_eq!(consolidator.consolidate("אהרון כהן"), "אהרון כהן");
    }

    #[test]
    fn unrelated_keys_pass_through() {
        assert_eq!(consolidator().consolidate("דורון פלק"), "דורון פלק");
    }

    #[test]
    fn consolidation_is_idempotent() {
        let consolidator = consolidator();
        let keys = [
            "ליווי משפטי",
            "רו\"ח אילן קאופמן",
            "רו״ח אילן קאופמן",
            "אהרון פרדו",
            "רו״ח אהרון פארדו",
            "דורון פלק",
            "",
        ];
        let once = keys
            .iter()
            .map(|key| consolidator.consolidate(key))
            .collect::<Vec<String>>();
        let twice = once
            .iter()
            .map(|key| consolidator.consolidate(key))
            .collect::<Vec<String>>();
        assert_eq!(once, twice);
    }
}
