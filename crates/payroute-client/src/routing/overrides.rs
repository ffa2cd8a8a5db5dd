use serde::{Deserialize, Serialize};

use crate::routing::normalize::normalize_for_matching;
use crate::routing::types::Record;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideEntry {
    pub person_pattern: String,
    pub core_target: String,
}

impl OverrideEntry {
    pub fn new(person_pattern: &str, core_target: &str) -> Self {
        Self {
            person_pattern: person_pattern.to_string(),
            core_target: core_target.to_string(),
        }
    }
}

/// Payer name to core accountant lookup. Declaration order matters: the first
/// matching entry wins, so specific patterns belong before loose ones.
#[derive(Debug, Clone)]
pub struct OverrideResolver {
    entries: Vec<(String, String)>,
}

impl OverrideResolver {
    pub fn new(entries: &[OverrideEntry]) -> Self {
        Self {
            entries: entries
                .iter()
                .map(|entry| {
                    (
                        normalize_for_matching(&entry.person_pattern),
                        entry.core_target.clone(),
                    )
                })
                .collect(),
        }
    }

    /// Returns the core target for a person, or an empty string when no entry matches.
    pub fn resolve_core(&self, person_raw: &str) -> String {
        let person = normalize_for_matching(person_raw);
        if person.is_empty() {
            return String::new();
        }

        for (pattern, core_target) in &self.entries {
            if pattern.is_empty() {
                continue;
            }
            if *pattern == person || person.contains(pattern.as_str()) || pattern.contains(&person)
            {
                return core_target.clone();
            }
        }
        String::new()
    }
}

/// First and last name joined by a space, or whichever one is present.
pub fn person_name(record: &Record, first_column: &str, last_column: &str) -> String {
    let first = record.text(first_column);
    let last = record.text(last_column);
    match (first.is_empty(), last.is_empty()) {
        (false, false) => format!("{first} {last}"),
        (false, true) => first,
        (true, false) => last,
        (true, true) => String::new(),
    }
}
