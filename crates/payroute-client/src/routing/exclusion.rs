use std::collections::HashSet;

use crate::routing::normalize::normalize_for_matching;
use crate::routing::types::Record;

/// Flags rows whose counterparty business is outside the accountant domain.
#[derive(Debug, Clone)]
pub struct ExclusionFilter {
    business_column: String,
    normalized_names: HashSet<String>,
}

impl ExclusionFilter {
    pub fn new<I, S>(business_column: &str, excluded_businesses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let normalized_names = excluded_businesses
            .into_iter()
            .map(|name| normalize_for_matching(name.as_ref()))
            .filter(|name| !name.is_empty())
            .collect();
        Self {
            business_column: business_column.to_string(),
            normalized_names,
        }
    }

    pub fn is_excluded(&self, record: &Record) -> bool {
        let business_name = record.text(&self.business_column);
        if business_name.is_empty() {
            return false;
        }
        self.normalized_names
            .contains(&normalize_for_matching(&business_name))
    }
}
