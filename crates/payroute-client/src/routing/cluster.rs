use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::routing::normalize::normalize_for_matching;

pub const DEFAULT_FUZZY_THRESHOLD: u8 = 90;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameCluster {
    pub canonical: String,
    pub canonical_normalized: String,
    /// Normalized forms in the order they joined; the seed comes first.
    pub members: Vec<String>,
    /// Distinct raw names, first-seen order.
    pub originals: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterMap {
    pub clusters: Vec<NameCluster>,
    canonical_by_original: HashMap<String, String>,
}

impl ClusterMap {
    pub fn canonical_for(&self, original: &str) -> Option<&str> {
        self.canonical_by_original
            .get(original)
            .map(String::as_str)
    }

    /// Sorted distinct canonical names.
    pub fn sorted_canonicals(&self) -> Vec<String> {
        let mut names = self
            .clusters
            .iter()
            .map(|cluster| cluster.canonical.clone())
            .collect::<Vec<String>>();
        names.sort();
        names.dedup();
        names
    }
}

/// Percentage similarity on a 0-100 scale: 100 minus the edit distance relative
/// to the longer string.
pub fn similarity(left: &str, right: &str) -> f64 {
    let longest = left.chars().count().max(right.chars().count());
    if longest == 0 {
        return 100.0;
    }
    let distance = strsim::levenshtein(left, right);
    100.0 * (longest - distance) as f64 / longest as f64
}

/// Integer form of `similarity(left, right) >= threshold`, exact at the boundary.
pub fn meets_threshold(left: &str, right: &str, threshold: u8) -> bool {
    let longest = left.chars().count().max(right.chars().count());
    if longest == 0 {
        return true;
    }
    let distance = strsim::levenshtein(left, right);
    (longest - distance) * 100 >= usize::from(threshold) * longest
}

/// Groups near-duplicate names. One greedy forward pass: each unclaimed form
/// seeds a cluster and claims every later unclaimed form that is similar to the
/// seed. Members are never compared with each other.
pub fn cluster_names(names: &[String], threshold: u8) -> ClusterMap {
    let mut forms: Vec<String> = Vec::new();
    let mut originals_by_form: HashMap<String, Vec<String>> = HashMap::new();
    for name in names {
        let normalized = normalize_for_matching(name);
        let originals = originals_by_form.entry(normalized.clone()).or_insert_with(|| {
            forms.push(normalized.clone());
            Vec::new()
        });
        if !originals.contains(name) {
            originals.push(name.clone());
        }
    }

    let mut claimed: HashSet<usize> = HashSet::new();
    let mut clusters = Vec::new();
    for (seed_index, seed) in forms.iter().enumerate() {
        if !claimed.insert(seed_index) {
            continue;
        }

        let mut members = vec![seed.clone()];
        for (candidate_index, candidate) in forms.iter().enumerate().skip(seed_index + 1) {
            if claimed.contains(&candidate_index) {
                continue;
            }
            if meets_threshold(seed, candidate, threshold) {
                claimed.insert(candidate_index);
                members.push(candidate.clone());
            }
        }

        clusters.push(build_cluster(members, &originals_by_form));
    }

    let mut canonical_by_original = HashMap::new();
    for cluster in &clusters {
        for original in &cluster.originals {
            canonical_by_original.insert(original.clone(), cluster.canonical.clone());
        }
    }

    ClusterMap {
        clusters,
        canonical_by_original,
    }
}

// `members` arrive in first-seen order, so "first longest" breaks ties correctly.
fn build_cluster(
    members: Vec<String>,
    originals_by_form: &HashMap<String, Vec<String>>,
) -> NameCluster {
    let canonical_normalized = longest_first(members.iter()).cloned().unwrap_or_default();

    let originals = members
        .iter()
        .flat_map(|form| originals_by_form.get(form).into_iter().flatten())
        .cloned()
        .collect::<Vec<String>>();
    let canonical = longest_first(originals.iter())
        .cloned()
        .unwrap_or_default();

    NameCluster {
        canonical,
        canonical_normalized,
        members,
        originals,
    }
}

fn longest_first<'a, I>(values: I) -> Option<&'a String>
where
    I: Iterator<Item = &'a String>,
{
    let mut best: Option<(&String, usize)> = None;
    for value in values {
        let length = value.chars().count();
        match best {
            Some((_, best_length)) if best_length >= length => {}
            _ => best = Some((value, length)),
        }
    }
    best.map(|(value, _)| value)
}

#[cfg(test)]
mod tests {
    use super::{cluster_names, meets_threshold, similarity};

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn similarity_is_symmetric_and_full_for_identical() {
        assert_eq!(similarity("abc", "abc"), 100.0);
        assert_eq!(similarity("", ""), 100.0);
        assert_eq!(similarity("abcd", "abce"), similarity("abce", "abcd"));
        assert_eq!(similarity("abc", "xyz"), 0.0);
    }

    #[test]
    fn threshold_boundary_is_exact() {
        // ten characters, one substitution: exactly 90
        assert!(meets_threshold("abcdefghij", "abcdefghiX", 90));
        // nine characters, one substitution: about 88.9
        assert!(!meets_threshold("abcdefghi", "abcdefghX", 90));
    }

    #[test]
    fn names_at_ninety_share_a_canonical() {
        let map = cluster_names(&names(&["abcdefghij", "abcdefghiX"]), 90);
        assert_eq!(map.clusters.len(), 1);
        assert_eq!(map.canonical_for("abcdefghij"), Some("abcdefghij"));
        assert_eq!(map.canonical_for("abcdefghiX"), Some("abcdefghij"));
    }

    #[test]
    fn names_below_ninety_stay_apart() {
        let map = cluster_names(&names(&["abcdefghi", "abcdefghX"]), 90);
        assert_eq!(map.clusters.len(), 2);
        assert_eq!(map.canonical_for("abcdefghX"), Some("abcdefghX"));
    }

    #[test]
    fn clustering_is_measured_against_the_seed_only() {
        // A-B and B-C are 90, A-C is 80.
        let a = "aaaaaaaaaa";
        let b = "aaaaaaaaab";
        let c = "aaaaaaaabb";
        assert!(meets_threshold(a, b, 90));
        assert!(meets_threshold(b, c, 90));
        assert!(!meets_threshold(a, c, 90));

        let seeded_by_a = cluster_names(&names(&[a, b, c]), 90);
        assert_eq!(seeded_by_a.clusters.len(), 2);
        assert_eq!(seeded_by_a.canonical_for(b), seeded_by_a.canonical_for(a));
        assert_eq!(seeded_by_a.canonical_for(c), Some(c));

        let seeded_by_b = cluster_names(&names(&[b, a, c]), 90);
        assert_eq!(seeded_by_b.clusters.len(), 1);
    }

    #[test]
    fn canonical_is_longest_original_across_the_cluster() {
        let map = cluster_names(
            &names(&["אלכס פבזנר", "רו\"ח אלכס פבזנר", "אלכס  פבזנר!", "אלכס פבזנר"]),
            90,
        );
        // "רו"ח אלכס פבזנר" is 15 chars vs 10; too far apart to cluster.
        assert_eq!(map.clusters.len(), 2);
        assert_eq!(map.canonical_for("אלכס פבזנר"), Some("אלכס  פבזנר!"));
        assert_eq!(map.canonical_for("אלכס  פבזנר!"), Some("אלכס  פבזנר!"));
    }

    #[test]
    fn ties_keep_the_first_seen_name() {
        let map = cluster_names(&names(&["abcdefghij", "abcdefghiX"]), 90);
        assert_eq!(map.clusters[0].canonical, "abcdefghij");
        assert_eq!(map.clusters[0].canonical_normalized, "abcdefghij");
    }

    #[test]
    fn empty_input_yields_no_clusters() {
        let map = cluster_names(&[], 90);
        assert!(map.clusters.is_empty());
        assert!(map.sorted_canonicals().is_empty());
    }
}
