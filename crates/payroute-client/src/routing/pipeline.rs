use log::{debug, info};

use crate::config::RoutingConfig;
use crate::routing::cluster::cluster_names;
use crate::routing::consolidate::VariantConsolidator;
use crate::routing::exclusion::ExclusionFilter;
use crate::routing::extract::extract_accountant_field;
use crate::routing::materialize::resolve_target;
use crate::routing::overrides::{OverrideResolver, person_name};
use crate::routing::types::{
    ExcludedRecord, Record, RouteSource, RoutedRecord, RoutingOutcome,
};

/// Per-config routing components. Holds no batch state, so one router can
/// serve any number of batches.
#[derive(Debug, Clone)]
pub struct Router<'a> {
    config: &'a RoutingConfig,
    exclusion: ExclusionFilter,
    overrides: OverrideResolver,
    consolidator: VariantConsolidator,
}

struct PendingRecord {
    index: usize,
    person_raw: String,
    core_target: String,
}

impl<'a> Router<'a> {
    pub fn new(config: &'a RoutingConfig) -> Self {
        Self {
            config,
            exclusion: ExclusionFilter::new(
                &config.columns.business_name,
                &config.excluded_businesses,
            ),
            overrides: OverrideResolver::new(&config.overrides),
            consolidator: VariantConsolidator::new(&config.alias_sets, &config.fragment_rules),
        }
    }

    pub fn consolidator(&self) -> &VariantConsolidator {
        &self.consolidator
    }

    pub fn route(&self, records: &[Record]) -> RoutingOutcome {
        let columns = &self.config.columns;
        let mut excluded = Vec::new();
        let mut auto = Vec::new();
        let mut manual = Vec::new();

        for (index, record) in records.iter().enumerate() {
            if self.exclusion.is_excluded(record) {
                debug!(
                    "excluding row {index}: business `{}`",
                    record.text(&columns.business_name)
                );
                excluded.push(ExcludedRecord {
                    index,
                    record: record.clone(),
                });
                continue;
            }

            let person_raw = person_name(record, &columns.first_name, &columns.last_name);
            let core_target = self.overrides.resolve_core(&person_raw);
            let pending = PendingRecord {
                index,
                person_raw,
                core_target,
            };
            if pending.core_target.is_empty() {
                auto.push(pending);
            } else {
                debug!("manual mapping: {} -> {}", pending.person_raw, pending.core_target);
                manual.push(pending);
            }
        }

        if !excluded.is_empty() {
            info!("excluded {} rows from out-of-scope businesses", excluded.len());
        }

        let raw_names = auto
            .iter()
            .map(|pending| {
                extract_accountant_field(records[pending.index].get(&columns.payment_description))
            })
            .collect::<Vec<String>>();
        let clusters = cluster_names(&raw_names, self.config.fuzzy_threshold);
        let auto_candidates = clusters.sorted_canonicals();
        info!(
            "routed {} auto rows into {} candidate buckets; {} manual rows",
            auto.len(),
            auto_candidates.len(),
            manual.len()
        );

        let mut routed = Vec::with_capacity(auto.len() + manual.len());
        for (pending, accountant_raw) in auto.into_iter().zip(raw_names) {
            let canonical = clusters
                .canonical_for(&accountant_raw)
                .unwrap_or(accountant_raw.as_str())
                .to_string();
            routed.push(RoutedRecord {
                index: pending.index,
                person_raw: pending.person_raw,
                core_target: pending.core_target,
                bucket: self.consolidator.consolidate(&canonical),
                accountant_raw: Some(accountant_raw),
                accountant_canonical: Some(canonical.clone()),
                accountant_final: canonical,
                source: RouteSource::Auto,
            });
        }

        for pending in manual {
            let accountant_final = resolve_target(&pending.core_target, &auto_candidates);
            debug!(
                "{} -> {} -> {}",
                pending.person_raw, pending.core_target, accountant_final
            );
            routed.push(RoutedRecord {
                index: pending.index,
                person_raw: pending.person_raw,
                core_target: pending.core_target,
                accountant_raw: None,
                accountant_canonical: None,
                bucket: self.consolidator.consolidate(&accountant_final),
                accountant_final,
                source: RouteSource::Manual,
            });
        }
        routed.sort_by_key(|entry| entry.index);

        RoutingOutcome {
            routed,
            excluded,
            auto_candidates,
        }
    }
}

/// Routes one batch. Pure function of the records and the configuration.
pub fn route_batch(records: &[Record], config: &RoutingConfig) -> RoutingOutcome {
    Router::new(config).route(records)
}

#[cfg(test)]
mod tests {
    use super::route_batch;
    use crate::config::RoutingConfig;
    use crate::routing::types::{FieldValue, Record, RouteSource, UNRESOLVED};

    fn row(business: &str, first: &str, last: &str, description: &str) -> Record {
        Record::from_pairs([
            ("שם העסק", FieldValue::from(business)),
            ("שם", FieldValue::from(first)),
            ("משפחה", FieldValue::from(last)),
            ("תיאור התשלום", FieldValue::from(description)),
        ])
    }

    #[test]
    fn every_record_is_routed_or_excluded() {
        let records = vec![
            row("עסק", "דנה", "כהן", "ליווי - רו\"ח אלכס פבזנר"),
            row("I.D Cyber Solutions", "רון", "לוי", "ליווי משפטי"),
            row("עסק", "שיר", "אקרמן", "ליווי עוסק"),
            row("עסק", "נועה", "בר", ""),
        ];
        let outcome = route_batch(&records, &RoutingConfig::default());

        assert_eq!(outcome.routed.len() + outcome.excluded.len(), records.len());
        assert_eq!(outcome.excluded.len(), 1);
        assert_eq!(outcome.excluded[0].index, 1);
        let indexes = outcome.routed.iter().map(|entry| entry.index).collect::<Vec<_>>();
        assert_eq!(indexes, vec![0, 2, 3]);
    }

    #[test]
    fn near_duplicate_descriptions_share_a_bucket() {
        let records = vec![
            row("עסק", "דנה", "כהן", "ליווי עוסק - רו\"ח אלכסנדר פבזנר"),
            row("עסק", "רון", "לוי", "ליווי עוסק - אלכסנדר פבזנרר"),
        ];
        let outcome = route_batch(&records, &RoutingConfig::default());
        assert_eq!(outcome.routed[0].bucket, outcome.routed[1].bucket);
        assert_eq!(outcome.routed[0].bucket, "אלכסנדר פבזנרר");
        assert_eq!(outcome.routed[0].accountant_raw.as_deref(), Some("אלכסנדר פבזנר"));
    }

    #[test]
    fn manual_override_joins_matching_auto_bucket() {
        let records = vec![
            row("עסק", "דנה", "כהן", "ליווי - רו\"ח דורון פלק"),
            row("עסק", "שיר", "אקרמן", "משהו אחר לגמרי"),
        ];
        let outcome = route_batch(&records, &RoutingConfig::default());
        assert_eq!(outcome.routed[1].source, RouteSource::Manual);
        assert_eq!(outcome.routed[1].core_target, "דורון פלק");
        assert_eq!(outcome.routed[1].bucket, "דורון פלק");
        assert_eq!(outcome.bucket_counts().len(), 1);
    }

    #[test]
    fn manual_override_without_auto_match_gets_titled_bucket() {
        let records = vec![row("עסק", "טל", "זילברמן", "ליווי")];
        let outcome = route_batch(&records, &RoutingConfig::default());
        assert_eq!(outcome.routed[0].bucket, "רו\"ח שחר שולץ");
        assert!(outcome.auto_candidates.is_empty());
    }

    #[test]
    fn consolidation_runs_last_for_both_sources() {
        let records = vec![
            row("עסק", "דנה", "כהן", "ליווי משפטי"),
            row("עסק", "איתן", "קזז", "ליווי"),
            row("עסק", "רון", "לוי", "ליווי - אהרון פרדו"),
        ];
        let outcome = route_batch(&records, &RoutingConfig::default());
        assert_eq!(outcome.routed[0].bucket, "רו״ח אילן קאופמן");
        // "אהרון פארדו" and "אהרון פרדו" do not overlap, so a titled name is synthesized.
        assert_eq!(outcome.routed[1].accountant_final, "רו\"ח אהרון פארדו");
        assert_eq!(outcome.routed[1].bucket, "רו״ח אהרון פארדו");
        assert_eq!(outcome.routed[2].bucket, "רו״ח אהרון פארדו");
    }

    #[test]
    fn unparseable_description_lands_in_unresolved() {
        let mut records = vec![row("עסק", "דנה", "כהן", "רו\"ח")];
        records.push(Record::from_pairs([
            ("שם העסק", FieldValue::from("עסק")),
            ("תיאור התשלום", FieldValue::Number(12.0)),
        ]));
        let outcome = route_batch(&records, &RoutingConfig::default());
        assert_eq!(outcome.routed[0].bucket, UNRESOLVED);
        assert_eq!(outcome.routed[1].bucket, UNRESOLVED);
        assert_eq!(outcome.routed[1].person_raw, "");
    }

    #[test]
    fn empty_batch_routes_nothing() {
        let outcome = route_batch(&[], &RoutingConfig::default());
        assert!(outcome.routed.is_empty());
        assert!(outcome.excluded.is_empty());
    }
}
