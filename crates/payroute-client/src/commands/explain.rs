use std::path::Path;

use crate::config::load_config;
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::ExplainData;
use crate::routing::extract::extract_accountant;
use crate::routing::normalize::{normalize_for_matching, normalize_quotes_and_dashes};
use crate::routing::{Router, UNRESOLVED};
use crate::{ClientError, ClientResult};

#[derive(Debug, Default)]
pub struct ExplainOptions<'a> {
    pub description: String,
    pub config_override: Option<&'a Path>,
    pub home_override: Option<&'a Path>,
}

pub fn run(description: String, config_override: Option<&Path>) -> ClientResult<SuccessEnvelope> {
    run_with_options(ExplainOptions {
        description,
        config_override,
        home_override: None,
    })
}

/// Traces one description through extraction and consolidation. Clustering
/// needs a whole batch, so it is not applied here.
#[doc(hidden)]
pub fn run_with_options(options: ExplainOptions<'_>) -> ClientResult<SuccessEnvelope> {
    if options.description.trim().is_empty() {
        return Err(ClientError::invalid_argument_for_command(
            "Pass a non-empty payment description to explain.",
            Some("explain"),
        ));
    }

    let (config, source) = load_config(options.config_override, options.home_override)?;
    let router = Router::new(&config);
    let accountant_raw = extract_accountant(&options.description);
    let bucket = router.consolidator().consolidate(&accountant_raw);

    let data = ExplainData {
        normalized: normalize_quotes_and_dashes(&options.description),
        matching_form: normalize_for_matching(&options.description),
        consolidated: bucket != accountant_raw,
        unresolved: bucket == UNRESOLVED,
        config_source: source.describe(),
        description: options.description,
        accountant_raw,
        bucket,
    };
    success("explain", data)
}
