use std::path::Path;

use crate::ClientResult;
use crate::config::{ConfigSource, load_config};
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::ConfigShowData;

#[derive(Debug, Default)]
pub struct ConfigShowOptions<'a> {
    pub config_override: Option<&'a Path>,
    pub home_override: Option<&'a Path>,
}

pub fn show(config_override: Option<&Path>) -> ClientResult<SuccessEnvelope> {
    show_with_options(ConfigShowOptions {
        config_override,
        home_override: None,
    })
}

#[doc(hidden)]
pub fn show_with_options(options: ConfigShowOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let (config, source) = load_config(options.config_override, options.home_override)?;
    let (source_label, path) = match source {
        ConfigSource::BuiltIn => ("built_in", None),
        ConfigSource::File(path) => ("file", Some(path.display().to_string())),
    };
    let data = ConfigShowData {
        source: source_label.to_string(),
        path,
        config,
    };
    success("config show", data)
}
