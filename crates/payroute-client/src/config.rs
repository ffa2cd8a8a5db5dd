use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::routing::cluster::DEFAULT_FUZZY_THRESHOLD;
use crate::routing::consolidate::{AliasSet, FragmentRule};
use crate::routing::normalize::normalize_for_matching;
use crate::routing::overrides::OverrideEntry;
use crate::state::resolve_payroute_home;
use crate::{ClientError, ClientResult};

pub const CONFIG_ENV_VAR: &str = "PAYROUTE_CONFIG";
pub const CONFIG_FILE_NAME: &str = "routing.json";

const REQUIRED_COLUMNS: [&str; 14] = [
    "חודש חיוב",
    "תאריך חיוב",
    "שם העסק",
    "שם",
    "משפחה",
    "אימייל",
    "טלפון",
    "סוג עסקה",
    "סוג תשלום",
    "סכום",
    "עמלת אשראי",
    "מע\"מ",
    "להעברה",
    "תיאור התשלום",
];

const SUM_COLUMNS: [&str; 4] = ["סכום", "עמלת אשראי", "מע\"מ", "להעברה"];

const LABEL_CANDIDATES: [&str; 3] = ["תיאור התשלום", "שם העסק", "שם"];

// Person to core accountant name, without the professional title.
const MANUAL_OVERRIDES: [(&str, &str); 18] = [
    ("שיר אקרמן", "דורון פלק"),
    ("יובל בן סירה", "שחר שולץ"),
    ("אופיר וינוגרד", "יוחאי כחלון"),
    ("אילן מיצ'ניק", "אלכס פבזנר"),
    ("אייל סעד", "דורון פלק"),
    ("עשהאל מימוני", "אהרון פארדו"),
    ("רונאל בלאיש", "אסף גונן"),
    ("טל זילברמן", "שחר שולץ"),
    ("איתן קזז", "אהרון פארדו"),
    ("אייל אמוץ", "אסף גונן"),
    ("עקיבא גליקמן", "אלכס פבזנר"),
    ("ולדימיר שייגנדרוב", "אסף גונן"),
    ("שייגנדרוב", "אסף גונן"),
    ("ולדימיר", "אסף גונן"),
    ("אורית וידל", "אילן קאופמן"),
    ("ויטל חיים נהרדעה", "חיים יעקובזון"),
    ("ויטל נהרדעה", "חיים יעקובזון"),
    ("ויטל חיים", "חיים יעקובזון"),
];

// Legal services billed through the same terminal; not accountant work.
const EXCLUDED_BUSINESSES: [&str; 4] = [
    "אי.די סייבר סולושנס",
    "אי די סייבר סולושנס",
    "ID Cyber Solutions",
    "I.D Cyber Solutions",
];

const KAUFMAN_CANONICAL: &str = "רו״ח אילן קאופמן";
const KAUFMAN_VARIANTS: [&str; 7] = [
    "רו\"ח אילן קאופמן",
    "ו״ח אילן קאופמן",
    "רו\"ח_אילן_קאופמן",
    "ו״ח_אילן_קאופמן",
    "ליווי משפטי",
    "ליווי עוסק מורשה",
    "ליווי עוסק פטור",
];

const PARDO_CANONICAL: &str = "רו״ח אהרון פארדו";

const EXCLUSION_REASON: &str = "שירות משפטי - לא שירות רו״ח";

/// Which columns carry the fields the router reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnNames {
    pub payment_description: String,
    pub business_name: String,
    pub first_name: String,
    pub last_name: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            payment_description: "תיאור התשלום".to_string(),
            business_name: "שם העסק".to_string(),
            first_name: "שם".to_string(),
            last_name: "משפחה".to_string(),
        }
    }
}

impl ColumnNames {
    fn as_list(&self) -> [&str; 4] {
        [
            self.payment_description.as_str(),
            self.business_name.as_str(),
            self.first_name.as_str(),
            self.last_name.as_str(),
        ]
    }
}

/// Immutable routing tables. Loaded once and passed by reference into every batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    pub columns: ColumnNames,
    pub required_columns: Vec<String>,
    pub sum_columns: Vec<String>,
    pub label_candidates: Vec<String>,
    pub fuzzy_threshold: u8,
    pub overrides: Vec<OverrideEntry>,
    pub excluded_businesses: Vec<String>,
    pub exclusion_reason: String,
    pub alias_sets: Vec<AliasSet>,
    pub fragment_rules: Vec<FragmentRule>,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            columns: ColumnNames::default(),
            required_columns: to_strings(&REQUIRED_COLUMNS),
            sum_columns: to_strings(&SUM_COLUMNS),
            label_candidates: to_strings(&LABEL_CANDIDATES),
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            overrides: MANUAL_OVERRIDES
                .iter()
                .map(|(person, core)| OverrideEntry::new(person, core))
                .collect(),
            excluded_businesses: to_strings(&EXCLUDED_BUSINESSES),
            exclusion_reason: EXCLUSION_REASON.to_string(),
            alias_sets: vec![AliasSet {
                canonical: KAUFMAN_CANONICAL.to_string(),
                variants: to_strings(&KAUFMAN_VARIANTS),
            }],
            fragment_rules: vec![FragmentRule {
                canonical: PARDO_CANONICAL.to_string(),
                all_of: vec!["אהרון".to_string()],
                any_of: vec!["פארדו".to_string(), "פרדו".to_string()],
            }],
        }
    }
}

impl RoutingConfig {
    pub fn validate(&self) -> ClientResult<()> {
        let mut problems = Vec::new();

        if self.fuzzy_threshold > 100 {
            problems.push(format!(
                "fuzzy_threshold must be between 0 and 100; got {}.",
                self.fuzzy_threshold
            ));
        }

        for column in self.columns.as_list() {
            if column.trim().is_empty() {
                problems.push("columns entries must be non-empty.".to_string());
            } else if !self.required_columns.iter().any(|value| value == column) {
                problems.push(format!(
                    "required_columns must include routing column `{column}`."
                ));
            }
        }

        for (position, entry) in self.overrides.iter().enumerate() {
            if normalize_for_matching(&entry.person_pattern).is_empty()
                || entry.core_target.trim().is_empty()
            {
                problems.push(format!(
                    "overrides[{position}] needs a non-empty person_pattern and core_target."
                ));
            }
        }

        problems.extend(self.canonical_problems());

        if problems.is_empty() {
            return Ok(());
        }
        Err(ClientError::config_invalid(problems))
    }

    fn canonical_problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        let canonicals = self
            .alias_sets
            .iter()
            .map(|set| set.canonical.as_str())
            .chain(self.fragment_rules.iter().map(|rule| rule.canonical.as_str()))
            .collect::<Vec<&str>>();

        let mut seen: Vec<String> = Vec::new();
        for canonical in &canonicals {
            let normalized = normalize_for_matching(canonical);
            if normalized.is_empty() {
                problems.push("alias and fragment canonicals must be non-empty.".to_string());
                continue;
            }
            if seen.contains(&normalized) {
                problems.push(format!(
                    "canonical `{canonical}` is declared more than once."
                ));
            }
            seen.push(normalized);
        }

        for rule in &self.fragment_rules {
            if rule.all_of.is_empty() && rule.any_of.is_empty() {
                problems.push(format!(
                    "fragment rule for `{}` needs at least one fragment.",
                    rule.canonical
                ));
            }
        }

        problems
    }
}

/// Explicit path, then `$PAYROUTE_CONFIG`, then `routing.json` in the payroute
/// home, then the built-in tables.
pub fn load_config(
    config_override: Option<&Path>,
    home_override: Option<&Path>,
) -> ClientResult<(RoutingConfig, ConfigSource)> {
    let env_path = std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from);
    resolve_config(config_override, env_path, home_override)
}

fn resolve_config(
    config_override: Option<&Path>,
    env_path: Option<PathBuf>,
    home_override: Option<&Path>,
) -> ClientResult<(RoutingConfig, ConfigSource)> {
    let explicit = config_override.map(Path::to_path_buf).or(env_path);

    if let Some(path) = explicit {
        let config = read_config_file(&path)?;
        return Ok((config, ConfigSource::File(path)));
    }

    let home = resolve_payroute_home(home_override)?;
    let home_config = home.join(CONFIG_FILE_NAME);
    if home_config.is_file() {
        let config = read_config_file(&home_config)?;
        return Ok((config, ConfigSource::File(home_config)));
    }

    Ok((RoutingConfig::default(), ConfigSource::BuiltIn))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    BuiltIn,
    File(PathBuf),
}

impl ConfigSource {
    pub fn describe(&self) -> String {
        match self {
            Self::BuiltIn => "built-in".to_string(),
            Self::File(path) => path.display().to_string(),
        }
    }
}

pub fn read_config_file(path: &Path) -> ClientResult<RoutingConfig> {
    let body = fs::read_to_string(path)
        .map_err(|error| ClientError::config_unreadable(path, &error.to_string()))?;
    let config = serde_json::from_str::<RoutingConfig>(&body)
        .map_err(|error| ClientError::config_unreadable(path, &error.to_string()))?;
    config.validate()?;
    log::info!("loaded routing config from {}", path.display());
    Ok(config)
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}
