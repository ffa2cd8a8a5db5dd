use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub fn parse_nonempty_path(value: &str) -> Result<PathBuf, String> {
    if value.trim().is_empty() {
        return Err("path must not be empty".to_string());
    }
    Ok(PathBuf::from(value))
}

/// Extended help shown after `payroute route --help`.
pub const ROUTE_AFTER_HELP: &str = "\
Routing Input:
  Pass the monthly payments workbook (.xlsx, first sheet, header row), a CSV
  export (UTF-8, header row) or a JSON array of row objects keyed by column
  name. Files ending in .xlsx or starting with the zip signature are read as
  workbooks.

  <path> is a local file path.
  To read stdin explicitly, use `-` as the path.
  Example: cat payments.csv | payroute route --dry-run -

  Required columns (exact header text):
    חודש חיוב, תאריך חיוב, שם העסק, שם, משפחה, אימייל, טלפון,
    סוג עסקה, סוג תשלום, סכום, עמלת אשראי, מע\"מ, להעברה, תיאור התשלום
  Extra columns are allowed and are dropped from the reports.
  Rows with an empty payment description are skipped.

How rows are routed:
  1. Rows billed by excluded businesses (legal services) are set aside.
  2. Rows whose customer has a manual mapping go to that accountant.
  3. All other rows take the accountant named at the end of the payment
     description; near-identical spellings are merged into one name.
  4. Known spelling variants are folded into one canonical accountant.

Output:
  One CSV per accountant with a totals row, plus
  mapping_summary_by_accountant.csv, mapping_people_manual.csv and,
  when rows were excluded, excluded_businesses.csv.
  Files are written to <out>/<run_id>/ (default out: ~/.payroute/runs).

What to do next:
  1. Run `payroute route --dry-run <path>` and check the bucket counts.
  2. Run `payroute explain \"<description>\"` for any row that landed in the
     wrong bucket.
  3. Run `payroute route <path>` to write the reports.
";

#[derive(Debug, Parser)]
#[command(
    name = "payroute",
    version,
    about = "route accountant payments into per-accountant reports",
    disable_help_subcommand = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Route a payments export into per-accountant CSV reports
    #[command(after_long_help = ROUTE_AFTER_HELP)]
    Route {
        /// Route and summarize without writing any files
        #[arg(long)]
        dry_run: bool,
        /// Directory that receives the run folder
        #[arg(long, value_parser = parse_nonempty_path)]
        out: Option<PathBuf>,
        /// Routing config JSON file (overrides PAYROUTE_CONFIG)
        #[arg(long, value_parser = parse_nonempty_path)]
        config: Option<PathBuf>,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
        /// Path to an xlsx, CSV or JSON payments file (use `-` for stdin)
        path: Option<String>,
    },
    /// Inspect the routing tables in effect
    #[command(arg_required_else_help = true)]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Show how a single payment description is resolved
    Explain {
        /// Routing config JSON file (overrides PAYROUTE_CONFIG)
        #[arg(long, value_parser = parse_nonempty_path)]
        config: Option<PathBuf>,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
        /// The payment description text
        description: String,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum ConfigCommand {
    /// Print the override map, exclusions and consolidation rules
    Show {
        /// Routing config JSON file (overrides PAYROUTE_CONFIG)
        #[arg(long, value_parser = parse_nonempty_path)]
        config: Option<PathBuf>,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
}

#[cfg(test)]
pub fn parse_from<I, T>(itr: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(itr)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use clap::error::ErrorKind;

    use super::{Commands, ConfigCommand, parse_from};

    #[test]
    fn parse_command_paths() {
        let cases: [Vec<&str>; 10] = [
            vec!["payroute", "route", "./payments.csv"],
            vec!["payroute", "route", "--dry-run", "./payments.csv"],
            vec!["payroute", "route", "-", "--json"],
            vec!["payroute", "route"],
            vec!["payroute", "route", "--out", "./reports", "./payments.csv"],
            vec!["payroute", "route", "--config", "routing.json", "p.csv"],
            vec!["payroute", "config", "show"],
            vec!["payroute", "config", "show", "--json"],
            vec!["payroute", "explain", "ליווי - רו\"ח דנה כהן"],
            vec!["payroute", "explain", "--json", "ליווי"],
        ];

        for case in cases {
            let parsed = parse_from(case.clone());
            assert!(parsed.is_ok(), "failed to parse: {case:?}");
        }
    }

    #[test]
    fn parse_route_flags() {
        let parsed = parse_from([
            "payroute",
            "route",
            "--dry-run",
            "--out",
            "reports",
            "--json",
            "payments.csv",
        ]);
        assert!(parsed.is_ok());
        if let Ok(cli) = parsed {
            match cli.command {
                Commands::Route {
                    dry_run,
                    out,
                    config,
                    json,
                    path,
                } => {
                    assert!(dry_run);
                    assert!(json);
                    assert_eq!(out, Some(PathBuf::from("reports")));
                    assert!(config.is_none());
                    assert_eq!(path.as_deref(), Some("payments.csv"));
                }
                _ => panic!("expected route command"),
            }
        }
    }

    #[test]
    fn parse_config_show_subcommand() {
        let parsed = parse_from(["payroute", "config", "show", "--json"]);
        assert!(parsed.is_ok());
        if let Ok(cli) = parsed {
            assert!(matches!(
                cli.command,
                Commands::Config {
                    command: ConfigCommand::Show {
                        config: None,
                        json: true
                    }
                }
            ));
        }
    }

    #[test]
    fn bare_config_shows_help() {
        let parsed = parse_from(["payroute", "config"]);
        assert!(parsed.is_err());
        if let Err(error) = parsed {
            assert_eq!(
                error.kind(),
                ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
            );
        }
    }

    #[test]
    fn explain_requires_description() {
        let parsed = parse_from(["payroute", "explain"]);
        assert!(parsed.is_err());
        if let Err(error) = parsed {
            assert_eq!(error.kind(), ErrorKind::MissingRequiredArgument);
        }
    }

    #[test]
    fn empty_out_path_is_rejected() {
        let parsed = parse_from(["payroute", "route", "--out", "", "p.csv"]);
        assert!(parsed.is_err());
        if let Err(error) = parsed {
            assert_eq!(error.kind(), ErrorKind::ValueValidation);
        }
    }

    #[test]
    fn help_command_is_rejected() {
        let parsed = parse_from(["payroute", "help"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn route_help_uses_clap_display_help() {
        let parsed = parse_from(["payroute", "route", "--help"]);
        assert!(parsed.is_err());
        if let Err(error) = parsed {
            assert_eq!(error.kind(), ErrorKind::DisplayHelp);
        }
    }
}
