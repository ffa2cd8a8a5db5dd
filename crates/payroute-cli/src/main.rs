mod cli;
mod dispatch;
mod output;
mod stdout_io;

use std::process::ExitCode;

use clap::{Parser, error::ErrorKind};
use payroute_client::ClientError;
use payroute_client::contracts::envelope::exit_code_for;
use stdout_io::write_stdout_text;

const TOP_LEVEL_HELP: &str = "payroute - route accountant payments into per-accountant reports

USAGE: payroute <command>

Route a monthly payments export:
  1. payroute route --help                     Read the input format and routing rules
  2. payroute route --dry-run <path>           Check bucket counts without writing files
  3. payroute route <path>                     Write one CSV per accountant plus summaries

Investigate routing:
  payroute explain \"<description>\"            Show how one payment description resolves
  payroute config show                         Print overrides, exclusions and merge rules

Options shared by every command:
  --json                                       Machine-readable output
  --config <file>                              Routing tables to use instead of the built-in ones

Logging goes to stderr. Set RUST_LOG=info (or debug) to see routing decisions.
";

const DEFAULT_LOG_FILTER: &str = "warn";

fn main() -> ExitCode {
    init_logging();
    match run() {
        Ok(code) => code,
        Err(code) => code,
    }
}

fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(DEFAULT_LOG_FILTER))
        .format_timestamp(None)
        .target(env_logger::Target::Stderr)
        .init();
}

fn run() -> Result<ExitCode, ExitCode> {
    let raw_args = std::env::args().collect::<Vec<String>>();
    if raw_args.len() == 1 || is_top_level_help_request(&raw_args) {
        if write_stdout_text(TOP_LEVEL_HELP).is_err() {
            return Err(ExitCode::from(2));
        }
        return Ok(ExitCode::SUCCESS);
    }

    let cli = match cli::Cli::try_parse() {
        Ok(value) => value,
        Err(err) => return handle_parse_error(&err, &raw_args),
    };
    let mode = output::mode_for_command(&cli.command);
    log::debug!("dispatching {:?}", cli.command);

    match dispatch::dispatch(&cli) {
        Ok(success) => {
            if output::print_success(&success, mode).is_err() {
                return Err(ExitCode::from(2));
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(error) => {
            if output::print_failure(&error, mode).is_err() {
                return Err(ExitCode::from(2));
            }
            Err(exit_code_for_error(&error))
        }
    }
}

fn handle_parse_error(err: &clap::Error, raw_args: &[String]) -> Result<ExitCode, ExitCode> {
    if matches!(
        err.kind(),
        ErrorKind::DisplayHelp
            | ErrorKind::DisplayVersion
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
    ) {
        if write_stdout_text(&err.to_string()).is_err() {
            return Err(ExitCode::from(2));
        }
        return Ok(ExitCode::SUCCESS);
    }

    let command_hint = if matches!(
        err.kind(),
        ErrorKind::MissingRequiredArgument
            | ErrorKind::InvalidValue
            | ErrorKind::ValueValidation
            | ErrorKind::WrongNumberOfValues
            | ErrorKind::UnknownArgument
            | ErrorKind::InvalidSubcommand
    ) {
        command_path_from_args(raw_args)
    } else {
        None
    };
    let clean_message = strip_clap_boilerplate(&err.to_string());
    let parse_error = ClientError::invalid_argument_for_command(&clean_message, command_hint);
    let mode = infer_requested_output_mode(raw_args);
    if output::print_failure(&parse_error, mode).is_err() {
        return Err(ExitCode::from(2));
    }
    Err(ExitCode::from(1))
}

fn is_top_level_help_request(raw_args: &[String]) -> bool {
    raw_args.len() == 2 && matches!(raw_args[1].as_str(), "--help" | "-h")
}

/// Strips clap's trailing usage and "For more information" lines so the
/// recovery steps are the only guidance printed.
fn strip_clap_boilerplate(message: &str) -> String {
    let trimmed = if let Some(pos) = message.find("\n\nUsage:") {
        &message[..pos]
    } else if let Some(pos) = message.find("\nFor more information") {
        &message[..pos]
    } else {
        message
    };
    trimmed.trim_end().to_string()
}

fn command_path_from_args(raw_args: &[String]) -> Option<&'static str> {
    let first = raw_args
        .iter()
        .skip(1)
        .find(|value| !value.starts_with('-'))?;
    let second = raw_args
        .iter()
        .skip(1)
        .filter(|value| !value.starts_with('-'))
        .nth(1)
        .map(String::as_str);

    match (first.as_str(), second) {
        ("route", _) => Some("route"),
        ("explain", _) => Some("explain"),
        ("config", Some("show")) => Some("config show"),
        ("config", _) => Some("config"),
        _ => None,
    }
}

fn exit_code_for_error(error: &ClientError) -> ExitCode {
    let code = exit_code_for(error);
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}

fn infer_requested_output_mode(raw_args: &[String]) -> output::OutputMode {
    if raw_args.iter().skip(1).any(|value| value == "--json") {
        return output::OutputMode::Json;
    }
    output::OutputMode::Text
}
