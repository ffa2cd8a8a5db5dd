use payroute_client::commands;
use payroute_client::{ClientResult, SuccessEnvelope};

use crate::cli::{Cli, Commands, ConfigCommand};

pub fn dispatch(cli: &Cli) -> ClientResult<SuccessEnvelope> {
    match &cli.command {
        Commands::Route {
            dry_run,
            out,
            config,
            json: _,
            path,
        } => commands::route::run(path.clone(), *dry_run, out.as_deref(), config.as_deref()),
        Commands::Config { command } => match command {
            ConfigCommand::Show { config, .. } => commands::config::show(config.as_deref()),
        },
        Commands::Explain {
            config,
            description,
            ..
        } => commands::explain::run(description.clone(), config.as_deref()),
    }
}
