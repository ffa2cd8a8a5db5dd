use crate::cli::{Commands, ConfigCommand};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum OutputMode {
    Text,
    Json,
}

pub fn mode_for_command(command: &Commands) -> OutputMode {
    let json = match command {
        Commands::Route { json, .. } | Commands::Explain { json, .. } => *json,
        Commands::Config {
            command: ConfigCommand::Show { json, .. },
        } => *json,
    };
    if json {
        OutputMode::Json
    } else {
        OutputMode::Text
    }
}

#[cfg(test)]
mod tests {
    use super::{OutputMode, mode_for_command};
    use crate::cli::parse_from;

    #[test]
    fn mode_uses_json_for_route_with_json_flag() {
        let parsed = parse_from(["payroute", "route", "--dry-run", "rows.csv", "--json"]);
        assert!(parsed.is_ok());
        if let Ok(cli) = parsed {
            assert_eq!(mode_for_command(&cli.command), OutputMode::Json);
        }
    }

    #[test]
    fn mode_defaults_to_text() {
        let cases: [&[&str]; 3] = [
            &["payroute", "route", "rows.csv"],
            &["payroute", "config", "show"],
            &["payroute", "explain", "ליווי"],
        ];
        for args in cases {
            let parsed = parse_from(args);
            assert!(parsed.is_ok());
            if let Ok(cli) = parsed {
                assert_eq!(mode_for_command(&cli.command), OutputMode::Text);
            }
        }
    }

    #[test]
    fn mode_uses_json_for_config_show() {
        let parsed = parse_from(["payroute", "config", "show", "--json"]);
        assert!(parsed.is_ok());
        if let Ok(cli) = parsed {
            assert_eq!(mode_for_command(&cli.command), OutputMode::Json);
        }
    }
}
