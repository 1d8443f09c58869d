//! Command-line argument parsing and processing.
//!
//! Global flags (`--config`, `--debug`, `--log`, `--help`, `--version`) may
//! appear anywhere. The first bare word selects the command; without one,
//! `locate` runs. Help and version take precedence over everything else, and
//! any unknown or malformed argument turns into `ShowHelpDueToError`.

use crate::providers::PermissionMode;

/// Flags shared by every command.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlobalOptions {
    pub debug_enabled: bool,
    pub config_dir: Option<String>,
    /// Send log output to this file instead of the terminal.
    pub log_file: Option<String>,
}

/// Arguments of `locate`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocateOptions {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub json: bool,
    /// Store the given coordinates as the configured location.
    pub save: bool,
}

/// Arguments of `compass`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompassOptions {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// JSON-lines recording of orientation events.
    pub replay: Option<String>,
    /// Permission behaviour of the replayed platform.
    pub permission: Option<PermissionMode>,
    pub demo: bool,
    /// Stop after this many seconds.
    pub duration_secs: Option<u64>,
    pub json: bool,
}

/// Represents the parsed command-line arguments and their intended actions.
#[derive(Debug, PartialEq)]
pub enum CliAction {
    /// Print the bearing and distance for one location fix
    Locate {
        global: GlobalOptions,
        options: LocateOptions,
    },
    /// Run a live compass session
    Compass {
        global: GlobalOptions,
        options: CompassOptions,
    },
    /// Display help information and exit
    ShowHelp,
    /// Display version information and exit
    ShowVersion,
    /// Show help due to unknown arguments and exit
    ShowHelpDueToError,
}

/// Result of parsing command-line arguments.
pub struct ParsedArgs {
    pub action: CliAction,
}

enum Command {
    Locate(LocateOptions),
    Compass(CompassOptions),
}

impl ParsedArgs {
    /// Parse command-line arguments into a structured result.
    ///
    /// The first item is the program name and is skipped.
    pub fn parse<I, S>(args: I) -> ParsedArgs
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args_vec: Vec<String> = args
            .into_iter()
            .skip(1)
            .map(|s| s.as_ref().to_string())
            .collect();

        if args_vec
            .iter()
            .any(|arg| arg == "--version" || arg == "-V" || arg == "-v")
        {
            return ParsedArgs {
                action: CliAction::ShowVersion,
            };
        }
        if args_vec.iter().any(|arg| arg == "--help" || arg == "-h") {
            return ParsedArgs {
                action: CliAction::ShowHelp,
            };
        }

        let action = match parse_command_line(&args_vec) {
            Ok((global, Command::Locate(options))) => CliAction::Locate { global, options },
            Ok((global, Command::Compass(options))) => CliAction::Compass { global, options },
            Err(message) => {
                log_error!("{}", message);
                CliAction::ShowHelpDueToError
            }
        };

        ParsedArgs { action }
    }

    /// Convenience method to parse from std::env::args()
    pub fn from_env() -> ParsedArgs {
        Self::parse(std::env::args())
    }
}

fn parse_command_line(args: &[String]) -> Result<(GlobalOptions, Command), String> {
    let mut global = GlobalOptions::default();
    let mut command: Option<String> = None;
    let mut latitude: Option<f64> = None;
    let mut longitude: Option<f64> = None;
    let mut json = false;
    let mut save = false;
    let mut replay: Option<String> = None;
    let mut permission: Option<PermissionMode> = None;
    let mut demo = false;
    let mut duration_secs: Option<u64> = None;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--debug" | "-d" => global.debug_enabled = true,
            "--config" | "-c" => global.config_dir = Some(take_value(&mut iter, arg)?),
            "--log" => global.log_file = Some(take_value(&mut iter, arg)?),
            "--lat" => latitude = Some(parse_number(&take_value(&mut iter, arg)?, arg)?),
            "--lon" => longitude = Some(parse_number(&take_value(&mut iter, arg)?, arg)?),
            "--json" => json = true,
            "--save" => save = true,
            "--replay" => replay = Some(take_value(&mut iter, arg)?),
            "--permission" => {
                let value = take_value(&mut iter, arg)?;
                permission = Some(PermissionMode::parse(&value).ok_or_else(|| {
                    format!(
                        "Invalid permission mode '{value}'. Use granted, denied, none or unsupported"
                    )
                })?);
            }
            "--demo" => demo = true,
            "--duration" => {
                duration_secs = Some(parse_number(&take_value(&mut iter, arg)?, arg)?);
            }
            flag if flag.starts_with('-') => return Err(format!("Unknown option: {flag}")),
            word => {
                if let Some(existing) = &command {
                    return Err(format!(
                        "Cannot use multiple commands at once: '{existing}' and '{word}'"
                    ));
                }
                command = Some(word.to_string());
            }
        }
    }

    if latitude.is_some() != longitude.is_some() {
        return Err("--lat and --lon must be given together".to_string());
    }

    match command.as_deref().unwrap_or("locate") {
        "locate" | "l" => {
            if replay.is_some() || permission.is_some() || demo || duration_secs.is_some() {
                return Err("Compass options cannot be used with 'locate'".to_string());
            }
            if save && latitude.is_none() {
                return Err("--save requires --lat and --lon".to_string());
            }
            Ok((
                global,
                Command::Locate(LocateOptions {
                    latitude,
                    longitude,
                    json,
                    save,
                }),
            ))
        }
        "compass" | "c" => {
            if save {
                return Err("--save can only be used with 'locate'".to_string());
            }
            if permission.is_some() && replay.is_none() {
                return Err("--permission requires --replay".to_string());
            }
            Ok((
                global,
                Command::Compass(CompassOptions {
                    latitude,
                    longitude,
                    replay,
                    permission,
                    demo,
                    duration_secs,
                    json,
                }),
            ))
        }
        other => Err(format!("Unknown command: {other}")),
    }
}

fn take_value<'a>(iter: &mut impl Iterator<Item = &'a String>, flag: &str) -> Result<String, String> {
    match iter.next() {
        Some(value) if !value.starts_with("--") => Ok(value.clone()),
        _ => Err(format!("Missing value for {flag}")),
    }
}

fn parse_number<T: std::str::FromStr>(value: &str, flag: &str) -> Result<T, String> {
    value
        .parse()
        .map_err(|_| format!("Invalid value for {flag}: '{value}'"))
}

/// Displays version information using custom logging style.
pub fn display_version_info() {
    log_version!();
    log_pipe!();
    println!("┗ {}", env!("CARGO_PKG_DESCRIPTION"));
}

/// Displays custom help message using logger methods.
pub fn display_help() {
    log_version!();
    log_block_start!(env!("CARGO_PKG_DESCRIPTION"));
    log_block_start!("Usage:");
    log_indented!("qibla [OPTIONS] [COMMAND]");
    log_block_start!("Options:");
    log_indented!("-c, --config <dir>     Use custom configuration directory");
    log_indented!("-d, --debug            Enable detailed debug output");
    log_indented!("    --log <file>       Write log output to a file instead");
    log_indented!("-h, --help             Print help information");
    log_indented!("-V, --version          Print version information");
    log_block_start!("Commands:");
    log_indented!("locate, l              Print the Qibla bearing and distance (default)");
    log_indented!("    --lat <deg> --lon <deg>  Use these coordinates instead of the config");
    log_indented!("    --save             Store the coordinates in the configuration");
    log_indented!("    --json             Print the result as JSON");
    log_indented!("compass, c             Run a live compass session");
    log_indented!("    --replay <file>    Replay recorded orientation events (JSON lines)");
    log_indented!("    --permission <mode> granted, denied, none or unsupported");
    log_indented!("    --demo             Show a simulated heading if the compass is blocked");
    log_indented!("    --duration <secs>  Stop after this many seconds");
    log_indented!("    --json             Print one JSON snapshot per update");
    log_end!();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliAction {
        ParsedArgs::parse(std::iter::once("qibla").chain(args.iter().copied())).action
    }

    #[test]
    fn test_parse_no_args_locates() {
        assert_eq!(
            parse(&[]),
            CliAction::Locate {
                global: GlobalOptions::default(),
                options: LocateOptions::default(),
            }
        );
    }

    #[test]
    fn test_parse_global_flags_anywhere() {
        let action = parse(&["locate", "-d", "--config", "/tmp/qibla", "--log", "out.log"]);
        assert_eq!(
            action,
            CliAction::Locate {
                global: GlobalOptions {
                    debug_enabled: true,
                    config_dir: Some("/tmp/qibla".to_string()),
                    log_file: Some("out.log".to_string()),
                },
                options: LocateOptions::default(),
            }
        );
    }

    #[test]
    fn test_parse_help_and_version() {
        assert_eq!(parse(&["--help"]), CliAction::ShowHelp);
        assert_eq!(parse(&["compass", "-h"]), CliAction::ShowHelp);
        assert_eq!(parse(&["-V"]), CliAction::ShowVersion);
        // Version takes precedence
        assert_eq!(parse(&["--version", "--help", "--debug"]), CliAction::ShowVersion);
    }

    #[test]
    fn test_parse_locate_with_coordinates() {
        let action = parse(&["locate", "--lat", "21.0", "--lon", "39.0", "--json", "--save"]);
        assert_eq!(
            action,
            CliAction::Locate {
                global: GlobalOptions::default(),
                options: LocateOptions {
                    latitude: Some(21.0),
                    longitude: Some(39.0),
                    json: true,
                    save: true,
                },
            }
        );
    }

    #[test]
    fn test_parse_negative_coordinates() {
        let action = parse(&["--lat", "-33.8688", "--lon", "151.2093"]);
        match action {
            CliAction::Locate { options, .. } => assert_eq!(options.latitude, Some(-33.8688)),
            other => panic!("unexpected action {other:?}"),
        }
    }

    #[test]
    fn test_parse_compass_options() {
        let action = parse(&[
            "compass",
            "--replay",
            "walk.jsonl",
            "--permission",
            "denied",
            "--demo",
            "--duration",
            "30",
        ]);
        assert_eq!(
            action,
            CliAction::Compass {
                global: GlobalOptions::default(),
                options: CompassOptions {
                    replay: Some("walk.jsonl".to_string()),
                    permission: Some(PermissionMode::Deny),
                    demo: true,
                    duration_secs: Some(30),
                    ..CompassOptions::default()
                },
            }
        );
    }

    #[test]
    fn test_parse_errors() {
        let invalid: &[&[&str]] = &[
            &["--unknown"],
            &["navigate"],
            &["locate", "compass"],
            &["--lat", "21.0"],
            &["--lat", "north", "--lon", "39.0"],
            &["locate", "--demo"],
            &["locate", "--save"],
            &["compass", "--permission", "maybe", "--replay", "x"],
            &["compass", "--permission", "granted"],
            &["compass", "--duration"],
            &["--config"],
        ];
        for args in invalid {
            assert_eq!(parse(args), CliAction::ShowHelpDueToError, "accepted {args:?}");
        }
    }
}
