//! Command-line interface definitions.
//!
//! Uses clap derive API for argument parsing. The four output flags are
//! folded into a single [`OutputMode`] value up front, so the rest of the
//! program never sees more than one selected mode.

use std::path::PathBuf;

use clap::Parser;

use crate::errors::QuakeFindError;
use crate::output::ExportTarget;

/// Find the id of the earthquake closest in time and space to a target.
///
/// By default prints the id of the single nearest event inside a 100 km,
/// 16 second window around the target. Widen the search with -r/-w and
/// rerun when nothing matches.
#[derive(Parser, Debug)]
#[command(name = "quakefind")]
#[command(author, version, about)]
#[command(allow_negative_numbers = true)]
pub struct Cli {
    /// Time of earthquake, formatted as YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS
    pub time: String,

    /// Latitude of earthquake
    pub lat: f64,

    /// Longitude of earthquake
    pub lon: f64,

    /// Change search radius from default of 100 km
    #[arg(short = 'r', long = "radius")]
    pub radius: Option<f64>,

    /// Change time window from default of 16 seconds
    #[arg(short = 'w', long = "window")]
    pub window: Option<f64>,

    /// Print all events matching the search window
    #[arg(short = 'a', long = "all")]
    pub all: bool,

    /// Print URL associated with the nearest event
    #[arg(short = 'u', long = "url")]
    pub url: bool,

    /// Print time/distance deltas and azimuth from input parameters to the nearest event
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Send -a output to a file; format determined by extension (.csv or .xlsx)
    #[arg(short = 'o', long = "outfile")]
    pub outfile: Option<PathBuf>,

    /// Send log messages to a file, or "stderr"
    #[arg(long, default_value = "stderr")]
    pub logfile: String,

    /// Minimum logging level
    #[arg(long, default_value = "info", value_parser = parse_log_level)]
    pub loglevel: LogLevel,
}

/// How query results should be presented.
///
/// Exactly one mode per invocation; constructed once from the parsed flags
/// so conflicting selections are unrepresentable past this point.
#[derive(Debug, Clone)]
pub enum OutputMode {
    /// Print the nearest event's id (default)
    Id,
    /// Print the nearest event's ComCat URL
    Url,
    /// Print a full field dump for the nearest event
    Verbose,
    /// Print every matching event, optionally exporting to a file
    All { export: Option<ExportTarget> },
}

impl OutputMode {
    /// Fold the parsed flags into a single mode.
    ///
    /// # Errors
    ///
    /// Returns a usage error when more than one of -a/-u/-v is given, when
    /// -o is given without -a, or when the export extension is unsupported.
    pub fn from_cli(cli: &Cli) -> Result<Self, QuakeFindError> {
        let mode = match (cli.all, cli.url, cli.verbose) {
            (false, false, false) => Self::Id,
            (true, false, false) => {
                let export = cli.outfile.clone().map(ExportTarget::new).transpose()?;
                Self::All { export }
            }
            (false, true, false) => Self::Url,
            (false, false, true) => Self::Verbose,
            _ => {
                return Err(QuakeFindError::Usage(
                    "The -a, -v, and -u options are mutually exclusive. \
                     Choose one of these options. Exiting."
                        .to_string(),
                ));
            }
        };

        if cli.outfile.is_some() && !matches!(mode, Self::All { .. }) {
            return Err(QuakeFindError::Usage(
                "You must select -a and -o together. Exiting.".to_string(),
            ));
        }
        Ok(mode)
    }
}

/// Minimum severity of messages to log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warning,
    Error,
}

impl LogLevel {
    /// The tracing filter directive for this level.
    #[must_use]
    pub const fn as_directive(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warning => "warn",
            Self::Error => "error",
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warning" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            _ => Err(format!(
                "unknown log level: {s} (expected: debug, info, warning, error)"
            )),
        }
    }
}

/// Parse a log level from string.
fn parse_log_level(s: &str) -> Result<LogLevel, String> {
    s.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        let mut full = vec!["quakefind", "2019-07-15T10:39:32", "35.932", "-117.715"];
        full.extend_from_slice(args);
        Cli::parse_from(full)
    }

    #[test]
    fn test_default_mode_is_id() {
        let mode = OutputMode::from_cli(&cli(&[])).unwrap();
        assert!(matches!(mode, OutputMode::Id));
    }

    #[test]
    fn test_single_mode_flags() {
        assert!(matches!(
            OutputMode::from_cli(&cli(&["-u"])).unwrap(),
            OutputMode::Url
        ));
        assert!(matches!(
            OutputMode::from_cli(&cli(&["-v"])).unwrap(),
            OutputMode::Verbose
        ));
        assert!(matches!(
            OutputMode::from_cli(&cli(&["-a"])).unwrap(),
            OutputMode::All { export: None }
        ));
    }

    #[test]
    fn test_mode_flags_are_mutually_exclusive() {
        for args in [&["-a", "-u"][..], &["-a", "-v"], &["-u", "-v"], &["-a", "-u", "-v"]] {
            let err = OutputMode::from_cli(&cli(args)).unwrap_err();
            assert!(matches!(err, QuakeFindError::Usage(_)), "args: {args:?}");
        }
    }

    #[test]
    fn test_outfile_requires_all() {
        let err = OutputMode::from_cli(&cli(&["-o", "out.csv"])).unwrap_err();
        assert!(matches!(err, QuakeFindError::Usage(_)));
    }

    #[test]
    fn test_outfile_extension_checked() {
        let err = OutputMode::from_cli(&cli(&["-a", "-o", "out.txt"])).unwrap_err();
        assert!(matches!(err, QuakeFindError::Usage(_)));

        let mode = OutputMode::from_cli(&cli(&["-a", "-o", "out.xlsx"])).unwrap();
        assert!(matches!(mode, OutputMode::All { export: Some(_) }));
    }

    #[test]
    fn test_log_level_parse() {
        assert_eq!("warning".parse::<LogLevel>().unwrap(), LogLevel::Warning);
        assert_eq!(LogLevel::Warning.as_directive(), "warn");
        assert!("chatty".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_radius_and_window_flags() {
        let parsed = cli(&["-r", "200", "-w", "120"]);
        assert_eq!(parsed.radius, Some(200.0));
        assert_eq!(parsed.window, Some(120.0));
    }
}
