//! Command-line argument parsing.

use std::env;
use std::path::PathBuf;

/// Default API port.
pub const DEFAULT_PORT: u16 = 8000;

/// Parsed CLI arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct CliOptions {
    /// TOML configuration file.
    pub config: Option<PathBuf>,
    /// Built-in preset name.
    pub preset: Option<String>,
    /// Random seed override.
    pub seed: Option<u64>,
    /// State file override.
    pub state_path: Option<PathBuf>,
    /// Event log override.
    pub log_path: Option<PathBuf>,
    /// Serve the status API.
    pub serve: bool,
    /// API port.
    pub port: u16,
    /// `--help` was given.
    pub help: bool,
}

impl Default for CliOptions {
    fn default() -> Self {
        Self {
            config: None,
            preset: None,
            seed: None,
            state_path: None,
            log_path: None,
            serve: false,
            port: DEFAULT_PORT,
            help: false,
        }
    }
}

/// Parses the process arguments.
///
/// # Errors
///
/// Returns a message describing the first invalid argument.
pub fn parse_args() -> Result<CliOptions, String> {
    parse_args_from(env::args().skip(1))
}

/// Parses arguments (without the program name).
///
/// # Errors
///
/// Returns a message describing the first invalid argument.
pub fn parse_args_from<I, S>(args: I) -> Result<CliOptions, String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let args: Vec<String> = args.into_iter().map(Into::into).collect();
    let mut opts = CliOptions::default();
    let mut i = 0usize;

    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                opts.help = true;
                return Ok(opts);
            }
            "--config" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --config (expected a TOML path)")?;
                if opts.config.replace(PathBuf::from(path)).is_some() {
                    return Err("--config provided more than once".to_string());
                }
            }
            "--preset" => {
                i += 1;
                let name = args.next_or_err(i, "missing value for --preset (expected a preset name)")?;
                if opts.preset.replace(name.to_string()).is_some() {
                    return Err("--preset provided more than once".to_string());
                }
            }
            "--seed" => {
                i += 1;
                let raw = args.next_or_err(i, "missing value for --seed (expected a u64)")?;
                let seed = raw
                    .parse::<u64>()
                    .map_err(|_| format!("--seed value \"{raw}\" is not a valid u64"))?;
                opts.seed = Some(seed);
            }
            "--state" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --state (expected a file path)")?;
                opts.state_path = Some(PathBuf::from(path));
            }
            "--log" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --log (expected a file path)")?;
                opts.log_path = Some(PathBuf::from(path));
            }
            "--serve" => opts.serve = true,
            "--port" => {
                i += 1;
                let raw = args.next_or_err(i, "missing value for --port (expected a u16)")?;
                opts.port = raw
                    .parse::<u16>()
                    .map_err(|_| format!("--port value \"{raw}\" is not a valid u16"))?;
            }
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }

    if opts.config.is_some() && opts.preset.is_some() {
        return Err(
            "arguments `--config` and `--preset` are mutually exclusive; choose one source"
                .to_string(),
        );
    }

    Ok(opts)
}

trait SliceArgExt {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String>;
}

impl SliceArgExt for [String] {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String> {
        self.get(index)
            .map(String::as_str)
            .ok_or_else(|| err.to_string())
    }
}

/// Prints usage to stderr.
pub fn print_usage() {
    eprintln!("bess-sim: battery storage controller simulator");
    eprintln!();
    eprintln!("Usage: bess-sim [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config <path>    Load configuration from a TOML file");
    eprintln!("  --preset <name>    Use a built-in preset (baseline, facility)");
    eprintln!("  --seed <u64>       Fix the random seed");
    eprintln!("  --state <path>     Override the JSON state file");
    eprintln!("  --log <path>       Override the CSV event log");
    eprintln!("  --serve            Serve the status API (requires the `api` feature)");
    eprintln!("  --port <u16>       API port (default: {DEFAULT_PORT})");
    eprintln!("  --help             Show this help message");
    eprintln!();
    eprintln!("If neither --config nor --preset is given, the baseline preset is used.");
}
