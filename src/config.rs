//! Argument parsing and validation: thread count, listening port, served root.

use crate::error::StartupError;
use clap::{Arg, Command};
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 6969;

#[derive(Debug, Clone)]
pub struct Config {
    pub threads: usize,
    pub port: u16,
    pub root: PathBuf,
}

impl Config {
    /// Parses `args` (in `std::env::args()` form, argv[0] included) into a validated `Config`.
    /// `-h/--help` prints help and requests a clean exit; any other parse or validation failure
    /// is reported as `StartupError::Args`.
    pub fn parse(args: impl IntoIterator<Item = String>) -> Result<Config, StartupError> {
        let command = build_command();
        let matches = command.try_get_matches_from(args).map_err(|e| {
            use clap::error::ErrorKind;
            match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    StartupError::Help(e.to_string())
                }
                _ => StartupError::Args(e.to_string()),
            }
        })?;

        let cpu_count = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);

        let threads = match matches.get_one::<String>("threads") {
            Some(raw) => {
                let requested: usize = raw
                    .parse()
                    .map_err(|_| StartupError::Args(format!("invalid thread count: {raw}")))?;
                if requested == 0 {
                    return Err(StartupError::Args("thread count must be at least 1".into()));
                }
                requested.min(cpu_count)
            }
            None => cpu_count,
        };

        let port = match matches.get_one::<String>("port") {
            Some(raw) => {
                let parsed: u32 = raw
                    .parse()
                    .map_err(|_| StartupError::Args(format!("invalid port: {raw}")))?;
                if parsed == 0 || parsed > u16::MAX as u32 {
                    return Err(StartupError::Args(format!(
                        "port must be in 1..=65535, got {parsed}"
                    )));
                }
                parsed as u16
            }
            None => DEFAULT_PORT,
        };

        let root = matches
            .get_one::<String>("root")
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

        Ok(Config { threads, port, root })
    }
}

fn build_command() -> Command {
    Command::new("statichttpd")
        .about("Multi-threaded static-file HTTP/1.1 server")
        .arg(
            Arg::new("threads")
                .short('t')
                .long("threads")
                .value_name("N")
                .help("Worker thread count (clamped to the online CPU count)"),
        )
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .value_name("PORT")
                .help("Listening port (default 6969)"),
        )
        .arg(
            Arg::new("root")
                .short('r')
                .long("root")
                .value_name("DIR")
                .help("Directory to serve files from (default: current directory)"),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(v: &[&str]) -> Vec<String> {
        std::iter::once("statichttpd".to_string())
            .chain(v.iter().map(|s| s.to_string()))
            .collect()
    }

    #[test]
    fn defaults_when_no_flags_given() {
        let cfg = Config::parse(args(&[])).unwrap();
        assert_eq!(cfg.port, DEFAULT_PORT);
        assert!(cfg.threads >= 1);
    }

    #[test]
    fn rejects_zero_threads() {
        let err = Config::parse(args(&["-t", "0"])).unwrap_err();
        assert!(matches!(err, StartupError::Args(_)));
    }

    #[test]
    fn clamps_thread_count_to_cpu_count() {
        let cpu_count = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
        let huge = cpu_count * 100;
        let cfg = Config::parse(args(&["-t", &huge.to_string()])).unwrap();
        assert_eq!(cfg.threads, cpu_count);
    }

    #[test]
    fn rejects_port_zero() {
        let err = Config::parse(args(&["-p", "0"])).unwrap_err();
        assert!(matches!(err, StartupError::Args(_)));
    }

    #[test]
    fn rejects_port_above_65535() {
        let err = Config::parse(args(&["-p", "70000"])).unwrap_err();
        assert!(matches!(err, StartupError::Args(_)));
    }

    #[test]
    fn accepts_port_65535() {
        let cfg = Config::parse(args(&["-p", "65535"])).unwrap();
        assert_eq!(cfg.port, 65535);
    }

    #[test]
    fn root_defaults_to_current_dir() {
        let cfg = Config::parse(args(&[])).unwrap();
        assert_eq!(cfg.root, std::env::current_dir().unwrap());
    }

    #[test]
    fn help_flag_yields_help_variant_not_args_error() {
        let err = Config::parse(args(&["--help"])).unwrap_err();
        assert!(matches!(err, StartupError::Help(_)));
    }

    #[test]
    fn root_flag_is_honored() {
        let cfg = Config::parse(args(&["-r", "/tmp"])).unwrap();
        assert_eq!(cfg.root, PathBuf::from("/tmp"));
    }
}
