//! Command line and environment configuration

use anyhow::anyhow;
use clap::{value_parser, Arg, ArgMatches, Command};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Log line layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub data_dir: PathBuf,
    pub session_ttl: Duration,
    pub sweep_interval: Duration,
    pub log_file: Option<PathBuf>,
    pub log_format: LogFormat,
}

/// Argument definitions. Every flag falls back to a `TOLLGATE_*` variable.
pub fn command() -> Command {
    Command::new("tollgate-server")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Cookie-session web front door with signed, revocable tokens")
        .arg(
            Arg::new("bind")
                .long("bind")
                .value_name("ADDR")
                .help("Bind address")
                .env("TOLLGATE_BIND")
                .value_parser(value_parser!(SocketAddr))
                .default_value("127.0.0.1:8000"),
        )
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .value_name("PATH")
                .help("Directory holding the user database")
                .env("TOLLGATE_DATA_DIR")
                .value_parser(value_parser!(PathBuf))
                .default_value("./data"),
        )
        .arg(
            Arg::new("session-ttl")
                .long("session-ttl")
                .value_name("SECONDS")
                .help("Lifetime of a login session")
                .env("TOLLGATE_SESSION_TTL")
                .value_parser(value_parser!(u64).range(1..))
                .default_value("1800"),
        )
        .arg(
            Arg::new("sweep-interval")
                .long("sweep-interval")
                .value_name("SECONDS")
                .help("How often expired revocations and keys are dropped")
                .env("TOLLGATE_SWEEP_INTERVAL")
                .value_parser(value_parser!(u64).range(1..))
                .default_value("60"),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .value_name("PATH")
                .help("Write logs to this file instead of stdout")
                .env("TOLLGATE_LOG_FILE")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .value_name("FORMAT")
                .help("Log line format")
                .env("TOLLGATE_LOG_FORMAT")
                .value_parser(["text", "json"])
                .default_value("text"),
        )
}

fn required<T: Clone + Send + Sync + 'static>(matches: &ArgMatches, id: &str) -> anyhow::Result<T> {
    matches
        .get_one::<T>(id)
        .cloned()
        .ok_or_else(|| anyhow!("Missing value for --{}", id))
}

impl ServerConfig {
    pub fn from_matches(matches: &ArgMatches) -> anyhow::Result<Self> {
        let log_format = match required::<String>(matches, "log-format")?.as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Ok(ServerConfig {
            bind: required(matches, "bind")?,
            data_dir: required(matches, "data-dir")?,
            session_ttl: Duration::from_secs(required(matches, "session-ttl")?),
            sweep_interval: Duration::from_secs(required(matches, "sweep-interval")?),
            log_file: matches.get_one::<PathBuf>("log-file").cloned(),
            log_format,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> ServerConfig {
        let matches = command()
            .try_get_matches_from(std::iter::once("tollgate-server").chain(args.iter().copied()))
            .unwrap();
        ServerConfig::from_matches(&matches).unwrap()
    }

    #[test]
    fn test_flags_override_defaults() {
        let config = parse(&[
            "--bind",
            "0.0.0.0:9000",
            "--data-dir",
            "/tmp/tollgate",
            "--session-ttl",
            "60",
            "--sweep-interval",
            "5",
            "--log-file",
            "/tmp/tollgate.log",
            "--log-format",
            "json",
        ]);

        assert_eq!(config.bind, "0.0.0.0:9000".parse().unwrap());
        assert_eq!(config.data_dir, PathBuf::from("/tmp/tollgate"));
        assert_eq!(config.session_ttl, Duration::from_secs(60));
        assert_eq!(config.sweep_interval, Duration::from_secs(5));
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/tollgate.log")));
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_rejects_bad_values() {
        for args in [
            ["--bind", "not-an-address"],
            ["--session-ttl", "0"],
            ["--session-ttl", "-5"],
            ["--log-format", "xml"],
        ] {
            let result = command()
                .try_get_matches_from(std::iter::once("tollgate-server").chain(args));
            assert!(result.is_err(), "accepted {:?}", args);
        }
    }
}
