//! Command line and on-disk locations

use crate::game::Position;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Environment variable overriding the data directory
pub const HOME_ENV: &str = "CIPHER_QUEST_HOME";

pub const PROGRESS_FILE: &str = "progress.json";
pub const LEADERBOARD_FILE: &str = "leaderboard.sqlite3";
pub const LOG_FILE: &str = "cipher-quest.log";

#[derive(Debug, Parser)]
#[command(name = "cipher-quest", version)]
#[command(about = "Decode ENIGMA's transmissions, one mission at a time")]
pub struct Cli {
    /// Where progress, leaderboard and logs are kept
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Mission catalog to load instead of the bundled one
    #[arg(long, global = true)]
    pub catalog: Option<PathBuf>,

    /// Current position for field missions, as LAT,LON
    #[arg(long, global = true, value_parser = parse_position, allow_hyphen_values = true)]
    pub location: Option<Position>,

    /// Log filter, e.g. "debug" or "cipher_quest=trace" (RUST_LOG also works)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the game (default)
    Play {
        /// Agent name shown on the leaderboard
        #[arg(long)]
        name: Option<String>,
    },
    /// List missions with their lock state
    Missions,
    /// Encode text with a transform
    Encode(TransformArgs),
    /// Decode text with a transform
    Decode(TransformArgs),
    /// Show the leaderboard
    Leaderboard,
    /// List completed missions with dates and hints used
    Log,
    /// Print a QR code for text or a mission's payload
    Qr {
        /// Text to encode
        text: Option<String>,

        /// Mission whose QR payload to encode
        #[arg(long, conflicts_with = "text")]
        mission: Option<u32>,
    },
    /// Wipe all saved progress
    Reset {
        /// Confirm without prompting
        #[arg(long, default_value_t = false)]
        yes: bool,
    },
}

#[derive(Debug, Args)]
pub struct TransformArgs {
    /// caesar, rot13, vigenere, base64 or hex
    pub transform: String,

    /// Shift for caesar, keyword for vigenere
    #[arg(long, allow_hyphen_values = true)]
    pub key: Option<String>,

    pub text: String,
}

fn parse_position(text: &str) -> Result<Position, String> {
    Position::parse(text).ok_or_else(|| format!("expected LAT,LON in degrees, got '{}'", text))
}

/// Resolved file locations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub catalog: Option<PathBuf>,
    pub log_filter: String,
}

impl Config {
    pub fn from_cli(cli: &Cli) -> Self {
        let env_home = std::env::var_os(HOME_ENV).map(PathBuf::from);
        Self {
            data_dir: resolve_data_dir(cli.data_dir.clone(), env_home, dirs::data_dir()),
            catalog: cli.catalog.clone(),
            log_filter: cli
                .log_level
                .clone()
                .or_else(|| std::env::var("RUST_LOG").ok())
                .unwrap_or_else(|| "info".to_string()),
        }
    }

    pub fn progress_path(&self) -> PathBuf {
        self.data_dir.join(PROGRESS_FILE)
    }

    pub fn leaderboard_path(&self) -> PathBuf {
        self.data_dir.join(LEADERBOARD_FILE)
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(LOG_FILE)
    }
}

/// Flag, then environment, then the platform data dir, then the working dir
pub fn resolve_data_dir(
    flag: Option<PathBuf>,
    env_home: Option<PathBuf>,
    platform: Option<PathBuf>,
) -> PathBuf {
    flag.or(env_home.filter(|p| !p.as_os_str().is_empty()))
        .or_else(|| platform.map(|p| p.join("cipher-quest")))
        .unwrap_or_else(|| Path::new(".cipher-quest").to_path_buf())
}

/// Send tracing output to the log file. The terminal belongs to the UI.
pub fn init_logging(config: &Config) -> anyhow::Result<()> {
    use anyhow::Context;
    use tracing_subscriber::EnvFilter;

    std::fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("creating {}", config.data_dir.display()))?;
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(config.log_path())
        .with_context(|| format!("opening {}", config.log_path().display()))?;

    let filter = EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("installing logger: {}", e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_dir_precedence() {
        let flag = Some(PathBuf::from("/flag"));
        let env = Some(PathBuf::from("/env"));
        let platform = Some(PathBuf::from("/share"));

        assert_eq!(resolve_data_dir(flag, env.clone(), platform.clone()), PathBuf::from("/flag"));
        assert_eq!(resolve_data_dir(None, env, platform.clone()), PathBuf::from("/env"));
        assert_eq!(resolve_data_dir(None, None, platform), PathBuf::from("/share/cipher-quest"));
        assert_eq!(resolve_data_dir(None, None, None), PathBuf::from(".cipher-quest"));
    }

    #[test]
    fn file_names() {
        let config = Config {
            data_dir: PathBuf::from("/data"),
            catalog: None,
            log_filter: "info".to_string(),
        };
        assert_eq!(config.progress_path(), PathBuf::from("/data/progress.json"));
        assert_eq!(config.leaderboard_path(), PathBuf::from("/data/leaderboard.sqlite3"));
        assert_eq!(config.log_path(), PathBuf::from("/data/cipher-quest.log"));
    }

    #[test]
    fn parses_subcommands() {
        let cli = Cli::try_parse_from([
            "cipher-quest",
            "--location",
            "37.77,-122.41",
            "encode",
            "caesar",
            "--key",
            "-3",
            "HELLO",
        ])
        .unwrap();
        assert_eq!(cli.location, Some(Position::new(37.77, -122.41)));
        match cli.command {
            Some(Command::Encode(args)) => {
                assert_eq!(args.transform, "caesar");
                assert_eq!(args.key.as_deref(), Some("-3"));
                assert_eq!(args.text, "HELLO");
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn no_subcommand_means_play() {
        let cli = Cli::try_parse_from(["cipher-quest"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn reset_flag() {
        let cli = Cli::try_parse_from(["cipher-quest", "reset", "--yes"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Reset { yes: true })));
    }

    #[test]
    fn qr_takes_text_or_a_mission() {
        let cli = Cli::try_parse_from(["cipher-quest", "qr", "--mission", "30"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Qr { text: None, mission: Some(30) })));

        let cli = Cli::try_parse_from(["cipher-quest", "qr", "PIER NINE"]).unwrap();
        match cli.command {
            Some(Command::Qr { text, mission }) => {
                assert_eq!(text.as_deref(), Some("PIER NINE"));
                assert_eq!(mission, None);
            }
            other => panic!("unexpected command {:?}", other),
        }

        assert!(Cli::try_parse_from(["cipher-quest", "qr", "HI", "--mission", "30"]).is_err());
    }

    #[test]
    fn log_subcommand() {
        let cli = Cli::try_parse_from(["cipher-quest", "log"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Log)));
    }
}
