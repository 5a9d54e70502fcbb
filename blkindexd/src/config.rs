use std::env;
use std::error;
use std::fmt;
use std::fs;
use std::io;
use std::path::PathBuf;

use blkindex::IngestOptions;
use blkindex::network_encoding::DEFAULT_MAX_LENGTH;
use clap::{App, Arg, ArgMatches, SubCommand};
use log::Level;

#[cfg(test)]
mod tests {
    use std::path::Path;
    use tempfile::TempDir;

    use super::*;

    fn args(config: &Path, extra: &[&str]) -> Config {
        let mut argv = vec!["blkindexd".to_string(), format!("--config={}", config.to_string_lossy())];
        argv.extend(extra.iter().map(|s| s.to_string()));
        argv.push("tip".to_string());

        let matches = Config::matches().get_matches_from(argv);
        Config::from_args(&matches).unwrap()
    }

    #[test]
    fn it_creates_a_default_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("blkindex.toml");

        let config = args(&path, &[]);
        assert!(path.exists());
        assert_eq!(config.options.max_length, DEFAULT_MAX_LENGTH);
        assert_eq!(config.options.progress_interval, 10_000);

        // the written file reads back as the same config
        let again = args(&path, &[]);
        assert_eq!(again.blocks_dir, config.blocks_dir);
        assert_eq!(again.db_path, config.db_path);
    }

    #[test]
    fn it_reads_the_file_and_overrides() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("blkindex.toml");
        fs::write(&path, "blocks_dir = \"/data/blocks\"\nmax_length = 1000\n").unwrap();

        let config = args(&path, &["--db", "/tmp/other.db"]);
        assert_eq!(config.blocks_dir, PathBuf::from("/data/blocks"));
        assert_eq!(config.db_path, PathBuf::from("/tmp/other.db"));
        assert_eq!(config.options.max_length, 1000);

        let config = args(&path, &["--blocks-dir", "/elsewhere"]);
        assert_eq!(config.blocks_dir, PathBuf::from("/elsewhere"));
    }

    #[test]
    fn it_rejects_a_broken_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("blkindex.toml");
        fs::write(&path, "max_length = \"lots\"").unwrap();

        let argv = vec!["blkindexd".to_string(), format!("--config={}", path.to_string_lossy()), "tip".to_string()];
        let matches = Config::matches().get_matches_from(argv);
        match Config::from_args(&matches) {
            Err(ConfigError::Parse(_)) => (),
            Err(e) => panic!("expected parse error, got {}", e),
            Ok(_) => panic!("expected parse error"),
        }

        // the broken file is left alone
        assert_eq!(fs::read_to_string(&path).unwrap(), "max_length = \"lots\"");
    }

    #[test]
    fn it_counts_debug_flags() {
        let matches = Config::matches().get_matches_from(vec!["blkindexd", "tip"]);
        assert_eq!(log_level(&matches), Level::Warn);
        let matches = Config::matches().get_matches_from(vec!["blkindexd", "-dd", "tip"]);
        assert_eq!(log_level(&matches), Level::Debug);
        let matches = Config::matches().get_matches_from(vec!["blkindexd", "-dddd", "tip"]);
        assert_eq!(log_level(&matches), Level::Trace);
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Parse(toml::de::Error),
    Serialize(toml::ser::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ConfigError::Io(ref err)        => write!(f, "cannot access config file: {}", err),
            ConfigError::Parse(ref err)     => write!(f, "invalid config file: {}", err),
            ConfigError::Serialize(ref err) => write!(f, "cannot write config file: {}", err),
        }
    }
}

impl error::Error for ConfigError {}

impl From<io::Error> for ConfigError {
    fn from(err: io::Error) -> ConfigError {
        ConfigError::Io(err)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> ConfigError {
        ConfigError::Parse(err)
    }
}

impl From<toml::ser::Error> for ConfigError {
    fn from(err: toml::ser::Error) -> ConfigError {
        ConfigError::Serialize(err)
    }
}

fn home_dir() -> PathBuf {
    env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Contents of the toml config file; missing keys take their default
#[derive(Deserialize, Serialize, Debug)]
#[serde(default)]
pub struct ConfigFile {
    blocks_dir:        PathBuf,
    db_path:           PathBuf,
    max_length:        u64,
    progress_interval: u32,
}

impl Default for ConfigFile {
    fn default() -> ConfigFile {
        ConfigFile {
            blocks_dir:        home_dir().join(".bitcoin").join("blocks"),
            db_path:           home_dir().join(".blkindex.db"),
            max_length:        DEFAULT_MAX_LENGTH,
            progress_interval: 10_000,
        }
    }
}

pub struct Config {
    pub log_level:  Level,
    pub blocks_dir: PathBuf,
    pub db_path:    PathBuf,
    pub options:    IngestOptions,
}

/// Each -d raises the log level by one step
pub fn log_level(matches: &ArgMatches) -> Level {
    match matches.occurrences_of("debug") {
        0 => Level::Warn,
        1 => Level::Info,
        2 => Level::Debug,
        _ => Level::Trace,
    }
}

impl<'a, 'b> Config {
    pub fn from_args(matches: &ArgMatches) -> Result<Config, ConfigError> {
        let config_file_path: PathBuf = matches.value_of("config")
            .map(PathBuf::from)
            .unwrap_or_else(|| home_dir().join(".blkindex.toml"));

        let config_from_file: ConfigFile = if config_file_path.exists() {
            let s = fs::read_to_string(&config_file_path)?;
            toml::from_str(&s)?
        } else {
            Config::create_default(config_file_path)?
        };

        Ok(Config {
            log_level:  log_level(matches),
            blocks_dir: matches.value_of("blocks-dir")
                .map(PathBuf::from)
                .unwrap_or(config_from_file.blocks_dir),
            db_path:    matches.value_of("db")
                .map(PathBuf::from)
                .unwrap_or(config_from_file.db_path),
            options: IngestOptions {
                max_length:        config_from_file.max_length,
                progress_interval: config_from_file.progress_interval,
            },
        })
    }

    pub fn matches() -> App<'a, 'b> {
        App::new("blkindexd")
            .version(crate_version!())
            .author("Chris M., Tomas W.")
            .about("Indexes bitcoin-core blk files by block hash and height")
            .arg(Arg::with_name("config")
                .short("c")
                .long("config")
                .takes_value(true)
                .help("Location of the config file, default: $HOME/.blkindex.toml"))
            .arg(Arg::with_name("debug")
                .short("d")
                .long("debug")
                .multiple(true)
                .help("Turn debugging information on"))
            .arg(Arg::with_name("blocks-dir")
                .short("b")
                .long("blocks-dir")
                .takes_value(true)
                .help("Directory with the blk*.dat files"))
            .arg(Arg::with_name("db")
                .long("db")
                .takes_value(true)
                .help("Index database file"))
            .subcommand(SubCommand::with_name("index")
                .about("Index new blocks from the blk files"))
            .subcommand(SubCommand::with_name("tip")
                .about("Show the height and hash of the tip"))
            .subcommand(SubCommand::with_name("height")
                .about("Get the height of a block")
                .arg(Arg::with_name("hash")
                    .help("Block hash, as shown by block explorers")
                    .required(true)
                    .index(1)))
    }

    pub fn create_default(path: PathBuf) -> Result<ConfigFile, ConfigError> {
        let c = ConfigFile::default();
        let s = toml::to_string(&c)?;
        info!("Making a new config file {} with:\n{}", path.display(), s);
        fs::write(&path, s.as_bytes())?;
        Ok(c)
    }
}
