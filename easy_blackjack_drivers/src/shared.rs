pub mod manual;
pub mod session;

use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
};

use clap::Parser;
use easy_blackjack::{Action, StrategyError, StrategyTable};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Looked up in the home directory when no config file is given.
pub const DEFAULT_CONFIG_FILE: &str = ".easybj.yml";
/// Strategy argument selecting the built-in chart.
pub const BASIC_STRATEGY: &str = "basic";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] io::Error),
    #[error("invalid config file: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("unknown fallback action: {0}")]
    FallbackAction(#[from] serde::de::value::Error),
    #[error("SEED must be a non-negative integer")]
    Seed,
    #[error("NUM must be a natural number")]
    HandCount,
    #[error("must specify number of hands when playing automatically")]
    MissingHandCount,
    #[error("silent mode is only available when playing automatically")]
    SilentWithoutAuto,
    #[error("cannot choose both file and random-based shoe")]
    ConflictingShoes,
    #[error("recording is only available for random-based shoe")]
    RecordWithoutRandom,
    #[error("base bet must be positive")]
    BaseBet,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_bet: f64,
    pub shoe: ConfigShoe,
    /// Present when the game should play automatically.
    pub auto: Option<ConfigAuto>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            base_bet: 1.0,
            shoe: ConfigShoe::default(),
            auto: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigShoe {
    pub seed: u64,
    pub file: Option<PathBuf>,
    pub record: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigAuto {
    #[serde(default = "default_strategy")]
    pub strategy: String,
    pub hands: u64,
    #[serde(default)]
    pub silent: bool,
    #[serde(default = "default_fallback_action")]
    pub fallback_action: String,
}

fn default_strategy() -> String {
    String::from(BASIC_STRATEGY)
}

fn default_fallback_action() -> String {
    String::from("Stand")
}

impl TryInto<AutoSettings> for ConfigAuto {
    type Error = ConfigError;

    fn try_into(self) -> Result<AutoSettings, Self::Error> {
        if self.hands == 0 {
            return Err(ConfigError::HandCount);
        }
        Ok(AutoSettings {
            strategy: StrategySource::from_arg(&self.strategy),
            hands: self.hands,
            silent: self.silent,
            fallback_action: self.fallback_action.parse()?,
        })
    }
}

/// Reads the content of a given config file and parses it to a Config.
pub fn parse_config_from_file<P: AsRef<Path>>(filename: P) -> Result<Config, ConfigError> {
    let file_content = fs::read_to_string(filename)?;
    Ok(serde_yaml::from_str(&file_content)?)
}

/// Loads the given config file, or `~/.easybj.yml` if there is one, or the
/// defaults.
pub fn load_config(filename: Option<&Path>) -> Result<Config, ConfigError> {
    if let Some(filename) = filename {
        return parse_config_from_file(filename);
    }
    match home::home_dir().map(|home| home.join(DEFAULT_CONFIG_FILE)) {
        Some(path) if path.is_file() => parse_config_from_file(path),
        _ => Ok(Config::default()),
    }
}

#[derive(Debug, Parser)]
#[command(name = "easybj", author, about, long_about = None)]
pub struct CommandLineArgs {
    /// Deal from the cards listed in FILE
    #[arg(short = 'f', long = "file", value_name = "FILE")]
    pub shoe_file: Option<PathBuf>,

    /// Seed of the random shoe [default: 0]
    #[arg(short = 'i', long = "seed", value_name = "SEED", allow_hyphen_values = true)]
    pub seed: Option<String>,

    /// Record the cards dealt by the random shoe to FILE
    #[arg(short = 'r', long = "record", value_name = "FILE")]
    pub record: Option<PathBuf>,

    /// Play NUM hands automatically with the strategy in FILE ("basic" for the built-in one)
    #[arg(short = 'a', long = "auto", num_args = 1..=2, value_names = ["FILE", "NUM"], allow_hyphen_values = true)]
    pub auto: Option<Vec<String>>,

    /// Only print the final statistics of automatic play
    #[arg(short, long)]
    pub silent: bool,

    /// The path of the config file [default: ~/.easybj.yml]
    #[arg(short, long, value_name = "CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub base_bet: f64,
    pub shoe: ShoeSettings,
    pub auto: Option<AutoSettings>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShoeSettings {
    Random { seed: u64, record: Option<PathBuf> },
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AutoSettings {
    pub strategy: StrategySource,
    pub hands: u64,
    pub silent: bool,
    pub fallback_action: Action,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StrategySource {
    Basic,
    File(PathBuf),
}

impl StrategySource {
    pub fn from_arg(arg: &str) -> StrategySource {
        if arg.eq_ignore_ascii_case(BASIC_STRATEGY) {
            StrategySource::Basic
        } else {
            StrategySource::File(PathBuf::from(arg))
        }
    }

    pub fn load(&self) -> Result<StrategyTable, StrategyError> {
        match self {
            StrategySource::Basic => Ok(StrategyTable::basic()),
            StrategySource::File(path) => StrategyTable::from_file(path),
        }
    }
}

impl fmt::Display for StrategySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategySource::Basic => write!(f, "{}", BASIC_STRATEGY),
            StrategySource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

impl CommandLineArgs {
    /// Merges the arguments over `config`. Arguments win where both say
    /// something.
    pub fn resolve(&self, config: Config) -> Result<Settings, ConfigError> {
        if config.base_bet <= 0.0 {
            return Err(ConfigError::BaseBet);
        }

        let seed = match &self.seed {
            Some(text) => Some(text.parse::<u64>().map_err(|_| ConfigError::Seed)?),
            None => None,
        };
        if seed.is_some() && self.shoe_file.is_some() {
            return Err(ConfigError::ConflictingShoes);
        }

        let shoe_file = match seed {
            Some(_) => None,
            None => self.shoe_file.clone().or(config.shoe.file),
        };
        let record = self.record.clone().or(config.shoe.record);
        let shoe = match shoe_file {
            Some(_) if record.is_some() => return Err(ConfigError::RecordWithoutRandom),
            Some(file) => ShoeSettings::File(file),
            None => ShoeSettings::Random {
                seed: seed.unwrap_or(config.shoe.seed),
                record,
            },
        };

        let auto = match (&self.auto, config.auto) {
            (Some(values), config_auto) => {
                let [strategy, hands] = values.as_slice() else {
                    return Err(ConfigError::MissingHandCount);
                };
                let hands = hands
                    .parse::<u64>()
                    .ok()
                    .filter(|hands| *hands > 0)
                    .ok_or(ConfigError::HandCount)?;
                let (silent, fallback_action) = match config_auto {
                    Some(config_auto) => (config_auto.silent, config_auto.fallback_action.parse()?),
                    None => (false, Action::Stand),
                };
                Some(AutoSettings {
                    strategy: StrategySource::from_arg(strategy),
                    hands,
                    silent,
                    fallback_action,
                })
            }
            (None, Some(config_auto)) => Some(config_auto.try_into()?),
            (None, None) => None,
        };

        let auto = match auto {
            Some(auto) => Some(AutoSettings {
                silent: auto.silent || self.silent,
                ..auto
            }),
            None if self.silent => return Err(ConfigError::SilentWithoutAuto),
            None => None,
        };

        Ok(Settings {
            base_bet: config.base_bet,
            shoe,
            auto,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(line: &[&str]) -> CommandLineArgs {
        CommandLineArgs::try_parse_from(std::iter::once("easybj").chain(line.iter().copied()))
            .unwrap()
    }

    fn resolve(line: &[&str]) -> Result<Settings, ConfigError> {
        args(line).resolve(Config::default())
    }

    fn get_typical_config() -> Config {
        serde_yaml::from_str(
            "
base_bet: 2.0
shoe:
  seed: 17
auto:
  hands: 500
  fallback_action: Hit
",
        )
        .unwrap()
    }

    #[test]
    fn can_parse_config() {
        let config = get_typical_config();
        assert_eq!(config.base_bet, 2.0);
        assert_eq!(config.shoe.seed, 17);
        assert_eq!(config.shoe.file, None);

        let auto: AutoSettings = config.auto.unwrap().try_into().unwrap();
        assert_eq!(auto.strategy, StrategySource::Basic);
        assert_eq!(auto.hands, 500);
        assert_eq!(auto.fallback_action, Action::Hit);
        assert!(!auto.silent);
    }

    #[test]
    fn empty_config_is_default() {
        let config: Config = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn should_return_error_when_converting_fallback_action() {
        let mut auto = get_typical_config().auto.unwrap();
        auto.fallback_action = String::from("Insurance");
        let converted: Result<AutoSettings, ConfigError> = auto.try_into();
        assert!(matches!(converted, Err(ConfigError::FallbackAction(_))));
    }

    #[test]
    fn auto_section_needs_hands() {
        let result = serde_yaml::from_str::<Config>("auto:\n  strategy: basic\n");
        assert!(result.is_err());
    }

    #[test]
    fn missing_config_file_is_error() {
        assert!(matches!(
            parse_config_from_file("/nonexistent/easybj.yml"),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn defaults_to_interactive_random_shoe() {
        let settings = resolve(&[]).unwrap();
        assert_eq!(
            settings.shoe,
            ShoeSettings::Random {
                seed: 0,
                record: None
            }
        );
        assert_eq!(settings.auto, None);
        assert_eq!(settings.base_bet, 1.0);
    }

    #[test]
    fn automatic_play_arguments() {
        let settings = resolve(&["-s", "-a", "basic", "100", "-i", "5"]).unwrap();
        let auto = settings.auto.unwrap();
        assert_eq!(auto.strategy, StrategySource::Basic);
        assert_eq!(auto.hands, 100);
        assert!(auto.silent);
        assert_eq!(auto.fallback_action, Action::Stand);
        assert_eq!(
            settings.shoe,
            ShoeSettings::Random {
                seed: 5,
                record: None
            }
        );

        let settings = resolve(&["-a", "my.txt", "3", "-f", "shoe.txt"]).unwrap();
        assert_eq!(
            settings.auto.unwrap().strategy,
            StrategySource::File(PathBuf::from("my.txt"))
        );
        assert_eq!(settings.shoe, ShoeSettings::File(PathBuf::from("shoe.txt")));
    }

    #[test]
    fn rejects_bad_numbers() {
        assert!(matches!(resolve(&["-i", "-3"]), Err(ConfigError::Seed)));
        assert!(matches!(resolve(&["-i", "abc"]), Err(ConfigError::Seed)));
        assert!(matches!(
            resolve(&["-a", "basic", "0"]),
            Err(ConfigError::HandCount)
        ));
        assert!(matches!(
            resolve(&["-a", "basic", "-2"]),
            Err(ConfigError::HandCount)
        ));
        assert!(matches!(
            resolve(&["-a", "basic"]),
            Err(ConfigError::MissingHandCount)
        ));
    }

    #[test]
    fn rejects_conflicting_options() {
        assert!(matches!(
            resolve(&["-s"]),
            Err(ConfigError::SilentWithoutAuto)
        ));
        assert!(matches!(
            resolve(&["-f", "shoe.txt", "-i", "3"]),
            Err(ConfigError::ConflictingShoes)
        ));
        assert!(matches!(
            resolve(&["-f", "shoe.txt", "-r", "out.txt"]),
            Err(ConfigError::RecordWithoutRandom)
        ));
    }

    #[test]
    fn arguments_override_config() {
        let settings = args(&["-i", "9"]).resolve(get_typical_config()).unwrap();
        assert_eq!(settings.base_bet, 2.0);
        assert_eq!(
            settings.shoe,
            ShoeSettings::Random {
                seed: 9,
                record: None
            }
        );
        let auto = settings.auto.unwrap();
        assert_eq!(auto.hands, 500);
        assert_eq!(auto.fallback_action, Action::Hit);

        let settings = args(&["-a", "basic", "7"])
            .resolve(get_typical_config())
            .unwrap();
        assert_eq!(settings.auto.unwrap().hands, 7);
    }

    #[test]
    fn seed_on_command_line_beats_config_shoe_file() {
        let mut config = Config::default();
        config.shoe.file = Some(PathBuf::from("shoe.txt"));
        let settings = args(&[]).resolve(config.clone()).unwrap();
        assert_eq!(settings.shoe, ShoeSettings::File(PathBuf::from("shoe.txt")));

        let settings = args(&["-i", "4"]).resolve(config).unwrap();
        assert_eq!(
            settings.shoe,
            ShoeSettings::Random {
                seed: 4,
                record: None
            }
        );
    }
}
