use crate::error::CompilerError;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Lisp-style tree dump
    #[default]
    Sexpr,
    /// Fully parenthesized, re-parseable source
    Source,
    /// The tree as JSON
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sexpr" => Ok(OutputFormat::Sexpr),
            "source" => Ok(OutputFormat::Source),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format '{}'", other)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OutputFormat::Sexpr => write!(f, "sexpr"),
            OutputFormat::Source => write!(f, "source"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub output: OutputFormat,
    #[serde(default)]
    pub show_tokens: bool,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_log_filter() -> String {
    String::from("warn")
}

impl Default for Config {
    fn default() -> Self {
        Config {
            output: OutputFormat::default(),
            show_tokens: false,
            log_filter: default_log_filter(),
        }
    }
}

impl Config {
    /// Reads the config file, falling back to defaults when it is missing or malformed.
    /// `LOXFRONT_OUTPUT` overrides the configured output format.
    pub fn load() -> Self {
        let config_path = Self::get_config_path();

        let mut config = fs::read_to_string(&config_path)
            .ok()
            .and_then(|contents| Self::from_json(&contents).ok())
            .unwrap_or_default();

        if let Ok(output) = env::var("LOXFRONT_OUTPUT") {
            if let Ok(output) = output.parse() {
                config.output = output;
            }
        }

        config
    }

    pub fn from_json(contents: &str) -> Result<Self, CompilerError> {
        Ok(serde_json::from_str(contents)?)
    }

    pub fn save(&self) -> Result<PathBuf, CompilerError> {
        let config_path = Self::get_config_path();
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        fs::write(&config_path, contents)?;
        Ok(config_path)
    }

    pub fn get_config_dir() -> PathBuf {
        if let Ok(custom_dir) = env::var("LOXFRONT_HOME") {
            return PathBuf::from(custom_dir);
        }

        let home = if cfg!(windows) {
            env::var("USERPROFILE")
        } else {
            env::var("HOME")
        };
        PathBuf::from(home.unwrap_or_else(|_| String::from("."))).join(".loxfront")
    }

    pub fn get_config_path() -> PathBuf {
        Self::get_config_dir().join("config.json")
    }
}
