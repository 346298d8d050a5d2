use crate::constants::{
    DEFAULT_DATA_DIR, DEFAULT_FONT_FILE, DEFAULT_STOP_WORDS_FILE, DEFAULT_TOP_N,
};
use crate::types::FragmentPolicy;
use crate::Error;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration for chatstats.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ChatStatsConfig {
    /// Resource and output locations.
    pub paths: PathsConfig,

    /// Text pipeline configuration.
    pub text: TextConfig,

    /// Statistics configuration.
    pub stats: StatsConfig,

    /// Word cloud rendering configuration.
    pub word_cloud: WordCloudConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Resource and output locations.
///
/// Relative `stop_words` and `font` paths are resolved against `data_dir`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory holding the stop-word list and the font.
    pub data_dir: PathBuf,

    /// Stop-word list, one word per line.
    pub stop_words: PathBuf,

    /// Font file used to draw the word cloud.
    pub font: PathBuf,

    /// Directory receiving `word_cloud.png`.
    pub output_dir: PathBuf,
}

/// Text pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TextConfig {
    /// String placed between surviving tokens after stop-word removal.
    ///
    /// Empty by default, which glues neighbouring words together.
    pub token_separator: String,

    /// Map Latin and Arabic-Indic digits to Persian digits.
    pub persian_digits: bool,

    /// Fragments of list-shaped texts that feed the word cloud.
    pub fragment_policy: FragmentPolicy,
}

/// Statistics configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StatsConfig {
    /// Number of users returned by the top-users ranking.
    pub top_n: usize,
}

/// Word cloud rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WordCloudConfig {
    /// Canvas width in pixels.
    pub width: u32,

    /// Canvas height in pixels.
    pub height: u32,

    /// Background color, a CSS name or `#rrggbb`.
    pub background: String,

    /// Maximum number of words drawn.
    pub max_words: usize,

    /// Smallest font size tried before layout gives up.
    pub min_font_size: u32,

    /// Font size of the most frequent word. Canvas height when unset.
    pub max_font_size: Option<u32>,

    /// Font size decrement when a word does not fit.
    pub font_step: u32,

    /// Weight of relative frequency in font sizing, between 0 and 1.
    pub relative_scaling: f32,

    /// Padding around each word in pixels.
    pub margin: u32,

    /// Seed for placement and colors.
    pub seed: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level.
    pub level: LogLevel,
}

/// Log level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Error level.
    Error,

    /// Warning level.
    Warn,

    /// Info level.
    Info,

    /// Debug level.
    Debug,

    /// Trace level.
    Trace,
}

impl ChatStatsConfig {
    /// Default location of the user configuration file.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("chatstats").join("config.toml"))
    }

    /// Load configuration from file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        toml::from_str(&content).map_err(|e| Error::Parse(format!("Failed to parse config: {}", e)))
    }

    /// Save configuration to file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Parse(format!("Failed to serialize config: {}", e)))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Stop-word list path, resolved against the data directory.
    pub fn stop_words_path(&self) -> PathBuf {
        self.paths.data_dir.join(&self.paths.stop_words)
    }

    /// Font path, resolved against the data directory.
    pub fn font_path(&self) -> PathBuf {
        self.paths.data_dir.join(&self.paths.font)
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            stop_words: PathBuf::from(DEFAULT_STOP_WORDS_FILE),
            font: PathBuf::from(DEFAULT_FONT_FILE),
            output_dir: PathBuf::from("."),
        }
    }
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            token_separator: String::new(),
            persian_digits: true,
            fragment_policy: FragmentPolicy::EntitiesOnly,
        }
    }
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
        }
    }
}

impl Default for WordCloudConfig {
    fn default() -> Self {
        Self {
            width: 400,
            height: 200,
            background: "white".to_string(),
            max_words: 200,
            min_font_size: 4,
            max_font_size: None,
            font_step: 1,
            relative_scaling: 0.5,
            margin: 2,
            seed: 42,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Warn,
        }
    }
}
