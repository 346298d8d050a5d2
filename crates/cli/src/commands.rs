//! CLI command definitions for chatstats.
//!
//! Provides the command-line interface for reply rankings, question listing,
//! and word cloud rendering over Telegram chat exports.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Main CLI application.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Logging verbosity
    #[arg(short, long, default_value_t = 0, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, env = "CHATSTATS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Rank users by how many questions they answered
    TopUsers(TopUsersArgs),

    /// List messages detected as questions
    Questions(QuestionsArgs),

    /// Render a word cloud of the chat
    WordCloud(WordCloudArgs),
}

/// Top-users arguments.
#[derive(Args, Debug)]
pub struct TopUsersArgs {
    /// Telegram JSON export
    pub input: PathBuf,

    /// Number of users to show (defaults to the configured value)
    #[arg(short = 'n', long)]
    pub top: Option<usize>,

    /// Output format
    #[arg(short, long, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Question listing arguments.
#[derive(Args, Debug)]
pub struct QuestionsArgs {
    /// Telegram JSON export
    pub input: PathBuf,

    /// Output format
    #[arg(short, long, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Word cloud arguments.
#[derive(Args, Debug)]
pub struct WordCloudArgs {
    /// Telegram JSON export
    pub input: PathBuf,

    /// Directory receiving word_cloud.png
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Font file used to draw the words
    #[arg(long)]
    pub font: Option<PathBuf>,

    /// Stop-word list, one word per line
    #[arg(long)]
    pub stop_words: Option<PathBuf>,
}

/// Output format.
#[derive(Debug, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_top_users_with_limit_and_format() {
        let cli = Cli::try_parse_from([
            "chatstats", "-vv", "top-users", "chat.json", "-n", "5", "--format", "json",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::TopUsers(args) => {
                assert_eq!(args.input, PathBuf::from("chat.json"));
                assert_eq!(args.top, Some(5));
                assert_eq!(args.format, OutputFormat::Json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn parses_word_cloud_overrides() {
        let cli = Cli::try_parse_from([
            "chatstats",
            "word-cloud",
            "chat.json",
            "-o",
            "out",
            "--font",
            "Vazir.ttf",
        ])
        .unwrap();

        match cli.command {
            Commands::WordCloud(args) => {
                assert_eq!(args.output_dir, Some(PathBuf::from("out")));
                assert_eq!(args.font, Some(PathBuf::from("Vazir.ttf")));
                assert_eq!(args.stop_words, None);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn input_is_required() {
        assert!(Cli::try_parse_from(["chatstats", "questions"]).is_err());
    }
}
