//! CLI application entry point and configuration.
//!
//! This module provides the main CLI application logic, including argument parsing,
//! configuration loading, and command dispatch.

use crate::commands::{Cli, Commands, OutputFormat, QuestionsArgs, TopUsersArgs, WordCloudArgs};
use crate::error::{CliError, Result};
use chatstats_analysis::{ChatStatistics, TextPipeline, UserReplyCount, WordCloud};
use chatstats_core::config::LogLevel;
use chatstats_core::{ChatStatsConfig, Message};
use clap::Parser;
use serde::Serialize;
use std::fmt::Write as _;
use std::path::PathBuf;
use tracing::{debug, info, Level};

/// Main CLI application.
#[derive(Debug)]
pub struct App {
    /// Application configuration.
    pub config: ChatStatsConfig,
    /// Parsed CLI arguments.
    pub cli: Cli,
}

impl App {
    /// Create a new application instance from command line arguments.
    pub fn new() -> Result<Self> {
        Self::from_cli(Cli::parse())
    }

    /// Create an application instance from already parsed arguments.
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let config = Self::load_config(&cli)?;
        Ok(Self { config, cli })
    }

    /// Load configuration from file and environment.
    fn load_config(cli: &Cli) -> Result<ChatStatsConfig> {
        let mut config = match &cli.config {
            Some(config_path) if config_path.exists() => ChatStatsConfig::load(config_path)?,
            Some(config_path) => {
                return Err(CliError::Config(format!(
                    "Configuration file not found: {}",
                    config_path.display()
                )));
            }
            None => match ChatStatsConfig::default_path().filter(|path| path.exists()) {
                Some(default_path) => ChatStatsConfig::load(&default_path)?,
                None => ChatStatsConfig::default(),
            },
        };

        // Override with environment variables
        if let Ok(data_dir) = std::env::var("CHATSTATS_DATA_DIR") {
            config.paths.data_dir = PathBuf::from(data_dir);
        }

        Ok(config)
    }

    /// Run the application.
    pub fn run(self) -> Result<()> {
        self.setup_logging();
        debug!(
            "chatstats {} ({}, built {})",
            env!("CARGO_PKG_VERSION"),
            env!("CLI_PLATFORM"),
            env!("CLI_BUILD_TIMESTAMP")
        );

        match &self.cli.command {
            Commands::TopUsers(args) => self.handle_top_users(args),
            Commands::Questions(args) => self.handle_questions(args),
            Commands::WordCloud(args) => self.handle_word_cloud(args),
        }
    }

    /// Set up logging based on verbosity level, falling back to the config file.
    fn setup_logging(&self) {
        let level = match self.cli.verbose {
            0 => match self.config.logging.level {
                LogLevel::Error => Level::ERROR,
                LogLevel::Warn => Level::WARN,
                LogLevel::Info => Level::INFO,
                LogLevel::Debug => Level::DEBUG,
                LogLevel::Trace => Level::TRACE,
            },
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        };

        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init()
            .ok(); // Ignore errors if a subscriber is already installed
    }

    fn handle_top_users(&self, args: &TopUsersArgs) -> Result<()> {
        let top_n = args.top.unwrap_or(self.config.stats.top_n);
        let stats = ChatStatistics::load(&args.input)?;
        let top = stats.top_users(top_n)?;
        print!("{}", format_top_users(&top, &args.format)?);
        Ok(())
    }

    fn handle_questions(&self, args: &QuestionsArgs) -> Result<()> {
        let stats = ChatStatistics::load(&args.input)?;
        let flags = stats.question_flags();
        let questions: Vec<&Message> = stats
            .chat()
            .messages
            .iter()
            .filter(|message| flags.is_question(message.id))
            .collect();
        print!(
            "{}",
            format_questions(stats.chat().len(), &questions, &args.format)?
        );
        Ok(())
    }

    fn handle_word_cloud(&self, args: &WordCloudArgs) -> Result<()> {
        let stop_words = args
            .stop_words
            .clone()
            .unwrap_or_else(|| self.config.stop_words_path());
        let font = args.font.clone().unwrap_or_else(|| self.config.font_path());
        let output_dir = args
            .output_dir
            .clone()
            .unwrap_or_else(|| self.config.paths.output_dir.clone());

        if !font.exists() {
            return Err(CliError::Argument(format!(
                "font not found: {} (pass --font or set paths.font)",
                font.display()
            )));
        }

        let pipeline = TextPipeline::from_text_config(&self.config.text, &stop_words)?;
        let stats = ChatStatistics::from_path(&args.input, pipeline)?
            .with_fragment_policy(self.config.text.fragment_policy);
        let renderer = WordCloud::from_font_file(self.config.word_cloud.clone(), &font)?;

        let path = stats.generate_word_cloud(&output_dir, &renderer)?;
        info!("Rendered word cloud for {}", args.input.display());
        println!("{}", path.display());
        Ok(())
    }
}

/// Render the top-users ranking.
pub fn format_top_users(top: &[UserReplyCount], format: &OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(top)? + "\n"),
        OutputFormat::Text => {
            if top.is_empty() {
                return Ok("no replies to questions found\n".to_string());
            }
            let width = top.iter().map(|entry| entry.user.chars().count()).max().unwrap_or(0);
            let mut out = String::new();
            for (rank, entry) in top.iter().enumerate() {
                let _ = writeln!(
                    out,
                    "{:>2}. {:<width$}  {}",
                    rank + 1,
                    entry.user,
                    entry.count,
                    width = width
                );
            }
            Ok(out)
        }
    }
}

#[derive(Serialize)]
struct QuestionRow<'a> {
    id: i64,
    from: Option<&'a str>,
    text: String,
}

#[derive(Serialize)]
struct QuestionReport<'a> {
    total_messages: usize,
    questions: Vec<QuestionRow<'a>>,
}

/// Render the question listing.
pub fn format_questions(
    total_messages: usize,
    questions: &[&Message],
    format: &OutputFormat,
) -> Result<String> {
    let rows: Vec<QuestionRow<'_>> = questions
        .iter()
        .map(|message| QuestionRow {
            id: message.id,
            from: message.from.as_ref().and_then(|from| from.as_deref()),
            text: message.flat_text().into_owned(),
        })
        .collect();

    match format {
        OutputFormat::Json => {
            let report = QuestionReport {
                total_messages,
                questions: rows,
            };
            Ok(serde_json::to_string_pretty(&report)? + "\n")
        }
        OutputFormat::Text => {
            let mut out = String::new();
            let _ = writeln!(
                out,
                "{} of {} messages are questions",
                rows.len(),
                total_messages
            );
            for row in &rows {
                let text = row.text.replace('\n', " ");
                let _ = writeln!(
                    out,
                    "- [{}] {}: {}",
                    row.id,
                    row.from.unwrap_or("-"),
                    text
                );
            }
            Ok(out)
        }
    }
}

/// Parse arguments, load configuration, and run the selected command.
pub fn run() -> Result<()> {
    let app = App::new()?;
    app.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn explicit_missing_config_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        let cli = parse(&[
            "chatstats",
            "--config",
            missing.to_str().unwrap(),
            "questions",
            "chat.json",
        ]);
        assert!(matches!(App::from_cli(cli), Err(CliError::Config(_))));
    }

    #[test]
    fn explicit_config_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[stats]\ntop_n = 3\n\n[logging]\nlevel = \"debug\"\n").unwrap();

        let cli = parse(&[
            "chatstats",
            "-c",
            path.to_str().unwrap(),
            "top-users",
            "chat.json",
        ]);
        let app = App::from_cli(cli).unwrap();
        assert_eq!(app.config.stats.top_n, 3);
        assert_eq!(app.config.logging.level, LogLevel::Debug);
    }

    #[test]
    fn formats_top_users_as_aligned_text() {
        let top = vec![
            UserReplyCount {
                user: "Reza".to_string(),
                count: 12,
            },
            UserReplyCount {
                user: "Al".to_string(),
                count: 3,
            },
        ];
        let text = format_top_users(&top, &OutputFormat::Text).unwrap();
        assert_eq!(text, " 1. Reza  12\n 2. Al    3\n");

        let empty = format_top_users(&[], &OutputFormat::Text).unwrap();
        assert_eq!(empty, "no replies to questions found\n");
    }

    #[test]
    fn formats_top_users_as_ordered_json() {
        let top = vec![
            UserReplyCount {
                user: "Zed".to_string(),
                count: 2,
            },
            UserReplyCount {
                user: "Amir".to_string(),
                count: 1,
            },
        ];
        let output = format_top_users(&top, &OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(
            value,
            json!([{"user": "Zed", "count": 2}, {"user": "Amir", "count": 1}])
        );
    }

    #[test]
    fn formats_question_report() {
        let messages: Vec<Message> = serde_json::from_value(json!([
            {"id": 4, "text": "where\nnow?", "from": "Sara"},
            {"id": 9, "text": ["why ", {"type": "bold", "text": "not"}, "?"], "from": null}
        ]))
        .unwrap();
        let refs: Vec<&Message> = messages.iter().collect();

        let text = format_questions(20, &refs, &OutputFormat::Text).unwrap();
        assert_eq!(
            text,
            "2 of 20 messages are questions\n- [4] Sara: where now?\n- [9] -: why not?\n"
        );

        let json_out = format_questions(20, &refs, &OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json_out).unwrap();
        assert_eq!(value["total_messages"], 20);
        assert_eq!(value["questions"][1]["from"], serde_json::Value::Null);
        assert_eq!(value["questions"][0]["text"], "where\nnow?");
    }
}
