use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser};
use std::time::Duration;
use thiserror::Error;

use crate::tmux::heuristics::{
    command_regex, text_regex, DEFAULT_MATCH_COMMAND, DEFAULT_MATCH_TEXT,
};
use crate::tmux::PaneMatcher;

const MIN_INTERVAL_SECS: u64 = 2;
const MIN_SCAN_LINES: usize = 20;
const MIN_MATCH_LINES: usize = 1;

/// Notify when cursor-agent becomes idle in tmux panes
#[derive(Parser, Debug)]
#[command(name = "cursor-notifier")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Discord webhook URL
    #[arg(long, env = "CURSOR_NOTIFIER_WEBHOOK")]
    pub webhook_url: Option<String>,

    /// Polling interval in seconds (minimum 2)
    #[arg(long, env = "CURSOR_NOTIFIER_INTERVAL", default_value_t = 7)]
    pub interval: u64,

    /// How many recent lines to scan for activity (minimum 20)
    #[arg(long, env = "CURSOR_NOTIFIER_LINES", default_value_t = 120)]
    pub lines: usize,

    /// How many recent lines to search for --match-text
    #[arg(long, env = "CURSOR_NOTIFIER_MATCH_LINES", default_value_t = 40)]
    pub match_lines: usize,

    /// Regex matched against the pane's current command (empty disables)
    #[arg(long, env = "CURSOR_NOTIFIER_MATCH_COMMAND", default_value = DEFAULT_MATCH_COMMAND)]
    pub match_command: String,

    /// Case-insensitive regex matched against pane text (empty disables)
    #[arg(long, env = "CURSOR_NOTIFIER_MATCH_TEXT", default_value = DEFAULT_MATCH_TEXT)]
    pub match_text: String,

    /// Enable verbose logging
    #[arg(
        short,
        long,
        env = "CURSOR_NOTIFIER_VERBOSE",
        action = ArgAction::SetTrue,
        value_parser = BoolishValueParser::new()
    )]
    pub verbose: bool,

    /// Do not send webhooks; log only
    #[arg(
        long,
        env = "CURSOR_NOTIFIER_DRY_RUN",
        action = ArgAction::SetTrue,
        value_parser = BoolishValueParser::new()
    )]
    pub dry_run: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("webhook URL not provided. Set CURSOR_NOTIFIER_WEBHOOK or pass --webhook-url.")]
    MissingWebhook,

    #[error("invalid --{flag} pattern: {source}")]
    InvalidPattern {
        flag: &'static str,
        #[source]
        source: regex::Error,
    },
}

/// Validated runtime settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub webhook_url: Option<String>,
    pub interval: Duration,
    pub scan_lines: usize,
    pub match_lines: usize,
    pub matcher: PaneMatcher,
    pub verbose: bool,
    pub dry_run: bool,
}

impl Cli {
    /// Apply floors, compile patterns, and check the webhook requirement
    pub fn into_settings(self) -> Result<Settings, ConfigError> {
        let webhook_url = self.webhook_url.filter(|url| !url.trim().is_empty());
        if webhook_url.is_none() && !self.dry_run {
            return Err(ConfigError::MissingWebhook);
        }

        let command = command_regex(&self.match_command).map_err(|source| {
            ConfigError::InvalidPattern {
                flag: "match-command",
                source,
            }
        })?;
        let text = text_regex(&self.match_text).map_err(|source| ConfigError::InvalidPattern {
            flag: "match-text",
            source,
        })?;
        let matcher = PaneMatcher::from_parts(command, text);

        Ok(Settings {
            webhook_url,
            interval: Duration::from_secs(self.interval.max(MIN_INTERVAL_SECS)),
            scan_lines: self.lines.max(MIN_SCAN_LINES),
            match_lines: self.match_lines.max(MIN_MATCH_LINES),
            matcher,
            verbose: self.verbose,
            dry_run: self.dry_run,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, MutexGuard};

    /// Serializes tests that read or write CURSOR_NOTIFIER_* variables
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn env_lock() -> MutexGuard<'static, ()> {
        ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn parse(args: &[&str]) -> Cli {
        let _guard = env_lock();
        let mut argv = vec!["cursor-notifier"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    fn parse_with_env(key: &str, value: &str) -> Result<Cli, clap::Error> {
        let _guard = env_lock();
        std::env::set_var(key, value);
        let result = Cli::try_parse_from(["cursor-notifier"]);
        std::env::remove_var(key);
        result
    }

    #[test]
    fn test_boolean_env_accepts_common_values() {
        let cli = parse_with_env("CURSOR_NOTIFIER_DRY_RUN", "1").unwrap();
        assert!(cli.dry_run);
        assert!(cli.into_settings().unwrap().dry_run);

        assert!(parse_with_env("CURSOR_NOTIFIER_VERBOSE", "yes").unwrap().verbose);
        assert!(!parse_with_env("CURSOR_NOTIFIER_VERBOSE", "off").unwrap().verbose);
        assert!(!parse_with_env("CURSOR_NOTIFIER_DRY_RUN", "0").unwrap().dry_run);
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&["--webhook-url", "https://example.com/hook"]);
        assert_eq!(cli.interval, 7);
        assert_eq!(cli.lines, 120);
        assert_eq!(cli.match_lines, 40);
        assert_eq!(cli.match_command, DEFAULT_MATCH_COMMAND);
        assert!(!cli.verbose);
        assert!(!cli.dry_run);

        let settings = cli.into_settings().unwrap();
        assert_eq!(settings.interval, Duration::from_secs(7));
        assert_eq!(settings.scan_lines, 120);
        assert!(settings.matcher.matches_command("cursor-agent"));
    }

    #[test]
    fn test_floors_are_enforced() {
        let settings = parse(&[
            "--dry-run",
            "--interval",
            "0",
            "--lines",
            "5",
            "--match-lines",
            "0",
        ])
        .into_settings()
        .unwrap();
        assert_eq!(settings.interval, Duration::from_secs(2));
        assert_eq!(settings.scan_lines, 20);
        assert_eq!(settings.match_lines, 1);
    }

    #[test]
    fn test_missing_webhook_is_fatal() {
        let err = parse(&[]).into_settings().unwrap_err();
        assert!(matches!(err, ConfigError::MissingWebhook));

        let err = parse(&["--webhook-url", "  "]).into_settings().unwrap_err();
        assert!(matches!(err, ConfigError::MissingWebhook));
    }

    #[test]
    fn test_dry_run_without_webhook() {
        let settings = parse(&["--dry-run"]).into_settings().unwrap();
        assert!(settings.dry_run);
        assert!(settings.webhook_url.is_none());
    }

    #[test]
    fn test_invalid_pattern_names_flag() {
        let err = parse(&["--dry-run", "--match-text", "(oops"])
            .into_settings()
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidPattern {
                flag: "match-text",
                ..
            }
        ));

        let err = parse(&["--dry-run", "--match-command", "[z-a]"])
            .into_settings()
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidPattern {
                flag: "match-command",
                ..
            }
        ));
    }
}
