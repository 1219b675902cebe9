use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

/// Default pattern for the pane's current command
pub const DEFAULT_MATCH_COMMAND: &str = r"^(cursor|cursor-agent)$";

/// Default pattern for pane text, matched case-insensitively
pub const DEFAULT_MATCH_TEXT: &str = r"cursor[-_ ]?agent|Cursor Agent|Cursor-?Agent";

/// Number of non-empty trailing lines inspected for activity
const TAIL_LINES: usize = 20;

/// Token counter shown while the agent is streaming output
static RE_TOKENS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(\d+\s+tokens|tokens)\b").unwrap());

/// Whether pane content looks like an agent mid-generation.
///
/// Only the last 20 non-empty lines are considered, so a stale token counter
/// further up the scrollback does not keep a finished pane "active".
pub fn is_active(content: &str) -> bool {
    let lines: Vec<&str> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    let tail = lines[lines.len().saturating_sub(TAIL_LINES)..].join("\n");

    RE_TOKENS.is_match(&tail)
}

/// Patterns deciding which panes are worth watching
#[derive(Debug, Clone)]
pub struct PaneMatcher {
    command: Option<Regex>,
    text: Option<Regex>,
}

impl PaneMatcher {
    /// Compile both patterns. An empty pattern disables that check.
    pub fn new(command_pattern: &str, text_pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self::from_parts(
            command_regex(command_pattern)?,
            text_regex(text_pattern)?,
        ))
    }

    pub fn from_parts(command: Option<Regex>, text: Option<Regex>) -> Self {
        Self { command, text }
    }

    pub fn matches_command(&self, command: &str) -> bool {
        self.command.as_ref().is_some_and(|re| re.is_match(command))
    }

    /// True when a text pattern is configured, i.e. the buffer fallback applies
    pub fn has_text_pattern(&self) -> bool {
        self.text.is_some()
    }

    pub fn matches_text(&self, content: &str) -> bool {
        self.text.as_ref().is_some_and(|re| re.is_match(content))
    }
}

/// Compile a command pattern; empty means "match nothing"
pub fn command_regex(pattern: &str) -> Result<Option<Regex>, regex::Error> {
    if pattern.is_empty() {
        return Ok(None);
    }
    Regex::new(pattern).map(Some)
}

/// Compile a case-insensitive text pattern; empty means "match nothing"
pub fn text_regex(pattern: &str) -> Result<Option<Regex>, regex::Error> {
    if pattern.is_empty() {
        return Ok(None);
    }
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map(Some)
}

impl Default for PaneMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_MATCH_COMMAND, DEFAULT_MATCH_TEXT).unwrap()
    }
}
