mod client;
pub mod heuristics;

pub use client::TmuxClient;
pub use heuristics::{is_active, PaneMatcher};

use anyhow::Result;

/// Snapshot of one tmux pane, rebuilt on every poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pane {
    /// Session name (e.g., "work")
    pub session_name: String,
    /// Window index within the session
    pub window_index: String,
    /// Pane index within the window
    pub pane_index: String,
    /// Stable pane ID (e.g., "%3"), survives reordering
    pub pane_id: String,
    /// Whether this is the focused pane of its window
    pub is_focused: bool,
    /// Working directory of the foreground process
    pub current_path: String,
    /// PID of the pane's process
    pub pane_pid: Option<u32>,
    /// Name of the running command
    pub current_command: String,
}

impl Pane {
    /// Human-readable target, e.g. "work:0.1"
    pub fn human_ref(&self) -> String {
        format!("{}:{}.{}", self.session_name, self.window_index, self.pane_index)
    }
}

/// Source of pane listings and scrollback captures
pub trait PaneSource {
    /// List every pane on the server, in tmux order
    async fn list_panes(&self) -> Result<Vec<Pane>>;

    /// Capture roughly the last `lines` lines of a pane, wrapped lines joined
    async fn capture_pane(&self, pane_id: &str, lines: usize) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_ref() {
        let pane = Pane {
            session_name: "work".into(),
            window_index: "0".into(),
            pane_index: "1".into(),
            pane_id: "%4".into(),
            is_focused: false,
            current_path: "/home/u/proj".into(),
            pane_pid: Some(4242),
            current_command: "cursor-agent".into(),
        };
        assert_eq!(pane.human_ref(), "work:0.1");
    }
}
