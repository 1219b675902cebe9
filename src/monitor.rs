use anyhow::{Context, Result};
use std::time::Duration;
use tracing::debug;

use crate::config::Settings;
use crate::git::BranchLookup;
use crate::notifier::{Notifier, WebhookSender};
use crate::tmux::{is_active, Pane, PaneMatcher, PaneSource};
use crate::tracker::{TransitionEvent, TransitionTracker};

/// Counters for one poll cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleStats {
    pub panes: usize,
    pub monitored: usize,
    pub notified: usize,
}

/// Polls tmux, classifies monitored panes, and notifies on active -> idle
pub struct Monitor<P, B, W> {
    source: P,
    notifier: Notifier<B, W>,
    matcher: PaneMatcher,
    tracker: TransitionTracker,
    interval: Duration,
    scan_lines: usize,
    match_lines: usize,
}

impl<P, B, W> Monitor<P, B, W>
where
    P: PaneSource,
    B: BranchLookup,
    W: WebhookSender,
{
    pub fn new(source: P, notifier: Notifier<B, W>, settings: &Settings) -> Self {
        Self {
            source,
            notifier,
            matcher: settings.matcher.clone(),
            tracker: TransitionTracker::new(),
            interval: settings.interval,
            scan_lines: settings.scan_lines,
            match_lines: settings.match_lines,
        }
    }

    #[cfg(test)]
    pub fn tracker(&self) -> &TransitionTracker {
        &self.tracker
    }

    /// Poll forever. Only process termination stops this.
    pub async fn run(&mut self) {
        debug!(interval = ?self.interval, "Starting Cursor Agent Notifier");
        loop {
            match self.poll_once().await {
                Ok(stats) => debug!(?stats, tracked = self.tracker.len(), "Poll cycle complete"),
                Err(e) => debug!(error = %format!("{:#}", e), "Poll cycle skipped"),
            }
            tokio::time::sleep(self.interval).await;
        }
    }

    /// Run a single cycle. Fails only when the pane list itself is unavailable.
    pub async fn poll_once(&mut self) -> Result<CycleStats> {
        let panes = self
            .source
            .list_panes()
            .await
            .context("Failed to list tmux panes")?;

        let mut stats = CycleStats {
            panes: panes.len(),
            ..Default::default()
        };

        for pane in &panes {
            if !self.should_monitor(pane).await {
                continue;
            }
            stats.monitored += 1;

            let content = match self.source.capture_pane(&pane.pane_id, self.scan_lines).await {
                Ok(content) => content,
                Err(e) => {
                    debug!(pane = %pane.human_ref(), error = %e, "Failed to capture pane");
                    continue;
                }
            };

            let looks_active = is_active(&content);
            match self.tracker.observe(&pane.pane_id, looks_active) {
                TransitionEvent::Initialized => {
                    debug!(
                        pane = %pane.human_ref(),
                        pid = ?pane.pane_pid,
                        focused = pane.is_focused,
                        active = looks_active,
                        "Initialized state"
                    );
                }
                TransitionEvent::BecameActive => {
                    debug!(pane = %pane.human_ref(), "Became active again");
                }
                TransitionEvent::BecameIdle => {
                    self.notifier.notify_idle(pane).await;
                    stats.notified += 1;
                }
                TransitionEvent::NoChange => {}
            }
        }

        Ok(stats)
    }

    /// Match by command first, then fall back to a short buffer tail
    async fn should_monitor(&self, pane: &Pane) -> bool {
        if self.matcher.matches_command(&pane.current_command) {
            return true;
        }
        if !self.matcher.has_text_pattern() {
            return false;
        }

        match self.source.capture_pane(&pane.pane_id, self.match_lines).await {
            Ok(tail) => self.matcher.matches_text(&tail),
            Err(e) => {
                debug!(pane = %pane.human_ref(), error = %e, "Skipping pane, tail capture failed");
                false
            }
        }
    }
}
