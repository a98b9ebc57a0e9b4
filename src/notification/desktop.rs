use crate::config::settings::NotificationConfig;
use crate::error::{DigestError, Result};
use notify_rust::{Notification, Timeout, Urgency};

/// Longest report excerpt shown in a notification body
const PREVIEW_CHARS: usize = 400;

/// Delivers finished reports as desktop notifications
#[derive(Debug, Clone)]
pub struct Notifier {
    enabled: bool,
    timeout_ms: u32,
}

impl Notifier {
    pub fn new(config: &NotificationConfig) -> Self {
        Self {
            enabled: config.enabled,
            timeout_ms: config.timeout_ms,
        }
    }

    pub fn notify_github_report(&self, repo: &str, report: &str) -> Result<()> {
        self.send(&format!("[GitHub] {} progress", repo), report, "document-save")
    }

    pub fn notify_hn_report(&self, date: &str, report: &str) -> Result<()> {
        self.send(
            &format!("[Hacker News] Tech trends {}", date),
            report,
            "emblem-documents",
        )
    }

    pub fn notify_x_report(&self, subject: &str, report: &str) -> Result<()> {
        self.send(&format!("[X] {} digest", subject), report, "document-save")
    }

    /// Show a failure notification (critical urgency)
    pub fn notify_error(&self, title: &str, message: &str) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        Notification::new()
            .summary(title)
            .body(message)
            .icon("dialog-error")
            .urgency(Urgency::Critical)
            .timeout(Timeout::Milliseconds(self.timeout_ms))
            .show()
            .map_err(|e| DigestError::Notification(e.to_string()))?;
        Ok(())
    }

    fn send(&self, summary: &str, report: &str, icon: &str) -> Result<()> {
        if !self.enabled {
            tracing::debug!("Notifications disabled, skipping: {}", summary);
            return Ok(());
        }

        Notification::new()
            .summary(summary)
            .body(&preview(report, PREVIEW_CHARS))
            .icon(icon)
            .urgency(Urgency::Normal)
            .timeout(Timeout::Milliseconds(self.timeout_ms))
            .show()
            .map_err(|e| DigestError::Notification(e.to_string()))?;

        tracing::info!("Notification sent: {}", summary);
        Ok(())
    }
}

/// First `max_chars` characters of `text`, with an ellipsis when cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= max_chars {
        return trimmed.to_string();
    }
    let mut cut: String = trimmed.chars().take(max_chars).collect();
    cut.push('…');
    cut
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_keeps_short_text() {
        assert_eq!(preview("  short report \n", 50), "short report");
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        let text = "趋势".repeat(300);
        let cut = preview(&text, 5);
        assert_eq!(cut, "趋势趋势趋…");
    }

    #[test]
    fn test_disabled_notifier_is_silent() {
        let notifier = Notifier::new(&NotificationConfig {
            enabled: false,
            ..NotificationConfig::default()
        });
        assert!(notifier.notify_github_report("o/r", "report").is_ok());
        assert!(notifier.notify_error("failed", "details").is_ok());
    }

    #[test]
    #[ignore]
    fn test_notify_hn_report() {
        let notifier = Notifier::new(&NotificationConfig::default());
        assert!(notifier.notify_hn_report("2024-09-01", "## Trends\n- Rust").is_ok());
    }
}
