//! Live stats report flows
//!
//! Refresh and close actions on a previously sent report, written against
//! [`ReportSurface`] so they do not depend on a live chat transport.

use async_trait::async_trait;
use chatpulse_core::ChatPulseError;
use chatpulse_metrics::{Aggregator, render_report};
use tracing::{debug, warn};

/// Callback data carried by the "refresh" button.
pub const REFRESH_DATA: &str = "stats:refresh";
/// Callback data carried by the "close" button.
pub const CLOSE_DATA: &str = "stats:close";
/// Appended to a report once it is closed.
pub const CLOSED_SUFFIX: &str = "(closed)";

/// Notices shown to the user after a button press.
pub const NOTICE_UPDATED: &str = "Updated";
pub const NOTICE_CLOSED: &str = "Closed";
pub const NOTICE_RETRY: &str = "Stats are unavailable right now, try again";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportAction {
    Refresh,
    Close,
}

impl ReportAction {
    pub fn parse(data: &str) -> Option<Self> {
        match data {
            REFRESH_DATA => Some(Self::Refresh),
            CLOSE_DATA => Some(Self::Close),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    /// The edit would leave the message unchanged.
    NotModified,
    /// Any other refusal by the transport.
    Rejected(String),
}

/// A displayed report that can be edited in place.
#[async_trait]
pub trait ReportSurface: Send + Sync {
    /// Replace the report text, with or without the refresh/close buttons.
    async fn edit(&self, text: &str, with_actions: bool) -> Result<(), SurfaceError>;

    /// Remove the buttons, keeping the text.
    async fn clear_actions(&self) -> Result<(), SurfaceError>;
}

/// Re-render the report with a fresh snapshot.
///
/// A failed snapshot leaves the displayed message untouched.
pub async fn refresh(
    surface: &dyn ReportSurface,
    aggregator: &Aggregator,
    now: i64,
) -> Result<(), ChatPulseError> {
    let snapshot = aggregator.snapshot(now).await?;
    match surface.edit(&render_report(&snapshot), true).await {
        Ok(()) => Ok(()),
        Err(SurfaceError::NotModified) => {
            debug!("Report unchanged on refresh");
            Ok(())
        }
        Err(SurfaceError::Rejected(reason)) => Err(ChatPulseError::Transport(reason)),
    }
}

/// Text of a report after closing; the suffix is only ever added once.
pub fn closed_text(current: &str) -> String {
    let text = current.trim_end();
    if text.ends_with(CLOSED_SUFFIX) {
        return text.to_string();
    }
    format!("{text} {CLOSED_SUFFIX}").trim().to_string()
}

/// Mark the report closed and drop its buttons. Never fails.
pub async fn close(surface: &dyn ReportSurface, current_text: &str) {
    match surface.edit(&closed_text(current_text), false).await {
        Ok(()) | Err(SurfaceError::NotModified) => {}
        Err(SurfaceError::Rejected(reason)) => {
            warn!(error = %reason, "Closing report failed, removing buttons only");
            if let Err(e) = surface.clear_actions().await {
                debug!(error = ?e, "Removing report buttons failed");
            }
        }
    }
}
