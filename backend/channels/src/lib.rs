use async_trait::async_trait;
use tokio::sync::watch;

pub mod stats_report;
pub mod telegram;
pub mod telegram_commands;

pub use stats_report::{ReportAction, ReportSurface, SurfaceError};
pub use telegram::TelegramAdapter;

/// All chat adapters implement this trait.
#[async_trait]
pub trait ChannelAdapter: Send + Sync {
    /// Human-readable adapter name for logging.
    fn name(&self) -> &str;

    /// Run the adapter until `shutdown` flips to `true`.
    async fn start(&self, shutdown: watch::Receiver<bool>) -> anyhow::Result<()>;
}
