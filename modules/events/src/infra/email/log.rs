use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::Notifier;

/// Fallback notifier used when no SMTP section is configured:
/// records the notification in the log and delivers nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, recipient: &str, subject: &str, _body: &str) -> anyhow::Result<()> {
        info!("Email delivery disabled; would send '{subject}' to {recipient}");
        Ok(())
    }
}
