use async_trait::async_trait;

/// Transport-agnostic notification port.
///
/// Delivery is best-effort: callers log failures and never surface them
/// to the operation that triggered the notification.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> anyhow::Result<()>;
}
