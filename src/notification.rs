use async_trait::async_trait;

/// Best-effort delivery of an alarm to the user.
#[async_trait]
pub trait AlarmNotifier: Send + Sync + 'static {
    async fn notify(&self, title: &str, message: &str) -> anyhow::Result<()>;
}

/// Writes notifications to the log and stdout.
pub struct LogNotifier;

#[async_trait]
impl AlarmNotifier for LogNotifier {
    async fn notify(&self, title: &str, message: &str) -> anyhow::Result<()> {
        log::info!("[NOTIFY] {title}: {message}");
        println!("\n{title}: {message} ⏰");
        Ok(())
    }
}
