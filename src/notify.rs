use std::sync::Mutex;

/// User facing notifications, the equivalent of a toast.
pub trait Notifier: Send + Sync {
    fn error(&self, message: &str);
    fn success(&self, message: &str);
}

#[derive(Debug, Default)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn error(&self, message: &str) {
        eprintln!("✗ {message}");
    }

    fn success(&self, message: &str) {
        println!("✓ {message}");
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Error(String),
    Success(String),
}

/// Keeps every notification in memory, for tests and embedding.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<Notification> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }

    fn push(&self, notification: Notification) {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(notification);
        }
    }
}

impl Notifier for RecordingNotifier {
    fn error(&self, message: &str) {
        self.push(Notification::Error(message.to_string()));
    }

    fn success(&self, message: &str) {
        self.push(Notification::Success(message.to_string()));
    }
}
