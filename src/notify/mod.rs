use async_trait::async_trait;

use crate::errors::NotifyError;

pub mod alert;
pub mod email;
pub mod telegram;

pub use alert::Alert;
pub use email::EmailNotifier;
pub use telegram::TelegramNotifier;

/// A delivery channel. Each picks the rendering of the alert it needs.
#[async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &'static str;

    async fn send(&self, alert: &Alert) -> Result<(), NotifyError>;
}

/// Fans an alert out to every configured channel, one after another.
/// A failing channel is logged and never stops the others.
pub struct Dispatcher {
    channels: Vec<Box<dyn Notifier>>,
}

impl Dispatcher {
    pub fn new(channels: Vec<Box<dyn Notifier>>) -> Self {
        Self { channels }
    }

    pub fn channel_names(&self) -> Vec<&'static str> {
        self.channels.iter().map(|c| c.name()).collect()
    }

    /// Returns how many channels accepted the alert.
    pub async fn dispatch(&self, alert: &Alert) -> usize {
        let mut delivered = 0;
        for channel in &self.channels {
            match channel.send(alert).await {
                Ok(()) => {
                    tracing::info!("[{}] sent: {}", channel.name(), alert.subject);
                    delivered += 1;
                }
                Err(e) => tracing::error!("[{}] delivery failed: {}", channel.name(), e),
            }
        }
        delivered
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::{Arc, Mutex};

    use super::*;

    /// Records the subject of every alert it is handed.
    #[derive(Clone, Default)]
    pub struct RecordingNotifier {
        pub sent: Arc<Mutex<Vec<String>>>,
    }

    impl RecordingNotifier {
        pub fn subjects(&self) -> Vec<String> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        fn name(&self) -> &'static str {
            "recording"
        }

        async fn send(&self, alert: &Alert) -> Result<(), NotifyError> {
            self.sent.lock().unwrap().push(alert.subject.clone());
            Ok(())
        }
    }

    /// Always fails, like a channel with bad credentials.
    pub struct FailingNotifier;

    #[async_trait]
    impl Notifier for FailingNotifier {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn send(&self, _alert: &Alert) -> Result<(), NotifyError> {
            Err(NotifyError::Rejected("401 Unauthorized".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{FailingNotifier, RecordingNotifier};
    use super::*;

    #[tokio::test]
    async fn failing_chat_does_not_block_email() {
        let email = RecordingNotifier::default();
        let dispatcher = Dispatcher::new(vec![Box::new(email.clone()), Box::new(FailingNotifier)]);

        let delivered = dispatcher.dispatch(&Alert::startup()).await;

        assert_eq!(delivered, 1);
        assert_eq!(email.subjects(), vec!["Pumping Alt bot started"]);
    }

    #[tokio::test]
    async fn failing_email_does_not_block_chat() {
        let chat = RecordingNotifier::default();
        let dispatcher = Dispatcher::new(vec![Box::new(FailingNotifier), Box::new(chat.clone())]);

        assert_eq!(dispatcher.dispatch(&Alert::startup()).await, 1);
        assert_eq!(chat.subjects().len(), 1);
    }

    #[tokio::test]
    async fn no_channels_delivers_nothing() {
        let dispatcher = Dispatcher::new(Vec::new());
        assert_eq!(dispatcher.dispatch(&Alert::startup()).await, 0);
        assert!(dispatcher.channel_names().is_empty());
    }
}
