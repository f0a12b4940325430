use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{Alert, Notifier};
use crate::config::TelegramConfig;
use crate::errors::NotifyError;

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
}

/// The Bot API answers `{"ok": false, "description": ...}` on rejection.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    description: Option<String>,
}

pub struct TelegramNotifier {
    client: reqwest::Client,
    endpoint: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(config: &TelegramConfig) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/bot{}/sendMessage", config.api_base, config.bot_token),
            chat_id: config.chat_id.clone(),
        })
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    fn name(&self) -> &'static str {
        "telegram"
    }

    async fn send(&self, alert: &Alert) -> Result<(), NotifyError> {
        let body = SendMessage {
            chat_id: &self.chat_id,
            text: &alert.chat,
            parse_mode: "HTML",
        };

        // the endpoint embeds the bot token, keep it out of error text
        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| NotifyError::Http(e.without_url()))?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| NotifyError::Http(e.without_url()))?;

        match serde_json::from_slice::<ApiResponse>(&bytes) {
            Ok(api) if status.is_success() && api.ok => Ok(()),
            Ok(api) => Err(NotifyError::Rejected(
                api.description.unwrap_or_else(|| status.to_string()),
            )),
            Err(_) if status.is_success() => Ok(()),
            Err(_) => Err(NotifyError::Rejected(status.to_string())),
        }
    }
}
