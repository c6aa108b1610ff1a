//! Alert delivery to the operator channel.
//!
//! Delivery is best effort: a failed send is logged and reported as `false`,
//! never retried and never escalated.

use std::future::Future;
use std::time::Duration;

use crate::config::MonitorConfig;
use crate::error::MonitorError;

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Anything that can deliver a text alert.
pub trait AlertSink: Send + Sync {
    /// Deliver one message. Returns whether delivery succeeded.
    fn send(&self, message: &str) -> impl Future<Output = bool> + Send;
}

/// Posts alerts to a Telegram chat through the bot API.
pub struct TelegramSink {
    http: reqwest::Client,
    api_base: String,
    bot_token: String,
    chat_id: String,
}

impl TelegramSink {
    pub fn new(bot_token: String, chat_id: String, timeout: Duration) -> Result<Self, MonitorError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            api_base: TELEGRAM_API_BASE.to_string(),
            bot_token,
            chat_id,
        })
    }

    /// Point the sink at a different bot API host.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }
}

impl AlertSink for TelegramSink {
    async fn send(&self, message: &str) -> bool {
        let url = format!(
            "{}/bot{}/sendMessage",
            self.api_base.trim_end_matches('/'),
            self.bot_token
        );
        let text = stamp(message);

        let result = self
            .http
            .post(&url)
            .query(&[("chat_id", self.chat_id.as_str()), ("text", text.as_str())])
            .send()
            .await;

        match result {
            Ok(resp) if resp.status().is_success() => {
                tracing::info!(alert = %message, "Telegram alert sent");
                true
            }
            Ok(resp) => {
                let status = resp.status();
                let body = resp.text().await.unwrap_or_default();
                tracing::warn!(%status, body = %body, alert = %message, "Telegram alert rejected");
                false
            }
            Err(e) => {
                // reqwest errors can embed the URL, which carries the bot token.
                tracing::warn!(error = %e.without_url(), alert = %message, "Telegram alert delivery failed");
                false
            }
        }
    }
}

/// Writes alerts to the log only. Used when no alert channel is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl AlertSink for LogSink {
    async fn send(&self, message: &str) -> bool {
        tracing::warn!(alert = %message, "alert (no alert channel configured)");
        true
    }
}

/// The sink selected from configuration.
pub enum Notifier {
    Telegram(TelegramSink),
    Log(LogSink),
}

impl Notifier {
    /// Telegram when both `BOT_TOKEN` and `GROUPCHAT_CHATID` are set, otherwise log-only.
    pub fn from_config(config: &MonitorConfig) -> Result<Self, MonitorError> {
        match (&config.bot_token, &config.chat_id) {
            (Some(token), Some(chat_id)) => Ok(Notifier::Telegram(TelegramSink::new(
                token.clone(),
                chat_id.clone(),
                config.http_timeout(),
            )?)),
            (Some(_), None) | (None, Some(_)) => {
                tracing::warn!("BOT_TOKEN and GROUPCHAT_CHATID must both be set; alerts are log-only");
                Ok(Notifier::Log(LogSink))
            }
            (None, None) => Ok(Notifier::Log(LogSink)),
        }
    }

    pub fn is_log_only(&self) -> bool {
        matches!(self, Notifier::Log(_))
    }
}

impl AlertSink for Notifier {
    async fn send(&self, message: &str) -> bool {
        match self {
            Notifier::Telegram(sink) => sink.send(message).await,
            Notifier::Log(sink) => sink.send(message).await,
        }
    }
}

fn stamp(message: &str) -> String {
    format!(
        "[{}] {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        message
    )
}
