use super::error::NotifyError;
use super::{Delivery, Notifier, SkipReason};
use crate::config::Settings;
use crate::domain::entry::Entry;
use anyhow::Context;
use reqwest::Url;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

const EMBED_COLOR: u32 = 0xFF0000;
/// Discord rejects messages carrying more embeds than this.
pub const MAX_EMBEDS_PER_MESSAGE: usize = 10;
const WOWPROGRESS_BASE_URL: &str = "https://www.wowprogress.com/";
const WARCRAFTLOGS_BASE_URL: &str = "https://www.warcraftlogs.com/";

#[derive(Clone)]
pub struct WebhookCredentials {
    pub id: String,
    pub token: String,
}

impl WebhookCredentials {
    /// Both halves are needed; either one missing disables notification.
    pub fn from_parts(id: Option<&str>, token: Option<&str>) -> Option<Self> {
        Some(Self {
            id: id?.to_string(),
            token: token?.to_string(),
        })
    }
}

impl fmt::Debug for WebhookCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookCredentials")
            .field("id", &self.id)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Fixed parts of every message.
#[derive(Debug, Clone)]
pub struct MessageOptions {
    pub content: String,
    pub username: String,
    /// Region segment of the character profile links (e.g. `eu`).
    pub region: String,
}

impl Default for MessageOptions {
    fn default() -> Self {
        Self {
            content: crate::config::DEFAULT_WEBHOOK_CONTENT.to_string(),
            username: crate::config::DEFAULT_WEBHOOK_USERNAME.to_string(),
            region: crate::config::DEFAULT_WEBHOOK_REGION.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DiscordNotifier {
    http: reqwest::Client,
    base_url: String,
    credentials: Option<WebhookCredentials>,
    message: MessageOptions,
}

impl DiscordNotifier {
    pub fn new(
        base_url: impl Into<String>,
        credentials: Option<WebhookCredentials>,
        message: MessageOptions,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build webhook http client")?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            credentials,
            message,
        })
    }

    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let credentials = WebhookCredentials::from_parts(
            settings.webhook_id.as_deref(),
            settings.webhook_token.as_deref(),
        );
        let message = MessageOptions {
            content: settings.webhook_content.clone(),
            username: settings.webhook_username.clone(),
            region: settings.webhook_region.clone(),
        };
        Self::new(
            settings.webhook_base_url.clone(),
            credentials,
            message,
            settings.webhook_timeout,
        )
    }

    fn endpoint(&self, credentials: &WebhookCredentials) -> String {
        format!(
            "{}/api/webhooks/{}/{}",
            self.base_url.trim_end_matches('/'),
            credentials.id,
            credentials.token
        )
    }

    fn build_payload<'a>(&'a self, entries: &'a [Entry]) -> Result<WebhookPayload<'a>, NotifyError> {
        let embeds = entries
            .iter()
            .map(|entry| self.build_embed(entry))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(WebhookPayload {
            content: &self.message.content,
            username: &self.message.username,
            embeds,
        })
    }

    fn build_embed<'a>(&self, entry: &'a Entry) -> Result<Embed<'a>, NotifyError> {
        let character = entry.character.name.as_str();
        let realm = entry.realm_slug();
        let date = entry.date.as_deref().unwrap_or("-");

        let wowprogress = profile_url(WOWPROGRESS_BASE_URL, &self.message.region, realm, character)?;
        let warcraftlogs =
            profile_url(WARCRAFTLOGS_BASE_URL, &self.message.region, realm, character)?;

        Ok(Embed {
            title: character,
            description: format!("{character}: {} busca guild. ({date})", entry.guild.name),
            color: EMBED_COLOR,
            fields: vec![
                EmbedField {
                    name: "WoWProgress",
                    value: format!("[Link]({wowprogress})"),
                    inline: true,
                },
                EmbedField {
                    name: "WarcraftLogs",
                    value: format!("[Link]({warcraftlogs})"),
                    inline: true,
                },
            ],
        })
    }
}

fn exceeds_embed_limit(embeds: usize) -> bool {
    embeds > MAX_EMBEDS_PER_MESSAGE
}

/// `<base>/character/<region>/<realm>/<name>` with each segment percent-encoded.
fn profile_url(base: &str, region: &str, realm: &str, name: &str) -> Result<Url, NotifyError> {
    let payload_error = |detail: String| NotifyError {
        stage: "payload",
        detail,
        status: None,
        body: None,
    };

    let mut url = Url::parse(base).map_err(|e| payload_error(format!("invalid base url {base}: {e}")))?;
    url.path_segments_mut()
        .map_err(|_| payload_error(format!("base url {base} cannot take a path")))?
        .pop_if_empty()
        .extend(["character", region, realm, name]);
    Ok(url)
}

#[async_trait::async_trait]
impl Notifier for DiscordNotifier {
    async fn notify(&self, entries: &[Entry]) -> Result<Delivery, NotifyError> {
        if entries.is_empty() {
            tracing::info!("no new entries to send");
            return Ok(Delivery::Skipped(SkipReason::NothingToSend));
        }

        let Some(credentials) = self.credentials.as_ref() else {
            tracing::error!(
                new_entries = entries.len(),
                "WEBHOOK_ID or WEBHOOK_TOKEN is missing; notification skipped"
            );
            return Ok(Delivery::Skipped(SkipReason::MissingCredentials));
        };

        if exceeds_embed_limit(entries.len()) {
            tracing::warn!(
                new_entries = entries.len(),
                max_embeds = MAX_EMBEDS_PER_MESSAGE,
                "more new entries than the webhook accepts in one message; delivery will be rejected \
                 and the snapshot will not advance until the backlog is cleared"
            );
        }

        let payload = self.build_payload(entries)?;

        tracing::info!(embeds = payload.embeds.len(), "sending webhook");
        let res = self
            .http
            .post(self.endpoint(credentials))
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotifyError {
                stage: "http",
                detail: e.to_string(),
                status: None,
                body: None,
            })?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.ok();
            return Err(NotifyError {
                stage: "response",
                detail: format!("webhook returned HTTP {status}"),
                status: Some(status.as_u16()),
                body,
            });
        }

        tracing::info!(status = status.as_u16(), "webhook sent");
        Ok(Delivery::Sent {
            status: status.as_u16(),
        })
    }
}

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    content: &'a str,
    username: &'a str,
    embeds: Vec<Embed<'a>>,
}

#[derive(Debug, Serialize)]
struct Embed<'a> {
    title: &'a str,
    description: String,
    color: u32,
    fields: Vec<EmbedField>,
}

#[derive(Debug, Serialize)]
struct EmbedField {
    name: &'static str,
    value: String,
    inline: bool,
}
