//! Daily poem generation against an OpenAI-style chat-completion endpoint.
//!
//! One attempt, no retries. Any failure at all (network, auth, malformed
//! body) degrades to [`FALLBACK_POEM`] with a logged diagnostic; callers
//! never see an error from here.

use crate::config::AiConfig;
use chrono::{Datelike, NaiveDate};
use std::time::Duration;
use tracing::{info, warn};

/// Shown whenever the text-generation service cannot be reached.
pub const FALLBACK_POEM: &str =
    "Come rain or shine, my heart beats for you all the same~";

pub struct PoemClient {
    client: reqwest::Client,
    config: AiConfig,
    api_key: Option<String>,
}

impl PoemClient {
    pub fn new(config: AiConfig, api_key: Option<String>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    /// Today's poem, newlines normalized for display. Infallible: failures
    /// are absorbed into the fallback line.
    pub async fn generate(&self, today: NaiveDate) -> String {
        match self.request_poem(today).await {
            Ok(text) => normalize_newlines(&text),
            Err(e) => {
                warn!("[poem] generation failed, using fallback: {e:#}");
                FALLBACK_POEM.to_string()
            }
        }
    }

    async fn request_poem(&self, today: NaiveDate) -> anyhow::Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("no API key configured"))?;

        let user_prompt = interpolate_date(&self.config.user_prompt, today);
        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );

        let payload = serde_json::json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": self.config.system_prompt },
                { "role": "user", "content": user_prompt },
            ],
            "stream": false,
        });

        let res = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            anyhow::bail!("chat completion returned {}: {}", status, body.trim());
        }

        let body: serde_json::Value = res.json().await?;
        let content = body["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| anyhow::anyhow!("no completion text in response"))?;

        info!("[poem] got {} chars from {}", content.len(), self.config.model);
        Ok(content)
    }
}

/// Substitute `{year}` / `{month}` / `{day}` placeholders.
pub fn interpolate_date(template: &str, date: NaiveDate) -> String {
    template
        .replace("{year}", &date.year().to_string())
        .replace("{month}", &date.month().to_string())
        .replace("{day}", &date.day().to_string())
}

/// Embedded newlines become `<br>` so the poem renders as one markdown block.
pub fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "<br>").replace('\n', "<br>")
}
