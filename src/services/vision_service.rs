use reqwest::Client;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::time::Duration;

use crate::error::{Error, Result};

const RAW_FALLBACK_CHARS: usize = 500;

/// What the vision model is asked to return for an image.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VisionAnalysis {
    pub context: String,
    pub tone: String,
    pub main_caption: String,
    pub cta: String,
}

#[derive(Clone)]
pub struct VisionService {
    client: Client,
    api_key: Option<String>,
}

impl VisionService {
    pub fn new(api_key: Option<String>, client: Client) -> Self {
        Self { client, api_key }
    }

    pub async fn describe(
        &self,
        image_url: &str,
        file_name: Option<&str>,
    ) -> Result<VisionAnalysis> {
        let system_prompt = r#"You are a social media copywriter for a product brand.
Look at the image and write caption material for it.
Return a JSON object with exactly these fields:
{ "context": "what the image shows", "tone": "the voice that fits it", "mainCaption": "2-4 engaging sentences, no hashtags", "cta": "one short call to action" }
Do not include hashtags anywhere. Do not wrap the JSON in markdown fences."#;

        let mut user_text = String::from("Write caption material for this image.");
        if let Some(name) = file_name.filter(|n| !n.trim().is_empty()) {
            user_text.push_str(&format!(" The file is named \"{}\".", name));
        }

        let payload = serde_json::json!({
            "model": "gpt-4o-mini",
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": [
                    {"type": "text", "text": user_text},
                    {"type": "image_url", "image_url": {"url": image_url, "detail": "low"}}
                ]}
            ],
            "response_format": { "type": "json_object" },
            "max_tokens": 500,
            "temperature": 0.7
        });

        let content = self.chat_openai(payload).await?;
        Ok(parse_analysis(&content))
    }

    async fn chat_openai(&self, payload: JsonValue) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| Error::Config("OPENAI_API_KEY is not set".to_string()))?;

        let res = self
            .client
            .post("https://api.openai.com/v1/chat/completions")
            .bearer_auth(api_key)
            .json(&payload)
            .timeout(Duration::from_secs(120))
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("OpenAI API error {}: {}", status, text).into());
        }

        let body: JsonValue = res.json().await?;
        body.get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("Invalid OpenAI response format").into())
    }
}

/// Models occasionally wrap the JSON in markdown fences or chat around it
/// despite the instructions. Take the outermost brace-to-brace slice before
/// parsing; when that yields no usable `mainCaption`, the raw reply itself
/// (minus any fences) becomes the caption.
fn parse_analysis(content: &str) -> VisionAnalysis {
    let trimmed = content.trim();
    let candidate = match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if end > start => &trimmed[start..=end],
        _ => trimmed,
    };

    match serde_json::from_str::<VisionAnalysis>(candidate) {
        Ok(parsed) if !parsed.main_caption.trim().is_empty() => parsed,
        _ => VisionAnalysis {
            main_caption: strip_fences(trimmed)
                .chars()
                .take(RAW_FALLBACK_CHARS)
                .collect(),
            ..Default::default()
        },
    }
}

fn strip_fences(text: &str) -> &str {
    let mut out = text.trim();
    if let Some(rest) = out.strip_prefix("```") {
        // The fence line may carry a language tag; drop the whole line.
        out = match rest.split_once('\n') {
            Some((_, body)) => body,
            None => rest,
        };
    }
    if let Some(rest) = out.strip_suffix("```") {
        out = rest;
    }
    out.trim()
}
