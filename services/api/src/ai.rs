//! Generative-AI client for the AI Stylist chat
//!
//! Talks to a Gemini-style generateContent endpoint. The system prompt is
//! picked by subscription tier: the free tier is restricted to hairstyling
//! topics and answers everything else with a fixed upgrade message; the
//! premium tier is a general-purpose assistant.

use anyhow::Result;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use serde::Deserialize;
use serde_json::json;

/// Fallback reply when the model returns no usable text.
const EMPTY_REPLY_FALLBACK: &str =
    "Sorry, I cannot handle that request right now. Try asking in a different way.";

const FREE_TIER_SYSTEM_PROMPT: &str = r#"You are the "AI Stylist" of SharpCuts, a friendly and professional virtual hairstyling expert.

Your job is to answer questions ONLY about:
- men's hairstyles
- haircut recommendations
- beard and moustache care
- face-shape analysis for hairstyle recommendations

If the user asks about anything else (weather, politics, recipes, program code, and so on), do NOT answer the question. Instead reply with exactly this message and nothing else:

"To ask about topics beyond hairstyling, you need to upgrade to a Premium account. With Premium you can chat about any topic you like! [UPGRADE_CTA]"

When given a picture of a face, analyse the face shape and suggest 2-3 suitable hairstyles, explaining why each one fits.

Always answer in Markdown for readability."#;

const PREMIUM_TIER_SYSTEM_PROMPT: &str = "You are the premium AI assistant of SharpCuts. You are \
a highly knowledgeable generalist who can answer questions about any topic in a friendly and \
professional manner. Give informative and helpful answers, always formatted in Markdown.";

/// Generative-AI configuration
#[derive(Debug, Clone)]
pub struct AiConfig {
    /// API key for the generative-AI service
    pub api_key: String,
    /// Service base URL
    pub base_url: String,
    /// Model identifier
    pub model: String,
}

impl AiConfig {
    /// Create a new AiConfig from environment variables
    ///
    /// # Environment Variables
    /// - `GEMINI_API_KEY`: API key (required)
    /// - `GEMINI_BASE_URL`: service base URL (default: Google AI endpoint)
    /// - `GEMINI_MODEL`: model id (default: "gemini-1.5-flash-latest")
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| anyhow::anyhow!("GEMINI_API_KEY environment variable not set"))?;
        let base_url = std::env::var("GEMINI_BASE_URL")
            .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".to_string());
        let model = std::env::var("GEMINI_MODEL")
            .unwrap_or_else(|_| "gemini-1.5-flash-latest".to_string());

        Ok(Self {
            api_key,
            base_url,
            model,
        })
    }
}

/// An uploaded image forwarded to the model inline.
#[derive(Debug, Clone)]
pub struct ImageAttachment {
    pub mime_type: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

fn system_prompt(subscribed: bool) -> &'static str {
    if subscribed {
        PREMIUM_TIER_SYSTEM_PROMPT
    } else {
        FREE_TIER_SYSTEM_PROMPT
    }
}

fn extract_reply(response: GenerateContentResponse) -> String {
    response
        .candidates
        .into_iter()
        .filter_map(|c| c.content)
        .flat_map(|c| c.parts)
        .find_map(|p| p.text.filter(|t| !t.is_empty()))
        .unwrap_or_else(|| EMPTY_REPLY_FALLBACK.to_string())
}

/// Client for the generative-AI service
#[derive(Clone)]
pub struct AiClient {
    http: reqwest::Client,
    config: AiConfig,
}

impl AiClient {
    pub fn new(config: AiConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Ask the AI Stylist for a reply to a message and/or an image.
    pub async fn respond(
        &self,
        message: Option<&str>,
        image: Option<&ImageAttachment>,
        subscribed: bool,
    ) -> Result<String> {
        let mut parts = vec![json!({
            "text": message.unwrap_or("Please analyse my face from this picture."),
        })];

        if let Some(image) = image {
            parts.push(json!({
                "inline_data": {
                    "mime_type": image.mime_type,
                    "data": BASE64.encode(&image.data),
                },
            }));
        }

        let body = json!({
            "system_instruction": { "parts": [{ "text": system_prompt(subscribed) }] },
            "contents": [{ "parts": parts }],
            "generationConfig": {
                "temperature": 0.4,
                "topK": 32,
                "topP": 1,
                "maxOutputTokens": 4096,
            },
        });

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url, self.config.model
        );

        let response: GenerateContentResponse = self
            .http
            .post(url)
            .query(&[("key", self.config.api_key.as_str())])
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(extract_reply(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_tier_prompt_is_restricted_and_carries_the_upgrade_cta() {
        let prompt = system_prompt(false);
        assert!(prompt.contains("[UPGRADE_CTA]"));
        assert!(prompt.contains("ONLY"));
        assert!(!system_prompt(true).contains("[UPGRADE_CTA]"));
    }

    #[test]
    fn reply_extraction_takes_the_first_non_empty_text() {
        let response: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": "" }, { "text": "A classic pompadour." }] }
            }]
        }))
        .expect("valid response shape");
        assert_eq!(extract_reply(response), "A classic pompadour.");
    }

    #[test]
    fn empty_response_falls_back_to_a_canned_reply() {
        let response: GenerateContentResponse =
            serde_json::from_value(serde_json::json!({ "candidates": [] }))
                .expect("valid response shape");
        assert_eq!(extract_reply(response), EMPTY_REPLY_FALLBACK);
    }
}
