//! Client for the external caption/image provider.
//!
//! This boundary is deliberately tolerant: a dreamer's nightly ritual must
//! always yield a postcard, so every provider failure degrades to fixed
//! fallback content instead of propagating. Nothing here retries.

use anyhow::{Result, anyhow};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

pub const FALLBACK_CAPTION: &str =
    "Whispers of dreamscapes, echoing through the corridors of sleep";

pub const FALLBACK_IMAGE_URL: &str =
    "https://images.unsplash.com/photo-1499678329028-101435549a4e?ixlib=rb-4.0.3&auto=format&fit=crop&w=800&h=400";

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const CHAT_MODEL: &str = "gpt-4o";
const IMAGE_MODEL: &str = "dall-e-3";

pub struct Generator {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl Generator {
    pub fn new(api_key: Option<String>, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url,
        }
    }

    pub fn from_env() -> Self {
        let api_key = std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty());
        let base_url =
            std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());
        if api_key.is_none() {
            warn!("OPENAI_API_KEY not set; postcards will carry fallback content");
        }
        Self::new(api_key, base_url)
    }

    /// Generator that never touches the network. Used by the test suite.
    pub fn disabled() -> Self {
        Self::new(None, DEFAULT_BASE_URL.into())
    }

    /// Turn a base64 audio clip into a short poetic caption.
    /// Never fails — the fallback caption stands in when the provider does.
    pub async fn generate_caption(&self, audio_b64: &str) -> String {
        match self.try_caption(audio_b64).await {
            Ok(caption) => caption,
            Err(e) => {
                warn!("Caption generation failed, using fallback: {}", e);
                FALLBACK_CAPTION.to_string()
            }
        }
    }

    /// Render a caption into an image, returning its URL.
    /// Never fails — a static placeholder stands in when the provider does.
    pub async fn generate_image(&self, caption: &str) -> String {
        match self.try_image(caption).await {
            Ok(url) => url,
            Err(e) => {
                warn!("Image generation failed, using fallback: {}", e);
                FALLBACK_IMAGE_URL.to_string()
            }
        }
    }

    async fn try_caption(&self, audio_b64: &str) -> Result<String> {
        let key = self.api_key.as_deref().ok_or_else(|| anyhow!("no API key configured"))?;

        // Two passes: describe the soundscape, then distill it into a
        // sub-100-character caption.
        let analysis = self
            .chat(
                key,
                json!([
                    {
                        "role": "system",
                        "content": "You are an expert at analyzing audio and describing ambient sleep sounds poetically. Create imaginative, dreamy descriptions."
                    },
                    {
                        "role": "user",
                        "content": [
                            {
                                "type": "text",
                                "text": "Analyze this short audio clip of ambient sleep sounds. Create a poetic, surreal description of the soundscape."
                            },
                            {
                                "type": "image_url",
                                "image_url": { "url": format!("data:audio/wav;base64,{audio_b64}") }
                            }
                        ]
                    }
                ]),
                150,
            )
            .await?;

        let caption = self
            .chat(
                key,
                json!([
                    {
                        "role": "system",
                        "content": "You create poetic, surreal dream-like captions for postcards. The captions should be short (under 100 characters), evocative, and mysterious."
                    },
                    {
                        "role": "user",
                        "content": format!(
                            "Based on this audio analysis: \"{analysis}\", create a short, dreamy, surreal postcard caption that captures the essence of the sounds in a poetic way. Make it mysterious and evocative."
                        )
                    }
                ]),
                100,
            )
            .await?;

        Ok(caption)
    }

    async fn try_image(&self, caption: &str) -> Result<String> {
        let key = self.api_key.as_deref().ok_or_else(|| anyhow!("no API key configured"))?;

        let body = json!({
            "model": IMAGE_MODEL,
            "prompt": format!(
                "Create a dreamlike, surreal postcard image that visualizes this poetic caption: \"{caption}\". The image should be dreamy, with pastel gradients and ethereal qualities, suitable for a sleep-themed postcard. Make it beautiful and mysterious."
            ),
            "n": 1,
            "size": "1024x1024",
            "quality": "standard",
        });

        let resp: ImagesResponse = self
            .client
            .post(format!("{}/images/generations", self.base_url))
            .bearer_auth(key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        resp.data
            .into_iter()
            .next()
            .and_then(|d| d.url)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| anyhow!("image response carried no URL"))
    }

    async fn chat(&self, key: &str, messages: serde_json::Value, max_tokens: u32) -> Result<String> {
        let body = json!({
            "model": CHAT_MODEL,
            "messages": messages,
            "max_tokens": max_tokens,
        });

        let resp: ChatResponse = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        resp.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|text| !text.is_empty())
            .ok_or_else(|| anyhow!("chat response carried no content"))
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ImagesResponse {
    data: Vec<ImageDatum>,
}

#[derive(Debug, Deserialize)]
struct ImageDatum {
    url: Option<String>,
}
