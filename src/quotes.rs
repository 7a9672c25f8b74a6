use crate::models::Quote;
use chrono::{Local, Timelike};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::warn;

const GENERATE_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent";

pub fn fallback_quote() -> Quote {
    Quote {
        quote: "Discipline is doing what needs to be done, even if you don't want to do it."
            .to_string(),
        author: "Anonymous".to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteContext {
    Morning,
    Evening,
}

impl QuoteContext {
    /// Morning before local noon, evening after.
    pub fn current() -> Self {
        Self::for_hour(Local::now().hour())
    }

    pub fn for_hour(hour: u32) -> Self {
        if hour < 12 {
            Self::Morning
        } else {
            Self::Evening
        }
    }

    fn prompt(self) -> &'static str {
        match self {
            Self::Morning => {
                "Give me a short, punchy motivational quote for waking up early and crushing \
                 health goals. JSON format: { \"quote\": \"...\", \"author\": \"...\" }"
            }
            Self::Evening => {
                "Give me a calming, reflective quote about rest, recovery, and discipline. \
                 JSON format: { \"quote\": \"...\", \"author\": \"...\" }"
            }
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Serialize, Deserialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize, Deserialize)]
struct Part<'a> {
    text: std::borrow::Cow<'a, str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse<'a> {
    #[serde(default, borrow)]
    candidates: Vec<Candidate<'a>>,
}

#[derive(Deserialize)]
struct Candidate<'a> {
    #[serde(borrow)]
    content: Content<'a>,
}

/// One prompt, one response, no retries. Any failure logs a warning and
/// resolves to the fixed fallback pair, so the caller can always render
/// something.
pub async fn fetch_motivational_quote(
    client: &Client,
    api_key: Option<&str>,
    context: QuoteContext,
) -> Quote {
    let Some(api_key) = api_key.filter(|k| !k.is_empty()) else {
        return fallback_quote();
    };

    match request_quote(client, api_key, context).await {
        Ok(quote) => quote,
        Err(err) => {
            warn!("quote fetch failed, using fallback: {err}");
            fallback_quote()
        }
    }
}

async fn request_quote(
    client: &Client,
    api_key: &str,
    context: QuoteContext,
) -> Result<Quote, Box<dyn std::error::Error + Send + Sync>> {
    let request = GenerateRequest {
        contents: vec![Content {
            parts: vec![Part {
                text: context.prompt().into(),
            }],
        }],
        generation_config: GenerationConfig {
            response_mime_type: "application/json",
        },
    };

    let response = client
        .post(GENERATE_URL)
        .header("x-goog-api-key", api_key)
        .json(&request)
        .send()
        .await?
        .error_for_status()?;

    let body = response.bytes().await?;
    let envelope: GenerateResponse = serde_json::from_slice(&body)?;
    let text = envelope
        .candidates
        .first()
        .and_then(|c| c.content.parts.first())
        .map(|p| p.text.as_ref())
        .ok_or("empty model response")?;

    Ok(serde_json::from_str(text)?)
}
