use log::{debug, info};
use reqwest::StatusCode;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Gemini API key is missing. Provide --api-key or set llm.api_key in the config.")]
    MissingKey,

    #[error("Invalid Gemini API key. Please check the configured key.")]
    InvalidKey,

    #[error("Quota exceeded for the Gemini API. Check your usage limits or try again later.")]
    QuotaExceeded,

    #[error("Content was blocked by the Gemini API safety filters. Please review the inputs.")]
    ContentBlocked,

    #[error("Gemini request failed: {0}")]
    Transient(String),
}

impl From<reqwest::Error> for AnalysisError {
    fn from(err: reqwest::Error) -> Self {
        AnalysisError::Transient(err.to_string())
    }
}

pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl GeminiClient {
    /// A key is a hard precondition; no request is attempted without one.
    pub fn new(
        api_key: Option<String>,
        model: String,
        endpoint: String,
    ) -> Result<Self, AnalysisError> {
        let api_key = api_key.ok_or(AnalysisError::MissingKey)?;
        Ok(GeminiClient {
            client: reqwest::Client::new(),
            api_key,
            model,
            endpoint,
        })
    }

    /// Sends the prompt and returns the raw response text. Low temperature
    /// favors literal adherence to the requested section format. Failures are
    /// classified, never retried; the user re-triggers the action.
    pub async fn generate(&self, prompt: &str) -> Result<String, AnalysisError> {
        info!("calling Gemini API (model: {})", self.model);
        debug!("prompt length: {} characters", prompt.len());

        let request_body = json!({
            "contents": [{"parts": [{"text": prompt}]}],
            "generationConfig": {
                "temperature": 0.1,
                "maxOutputTokens": 4096
            }
        });

        let url = format!(
            "{}/{}:generateContent?key={}",
            self.endpoint.trim_end_matches('/'),
            self.model,
            self.api_key
        );

        let response = self.client.post(&url).json(&request_body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_failure(status, &body));
        }

        let body: serde_json::Value = response.json().await?;

        let content = body
            .get("candidates")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("content"))
            .and_then(|c| c.get("parts"))
            .and_then(|p| p.get(0))
            .and_then(|p| p.get("text"))
            .and_then(|t| t.as_str());

        match content {
            Some(text) => {
                debug!("received {} characters from Gemini", text.len());
                Ok(text.to_string())
            }
            None => Err(classify_missing_candidates(&body)),
        }
    }
}

/// A safety-blocked prompt comes back as HTTP 200 with `promptFeedback.
/// blockReason` set and no candidates; only then is a candidates-less body a
/// generic structural failure.
fn classify_missing_candidates(body: &serde_json::Value) -> AnalysisError {
    let block_reason = body
        .get("promptFeedback")
        .and_then(|f| f.get("blockReason"))
        .and_then(|r| r.as_str());

    match block_reason {
        Some(reason) => {
            debug!("prompt blocked by safety filters: {reason}");
            AnalysisError::ContentBlocked
        }
        None => AnalysisError::Transient("invalid Gemini API response structure".to_string()),
    }
}

/// Maps an error body onto the user-facing taxonomy by inspecting its text,
/// the only signal the service gives.
fn classify_failure(status: StatusCode, body: &str) -> AnalysisError {
    let lowered = body.to_lowercase();
    if body.contains("API key not valid") || lowered.contains("api_key_invalid") {
        AnalysisError::InvalidKey
    } else if lowered.contains("quota") {
        AnalysisError::QuotaExceeded
    } else if lowered.contains("blocked") {
        AnalysisError::ContentBlocked
    } else {
        AnalysisError::Transient(format!("{status}: {body}"))
    }
}
