//! Google Cloud Translation (v2 REST).

use super::TranslationService;
use crate::error::{Result, VaaniError};
use crate::language::Language;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

const ENDPOINT: &str = "https://translation.googleapis.com/language/translate/v2";

/// Environment variable holding the API key.
pub const API_KEY_VAR: &str = "GOOGLE_TRANSLATE_API_KEY";

#[derive(Serialize)]
struct TranslateRequest<'a> {
    q: &'a [String],
    source: &'a str,
    target: &'a str,
    format: &'static str,
}

#[derive(Deserialize)]
struct TranslateResponse {
    data: TranslateData,
}

#[derive(Deserialize)]
struct TranslateData {
    translations: Vec<Translation>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Translation {
    translated_text: String,
}

/// Google Cloud Translation client.
pub struct GoogleTranslate {
    http: reqwest::Client,
    api_key: String,
}

impl GoogleTranslate {
    /// Create a client using the key from `GOOGLE_TRANSLATE_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(API_KEY_VAR)
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| VaaniError::Config(format!("{} is not set", API_KEY_VAR)))?;
        Self::new(&api_key)
    }

    pub fn new(api_key: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| VaaniError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_key: api_key.to_string(),
        })
    }

    /// Check whether the API key is present in the environment.
    pub fn is_api_key_configured() -> bool {
        std::env::var(API_KEY_VAR).is_ok_and(|k| !k.is_empty())
    }
}

fn parse_response(body: &str) -> Result<Vec<String>> {
    let parsed: TranslateResponse = serde_json::from_str(body)?;
    Ok(parsed
        .data
        .translations
        .into_iter()
        .map(|t| t.translated_text)
        .collect())
}

#[async_trait]
impl TranslationService for GoogleTranslate {
    fn name(&self) -> &str {
        "google"
    }

    #[instrument(skip(self, texts), fields(count = texts.len(), lang = %target.code()))]
    async fn translate_batch(
        &self,
        texts: &[String],
        source: &str,
        target: Language,
    ) -> Result<Vec<String>> {
        let body = TranslateRequest {
            q: texts,
            source,
            target: target.code(),
            format: "text",
        };

        let response = self
            .http
            .post(ENDPOINT)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(VaaniError::Service(format!(
                "Google Translate returned {}: {}",
                status,
                text.trim()
            )));
        }

        let translations = parse_response(&text)?;
        debug!("Received {} translations", translations.len());
        Ok(translations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_response() {
        let body = r#"{"data":{"translations":[
            {"translatedText":"नमस्ते","detectedSourceLanguage":"en"},
            {"translatedText":"दुनिया"}
        ]}}"#;
        assert_eq!(parse_response(body).unwrap(), vec!["नमस्ते", "दुनिया"]);
    }

    #[test]
    fn test_parse_response_rejects_error_body() {
        let body = r#"{"error":{"code":400,"message":"Invalid Value"}}"#;
        assert!(parse_response(body).is_err());
    }

    #[test]
    fn test_request_shape() {
        let texts = vec!["hello".to_string()];
        let body = TranslateRequest {
            q: &texts,
            source: "en",
            target: Language::Odia.code(),
            format: "text",
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["q"][0], "hello");
        assert_eq!(json["target"], "or");
        assert_eq!(json["format"], "text");
    }
}
