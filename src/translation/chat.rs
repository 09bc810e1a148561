//! Translation through a hosted chat model in JSON mode.

use super::TranslationService;
use crate::chat::{ChatBackend, ChatMessage};
use crate::config::Prompts;
use crate::error::{Result, VaaniError};
use crate::language::Language;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Deserialize)]
struct TranslationReply {
    translations: Vec<String>,
}

/// Chat-model translator; lines go out numbered and come back as a JSON array.
pub struct ChatTranslate {
    backend: Box<dyn ChatBackend>,
    prompts: Prompts,
}

impl ChatTranslate {
    pub fn new(backend: Box<dyn ChatBackend>, prompts: Prompts) -> Self {
        Self { backend, prompts }
    }

    fn build_messages(&self, texts: &[String], source: &str, target: Language) -> Vec<ChatMessage> {
        let lines = texts
            .iter()
            .enumerate()
            .map(|(i, t)| format!("{}. {}", i + 1, t.replace('\n', " ")))
            .collect::<Vec<_>>()
            .join("\n");

        let mut vars = HashMap::new();
        vars.insert("source".to_string(), source.to_string());
        vars.insert("target".to_string(), target.label().to_string());
        vars.insert("count".to_string(), texts.len().to_string());
        vars.insert("lines".to_string(), lines);

        vec![
            ChatMessage::system(
                self.prompts
                    .render_with_custom(&self.prompts.translation.system, &vars),
            ),
            ChatMessage::user(
                self.prompts
                    .render_with_custom(&self.prompts.translation.user, &vars),
            ),
        ]
    }
}

fn parse_reply(reply: &str) -> Result<Vec<String>> {
    let parsed: TranslationReply = serde_json::from_str(reply.trim()).map_err(|e| {
        VaaniError::Service(format!("Malformed translation reply: {}", e))
    })?;
    Ok(parsed.translations)
}

#[async_trait]
impl TranslationService for ChatTranslate {
    fn name(&self) -> &str {
        self.backend.name()
    }

    async fn translate_batch(
        &self,
        texts: &[String],
        source: &str,
        target: Language,
    ) -> Result<Vec<String>> {
        let messages = self.build_messages(texts, source, target);
        let reply = self.backend.complete(messages).await?;
        parse_reply(&reply)
    }
}
