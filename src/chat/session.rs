//! Question answering over a translated transcript.

use super::backend::{ChatBackend, ChatMessage};
use super::log::{ConversationTurn, InteractionLog};
use crate::config::{ChatSettings, Prompts};
use crate::error::{Result, VaaniError};
use crate::transcription::format_timestamp;
use crate::translation::TranslatedDocument;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

/// A conversation about one translated document, persisted to its log.
pub struct QaSession {
    backend: Box<dyn ChatBackend>,
    prompts: Prompts,
    document: TranslatedDocument,
    log: InteractionLog,
    log_path: PathBuf,
    history_turns: usize,
    max_context_segments: usize,
}

impl QaSession {
    /// Open a session, loading any existing log at `log_path`.
    pub fn open(
        backend: Box<dyn ChatBackend>,
        prompts: Prompts,
        document: TranslatedDocument,
        log_path: &Path,
    ) -> Result<Self> {
        let log = InteractionLog::load_or_new(
            log_path,
            &document.media_id,
            &document.title,
            document.target_language,
        )?;
        let defaults = ChatSettings::default();

        Ok(Self {
            backend,
            prompts,
            document,
            log,
            log_path: log_path.to_path_buf(),
            history_turns: defaults.history_turns,
            max_context_segments: defaults.max_context_segments,
        })
    }

    pub fn with_limits(mut self, history_turns: usize, max_context_segments: usize) -> Self {
        self.history_turns = history_turns;
        self.max_context_segments = max_context_segments;
        self
    }

    pub fn log(&self) -> &InteractionLog {
        &self.log
    }

    pub fn document(&self) -> &TranslatedDocument {
        &self.document
    }

    /// Bilingual transcript lines given to the model.
    fn context(&self) -> String {
        let language = self.document.target_language.label();
        self.document
            .segments
            .iter()
            .take(self.max_context_segments)
            .map(|s| {
                format!(
                    "[{}] {}\n    {}: {}",
                    format_timestamp(s.start),
                    s.original_text,
                    language,
                    s.translated_text
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn build_messages(&self, question: &str) -> Vec<ChatMessage> {
        let mut vars = HashMap::new();
        vars.insert(
            "language".to_string(),
            self.document.target_language.label().to_string(),
        );
        vars.insert("title".to_string(), self.document.title.clone());
        vars.insert("context".to_string(), self.context());
        vars.insert("question".to_string(), question.to_string());

        let mut messages = vec![ChatMessage::system(
            self.prompts.render_with_custom(&self.prompts.qa.system, &vars),
        )];

        for turn in self.log.recent(self.history_turns) {
            messages.push(ChatMessage::user(turn.question.clone()));
            messages.push(ChatMessage::assistant(turn.answer.clone()));
        }

        messages.push(ChatMessage::user(
            self.prompts.render_with_custom(&self.prompts.qa.user, &vars),
        ));
        messages
    }

    /// Ask a question; on success the exchange is appended to the log.
    ///
    /// Failures leave the log untouched so the question can be retried.
    #[instrument(skip(self), fields(media_id = %self.document.media_id))]
    pub async fn ask(&mut self, question: &str) -> Result<String> {
        let question = question.trim();
        if question.is_empty() {
            return Err(VaaniError::InvalidInput("Question is empty".to_string()));
        }

        let messages = self.build_messages(question);
        let answer = self
            .backend
            .complete(messages)
            .await
            .map_err(|e| VaaniError::Chat(e.to_string()))?;

        let answer = answer.trim();
        if answer.is_empty() {
            warn!("{} returned an empty answer", self.backend.name());
            return Err(VaaniError::Chat("Empty response from model".to_string()));
        }

        self.log
            .append(&self.log_path, ConversationTurn::new(question, answer))?;
        info!("Logged turn {}", self.log.len());

        Ok(answer.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::ChatRole;
    use crate::language::Language;
    use crate::translation::TranslatedSegment;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Replies from a script and records the messages it was sent.
    struct ScriptedBackend {
        replies: Mutex<VecDeque<Result<String>>>,
        seen: Arc<Mutex<Vec<Vec<ChatMessage>>>>,
    }

    #[async_trait]
    impl ChatBackend for ScriptedBackend {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String> {
            self.seen.lock().unwrap().push(messages);
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(VaaniError::OpenAI("no reply".to_string())))
        }
    }

    fn document(n: usize) -> TranslatedDocument {
        TranslatedDocument {
            media_id: "vid".to_string(),
            title: "Monsoon Science".to_string(),
            source_language: "en".to_string(),
            target_language: Language::Hindi,
            created_at: Utc::now(),
            segments: (0..n)
                .map(|i| TranslatedSegment {
                    start: i as f64 * 3.0,
                    end: i as f64 * 3.0 + 2.0,
                    original_text: format!("line {i}"),
                    translated_text: format!("पंक्ति {i}"),
                })
                .collect(),
        }
    }

    fn session(
        dir: &Path,
        replies: Vec<Result<String>>,
    ) -> (QaSession, Arc<Mutex<Vec<Vec<ChatMessage>>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let backend = ScriptedBackend {
            replies: Mutex::new(replies.into()),
            seen: seen.clone(),
        };
        let session = QaSession::open(
            Box::new(backend),
            Prompts::default(),
            document(40),
            &dir.join("interactions.json"),
        )
        .unwrap();
        (session, seen)
    }

    #[tokio::test]
    async fn test_ask_appends_turn() {
        let dir = tempfile::tempdir().unwrap();
        let (mut session, seen) = session(dir.path(), vec![Ok("  It rains.  ".to_string())]);

        let answer = session.ask("What happens?").await.unwrap();
        assert_eq!(answer, "It rains.");
        assert_eq!(session.log().len(), 1);
        assert!(dir.path().join("interactions.json").exists());

        let sent = &seen.lock().unwrap()[0];
        assert_eq!(sent.first().unwrap().role, ChatRole::System);
        let user = &sent.last().unwrap().content;
        assert!(user.contains("Monsoon Science"));
        assert!(user.contains("[00:00] line 0\n    Hindi: पंक्ति 0"));
        assert!(user.contains("line 29"));
        assert!(!user.contains("line 30"));
    }

    #[tokio::test]
    async fn test_history_is_bounded() {
        let dir = tempfile::tempdir().unwrap();
        let replies = (0..8).map(|i| Ok(format!("answer {i}"))).collect();
        let (mut session, seen) = session(dir.path(), replies);

        for i in 0..8 {
            session.ask(&format!("question {i}")).await.unwrap();
        }

        let last = seen.lock().unwrap().last().unwrap().clone();
        // system + 5 prior turns (user + assistant) + current question
        assert_eq!(last.len(), 1 + 5 * 2 + 1);
        assert_eq!(last[1].content, "question 2");
        assert_eq!(last[10].content, "answer 6");
    }

    #[tokio::test]
    async fn test_failure_does_not_advance_log() {
        let dir = tempfile::tempdir().unwrap();
        let (mut session, _) = session(
            dir.path(),
            vec![
                Err(VaaniError::OpenAI("rate limited".to_string())),
                Ok("   ".to_string()),
                Ok("finally".to_string()),
            ],
        );

        let err = session.ask("q").await.unwrap_err();
        assert!(matches!(err, VaaniError::Chat(_)));
        let err = session.ask("q").await.unwrap_err();
        assert!(matches!(err, VaaniError::Chat(_)));
        assert!(session.log().is_empty());
        assert!(!dir.path().join("interactions.json").exists());

        assert_eq!(session.ask("q").await.unwrap(), "finally");
        assert_eq!(session.log().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_question_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let (mut session, seen) = session(dir.path(), vec![]);

        let err = session.ask("   ").await.unwrap_err();
        assert!(matches!(err, VaaniError::InvalidInput(_)));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_sessions_share_log() {
        let dir = tempfile::tempdir().unwrap();
        let (mut a, _) = session(dir.path(), vec![Ok("answer a".to_string())]);
        let (mut b, _) = session(dir.path(), vec![Ok("answer b".to_string())]);

        b.ask("question b").await.unwrap();
        a.ask("question a").await.unwrap();

        let log = InteractionLog::load_or_new(
            &dir.path().join("interactions.json"),
            "vid",
            "Monsoon Science",
            Language::Hindi,
        )
        .unwrap();
        let questions: Vec<&str> = log.turns().iter().map(|t| t.question.as_str()).collect();
        assert_eq!(questions, vec!["question b", "question a"]);
        assert_eq!(a.log().len(), 2);
    }

    #[tokio::test]
    async fn test_reopen_continues_log() {
        let dir = tempfile::tempdir().unwrap();
        {
            let (mut first, _) = session(dir.path(), vec![Ok("one".to_string())]);
            first.ask("first").await.unwrap();
        }

        let (mut second, seen) = session(dir.path(), vec![Ok("two".to_string())]);
        assert_eq!(second.log().len(), 1);
        second.ask("second").await.unwrap();

        let sent = &seen.lock().unwrap()[0];
        assert_eq!(sent[1].content, "first");
        assert_eq!(sent[2].content, "one");
    }
}
