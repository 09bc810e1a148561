//! Flat-file persistence of pipeline artifacts.
//!
//! Every stage writes one file into the data directory and the next stage
//! reads it back:
//!
//! - `transcript_<slug>.json`
//! - `translated_<language>_<slug>.json`
//! - `interactions_<language>_<slug>.json`
//! - `speech_<language>_<slug>.mp3`

use crate::error::{Result, VaaniError};
use crate::language::Language;
use crate::transcription::TranscriptDocument;
use crate::translation::TranslatedDocument;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;

const TRANSCRIPT_PREFIX: &str = "transcript_";
const TRANSLATION_PREFIX: &str = "translated_";
const INTERACTIONS_PREFIX: &str = "interactions_";
const SPEECH_PREFIX: &str = "speech_";

/// Indic vowel signs and viramas are marks, not alphanumerics, but dropping
/// them garbles the word.
fn is_indic_mark(c: char) -> bool {
    ('\u{0900}'..='\u{0DFF}').contains(&c) && !matches!(c, '\u{0964}' | '\u{0965}')
}

/// Turn a title into a file-name-safe slug.
///
/// Keeps alphanumerics, `-` and `_`; runs of whitespace become `_`. Falls
/// back to `untitled` when nothing is left.
pub fn slugify(title: &str) -> String {
    let slug: String = title
        .chars()
        .filter(|c| {
            c.is_alphanumeric() || c.is_whitespace() || is_indic_mark(*c) || matches!(c, '-' | '_')
        })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_");

    if slug.is_empty() {
        "untitled".to_string()
    } else {
        slug
    }
}

/// Serialize `value` as pretty JSON to `path` via a temp file and rename, so
/// readers never see a half-written file.
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    serde_json::to_writer_pretty(&mut tmp, value)?;
    tmp.write_all(b"\n")?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| VaaniError::Io(e.error))?;

    debug!("Wrote {}", path.display());
    Ok(())
}

/// Read a JSON document from `path`.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Kind of artifact found in the data directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Transcript,
    Translation,
    Interactions,
    Speech,
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArtifactKind::Transcript => write!(f, "transcript"),
            ArtifactKind::Translation => write!(f, "translation"),
            ArtifactKind::Interactions => write!(f, "interactions"),
            ArtifactKind::Speech => write!(f, "speech"),
        }
    }
}

/// A file written by one of the stages.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub path: PathBuf,
    pub modified: SystemTime,
    pub size_bytes: u64,
}

/// The data directory holding all artifacts.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn transcript_path(&self, title: &str) -> PathBuf {
        self.root
            .join(format!("{}{}.json", TRANSCRIPT_PREFIX, slugify(title)))
    }

    pub fn translation_path(&self, title: &str, language: Language) -> PathBuf {
        self.root.join(format!(
            "{}{}_{}.json",
            TRANSLATION_PREFIX,
            language.name(),
            slugify(title)
        ))
    }

    pub fn interactions_path(&self, title: &str, language: Language) -> PathBuf {
        self.root.join(format!(
            "{}{}_{}.json",
            INTERACTIONS_PREFIX,
            language.name(),
            slugify(title)
        ))
    }

    pub fn speech_path(&self, title: &str, language: Language) -> PathBuf {
        self.root.join(format!(
            "{}{}_{}.mp3",
            SPEECH_PREFIX,
            language.name(),
            slugify(title)
        ))
    }

    pub fn save_transcript(&self, doc: &TranscriptDocument) -> Result<PathBuf> {
        let path = self.transcript_path(&doc.title);
        write_json_atomic(&path, doc)?;
        Ok(path)
    }

    pub fn save_translation(&self, doc: &TranslatedDocument) -> Result<PathBuf> {
        let path = self.translation_path(&doc.title, doc.target_language);
        write_json_atomic(&path, doc)?;
        Ok(path)
    }

    pub fn load_transcript(&self, path: &Path) -> Result<TranscriptDocument> {
        read_json(path)
    }

    pub fn load_translation(&self, path: &Path) -> Result<TranslatedDocument> {
        read_json(path)
    }

    /// Most recently written transcript.
    pub fn latest_transcript(&self) -> Result<Option<PathBuf>> {
        self.latest(ArtifactKind::Transcript, None)
    }

    /// Most recently written translation, optionally for one language.
    pub fn latest_translation(&self, language: Option<Language>) -> Result<Option<PathBuf>> {
        let prefix = language.map(|l| format!("{}{}_", TRANSLATION_PREFIX, l.name()));
        self.latest(ArtifactKind::Translation, prefix.as_deref())
    }

    fn latest(&self, kind: ArtifactKind, prefix: Option<&str>) -> Result<Option<PathBuf>> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|a| a.kind == kind)
            .filter(|a| match prefix {
                Some(p) => file_name(&a.path).starts_with(p),
                None => true,
            })
            .max_by_key(|a| a.modified)
            .map(|a| a.path))
    }

    /// All artifacts, newest first.
    pub fn list(&self) -> Result<Vec<Artifact>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut artifacts = Vec::new();
        for entry in std::fs::read_dir(&self.root)?.flatten() {
            let path = entry.path();
            let Some(kind) = classify(&path) else {
                continue;
            };
            let metadata = entry.metadata()?;
            if !metadata.is_file() {
                continue;
            }
            artifacts.push(Artifact {
                kind,
                modified: metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
                size_bytes: metadata.len(),
                path,
            });
        }

        artifacts.sort_by(|a, b| b.modified.cmp(&a.modified));
        Ok(artifacts)
    }
}

fn file_name(path: &Path) -> &str {
    path.file_name().and_then(|n| n.to_str()).unwrap_or("")
}

fn classify(path: &Path) -> Option<ArtifactKind> {
    let name = file_name(path);
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    match ext {
        "json" if name.starts_with(TRANSCRIPT_PREFIX) => Some(ArtifactKind::Transcript),
        "json" if name.starts_with(TRANSLATION_PREFIX) => Some(ArtifactKind::Translation),
        "json" if name.starts_with(INTERACTIONS_PREFIX) => Some(ArtifactKind::Interactions),
        "mp3" if name.starts_with(SPEECH_PREFIX) => Some(ArtifactKind::Speech),
        _ => None,
    }
}
