use serde::{Deserialize, Serialize};

/// A single glossary row as handed over by the data-access layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlossaryEntry {
    pub id: i64,
    pub word: String,
    #[serde(default)]
    pub definition: String,
    #[serde(default)]
    pub urls: Vec<String>,
}

impl GlossaryEntry {
    pub fn new(id: i64, word: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            id,
            word: word.into(),
            definition: definition.into(),
            urls: Vec::new(),
        }
    }

    pub fn with_urls<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.urls = urls.into_iter().map(Into::into).collect();
        self
    }
}

/// Normalized matching form of an entry's word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stem<'a> {
    pub entry: &'a GlossaryEntry,
    pub stem: String,
}

impl<'a> Stem<'a> {
    pub fn from_entry(entry: &'a GlossaryEntry) -> Self {
        Self {
            entry,
            stem: normalize(&entry.word),
        }
    }

    /// Empty stems come from blank words and never match anything.
    pub fn is_matchable(&self) -> bool {
        !self.stem.is_empty()
    }
}

pub(crate) fn normalize(word: &str) -> String {
    word.trim().chars().flat_map(fold).collect()
}

/// Case fold for one character. Stems and scanned text both go through this,
/// so the comparison never depends on where a character sits in its word.
pub(crate) fn fold(ch: char) -> impl Iterator<Item = char> {
    ch.to_lowercase()
        .map(|lower| if lower == 'ς' { 'σ' } else { lower })
}
