use std::error::Error;
use std::fmt;
use std::future::{self, Future};
use std::path::{Path, PathBuf};

use crate::data::GlossaryEntry;

/// Failure to load glossary entries from their backing store.
#[derive(Debug)]
pub enum GlossaryError {
    DataAccess(Box<dyn Error + Send + Sync>),
}

impl GlossaryError {
    pub fn data_access(message: impl Into<String>) -> Self {
        let message: String = message.into();
        GlossaryError::DataAccess(message.into())
    }
}

impl fmt::Display for GlossaryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GlossaryError::DataAccess(err) => write!(f, "glossary data access failed: {err}"),
        }
    }
}

impl Error for GlossaryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            GlossaryError::DataAccess(err) => Some(err.as_ref()),
        }
    }
}

impl From<std::io::Error> for GlossaryError {
    fn from(value: std::io::Error) -> Self {
        GlossaryError::DataAccess(Box::new(value))
    }
}

impl From<serde_json::Error> for GlossaryError {
    fn from(value: serde_json::Error) -> Self {
        GlossaryError::DataAccess(Box::new(value))
    }
}

/// Anything that can hand over the full set of glossary entries.
pub trait GlossarySource {
    fn fetch_all(&self) -> impl Future<Output = Result<Vec<GlossaryEntry>, GlossaryError>> + Send;
}

/// Entries already held in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticGlossary {
    entries: Vec<GlossaryEntry>,
}

impl StaticGlossary {
    pub fn new(entries: Vec<GlossaryEntry>) -> Self {
        Self { entries }
    }
}

impl GlossarySource for StaticGlossary {
    fn fetch_all(&self) -> impl Future<Output = Result<Vec<GlossaryEntry>, GlossaryError>> + Send {
        future::ready(Ok(self.entries.clone()))
    }
}

/// A JSON array of entries on disk, re-read on every fetch.
#[derive(Debug, Clone)]
pub struct JsonGlossaryFile {
    path: PathBuf,
}

impl JsonGlossaryFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl GlossarySource for JsonGlossaryFile {
    fn fetch_all(&self) -> impl Future<Output = Result<Vec<GlossaryEntry>, GlossaryError>> + Send {
        async move {
            let bytes = tokio::fs::read(&self.path).await?;
            let entries: Vec<GlossaryEntry> = serde_json::from_slice(&bytes)?;
            Ok(entries)
        }
    }
}

/// Adapts an async closure into a [`GlossarySource`].
pub struct FnGlossary<F>(F);

pub fn from_fn<F, Fut>(fetch: F) -> FnGlossary<F>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<Vec<GlossaryEntry>, GlossaryError>> + Send,
{
    FnGlossary(fetch)
}

impl<F, Fut> GlossarySource for FnGlossary<F>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<Vec<GlossaryEntry>, GlossaryError>> + Send,
{
    fn fetch_all(&self) -> impl Future<Output = Result<Vec<GlossaryEntry>, GlossaryError>> + Send {
        (self.0)()
    }
}
