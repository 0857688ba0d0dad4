//! Sessions held in memory

use std::collections::HashMap;

use super::SessionSource;
use crate::error::FetchError;

/// Name to text map
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    sessions: HashMap<String, String>,
}

impl MemorySource {
    /// Create an empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with_session(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(name, text);
        self
    }

    /// Add or replace a session
    pub fn insert(&mut self, name: impl Into<String>, text: impl Into<String>) {
        self.sessions.insert(name.into(), text.into());
    }
}

impl SessionSource for MemorySource {
    async fn fetch(&self, name: &str) -> Result<String, FetchError> {
        self.sessions
            .get(name)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(name.to_string()))
    }
}
