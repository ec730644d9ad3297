use std::collections::BTreeMap;

use serde::Serialize;

/// One unit of transcript text produced by a [`TranscriptLoader`](crate::yt::TranscriptLoader).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TranscriptDocument {
    content: String,
    metadata: BTreeMap<String, String>,
}

impl TranscriptDocument {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    /// The `source` annotation, the video id for YouTube transcripts.
    pub fn source(&self) -> Option<&str> {
        self.metadata.get("source").map(String::as_str)
    }
}
