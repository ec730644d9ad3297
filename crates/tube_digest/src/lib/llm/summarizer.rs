use std::{fmt::Display, future::Future};

use serde::Deserialize;

/// A hosted text generation model that turns a prompt into summary text.
pub trait Summarizer {
    /// Largest transcript (in tokens) that can be summarized in a single pass.
    const CONTEXT_WINDOW_LIMIT: usize;
    const SUMMARIZER_MODEL: &'static str;

    type Error: Display + Send;

    fn summarize(
        &self,
        prompt: &str,
    ) -> impl Future<Output = Result<SummaryResponse, Self::Error>> + Send;
}

#[derive(Debug, Clone, Deserialize)]
pub struct SummaryResponse {
    pub summary: String,
}
