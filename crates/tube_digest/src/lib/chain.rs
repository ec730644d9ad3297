//! # Summarization chains
//!
//! A chain decides how transcript documents are turned into prompts for the
//! summarization engine. [`StuffChain`] sends everything in one prompt, while
//! [`MapReduceChain`] summarizes bounded chunks and folds the partial summaries.

mod map_reduce;
mod stuff;

use std::{fmt, future::Future};

use serde::Serialize;

use crate::{error::EngineError, Summarizer, TranscriptDocument};

pub use map_reduce::{MapReduceChain, MapReduceConfig};
pub use stuff::StuffChain;

/// Separator placed between documents and partial summaries inside a prompt.
pub const DOCUMENT_SEPARATOR: &str = "\n\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainStrategy {
    Stuff,
    MapReduce,
}

impl ChainStrategy {
    /// Single pass unless the measured transcript is strictly larger than the budget.
    pub fn select(token_count: usize, budget: usize) -> Self {
        if token_count > budget {
            ChainStrategy::MapReduce
        } else {
            ChainStrategy::Stuff
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChainStrategy::Stuff => "stuff",
            ChainStrategy::MapReduce => "map_reduce",
        }
    }
}

impl fmt::Display for ChainStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub trait SummarizeChain {
    fn strategy(&self) -> ChainStrategy;

    fn run(
        &self,
        documents: &[TranscriptDocument],
    ) -> impl Future<Output = Result<String, EngineError>> + Send;
}

/// Sends one prompt to the engine, logging the upstream failure before it is flattened.
async fn call_engine<S>(engine: &S, prompt: String) -> Result<String, EngineError>
where
    S: Summarizer + Sync,
{
    engine
        .summarize(&prompt)
        .await
        .map(|response| response.summary)
        .map_err(|e| {
            tracing::error!(error = %e, model = S::SUMMARIZER_MODEL, "Summarization request failed");
            EngineError::Upstream(e.to_string())
        })
}
