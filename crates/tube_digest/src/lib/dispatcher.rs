pub mod builder;

use std::fmt;

use serde::Serialize;

use crate::{
    chain::{ChainStrategy, MapReduceChain, StuffChain, SummarizeChain},
    config::DispatchConfig,
    error::{EngineError, Error, LoadError},
    llm::tokenizer::TokenCounter,
    yt::{TranscriptLoader, VideoUrl},
    Summarizer, TranscriptDocument,
};

/// Picks a summarization strategy from the transcript size and runs it.
#[derive(Debug)]
pub struct SummaryDispatcher<L, S, C>
where
    L: TranscriptLoader + Send + Sync + 'static,
    S: Summarizer + Send + Sync + 'static,
    C: TokenCounter + Send + Sync + 'static,
{
    config: DispatchConfig,
    loader: L,
    summarizer: S,
    counter: C,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryResult {
    pub text: String,
    pub strategy: ChainStrategy,
    /// Token count of the first transcript document.
    pub transcript_tokens: usize,
}

impl fmt::Display for SummaryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl<L, S, C> SummaryDispatcher<L, S, C>
where
    L: TranscriptLoader + Send + Sync + 'static,
    S: Summarizer + Send + Sync + 'static,
    C: TokenCounter + Send + Sync + 'static,
{
    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Strategy for a transcript of `token_count` tokens under the configured budget.
    pub fn select_strategy(&self, token_count: usize) -> ChainStrategy {
        ChainStrategy::select(token_count, self.config.context_budget)
    }

    /// Summarizes `documents`, measuring only the first one against the budget.
    #[tracing::instrument(skip_all, fields(documents = documents.len()))]
    pub async fn summarize(&self, documents: &[TranscriptDocument]) -> Result<SummaryResult, Error> {
        let Some(primary) = documents.first() else {
            tracing::warn!("No transcript documents to summarize");
            return Err(Error::EmptyDocumentSet);
        };

        let transcript_tokens = self.counter.count_tokens(primary.content());
        let strategy = self.select_strategy(transcript_tokens);
        tracing::info!(
            source = primary.source().unwrap_or_default(),
            tokens = transcript_tokens,
            budget = self.config.context_budget,
            %strategy,
            "Selected summarization strategy"
        );

        let text = match strategy {
            ChainStrategy::Stuff => {
                self.run_chain(StuffChain::new(&self.summarizer), documents)
                    .await?
            }
            ChainStrategy::MapReduce => {
                let chain =
                    MapReduceChain::new(&self.summarizer, &self.counter, &self.config.map_reduce);
                self.run_chain(chain, documents).await?
            }
        };

        Ok(SummaryResult {
            text,
            strategy,
            transcript_tokens,
        })
    }

    /// Loads the transcript of `video` and summarizes it.
    #[tracing::instrument(skip(self), fields(video_id = %video.video_id()))]
    pub async fn summarize_video(&self, video: &VideoUrl) -> Result<SummaryResult, Error> {
        let timeout = self.config.load_timeout;

        let documents = tokio::time::timeout(timeout, self.loader.load(video))
            .await
            .map_err(|_| {
                tracing::error!(?timeout, "Transcript loading timed out");
                LoadError::Timeout(timeout)
            })?
            .map_err(|e| {
                tracing::error!(error = ?e, "Failed to load transcript");
                LoadError::Source(format!("{e:#}"))
            })?;

        self.summarize(&documents).await
    }

    /// Validates raw user input before anything external is called.
    pub async fn summarize_input(&self, input: &str) -> Result<SummaryResult, Error> {
        let video = VideoUrl::parse(input)
            .inspect_err(|e| tracing::info!(error = %e, "Rejected input"))?;

        self.summarize_video(&video).await
    }

    async fn run_chain<K>(&self, chain: K, documents: &[TranscriptDocument]) -> Result<String, Error>
    where
        K: SummarizeChain,
    {
        let timeout = self.config.summarize_timeout;

        match tokio::time::timeout(timeout, chain.run(documents)).await {
            Ok(result) => result.map_err(Error::from),
            Err(_) => {
                tracing::error!(?timeout, strategy = %chain.strategy(), "Summarization timed out");
                Err(EngineError::Timeout(timeout).into())
            }
        }
    }
}
