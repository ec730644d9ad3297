use futures::{stream, StreamExt, TryStreamExt};

use crate::{
    chain::{call_engine, ChainStrategy, SummarizeChain, DOCUMENT_SEPARATOR},
    error::EngineError,
    llm::{combine_summaries_prompt, concise_summary_prompt, tokenizer::TokenCounter},
    Summarizer, TranscriptDocument,
};

#[derive(Debug, Clone)]
pub struct MapReduceConfig {
    /// Upper bound for a single map chunk.
    pub chunk_tokens: usize,
    /// Partial summaries are collapsed until they fit under this many tokens.
    pub collapse_token_max: usize,
    pub map_concurrency: usize,
    pub max_collapse_rounds: usize,
}

impl Default for MapReduceConfig {
    fn default() -> Self {
        Self {
            chunk_tokens: 50_000,
            collapse_token_max: 3_000,
            map_concurrency: 4,
            max_collapse_rounds: 8,
        }
    }
}

/// Summarizes token bounded chunks independently, then folds the partial
/// summaries until one final combine call fits.
pub struct MapReduceChain<'a, S, C> {
    engine: &'a S,
    counter: &'a C,
    config: &'a MapReduceConfig,
}

impl<'a, S, C> MapReduceChain<'a, S, C> {
    pub fn new(engine: &'a S, counter: &'a C, config: &'a MapReduceConfig) -> Self {
        Self {
            engine,
            counter,
            config,
        }
    }
}

impl<S, C> MapReduceChain<'_, S, C>
where
    S: Summarizer + Sync,
    C: TokenCounter + Sync,
{
    fn total_tokens(&self, summaries: &[String]) -> usize {
        summaries.iter().map(|s| self.counter.count_tokens(s)).sum()
    }

    async fn summarize_all(
        &self,
        prompts: Vec<String>,
    ) -> Result<Vec<String>, EngineError> {
        stream::iter(prompts)
            .map(|prompt| call_engine(self.engine, prompt))
            // keeps input order
            .buffered(self.config.map_concurrency.max(1))
            .try_collect()
            .await
    }
}

impl<S, C> SummarizeChain for MapReduceChain<'_, S, C>
where
    S: Summarizer + Sync,
    C: TokenCounter + Sync,
{
    fn strategy(&self) -> ChainStrategy {
        ChainStrategy::MapReduce
    }

    #[tracing::instrument(skip_all, fields(documents = documents.len()))]
    async fn run(&self, documents: &[TranscriptDocument]) -> Result<String, EngineError> {
        let chunks = split_documents(documents, self.counter, self.config.chunk_tokens);
        tracing::info!(chunks = chunks.len(), "Summarizing transcript chunks");

        let prompts = chunks
            .iter()
            .map(|chunk| concise_summary_prompt(chunk))
            .collect();
        let mut summaries = self.summarize_all(prompts).await?;

        let mut rounds = 0;
        while summaries.len() > 1 && self.total_tokens(&summaries) > self.config.collapse_token_max
        {
            if rounds == self.config.max_collapse_rounds {
                tracing::error!(rounds, remaining = summaries.len(), "Collapse did not converge");
                return Err(EngineError::Unconverged(rounds));
            }
            rounds += 1;

            let prompts = group_by_token_budget(
                summaries,
                self.counter,
                self.config.collapse_token_max,
            )
            .into_iter()
            .map(|group| combine_summaries_prompt(&group.join(DOCUMENT_SEPARATOR)))
            .collect::<Vec<_>>();

            tracing::debug!(round = rounds, groups = prompts.len(), "Collapsing summaries");
            summaries = self.summarize_all(prompts).await?;
        }

        call_engine(
            self.engine,
            combine_summaries_prompt(&summaries.join(DOCUMENT_SEPARATOR)),
        )
        .await
    }
}

/// Splits every document at whitespace boundaries into chunks of at most
/// `chunk_tokens` tokens. Pieces without whitespace that exceed the limit are
/// cut on char boundaries first.
pub(crate) fn split_documents<C: TokenCounter>(
    documents: &[TranscriptDocument],
    counter: &C,
    chunk_tokens: usize,
) -> Vec<String> {
    let mut chunks = Vec::new();

    for document in documents {
        let mut current = String::new();
        let mut current_tokens = 0;

        let mut pieces = Vec::new();
        for piece in document.content().split_inclusive(char::is_whitespace) {
            bisect_oversized(piece, counter, chunk_tokens, &mut pieces);
        }

        for piece in pieces {
            let tokens = counter.count_tokens(piece);
            if current_tokens + tokens > chunk_tokens && current_tokens > 0 {
                push_chunk(&mut chunks, std::mem::take(&mut current));
                current_tokens = 0;
            }
            current.push_str(piece);
            current_tokens += tokens;
        }

        push_chunk(&mut chunks, current);
    }

    chunks
}

/// Halves `piece` on char boundaries until every part fits `max_tokens`.
/// A single char is never split further.
fn bisect_oversized<'p, C: TokenCounter>(
    piece: &'p str,
    counter: &C,
    max_tokens: usize,
    parts: &mut Vec<&'p str>,
) {
    let chars = piece.chars().count();
    if chars <= 1 || counter.count_tokens(piece) <= max_tokens {
        parts.push(piece);
        return;
    }

    let mid = piece
        .char_indices()
        .nth(chars / 2)
        .map_or(piece.len(), |(index, _)| index);
    let (head, tail) = piece.split_at(mid);
    bisect_oversized(head, counter, max_tokens, parts);
    bisect_oversized(tail, counter, max_tokens, parts);
}

fn push_chunk(chunks: &mut Vec<String>, chunk: String) {
    let chunk = chunk.trim();
    if !chunk.is_empty() {
        chunks.push(chunk.to_string());
    }
}

/// Greedily packs consecutive summaries into groups whose token sum stays within `max_tokens`.
pub(crate) fn group_by_token_budget<C: TokenCounter>(
    summaries: Vec<String>,
    counter: &C,
    max_tokens: usize,
) -> Vec<Vec<String>> {
    let mut groups = Vec::new();
    let mut current = Vec::new();
    let mut current_tokens = 0;

    for summary in summaries {
        let tokens = counter.count_tokens(&summary);
        if current_tokens + tokens > max_tokens && !current.is_empty() {
            groups.push(std::mem::take(&mut current));
            current_tokens = 0;
        }
        current.push(summary);
        current_tokens += tokens;
    }

    if !current.is_empty() {
        groups.push(current);
    }

    groups
}
