use itertools::Itertools;

use crate::{
    chain::{call_engine, ChainStrategy, SummarizeChain, DOCUMENT_SEPARATOR},
    error::EngineError,
    llm::concise_summary_prompt,
    Summarizer, TranscriptDocument,
};

/// Concatenates every document into a single prompt and makes one engine call.
pub struct StuffChain<'a, S> {
    engine: &'a S,
}

impl<'a, S> StuffChain<'a, S> {
    pub fn new(engine: &'a S) -> Self {
        Self { engine }
    }
}

impl<S> SummarizeChain for StuffChain<'_, S>
where
    S: Summarizer + Sync,
{
    fn strategy(&self) -> ChainStrategy {
        ChainStrategy::Stuff
    }

    #[tracing::instrument(skip_all, fields(documents = documents.len()))]
    async fn run(&self, documents: &[TranscriptDocument]) -> Result<String, EngineError> {
        let text = documents
            .iter()
            .map(TranscriptDocument::content)
            .join(DOCUMENT_SEPARATOR);

        call_engine(self.engine, concise_summary_prompt(&text)).await
    }
}
