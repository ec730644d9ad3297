use std::time::Duration;

use crate::{
    chain::MapReduceConfig, config::DispatchConfig, llm::tokenizer::TokenCounter,
    yt::TranscriptLoader, Summarizer, SummaryDispatcher,
};

pub struct SummaryDispatcherBuilder<L = (), S = (), C = ()> {
    config: DispatchConfig,
    loader: L,
    summarizer: S,
    counter: C,
}

impl SummaryDispatcherBuilder {
    pub fn new(config: DispatchConfig) -> Self {
        Self {
            config,
            loader: (),
            summarizer: (),
            counter: (),
        }
    }
}

impl<L, S, C> SummaryDispatcherBuilder<L, S, C> {
    pub fn loader<L2: TranscriptLoader + Send + Sync + 'static>(
        self,
        loader: L2,
    ) -> SummaryDispatcherBuilder<L2, S, C> {
        SummaryDispatcherBuilder {
            config: self.config,
            loader,
            summarizer: self.summarizer,
            counter: self.counter,
        }
    }

    pub fn summarizer<S2: Summarizer + Send + Sync + 'static>(
        self,
        summarizer: S2,
    ) -> SummaryDispatcherBuilder<L, S2, C> {
        SummaryDispatcherBuilder {
            config: self.config,
            loader: self.loader,
            summarizer,
            counter: self.counter,
        }
    }

    pub fn token_counter<C2: TokenCounter + Send + Sync + 'static>(
        self,
        counter: C2,
    ) -> SummaryDispatcherBuilder<L, S, C2> {
        SummaryDispatcherBuilder {
            config: self.config,
            loader: self.loader,
            summarizer: self.summarizer,
            counter,
        }
    }

    pub fn context_budget(mut self, context_budget: usize) -> Self {
        self.config.context_budget = context_budget;
        self
    }

    pub fn load_timeout(mut self, timeout: Duration) -> Self {
        self.config.load_timeout = timeout;
        self
    }

    pub fn summarize_timeout(mut self, timeout: Duration) -> Self {
        self.config.summarize_timeout = timeout;
        self
    }

    pub fn map_reduce(mut self, map_reduce: MapReduceConfig) -> Self {
        self.config.map_reduce = map_reduce;
        self
    }
}

impl<L, S, C> SummaryDispatcherBuilder<L, S, C>
where
    L: TranscriptLoader + Send + Sync + 'static,
    S: Summarizer + Send + Sync + 'static,
    C: TokenCounter + Send + Sync + 'static,
{
    pub fn build(self) -> SummaryDispatcher<L, S, C> {
        SummaryDispatcher {
            config: self.config,
            loader: self.loader,
            summarizer: self.summarizer,
            counter: self.counter,
        }
    }
}
